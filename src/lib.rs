pub mod cache;
pub mod index;
pub mod remote;
pub mod search;
pub mod service;

pub use service::UnrealPythonService;
