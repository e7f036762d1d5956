//! Scripted [`RemoteExecutor`] for unit tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{ExecutionOutput, RemoteError, RemoteExecutor, RemoteInstance};

#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    toc_responses: Mutex<VecDeque<Result<String, RemoteError>>>,
    executions: Mutex<VecDeque<Result<ExecutionOutput, RemoteError>>>,
    class_documents: Mutex<HashMap<String, String>>,
    basic_infos: Mutex<HashMap<String, String>>,
    member_infos: Mutex<HashMap<(String, String), String>>,
    instances: Mutex<Vec<RemoteInstance>>,
    execution_calls: AtomicUsize,
    class_document_calls: AtomicUsize,
    basic_info_calls: AtomicUsize,
    member_info_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every live documentation query take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn push_toc(&self, response: Result<String, RemoteError>) {
        self.toc_responses.lock().unwrap().push_back(response);
    }

    pub fn push_execution(&self, response: Result<ExecutionOutput, RemoteError>) {
        self.executions.lock().unwrap().push_back(response);
    }

    pub fn set_class_document(&self, class_name: &str, payload: &str) {
        self.class_documents
            .lock()
            .unwrap()
            .insert(class_name.to_string(), payload.to_string());
    }

    pub fn set_basic_info(&self, class_name: &str, payload: &str) {
        self.basic_infos
            .lock()
            .unwrap()
            .insert(class_name.to_string(), payload.to_string());
    }

    pub fn set_member_info(&self, class_name: &str, member_name: &str, payload: &str) {
        self.member_infos.lock().unwrap().insert(
            (class_name.to_string(), member_name.to_string()),
            payload.to_string(),
        );
    }

    pub fn set_instances(&self, instances: Vec<RemoteInstance>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub fn executions(&self) -> usize {
        self.execution_calls.load(Ordering::SeqCst)
    }

    pub fn class_document_calls(&self) -> usize {
        self.class_document_calls.load(Ordering::SeqCst)
    }

    pub fn basic_info_calls(&self) -> usize {
        self.basic_info_calls.load(Ordering::SeqCst)
    }

    pub fn member_info_calls(&self) -> usize {
        self.member_info_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedExecutor {
    async fn execute_code(
        &self,
        _source: &str,
        _timeout: Duration,
    ) -> Result<ExecutionOutput, RemoteError> {
        self.execution_calls.fetch_add(1, Ordering::SeqCst);
        self.executions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::Unavailable("nothing scripted".to_string())))
    }

    async fn discover_instances(&self) -> Vec<RemoteInstance> {
        self.instances.lock().unwrap().clone()
    }

    async fn fetch_table_of_contents(&self) -> Result<String, RemoteError> {
        self.toc_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::Unavailable("nothing scripted".to_string())))
    }

    async fn fetch_class_basic_info(&self, class_name: &str) -> Option<String> {
        self.basic_info_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.basic_infos.lock().unwrap().get(class_name).cloned()
    }

    async fn fetch_member_info(&self, class_name: &str, member_name: &str) -> Option<String> {
        self.member_info_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.member_infos
            .lock()
            .unwrap()
            .get(&(class_name.to_string(), member_name.to_string()))
            .cloned()
    }

    async fn fetch_class_document(&self, class_name: &str) -> Option<String> {
        self.class_document_calls.fetch_add(1, Ordering::SeqCst);
        self.class_documents.lock().unwrap().get(class_name).cloned()
    }
}
