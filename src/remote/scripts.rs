//! Python snippets executed inside the editor
//!
//! Each snippet prints a single JSON document (or `null`) to the output log.
//! Class and member names are validated as identifiers before substitution.

use crate::cache::types::validate_identifier;

const CLASS_PLACEHOLDER: &str = "__CLASS_NAME__";
const MEMBER_PLACEHOLDER: &str = "__MEMBER_NAME__";

/// Walks the `unreal` module and prints the table of contents
pub const TABLE_OF_CONTENTS: &str = r#"
import warnings
import inspect
import types
import json
import unreal

def issubclass_strict(cls, class_or_tuple):
    if not issubclass(cls, class_or_tuple):
        return False
    if isinstance(class_or_tuple, tuple):
        return cls not in class_or_tuple
    return cls is not class_or_tuple

def get_module_name(cls):
    if hasattr(cls, 'static_class'):
        try:
            sc = cls.static_class()
            if sc:
                path = sc.get_path_name()
                if path.startswith('/Script/'):
                    parts = path[8:].split('.')
                    if len(parts) >= 1:
                        return parts[0]
        except Exception:
            pass
    return None

class Entry:
    def __init__(self, name, cls):
        self.name = name
        self.cls = cls
        self.module = get_module_name(cls)
        self.methods = []
        self.classmethods = []
        self.properties = []
        self.constants = []
        self.load_members()

    def load_members(self):
        for name, member in inspect.getmembers(self.cls):
            if name.startswith("_"):
                continue
            if name not in self.cls.__dict__:
                continue
            if inspect.ismethoddescriptor(member):
                self.methods.append(name)
            elif inspect.isgetsetdescriptor(member):
                self.properties.append(name)
            elif issubclass(type(member), unreal.EnumBase):
                self.properties.append(name)
            elif issubclass(type(member), unreal.StructBase):
                self.properties.append(name)
            elif inspect.isbuiltin(member):
                self.classmethods.append(name)
            elif inspect.ismemberdescriptor(member):
                self.properties.append(name)
            elif isinstance(member, int):
                self.constants.append(name)

    def get_dict(self):
        data = {}
        if self.module:
            data["module"] = self.module
        for key, values in (("func", self.methods),
                            ("cls_func", self.classmethods),
                            ("prop", self.properties),
                            ("const", self.constants)):
            if values:
                data[key] = values
        return data

def build():
    natives, structs, classes, enums, delegates, functions = [], [], [], [], [], []
    for name, obj in inspect.getmembers(unreal):
        if inspect.isclass(obj):
            entry = Entry(name, obj)
            if issubclass_strict(obj, unreal.EnumBase):
                enums.append(entry)
            elif issubclass_strict(obj, unreal.StructBase):
                structs.append(entry)
            elif issubclass_strict(obj, (unreal.DelegateBase, unreal.MulticastDelegateBase)):
                delegates.append(entry)
            elif issubclass_strict(obj, unreal.Object):
                classes.append(entry)
            else:
                natives.append(entry)
        elif inspect.isfunction(obj) or isinstance(obj, types.BuiltinFunctionType):
            functions.append(name)
    data = {}
    for key, entries in (("Native", natives), ("Struct", structs), ("Class", classes),
                         ("Enum", enums), ("Delegate", delegates)):
        data[key] = {e.name: e.get_dict() for e in entries}
    data["Function"] = {name: {} for name in functions}
    return data

with warnings.catch_warnings():
    warnings.simplefilter("ignore")
    toc = build()
print(json.dumps(toc, separators=(',', ':')))
"#;

const CLASS_BASIC_INFO: &str = r#"
import inspect
import json
import unreal

obj = getattr(unreal, "__CLASS_NAME__", None)
if obj is not None:
    print(json.dumps({
        "name": "__CLASS_NAME__",
        "doc": inspect.getdoc(obj) or "",
        "bases": [b.__name__ for b in getattr(obj, '__bases__', []) if hasattr(b, '__name__')],
    }))
else:
    print("null")
"#;

const MEMBER_INFO: &str = r#"
import inspect
import json
import unreal

obj = getattr(unreal, "__CLASS_NAME__", None)
member = getattr(obj, "__MEMBER_NAME__", None) if obj is not None else None
if member is not None:
    result = {"name": "__MEMBER_NAME__", "doc": inspect.getdoc(member) or ""}
    if isinstance(member, property):
        result["type"] = "property"
    elif callable(member):
        result["type"] = "method"
        try:
            result["signature"] = str(inspect.signature(member))
        except (ValueError, TypeError):
            result["signature"] = "()"
    else:
        result["type"] = "constant"
        result["value"] = repr(member)[:100]
    print(json.dumps(result))
else:
    print("null")
"#;

const CLASS_DOCUMENT: &str = r#"
import inspect
import json
import unreal

def describe(class_name):
    obj = getattr(unreal, class_name, None)
    if obj is None:
        return None
    doc = {
        "name": class_name,
        "doc": inspect.getdoc(obj) or "",
        "bases": [b.__name__ for b in getattr(obj, '__bases__', []) if hasattr(b, '__name__')],
        "is_class": inspect.isclass(obj),
        "members": {"methods": [], "properties": [], "constants": []},
    }
    for name, member in inspect.getmembers(obj):
        if name.startswith('_'):
            continue
        info = {"name": name, "doc": inspect.getdoc(member) or ""}
        if isinstance(member, property):
            doc["members"]["properties"].append(info)
        elif callable(member):
            try:
                info["signature"] = str(inspect.signature(member))
            except (ValueError, TypeError):
                info["signature"] = "()"
            doc["members"]["methods"].append(info)
        else:
            info["value"] = repr(member)[:100]
            doc["members"]["constants"].append(info)
    return doc

result = describe("__CLASS_NAME__")
print(json.dumps(result) if result else "null")
"#;

fn render(template: &str, class_name: &str, member_name: Option<&str>) -> Option<String> {
    if let Err(e) = validate_identifier(class_name) {
        tracing::debug!("Refusing to build remote query: {}", e);
        return None;
    }
    let mut source = template.replace(CLASS_PLACEHOLDER, class_name);
    if let Some(member_name) = member_name {
        if let Err(e) = validate_identifier(member_name) {
            tracing::debug!("Refusing to build remote query: {}", e);
            return None;
        }
        source = source.replace(MEMBER_PLACEHOLDER, member_name);
    }
    Some(source)
}

pub fn class_basic_info(class_name: &str) -> Option<String> {
    render(CLASS_BASIC_INFO, class_name, None)
}

pub fn member_info(class_name: &str, member_name: &str) -> Option<String> {
    render(MEMBER_INFO, class_name, Some(member_name))
}

pub fn class_document(class_name: &str) -> Option<String> {
    render(CLASS_DOCUMENT, class_name, None)
}
