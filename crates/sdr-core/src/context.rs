use crate::path::{insert_path, resolve};
use crate::value::{Callable, Object, Value};

/// Read-only data and behavior bag a template is interpreted against.
///
/// Values are plain data or host functions; both are addressed by the same
/// dotted paths templates use.
#[derive(Debug, Clone)]
pub struct Context {
    root: Value,
}

impl Context {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Object::new()),
        }
    }

    /// Build a context from a JSON document. Non-object documents produce an
    /// empty context.
    pub fn from_json(data: serde_json::Value) -> Self {
        match Value::from(data) {
            root @ Value::Object(_) => Self { root },
            _ => Self::new(),
        }
    }

    /// Insert a value at a dotted path.
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    /// Expose a host function at a dotted path.
    pub fn with_function<F>(self, path: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let callable = Callable::new(path, func);
        self.with(path, callable)
    }

    pub fn insert(&mut self, path: &str, value: impl Into<Value>) {
        if let Some(map) = self.root.as_object_mut() {
            insert_path(map, path, value.into());
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve(&self.root, path)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Object> for Context {
    fn from(map: Object) -> Self {
        Self {
            root: Value::Object(map),
        }
    }
}
