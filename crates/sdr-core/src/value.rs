use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Object payload shared by contexts and resolved props.
pub type Object = BTreeMap<String, Value>;

/// Host function signature exposed to templates through the context.
pub type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Dynamic value produced by contexts and by expression evaluation.
///
/// Plain data mirrors JSON one to one. `Function` carries a host callable
/// reachable from `function::` references, and `Invocation` is the deferred
/// call produced when such a reference is bound.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Function(Callable),
    Invocation(Invocation),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_invocation(&self) -> Option<&Invocation> {
        match self {
            Value::Invocation(inv) => Some(inv),
            _ => None,
        }
    }

    /// Text substituted for an interpolation placeholder.
    ///
    /// Only strings, numbers and booleans have a textual form; every other
    /// kind interpolates as nothing.
    pub fn text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(n)),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Lossy conversion back to JSON; host callables become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) | Value::Invocation(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Structural equality ignoring host callables, which never compare equal
    /// unless they share the same allocation.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_as(vb))
            }
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Invocation(a), Value::Invocation(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(map) => f.debug_map().entries(map).finish(),
            Value::Function(c) => c.fmt(f),
            Value::Invocation(inv) => inv.fmt(f),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Function(c)
    }
}

impl From<Invocation> for Value {
    fn from(inv: Invocation) -> Self {
        Value::Invocation(inv)
    }
}

pub(crate) fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Shared handle to a host function.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Callable {
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// Deferred call bound by a `function::` reference.
///
/// The target is resolved and the arguments are evaluated at bind time; the
/// call itself happens whenever the rendering layer decides to fire it. A
/// missing target makes every call a no-op returning `Null`.
#[derive(Clone, Default)]
pub struct Invocation {
    target: Option<Callable>,
    bound: Option<Vec<Value>>,
}

impl Invocation {
    /// Invocation that forwards the caller's arguments to `target`.
    pub fn forward(target: Callable) -> Self {
        Self {
            target: Some(target),
            bound: None,
        }
    }

    /// Invocation with a fixed, pre-resolved argument list.
    pub fn bound(target: Callable, args: Vec<Value>) -> Self {
        Self {
            target: Some(target),
            bound: Some(args),
        }
    }

    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.target.is_none()
    }

    pub fn target(&self) -> Option<&Callable> {
        self.target.as_ref()
    }

    pub fn bound_args(&self) -> Option<&[Value]> {
        self.bound.as_deref()
    }

    pub fn invoke(&self) -> Value {
        self.invoke_with(&[])
    }

    /// Fire the call with event arguments from the rendering layer.
    ///
    /// Event arguments only reach the target when the reference carried no
    /// argument list of its own.
    pub fn invoke_with(&self, event_args: &[Value]) -> Value {
        let Some(target) = &self.target else {
            return Value::Null;
        };
        match &self.bound {
            Some(args) => target.call(args),
            None => target.call(event_args),
        }
    }

    fn same_as(&self, other: &Invocation) -> bool {
        let targets = match (&self.target, &other.target) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        let args = match (&self.bound, &other.bound) {
            (None, None) => true,
            (Some(a), Some(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y)),
            _ => false,
        };
        targets && args
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.target.as_ref().map(Callable::name).unwrap_or("noop");
        match &self.bound {
            Some(args) => write!(f, "Invocation({name}, {args:?})"),
            None => write!(f, "Invocation({name})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn text_formats_scalars_only() {
        assert_eq!(Value::from("a").text(), Some("a".to_string()));
        assert_eq!(Value::from(42i64).text(), Some("42".to_string()));
        assert_eq!(Value::from(1.0f64).text(), Some("1".to_string()));
        assert_eq!(Value::from(1.5f64).text(), Some("1.5".to_string()));
        assert_eq!(Value::from(false).text(), Some("false".to_string()));
        assert_eq!(Value::Null.text(), None);
        assert_eq!(Value::from(json!({"a": 1})).text(), None);
    }

    #[test]
    fn json_conversion_keeps_shape() {
        let raw = json!({"a": [1, "x", {"b": true}], "c": null});
        let value = Value::from(raw.clone());
        assert_eq!(value.to_json(), raw);
    }

    #[test]
    fn invocation_uses_bound_args_over_event_args() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let target = Callable::new("record", move |args| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(args.to_vec());
            }
            Value::Null
        });

        Invocation::bound(target.clone(), vec![Value::from("bound")])
            .invoke_with(&[Value::from("event")]);
        Invocation::forward(target).invoke_with(&[Value::from("event")]);

        let calls = seen.lock().expect("lock");
        assert_eq!(calls[0], vec![Value::from("bound")]);
        assert_eq!(calls[1], vec![Value::from("event")]);
    }

    #[test]
    fn noop_invocation_returns_null() {
        let inv = Invocation::noop();
        assert!(inv.is_noop());
        assert!(inv.invoke().is_null());
    }
}
