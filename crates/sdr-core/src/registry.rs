use crate::value::{Object, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Fully resolved props handed to a constructor.
pub type Props = Object;

/// Resolved content of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Content<E> {
    /// No children at all.
    Empty,
    /// A single interpolated text (or pass-through scalar) value.
    Leaf(Value),
    /// Child elements, already constructed, in template order.
    Elements(Vec<E>),
}

impl<E> Content<E> {
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Empty => true,
            Content::Leaf(v) => v.is_null(),
            Content::Elements(items) => items.is_empty(),
        }
    }

    pub fn text(&self) -> Option<String> {
        match self {
            Content::Leaf(v) => v.text(),
            _ => None,
        }
    }
}

/// Builds one output element for a registered type name.
pub trait Construct<E>: Send + Sync {
    fn construct(&self, props: Props, content: Content<E>) -> E;
}

impl<E, F> Construct<E> for F
where
    F: Fn(Props, Content<E>) -> E + Send + Sync,
{
    fn construct(&self, props: Props, content: Content<E>) -> E {
        self(props, content)
    }
}

/// Type name to constructor mapping, fixed for the duration of a build.
pub struct Registry<E> {
    types: HashMap<String, Arc<dyn Construct<E>>>,
}

impl<E> Registry<E> {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register or replace the constructor for `name`.
    pub fn register<C>(&mut self, name: impl Into<String>, constructor: C) -> Option<Arc<dyn Construct<E>>>
    where
        C: Construct<E> + 'static,
    {
        self.types.insert(name.into(), Arc::new(constructor))
    }

    pub fn with<C>(mut self, name: impl Into<String>, constructor: C) -> Self
    where
        C: Construct<E> + 'static,
    {
        self.register(name, constructor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Construct<E>> {
        self.types.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Registry<E> {
    fn clone(&self) -> Self {
        Self {
            types: self.types.clone(),
        }
    }
}

impl<E> fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.type_names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("types", &names).finish()
    }
}
