use crate::bind::{bind_leaf, bind_props};
use crate::context::Context;
use crate::registry::{Content, Registry};
use crate::template::{Children, NodePath, TemplateError, TemplateNode};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// How identity keys are assigned to nodes that do not carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Derived from the node's position in the tree; stable across builds.
    #[default]
    TreePath,
    /// Fresh ULID on every build.
    Random,
    /// Leave props untouched.
    None,
}

/// Per-interpreter configuration. Passed explicitly, never global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    #[serde(default = "default_key_prop")]
    pub key_prop: String,
    #[serde(default)]
    pub keys: KeyStrategy,
    /// Type built in place of a missing document.
    #[serde(default = "default_placeholder_type")]
    pub placeholder_type: String,
}

fn default_key_prop() -> String {
    "key".to_string()
}

fn default_placeholder_type() -> String {
    "View".to_string()
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            key_prop: default_key_prop(),
            keys: KeyStrategy::default(),
            placeholder_type: default_placeholder_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{path}: unknown type '{type_name}'")]
    UnknownType { type_name: String, path: NodePath },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl BuildError {
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            BuildError::UnknownType { path, .. } => Some(path),
            BuildError::Template(err) => err.path(),
        }
    }
}

/// Turns template trees into output element trees.
///
/// A build is a single synchronous pre-order walk: a node's props are bound
/// before its children, children left to right. Nothing is cached between
/// builds and nothing outside the returned tree is touched.
pub struct Interpreter<'a, E> {
    ctx: &'a Context,
    registry: &'a Registry<E>,
    options: BuildOptions,
}

impl<'a, E> Interpreter<'a, E> {
    pub fn new(ctx: &'a Context, registry: &'a Registry<E>) -> Self {
        Self {
            ctx,
            registry,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn build(&self, node: &TemplateNode) -> Result<E, BuildError> {
        self.build_at(node, &NodePath::root())
    }

    /// Validate a raw JSON document, then build it.
    pub fn build_json(&self, json: &serde_json::Value) -> Result<E, BuildError> {
        let node = TemplateNode::from_json(json)?;
        self.build(&node)
    }

    /// Build `document`, or an empty placeholder element when there is none.
    pub fn build_document(&self, document: Option<&TemplateNode>) -> Result<E, BuildError> {
        match document {
            Some(node) => self.build(node),
            None => self.build(&TemplateNode::new(self.options.placeholder_type.clone())),
        }
    }

    fn build_at(&self, node: &TemplateNode, path: &NodePath) -> Result<E, BuildError> {
        let constructor =
            self.registry
                .get(&node.type_name)
                .ok_or_else(|| BuildError::UnknownType {
                    type_name: node.type_name.clone(),
                    path: path.clone(),
                })?;
        tracing::debug!(type_name = %node.type_name, path = %path, "building node");

        let mut props = bind_props(self.ctx, node.props.as_ref());
        self.assign_key(&mut props, path);

        let content = match &node.children {
            None => Content::Empty,
            Some(Children::Leaf(leaf)) => Content::Leaf(bind_leaf(self.ctx, leaf)),
            Some(Children::Nodes(nodes)) if nodes.is_empty() => Content::Empty,
            Some(Children::Nodes(nodes)) => {
                let mut elements = Vec::with_capacity(nodes.len());
                for (idx, child) in nodes.iter().enumerate() {
                    elements.push(self.build_at(child, &path.child(idx))?);
                }
                Content::Elements(elements)
            }
        };

        Ok(constructor.construct(props, content))
    }

    fn assign_key(&self, props: &mut crate::value::Object, path: &NodePath) {
        let has_key = props
            .get(&self.options.key_prop)
            .is_some_and(|v| !v.is_null());
        if has_key {
            return;
        }
        let key = match self.options.keys {
            KeyStrategy::TreePath => path.key(),
            KeyStrategy::Random => Ulid::new().to_string(),
            KeyStrategy::None => return,
        };
        props.insert(self.options.key_prop.clone(), Value::String(key));
    }
}

/// Build `node` with default options.
pub fn build<E>(ctx: &Context, registry: &Registry<E>, node: &TemplateNode) -> Result<E, BuildError> {
    Interpreter::new(ctx, registry).build(node)
}
