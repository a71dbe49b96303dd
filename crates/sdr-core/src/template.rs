use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Position of a node inside a template tree, as child indices from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Compact identity derived from the position: `0`, `0.1`, `0.1.2`.
    pub fn key(&self) -> String {
        let mut key = String::from("0");
        for idx in &self.0 {
            key.push('.');
            key.push_str(&idx.to_string());
        }
        key
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for idx in &self.0 {
            write!(f, ".children[{idx}]")?;
        }
        Ok(())
    }
}

/// Structural problems in a template document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("invalid template json: {0}")]
    Json(String),
    #[error("{path}: node must be an object")]
    NotAnObject { path: NodePath },
    #[error("{path}: missing required 'type'")]
    MissingType { path: NodePath },
    #[error("{path}: 'type' must be a non-empty string")]
    InvalidType { path: NodePath },
    #[error("{path}: 'props' must be an object")]
    InvalidProps { path: NodePath },
    #[error("{path}: children must be text, a node, or an array of nodes")]
    InvalidChildren { path: NodePath },
}

impl TemplateError {
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            TemplateError::Json(_) => None,
            TemplateError::NotAnObject { path }
            | TemplateError::MissingType { path }
            | TemplateError::InvalidType { path }
            | TemplateError::InvalidProps { path }
            | TemplateError::InvalidChildren { path } => Some(path),
        }
    }
}

/// One node of a template document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct TemplateNode {
    pub type_name: String,
    pub props: Option<BTreeMap<String, Value>>,
    pub children: Option<Children>,
}

/// Content of a template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    /// Text (or any other scalar) rendered as the node's single content value.
    Leaf(Value),
    /// Ordered child nodes.
    Nodes(Vec<TemplateNode>),
}

impl TemplateNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            props: None,
            children: None,
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<Value>) -> Self {
        self.children = Some(Children::Leaf(text.into()));
        self
    }

    pub fn with_child(mut self, child: TemplateNode) -> Self {
        match &mut self.children {
            Some(Children::Nodes(nodes)) => nodes.push(child),
            _ => self.children = Some(Children::Nodes(vec![child])),
        }
        self
    }

    pub fn from_json(json: &Value) -> Result<Self, TemplateError> {
        parse_node(json, &NodePath::root())
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(self.type_name.clone()));
        if let Some(props) = &self.props {
            obj.insert(
                "props".to_string(),
                Value::Object(props.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            );
        }
        match &self.children {
            Some(Children::Leaf(leaf)) => {
                obj.insert("children".to_string(), leaf.clone());
            }
            Some(Children::Nodes(nodes)) => {
                obj.insert(
                    "children".to_string(),
                    Value::Array(nodes.iter().map(TemplateNode::to_json).collect()),
                );
            }
            None => {}
        }
        Value::Object(obj)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + match &self.children {
            Some(Children::Nodes(nodes)) => nodes.iter().map(TemplateNode::node_count).sum(),
            _ => 0,
        }
    }
}

impl FromStr for TemplateNode {
    type Err = TemplateError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let json: Value =
            serde_json::from_str(source).map_err(|e| TemplateError::Json(e.to_string()))?;
        Self::from_json(&json)
    }
}

impl TryFrom<Value> for TemplateNode {
    type Error = TemplateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<TemplateNode> for Value {
    fn from(node: TemplateNode) -> Self {
        node.to_json()
    }
}

fn parse_node(json: &Value, path: &NodePath) -> Result<TemplateNode, TemplateError> {
    let obj = json
        .as_object()
        .ok_or_else(|| TemplateError::NotAnObject { path: path.clone() })?;

    let type_name = match obj.get("type") {
        None | Some(Value::Null) => {
            return Err(TemplateError::MissingType { path: path.clone() });
        }
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(_) => return Err(TemplateError::InvalidType { path: path.clone() }),
    };

    let props = match obj.get("props") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(
            map.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        ),
        Some(_) => return Err(TemplateError::InvalidProps { path: path.clone() }),
    };

    let children = match obj.get("children") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Array(items)) => {
            let mut nodes = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let child_path = path.child(idx);
                if !item.is_object() {
                    return Err(TemplateError::InvalidChildren { path: child_path });
                }
                nodes.push(parse_node(item, &child_path)?);
            }
            Some(Children::Nodes(nodes))
        }
        Some(single @ Value::Object(_)) => {
            Some(Children::Nodes(vec![parse_node(single, &path.child(0))?]))
        }
        Some(leaf) => Some(Children::Leaf(leaf.clone())),
    };

    Ok(TemplateNode {
        type_name,
        props,
        children,
    })
}
