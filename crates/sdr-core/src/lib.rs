//! SDR Core crate.
//!
//! Interprets server-driven UI templates: a JSON node tree whose string props
//! may embed micro-expressions, resolved against a caller-supplied context and
//! turned into output elements by a caller-supplied type registry.
//!
//! Layers, leaf first:
//!
//! - `path`: dotted attribute lookup, absence is `None`, never an error.
//! - `expr`: `prop::` / `function::` / `${text::}` classification and
//!   evaluation.
//! - `bind`: recursive prop binding over nested objects and arrays.
//! - `template` + `registry` + `interpreter`: document model, type name
//!   dispatch and the pre-order tree walk.
//!
//! Everything here is synchronous and side-effect free apart from the host
//! functions a caller chooses to invoke later through an [`Invocation`].

pub mod bind;
pub mod context;
pub mod expr;
pub mod interpreter;
pub mod path;
pub mod registry;
pub mod template;
pub mod value;

pub use bind::{bind_leaf, bind_props, bind_value};
pub use context::Context;
pub use expr::{
    ExpressionKind, FUNCTION_PREFIX, PROP_PREFIX, TEXT_PREFIX, classify, evaluate, interpolate,
};
pub use interpreter::{BuildError, BuildOptions, Interpreter, KeyStrategy, build};
pub use path::resolve;
pub use registry::{Construct, Content, Props, Registry};
pub use template::{Children, NodePath, TemplateError, TemplateNode};
pub use value::{Callable, Invocation, Object, Value};
