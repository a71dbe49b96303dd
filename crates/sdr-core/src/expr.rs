//! Micro-expressions embedded in template strings.
//!
//! Three kinds exist, chosen by literal prefix in this order:
//!
//! | prefix | kind | result |
//! |---|---|---|
//! | `prop::a.b` | [`ExpressionKind::PropertyRef`] | the context value at `a.b`, verbatim |
//! | `function::a.b(x, y)` | [`ExpressionKind::FunctionRef`] | a deferred [`Invocation`] |
//! | anything else | [`ExpressionKind::TextTemplate`] | the string with every `${text::a.b}` substituted |
//!
//! Unresolved references never fail. A missing property is `Null` and a
//! missing placeholder interpolates as the empty string. A missing function
//! binds a no-op invocation.

use crate::context::Context;
use crate::value::{Invocation, Value};

pub const PROP_PREFIX: &str = "prop::";
pub const FUNCTION_PREFIX: &str = "function::";
pub const TEXT_PREFIX: &str = "text::";

const PLACEHOLDER_OPEN: &str = "${text::";
const PLACEHOLDER_CLOSE: char = '}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    PropertyRef,
    FunctionRef,
    TextTemplate,
}

pub fn classify(raw: &str) -> ExpressionKind {
    if raw.starts_with(PROP_PREFIX) {
        ExpressionKind::PropertyRef
    } else if raw.starts_with(FUNCTION_PREFIX) {
        ExpressionKind::FunctionRef
    } else {
        ExpressionKind::TextTemplate
    }
}

/// Evaluate one expression-bearing string against `ctx`.
pub fn evaluate(ctx: &Context, raw: &str) -> Value {
    match classify(raw) {
        ExpressionKind::PropertyRef => resolve_property(ctx, &raw[PROP_PREFIX.len()..]),
        ExpressionKind::FunctionRef => {
            Value::Invocation(bind_function(ctx, &raw[FUNCTION_PREFIX.len()..]))
        }
        ExpressionKind::TextTemplate => Value::String(interpolate(ctx, raw)),
    }
}

pub fn resolve_property(ctx: &Context, path: &str) -> Value {
    match ctx.get(path) {
        Some(v) => v.clone(),
        None => {
            tracing::trace!(path, "unresolved property reference");
            Value::Null
        }
    }
}

/// Bind a function reference (prefix already stripped).
///
/// `path` alone forwards the rendering layer's event arguments; `path(a, b)`
/// pre-resolves `a` and `b` now and ignores event arguments later.
pub fn bind_function(ctx: &Context, reference: &str) -> Invocation {
    let (path, args_segment) = match reference.split_once('(') {
        Some((path, rest)) => {
            let segment = rest.split_once('(').map_or(rest, |(head, _)| head);
            (path, Some(segment))
        }
        None => (reference, None),
    };

    let Some(target) = ctx.get(path).and_then(Value::as_callable).cloned() else {
        tracing::warn!(path, "function reference is not invocable, binding a no-op");
        return Invocation::noop();
    };

    match args_segment {
        Some(segment) if !segment.is_empty() => {
            Invocation::bound(target, bind_arguments(ctx, segment))
        }
        _ => Invocation::forward(target),
    }
}

fn bind_arguments(ctx: &Context, segment: &str) -> Vec<Value> {
    let list = segment.replacen(')', "", 1);
    if list.trim().is_empty() {
        return Vec::new();
    }
    list.split(',')
        .enumerate()
        .map(|(i, token)| {
            let token = if i == 0 { token } else { token.trim_start() };
            bind_argument(ctx, token)
        })
        .collect()
}

fn bind_argument(ctx: &Context, token: &str) -> Value {
    if token.contains(PROP_PREFIX) {
        resolve_property(ctx, &token.replacen(PROP_PREFIX, "", 1))
    } else if token.contains(TEXT_PREFIX) {
        Value::String(interpolate(ctx, token))
    } else {
        Value::String(token.to_string())
    }
}

/// Substitute every `${text::path}` placeholder in `text`.
///
/// Strings, numbers and booleans substitute their textual form; anything
/// else, including a missing path, substitutes nothing. An unterminated
/// placeholder is left as literal text.
pub fn interpolate(ctx: &Context, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        let body = &rest[start + PLACEHOLDER_OPEN.len()..];
        let Some(end) = body.find(PLACEHOLDER_CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        let path = &body[..end];
        match ctx.get(path).and_then(Value::text) {
            Some(text) => out.push_str(&text),
            None => tracing::trace!(path, "placeholder resolved to nothing"),
        }
        rest = &body[end + PLACEHOLDER_CLOSE.len_utf8()..];
    }
    out.push_str(rest);
    out
}
