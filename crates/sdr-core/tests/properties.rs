use sdr_core::{
    BuildError, Content, Context, Props, Registry, TemplateNode, Value, build, evaluate, resolve,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Container { props: Props, children: Vec<Node> },
    Text { props: Props, content: Option<String> },
}

fn registry() -> Registry<Node> {
    let mut registry = Registry::new();
    registry.register("Group", |props: Props, content: Content<Node>| Node::Container {
        props,
        children: match content {
            Content::Elements(items) => items,
            _ => Vec::new(),
        },
    });
    registry.register("Label", |props: Props, content: Content<Node>| Node::Text {
        content: content.text(),
        props,
    });
    registry
}

#[test]
fn plain_literals_evaluate_to_themselves() {
    let ctx = Context::from_json(json!({"a": {"b": "X"}, "title": "T"}));
    for s in [
        "",
        "hello world",
        "a.b",
        "{text::a.b}",
        "$text::a.b",
        "price: $5 {not a placeholder}",
        "ünïcödé ✓",
    ] {
        assert_eq!(evaluate(&ctx, s), Value::from(s), "literal {s:?}");
    }
}

#[test]
fn text_placeholders_resolve_independently() {
    let ctx = Context::from_json(json!({"a": {"b": "X"}, "c": 3}));
    assert_eq!(evaluate(&ctx, "${text::a.b}"), Value::from("X"));
    assert_eq!(
        evaluate(&ctx, "prefix-${text::a.b}-suffix"),
        Value::from("prefix-X-suffix")
    );
    assert_eq!(
        evaluate(&ctx, "${text::a.b}+${text::c}=${text::a.b}${text::c}"),
        Value::from("X+3=X3")
    );
}

#[test]
fn absent_leaf_and_absent_branch_resolve_alike() {
    let with_branch = Value::from(json!({"a": {"b": {}}}));
    let without_branch = Value::from(json!({}));
    assert!(resolve(&with_branch, "a.b.c").is_none());
    assert!(resolve(&without_branch, "a.b.c").is_none());
}

#[test]
fn property_reference_returns_typed_value() {
    let ctx = Context::from_json(json!({"a": {"b": 42}}));
    let value = evaluate(&ctx, "prop::a.b");
    assert_eq!(value, Value::from(42i64));
    assert!(value.as_str().is_none());
}

#[test]
fn function_reference_calls_recorder_with_resolved_argument() {
    let calls: Arc<Mutex<Vec<Vec<Value>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let ctx = Context::from_json(json!({"user": {"name": "Ann"}})).with_function(
        "handlers.onTap",
        move |args| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(args.to_vec());
            }
            Value::Null
        },
    );

    let deferred = evaluate(&ctx, "function::handlers.onTap(prop::user.name)");
    assert!(calls.lock().expect("lock").is_empty(), "must not call at bind time");

    deferred.as_invocation().expect("invocation").invoke();
    assert_eq!(*calls.lock().expect("lock"), vec![vec![Value::from("Ann")]]);
}

#[test]
fn builds_group_with_interpolated_label() {
    let ctx = Context::from_json(json!({"title": "Hi"}));
    let template = TemplateNode::from_json(&json!({
        "type": "Group",
        "children": [{"type": "Label", "children": "${text::title}"}]
    }))
    .expect("template");

    let Node::Container { children, .. } = build(&ctx, &registry(), &template).expect("build")
    else {
        panic!("expected container");
    };
    assert_eq!(children.len(), 1);
    let Node::Text { content, .. } = &children[0] else {
        panic!("expected text");
    };
    assert_eq!(content.as_deref(), Some("Hi"));
}

#[test]
fn unknown_type_fails_without_touching_inputs() {
    let ctx = Context::from_json(json!({"title": "Hi"}));
    let reg = registry();
    let template = TemplateNode::from_json(&json!({
        "type": "Group",
        "children": [{"type": "Missing"}]
    }))
    .expect("template");
    let ctx_before = ctx.root().clone();
    let template_before = template.clone();

    let err = build(&ctx, &reg, &template).expect_err("unknown type");
    assert!(matches!(err, BuildError::UnknownType { ref type_name, .. } if type_name == "Missing"));
    assert_eq!(ctx.root(), &ctx_before);
    assert_eq!(template, template_before);
    assert_eq!(reg.len(), 2);
}

#[test]
fn repeated_builds_are_structurally_identical() {
    let ctx = Context::from_json(json!({
        "n": {"title": "Liked", "user": "John", "style": {"color": "green"}}
    }));
    let template = TemplateNode::from_json(&json!({
        "type": "Group",
        "props": {"style": "prop::n.style"},
        "children": [
            {"type": "Label", "children": "${text::n.user}"},
            {"type": "Group", "children": [{"type": "Label", "children": "${text::n.title}!"}]}
        ]
    }))
    .expect("template");
    let reg = registry();

    let first = build(&ctx, &reg, &template).expect("first");
    let second = build(&ctx, &reg, &template).expect("second");
    assert_eq!(first, second);
}
