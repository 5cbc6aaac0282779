//! Integration tests for class parsing and token emission.
//!
//! The fixtures mirror the model classes used by SDK packages: a plain object,
//! a value container and a structural mapping type.

use apistub_core::descriptor::ModuleDescriptor;
use apistub_core::nodes::{build_class, BuildOptions, ModuleNode, Node, NodeEntity, NodeKind};
use apistub_core::tokens::{render_text, TokenKind};

const MODELS: &str = r#"{
    "name": "test.models",
    "source_ordered": true,
    "classes": [
        {
            "name": "FakeObject",
            "source_ordered": true,
            "members": [
                { "member": "function", "name": "__init__",
                  "params": [
                      { "name": "self" },
                      { "name": "name", "annotation": { "kind": "named", "name": "str" } },
                      { "name": "age", "annotation": { "kind": "named", "name": "int" } }
                  ] },
                { "member": "variable", "name": "age",
                  "annotation": { "kind": "named", "name": "int" } },
                { "member": "variable", "name": "name",
                  "annotation": { "kind": "named", "name": "str" } },
                { "member": "variable", "name": "union",
                  "annotation": { "kind": "union", "members": [
                      { "kind": "named", "name": "bool" },
                      { "kind": "named", "name": "PetEnum", "module": "apistubgentest.models" }
                  ] } }
            ]
        },
        {
            "name": "FakeInventoryItemDataClass",
            "source_ordered": true,
            "kind": {
                "kind": "dataclass",
                "params": [
                    { "name": "eq", "value": "True" },
                    { "name": "frozen", "value": "False" },
                    { "name": "order", "value": "False" }
                ],
                "fields": [
                    { "name": "name", "attributes": [
                        { "name": "default", "value": "<dataclasses._MISSING_TYPE object>" },
                        { "name": "_field_type", "value": "_FIELD" }
                    ] },
                    { "name": "quantity_on_hand", "attributes": [
                        { "name": "default", "value": "0" }
                    ] },
                    { "name": "unit_price", "attributes": [
                        { "name": "compare", "value": "True" }
                    ] }
                ]
            },
            "members": [
                { "member": "variable", "name": "name",
                  "annotation": { "kind": "named", "name": "str" } },
                { "member": "variable", "name": "quantity_on_hand",
                  "annotation": { "kind": "named", "name": "int" },
                  "value": { "kind": "expr", "value": "0" } },
                { "member": "function", "name": "total_cost",
                  "params": [ { "name": "self" } ],
                  "returns": { "kind": "named", "name": "float" } },
                { "member": "variable", "name": "unit_price",
                  "annotation": { "kind": "named", "name": "float" } }
            ]
        },
        {
            "name": "FakeTypedDict",
            "bases": [ { "kind": "named", "name": "TypedDict" } ],
            "kind": {
                "kind": "typed_dict",
                "keys": [
                    { "key": "age", "annotation": { "kind": "named", "name": "int" } },
                    { "key": "name", "annotation": { "kind": "named", "name": "str" } },
                    { "key": "union", "annotation": { "kind": "union", "members": [
                        { "kind": "named", "name": "bool" },
                        { "kind": "named", "name": "FakeObject",
                          "module": "tests.class_parsing_test" },
                        { "kind": "named", "name": "PetEnum", "module": "apistubgentest.models" }
                    ] } }
                ]
            }
        }
    ]
}"#;

fn models() -> ModuleDescriptor {
    ModuleDescriptor::from_json_str(MODELS).expect("fixture parses")
}

fn class_node(name: &str) -> Node {
    let module = models();
    let desc = module
        .classes
        .iter()
        .find(|c| c.name == name)
        .expect("class in fixture");
    build_class("test", desc, &BuildOptions::new("test"))
}

/// (kind, name, type) for each child.
fn shape(node: &Node) -> Vec<(NodeKind, String, Option<String>)> {
    node.child_nodes()
        .iter()
        .map(|child| {
            let ty = match child {
                Node::Variable(v) => v.type_name().map(str::to_string),
                Node::Key(k) => k.type_name().map(str::to_string),
                _ => None,
            };
            (child.kind(), child.name().to_string(), ty)
        })
        .collect()
}

fn check(node: &Node, expected: &[(NodeKind, &str, Option<&str>)]) {
    let actual = shape(node);
    let expected: Vec<(NodeKind, String, Option<String>)> = expected
        .iter()
        .map(|(k, n, t)| (*k, n.to_string(), t.map(str::to_string)))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_object() {
    let node = class_node("FakeObject");
    check(
        &node,
        &[
            (NodeKind::Variable, "age", Some("int")),
            (NodeKind::Variable, "name", Some("str")),
            (NodeKind::Variable, "union", Some("Union[bool, PetEnum]")),
            (NodeKind::Function, "__init__", None),
        ],
    );
    let ids: Vec<&str> = node
        .child_nodes()
        .iter()
        .map(|c| c.namespace_id())
        .collect();
    assert_eq!(ids[0], "test.FakeObject.age(int)");
    assert_eq!(ids[1], "test.FakeObject.name(str)");
}

#[test]
fn test_data_class() {
    let node = class_node("FakeInventoryItemDataClass");
    check(
        &node,
        &[
            (NodeKind::Variable, "name", Some("str")),
            (NodeKind::Variable, "quantity_on_hand", Some("int")),
            (NodeKind::Variable, "unit_price", Some("float")),
            (NodeKind::Function, "total_cost", None),
        ],
    );
    for child in node.child_nodes() {
        if let Some(var) = child.as_variable() {
            assert!(var.is_ivar(), "{} should be an ivar", var.name());
            assert!(var.field_metadata().is_some_and(|m| !m.is_empty()));
        }
    }
}

#[test]
fn test_data_class_never_renders_default_and_metadata() {
    let node = class_node("FakeInventoryItemDataClass");
    let mut view = apistub_core::tokens::ApiView::new();
    node.generate_tokens(&mut view).unwrap();
    let text = view.render_text();
    let header = "@dataclass(eq=True, frozen=False, order=False)\nclass ";
    let field = "ivar quantity_on_hand: int = field(default=0)\n";
    assert!(text.starts_with(header));
    assert!(text.contains(field));
    assert!(!text.contains("= 0"));
    assert!(!text.contains("_field_type"));
}

#[test]
fn test_typed_dict_class() {
    let node = class_node("FakeTypedDict");
    check(
        &node,
        &[
            (NodeKind::Key, "\"age\"", Some("int")),
            (NodeKind::Key, "\"name\"", Some("str")),
            (
                NodeKind::Key,
                "\"union\"",
                Some("Union[bool, tests.class_parsing_test.FakeObject, PetEnum]"),
            ),
        ],
    );

    let mut view = apistub_core::tokens::ApiView::new();
    node.generate_tokens(&mut view).unwrap();
    assert_eq!(
        view.render_text(),
        "class FakeTypedDict(TypedDict):\n    \
         \"age\": int\n    \
         \"name\": str\n    \
         \"union\": Union[bool, tests.class_parsing_test.FakeObject, PetEnum]\n"
    );
}

#[test]
fn rendering_is_deterministic() {
    let options = BuildOptions::new("test");
    let first = ModuleNode::new(&models(), &options).render().unwrap();
    let second = ModuleNode::new(&models(), &options).render().unwrap();
    assert_eq!(first.tokens(), second.tokens());
    assert_eq!(render_text(first.tokens()), render_text(second.tokens()));
}

#[test]
fn lexical_fallback_ignores_member_order() {
    let mut shuffled = models();
    for class in &mut shuffled.classes {
        class.source_ordered = false;
        class.members.reverse();
    }
    shuffled.source_ordered = false;
    shuffled.classes.reverse();
    let mut ordered = models();
    for class in &mut ordered.classes {
        class.source_ordered = false;
    }
    ordered.source_ordered = false;

    let options = BuildOptions::new("test");
    let a = ModuleNode::new(&shuffled, &options).render().unwrap();
    let b = ModuleNode::new(&ordered, &options).render().unwrap();
    assert_eq!(a.tokens(), b.tokens());
}

#[test]
fn sibling_ids_are_unique() {
    let module = ModuleNode::new(&models(), &BuildOptions::new("test"));
    let view = module.render().unwrap();
    assert!(view.duplicate_definitions().is_empty());
    let anchors = view
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::LineIdMarker)
        .count();
    assert!(anchors > 10);
}

#[test]
fn unresolved_field_does_not_block_output() {
    let json = r#"{
        "name": "pkg",
        "classes": [{
            "name": "Partial",
            "source_ordered": true,
            "members": [
                { "member": "variable", "name": "good",
                  "annotation": { "kind": "named", "name": "int" } },
                { "member": "variable", "name": "bad",
                  "annotation": { "kind": "unresolved", "raw": "Missing" } },
                { "member": "variable", "name": "also_good",
                  "annotation": { "kind": "named", "name": "str" } }
            ]
        }]
    }"#;
    let module = ModuleNode::new(
        &ModuleDescriptor::from_json_str(json).unwrap(),
        &BuildOptions::new("pkg"),
    );
    let text = module.render().unwrap().render_text();
    assert_eq!(
        text,
        "namespace pkg\n\n\
         class Partial:\n    \
         cvar good: int\n    \
         cvar bad\n    \
         cvar also_good: str\n"
    );

    let diagnostics = module.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].target_id, "pkg.Partial.bad()");

    let mut printed = Vec::new();
    module.write_errors(&mut printed).unwrap();
    assert_eq!(
        String::from_utf8(printed).unwrap(),
        "cvar: bad\n    unable to resolve type annotation 'Missing'\n"
    );
}

#[test]
fn same_name_and_type_siblings_collide() {
    let json = r#"{
        "name": "pkg",
        "classes": [{
            "name": "Twice",
            "source_ordered": true,
            "members": [
                { "member": "variable", "name": "x",
                  "annotation": { "kind": "named", "name": "int" } },
                { "member": "variable", "name": "x",
                  "annotation": { "kind": "named", "name": "int" } }
            ]
        }]
    }"#;
    let module = ModuleNode::new(
        &ModuleDescriptor::from_json_str(json).unwrap(),
        &BuildOptions::new("pkg"),
    );
    let twice = &module.child_nodes()[0];
    assert_eq!(twice.child_nodes().len(), 2);
    assert_eq!(
        twice.errors(),
        &["Duplicate variable 'x' in pkg.Twice".to_string()]
    );

    let view = module.render().unwrap();
    assert_eq!(
        view.duplicate_definitions(),
        &["pkg.Twice.x(int)".to_string()]
    );
}
