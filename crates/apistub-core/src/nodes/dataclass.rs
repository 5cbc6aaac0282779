//! Value-container node: a class whose fields are generated from metadata.
//!
//! Fields of a value container look like class attributes with defaults, so
//! reflection reports them as class-scoped. Every instance gets its own
//! value, though, so after the class children are built each field that has
//! a generation descriptor is reclassified as instance-scoped and decorated
//! with the descriptor's public attributes.

use tracing::debug;

use crate::descriptor::{public_attributes, ClassDescriptor, ClassKind};
use crate::error::ApiStubResult;
use crate::tokens::ApiView;

use super::{BuildOptions, ClassNode, Node, NodeBase, NodeEntity, VariableNode};

/// Marker emitted before the class header.
pub const DATACLASS_MARKER: &str = "@dataclass";

/// A value-container class.
#[derive(Debug, Clone)]
pub struct DataClassNode {
    class: ClassNode,
    params: Vec<(String, String)>,
}

impl DataClassNode {
    /// Build the class, then reclassify its container fields.
    pub fn new(parent_id: &str, desc: &ClassDescriptor, options: &BuildOptions) -> Self {
        let mut class = ClassNode::new(parent_id, desc, options);
        let class_id = class.namespace_id().to_string();
        let params = match &desc.kind {
            ClassKind::Dataclass { params, fields } => {
                for field in fields {
                    let attributes = public_attributes(&field.attributes);
                    match find_variable(class.children_mut(), &field.name) {
                        Some(var) => var.mark_container_field(attributes),
                        None => debug!(
                            "no field '{}' discovered in {}, skipping",
                            field.name, class_id
                        ),
                    }
                }
                public_attributes(params)
            }
            _ => Vec::new(),
        };
        DataClassNode { class, params }
    }

    /// Container-level configuration pairs.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

fn find_variable<'a>(children: &'a mut [Node], name: &str) -> Option<&'a mut VariableNode> {
    children.iter_mut().find_map(|child| match child {
        Node::Variable(var) if var.name() == name => Some(var),
        _ => None,
    })
}

impl NodeEntity for DataClassNode {
    fn base(&self) -> &NodeBase {
        self.class.base()
    }

    fn scope_kind(&self) -> &'static str {
        "class"
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        let id = self.namespace_id();
        view.add_keyword(DATACLASS_MARKER, false, false);
        view.add_attribute_pairs(Some(id), &self.params);
        view.add_newline();
        view.add_whitespace();
        self.class.generate_class_tokens(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        Attribute, FieldDescriptor, FunctionDescriptor, LiteralValue, MemberDescriptor,
    };
    use crate::types::TypeExpr;

    fn inventory_item() -> ClassDescriptor {
        let mut desc = ClassDescriptor::new("FakeInventoryItemDataClass");
        desc.source_ordered = true;
        desc.members = vec![
            MemberDescriptor::Function(FunctionDescriptor::new("total_cost")),
            MemberDescriptor::Variable {
                name: "name".to_string(),
                annotation: Some(TypeExpr::named("str")),
                value: None,
                instance: false,
            },
            MemberDescriptor::Variable {
                name: "quantity_on_hand".to_string(),
                annotation: Some(TypeExpr::named("int")),
                value: Some(LiteralValue::Expr("0".to_string())),
                instance: false,
            },
        ];
        desc.kind = ClassKind::Dataclass {
            params: vec![
                Attribute::new("frozen", "False"),
                Attribute::new("eq", "True"),
                Attribute::new("_internal", "x"),
            ],
            fields: vec![
                FieldDescriptor {
                    name: "name".to_string(),
                    attributes: vec![Attribute::new("repr", "True")],
                },
                FieldDescriptor {
                    name: "quantity_on_hand".to_string(),
                    attributes: vec![
                        Attribute::new("default", "0"),
                        Attribute::new("_field_type", "_FIELD"),
                    ],
                },
                FieldDescriptor {
                    name: "vanished".to_string(),
                    attributes: vec![Attribute::new("repr", "True")],
                },
            ],
        };
        desc
    }

    #[test]
    fn fields_are_reclassified_as_instance_variables() {
        let node = DataClassNode::new("pkg", &inventory_item(), &BuildOptions::new("pkg"));
        let vars: Vec<&VariableNode> = node
            .child_nodes()
            .iter()
            .filter_map(Node::as_variable)
            .collect();
        assert_eq!(vars.len(), 2);
        assert!(vars.iter().all(|v| v.is_ivar()));
        assert_eq!(
            vars[1].field_metadata(),
            Some(&[("default".to_string(), "0".to_string())][..])
        );
        assert!(node.errors().is_empty());
    }

    #[test]
    fn params_are_public_and_sorted() {
        let node = DataClassNode::new("pkg", &inventory_item(), &BuildOptions::new("pkg"));
        assert_eq!(
            node.params(),
            &[
                ("eq".to_string(), "True".to_string()),
                ("frozen".to_string(), "False".to_string())
            ]
        );
    }

    #[test]
    fn renders_marker_then_class() {
        let node = DataClassNode::new("pkg", &inventory_item(), &BuildOptions::new("pkg"));
        let mut view = ApiView::new();
        node.generate_tokens(&mut view).unwrap();
        assert_eq!(
            view.render_text(),
            "@dataclass(eq=True, frozen=False)\n\
             class FakeInventoryItemDataClass:\n    \
             ivar name: str = field(repr=True)\n    \
             ivar quantity_on_hand: int = field(default=0)\n    \
             def total_cost()\n"
        );
    }

    #[test]
    fn empty_config_still_has_parentheses() {
        let mut desc = ClassDescriptor::new("Bare");
        desc.kind = ClassKind::Dataclass {
            params: vec![],
            fields: vec![],
        };
        let node = DataClassNode::new("pkg", &desc, &BuildOptions::new("pkg"));
        let mut view = ApiView::new();
        node.generate_tokens(&mut view).unwrap();
        assert_eq!(view.render_text(), "@dataclass()\nclass Bare:\n");
    }
}
