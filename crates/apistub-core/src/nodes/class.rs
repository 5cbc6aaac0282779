//! Class node: a class-like declaration and its public members.
//!
//! # Member discovery
//!
//! The reflected namespace is enumerated exactly once. Each public member is
//! classified (variable, method, nested class) and built with this class's
//! qualified id as parent. Structural mapping types contribute one key node
//! per declared key instead of variables.
//!
//! # Ordering
//!
//! 1. Source order when the descriptor preserves it, otherwise case-sensitive
//!    lexical order of names.
//! 2. Stable grouping: fields and keys, then methods, then nested classes.

use tracing::{debug, info};

use crate::descriptor::{ClassDescriptor, ClassKind, MemberDescriptor};
use crate::error::ApiStubResult;
use crate::tokens::ApiView;
use crate::types::TypeExpr;

use super::{
    build_class, compute_qualified_id, BuildOptions, FunctionNode, KeyNode, Node, NodeBase,
    NodeEntity, VariableNode,
};

/// Dunder methods that are part of a public surface.
const PUBLIC_DUNDER_METHODS: &[&str] = &[
    "__init__",
    "__call__",
    "__enter__",
    "__exit__",
    "__aenter__",
    "__aexit__",
    "__iter__",
    "__aiter__",
    "__next__",
    "__anext__",
    "__len__",
    "__contains__",
    "__getitem__",
    "__setitem__",
    "__delitem__",
    "__eq__",
    "__ne__",
    "__lt__",
    "__le__",
    "__gt__",
    "__ge__",
    "__hash__",
];

/// A class declaration.
#[derive(Debug, Clone)]
pub struct ClassNode {
    base: NodeBase,
    bases: Vec<TypeExpr>,
    pkg_root: String,
}

impl ClassNode {
    /// Build a class node and all of its children.
    pub fn new(parent_id: &str, desc: &ClassDescriptor, options: &BuildOptions) -> Self {
        let namespace_id = compute_qualified_id(parent_id, &desc.name, None);
        debug!("building class {}", namespace_id);
        let mut base = NodeBase::new(desc.name.as_str(), namespace_id);

        let mut bases = Vec::with_capacity(desc.bases.len());
        for expr in &desc.bases {
            match expr.render(&options.pkg_root) {
                Ok(_) => bases.push(expr.clone()),
                Err(err) => base.add_error(format!("base class: {}", err)),
            }
        }

        let mut node = ClassNode {
            base,
            bases,
            pkg_root: options.pkg_root.clone(),
        };
        node.discover_children(desc, options);
        node
    }

    fn discover_children(&mut self, desc: &ClassDescriptor, options: &BuildOptions) {
        let id = self.base.namespace_id().to_string();
        let is_typed_dict = matches!(desc.kind, ClassKind::TypedDict { .. });

        let mut members: Vec<&MemberDescriptor> = desc
            .members
            .iter()
            .filter(|m| is_public_member(m, options))
            .filter(|m| !(is_typed_dict && matches!(m, MemberDescriptor::Variable { .. })))
            .collect();
        if !desc.source_ordered {
            members.sort_by(|a, b| a.name().cmp(b.name()));
        }
        members.sort_by_key(|m| member_rank(m));

        let mut children = Vec::with_capacity(members.len());
        if let ClassKind::TypedDict { keys } = &desc.kind {
            for key in keys {
                children.push(Node::Key(KeyNode::new(&id, key, options)));
            }
        }
        for member in members {
            let child = match member {
                MemberDescriptor::Variable {
                    name,
                    annotation,
                    value,
                    instance,
                } => Node::Variable(VariableNode::new(
                    &id,
                    name,
                    annotation.as_ref(),
                    value.clone(),
                    *instance,
                    options,
                )),
                MemberDescriptor::Function(function) => {
                    Node::Function(FunctionNode::new(&id, function, options))
                }
                MemberDescriptor::Class(class) => build_class(&id, class, options),
            };
            children.push(child);
        }

        for child in children {
            self.base.add_child(child);
        }
    }

    /// Mutable access to the children, for the value-container pass.
    pub(crate) fn children_mut(&mut self) -> &mut [Node] {
        &mut self.base.children
    }

    /// Emit `class Name(Bases):` and the indented children.
    pub(crate) fn generate_class_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        let id = self.namespace_id();
        info!("Processing class {}", id);

        view.add_keyword("class", false, true);
        view.add_line_marker(id);
        view.add_text(Some(id), self.name());
        if !self.bases.is_empty() {
            view.add_punctuation("(", false, false);
            for (i, expr) in self.bases.iter().enumerate() {
                if i > 0 {
                    view.add_punctuation(",", false, true);
                }
                view.add_type(expr, &self.pkg_root);
            }
            view.add_punctuation(")", false, false);
        }
        view.add_punctuation(":", false, false);
        view.add_newline();

        view.begin_group();
        for child in self.child_nodes() {
            view.add_whitespace();
            child.generate_tokens(view)?;
        }
        view.end_group();
        Ok(())
    }
}

/// Group rank: fields before methods before nested classes.
fn member_rank(member: &MemberDescriptor) -> u8 {
    match member {
        MemberDescriptor::Variable { .. } => 0,
        MemberDescriptor::Function(_) => 1,
        MemberDescriptor::Class(_) => 2,
    }
}

fn is_public_member(member: &MemberDescriptor, options: &BuildOptions) -> bool {
    let name = member.name();
    if name.starts_with("__") && name.ends_with("__") {
        return matches!(member, MemberDescriptor::Function(_))
            && PUBLIC_DUNDER_METHODS.contains(&name);
    }
    !name.starts_with('_') || options.include_private
}

impl NodeEntity for ClassNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn scope_kind(&self) -> &'static str {
        "class"
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        self.generate_class_tokens(view)
    }
}
