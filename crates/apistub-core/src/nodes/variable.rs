//! Variable node: one class variable, instance variable or container field.

use crate::descriptor::LiteralValue;
use crate::error::ApiStubResult;
use crate::tokens::ApiView;
use crate::types::TypeExpr;

use super::{compute_qualified_id, BuildOptions, NodeBase, NodeEntity};

/// A named, typed value declared in a class.
#[derive(Debug, Clone)]
pub struct VariableNode {
    base: NodeBase,
    type_expr: Option<TypeExpr>,
    type_name: Option<String>,
    pkg_root: String,
    is_ivar: bool,
    value: Option<LiteralValue>,
    field_metadata: Option<Vec<(String, String)>>,
}

impl VariableNode {
    /// Build a variable node under `parent_id`.
    ///
    /// An annotation that cannot be resolved is recorded as a diagnostic and
    /// the variable is treated as untyped.
    pub fn new(
        parent_id: &str,
        name: &str,
        annotation: Option<&TypeExpr>,
        value: Option<LiteralValue>,
        is_ivar: bool,
        options: &BuildOptions,
    ) -> Self {
        let mut errors = Vec::new();
        let (type_expr, type_name) = match annotation.map(|a| (a, a.render(&options.pkg_root))) {
            Some((expr, Ok(rendered))) => (Some(expr.clone()), Some(rendered)),
            Some((_, Err(err))) => {
                errors.push(err.to_string());
                (None, None)
            }
            None => (None, None),
        };

        let namespace_id =
            compute_qualified_id(parent_id, name, Some(type_name.as_deref().unwrap_or("")));
        let mut base = NodeBase::new(name, namespace_id);
        for error in errors {
            base.add_error(error);
        }

        VariableNode {
            base,
            type_expr,
            type_name,
            pkg_root: options.pkg_root.clone(),
            is_ivar,
            value,
            field_metadata: None,
        }
    }

    /// Rendered type expression, if resolved.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Whether the variable is instance-scoped.
    pub fn is_ivar(&self) -> bool {
        self.is_ivar
    }

    /// Literal default value.
    pub fn value(&self) -> Option<&LiteralValue> {
        self.value.as_ref()
    }

    /// Generation metadata supplied by the owning value container.
    pub fn field_metadata(&self) -> Option<&[(String, String)]> {
        self.field_metadata.as_deref()
    }

    fn has_field_metadata(&self) -> bool {
        self.field_metadata.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Reclassify as an instance field of a value container.
    ///
    /// Only called by [`super::DataClassNode::new`] while the container is
    /// being built.
    pub(crate) fn mark_container_field(&mut self, metadata: Vec<(String, String)>) {
        self.is_ivar = true;
        self.field_metadata = Some(metadata);
    }
}

impl NodeEntity for VariableNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn scope_kind(&self) -> &'static str {
        if self.is_ivar {
            "ivar"
        } else {
            "cvar"
        }
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        let id = self.namespace_id();
        view.add_keyword(self.scope_kind(), false, true);
        view.add_line_marker(id);
        view.add_text(Some(id), self.name());

        if let Some(expr) = &self.type_expr {
            view.add_punctuation(":", false, true);
            view.add_type(expr, &self.pkg_root);
        }

        if self.has_field_metadata() {
            view.add_punctuation("=", true, true);
            view.add_text(None, "field");
            view.add_attribute_pairs(Some(id), self.field_metadata().unwrap_or_default());
        } else if let Some(value) = &self.value {
            view.add_punctuation("=", true, true);
            match value {
                LiteralValue::String(s) => view.add_string_literal(s),
                LiteralValue::Expr(e) => view.add_literal(e),
            }
        }

        view.add_newline();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
