//! Key node: one key of a structural mapping type.

use crate::descriptor::KeyDescriptor;
use crate::error::ApiStubResult;
use crate::tokens::ApiView;
use crate::types::TypeExpr;

use super::{compute_qualified_id, BuildOptions, NodeBase, NodeEntity};

/// A `"key": type` declaration.
#[derive(Debug, Clone)]
pub struct KeyNode {
    base: NodeBase,
    type_expr: Option<TypeExpr>,
    type_name: Option<String>,
    pkg_root: String,
}

impl KeyNode {
    /// Build a key node under `parent_id`. The node name is the quoted key.
    pub fn new(parent_id: &str, key: &KeyDescriptor, options: &BuildOptions) -> Self {
        let name = format!("\"{}\"", key.key);
        let (type_expr, type_name, error) = match key.annotation.render(&options.pkg_root) {
            Ok(rendered) => (Some(key.annotation.clone()), Some(rendered), None),
            Err(err) => (None, None, Some(err.to_string())),
        };
        let namespace_id =
            compute_qualified_id(parent_id, &name, Some(type_name.as_deref().unwrap_or("")));
        let mut base = NodeBase::new(name, namespace_id);
        if let Some(error) = error {
            base.add_error(error);
        }
        KeyNode {
            base,
            type_expr,
            type_name,
            pkg_root: options.pkg_root.clone(),
        }
    }

    /// Rendered type expression, if resolved.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

impl NodeEntity for KeyNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn scope_kind(&self) -> &'static str {
        "key"
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        view.add_text(Some(self.namespace_id()), self.name());
        if let Some(expr) = &self.type_expr {
            view.add_punctuation(":", false, true);
            view.add_type(expr, &self.pkg_root);
        }
        view.add_newline();
        Ok(())
    }
}
