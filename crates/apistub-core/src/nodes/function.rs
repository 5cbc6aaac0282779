//! Function node: a method or module-level function.

use crate::descriptor::{FunctionDescriptor, FunctionKind, LiteralValue, ParamKind};
use crate::error::ApiStubResult;
use crate::tokens::ApiView;
use crate::types::TypeExpr;

use super::{compute_qualified_id, BuildOptions, NodeBase, NodeEntity};

/// A parameter whose annotation has already been resolved.
#[derive(Debug, Clone)]
struct Param {
    name: String,
    kind: ParamKind,
    annotation: Option<TypeExpr>,
    default: Option<LiteralValue>,
}

/// A function declaration.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    base: NodeBase,
    params: Vec<Param>,
    returns: Option<TypeExpr>,
    is_async: bool,
    kind: FunctionKind,
    pkg_root: String,
}

impl FunctionNode {
    /// Build a function node under `parent_id`.
    pub fn new(parent_id: &str, desc: &FunctionDescriptor, options: &BuildOptions) -> Self {
        let namespace_id = compute_qualified_id(parent_id, &desc.name, None);
        let mut base = NodeBase::new(desc.name.as_str(), namespace_id);

        let mut params = Vec::with_capacity(desc.params.len());
        for param in &desc.params {
            let annotation = match &param.annotation {
                Some(expr) => match expr.render(&options.pkg_root) {
                    Ok(_) => Some(expr.clone()),
                    Err(err) => {
                        base.add_error(format!("parameter '{}': {}", param.name, err));
                        None
                    }
                },
                None => None,
            };
            params.push(Param {
                name: param.name.clone(),
                kind: param.kind,
                annotation,
                default: param.default.clone(),
            });
        }

        let returns = match &desc.returns {
            Some(expr) => match expr.render(&options.pkg_root) {
                Ok(_) => Some(expr.clone()),
                Err(err) => {
                    base.add_error(format!("return type: {}", err));
                    None
                }
            },
            None => None,
        };

        FunctionNode {
            base,
            params,
            returns,
            is_async: desc.is_async,
            kind: desc.kind,
            pkg_root: options.pkg_root.clone(),
        }
    }

    /// Whether the function is a coroutine.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    fn add_params(&self, view: &mut ApiView) {
        let has_var_args = self.params.iter().any(|p| p.kind == ParamKind::VarArgs);
        let mut first = true;
        let mut star_emitted = false;

        for (i, param) in self.params.iter().enumerate() {
            if param.kind == ParamKind::KeywordOnly && !has_var_args && !star_emitted {
                separator(view, &mut first);
                view.add_punctuation("*", false, false);
                star_emitted = true;
            }

            separator(view, &mut first);
            match param.kind {
                ParamKind::VarArgs => view.add_punctuation("*", false, false),
                ParamKind::KwArgs => view.add_punctuation("**", false, false),
                _ => {}
            }
            view.add_text(None, &param.name);
            if let Some(expr) = &param.annotation {
                view.add_punctuation(":", false, true);
                view.add_type(expr, &self.pkg_root);
            }
            if let Some(default) = &param.default {
                view.add_punctuation("=", true, true);
                match default {
                    LiteralValue::String(s) => view.add_string_literal(s),
                    LiteralValue::Expr(e) => view.add_literal(e),
                }
            }

            let next_is_positional_only = self
                .params
                .get(i + 1)
                .is_some_and(|p| p.kind == ParamKind::PositionalOnly);
            if param.kind == ParamKind::PositionalOnly && !next_is_positional_only {
                separator(view, &mut first);
                view.add_punctuation("/", false, false);
            }
        }
    }
}

fn separator(view: &mut ApiView, first: &mut bool) {
    if !*first {
        view.add_punctuation(",", false, true);
    }
    *first = false;
}

impl NodeEntity for FunctionNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn scope_kind(&self) -> &'static str {
        "def"
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        let decorator = match self.kind {
            FunctionKind::ClassMethod => Some("@classmethod"),
            FunctionKind::StaticMethod => Some("@staticmethod"),
            FunctionKind::Function => None,
        };
        if let Some(decorator) = decorator {
            view.add_keyword(decorator, false, false);
            view.add_newline();
            view.add_whitespace();
        }

        let id = self.namespace_id();
        if self.is_async {
            view.add_keyword("async", false, true);
        }
        view.add_keyword("def", false, true);
        view.add_line_marker(id);
        view.add_text(Some(id), self.name());
        view.add_punctuation("(", false, false);
        self.add_params(view);
        view.add_punctuation(")", false, false);
        if let Some(returns) = &self.returns {
            view.add_punctuation("->", true, true);
            view.add_type(returns, &self.pkg_root);
        }
        view.add_newline();
        Ok(())
    }
}
