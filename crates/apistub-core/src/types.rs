//! Type expressions attached to variables, keys, parameters and base lists.
//!
//! A [`TypeExpr`] is the structured form of an annotation as reported by the
//! reflection layer. Rendering produces the canonical text that is used both
//! for display and as part of a node's qualified id, so rendering must be a
//! pure function of the expression and the package root namespace.
//!
//! # Examples
//!
//! ```
//! use apistub_core::types::TypeExpr;
//!
//! // Union[bool, PetEnum]
//! let union = TypeExpr::union(vec![
//!     TypeExpr::named("bool"),
//!     TypeExpr::named_in("PetEnum", "pets.enums"),
//! ]);
//! assert_eq!(union.render("azure").unwrap(), "Union[bool, PetEnum]");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A type annotation that cannot be turned into a renderable expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to resolve type annotation '{raw}'")]
pub struct TypeResolutionError {
    /// The annotation as the reflection layer saw it.
    pub raw: String,
}

/// Structured type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// A named type (class, builtin, generic alias).
    Named {
        /// The bare type name.
        name: String,
        /// Defining module, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        module: Option<String>,
        /// Generic type arguments, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeExpr>,
    },
    /// A union of types.
    Union {
        /// The member types.
        members: Vec<TypeExpr>,
    },
    /// An optional type.
    Optional {
        /// The inner type.
        inner: Box<TypeExpr>,
    },
    /// Text the reflection layer already rendered (e.g., a forward reference).
    Literal {
        /// Verbatim text.
        text: String,
    },
    /// An annotation the reflection layer could not resolve.
    Unresolved {
        /// The annotation as written.
        raw: String,
    },
}

impl TypeExpr {
    /// Create a named type without module or arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            module: None,
            args: vec![],
        }
    }

    /// Create a named type defined in `module`.
    pub fn named_in(name: impl Into<String>, module: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            module: Some(module.into()),
            args: vec![],
        }
    }

    /// Create a generic named type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            module: None,
            args,
        }
    }

    /// Create a union type.
    pub fn union(members: Vec<TypeExpr>) -> Self {
        TypeExpr::Union { members }
    }

    /// Create an optional type.
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional {
            inner: Box::new(inner),
        }
    }

    /// Create an unresolved annotation.
    pub fn unresolved(raw: impl Into<String>) -> Self {
        TypeExpr::Unresolved { raw: raw.into() }
    }

    /// Render the canonical text of this expression.
    ///
    /// Types defined under `pkg_root` are rendered fully qualified so they stay
    /// addressable; everything else renders by bare name.
    pub fn render(&self, pkg_root: &str) -> Result<String, TypeResolutionError> {
        let mut out = String::new();
        self.render_into(pkg_root, &mut out)?;
        Ok(out)
    }

    fn render_into(&self, pkg_root: &str, out: &mut String) -> Result<(), TypeResolutionError> {
        match self {
            TypeExpr::Named { args, .. } => {
                out.push_str(&self.display_name(pkg_root).unwrap_or_default());
                render_args(args, pkg_root, out)?;
            }
            TypeExpr::Union { members } => {
                out.push_str("Union");
                render_args(members, pkg_root, out)?;
            }
            TypeExpr::Optional { inner } => {
                out.push_str("Optional[");
                inner.render_into(pkg_root, out)?;
                out.push(']');
            }
            TypeExpr::Literal { text } => out.push_str(text),
            TypeExpr::Unresolved { raw } => {
                return Err(TypeResolutionError { raw: raw.clone() });
            }
        }
        Ok(())
    }

    /// Display name of a named type, qualified when package-local.
    ///
    /// Returns `None` for every other variant.
    pub fn display_name(&self, pkg_root: &str) -> Option<String> {
        match self {
            TypeExpr::Named { name, module, .. } => Some(match module {
                Some(module) if is_package_local(module, pkg_root) => {
                    format!("{}.{}", module, name)
                }
                _ => name.clone(),
            }),
            _ => None,
        }
    }

    /// Whether this is a named type defined under `pkg_root`.
    pub fn is_package_local(&self, pkg_root: &str) -> bool {
        match self {
            TypeExpr::Named {
                module: Some(module),
                ..
            } => is_package_local(module, pkg_root),
            _ => false,
        }
    }
}

fn render_args(
    args: &[TypeExpr],
    pkg_root: &str,
    out: &mut String,
) -> Result<(), TypeResolutionError> {
    if args.is_empty() {
        return Ok(());
    }
    out.push('[');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        arg.render_into(pkg_root, out)?;
    }
    out.push(']');
    Ok(())
}

/// Module-prefix test used to decide whether a type is package-local.
fn is_package_local(module: &str, pkg_root: &str) -> bool {
    !pkg_root.is_empty() && module.starts_with(pkg_root)
}

// ============================================================================
// Tests
// ============================================================================
