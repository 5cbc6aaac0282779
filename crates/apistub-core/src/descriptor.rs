//! Descriptor model: the pre-collected reflection data handed to the node builders.
//!
//! The reflection/discovery layer lives outside this crate. Whatever performs
//! the introspection (a live interpreter, a source analyzer, an explicit
//! registration step) hands over a [`ModuleDescriptor`] that describes every
//! declaration by name, kind, type expression, default and metadata.
//!
//! Descriptors are plain `serde` data so they can be produced by any tool and
//! stored as JSON:
//!
//! ```
//! use apistub_core::descriptor::ModuleDescriptor;
//!
//! let module = ModuleDescriptor::from_json_str(r#"{
//!     "name": "pets",
//!     "classes": [{
//!         "name": "Pet",
//!         "members": [
//!             { "member": "variable", "name": "name",
//!               "annotation": { "kind": "named", "name": "str" } }
//!         ]
//!     }]
//! }"#).unwrap();
//! assert_eq!(module.classes[0].name, "Pet");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ApiStubError, ApiStubResult};
use crate::types::TypeExpr;

// ============================================================================
// Module
// ============================================================================

/// All public declarations discovered in one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Dotted module name (e.g., `azure.pets.models`).
    pub name: String,
    /// Top-level classes.
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    /// Top-level functions.
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
    /// Whether `classes` and `functions` are in source declaration order.
    #[serde(default)]
    pub source_ordered: bool,
}

impl ModuleDescriptor {
    /// Parse a descriptor set from a JSON string.
    pub fn from_json_str(json: &str) -> ApiStubResult<Self> {
        let module: ModuleDescriptor = serde_json::from_str(json)?;
        module.validate()?;
        Ok(module)
    }

    /// Load a descriptor set from a JSON file.
    pub fn load(path: &Path) -> ApiStubResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ApiStubError::io(path.display(), e))?;
        Self::from_json_str(&json)
    }

    /// Reject descriptors that violate the node model (empty names).
    pub fn validate(&self) -> ApiStubResult<()> {
        if self.name.is_empty() {
            return Err(ApiStubError::invalid_descriptor("module name is empty"));
        }
        for class in &self.classes {
            class.validate()?;
        }
        for function in &self.functions {
            function.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A class-like declaration and its reflected namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Declared class name.
    pub name: String,
    /// Base classes, in declaration order.
    #[serde(default)]
    pub bases: Vec<TypeExpr>,
    /// Members of the class namespace (name -> descriptor).
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Whether `members` preserves source declaration order.
    ///
    /// When false the builder falls back to case-sensitive lexical order.
    #[serde(default)]
    pub source_ordered: bool,
    /// Shape of the declaration.
    #[serde(default)]
    pub kind: ClassKind,
}

impl ClassDescriptor {
    /// Create a plain class descriptor with no members.
    pub fn new(name: impl Into<String>) -> Self {
        ClassDescriptor {
            name: name.into(),
            bases: Vec::new(),
            members: Vec::new(),
            source_ordered: false,
            kind: ClassKind::Plain,
        }
    }

    fn validate(&self) -> ApiStubResult<()> {
        if self.name.is_empty() {
            return Err(ApiStubError::invalid_descriptor("class name is empty"));
        }
        for member in &self.members {
            match member {
                MemberDescriptor::Variable { name, .. } if name.is_empty() => {
                    return Err(ApiStubError::invalid_descriptor(format!(
                        "variable with empty name in class '{}'",
                        self.name
                    )));
                }
                MemberDescriptor::Function(function) => function.validate()?,
                MemberDescriptor::Class(class) => class.validate()?,
                MemberDescriptor::Variable { .. } => {}
            }
        }
        if let ClassKind::TypedDict { keys } = &self.kind {
            if keys.iter().any(|k| k.key.is_empty()) {
                return Err(ApiStubError::invalid_descriptor(format!(
                    "typed dict '{}' declares an empty key",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Shape of a class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassKind {
    /// An ordinary class.
    #[default]
    Plain,
    /// A structural mapping type: a fixed set of named keys with types.
    TypedDict {
        /// Keys in declaration order.
        keys: Vec<KeyDescriptor>,
    },
    /// An auto-generated value container.
    Dataclass {
        /// Container-level generation options (e.g., `frozen`, `order`).
        #[serde(default)]
        params: Vec<Attribute>,
        /// Per-field generation descriptors.
        #[serde(default)]
        fields: Vec<FieldDescriptor>,
    },
}

impl ClassKind {
    /// Whether the declaration is a value container.
    pub fn is_dataclass(&self) -> bool {
        matches!(self, ClassKind::Dataclass { .. })
    }
}

/// One key of a structural mapping type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// The unquoted key literal.
    pub key: String,
    /// Declared type of the key's value.
    pub annotation: TypeExpr,
}

/// Per-field generation descriptor of a value container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name; matched against the variables discovered in the namespace.
    pub name: String,
    /// Every attribute of the descriptor, internal ones included.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// One (name, value) pair of reflected metadata.
///
/// Values arrive already rendered to their display text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Rendered attribute value.
    pub value: String,
}

impl Attribute {
    /// Create an attribute pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Internal attributes start with an underscore and are never rendered.
    pub fn is_internal(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// Enumerate the public attribute pairs of a descriptor.
///
/// Enumeration is sorted by name, so the result does not depend on the order
/// the reflection layer happened to list the attributes in.
pub fn public_attributes(attributes: &[Attribute]) -> Vec<(String, String)> {
    let mut public: Vec<&Attribute> = attributes.iter().filter(|a| !a.is_internal()).collect();
    public.sort();
    public
        .into_iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect()
}

// ============================================================================
// Members
// ============================================================================

/// One member of a reflected class namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberDescriptor {
    /// A class or instance variable.
    Variable {
        /// Variable name.
        name: String,
        /// Type annotation, if declared or inferred.
        #[serde(default)]
        annotation: Option<TypeExpr>,
        /// Literal default value.
        #[serde(default)]
        value: Option<LiteralValue>,
        /// Whether reflection classified the variable as instance-scoped.
        #[serde(default)]
        instance: bool,
    },
    /// A method.
    Function(FunctionDescriptor),
    /// A nested class.
    Class(ClassDescriptor),
}

impl MemberDescriptor {
    /// Declared name of the member.
    pub fn name(&self) -> &str {
        match self {
            MemberDescriptor::Variable { name, .. } => name,
            MemberDescriptor::Function(function) => &function.name,
            MemberDescriptor::Class(class) => &class.name,
        }
    }
}

/// A literal default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// A string literal, rendered quoted.
    String(String),
    /// Any other literal expression, rendered verbatim.
    Expr(String),
}

// ============================================================================
// Functions
// ============================================================================

/// A function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Function name.
    pub name: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    /// Return annotation.
    #[serde(default)]
    pub returns: Option<TypeExpr>,
    /// Whether the function is a coroutine.
    #[serde(default)]
    pub is_async: bool,
    /// How the function is bound.
    #[serde(default)]
    pub kind: FunctionKind,
}

impl FunctionDescriptor {
    /// Create a function with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        FunctionDescriptor {
            name: name.into(),
            params: Vec::new(),
            returns: None,
            is_async: false,
            kind: FunctionKind::Function,
        }
    }

    fn validate(&self) -> ApiStubResult<()> {
        if self.name.is_empty() {
            return Err(ApiStubError::invalid_descriptor("function name is empty"));
        }
        Ok(())
    }
}

/// How a function is bound to its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Free function or plain instance method.
    #[default]
    Function,
    /// `@classmethod`.
    ClassMethod,
    /// `@staticmethod`.
    StaticMethod,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Parameter name.
    pub name: String,
    /// Type annotation.
    #[serde(default)]
    pub annotation: Option<TypeExpr>,
    /// Default value.
    #[serde(default)]
    pub default: Option<LiteralValue>,
    /// Parameter kind.
    #[serde(default)]
    pub kind: ParamKind,
}

/// Kind of parameter in a function signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Positional-or-keyword parameter.
    #[default]
    Regular,
    /// Positional-only parameter (before `/`).
    PositionalOnly,
    /// Keyword-only parameter (after `*` or `*args`).
    KeywordOnly,
    /// `*args`.
    VarArgs,
    /// `**kwargs`.
    KwArgs,
}

// ============================================================================
// Tests
// ============================================================================
