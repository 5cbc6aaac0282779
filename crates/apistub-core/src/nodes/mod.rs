//! Declaration nodes: the tree built from a reflected module.
//!
//! Every node kind shares a [`NodeBase`] (name, qualified id, owned children,
//! diagnostics) and implements [`NodeEntity`]. The concrete kinds form the
//! closed [`Node`] enum:
//!
//! | Kind | Type | Qualified id |
//! |------|------|--------------|
//! | class | [`ClassNode`] | `{parent}.{name}` |
//! | value container | [`DataClassNode`] | `{parent}.{name}` |
//! | variable / field | [`VariableNode`] | `{parent}.{name}({type})` |
//! | mapping key | [`KeyNode`] | `{parent}."{key}"({type})` |
//! | function | [`FunctionNode`] | `{parent}.{name}` |
//!
//! [`ModuleNode`] is the root of a tree and is not itself a [`Node`].
//!
//! # Lifecycle
//!
//! Nodes are built by their constructors from descriptors, children first,
//! and are immutable afterwards. The single exception is the value-container
//! field reclassification, which runs inside [`DataClassNode::new`] before
//! the node is returned. Rendering (`generate_tokens`) only takes `&self`.

mod class;
mod dataclass;
mod function;
mod key;
mod module;
mod variable;

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use tracing::warn;

use crate::descriptor::ClassDescriptor;
use crate::error::{ApiStubError, ApiStubResult};
use crate::tokens::ApiView;

pub use class::ClassNode;
pub use dataclass::DataClassNode;
pub use function::FunctionNode;
pub use key::KeyNode;
pub use module::ModuleNode;
pub use variable::VariableNode;

// ============================================================================
// Build Options
// ============================================================================

/// Options that influence how descriptors become nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Root namespace of the package being documented.
    ///
    /// Types defined under it are rendered fully qualified.
    pub pkg_root: String,
    /// Keep members with a leading underscore.
    pub include_private: bool,
}

impl BuildOptions {
    /// Options for the given package root.
    pub fn new(pkg_root: impl Into<String>) -> Self {
        BuildOptions {
            pkg_root: pkg_root.into(),
            include_private: false,
        }
    }
}

// ============================================================================
// Qualified Ids
// ============================================================================

/// Compute a node's qualified id.
///
/// Pure function of its inputs. `type_name` is part of the identity of
/// variables and keys; other kinds pass `None`.
pub fn compute_qualified_id(parent_id: &str, name: &str, type_name: Option<&str>) -> String {
    match type_name {
        Some(type_name) => format!("{}.{}({})", parent_id, name, type_name),
        None => format!("{}.{}", parent_id, name),
    }
}

// ============================================================================
// Node Base
// ============================================================================

/// Kind of a node, used to scope sibling name collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Variable,
    Key,
    Function,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Class => "class",
            NodeKind::Variable => "variable",
            NodeKind::Key => "key",
            NodeKind::Function => "function",
        };
        write!(f, "{}", s)
    }
}

/// State shared by every node kind.
#[derive(Debug, Clone)]
pub struct NodeBase {
    name: String,
    namespace_id: String,
    pub(crate) children: Vec<Node>,
    errors: Vec<String>,
}

impl NodeBase {
    /// Create a base with an already computed qualified id.
    pub fn new(name: impl Into<String>, namespace_id: impl Into<String>) -> Self {
        NodeBase {
            name: name.into(),
            namespace_id: namespace_id.into(),
            children: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified id, fixed at construction.
    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    /// Child nodes in render order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Diagnostics collected during construction.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Record a non-fatal diagnostic.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Append a child.
    ///
    /// A child whose name collides with an existing sibling of the same kind
    /// is still appended; the collision is recorded on this node.
    pub fn add_child(&mut self, node: Node) {
        let collides = self
            .children
            .iter()
            .any(|c| c.kind() == node.kind() && c.name() == node.name());
        if collides {
            warn!(
                "duplicate {} '{}' in {}",
                node.kind(),
                node.name(),
                self.namespace_id
            );
            self.errors.push(format!(
                "Duplicate {} '{}' in {}",
                node.kind(),
                node.name(),
                self.namespace_id
            ));
        }
        self.children.push(node);
    }
}

impl NodeEntity for NodeBase {
    fn base(&self) -> &NodeBase {
        self
    }

    fn scope_kind(&self) -> &'static str {
        "node"
    }
}

// ============================================================================
// Node Entity
// ============================================================================

/// One diagnostic attached to the node that recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDiagnostic {
    /// Qualified id of the node.
    pub target_id: String,
    /// Diagnostic text.
    pub text: String,
}

/// Contract shared by every node kind.
pub trait NodeEntity {
    /// Shared node state.
    fn base(&self) -> &NodeBase;

    /// Scope label used when printing diagnostics (`class`, `ivar`, ...).
    fn scope_kind(&self) -> &'static str;

    /// Append this node's tokens, then its children's, to `view`.
    ///
    /// Every concrete kind overrides this. Reaching the default is a
    /// contract violation and aborts the run.
    fn generate_tokens(&self, _view: &mut ApiView) -> ApiStubResult<()> {
        Err(ApiStubError::NotImplemented {
            kind: self.scope_kind(),
            name: self.name().to_string(),
        })
    }

    /// Declared name.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// Qualified id.
    fn namespace_id(&self) -> &str {
        self.base().namespace_id()
    }

    /// Child nodes in render order.
    fn child_nodes(&self) -> &[Node] {
        self.base().children()
    }

    /// Diagnostics recorded on this node only.
    fn errors(&self) -> &[String] {
        self.base().errors()
    }

    /// Print diagnostics of this node and its descendants.
    ///
    /// Each node with diagnostics prints `{scope}: {name}` followed by one
    /// indented line per diagnostic.
    fn write_errors(&self, w: &mut dyn Write) -> io::Result<()> {
        if !self.errors().is_empty() {
            writeln!(w, "{}: {}", self.scope_kind(), self.name())?;
            for error in self.errors() {
                writeln!(w, "    {}", error)?;
            }
        }
        for child in self.child_nodes() {
            child.write_errors(w)?;
        }
        Ok(())
    }

    /// Collect diagnostics of this node and its descendants in tree order.
    fn collect_diagnostics(&self, out: &mut Vec<NodeDiagnostic>) {
        for error in self.errors() {
            out.push(NodeDiagnostic {
                target_id: self.namespace_id().to_string(),
                text: error.clone(),
            });
        }
        for child in self.child_nodes() {
            child.collect_diagnostics(out);
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A child node of any kind.
#[derive(Debug, Clone)]
pub enum Node {
    Class(ClassNode),
    DataClass(DataClassNode),
    Variable(VariableNode),
    Key(KeyNode),
    Function(FunctionNode),
}

impl Node {
    /// Kind used for sibling collision checks.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Class(_) | Node::DataClass(_) => NodeKind::Class,
            Node::Variable(_) => NodeKind::Variable,
            Node::Key(_) => NodeKind::Key,
            Node::Function(_) => NodeKind::Function,
        }
    }

    fn entity(&self) -> &dyn NodeEntity {
        match self {
            Node::Class(node) => node,
            Node::DataClass(node) => node,
            Node::Variable(node) => node,
            Node::Key(node) => node,
            Node::Function(node) => node,
        }
    }

    /// The variable node, if this is one.
    pub fn as_variable(&self) -> Option<&VariableNode> {
        match self {
            Node::Variable(node) => Some(node),
            _ => None,
        }
    }

    /// The key node, if this is one.
    pub fn as_key(&self) -> Option<&KeyNode> {
        match self {
            Node::Key(node) => Some(node),
            _ => None,
        }
    }
}

impl NodeEntity for Node {
    fn base(&self) -> &NodeBase {
        self.entity().base()
    }

    fn scope_kind(&self) -> &'static str {
        self.entity().scope_kind()
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        self.entity().generate_tokens(view)
    }
}

/// Build the node for a class descriptor, choosing the value-container
/// specialization when the descriptor is one.
pub fn build_class(parent_id: &str, desc: &ClassDescriptor, options: &BuildOptions) -> Node {
    if desc.kind.is_dataclass() {
        Node::DataClass(DataClassNode::new(parent_id, desc, options))
    } else {
        Node::Class(ClassNode::new(parent_id, desc, options))
    }
}

// ============================================================================
// Tests
// ============================================================================
