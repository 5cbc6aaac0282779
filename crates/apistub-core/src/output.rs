//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same descriptor set -> byte-identical output
//! 3. **Nullable vs absent:** Absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{ApiStubError, OutputErrorCode};
use crate::nodes::{ModuleNode, NodeDiagnostic, NodeEntity};
use crate::tokens::{ApiView, Token};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Diagnostics
// ============================================================================

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// Accepted limitation worth knowing about.
    Info,
    /// Something in the surface could not be rendered faithfully.
    Warning,
}

/// Diagnostic attached to a token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Qualified id of the node the diagnostic belongs to.
    pub target_id: String,
    /// Human-readable message.
    pub text: String,
    /// Severity.
    pub level: DiagnosticLevel,
}

impl Diagnostic {
    /// Create an informational diagnostic.
    pub fn info(target_id: impl Into<String>, text: impl Into<String>) -> Self {
        Diagnostic {
            target_id: target_id.into(),
            text: text.into(),
            level: DiagnosticLevel::Info,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(target_id: impl Into<String>, text: impl Into<String>) -> Self {
        Diagnostic {
            target_id: target_id.into(),
            text: text.into(),
            level: DiagnosticLevel::Warning,
        }
    }
}

impl From<NodeDiagnostic> for Diagnostic {
    fn from(d: NodeDiagnostic) -> Self {
        Diagnostic::warning(d.target_id, d.text)
    }
}

// ============================================================================
// Documents
// ============================================================================

/// The rendered public surface of one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDocument {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Module name.
    pub name: String,
    /// Root namespace of the package.
    pub package_name: String,
    /// Token stream in emission order.
    pub tokens: Vec<Token>,
    /// Node diagnostics (warnings) plus duplicate-id notes (info).
    pub diagnostics: Vec<Diagnostic>,
}

impl ApiDocument {
    /// Assemble a document from a built tree and the view it rendered into.
    pub fn new(module: &ModuleNode, package_name: &str, view: ApiView) -> Self {
        let mut diagnostics: Vec<Diagnostic> = module
            .diagnostics()
            .into_iter()
            .map(Diagnostic::from)
            .collect();
        for id in view.duplicate_definitions() {
            diagnostics.push(Diagnostic::info(
                id.clone(),
                format!("definition id '{}' is not unique", id),
            ));
        }
        ApiDocument {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            name: module.name().to_string(),
            package_name: package_name.to_string(),
            tokens: view.into_tokens(),
            diagnostics,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Stable error name.
    pub name: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from an ApiStubError.
    pub fn from_error(err: &ApiStubError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            name: err.error_name().to_string(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from an ApiStubError.
    pub fn from_error(err: &ApiStubError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
