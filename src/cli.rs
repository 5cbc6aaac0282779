//! CLI front door.
//!
//! Helpers behind the `apistub` subcommands:
//! - `generate` - Build the declaration tree and render it as JSON or text
//! - `diagnostics` - Print the per-node problems found while building
//!
//! ## Error Handling
//!
//! All functions return `ApiStubResult<T>`. Configuration failures are mapped
//! onto `ApiStubError::InvalidArguments` so the binary can emit a stable code.

use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use apistub_core::descriptor::ModuleDescriptor;
use apistub_core::error::{ApiStubError, ApiStubResult};
use apistub_core::nodes::{BuildOptions, ModuleNode, NodeEntity};
use apistub_core::output::ApiDocument;

use crate::config::{CliOverrides, OutputFormat, ResolvedConfig};

/// A module tree built from a descriptor file, with the config used to build it.
#[derive(Debug)]
pub struct LoadedModule {
    /// Root of the declaration tree.
    pub module: ModuleNode,
    /// Configuration the tree was built with.
    pub config: ResolvedConfig,
}

/// Load the descriptor at `input`, resolve configuration and build the tree.
///
/// The project config is looked up in the directory holding `input`.
pub fn load_module(input: &Path, overrides: &CliOverrides) -> ApiStubResult<LoadedModule> {
    let descriptor = ModuleDescriptor::load(input)?;
    let config = ResolvedConfig::resolve(input.parent(), &descriptor.name, overrides)?;
    debug!(
        "pkg_root '{}' ({:?}), format {:?} ({:?})",
        config.pkg_root.value, config.pkg_root.source, config.format.value, config.format.source
    );

    let options = BuildOptions {
        pkg_root: config.pkg_root.value.clone(),
        include_private: config.include_private.value,
    };
    let module = ModuleNode::new(&descriptor, &options);
    Ok(LoadedModule { module, config })
}

/// Render a loaded tree in the configured format.
pub fn render(loaded: &LoadedModule) -> ApiStubResult<String> {
    let view = loaded.module.render()?;
    match loaded.config.format.value {
        OutputFormat::Json => {
            let doc = ApiDocument::new(&loaded.module, &loaded.config.pkg_root.value, view);
            serde_json::to_string_pretty(&doc)
                .map_err(|e| ApiStubError::internal(format!("failed to serialize document: {}", e)))
        }
        OutputFormat::Text => {
            let count = loaded.module.diagnostics().len();
            if count > 0 {
                warn!(
                    "{} diagnostic(s) not shown in text output for {}",
                    count,
                    loaded.module.name()
                );
            }
            Ok(view.render_text())
        }
    }
}

/// Execute `generate`: load, build, render.
pub fn run_generate(input: &Path, overrides: &CliOverrides) -> ApiStubResult<String> {
    let loaded = load_module(input, overrides)?;
    render(&loaded)
}

/// Execute `diagnostics`: write every node's errors to `w`.
///
/// Returns the number of diagnostics found.
pub fn run_diagnostics(
    input: &Path,
    overrides: &CliOverrides,
    w: &mut dyn Write,
) -> ApiStubResult<usize> {
    let loaded = load_module(input, overrides)?;
    loaded
        .module
        .write_errors(w)
        .map_err(|e| ApiStubError::io("<output>", e))?;
    Ok(loaded.module.diagnostics().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"{
        "name": "shop.models",
        "classes": [{
            "name": "Cart",
            "members": [
                { "member": "variable", "name": "total",
                  "annotation": { "kind": "named", "name": "float" } },
                { "member": "variable", "name": "owner",
                  "annotation": { "kind": "unresolved", "raw": "Customer" } },
                { "member": "variable", "name": "_cache",
                  "annotation": { "kind": "named", "name": "dict" } }
            ]
        }]
    }"#;

    fn write_descriptor(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("models.json");
        fs::write(&path, DESCRIPTOR).unwrap();
        path
    }

    #[test]
    fn generate_text_skips_private_members() {
        let dir = TempDir::new().unwrap();
        let input = write_descriptor(&dir);
        let overrides = CliOverrides {
            format: Some(OutputFormat::Text),
            ..CliOverrides::default()
        };
        let text = run_generate(&input, &overrides).unwrap();
        assert_eq!(
            text,
            "namespace shop.models\n\nclass Cart:\n    cvar owner\n    cvar total: float\n"
        );
    }

    #[test]
    fn include_private_from_project_config() {
        let dir = TempDir::new().unwrap();
        let input = write_descriptor(&dir);
        fs::write(
            dir.path().join("apistub.json"),
            r#"{ "include_private": true, "format": "text" }"#,
        )
        .unwrap();
        let text = run_generate(&input, &CliOverrides::default()).unwrap();
        assert!(text.contains("cvar _cache: dict\n"));
    }

    #[test]
    fn generate_json_carries_diagnostics() {
        let dir = TempDir::new().unwrap();
        let input = write_descriptor(&dir);
        let overrides = CliOverrides {
            format: Some(OutputFormat::Json),
            ..CliOverrides::default()
        };
        let json = run_generate(&input, &overrides).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["package_name"], "shop");
        assert_eq!(
            value["diagnostics"][0]["target_id"],
            "shop.models.Cart.owner()"
        );
    }

    #[test]
    fn diagnostics_are_written_per_node() {
        let dir = TempDir::new().unwrap();
        let input = write_descriptor(&dir);
        let mut out = Vec::new();
        let count = run_diagnostics(&input, &CliOverrides::default(), &mut out).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "cvar: owner\n    unable to resolve type annotation 'Customer'\n"
        );
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.json");
        let err = run_generate(&missing, &CliOverrides::default()).unwrap_err();
        assert_eq!(err.error_name(), "IoError");
    }
}
