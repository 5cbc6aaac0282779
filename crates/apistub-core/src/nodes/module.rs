//! Module node: the root of a declaration tree.

use tracing::{debug, info};

use crate::descriptor::ModuleDescriptor;
use crate::error::ApiStubResult;
use crate::tokens::ApiView;

use super::{build_class, BuildOptions, FunctionNode, Node, NodeBase, NodeDiagnostic, NodeEntity};

/// All public declarations of one module.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    base: NodeBase,
}

impl ModuleNode {
    /// Build the whole tree for `desc`.
    ///
    /// Classes come before functions; each group keeps source order when the
    /// descriptor preserves it and is sorted by name otherwise. Names with a
    /// leading underscore are skipped unless `include_private` is set.
    pub fn new(desc: &ModuleDescriptor, options: &BuildOptions) -> Self {
        let mut base = NodeBase::new(desc.name.as_str(), desc.name.as_str());

        let mut classes: Vec<_> = desc
            .classes
            .iter()
            .filter(|c| is_visible(&c.name, options))
            .collect();
        let mut functions: Vec<_> = desc
            .functions
            .iter()
            .filter(|f| is_visible(&f.name, options))
            .collect();
        if !desc.source_ordered {
            classes.sort_by(|a, b| a.name.cmp(&b.name));
            functions.sort_by(|a, b| a.name.cmp(&b.name));
        }

        for class in classes {
            base.add_child(build_class(&desc.name, class, options));
        }
        for function in functions {
            let node = FunctionNode::new(&desc.name, function, options);
            base.add_child(Node::Function(node));
        }
        ModuleNode { base }
    }

    /// Render the whole tree into a fresh view.
    pub fn render(&self) -> ApiStubResult<ApiView> {
        let mut view = ApiView::new();
        self.generate_tokens(&mut view)?;
        Ok(view)
    }

    /// Diagnostics of every node in the tree, in tree order.
    pub fn diagnostics(&self) -> Vec<NodeDiagnostic> {
        let mut out = Vec::new();
        self.collect_diagnostics(&mut out);
        out
    }
}

fn is_visible(name: &str, options: &BuildOptions) -> bool {
    if name.starts_with('_') && !options.include_private {
        debug!("skipping private declaration {}", name);
        return false;
    }
    true
}

impl NodeEntity for ModuleNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn scope_kind(&self) -> &'static str {
        "namespace"
    }

    fn generate_tokens(&self, view: &mut ApiView) -> ApiStubResult<()> {
        let id = self.namespace_id();
        info!("Processing module {}", id);
        view.add_keyword("namespace", false, true);
        view.add_line_marker(id);
        view.add_text(Some(id), self.name());
        view.add_newline();
        for child in self.child_nodes() {
            view.add_newline();
            child.generate_tokens(view)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassDescriptor, FunctionDescriptor};

    #[test]
    fn classes_then_functions_sorted() {
        let desc = ModuleDescriptor {
            name: "pkg.mod".to_string(),
            classes: vec![ClassDescriptor::new("Zebra"), ClassDescriptor::new("Ant")],
            functions: vec![FunctionDescriptor::new("helper")],
            source_ordered: false,
        };
        let module = ModuleNode::new(&desc, &BuildOptions::new("pkg"));
        let names: Vec<&str> = module.child_nodes().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Ant", "Zebra", "helper"]);

        let view = module.render().unwrap();
        assert_eq!(
            view.render_text(),
            "namespace pkg.mod\n\nclass Ant:\n\nclass Zebra:\n\ndef helper()\n"
        );
    }

    #[test]
    fn duplicate_top_level_classes_are_reported() {
        let desc = ModuleDescriptor {
            name: "pkg".to_string(),
            classes: vec![ClassDescriptor::new("Twin"), ClassDescriptor::new("Twin")],
            functions: vec![],
            source_ordered: true,
        };
        let module = ModuleNode::new(&desc, &BuildOptions::new("pkg"));
        assert_eq!(module.child_nodes().len(), 2);
        let diagnostics = module.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].target_id, "pkg");
        assert_eq!(diagnostics[0].text, "Duplicate class 'Twin' in pkg");
    }

    fn module_with_private_names() -> ModuleDescriptor {
        ModuleDescriptor {
            name: "pkg".to_string(),
            classes: vec![
                ClassDescriptor::new("_Hidden"),
                ClassDescriptor::new("Shown"),
            ],
            functions: vec![
                FunctionDescriptor::new("_helper"),
                FunctionDescriptor::new("run"),
            ],
            source_ordered: true,
        }
    }

    #[test]
    fn private_top_level_names_are_skipped() {
        let module = ModuleNode::new(&module_with_private_names(), &BuildOptions::new("pkg"));
        let names: Vec<&str> = module.child_nodes().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Shown", "run"]);
    }

    #[test]
    fn private_top_level_names_kept_when_requested() {
        let mut options = BuildOptions::new("pkg");
        options.include_private = true;
        let module = ModuleNode::new(&module_with_private_names(), &options);
        let names: Vec<&str> = module.child_nodes().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["_Hidden", "Shown", "_helper", "run"]);
    }
}
