//! Structural extraction: one source file in, one `SourceFacts` out.
//!
//! Imports, classes, functions and complexity come from the tree-sitter
//! Python grammar. Endpoints, data access and external dependencies come from
//! the textual idioms in [`patterns::PatternCatalog`].

pub mod complexity;
pub mod parser;
pub mod patterns;
pub mod structure;

use crate::core::errors::Result;
use crate::core::SourceFacts;
use std::path::Path;

pub use complexity::calculate_cyclomatic_complexity;
pub use patterns::PatternCatalog;

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    catalog: PatternCatalog,
}

impl Extractor {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Extract facts from `content`. Fails only when the source is not
    /// syntactically valid.
    pub fn extract(&self, path: &Path, content: &str) -> Result<SourceFacts> {
        let tree = parser::parse_python(content, path)?;
        let root = tree.root_node();

        Ok(SourceFacts {
            path: path.to_path_buf(),
            imports: structure::extract_imports(root, content),
            classes: structure::extract_classes(root, content),
            functions: structure::extract_functions(root, content),
            complexity: calculate_cyclomatic_complexity(root),
            external_dependencies: self.catalog.find_dependencies(content),
            endpoints: self.catalog.find_endpoints(content),
            data_access: self.catalog.find_data_access(content),
            path_literals: structure::extract_path_literals(root, content),
            referenced_names: structure::extract_referenced_names(root, content),
        })
    }
}

/// Extract facts with the built-in pattern catalog
pub fn extract_file(path: &Path, content: &str) -> Result<SourceFacts> {
    Extractor::default().extract(path, content)
}
