//! Knowledge base persistence and query service
//!
//! Loads and saves knowledge bases through the `FileSystem` boundary and
//! turns core query results into owned values for presentation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{ArenaOptions, CodecOptions, KnowledgeBase};
use crate::infrastructure::traits::FileSystem;

/// Output format of a saved knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Bracketed text form, loadable again
    Text,
    /// DOT digraph for rendering tools, write-only
    Graph,
}

impl FromStr for ExportFormat {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" | "text" | "txt" => Ok(ExportFormat::Text),
            "g" | "graph" | "d" | "dot" => Ok(ExportFormat::Graph),
            other => Err(ApplicationError::OperationFailed {
                context: format!("unknown format: {other}"),
                source: "expected 'text' or 'graph'".into(),
            }),
        }
    }
}

/// Owned definition of a subject, nearest question first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub subject: String,
    pub properties: Vec<(String, bool)>,
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .properties
            .iter()
            .map(|(question, answer)| {
                if *answer {
                    question.clone()
                } else {
                    format!("not {question}")
                }
            })
            .collect();
        write!(f, "{}: {}", self.subject, parts.join(", "))
    }
}

/// Size and shape figures of a knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeStats {
    pub tree_size: usize,
    pub leaf_count: usize,
    pub allocated_nodes: usize,
    pub depth: usize,
    pub index_depth: usize,
    pub slab_count: usize,
    pub reserved_bytes: usize,
}

/// Service for loading, saving and querying knowledge bases.
pub struct KnowledgeService {
    fs: Arc<dyn FileSystem>,
    arena: ArenaOptions,
    codec: CodecOptions,
}

impl KnowledgeService {
    /// Create a new knowledge service.
    pub fn new(fs: Arc<dyn FileSystem>, arena: ArenaOptions, codec: CodecOptions) -> Self {
        Self { fs, arena, codec }
    }

    /// Knowledge base holding only `root_name`.
    pub fn fresh(&self, root_name: &str) -> ApplicationResult<KnowledgeBase> {
        Ok(KnowledgeBase::with_options(root_name, self.arena)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<KnowledgeBase> {
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read knowledge base", path)?;
        let kb = KnowledgeBase::parse_with(&text, self.arena, &self.codec)?;
        debug!(
            "load: {} nodes, {} subjects from {}",
            kb.tree_size(),
            kb.leaf_count(),
            path.display()
        );
        Ok(kb)
    }

    pub fn render(&self, kb: &KnowledgeBase, format: ExportFormat) -> String {
        match format {
            ExportFormat::Text => kb.to_text(&self.codec),
            ExportFormat::Graph => kb.to_graph(),
        }
    }

    #[instrument(level = "debug", skip(self, kb))]
    pub fn save(
        &self,
        kb: &KnowledgeBase,
        path: &Path,
        format: ExportFormat,
    ) -> ApplicationResult<()> {
        let content = self.render(kb, format);
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write knowledge base", path)?;
        debug!("save: {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    pub fn describe(&self, kb: &KnowledgeBase, subject: &str) -> ApplicationResult<Definition> {
        let properties = kb
            .define(subject)?
            .into_properties()
            .into_iter()
            .map(|p| (p.question.to_string(), p.answer))
            .collect();
        Ok(Definition {
            subject: subject.to_string(),
            properties,
        })
    }

    pub fn stats(&self, kb: &KnowledgeBase) -> KnowledgeStats {
        let arena = kb.store().arena();
        KnowledgeStats {
            tree_size: kb.tree_size(),
            leaf_count: kb.leaf_count(),
            allocated_nodes: kb.store().allocated(),
            depth: kb.depth(),
            index_depth: kb.index_depth(),
            slab_count: arena.slab_count(),
            reserved_bytes: arena.reserved_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("text", ExportFormat::Text)]
    #[case("T", ExportFormat::Text)]
    #[case(" dot\n", ExportFormat::Graph)]
    #[case("graph", ExportFormat::Graph)]
    fn given_format_name_when_parsing_then_matches(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_format_when_parsing_then_errors() {
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn given_definition_when_displaying_then_negates_no_answers() {
        let definition = Definition {
            subject: "void".into(),
            properties: vec![("alive".into(), false), ("exists".into(), true)],
        };
        assert_eq!(definition.to_string(), "void: not alive, exists");
    }
}
