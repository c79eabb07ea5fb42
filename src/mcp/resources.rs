//! Markdown documents served through `resources/list` and `resources/read`.

use std::path::{Path, PathBuf};

use crate::mcp::protocol::ResourceDefinition;

const MARKDOWN: &str = "text/markdown";

struct Entry {
    definition: ResourceDefinition,
    file_name: &'static str,
    fallback: &'static str,
}

const ENTRIES: &[Entry] = &[
    Entry {
        definition: ResourceDefinition {
            uri: "wesign://knowledge-base",
            name: "WeSign Complete Knowledge Base",
            description: "Platform architecture, API surface, signing workflows and conventions",
            mime_type: MARKDOWN,
        },
        file_name: "WESIGN_KNOWLEDGE_BASE.md",
        fallback: "Knowledge base not available",
    },
    Entry {
        definition: ResourceDefinition {
            uri: "wesign://quick-start",
            name: "WeSign MCP Quick Start",
            description: "Getting a first document signed through this server",
            mime_type: MARKDOWN,
        },
        file_name: "QUICK_START.md",
        fallback: "Quick start guide not available",
    },
    Entry {
        definition: ResourceDefinition {
            uri: "wesign://examples",
            name: "WeSign Usage Examples",
            description: "Tool call examples for common signing workflows",
            mime_type: MARKDOWN,
        },
        file_name: "EXAMPLES.md",
        fallback: "Examples not available",
    },
    Entry {
        definition: ResourceDefinition {
            uri: "wesign://implementation-status",
            name: "WeSign MCP Implementation Status",
            description: "Which WeSign features the tool catalog covers",
            mime_type: MARKDOWN,
        },
        file_name: "IMPLEMENTATION_STATUS.md",
        fallback: "Implementation status not available",
    },
];

/// The fixed resource set, backed by an optional directory of markdown files.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    dir: Option<PathBuf>,
}

impl ResourceCatalog {
    /// Serves files from `dir`. Without a directory every resource reads as
    /// its "not available" text.
    #[must_use]
    pub const fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// The directory files are read from.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Lists every resource.
    #[must_use]
    pub fn list(&self) -> Vec<ResourceDefinition> {
        ENTRIES.iter().map(|e| e.definition.clone()).collect()
    }

    /// Reads a resource's markdown. Returns `None` for an unknown URI.
    ///
    /// A missing or unreadable file yields the fallback text.
    pub async fn read(&self, uri: &str) -> Option<String> {
        let entry = ENTRIES.iter().find(|e| e.definition.uri == uri)?;

        let Some(dir) = &self.dir else {
            return Some(entry.fallback.to_string());
        };

        let path = dir.join(entry.file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "resource file unavailable");
                Some(entry.fallback.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_four_markdown_resources() {
        let list = ResourceCatalog::default().list();
        assert_eq!(list.len(), 4);
        assert!(list.iter().all(|r| r.mime_type == "text/markdown"));
        assert!(list.iter().any(|r| r.uri == "wesign://quick-start"));
    }

    #[tokio::test]
    async fn reads_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("EXAMPLES.md"), "# Examples\n").unwrap();
        let catalog = ResourceCatalog::new(Some(dir.path().to_path_buf()));

        assert_eq!(
            catalog.read("wesign://examples").await.as_deref(),
            Some("# Examples\n")
        );
        assert_eq!(
            catalog.read("wesign://quick-start").await.as_deref(),
            Some("Quick start guide not available")
        );
    }

    #[tokio::test]
    async fn unknown_uri_is_none() {
        assert!(ResourceCatalog::default().read("wesign://nope").await.is_none());
    }
}
