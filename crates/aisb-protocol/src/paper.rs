//! Report and paper content carried on research payloads

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A figure referenced by a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRef {
    /// Caption shown with the figure
    pub caption: String,
    /// Path to the rendered figure file
    pub path: PathBuf,
}

/// Content of a research paper or report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperContent {
    pub title: String,

    #[serde(default = "default_authors")]
    pub authors: Vec<String>,

    /// One-paragraph abstract
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Full report body in Markdown
    pub content_markdown: String,

    /// Figures embedded in the report
    #[serde(default)]
    pub figures: Vec<FigureRef>,
}

fn default_authors() -> Vec<String> {
    vec!["AI Scientist".to_string()]
}

impl PaperContent {
    /// Create a report with the minimum required fields
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        content_markdown: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            authors: default_authors(),
            abstract_text: abstract_text.into(),
            content_markdown: content_markdown.into(),
            figures: Vec::new(),
        }
    }

    /// Attach a figure reference
    pub fn with_figure(mut self, caption: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.figures.push(FigureRef {
            caption: caption.into(),
            path: path.into(),
        });
        self
    }
}
