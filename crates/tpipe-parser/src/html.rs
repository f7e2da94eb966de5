//! HTML document parser using scraper
//!
//! Walks the markup tree and cuts its visible text into segments.
//! Breaking elements (paragraphs, headings, table cells, ...) split the
//! text; inline elements are folded into the surrounding run; ignored
//! elements contribute nothing from their subtree.

use std::collections::HashMap;
use std::path::Path;

use scraper::{ElementRef, Html, Node};
use tpipe_core::SegmentationConfig;

use crate::{read_file, DocumentParser, FileType, ParsedDocument, Result, Segment};

const TITLE_TAG: &str = "title";

/// A parsed HTML page
pub struct HtmlDocument {
    tree: Html,
}

impl HtmlDocument {
    /// Parse markup into a document tree
    pub fn parse(html: &str) -> Self {
        Self {
            tree: Html::parse_document(html),
        }
    }

    /// Cut the page's visible text into segments
    pub fn segments(&self, config: &SegmentationConfig) -> Vec<Segment> {
        let root = self.tree.root_element();
        let root_path = format!("/{}", root.value().name());

        let mut walker = SegmentWalker::new(config, root.value().name(), &root_path);
        walker.visit(root, &root_path);
        walker.finish()
    }

    /// Trimmed text of the first `title` element, if any
    pub fn title(&self) -> Option<String> {
        self.tree
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == TITLE_TAG)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Segment an HTML string with the given tag tables
pub fn segment_html(html: &str, config: &SegmentationConfig) -> Vec<Segment> {
    HtmlDocument::parse(html).segments(config)
}

/// Where a run of buffered text started
#[derive(Debug, Clone)]
struct Origin {
    tag: String,
    path: String,
}

/// Accumulates segments over one walk of a document tree.
///
/// A walker is created per top-level call; nothing carries over between
/// documents.
struct SegmentWalker<'c> {
    config: &'c SegmentationConfig,
    store: Vec<Segment>,
    buffer: String,
    buffer_origin: Option<Origin>,
    /// Enclosing breaking elements, innermost last
    origins: Vec<Origin>,
    root: Origin,
}

impl<'c> SegmentWalker<'c> {
    fn new(config: &'c SegmentationConfig, root_tag: &str, root_path: &str) -> Self {
        Self {
            config,
            store: Vec::new(),
            buffer: String::new(),
            buffer_origin: None,
            origins: Vec::new(),
            root: Origin {
                tag: root_tag.to_string(),
                path: root_path.to_string(),
            },
        }
    }

    fn visit(&mut self, elem: ElementRef<'_>, path: &str) {
        let tag = elem.value().name();

        if tag == TITLE_TAG {
            self.flush();
            let title = elem.text().collect::<String>();
            let title = title.trim();
            if !title.is_empty() {
                self.store.push(Segment::new(tag, path, title));
            }
            return;
        }

        let breaking = self.config.is_breaking(tag);
        if breaking {
            self.flush();
            self.origins.push(Origin {
                tag: tag.to_string(),
                path: path.to_string(),
            });
        }

        let mut totals: HashMap<&str, usize> = HashMap::new();
        for child in elem.children().filter_map(ElementRef::wrap) {
            *totals.entry(child.value().name()).or_insert(0) += 1;
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for child in elem.children() {
            match child.value() {
                Node::Text(text) => self.append(text),
                Node::Element(element) => {
                    let child_tag = element.name();
                    let position = seen.entry(child_tag).or_insert(0);
                    *position += 1;

                    if self.config.is_ignored(child_tag) {
                        continue;
                    }

                    let child_path = if totals.get(child_tag).copied().unwrap_or(0) > 1 {
                        format!("{path}/{child_tag}[{position}]")
                    } else {
                        format!("{path}/{child_tag}")
                    };

                    if let Some(child_elem) = ElementRef::wrap(child) {
                        self.visit(child_elem, &child_path);
                    }
                }
                _ => {}
            }
        }

        if breaking {
            self.flush();
            self.origins.pop();
        }
    }

    fn append(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }

        if self.buffer.is_empty() {
            self.buffer_origin = Some(self.origins.last().unwrap_or(&self.root).clone());
        } else {
            self.buffer.push(' ');
        }
        self.buffer.push_str(fragment);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let origin = self.buffer_origin.take().unwrap_or_else(|| self.root.clone());
        let text = std::mem::take(&mut self.buffer);
        tracing::trace!("Flushing segment at {} ({} bytes)", origin.path, text.len());
        self.store.push(Segment::new(origin.tag, origin.path, text));
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.store
    }
}

// ============================================================================
// Document Parser
// ============================================================================

/// HTML document parser
pub struct HtmlParser {
    /// Tag tables used for segmentation
    pub config: SegmentationConfig,
}

impl HtmlParser {
    /// Create a new HTML parser with the given tag tables
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

impl DocumentParser for HtmlParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let html = read_file(path)?;
        let document = HtmlDocument::parse(&html);
        let segments = document.segments(&self.config);

        tracing::debug!(
            "Segmented {} into {} segments",
            path.display(),
            segments.len()
        );

        let mut parsed = ParsedDocument::new(path.display().to_string(), segments);
        parsed.title = document.title();
        Ok(parsed)
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Html]
    }
}

// ============================================================================
// Tests
// ============================================================================
