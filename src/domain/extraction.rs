use std::path::PathBuf;

/// What the PDF classifier produced for a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// The document has a usable text layer; pages joined by newlines.
    DirectText { text: String, page_count: usize },
    /// The document is scanned; one rasterized image per page, in page order.
    PageImages(Vec<PageImage>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Zero-based position in the document.
    pub page_index: usize,
    pub path: PathBuf,
}

impl PageImage {
    pub fn new(page_index: usize, path: PathBuf) -> Self {
        Self { page_index, path }
    }
}
