/// Placed between consecutive OCR'd pages.
pub const PAGE_BREAK_MARKER: &str = "\n\n--- Page Break ---\n\n";

/// Transcribed markdown for one page of the OCR worklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_index: usize,
    pub markdown: String,
}

impl PageText {
    pub fn new(page_index: usize, markdown: String) -> Self {
        Self {
            page_index,
            markdown,
        }
    }
}

/// The text of an entire upload batch. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText(String);

impl DocumentText {
    /// Returns `None` when `text` is empty after trimming.
    pub fn direct(text: String) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    /// Joins pages in ascending `page_index` order with [`PAGE_BREAK_MARKER`].
    /// Returns `None` when the joined pages carry no text at all.
    pub fn from_pages(mut pages: Vec<PageText>) -> Option<Self> {
        pages.sort_by_key(|p| p.page_index);

        if pages.iter().all(|p| p.markdown.trim().is_empty()) {
            return None;
        }

        let joined = pages
            .into_iter()
            .map(|p| p.markdown)
            .collect::<Vec<_>>()
            .join(PAGE_BREAK_MARKER);

        Some(Self(joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
