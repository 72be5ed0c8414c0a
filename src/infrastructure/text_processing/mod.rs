mod pdf_adapter;
mod pdf_rasterizer;
mod recursive_character_splitter;
mod vlm_ocr_adapter;

pub use pdf_adapter::{
    EXTRACTION_TIMEOUT, NATIVE_TEXT_THRESHOLD, PdfAdapter, is_native_text, join_page_texts,
};
pub use pdf_rasterizer::{MAX_RASTERIZED_PAGES, RENDER_DPI, ensure_within_page_limit};
pub use recursive_character_splitter::RecursiveCharacterSplitter;
pub use vlm_ocr_adapter::{OCR_PROMPT, VlmOcrAdapter};
