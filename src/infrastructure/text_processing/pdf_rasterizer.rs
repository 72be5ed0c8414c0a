use std::path::Path;

use image::ImageFormat;
use pdfium_render::prelude::*;

use crate::application::ports::ExtractionError;
use crate::domain::PageImage;
use crate::infrastructure::cancellation::CancellationFlag;

pub const RENDER_DPI: f32 = 150.0;
pub const MAX_RASTERIZED_PAGES: usize = 200;

pub fn ensure_within_page_limit(page_count: usize) -> Result<(), ExtractionError> {
    if page_count > MAX_RASTERIZED_PAGES {
        return Err(ExtractionError::TooManyPages {
            page_count,
            limit: MAX_RASTERIZED_PAGES,
        });
    }
    Ok(())
}

/// Writes `page_<n>.png` into `output_dir` for every page of `data`.
///
/// `output_dir` must not exist yet and its parent must; the flag is checked
/// before each page so an abandoned extraction stops writing.
pub(super) fn rasterize_pages(
    data: &[u8],
    output_dir: &Path,
    cancelled: &CancellationFlag,
) -> Result<Vec<PageImage>, ExtractionError> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library()
            .map_err(|e| ExtractionError::ExtractionFailed(format!("pdfium bind failed: {e}")))?,
    );
    let doc = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|e| ExtractionError::ExtractionFailed(format!("pdfium open failed: {e}")))?;

    let page_count = doc.pages().len() as usize;
    ensure_within_page_limit(page_count)?;

    std::fs::create_dir(output_dir).map_err(|e| {
        ExtractionError::ExtractionFailed(format!("failed to create {}: {e}", output_dir.display()))
    })?;

    let mut images = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        if cancelled.is_cancelled() {
            return Err(ExtractionError::ExtractionFailed(
                "PDF extraction cancelled".to_string(),
            ));
        }

        let page = doc.pages().get(page_index as u16).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("page {} access failed: {e}", page_index + 1))
        })?;
        let png_bytes = render_page_png(&page).map_err(|reason| {
            ExtractionError::ExtractionFailed(format!("page {}: {reason}", page_index + 1))
        })?;

        let path = output_dir.join(format!("page_{}.png", page_index + 1));
        std::fs::write(&path, png_bytes).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("failed to write {}: {e}", path.display()))
        })?;
        images.push(PageImage::new(page_index, path));
    }

    Ok(images)
}

fn render_page_png(page: &PdfPage<'_>) -> Result<Vec<u8>, String> {
    let to_pixels = |points: f32| (points * RENDER_DPI / 72.0) as i32;
    let config = PdfRenderConfig::new()
        .set_target_width(to_pixels(page.width().value))
        .set_target_height(to_pixels(page.height().value));

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| format!("render failed: {e}"))?;

    let mut png_bytes = Vec::new();
    bitmap
        .as_image()
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| format!("PNG encode failed: {e}"))?;
    Ok(png_bytes)
}
