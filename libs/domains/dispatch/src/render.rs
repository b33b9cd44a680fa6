//! PDF document rendering.
//!
//! The renderer is behind a trait so the dispatch service can be tested
//! without producing actual PDFs.

use crate::error::{DispatchError, DispatchResult};
use crate::models::RenderedDocument;
use async_trait::async_trait;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

/// Renders a one-page document from a title/body pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Produce a finite byte buffer for a one-page document containing the
    /// title (emphasized) and the body text. Completes exactly once,
    /// success or failure.
    async fn render(&self, title: &str, body: &str) -> DispatchResult<RenderedDocument>;
}

/// PDF renderer backed by printpdf.
///
/// One A4 page: bold 18pt title at the top, 12pt body below it, one
/// paragraph per input line.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    filename: String,
}

impl PdfRenderer {
    pub fn new(filename: String) -> Self {
        Self { filename }
    }

    fn render_blocking(title: &str, body: &str) -> Result<Vec<u8>, String> {
        let (doc, page, layer) = PdfDocument::new("raport", Mm(210.0), Mm(297.0), "Layer 1");

        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| e.to_string())?;
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| e.to_string())?;

        let layer = doc.get_page(page).get_layer(layer);
        layer.use_text(title, 18.0, Mm(15.0), Mm(272.0), &bold);

        // 12pt body, one paragraph per input line, ~6mm leading
        let mut y = 260.0;
        for line in body.lines() {
            layer.use_text(line, 12.0, Mm(15.0), Mm(y), &regular);
            y -= 6.0;
            if y < 15.0 {
                break;
            }
        }

        doc.save_to_bytes().map_err(|e| e.to_string())
    }
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn render(&self, title: &str, body: &str) -> DispatchResult<RenderedDocument> {
        let title = title.to_string();
        let body = body.to_string();

        // printpdf is synchronous CPU work, keep it off the async executor
        let bytes = tokio::task::spawn_blocking(move || Self::render_blocking(&title, &body))
            .await
            .map_err(|e| DispatchError::Render(format!("Render task panicked: {}", e)))?
            .map_err(DispatchError::Render)?;

        debug!(size = bytes.len(), filename = %self.filename, "Rendered PDF document");

        Ok(RenderedDocument {
            filename: self.filename.clone(),
            bytes,
        })
    }
}
