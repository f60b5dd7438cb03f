//! Document handle over the pdfium backend

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use pdfium_render::prelude::*;

use crate::engine::init_pdfium;
use crate::error::ViewerError;
use crate::render::{Page, Transform, scaled_dimensions};

/// Anything that can report page geometry and rasterize pages.
///
/// The cache and the navigation controller only see this trait, so they can
/// be driven by an in-memory source in tests and by [`Document`] in the app.
pub trait PageSource {
    /// Number of pages, fixed for the lifetime of the source.
    fn page_count(&self) -> usize;

    /// Native page size in PDF points.
    fn native_size(&self, index: usize) -> Result<(f32, f32), ViewerError>;

    /// Rasterize one page under the given transform into an RGB buffer.
    fn rasterize(&self, index: usize, transform: Transform) -> Result<Page, ViewerError>;
}

/// An opened PDF document.
///
/// The page count is established at open time and never changes. After
/// [`Document::close`] every geometry or rasterization call fails with
/// [`ViewerError::UseAfterClose`].
pub struct Document {
    path: PathBuf,
    page_count: usize,
    inner: Mutex<Option<PdfDocument<'static>>>,
}

impl Document {
    /// Open a PDF file. Fails if pdfium cannot be bound or the file is
    /// missing, unreadable, or not a valid PDF.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref().to_path_buf();

        let pdfium = init_pdfium().map_err(|e| ViewerError::DocumentOpen {
            path: path.clone(),
            detail: e.to_string(),
        })?;

        // The document borrows the bindings for its whole life; one binding
        // per opened document, leaked so the borrow can be 'static.
        let pdfium: &'static Pdfium = Box::leak(Box::new(pdfium));

        let document =
            pdfium
                .load_pdf_from_file(&path, None)
                .map_err(|e| ViewerError::DocumentOpen {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;

        let page_count = document.pages().len() as usize;
        info!("opened {} ({page_count} pages)", path.display());

        Ok(Self {
            path,
            page_count,
            inner: Mutex::new(Some(document)),
        })
    }

    /// Release the underlying document. Idempotent.
    pub fn close(&self) {
        if self.lock().take().is_some() {
            debug!("closed {}", self.path.display());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<PdfDocument<'static>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_index(&self, index: usize) -> Result<(), ViewerError> {
        if index < self.page_count {
            Ok(())
        } else {
            Err(ViewerError::IndexOutOfRange {
                index,
                page_count: self.page_count,
            })
        }
    }
}

impl PageSource for Document {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn native_size(&self, index: usize) -> Result<(f32, f32), ViewerError> {
        let guard = self.lock();
        let document = guard.as_ref().ok_or(ViewerError::UseAfterClose)?;
        self.check_index(index)?;
        let page = document
            .pages()
            .get(index as u16)
            .map_err(|e| ViewerError::rasterization(index, e))?;
        Ok((page.width().value, page.height().value))
    }

    fn rasterize(&self, index: usize, transform: Transform) -> Result<Page, ViewerError> {
        let guard = self.lock();
        let document = guard.as_ref().ok_or(ViewerError::UseAfterClose)?;
        transform.validate()?;
        self.check_index(index)?;
        let page = document
            .pages()
            .get(index as u16)
            .map_err(|e| ViewerError::rasterization(index, e))?;

        let (width, height) =
            scaled_dimensions(page.width().value, page.height().value, transform);
        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ViewerError::rasterization(index, e))?;

        let rgb = bitmap.as_image().to_rgb8();
        debug!(
            "rasterized page {index} at {}x{} (scale {}x{})",
            rgb.width(),
            rgb.height(),
            transform.scale_x,
            transform.scale_y
        );
        Page::from_rgb(index, rgb.width(), rgb.height(), rgb.into_raw())
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        self.close();
    }
}
