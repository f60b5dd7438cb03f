//! pdfium library bootstrap

use pdfium_render::prelude::*;

/// Bind to a pdfium shared library, preferring a copy next to the binary,
/// then the usual system location, then whatever the loader can find.
pub fn init_pdfium() -> Result<Pdfium, PdfiumError> {
    let lib_name = if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    };

    let bindings = Pdfium::bind_to_library(format!("./{lib_name}"))
        .or_else(|_| Pdfium::bind_to_library(format!("/usr/lib/{lib_name}")))
        .or_else(|_| Pdfium::bind_to_system_library())?;

    Ok(Pdfium::new(bindings))
}
