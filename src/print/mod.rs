//! DANFSE rendering: the printable representation of an issued NFS-e.
//!
//! Produces either an HTML string (inline viewing) or PDF bytes (download/
//! storage) from a finalized [`crate::core::Nfse`] record plus a
//! base64-encoded provider logo. A diagonal "CANCELADA" watermark is
//! overlaid whenever the invoice carries a cancellation code.

mod format;
mod html;
mod pdf;

pub use format::{format_percent, format_real, mask, mask_cep, mask_document, mask_phone};

use crate::core::{Nfse, NfseError};

/// Print style selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// Larger fonts, optimized for on-screen/inline viewing.
    Inline,
    /// Compact style for printed output.
    Compact,
}

/// Renderer for one issued NFS-e.
pub struct Danfse<'a> {
    nfse: &'a Nfse,
    logo_base64: &'a str,
}

impl<'a> Danfse<'a> {
    pub fn new(nfse: &'a Nfse, logo_base64: &'a str) -> Self {
        Self { nfse, logo_base64 }
    }

    /// Render the HTML representation.
    pub fn render_html(&self, mode: PrintMode) -> Result<String, NfseError> {
        html::render(self.nfse, self.logo_base64, mode)
    }

    /// Render a single-page PDF.
    pub fn render_pdf(&self, mode: PrintMode) -> Result<Vec<u8>, NfseError> {
        pdf::render(self.nfse, mode)
    }
}
