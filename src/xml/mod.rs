//! RPS fragment generation and lot envelope assembly.
//!
//! The XML shapes follow the ABRASF national NFS-e model. Everything here is
//! written without indentation: both the RPS fragment and the lot envelope
//! are signed byte-for-byte, and pretty-printing after signing would change
//! the canonical form.
//!
//! # Example
//!
//! ```no_run
//! use nfse::core::*;
//! use nfse::xml;
//!
//! let lot: Lot = todo!(); // build via LotBuilder
//! let rps_fragment = xml::to_rps_xml(&lot).unwrap();
//! // ... sign the fragment over xml::rps_element_id(&lot.rps) ...
//! let envelope = xml::wrap_in_lot(&rps_fragment, &lot).unwrap();
//! ```

mod envelope;
mod rps;
pub(crate) mod xml_utils;

pub use envelope::wrap_in_lot;
pub use rps::to_rps_xml;

use crate::core::{Lot, Rps};

/// ABRASF NFS-e schema namespace.
pub const ABRASF_NS: &str = "http://www.abrasf.org.br/nfse.xsd";

/// Schema version emitted on `LoteRps`.
pub const LOT_VERSION: &str = "1.00";

/// `Id` attribute of the signable `InfRps` element.
pub fn rps_element_id(rps: &Rps) -> String {
    format!("rps:{}", rps.number)
}

/// `Id` attribute of the signable `LoteRps` element.
pub fn lot_element_id(lot: &Lot) -> String {
    format!("lote:{}", lot.id)
}
