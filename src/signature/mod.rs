//! Enveloped XML digital signatures over `Id`-addressed sub-elements.
//!
//! The authority requires two independent signature passes: one over the
//! `InfRps` element of the RPS fragment, one over the `LoteRps` element of
//! the assembled envelope. Both use the same [`Signer`], loaded once per
//! session from a PKCS#12 bundle.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use nfse::signature::Signer;
//!
//! let signer = Signer::from_pfx_file(Path::new("issuer.pfx"), "secret").unwrap();
//! let signed = signer.sign("<Doc><Part Id=\"p1\">x</Part></Doc>", "p1").unwrap();
//! assert!(signer.verify(&signed, "p1").unwrap());
//! ```

pub mod c14n;
mod signer;

pub use signer::{SignatureAlgorithm, Signer};

/// XML digital signature namespace.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Inclusive canonicalization algorithm identifier.
pub const C14N_URI: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";

/// Enveloped-signature transform identifier.
pub const ENVELOPED_URI: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
