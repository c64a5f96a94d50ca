//! SOAP transport, response interpretation, and the submission pipeline.
//!
//! The municipal services follow a document-style contract: the operation
//! element carries the signed lot XML escaped inside `<inputXML>`, and the
//! reply carries the authority's XML escaped inside `<outputXML>`. The
//! pipeline ([`RpsToNfse`]) chains document assembly, the two signature
//! passes, transport, and interpretation into a single blocking call that
//! always returns a classified [`crate::core::SubmissionResult`].

mod response;
mod service;
mod transport;

pub use response::{Outcome, interpret};
pub use service::RpsToNfse;
pub use transport::SoapClient;

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
