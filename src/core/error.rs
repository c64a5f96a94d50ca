use thiserror::Error;

/// Errors that can occur while building, signing, or submitting an RPS lot.
///
/// A business rejection by the authority is not an error — it is the
/// `Rejected` variant of [`crate::core::SubmissionResult`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NfseError {
    /// One or more input fields are missing or malformed. Caller's fault,
    /// never worth retrying with the same data.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The certificate bundle could not be loaded: bad path, wrong
    /// passphrase, or a bundle without key/certificate material.
    #[error("certificate load error: {0}")]
    CertificateLoad(String),

    /// Producing the XML signature failed: target element not found or an
    /// underlying crypto failure.
    #[error("signing error: {0}")]
    Signing(String),

    /// Network or SOAP-protocol failure talking to the municipal endpoint.
    /// May be retried at the caller's discretion.
    #[error("transport error: {0}")]
    Transport(String),

    /// The authority replied with something that is not parseable XML.
    /// Fatal for the submission.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "service.values.aliquot").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collapse a list of field errors into a single [`NfseError::Validation`].
pub(crate) fn validation_failure(errors: &[ValidationError]) -> NfseError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    NfseError::Validation(msg)
}
