use serde::{Deserialize, Serialize};

use super::error::NfseError;

/// Uniform result of one submission call.
///
/// Callers always receive one of three outcomes: the NFS-e was issued, the
/// authority rejected the lot with coded reasons, or the submission itself
/// failed before a business decision was reached. `Rejected` only ever
/// originates from the authority's response — builder, signing, and
/// transport failures all land in `Failed`.
#[derive(Debug)]
pub enum SubmissionResult {
    /// The authority issued the NFS-e.
    Issued(NfsePayload),
    /// The authority refused the lot. Messages are kept verbatim, in the
    /// order returned — no deduplication, no filtering.
    Rejected(Vec<ReturnMessage>),
    /// The submission failed before or during transport.
    Failed(NfseError),
}

impl SubmissionResult {
    pub fn is_issued(&self) -> bool {
        matches!(self, Self::Issued(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<NfseError> for SubmissionResult {
    fn from(e: NfseError) -> Self {
        Self::Failed(e)
    }
}

/// One authority-issued rejection message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnMessage {
    /// Authority error code (e.g. "E160").
    pub code: String,
    /// Message text, verbatim.
    pub message: String,
    /// Suggested correction, when the authority provides one.
    pub correction: Option<String>,
}

/// Parsed success payload of a submission.
///
/// The raw authority XML is kept unmodified; the fields every caller needs
/// are parsed out for convenience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfsePayload {
    /// Raw response XML exactly as returned by the authority.
    pub raw_xml: String,
    /// Issued NFS-e number, when present in the payload.
    pub nfse_number: Option<String>,
    /// Verification code, when present.
    pub verification_code: Option<String>,
    /// Emission timestamp text, when present.
    pub emission_date: Option<String>,
}
