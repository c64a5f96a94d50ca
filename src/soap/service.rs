use tracing::{info, warn};

use crate::core::{Lot, NfseError, Settings, SubmissionResult};
use crate::signature::Signer;
use crate::xml;

use super::response::{self, Outcome};
use super::transport::SoapClient;

/// The RPS-to-NFS-e submission pipeline.
///
/// Construction loads the certificate bundle and prepares the HTTP client;
/// a bad certificate therefore fails here, before any network call is
/// attempted. The constructed service is read-only and can be shared across
/// threads; each [`submit`](Self::submit) call builds its own documents and
/// result.
pub struct RpsToNfse {
    settings: Settings,
    signer: Signer,
    client: SoapClient,
}

impl RpsToNfse {
    pub fn new(settings: Settings) -> Result<Self, NfseError> {
        let signer = Signer::from_pfx_file(
            &settings.certificate.path,
            &settings.certificate.passphrase,
        )?;
        Self::with_signer(settings, signer)
    }

    /// Construct with an externally loaded signer (e.g. a bundle held in
    /// memory rather than on disk).
    pub fn with_signer(settings: Settings, signer: Signer) -> Result<Self, NfseError> {
        let client = SoapClient::new(settings.endpoint.clone())?;
        Ok(Self {
            settings,
            signer,
            client,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Submit one lot and classify the authority's answer.
    ///
    /// Every stage failure — validation, signing, envelope assembly,
    /// transport, response parsing — is converted into
    /// [`SubmissionResult::Failed`]; nothing escapes as a raw error.
    /// `Rejected` only ever carries the authority's own messages.
    pub fn submit(&self, lot: &Lot) -> SubmissionResult {
        match self.run(lot) {
            Ok(Outcome::Issued(payload)) => {
                info!(lot = %lot.id, nfse = payload.nfse_number.as_deref().unwrap_or("?"),
                    "NFS-e issued");
                SubmissionResult::Issued(payload)
            }
            Ok(Outcome::Rejected(messages)) => {
                info!(lot = %lot.id, count = messages.len(), "lot rejected by authority");
                SubmissionResult::Rejected(messages)
            }
            Err(e) => {
                warn!(lot = %lot.id, error = %e, "submission failed");
                SubmissionResult::Failed(e)
            }
        }
    }

    fn run(&self, lot: &Lot) -> Result<Outcome, NfseError> {
        let fragment = xml::to_rps_xml(lot)?;
        let signed_rps = self.signer.sign(&fragment, &xml::rps_element_id(&lot.rps))?;

        let envelope = xml::wrap_in_lot(&signed_rps, lot)?;
        let signed_lot = self.signer.sign(&envelope, &xml::lot_element_id(lot))?;

        let raw_response = self.client.call(&signed_lot)?;
        response::interpret(&raw_response)
    }
}
