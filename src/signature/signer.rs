use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::sign::{Signer as PkeySigner, Verifier};
use openssl::x509::X509;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::NfseError;

use super::c14n::canonicalize;
use super::{C14N_URI, ENVELOPED_URI, XMLDSIG_NS};

/// Digest/signature algorithm pair for the XML signature.
///
/// Municipalities on the ABRASF v1 lineage require RSA-SHA1; several have
/// since moved to RSA-SHA256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    RsaSha1,
    RsaSha256,
}

impl SignatureAlgorithm {
    fn digest(&self) -> MessageDigest {
        match self {
            Self::RsaSha1 => MessageDigest::sha1(),
            Self::RsaSha256 => MessageDigest::sha256(),
        }
    }

    fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha1 => "http://www.w3.org/2000/09/xmldsig#sha1",
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
        }
    }

    fn signature_uri(&self) -> &'static str {
        match self {
            Self::RsaSha1 => "http://www.w3.org/2000/09/xmldsig#rsa-sha1",
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
        }
    }
}

/// Holds the operator's private-key/certificate bundle and produces
/// enveloped XML signatures over `Id`-addressed sub-elements.
///
/// The bundle is loaded once and reused for every signature in the session.
/// The key material is read-only after load, so a `Signer` can be shared
/// across threads. Private-key bytes are never logged or exposed.
pub struct Signer {
    pkey: PKey<Private>,
    cert: X509,
    algorithm: SignatureAlgorithm,
}

impl Signer {
    /// Load a PKCS#12 (PFX) bundle from disk.
    pub fn from_pfx_file(path: &Path, passphrase: &str) -> Result<Self, NfseError> {
        let der = std::fs::read(path).map_err(|e| {
            NfseError::CertificateLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_pfx_der(&der, passphrase)
    }

    /// Load a PKCS#12 (PFX) bundle from memory.
    pub fn from_pfx_der(der: &[u8], passphrase: &str) -> Result<Self, NfseError> {
        let passphrase = Zeroizing::new(passphrase.to_string());
        let pkcs12 = Pkcs12::from_der(der)
            .map_err(|e| NfseError::CertificateLoad(format!("corrupt PKCS#12 bundle: {e}")))?;
        let parsed = pkcs12.parse2(&passphrase).map_err(|e| {
            NfseError::CertificateLoad(format!("cannot open bundle (wrong passphrase?): {e}"))
        })?;

        let pkey = parsed
            .pkey
            .ok_or_else(|| NfseError::CertificateLoad("bundle has no private key".into()))?;
        let cert = parsed
            .cert
            .ok_or_else(|| NfseError::CertificateLoad("bundle has no certificate".into()))?;

        debug!("certificate bundle loaded");
        Ok(Self {
            pkey,
            cert,
            algorithm: SignatureAlgorithm::default(),
        })
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sign the sub-element of `xml` whose `Id` attribute equals
    /// `element_id`, returning the document with the `<Signature>` element
    /// inserted immediately after the signed sub-element.
    ///
    /// The digest covers exactly the canonicalized target sub-tree, so
    /// content outside it — including wrappers added later — cannot
    /// invalidate the signature.
    pub fn sign(&self, xml: &str, element_id: &str) -> Result<String, NfseError> {
        let (start, end) = element_span(xml, element_id)?.ok_or_else(|| {
            NfseError::Signing(format!("target element Id=\"{element_id}\" not found"))
        })?;

        let canonical = canonicalize(&xml[start..end])?;
        let digest = openssl::hash::hash(self.algorithm.digest(), canonical.as_bytes())
            .map_err(|e| NfseError::Signing(format!("digest failed: {e}")))?;
        let digest_b64 = BASE64.encode(&digest[..]);

        let signed_info = self.signed_info(element_id, &digest_b64);
        let mut signer = PkeySigner::new(self.algorithm.digest(), &self.pkey)
            .map_err(|e| NfseError::Signing(format!("signer init failed: {e}")))?;
        signer
            .update(with_dsig_ns(&signed_info).as_bytes())
            .map_err(|e| NfseError::Signing(format!("signing failed: {e}")))?;
        let signature = signer
            .sign_to_vec()
            .map_err(|e| NfseError::Signing(format!("signing failed: {e}")))?;

        let cert_der = self
            .cert
            .to_der()
            .map_err(|e| NfseError::Signing(format!("certificate export failed: {e}")))?;

        let signature_element = format!(
            "<Signature xmlns=\"{XMLDSIG_NS}\">{signed_info}\
             <SignatureValue>{}</SignatureValue>\
             <KeyInfo><X509Data><X509Certificate>{}</X509Certificate></X509Data></KeyInfo>\
             </Signature>",
            BASE64.encode(&signature),
            BASE64.encode(&cert_der),
        );

        debug!(element_id, "element signed");
        Ok(format!(
            "{}{}{}",
            &xml[..end],
            signature_element,
            &xml[end..]
        ))
    }

    /// Verify the signature covering the sub-element with the given `Id`.
    ///
    /// Returns `Ok(true)` when both the digest and the RSA signature check
    /// out, `Ok(false)` when either fails, and an error when no signature
    /// referencing the element exists.
    pub fn verify(&self, xml: &str, element_id: &str) -> Result<bool, NfseError> {
        let (start, end) = element_span(xml, element_id)?.ok_or_else(|| {
            NfseError::Signing(format!("target element Id=\"{element_id}\" not found"))
        })?;
        let canonical = canonicalize(&xml[start..end])?;
        let digest = openssl::hash::hash(self.algorithm.digest(), canonical.as_bytes())
            .map_err(|e| NfseError::Signing(format!("digest failed: {e}")))?;
        let digest_b64 = BASE64.encode(&digest[..]);

        let reference = format!("URI=\"#{element_id}\"");
        for (sig_start, sig_end) in named_spans(xml, "Signature")? {
            let sig_xml = &xml[sig_start..sig_end];
            if !sig_xml.contains(&reference) {
                continue;
            }

            let declared_digest = element_text(sig_xml, "DigestValue")?
                .ok_or_else(|| NfseError::Signing("signature without DigestValue".into()))?;
            if declared_digest != digest_b64 {
                return Ok(false);
            }

            let (si_start, si_end) = named_spans(sig_xml, "SignedInfo")?
                .into_iter()
                .next()
                .ok_or_else(|| NfseError::Signing("signature without SignedInfo".into()))?;
            let signed_info = with_dsig_ns(&canonicalize(&sig_xml[si_start..si_end])?);

            let signature_b64 = element_text(sig_xml, "SignatureValue")?
                .ok_or_else(|| NfseError::Signing("signature without SignatureValue".into()))?;
            let signature = BASE64
                .decode(signature_b64.replace(['\r', '\n'], ""))
                .map_err(|e| NfseError::Signing(format!("bad SignatureValue base64: {e}")))?;

            let mut verifier = Verifier::new(self.algorithm.digest(), &self.pkey)
                .map_err(|e| NfseError::Signing(format!("verifier init failed: {e}")))?;
            verifier
                .update(signed_info.as_bytes())
                .map_err(|e| NfseError::Signing(format!("verification failed: {e}")))?;
            return verifier
                .verify(&signature)
                .map_err(|e| NfseError::Signing(format!("verification failed: {e}")));
        }

        Err(NfseError::Signing(format!(
            "no signature references element Id=\"{element_id}\""
        )))
    }

    /// Certificate subject as a one-line string, for display.
    pub fn certificate_subject(&self) -> String {
        self.cert
            .subject_name()
            .entries()
            .map(|e| e.data().as_utf8().map(|s| s.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn signed_info(&self, element_id: &str, digest_b64: &str) -> String {
        format!(
            "<SignedInfo>\
             <CanonicalizationMethod Algorithm=\"{C14N_URI}\"></CanonicalizationMethod>\
             <SignatureMethod Algorithm=\"{}\"></SignatureMethod>\
             <Reference URI=\"#{element_id}\">\
             <Transforms>\
             <Transform Algorithm=\"{ENVELOPED_URI}\"></Transform>\
             <Transform Algorithm=\"{C14N_URI}\"></Transform>\
             </Transforms>\
             <DigestMethod Algorithm=\"{}\"></DigestMethod>\
             <DigestValue>{digest_b64}</DigestValue>\
             </Reference>\
             </SignedInfo>",
            self.algorithm.signature_uri(),
            self.algorithm.digest_uri(),
        )
    }
}

impl std::fmt::Debug for Signer {
    // Key material must never leak through Debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &self.algorithm)
            .field("subject", &self.certificate_subject())
            .finish_non_exhaustive()
    }
}

/// The canonical form of `SignedInfo` includes the xmldsig namespace
/// inherited from the enclosing `Signature` element.
fn with_dsig_ns(signed_info: &str) -> String {
    if signed_info.starts_with("<SignedInfo xmlns") {
        signed_info.to_string()
    } else {
        signed_info.replacen(
            "<SignedInfo",
            &format!("<SignedInfo xmlns=\"{XMLDSIG_NS}\""),
            1,
        )
    }
}

/// Byte span (start..end) of the element carrying `Id="element_id"`,
/// including its start and end tags.
fn element_span(xml: &str, element_id: &str) -> Result<Option<(usize, usize)>, NfseError> {
    let mut reader = Reader::from_str(xml);
    let mut depth_from_match: Option<usize> = None;
    let mut span_start = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if depth_from_match.is_none() && has_id(e, element_id)? {
                    span_start = before;
                    depth_from_match = Some(0);
                } else if let Some(depth) = depth_from_match.as_mut() {
                    *depth += 1;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth_from_match.is_none() && has_id(e, element_id)? {
                    return Ok(Some((before, reader.buffer_position() as usize)));
                }
            }
            Ok(Event::End(_)) => match depth_from_match.as_mut() {
                Some(0) => return Ok(Some((span_start, reader.buffer_position() as usize))),
                Some(depth) => *depth -= 1,
                None => {}
            },
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(NfseError::Xml(format!("XML parse error: {e}"))),
            Ok(_) => {}
        }
    }
}

fn has_id(e: &quick_xml::events::BytesStart<'_>, element_id: &str) -> Result<bool, NfseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| NfseError::Xml(format!("bad attribute: {e}")))?;
        if attr.key.as_ref() == b"Id" && attr.value.as_ref() == element_id.as_bytes() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Byte spans of every element with the given local name, outermost only.
fn named_spans(xml: &str, name: &str) -> Result<Vec<(usize, usize)>, NfseError> {
    let mut reader = Reader::from_str(xml);
    let mut spans = Vec::new();
    let mut depth_from_match: Option<usize> = None;
    let mut span_start = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let qname = e.name();
                let local = local_name(qname.as_ref());
                if depth_from_match.is_none() && local == name.as_bytes() {
                    span_start = before;
                    depth_from_match = Some(0);
                } else if let Some(depth) = depth_from_match.as_mut() {
                    *depth += 1;
                }
            }
            Ok(Event::End(_)) => match depth_from_match.as_mut() {
                Some(0) => {
                    spans.push((span_start, reader.buffer_position() as usize));
                    depth_from_match = None;
                }
                Some(depth) => *depth -= 1,
                None => {}
            },
            Ok(Event::Eof) => return Ok(spans),
            Err(e) => return Err(NfseError::Xml(format!("XML parse error: {e}"))),
            Ok(_) => {}
        }
    }
}

/// Text content of the first element with the given local name.
fn element_text(xml: &str, name: &str) -> Result<Option<String>, NfseError> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()) == name.as_bytes() {
                    inside = true;
                }
            }
            Ok(Event::Text(ref e)) if inside => {
                let text = e
                    .unescape()
                    .map_err(|e| NfseError::Xml(format!("bad text: {e}")))?;
                return Ok(Some(text.into_owned()));
            }
            Ok(Event::End(_)) if inside => return Ok(Some(String::new())),
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(NfseError::Xml(format!("XML parse error: {e}"))),
            Ok(_) => {}
        }
    }
}

fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().rposition(|&b| b == b':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}
