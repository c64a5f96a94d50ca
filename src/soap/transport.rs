use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::core::{Endpoint, NfseError};

use super::SOAP_ENV_NS;

/// Blocking SOAP client for one municipal endpoint.
///
/// Performs a single document-style invocation per call: the fully signed
/// lot XML goes out escaped inside `<inputXML>`, the authority's raw XML
/// comes back from `<outputXML>`. Network failures, HTTP errors, SOAP
/// faults, and protocol breaches are all reported as
/// [`NfseError::Transport`] with the underlying cause preserved.
pub struct SoapClient {
    endpoint: Endpoint,
    client: reqwest::blocking::Client,
}

impl SoapClient {
    pub fn new(endpoint: Endpoint) -> Result<Self, NfseError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| NfseError::Transport(format!("HTTP client init failed: {e}")))?;
        Ok(Self { endpoint, client })
    }

    /// Invoke the configured operation with the given XML payload and
    /// return the raw response XML extracted from `<outputXML>`.
    pub fn call(&self, payload_xml: &str) -> Result<String, NfseError> {
        let request = self.request_envelope(payload_xml);
        let action = self.soap_action();

        debug!(url = %self.endpoint.url, operation = %self.endpoint.operation, "SOAP call");
        let response = self
            .client
            .post(&self.endpoint.url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", &action)
            .body(request)
            .send()
            .map_err(|e| NfseError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| NfseError::Transport(format!("response read failed: {e}")))?;

        if !status.is_success() {
            return Err(NfseError::Transport(format!("HTTP {status}: {body}")));
        }

        if let Some(fault) = fault_string(&body)? {
            return Err(NfseError::Transport(format!("SOAP fault: {fault}")));
        }

        match element_text(&body, "outputXML")? {
            Some(output) => Ok(output),
            None => Err(NfseError::Transport(
                "response has no outputXML payload".into(),
            )),
        }
    }

    fn request_envelope(&self, payload_xml: &str) -> String {
        let operation = &self.endpoint.operation;
        let escaped = quick_xml::escape::escape(payload_xml);
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <soap:Envelope xmlns:soap=\"{SOAP_ENV_NS}\">\
             <soap:Body>\
             <{operation}Request xmlns=\"{}\">\
             <inputXML>{escaped}</inputXML>\
             </{operation}Request>\
             </soap:Body>\
             </soap:Envelope>",
            self.endpoint.namespace,
        )
    }

    fn soap_action(&self) -> String {
        let ns = self.endpoint.namespace.trim_end_matches('/');
        format!("\"{}/{}Request\"", ns, self.endpoint.operation)
    }
}

/// Text of the SOAP `faultstring` element, when the body carries a `Fault`.
fn fault_string(xml: &str) -> Result<Option<String>, NfseError> {
    if !has_element(xml, "Fault")? {
        return Ok(None);
    }
    let fault = element_text(xml, "faultstring")?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "no faultstring".into());
    Ok(Some(fault))
}

fn has_element(xml: &str, name: &str) -> Result<bool, NfseError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == name.as_bytes() {
                    return Ok(true);
                }
            }
            Ok(Event::Eof) => return Ok(false),
            Err(e) => {
                return Err(NfseError::Transport(format!("malformed SOAP reply: {e}")));
            }
            Ok(_) => {}
        }
    }
}

/// Unescaped text content of the first element with the given local name.
fn element_text(xml: &str, name: &str) -> Result<Option<String>, NfseError> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if !inside => {
                if local_name(e.name().as_ref()) == name.as_bytes() {
                    inside = true;
                }
            }
            Ok(Event::Text(ref e)) if inside => {
                let t = e
                    .unescape()
                    .map_err(|e| NfseError::Transport(format!("malformed SOAP reply: {e}")))?;
                text.push_str(&t);
            }
            Ok(Event::CData(ref e)) if inside => {
                let t = std::str::from_utf8(e.as_ref())
                    .map_err(|e| NfseError::Transport(format!("malformed SOAP reply: {e}")))?;
                text.push_str(t);
            }
            Ok(Event::End(_)) if inside => return Ok(Some(text)),
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(NfseError::Transport(format!("malformed SOAP reply: {e}")));
            }
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
