use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::{NfseError, NfsePayload, ReturnMessage};

/// Terminal classification of an authority response.
#[derive(Debug)]
pub enum Outcome {
    /// The NFS-e was issued; the payload is exposed unmodified.
    Issued(NfsePayload),
    /// The authority refused the lot with coded messages, in order.
    Rejected(Vec<ReturnMessage>),
}

/// Interpret the raw authority response XML.
///
/// The decision is structural, not duck-typed: a response containing a
/// `ListaMensagemRetorno` element is a rejection carrying every
/// `MensagemRetorno` `(Codigo, Mensagem)` pair exactly as returned — order
/// preserved, no deduplication, no filtering. Anything else well-formed is
/// a success. Input that cannot be parsed as XML at all is
/// [`NfseError::UnexpectedResponse`].
pub fn interpret(xml: &str) -> Result<Outcome, NfseError> {
    let mut reader = Reader::from_str(xml);

    let mut path: Vec<String> = Vec::new();
    let mut saw_element = false;
    let mut has_message_list = false;
    let mut messages: Vec<ReturnMessage> = Vec::new();
    let mut current: Option<PartialMessage> = None;

    let mut nfse_number = None;
    let mut verification_code = None;
    let mut emission_date = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name_str(e.name().as_ref())?;
                saw_element = true;
                if name == "ListaMensagemRetorno" {
                    has_message_list = true;
                }
                if name == "MensagemRetorno" {
                    current = Some(PartialMessage::default());
                }
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name_str(e.name().as_ref())?;
                saw_element = true;
                if name == "ListaMensagemRetorno" {
                    has_message_list = true;
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| NfseError::UnexpectedResponse(format!("bad text: {e}")))?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if let Some(message) = current.as_mut() {
                    match path.last().map(String::as_str) {
                        Some("Codigo") => message.code.push_str(text),
                        Some("Mensagem") => message.message.push_str(text),
                        Some("Correcao") => {
                            message.correction.get_or_insert_default().push_str(text);
                        }
                        _ => {}
                    }
                } else {
                    let parent = path.iter().rev().nth(1).map(String::as_str);
                    match (parent, path.last().map(String::as_str)) {
                        (Some("InfNfse"), Some("Numero")) => {
                            nfse_number = Some(text.to_string());
                        }
                        (_, Some("CodigoVerificacao")) => {
                            verification_code = Some(text.to_string());
                        }
                        (Some("InfNfse"), Some("DataEmissao")) => {
                            emission_date = Some(text.to_string());
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                if ended == "MensagemRetorno" {
                    if let Some(message) = current.take() {
                        messages.push(message.into());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NfseError::UnexpectedResponse(format!(
                    "unparseable XML: {e}"
                )));
            }
            Ok(_) => {}
        }
    }

    if !saw_element {
        return Err(NfseError::UnexpectedResponse(
            "response contains no XML element".into(),
        ));
    }
    if !path.is_empty() {
        return Err(NfseError::UnexpectedResponse(format!(
            "truncated XML: <{}> never closed",
            path.last().unwrap()
        )));
    }

    if has_message_list {
        return Ok(Outcome::Rejected(messages));
    }

    Ok(Outcome::Issued(NfsePayload {
        raw_xml: xml.to_string(),
        nfse_number,
        verification_code,
        emission_date,
    }))
}

#[derive(Default)]
struct PartialMessage {
    code: String,
    message: String,
    correction: Option<String>,
}

impl From<PartialMessage> for ReturnMessage {
    fn from(p: PartialMessage) -> Self {
        ReturnMessage {
            code: p.code,
            message: p.message,
            correction: p.correction,
        }
    }
}

fn local_name_str(qname: &[u8]) -> Result<String, NfseError> {
    let local = match qname.iter().rposition(|&b| b == b':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    };
    std::str::from_utf8(local)
        .map(str::to_string)
        .map_err(|e| NfseError::UnexpectedResponse(format!("non-UTF-8 tag name: {e}")))
}
