//! Inclusive XML canonicalization (xml-c14n-20010315), subset.
//!
//! Covers the documents this crate generates and verifies: the XML
//! declaration, DOCTYPE, comments, and processing instructions are dropped;
//! empty elements are expanded; attributes are sorted with namespace
//! declarations first; text and attribute values use c14n escaping; CDATA is
//! folded into plain text. Namespace-node inheritance across document
//! subsets is not implemented — signed sub-elements declare their own
//! namespaces.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::NfseError;

/// Canonicalize an XML fragment or document.
pub fn canonicalize(xml: &str) -> Result<String, NfseError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len());

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                write_start_tag(&mut out, e)?;
            }
            Ok(Event::Empty(ref e)) => {
                // Empty elements are expanded: <a/> becomes <a></a>.
                let name = write_start_tag(&mut out, e)?;
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            Ok(Event::End(ref e)) => {
                out.push_str("</");
                out.push_str(
                    std::str::from_utf8(e.name().as_ref())
                        .map_err(|e| NfseError::Xml(format!("non-UTF-8 tag name: {e}")))?,
                );
                out.push('>');
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| NfseError::Xml(format!("bad character reference: {e}")))?;
                escape_text(&mut out, &text);
            }
            Ok(Event::CData(ref e)) => {
                let text = std::str::from_utf8(e.as_ref())
                    .map_err(|e| NfseError::Xml(format!("non-UTF-8 CDATA: {e}")))?;
                escape_text(&mut out, text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(NfseError::Xml(format!("XML parse error: {e}"))),
            // Declaration, DOCTYPE, comments, PIs: dropped.
            Ok(_) => {}
        }
    }

    Ok(out)
}

fn write_start_tag(out: &mut String, e: &BytesStart<'_>) -> Result<String, NfseError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| NfseError::Xml(format!("non-UTF-8 tag name: {e}")))?
        .to_string();

    let mut namespaces: Vec<(String, String)> = Vec::new();
    let mut attributes: Vec<(String, String)> = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| NfseError::Xml(format!("bad attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| NfseError::Xml(format!("non-UTF-8 attribute: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| NfseError::Xml(format!("bad attribute value: {e}")))?
            .into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            namespaces.push((key, value));
        } else {
            attributes.push((key, value));
        }
    }
    // Namespace declarations first, each group in lexicographic order.
    namespaces.sort();
    attributes.sort();

    out.push('<');
    out.push_str(&name);
    for (key, value) in namespaces.iter().chain(attributes.iter()) {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }
    out.push('>');
    Ok(name)
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_declaration_and_comments() {
        let xml = "<?xml version=\"1.0\"?><!-- note --><a>x</a>";
        assert_eq!(canonicalize(xml).unwrap(), "<a>x</a>");
    }

    #[test]
    fn expands_empty_elements() {
        assert_eq!(canonicalize("<a><b/></a>").unwrap(), "<a><b></b></a>");
    }

    #[test]
    fn sorts_attributes_namespaces_first() {
        let xml = "<a z=\"1\" xmlns=\"urn:x\" b=\"2\"/>";
        assert_eq!(
            canonicalize(xml).unwrap(),
            "<a xmlns=\"urn:x\" b=\"2\" z=\"1\"></a>"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let xml = "<a v=\"q&quot;w\">1 &lt; 2 &amp; 3 > 4</a>";
        assert_eq!(
            canonicalize(xml).unwrap(),
            "<a v=\"q&quot;w\">1 &lt; 2 &amp; 3 &gt; 4</a>"
        );
    }

    #[test]
    fn folds_cdata_into_text() {
        let xml = "<a><![CDATA[x < y]]></a>";
        assert_eq!(canonicalize(xml).unwrap(), "<a>x &lt; y</a>");
    }

    #[test]
    fn canonical_input_is_fixpoint() {
        let xml = "<a xmlns=\"urn:x\" b=\"2\"><c>t</c></a>";
        let once = canonicalize(xml).unwrap();
        assert_eq!(once, xml);
        assert_eq!(canonicalize(&once).unwrap(), once);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(canonicalize("<a><b></a>").is_err());
    }
}
