use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::NfseError;

pub type XmlResult = Result<String, NfseError>;

fn xml_io(e: std::io::Error) -> NfseError {
    NfseError::Xml(format!("XML write error: {e}"))
}

/// Event-based XML writer.
///
/// Output is never indented: signed fragments must keep a stable byte form,
/// and the lot envelope is itself signed as a whole before transport.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// Writer for an inner fragment — no XML declaration.
    pub fn fragment() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    /// Writer for a full document — starts with the UTF-8 declaration.
    pub fn document() -> Result<Self, NfseError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, NfseError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| NfseError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, NfseError> {
        let elem = BytesStart::new(name);
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, NfseError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, NfseError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, NfseError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Splice an already-serialized, already-escaped XML fragment verbatim.
    ///
    /// The bytes pass through unmodified — no re-parse, no re-escape. This
    /// is how a signed fragment is embedded without disturbing its
    /// canonical form.
    pub fn raw_fragment(&mut self, fragment: &str) -> Result<&mut Self, NfseError> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(fragment)))
            .map_err(xml_io)?;
        Ok(self)
    }
}

/// Format a monetary amount for the schema — always exactly 2 decimal
/// places, dot separator, no grouping.
pub fn format_value(d: Decimal) -> String {
    let mut r = d.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    r.rescale(2);
    r.to_string()
}

/// Format an aliquot factor — exactly 4 decimal places.
pub fn format_aliquot(d: Decimal) -> String {
    let mut r = d.round_dp_with_strategy(4, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    r.rescale(4);
    r.to_string()
}
