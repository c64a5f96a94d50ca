use crate::core::{Lot, NfseError};

use super::xml_utils::{XmlResult, XmlWriter};
use super::{ABRASF_NS, LOT_VERSION, lot_element_id};

/// Wrap a signed RPS fragment in the lot envelope.
///
/// The wrapper is built structurally; the signed fragment is spliced in as
/// an opaque, already-escaped byte sequence and is never re-parsed or
/// re-serialized — re-serialization could change its canonical form and
/// invalidate the signature.
///
/// `QuantidadeRps` is the literal `1`: this library submits exactly one RPS
/// per lot. The resulting `LoteRps` element carries an `Id` so the caller
/// can run the second, outer signature pass over it before transport.
pub fn wrap_in_lot(signed_rps: &str, lot: &Lot) -> XmlResult {
    if signed_rps.trim().is_empty() {
        return Err(NfseError::Builder("signed RPS fragment is empty".into()));
    }

    let mut w = XmlWriter::document()?;

    w.start_element_with_attrs("EnviarLoteRpsEnvio", &[("xmlns", ABRASF_NS)])?;
    w.start_element_with_attrs(
        "LoteRps",
        &[
            ("Id", lot_element_id(lot).as_str()),
            ("versao", LOT_VERSION),
        ],
    )?;
    w.text_element("NumeroLote", &lot.id)?;
    w.text_element("Cnpj", &lot.issuer_cnpj)?;
    w.text_element("InscricaoMunicipal", &lot.issuer_municipal_registration)?;
    w.text_element("QuantidadeRps", &lot.quantity().to_string())?;
    w.start_element("ListaRps")?;
    w.raw_fragment(signed_rps)?;
    w.end_element("ListaRps")?;
    w.end_element("LoteRps")?;
    w.end_element("EnviarLoteRpsEnvio")?;

    w.into_string()
}
