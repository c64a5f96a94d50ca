#![cfg(feature = "xml")]

use chrono::NaiveDate;
use nfse::core::*;
use nfse::xml::{lot_element_id, rps_element_id, to_rps_xml, wrap_in_lot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lot_with(value: Decimal, description: &str, lot_id: &str) -> Lot {
    let rps = RpsBuilder::new(42, "A", date(2024, 6, 15))
        .provider(Provider::new("46963370000125", "1234567"))
        .taker(
            TakerBuilder::new("11144477735", "João da Silva")
                .address(
                    AddressBuilder::new("3550308", "SP", "01001000")
                        .street("Praça da Sé")
                        .number("100")
                        .build(),
                )
                .contact(Some("1133334444".into()), Some("joao@example.com".into()))
                .build(),
        )
        .service(
            ServiceBuilder::new(description, "01.05", "3550308")
                .value(value)
                .aliquot(dec!(0.05))
                .build(),
        )
        .build()
        .unwrap();
    LotBuilder::new(lot_id).rps(rps).build().unwrap()
}

fn sample_lot() -> Lot {
    lot_with(dec!(1500), "Desenvolvimento de software", "7")
}

// --- RPS fragment ---

#[test]
fn fragment_shape_and_id() {
    let xml = to_rps_xml(&sample_lot()).unwrap();

    assert!(xml.starts_with("<Rps xmlns=\"http://www.abrasf.org.br/nfse.xsd\">"));
    assert!(xml.contains("<InfRps Id=\"rps:42\">"));
    assert!(xml.contains("<Numero>42</Numero>"));
    assert!(xml.contains("<Serie>A</Serie>"));
    assert!(xml.contains("<Tipo>1</Tipo>"));
    assert!(xml.contains("<DataEmissao>2024-06-15</DataEmissao>"));
    assert!(xml.contains("<NaturezaOperacao>1</NaturezaOperacao>"));
    assert!(xml.contains("<Status>1</Status>"));
    assert!(xml.contains("<Cnpj>46963370000125</Cnpj>"));
    assert!(xml.contains("<Cpf>11144477735</Cpf>"));
    assert!(xml.ends_with("</InfRps></Rps>"));
}

#[test]
fn monetary_fields_use_fixed_decimal_convention() {
    let xml = to_rps_xml(&sample_lot()).unwrap();

    assert!(xml.contains("<ValorServicos>1500.00</ValorServicos>"));
    assert!(xml.contains("<ValorIss>75.00</ValorIss>"));
    assert!(xml.contains("<BaseCalculo>1500.00</BaseCalculo>"));
    assert!(xml.contains("<ValorLiquidoNfse>1500.00</ValorLiquidoNfse>"));
    assert!(xml.contains("<Aliquota>0.0500</Aliquota>"));
    assert!(xml.contains("<IssRetido>2</IssRetido>"));
}

#[test]
fn fragment_has_no_indentation_or_declaration() {
    let xml = to_rps_xml(&sample_lot()).unwrap();
    assert!(!xml.contains('\n'));
    assert!(!xml.starts_with("<?xml"));
}

#[test]
fn description_is_escaped() {
    let lot = lot_with(dec!(100), "Suporte & manutenção <mensal>", "7");
    let xml = to_rps_xml(&lot).unwrap();
    assert!(xml.contains("Suporte &amp; manutenção &lt;mensal&gt;"));
}

#[test]
fn company_taker_emits_cnpj_element() {
    let rps = RpsBuilder::new(1, "A", date(2024, 6, 15))
        .provider(Provider::new("46963370000125", "1234567"))
        .taker(TakerBuilder::new("11222333000181", "Empresa Exemplo Ltda").build())
        .service(
            ServiceBuilder::new("Consultoria", "17.01", "3550308")
                .value(dec!(100))
                .build(),
        )
        .build()
        .unwrap();
    let lot = LotBuilder::new("9").rps(rps).build().unwrap();
    let xml = to_rps_xml(&lot).unwrap();
    assert!(xml.contains("<CpfCnpj><Cnpj>11222333000181</Cnpj></CpfCnpj>"));
}

#[test]
fn builder_is_deterministic() {
    let lot = sample_lot();
    let first = to_rps_xml(&lot).unwrap();
    let second = to_rps_xml(&lot).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_record_never_emits_a_fragment() {
    // build_unchecked lets an invalid CNPJ through; the document builder
    // must still refuse it.
    let rps = RpsBuilder::new(1, "A", date(2024, 6, 15))
        .provider(Provider::new("00000000000000", "1234567"))
        .taker(TakerBuilder::new("11144477735", "João").build())
        .service(
            ServiceBuilder::new("Consultoria", "17.01", "3550308")
                .value(dec!(100))
                .build(),
        )
        .build_unchecked()
        .unwrap();
    let lot = Lot {
        id: "1".into(),
        issuer_cnpj: rps.provider.cnpj.clone(),
        issuer_municipal_registration: rps.provider.municipal_registration.clone(),
        rps,
    };
    assert!(matches!(
        to_rps_xml(&lot),
        Err(NfseError::Validation(_))
    ));
}

// --- Lot envelope ---

#[test]
fn envelope_reports_entry_count_one_regardless_of_content() {
    for (value, description, lot_id) in [
        (dec!(1), "a", "1"),
        (dec!(99999.99), "descrição longa de serviço prestado", "999999"),
        (dec!(123.45), "outro", "42"),
    ] {
        let lot = lot_with(value, description, lot_id);
        let signed = to_rps_xml(&lot).unwrap();
        let envelope = wrap_in_lot(&signed, &lot).unwrap();
        assert!(
            envelope.contains("<QuantidadeRps>1</QuantidadeRps>"),
            "lot {lot_id} must declare exactly one RPS"
        );
    }
}

#[test]
fn envelope_carries_issuer_and_lot_identifiers() {
    let lot = sample_lot();
    let envelope = wrap_in_lot(&to_rps_xml(&lot).unwrap(), &lot).unwrap();

    assert!(envelope.contains("<LoteRps Id=\"lote:7\" versao=\"1.00\">"));
    assert!(envelope.contains("<NumeroLote>7</NumeroLote>"));
    assert!(envelope.contains("<Cnpj>46963370000125</Cnpj>"));
    assert!(envelope.contains("<InscricaoMunicipal>1234567</InscricaoMunicipal>"));
}

#[test]
fn envelope_embeds_fragment_byte_for_byte() {
    let lot = sample_lot();
    let fragment = to_rps_xml(&lot).unwrap();
    let envelope = wrap_in_lot(&fragment, &lot).unwrap();
    assert!(envelope.contains(&fragment));
}

#[test]
fn element_ids_follow_lot_content() {
    let lot = sample_lot();
    assert_eq!(rps_element_id(&lot.rps), "rps:42");
    assert_eq!(lot_element_id(&lot), "lote:7");
}
