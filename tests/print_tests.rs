#![cfg(feature = "print")]

use nfse::core::*;
use nfse::print::{Danfse, PrintMode};
use rust_decimal_macros::dec;

fn sample_nfse() -> Nfse {
    Nfse {
        number: "8090".into(),
        year: 2024,
        emission_date: "15/06/2024".into(),
        emission_time: "10:32:01".into(),
        competence: "06/2024".into(),
        verification_code: "ABCD-1234".into(),
        provider: NfseParty {
            name: "ACME Serviços Digitais Ltda".into(),
            document: "46963370000125".into(),
            municipal_registration: Some("1234567001".into()),
            address: Some(
                AddressBuilder::new("3550308", "SP", "01001000")
                    .street("Praça da Sé")
                    .number("100")
                    .neighborhood("Sé")
                    .build(),
            ),
            contact: Some(Contact {
                phone: Some("1133334444".into()),
                email: Some("fiscal@acme.com.br".into()),
            }),
        },
        taker: NfseParty {
            name: "João da Silva".into(),
            document: "11144477735".into(),
            municipal_registration: None,
            address: None,
            contact: None,
        },
        service: NfseService {
            description: "Desenvolvimento de software sob demanda".into(),
            item_list: "01.05".into(),
            item_description: "Licenciamento ou cessão de direito de uso de programas".into(),
            municipal_tax_code: None,
            municipal_tax_description: None,
            municipality_code: "3550308".into(),
            municipality_name: "São Paulo".into(),
            nature: NatureOfOperation::TaxedInCity,
            special_tax_regime: None,
            simple_national: false,
            values: ServiceValues {
                service_value: dec!(1500),
                aliquot: dec!(0.05),
                calculation_base: dec!(1500),
                iss_value: dec!(75),
                net_value: dec!(1500),
                ..Default::default()
            },
        },
        cancellation_code: None,
        replaced_number: None,
    }
}

const LOGO: &str = "aGVsbG8=";

// --- HTML ---

#[test]
fn html_carries_header_fields_and_masks() {
    let nfse = sample_nfse();
    let html = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();

    assert!(html.contains("8090/2024"));
    assert!(html.contains("ABCD-1234"));
    assert!(html.contains("15/06/2024"));
    assert!(html.contains("46.963.370/0001-25"));
    assert!(html.contains("111.444.777-35"));
    assert!(html.contains("R$ 1.500,00"));
    assert!(html.contains("5 %"));
    assert!(html.contains("data:image/png;base64,aGVsbG8="));
    assert!(html.contains("Tributação no município"));
    // No unresolved placeholders left behind.
    assert!(!html.contains("{NFSE_NUMERO}"));
    assert!(!html.contains("{VALOR_"));
}

#[test]
fn print_css_follows_mode() {
    let nfse = sample_nfse();
    let danfse = Danfse::new(&nfse, LOGO);
    let inline = danfse.render_html(PrintMode::Inline).unwrap();
    let compact = danfse.render_html(PrintMode::Compact).unwrap();

    assert_ne!(inline, compact);
    assert!(inline.contains("font: 19px"));
    assert!(compact.contains("font: 10px"));
}

#[test]
fn watermark_only_when_cancelled() {
    let mut nfse = sample_nfse();
    let html = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();
    assert!(!html.contains("CANCELADA"));

    nfse.cancellation_code = Some("C001".into());
    let cancelled = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();
    assert!(cancelled.contains("CANCELADA"));
    assert!(cancelled.contains("rotate(-45deg)"));
}

#[test]
fn replaced_invoice_block_is_conditional() {
    let mut nfse = sample_nfse();
    let html = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();
    assert!(!html.contains("NFS-e Substituída"));

    nfse.replaced_number = Some("20230042".into());
    let html = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();
    assert!(html.contains("NFS-e Substituída: 2023/0042"));
}

#[test]
fn simples_nacional_note_is_conditional() {
    let mut nfse = sample_nfse();
    nfse.service.simple_national = true;
    let html = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();
    assert!(html.contains("optante pelo Simples Nacional"));
}

#[test]
fn special_regime_block_uses_label() {
    let mut nfse = sample_nfse();
    nfse.service.special_tax_regime = Some(SpecialTaxRegime::Cooperative);
    let html = Danfse::new(&nfse, LOGO).render_html(PrintMode::Inline).unwrap();
    assert!(html.contains("Regime Especial de Tributação:"));
    assert!(html.contains("Cooperativa"));
}

// --- PDF ---

#[test]
fn pdf_renders_for_both_modes() {
    let nfse = sample_nfse();
    let danfse = Danfse::new(&nfse, LOGO);

    for mode in [PrintMode::Inline, PrintMode::Compact] {
        let pdf = danfse.render_pdf(mode).unwrap();
        assert!(pdf.starts_with(b"%PDF-"), "missing PDF header");
        assert!(pdf.len() > 500, "suspiciously small PDF: {} bytes", pdf.len());
    }
}

#[test]
fn cancelled_pdf_still_renders() {
    let mut nfse = sample_nfse();
    nfse.cancellation_code = Some("C001".into());
    let pdf = Danfse::new(&nfse, LOGO).render_pdf(PrintMode::Compact).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}
