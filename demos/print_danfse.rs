use nfse::core::*;
use nfse::print::{Danfse, PrintMode};
use rust_decimal_macros::dec;

fn main() {
    let nfse = Nfse {
        number: "8090".into(),
        year: 2024,
        emission_date: "15/06/2024".into(),
        emission_time: "10:32:01".into(),
        competence: "06/2024".into(),
        verification_code: "ABCD-1234".into(),
        provider: NfseParty {
            name: "ACME Serviços Digitais Ltda".into(),
            document: "46963370000125".into(),
            municipal_registration: Some("12345670013".into()),
            address: Some(
                AddressBuilder::new("3550308", "SP", "01001000")
                    .street("Praça da Sé")
                    .number("100")
                    .build(),
            ),
            contact: None,
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
            simple_national: true,
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
    };

    let danfse = Danfse::new(&nfse, "");

    let html = danfse.render_html(PrintMode::Inline).expect("HTML");
    std::fs::write("danfse.html", &html).expect("write danfse.html");

    let pdf = danfse.render_pdf(PrintMode::Compact).expect("PDF");
    std::fs::write("danfse.pdf", &pdf).expect("write danfse.pdf");

    println!("wrote danfse.html ({} bytes)", html.len());
    println!("wrote danfse.pdf ({} bytes)", pdf.len());
}
