use chrono::NaiveDate;
use nfse::core::*;
use nfse::xml::{to_rps_xml, wrap_in_lot};
use rust_decimal_macros::dec;

fn main() {
    let rps = RpsBuilder::new(42, "A", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .nature(NatureOfOperation::TaxedInCity)
        .simple_national(true)
        .provider(Provider::new("46963370000125", "1234567"))
        .taker(
            TakerBuilder::new("11144477735", "João da Silva")
                .address(
                    AddressBuilder::new("3550308", "SP", "01001000")
                        .street("Praça da Sé")
                        .number("100")
                        .neighborhood("Sé")
                        .build(),
                )
                .contact(Some("1133334444".into()), Some("joao@example.com".into()))
                .build(),
        )
        .service(
            ServiceBuilder::new("Desenvolvimento de software sob demanda", "01.05", "3550308")
                .value(dec!(1500))
                .aliquot(dec!(0.05))
                .build(),
        )
        .build()
        .expect("valid RPS");

    let lot = LotBuilder::new("7").rps(rps).build().expect("valid lot");

    let v = &lot.rps.service.values;
    println!("Base de cálculo: {}", v.calculation_base);
    println!("ISS devido:      {}", v.iss_value);
    println!("Valor líquido:   {}", v.net_value);

    let fragment = to_rps_xml(&lot).expect("RPS fragment");
    let envelope = wrap_in_lot(&fragment, &lot).expect("lot envelope");
    println!("\n{envelope}");
}
