use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nfse::core::*;
use nfse::xml::{to_rps_xml, wrap_in_lot};
use rust_decimal_macros::dec;

fn sample_lot() -> Lot {
    let rps = RpsBuilder::new(42, "A", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .provider(Provider::new("46963370000125", "1234567"))
        .taker(
            TakerBuilder::new("11144477735", "João da Silva")
                .address(
                    AddressBuilder::new("3550308", "SP", "01001000")
                        .street("Praça da Sé")
                        .number("100")
                        .build(),
                )
                .build(),
        )
        .service(
            ServiceBuilder::new("Desenvolvimento de software sob demanda", "01.05", "3550308")
                .value(dec!(1500))
                .aliquot(dec!(0.05))
                .build(),
        )
        .build()
        .unwrap();
    LotBuilder::new("7").rps(rps).build().unwrap()
}

fn bench_document_assembly(c: &mut Criterion) {
    let lot = sample_lot();
    let fragment = to_rps_xml(&lot).unwrap();

    c.bench_function("to_rps_xml", |b| {
        b.iter(|| to_rps_xml(black_box(&lot)).unwrap())
    });

    c.bench_function("wrap_in_lot", |b| {
        b.iter(|| wrap_in_lot(black_box(&fragment), black_box(&lot)).unwrap())
    });
}

criterion_group!(benches, bench_document_assembly);
criterion_main!(benches);
