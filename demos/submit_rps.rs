//! Submits one RPS to a municipal endpoint configured via environment
//! variables. Requires a real certificate bundle and a reachable service.
//!
//! ```sh
//! NFSE_ENDPOINT=https://city.example/ws \
//! NFSE_PFX=issuer.pfx NFSE_PFX_PASS=secret \
//! cargo run --example submit_rps --features soap
//! ```

use chrono::NaiveDate;
use nfse::core::*;
use nfse::soap::RpsToNfse;
use rust_decimal_macros::dec;
use std::path::PathBuf;

fn main() {
    let endpoint = std::env::var("NFSE_ENDPOINT").expect("NFSE_ENDPOINT not set");
    let pfx = std::env::var("NFSE_PFX").expect("NFSE_PFX not set");
    let passphrase = std::env::var("NFSE_PFX_PASS").expect("NFSE_PFX_PASS not set");

    let settings = Settings {
        issuer: Issuer {
            cnpj: "46963370000125".into(),
            municipal_registration: "1234567".into(),
            city_code: "3550308".into(),
        },
        certificate: Certificate {
            path: PathBuf::from(pfx),
            passphrase,
        },
        endpoint: Endpoint::new(endpoint, "http://city.example/nfse"),
    };

    let rps = RpsBuilder::new(42, "A", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .provider(Provider::new(
            settings.issuer.cnpj.clone(),
            settings.issuer.municipal_registration.clone(),
        ))
        .taker(TakerBuilder::new("11144477735", "João da Silva").build())
        .service(
            ServiceBuilder::new("Desenvolvimento de software", "01.05", "3550308")
                .value(dec!(1500))
                .aliquot(dec!(0.05))
                .build(),
        )
        .build()
        .expect("valid RPS");
    let lot = LotBuilder::new("7").rps(rps).build().expect("valid lot");

    let service = RpsToNfse::new(settings).expect("pipeline construction");
    match service.submit(&lot) {
        SubmissionResult::Issued(payload) => {
            println!(
                "NFS-e issued: number {} verification {}",
                payload.nfse_number.as_deref().unwrap_or("?"),
                payload.verification_code.as_deref().unwrap_or("?"),
            );
        }
        SubmissionResult::Rejected(messages) => {
            println!("Lot rejected:");
            for m in messages {
                println!("  [{}] {}", m.code, m.message);
                if let Some(correction) = m.correction {
                    println!("      {correction}");
                }
            }
        }
        SubmissionResult::Failed(error) => eprintln!("Submission failed: {error}"),
    }
}
