//! # nfse
//!
//! Brazilian municipal e-invoicing (NFS-e) library covering the issuing
//! pipeline: RPS lot assembly, enveloped XML digital signature, SOAP
//! submission to the city web service, response interpretation, and DANFSE
//! printing.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! The XML shapes follow the ABRASF national model as published by the
//! municipal tax authorities.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nfse::core::*;
//! use rust_decimal_macros::dec;
//!
//! let rps = RpsBuilder::new(42, "A", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .provider(Provider::new("46963370000125", "1234567"))
//!     .taker(TakerBuilder::new("11144477735", "João da Silva")
//!         .address(AddressBuilder::new("3550308", "SP", "01001000").street("Praça da Sé").build())
//!         .build())
//!     .service(ServiceBuilder::new("Desenvolvimento de software", "01.05", "3550308")
//!         .value(dec!(1500))
//!         .aliquot(dec!(0.05))
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! let lot = LotBuilder::new("7").rps(rps).build().unwrap();
//! assert_eq!(lot.rps.service.values.iss_value, dec!(75.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Lot/RPS types, builders, validation |
//! | `xml` | RPS fragment generation & lot envelope assembly |
//! | `signature` | PKCS#12 loading, enveloped XML-DSig |
//! | `soap` | SOAP transport, response interpreter, submission pipeline |
//! | `print` | DANFSE HTML/PDF rendering |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "signature")]
pub mod signature;

#[cfg(feature = "soap")]
pub mod soap;

#[cfg(feature = "print")]
pub mod print;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
