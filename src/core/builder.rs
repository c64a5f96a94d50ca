use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::{NfseError, validation_failure};
use super::types::*;
use super::validation;

/// Builder for a submission lot.
///
/// The issuer identification is copied from the RPS provider so the lot
/// envelope and the RPS can never disagree.
///
/// ```
/// use chrono::NaiveDate;
/// use nfse::core::*;
/// use rust_decimal_macros::dec;
///
/// let rps = RpsBuilder::new(1, "A", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .provider(Provider::new("46963370000125", "1234567"))
///     .taker(TakerBuilder::new("11144477735", "João da Silva").build())
///     .service(ServiceBuilder::new("Consultoria", "01.05", "3550308")
///         .value(dec!(100))
///         .build())
///     .build()
///     .unwrap();
/// let lot = LotBuilder::new("7").rps(rps).build().unwrap();
/// assert_eq!(lot.quantity(), 1);
/// ```
pub struct LotBuilder {
    id: String,
    rps: Option<Rps>,
}

impl LotBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rps: None,
        }
    }

    pub fn rps(mut self, rps: Rps) -> Self {
        self.rps = Some(rps);
        self
    }

    /// Build the lot, validating the envelope identifiers and the RPS.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Lot, NfseError> {
        let rps = self
            .rps
            .ok_or_else(|| NfseError::Builder("lot requires an RPS".into()))?;

        let lot = Lot {
            id: self.id,
            issuer_cnpj: rps.provider.cnpj.clone(),
            issuer_municipal_registration: rps.provider.municipal_registration.clone(),
            rps,
        };

        let errors = validation::validate_lot(&lot);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }
        Ok(lot)
    }
}

/// Builder for an RPS record.
pub struct RpsBuilder {
    number: u64,
    series: String,
    kind: RpsKind,
    issue_date: NaiveDate,
    status: RpsStatus,
    nature: NatureOfOperation,
    special_tax_regime: Option<SpecialTaxRegime>,
    simple_national: bool,
    cultural_promoter: bool,
    service: Option<Service>,
    provider: Option<Provider>,
    taker: Option<Taker>,
}

impl RpsBuilder {
    pub fn new(number: u64, series: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number,
            series: series.into(),
            kind: RpsKind::Rps,
            issue_date,
            status: RpsStatus::Normal,
            nature: NatureOfOperation::TaxedInCity,
            special_tax_regime: None,
            simple_national: false,
            cultural_promoter: false,
            service: None,
            provider: None,
            taker: None,
        }
    }

    pub fn kind(mut self, kind: RpsKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn status(mut self, status: RpsStatus) -> Self {
        self.status = status;
        self
    }

    pub fn nature(mut self, nature: NatureOfOperation) -> Self {
        self.nature = nature;
        self
    }

    pub fn special_tax_regime(mut self, regime: SpecialTaxRegime) -> Self {
        self.special_tax_regime = Some(regime);
        self
    }

    pub fn simple_national(mut self, opted: bool) -> Self {
        self.simple_national = opted;
        self
    }

    pub fn cultural_promoter(mut self, promoter: bool) -> Self {
        self.cultural_promoter = promoter;
        self
    }

    pub fn service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn taker(mut self, taker: Taker) -> Self {
        self.taker = Some(taker);
        self
    }

    /// Build the RPS, deriving the service value block and running
    /// validation. Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Rps, NfseError> {
        let mut rps = self.assemble()?;
        validation::calculate_values(&mut rps.service.values);

        let errors = validation::validate_rps(&rps);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }
        Ok(rps)
    }

    /// Build without validation — useful for testing or importing external
    /// data. Derived values are still calculated.
    pub fn build_unchecked(self) -> Result<Rps, NfseError> {
        let mut rps = self.assemble()?;
        validation::calculate_values(&mut rps.service.values);
        Ok(rps)
    }

    fn assemble(self) -> Result<Rps, NfseError> {
        let service = self
            .service
            .ok_or_else(|| NfseError::Builder("service is required".into()))?;
        let provider = self
            .provider
            .ok_or_else(|| NfseError::Builder("provider is required".into()))?;
        let taker = self
            .taker
            .ok_or_else(|| NfseError::Builder("taker is required".into()))?;

        Ok(Rps {
            number: self.number,
            series: self.series,
            kind: self.kind,
            issue_date: self.issue_date,
            status: self.status,
            nature: self.nature,
            special_tax_regime: self.special_tax_regime,
            simple_national: self.simple_national,
            cultural_promoter: self.cultural_promoter,
            service,
            provider,
            taker,
        })
    }
}

/// Builder for the invoiced service.
pub struct ServiceBuilder {
    description: String,
    item_list: String,
    municipal_tax_code: Option<String>,
    municipality_code: String,
    values: ServiceValues,
}

impl ServiceBuilder {
    pub fn new(
        description: impl Into<String>,
        item_list: impl Into<String>,
        municipality_code: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            item_list: item_list.into(),
            municipal_tax_code: None,
            municipality_code: municipality_code.into(),
            values: ServiceValues::default(),
        }
    }

    pub fn municipal_tax_code(mut self, code: impl Into<String>) -> Self {
        self.municipal_tax_code = Some(code.into());
        self
    }

    pub fn value(mut self, value: Decimal) -> Self {
        self.values.service_value = value;
        self
    }

    pub fn deductions(mut self, value: Decimal) -> Self {
        self.values.deductions = value;
        self
    }

    pub fn aliquot(mut self, factor: Decimal) -> Self {
        self.values.aliquot = factor;
        self
    }

    pub fn iss_withheld(mut self, withheld: bool) -> Self {
        self.values.iss_withheld = withheld;
        self
    }

    pub fn pis(mut self, value: Decimal) -> Self {
        self.values.pis = value;
        self
    }

    pub fn cofins(mut self, value: Decimal) -> Self {
        self.values.cofins = value;
        self
    }

    pub fn inss(mut self, value: Decimal) -> Self {
        self.values.inss = value;
        self
    }

    pub fn ir(mut self, value: Decimal) -> Self {
        self.values.ir = value;
        self
    }

    pub fn csll(mut self, value: Decimal) -> Self {
        self.values.csll = value;
        self
    }

    pub fn other_withholdings(mut self, value: Decimal) -> Self {
        self.values.other_withholdings = value;
        self
    }

    pub fn unconditioned_discount(mut self, value: Decimal) -> Self {
        self.values.unconditioned_discount = value;
        self
    }

    pub fn conditioned_discount(mut self, value: Decimal) -> Self {
        self.values.conditioned_discount = value;
        self
    }

    pub fn build(self) -> Service {
        Service {
            description: self.description,
            item_list: self.item_list,
            municipal_tax_code: self.municipal_tax_code,
            municipality_code: self.municipality_code,
            values: self.values,
        }
    }
}

/// Builder for the service taker.
pub struct TakerBuilder {
    document: String,
    name: String,
    municipal_registration: Option<String>,
    address: Option<Address>,
    contact: Option<Contact>,
}

impl TakerBuilder {
    pub fn new(document: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            name: name.into(),
            municipal_registration: None,
            address: None,
            contact: None,
        }
    }

    pub fn municipal_registration(mut self, registration: impl Into<String>) -> Self {
        self.municipal_registration = Some(registration.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn contact(mut self, phone: Option<String>, email: Option<String>) -> Self {
        self.contact = Some(Contact { phone, email });
        self
    }

    pub fn build(self) -> Taker {
        Taker {
            document: self.document,
            name: self.name,
            municipal_registration: self.municipal_registration,
            address: self.address,
            contact: self.contact,
        }
    }
}

/// Builder for a Brazilian address.
pub struct AddressBuilder {
    street: Option<String>,
    number: Option<String>,
    complement: Option<String>,
    neighborhood: Option<String>,
    municipality_code: String,
    state: String,
    zip_code: String,
}

impl AddressBuilder {
    pub fn new(
        municipality_code: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            number: None,
            complement: None,
            neighborhood: None,
            municipality_code: municipality_code.into(),
            state: state.into(),
            zip_code: zip_code.into(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn complement(mut self, complement: impl Into<String>) -> Self {
        self.complement = Some(complement.into());
        self
    }

    pub fn neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            number: self.number,
            complement: self.complement,
            neighborhood: self.neighborhood,
            municipality_code: self.municipality_code,
            state: self.state,
            zip_code: self.zip_code,
        }
    }
}
