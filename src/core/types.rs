use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A submission unit: exactly one RPS wrapped in a lot envelope.
///
/// The authority's schema allows batches, but this library always submits
/// one RPS per lot — `quantity()` is fixed at 1. A lot is immutable once
/// built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    /// Lot identifier, unique per submission (feeds `NumeroLote` and the
    /// `Id` of the signed `LoteRps` element).
    pub id: String,
    /// Issuer CNPJ (digits only), copied from the provider at build time.
    pub issuer_cnpj: String,
    /// Issuer municipal registration, copied from the provider.
    pub issuer_municipal_registration: String,
    /// The single RPS carried by this lot.
    pub rps: Rps,
}

impl Lot {
    /// Number of RPS entries in the lot. Always 1.
    pub fn quantity(&self) -> u32 {
        1
    }
}

/// RPS — the provisional service receipt submitted for conversion into an
/// NFS-e.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rps {
    /// Sequential number within the series.
    pub number: u64,
    /// Series identifier (e.g. "A", "UNICA").
    pub series: String,
    /// RPS kind (`Tipo`).
    pub kind: RpsKind,
    /// Issue date (`DataEmissao`).
    pub issue_date: NaiveDate,
    /// Status: normal or canceled.
    pub status: RpsStatus,
    /// Nature of the operation (`NaturezaOperacao`).
    pub nature: NatureOfOperation,
    /// Special municipal tax regime, when the provider has one.
    pub special_tax_regime: Option<SpecialTaxRegime>,
    /// Provider opted into the Simples Nacional regime.
    pub simple_national: bool,
    /// Provider is a cultural incentive sponsor (`IncentivadorCultural`).
    pub cultural_promoter: bool,
    /// The service being invoiced.
    pub service: Service,
    /// Service provider (the issuer).
    pub provider: Provider,
    /// Service taker (the customer).
    pub taker: Taker,
}

/// RPS kind (`Tipo` field of `IdentificacaoRps`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpsKind {
    /// 1 — RPS proper.
    Rps,
    /// 2 — conjugated invoice note (nota fiscal conjugada).
    Conjugated,
    /// 3 — coupon.
    Coupon,
}

impl RpsKind {
    pub fn code(&self) -> u8 {
        match self {
            Self::Rps => 1,
            Self::Conjugated => 2,
            Self::Coupon => 3,
        }
    }
}

/// RPS status (`Status` field of `InfRps`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpsStatus {
    /// 1 — normal.
    Normal,
    /// 2 — canceled.
    Canceled,
}

impl RpsStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Canceled => 2,
        }
    }
}

/// `NaturezaOperacao` — where/how the ISS tax is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NatureOfOperation {
    /// 1 — taxed in the issuing municipality.
    TaxedInCity,
    /// 2 — taxed outside the issuing municipality.
    TaxedOutsideCity,
    /// 3 — exempt.
    Exempt,
    /// 4 — immune.
    Immune,
    /// 5 — suspended by judicial decision.
    SuspendedJudicial,
    /// 6 — suspended by administrative procedure.
    SuspendedAdministrative,
}

impl NatureOfOperation {
    pub fn code(&self) -> u8 {
        match self {
            Self::TaxedInCity => 1,
            Self::TaxedOutsideCity => 2,
            Self::Exempt => 3,
            Self::Immune => 4,
            Self::SuspendedJudicial => 5,
            Self::SuspendedAdministrative => 6,
        }
    }

    /// Human-readable label used on the printed DANFSE.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TaxedInCity => "Tributação no município",
            Self::TaxedOutsideCity => "Tributação fora do município",
            Self::Exempt => "Isenção",
            Self::Immune => "Imune",
            Self::SuspendedJudicial => "Exigibilidade suspensa por decisão judicial",
            Self::SuspendedAdministrative => "Exigibilidade suspensa por procedimento administrativo",
        }
    }
}

/// `RegimeEspecialTributacao` — special municipal tax regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialTaxRegime {
    /// 1 — municipal micro-enterprise.
    MunicipalMicroEnterprise,
    /// 2 — estimated assessment.
    Estimated,
    /// 3 — professional partnership.
    ProfessionalPartnership,
    /// 4 — cooperative.
    Cooperative,
    /// 5 — MEI under the Simples Nacional.
    IndividualMicroEntrepreneur,
    /// 6 — ME/EPP under the Simples Nacional.
    SmallEnterprise,
}

impl SpecialTaxRegime {
    pub fn code(&self) -> u8 {
        match self {
            Self::MunicipalMicroEnterprise => 1,
            Self::Estimated => 2,
            Self::ProfessionalPartnership => 3,
            Self::Cooperative => 4,
            Self::IndividualMicroEntrepreneur => 5,
            Self::SmallEnterprise => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MunicipalMicroEnterprise => "Microempresa municipal",
            Self::Estimated => "Estimativa",
            Self::ProfessionalPartnership => "Sociedade de profissionais",
            Self::Cooperative => "Cooperativa",
            Self::IndividualMicroEntrepreneur => "MEI – Simples Nacional",
            Self::SmallEnterprise => "ME ou EPP do Simples Nacional",
        }
    }
}

/// The invoiced service: description, tax codes, and value block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Free-text description (`Discriminacao`).
    pub description: String,
    /// National service-list item (`ItemListaServico`, e.g. "01.05").
    pub item_list: String,
    /// Municipal taxation code (`CodigoTributacaoMunicipio`), when the city
    /// requires one.
    pub municipal_tax_code: Option<String>,
    /// IBGE code of the municipality where the service was provided
    /// (`CodigoMunicipio`, 7 digits).
    pub municipality_code: String,
    /// Monetary values and tax amounts.
    pub values: ServiceValues,
}

/// The `Valores` block of a service.
///
/// `calculation_base`, `iss_value`, and `net_value` are derived by
/// [`crate::core::calculate_values`]; builders fill them automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceValues {
    /// `ValorServicos` — gross service value.
    pub service_value: Decimal,
    /// `ValorDeducoes` — deductions from the calculation base.
    pub deductions: Decimal,
    /// `ValorPis`.
    pub pis: Decimal,
    /// `ValorCofins`.
    pub cofins: Decimal,
    /// `ValorInss`.
    pub inss: Decimal,
    /// `ValorIr`.
    pub ir: Decimal,
    /// `ValorCsll`.
    pub csll: Decimal,
    /// `IssRetido` — whether the taker withholds the ISS.
    pub iss_withheld: bool,
    /// `OutrasRetencoes` — other withholdings.
    pub other_withholdings: Decimal,
    /// `Aliquota` — ISS rate as a decimal factor (0.05 = 5%).
    pub aliquot: Decimal,
    /// `DescontoIncondicionado`.
    pub unconditioned_discount: Decimal,
    /// `DescontoCondicionado`.
    pub conditioned_discount: Decimal,
    /// `BaseCalculo` — derived: service − deductions − unconditioned discount.
    pub calculation_base: Decimal,
    /// `ValorIss` — derived: base × aliquot.
    pub iss_value: Decimal,
    /// `ValorLiquidoNfse` — derived net value.
    pub net_value: Decimal,
}

impl Default for ServiceValues {
    fn default() -> Self {
        Self {
            service_value: Decimal::ZERO,
            deductions: Decimal::ZERO,
            pis: Decimal::ZERO,
            cofins: Decimal::ZERO,
            inss: Decimal::ZERO,
            ir: Decimal::ZERO,
            csll: Decimal::ZERO,
            iss_withheld: false,
            other_withholdings: Decimal::ZERO,
            aliquot: Decimal::ZERO,
            unconditioned_discount: Decimal::ZERO,
            conditioned_discount: Decimal::ZERO,
            calculation_base: Decimal::ZERO,
            iss_value: Decimal::ZERO,
            net_value: Decimal::ZERO,
        }
    }
}

/// Service provider — the NFS-e issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// CNPJ, digits only.
    pub cnpj: String,
    /// Municipal registration (`InscricaoMunicipal`).
    pub municipal_registration: String,
}

impl Provider {
    pub fn new(cnpj: impl Into<String>, municipal_registration: impl Into<String>) -> Self {
        Self {
            cnpj: cnpj.into(),
            municipal_registration: municipal_registration.into(),
        }
    }
}

/// Service taker — the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taker {
    /// CPF (11 digits) or CNPJ (14 digits), digits only.
    pub document: String,
    /// Corporate or personal name (`RazaoSocial`).
    pub name: String,
    /// Municipal registration, when the taker has one in the issuing city.
    pub municipal_registration: Option<String>,
    /// Postal address.
    pub address: Option<Address>,
    /// Contact information.
    pub contact: Option<Contact>,
}

/// Brazilian postal address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Street (`Endereco`).
    pub street: Option<String>,
    /// Street number.
    pub number: Option<String>,
    /// Additional line (`Complemento`).
    pub complement: Option<String>,
    /// Neighborhood (`Bairro`).
    pub neighborhood: Option<String>,
    /// IBGE municipality code (7 digits).
    pub municipality_code: String,
    /// Two-letter state code (`Uf`).
    pub state: String,
    /// CEP, 8 digits.
    pub zip_code: String,
}

/// Contact information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Process-scoped operator configuration.
///
/// Loaded once, read-only for the lifetime of a submission session; shared
/// by the signer and the transport but never mutated by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Issuer identification.
    pub issuer: Issuer,
    /// Signing certificate bundle.
    pub certificate: Certificate,
    /// Municipal web-service endpoint.
    pub endpoint: Endpoint,
}

/// Issuer identification used in lot envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issuer {
    /// CNPJ, digits only.
    pub cnpj: String,
    /// Municipal registration.
    pub municipal_registration: String,
    /// IBGE code of the issuing municipality.
    pub city_code: String,
}

/// Location and passphrase of the PKCS#12 (PFX) signing bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    /// Path to the `.pfx`/`.p12` file.
    pub path: PathBuf,
    /// Bundle passphrase. Never logged by this crate.
    pub passphrase: String,
}

/// Municipal web-service endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Service URL.
    pub url: String,
    /// XML namespace of the service operations.
    pub namespace: String,
    /// Operation name for RPS-to-NFS-e conversion (without the `Request`
    /// suffix), e.g. "GerarNfse".
    pub operation: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: namespace.into(),
            operation: "GerarNfse".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Issued NFS-e (printing model)
// ---------------------------------------------------------------------------

/// A finalized, authority-issued NFS-e as consumed by the DANFSE renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nfse {
    /// NFS-e number assigned by the authority.
    pub number: String,
    /// Fiscal year.
    pub year: u16,
    /// Emission date, `dd/mm/yyyy` display form.
    pub emission_date: String,
    /// Emission time, `hh:mm:ss` display form.
    pub emission_time: String,
    /// Competence (service month), display form.
    pub competence: String,
    /// Authority verification code.
    pub verification_code: String,
    /// Provider block as printed.
    pub provider: NfseParty,
    /// Taker block as printed.
    pub taker: NfseParty,
    /// Service description and codes.
    pub service: NfseService,
    /// Cancellation code, when the invoice was canceled after issuing.
    pub cancellation_code: Option<String>,
    /// Number of the NFS-e this one replaces, when substituting.
    pub replaced_number: Option<String>,
}

/// Provider/taker identification as it appears on the printed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfseParty {
    pub name: String,
    /// CPF or CNPJ, digits only.
    pub document: String,
    pub municipal_registration: Option<String>,
    pub address: Option<Address>,
    pub contact: Option<Contact>,
}

/// Service block of an issued NFS-e, including the value summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfseService {
    pub description: String,
    pub item_list: String,
    pub item_description: String,
    pub municipal_tax_code: Option<String>,
    pub municipal_tax_description: Option<String>,
    pub municipality_code: String,
    pub municipality_name: String,
    pub nature: NatureOfOperation,
    pub special_tax_regime: Option<SpecialTaxRegime>,
    pub simple_national: bool,
    pub values: ServiceValues,
}
