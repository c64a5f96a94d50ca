use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::*;

/// Fill the derived fields of a service value block.
///
/// - `BaseCalculo` = service − deductions − unconditioned discount
/// - `ValorIss` = base × aliquot
/// - `ValorLiquidoNfse` = service − federal withholdings − other
///   withholdings − withheld ISS − discounts
///
/// All derived amounts are rounded to 2 decimal places, half-up.
pub fn calculate_values(values: &mut ServiceValues) {
    let base = values.service_value - values.deductions - values.unconditioned_discount;
    values.calculation_base = round_half_up(base, 2);
    values.iss_value = round_half_up(values.calculation_base * values.aliquot, 2);

    let mut retained = values.pis
        + values.cofins
        + values.inss
        + values.ir
        + values.csll
        + values.other_withholdings;
    if values.iss_withheld {
        retained += values.iss_value;
    }
    let net = values.service_value
        - retained
        - values.unconditioned_discount
        - values.conditioned_discount;
    values.net_value = round_half_up(net, 2);
}

/// Validate an RPS record. Returns all errors found, not just the first.
pub fn validate_rps(rps: &Rps) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if rps.number == 0 {
        errors.push(ValidationError::new("number", "RPS number must be positive"));
    }
    if rps.series.trim().is_empty() || rps.series.len() > 5 {
        errors.push(ValidationError::new(
            "series",
            "series must be 1-5 characters",
        ));
    }

    if let Err(reason) = validate_cnpj(&rps.provider.cnpj) {
        errors.push(ValidationError::new("provider.cnpj", reason));
    }
    if !is_digits(&rps.provider.municipal_registration)
        || rps.provider.municipal_registration.is_empty()
    {
        errors.push(ValidationError::new(
            "provider.municipal_registration",
            "municipal registration must be numeric",
        ));
    }

    if rps.taker.name.trim().is_empty() {
        errors.push(ValidationError::new("taker.name", "taker name is required"));
    }
    if let Err(reason) = validate_document(&rps.taker.document) {
        errors.push(ValidationError::new("taker.document", reason));
    }
    if let Some(address) = &rps.taker.address {
        validate_address(address, "taker.address", &mut errors);
    }

    validate_service(&rps.service, &mut errors);

    errors
}

/// Validate a lot. Runs [`validate_rps`] on the embedded RPS and checks the
/// envelope identifiers.
pub fn validate_lot(lot: &Lot) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if lot.id.trim().is_empty() || lot.id.len() > 15 {
        errors.push(ValidationError::new("id", "lot id must be 1-15 characters"));
    }
    if !lot.id.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ValidationError::new(
            "id",
            "lot id must be alphanumeric",
        ));
    }
    if let Err(reason) = validate_cnpj(&lot.issuer_cnpj) {
        errors.push(ValidationError::new("issuer_cnpj", reason));
    }

    for mut e in validate_rps(&lot.rps) {
        e.field = format!("rps.{}", e.field);
        errors.push(e);
    }

    errors
}

fn validate_service(service: &Service, errors: &mut Vec<ValidationError>) {
    if service.description.trim().is_empty() {
        errors.push(ValidationError::new(
            "service.description",
            "description is required",
        ));
    }
    if service.description.len() > 2000 {
        errors.push(ValidationError::new(
            "service.description",
            "description cannot exceed 2000 characters",
        ));
    }
    if !is_service_item(&service.item_list) {
        errors.push(ValidationError::new(
            "service.item_list",
            "service-list item must look like \"NN.NN\"",
        ));
    }
    if !is_municipality_code(&service.municipality_code) {
        errors.push(ValidationError::new(
            "service.municipality_code",
            "municipality code must be 7 digits",
        ));
    }

    let v = &service.values;
    if v.service_value <= Decimal::ZERO {
        errors.push(ValidationError::new(
            "service.values.service_value",
            "service value must be positive",
        ));
    }
    if v.aliquot < Decimal::ZERO || v.aliquot > Decimal::ONE {
        errors.push(ValidationError::new(
            "service.values.aliquot",
            "aliquot must be a factor between 0 and 1",
        ));
    }
    for (field, value) in [
        ("deductions", v.deductions),
        ("pis", v.pis),
        ("cofins", v.cofins),
        ("inss", v.inss),
        ("ir", v.ir),
        ("csll", v.csll),
        ("other_withholdings", v.other_withholdings),
        ("unconditioned_discount", v.unconditioned_discount),
        ("conditioned_discount", v.conditioned_discount),
    ] {
        if value < Decimal::ZERO {
            errors.push(ValidationError::new(
                format!("service.values.{field}"),
                "amount cannot be negative",
            ));
        }
    }
    if v.deductions + v.unconditioned_discount > v.service_value {
        errors.push(ValidationError::new(
            "service.values.deductions",
            "deductions and discounts exceed the service value",
        ));
    }
}

fn validate_address(address: &Address, prefix: &str, errors: &mut Vec<ValidationError>) {
    if !is_municipality_code(&address.municipality_code) {
        errors.push(ValidationError::new(
            format!("{prefix}.municipality_code"),
            "municipality code must be 7 digits",
        ));
    }
    if address.state.len() != 2 || !address.state.chars().all(|c| c.is_ascii_uppercase()) {
        errors.push(ValidationError::new(
            format!("{prefix}.state"),
            "state must be a 2-letter uppercase code",
        ));
    }
    if address.zip_code.len() != 8 || !is_digits(&address.zip_code) {
        errors.push(ValidationError::new(
            format!("{prefix}.zip_code"),
            "CEP must be 8 digits",
        ));
    }
}

/// Validate a CNPJ by length and check digits (digits only, no mask).
pub fn validate_cnpj(cnpj: &str) -> Result<(), String> {
    if cnpj.len() != 14 || !is_digits(cnpj) {
        return Err("CNPJ must be 14 digits".into());
    }
    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.iter().all(|&d| d == digits[0]) {
        return Err("CNPJ digits are all equal".into());
    }

    const W1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const W2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    if mod11_digit(&digits[..12], &W1) != digits[12]
        || mod11_digit(&digits[..13], &W2) != digits[13]
    {
        return Err("CNPJ check digits do not match".into());
    }
    Ok(())
}

/// Validate a CPF by length and check digits (digits only, no mask).
pub fn validate_cpf(cpf: &str) -> Result<(), String> {
    if cpf.len() != 11 || !is_digits(cpf) {
        return Err("CPF must be 11 digits".into());
    }
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.iter().all(|&d| d == digits[0]) {
        return Err("CPF digits are all equal".into());
    }

    let dv1 = cpf_digit(&digits[..9], 10);
    let dv2 = cpf_digit(&digits[..10], 11);
    if dv1 != digits[9] || dv2 != digits[10] {
        return Err("CPF check digits do not match".into());
    }
    Ok(())
}

/// Validate a taker document: CPF when 11 digits, CNPJ when 14.
pub fn validate_document(document: &str) -> Result<(), String> {
    match document.len() {
        11 => validate_cpf(document),
        14 => validate_cnpj(document),
        _ => Err("document must be a CPF (11 digits) or CNPJ (14 digits)".into()),
    }
}

fn mod11_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rem = sum % 11;
    if rem < 2 { 0 } else { 11 - rem }
}

fn cpf_digit(digits: &[u32], start_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (start_weight - i as u32))
        .sum();
    let rem = (sum * 10) % 11;
    if rem == 10 { 0 } else { rem }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_municipality_code(s: &str) -> bool {
    s.len() == 7 && is_digits(s)
}

fn is_service_item(s: &str) -> bool {
    match s.split_once('.') {
        Some((group, item)) => {
            (1..=2).contains(&group.len())
                && (1..=2).contains(&item.len())
                && is_digits(group)
                && is_digits(item)
        }
        None => false,
    }
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
