//! Display formatting for the printed document: digit masks and Brazilian
//! money/percent notation.

use rust_decimal::Decimal;

/// Apply a digit mask: each `#` consumes one input character, everything
/// else is copied through. Input shorter than the mask is emitted as far as
/// it goes.
pub fn mask(value: &str, pattern: &str) -> String {
    let mut chars = value.chars();
    let mut out = String::with_capacity(pattern.len());
    for p in pattern.chars() {
        if p == '#' {
            match chars.next() {
                Some(c) => out.push(c),
                None => break,
            }
        } else {
            out.push(p);
        }
    }
    out
}

/// Mask a CPF or CNPJ by length.
pub fn mask_document(document: &str) -> String {
    if document.len() > 11 {
        mask(document, "##.###.###/####-##")
    } else {
        mask(document, "###.###.###-##")
    }
}

/// Mask a CEP: `01001000` → `01.001-000`.
pub fn mask_cep(cep: &str) -> String {
    mask(cep, "##.###-###")
}

/// Mask a phone number by digit count; unrecognized lengths pass through.
pub fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => mask(&digits, "(##) ####-####"),
        11 => mask(&digits, "(##) #####-####"),
        _ => phone.to_string(),
    }
}

/// Format a monetary amount as Brazilian currency: `R$ 1.234,56`.
pub fn format_real(value: Decimal) -> String {
    let mut rounded =
        value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let plain = rounded.to_string();
    let (sign, plain) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("R$ {sign}{grouped},{frac_part}")
}

/// Format an aliquot factor as a display percentage: `0.05` → `5 %`.
pub fn format_percent(aliquot: Decimal) -> String {
    let percent = (aliquot * Decimal::from(100)).normalize();
    format!("{} %", percent.to_string().replace('.', ","))
}
