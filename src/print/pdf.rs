use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::core::{Nfse, NfseError};

use super::PrintMode;
use super::format::{format_percent, format_real, mask_cep, mask_document};

// A4 in PDF points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;

/// Render a single-page DANFSE PDF.
pub(super) fn render(nfse: &Nfse, mode: PrintMode) -> Result<Vec<u8>, NfseError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(regular_id),
            "F2" => Object::Reference(bold_id),
        },
    });

    let content = Content {
        operations: page_operations(nfse, mode),
    };
    let content_bytes = content
        .encode()
        .map_err(|e| NfseError::Builder(format!("PDF content encode failed: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| NfseError::Builder(format!("PDF save failed: {e}")))?;
    Ok(out)
}

fn page_operations(nfse: &Nfse, mode: PrintMode) -> Vec<Operation> {
    let (body_size, title_size) = match mode {
        PrintMode::Inline => (11.0, 16.0),
        PrintMode::Compact => (9.0, 13.0),
    };
    let line_gap = body_size + 4.0;
    let v = &nfse.service.values;

    let mut ops = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    if nfse.cancellation_code.is_some() {
        watermark(&mut ops);
    }

    let title = |ops: &mut Vec<Operation>, y: &mut f32, text: &str| {
        text_line(ops, "F2", title_size, MARGIN, *y, text);
        *y -= title_size + 6.0;
    };
    let line = |ops: &mut Vec<Operation>, y: &mut f32, text: String| {
        text_line(ops, "F1", body_size, MARGIN, *y, &text);
        *y -= line_gap;
    };
    let heading = |ops: &mut Vec<Operation>, y: &mut f32, text: &str| {
        *y -= 4.0;
        text_line(ops, "F2", body_size, MARGIN, *y, text);
        *y -= line_gap;
    };

    title(
        &mut ops,
        &mut y,
        "NOTA FISCAL DE SERVICOS ELETRONICA - NFS-e",
    );
    line(
        &mut ops,
        &mut y,
        format!("Numero {}/{}", nfse.number, nfse.year),
    );
    line(
        &mut ops,
        &mut y,
        format!(
            "Emitida em {} as {} - Competencia {}",
            nfse.emission_date, nfse.emission_time, nfse.competence
        ),
    );
    line(
        &mut ops,
        &mut y,
        format!("Codigo de Verificacao: {}", nfse.verification_code),
    );
    if let Some(replaced) = &nfse.replaced_number {
        line(&mut ops, &mut y, format!("NFS-e Substituida: {replaced}"));
    }

    heading(&mut ops, &mut y, "PRESTADOR DE SERVICOS");
    line(&mut ops, &mut y, nfse.provider.name.clone());
    line(
        &mut ops,
        &mut y,
        format!("CPF/CNPJ: {}", mask_document(&nfse.provider.document)),
    );
    if let Some(address) = &nfse.provider.address {
        line(
            &mut ops,
            &mut y,
            format!(
                "{}, {} - CEP {}",
                address.street.as_deref().unwrap_or(""),
                address.number.as_deref().unwrap_or("s/n"),
                mask_cep(&address.zip_code)
            ),
        );
    }

    heading(&mut ops, &mut y, "TOMADOR DE SERVICOS");
    line(&mut ops, &mut y, nfse.taker.name.clone());
    line(
        &mut ops,
        &mut y,
        format!("CPF/CNPJ: {}", mask_document(&nfse.taker.document)),
    );

    heading(&mut ops, &mut y, "DISCRIMINACAO DOS SERVICOS");
    for chunk in wrap_text(&nfse.service.description, 90) {
        line(&mut ops, &mut y, chunk);
    }
    line(
        &mut ops,
        &mut y,
        format!(
            "Item da Lista: {} - {}",
            nfse.service.item_list, nfse.service.item_description
        ),
    );
    line(
        &mut ops,
        &mut y,
        format!("Natureza da Operacao: {}", nfse.service.nature.label()),
    );
    if let Some(regime) = nfse.service.special_tax_regime {
        line(
            &mut ops,
            &mut y,
            format!("Regime Especial de Tributacao: {}", regime.label()),
        );
    }
    if nfse.service.simple_national {
        line(
            &mut ops,
            &mut y,
            "Documento emitido por ME ou EPP optante pelo Simples Nacional.".to_string(),
        );
    }

    heading(&mut ops, &mut y, "VALORES");
    line(
        &mut ops,
        &mut y,
        format!(
            "Valor dos Servicos: {} - Deducoes: {}",
            format_real(v.service_value),
            format_real(v.deductions)
        ),
    );
    line(
        &mut ops,
        &mut y,
        format!(
            "Base de Calculo: {} - Aliquota: {} - Valor do ISS: {}",
            format_real(v.calculation_base),
            format_percent(v.aliquot),
            format_real(v.iss_value)
        ),
    );
    line(
        &mut ops,
        &mut y,
        format!(
            "PIS: {} - COFINS: {} - IR: {} - CSLL: {} - INSS: {}",
            format_real(v.pis),
            format_real(v.cofins),
            format_real(v.ir),
            format_real(v.csll),
            format_real(v.inss)
        ),
    );
    text_line(
        &mut ops,
        "F2",
        body_size + 2.0,
        MARGIN,
        y,
        &format!("VALOR LIQUIDO: {}", format_real(v.net_value)),
    );

    ops
}

fn text_line(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(latin1(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Diagonal gray "CANCELADA" across the page.
fn watermark(ops: &mut Vec<Operation>) {
    ops.push(Operation::new("q", vec![]));
    // 45-degree rotation matrix positioned mid-page.
    ops.push(Operation::new(
        "cm",
        vec![
            0.707f32.into(),
            0.707f32.into(),
            (-0.707f32).into(),
            0.707f32.into(),
            120.0f32.into(),
            250.0f32.into(),
        ],
    ));
    ops.push(Operation::new("g", vec![0.82.into()]));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F2".into(), 72.0f32.into()]));
    ops.push(Operation::new("Td", vec![0.into(), 0.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal("CANCELADA")],
    ));
    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

/// Fold to Latin-1 for the standard Type1 fonts; unmappable characters
/// become '?'.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_long_text() {
        let lines = wrap_text("aaaa bbbb cccc dddd", 9);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn keeps_explicit_line_breaks() {
        let lines = wrap_text("um\ndois", 80);
        assert_eq!(lines, vec!["um", "dois"]);
    }

    #[test]
    fn latin1_folds_unmappable() {
        assert_eq!(latin1("São—Paulo"), b"S\xe3o?Paulo".to_vec());
    }
}
