use crate::core::{Nfse, NfseError};

use super::PrintMode;
use super::format::{format_percent, format_real, mask, mask_cep, mask_document, mask_phone};

/// Render the DANFSE HTML by substituting `{PLACEHOLDER}` markers in the
/// embedded template.
pub(super) fn render(nfse: &Nfse, logo_base64: &str, mode: PrintMode) -> Result<String, NfseError> {
    let v = &nfse.service.values;

    let special_regime = nfse
        .service
        .special_tax_regime
        .map(|regime| {
            format!(
                "<div class=\"box05\"><span class=\"subTitulo\">Regime Especial de Tributação:</span> {}</div>",
                regime.label()
            )
        })
        .unwrap_or_default();

    let simple_national = if nfse.service.simple_national {
        "<tr><td colspan=\"2\" class=\"bordaInferior\"><span class=\"subTitulo\">\
         Documento emitido por ME ou EPP optante pelo Simples Nacional.</span></td></tr>"
            .to_string()
    } else {
        String::new()
    };

    let replacements: Vec<(&str, String)> = vec![
        ("/* {PRINT_CSS}*/", print_css(mode).to_string()),
        ("{ANO}", nfse.year.to_string()),
        ("{NFSE_NUMERO}", nfse.number.clone()),
        ("{DATA_EMISSAO}", nfse.emission_date.clone()),
        ("{HORA_EMISSAO}", format!(" às {}", nfse.emission_time)),
        ("{COMPETENCIA}", nfse.competence.clone()),
        ("{CODIGO_VERIFICACAO}", nfse.verification_code.clone()),
        ("{LOGO_BASE_64}", logo_base64.to_string()),
        ("{NFE_SUBSTITUIDA}", replaced_markup(nfse)),
        ("{RAZAO_SOCIAL_PRESTADOR}", nfse.provider.name.clone()),
        ("{CPF_CNPJ_PRESTADOR}", mask_document(&nfse.provider.document)),
        (
            "{INSCRICAO_MUNICIPAL_PRESTADOR}",
            nfse.provider
                .municipal_registration
                .as_deref()
                .map(|r| mask(r, "#######/###-#"))
                .unwrap_or_else(|| "Não Informado".into()),
        ),
        ("{ENDERECO_PRESTADOR}", address_line(&nfse.provider)),
        ("{TELEFONE_PRESTADOR}", phone_of(&nfse.provider)),
        ("{EMAIL_PRESTADOR}", email_of(&nfse.provider)),
        ("{RAZAO_SOCIAL_TOMADOR}", nfse.taker.name.clone()),
        ("{CPF_CNPJ_TOMADOR}", mask_document(&nfse.taker.document)),
        (
            "{INSCRICAO_MUNICIPAL_TOMADOR}",
            nfse.taker
                .municipal_registration
                .as_deref()
                .map(|r| mask(r, "#######/###-#"))
                .unwrap_or_else(|| "Não Informado".into()),
        ),
        ("{ENDERECO_TOMADOR}", address_line(&nfse.taker)),
        ("{TELEFONE_TOMADOR}", phone_of(&nfse.taker)),
        ("{EMAIL_TOMADOR}", email_of(&nfse.taker)),
        ("{DESCRIMINACAO}", nfse.service.description.clone()),
        (
            "{CODIGO_TRIBUTACAO_MUNICIPAL}",
            nfse.service
                .municipal_tax_code
                .as_deref()
                .map(|c| mask(c, "####-#/##-##"))
                .unwrap_or_default(),
        ),
        (
            "{DESCRICAO_TRIBUTACAO_MUNICIPAL}",
            nfse.service.municipal_tax_description.clone().unwrap_or_default(),
        ),
        ("{ITEM_LISTA_SERVICO}", nfse.service.item_list.clone()),
        ("{DESCRICAO_LISTA_SERVICO}", nfse.service.item_description.clone()),
        ("{CODIGO_MUNICIPIO_GERADOR}", nfse.service.municipality_code.clone()),
        ("{NOME_MUNICIPIO_GERADOR}", nfse.service.municipality_name.clone()),
        ("{NATUREZA_OPERACAO}", nfse.service.nature.label().to_string()),
        ("{REGIME_ESPECIAL_TRIBUTACAO}", special_regime),
        ("{OPTANTE_PELO_SIMPLES}", simple_national),
        ("{VALOR_SERVICOS}", format_real(v.service_value)),
        ("{VALOR_DESCONTO_CONDICIONADO}", format_real(v.conditioned_discount)),
        ("{VALOR_DESCONTO_INCONDICIONADO}", format_real(v.unconditioned_discount)),
        (
            "{TOTAL_RETENCOES_FEDERAIS}",
            format_real(v.pis + v.cofins + v.inss + v.ir + v.csll + v.other_withholdings),
        ),
        (
            "{VALOR_ISS_RETIDO}",
            format_real(if v.iss_withheld {
                v.iss_value
            } else {
                rust_decimal::Decimal::ZERO
            }),
        ),
        ("{VALOR_LIQUIDO}", format_real(v.net_value)),
        ("{DEDUCOES}", format_real(v.deductions)),
        ("{BASE_CALCULO}", format_real(v.calculation_base)),
        ("{ALIQUOTA_SERVICOS}", format_percent(v.aliquot)),
        ("{VALOR_ISS}", format_real(v.iss_value)),
        ("{VALOR_PIS}", format_real(v.pis)),
        ("{VALOR_COFINS}", format_real(v.cofins)),
        ("{VALOR_IR}", format_real(v.ir)),
        ("{VALOR_CSLL}", format_real(v.csll)),
        ("{VALOR_INSS}", format_real(v.inss)),
    ];

    let mut html = TEMPLATE.to_string();
    for (placeholder, value) in &replacements {
        html = html.replace(placeholder, value);
    }

    if nfse.cancellation_code.is_some() {
        html = html.replace(
            "</body>",
            "<div style=\"position: fixed; opacity: 0.3; font-size: 72px; \
             transform: rotate(-45deg); top: 50%; left: 25%;\">CANCELADA</div></body>",
        );
    }

    Ok(html)
}

fn replaced_markup(nfse: &Nfse) -> String {
    match nfse.replaced_number.as_deref() {
        Some(number) if number.len() > 4 => format!(
            "<tr><td colspan=\"2\"><div class=\"box04\"><span>NFS-e Substituída: {}/{}</span></div></td></tr>",
            &number[..4],
            &number[4..]
        ),
        Some(number) => format!(
            "<tr><td colspan=\"2\"><div class=\"box04\"><span>NFS-e Substituída: {number}</span></div></td></tr>"
        ),
        None => String::new(),
    }
}

fn address_line(party: &crate::core::NfseParty) -> String {
    match &party.address {
        Some(a) => {
            let mut parts = Vec::new();
            if let Some(street) = &a.street {
                parts.push(street.clone());
            }
            if let Some(number) = &a.number {
                parts.push(number.clone());
            }
            if let Some(neighborhood) = &a.neighborhood {
                parts.push(neighborhood.clone());
            }
            parts.push(format!("CEP {}", mask_cep(&a.zip_code)));
            parts.push(a.state.clone());
            parts.join(", ")
        }
        None => String::new(),
    }
}

fn phone_of(party: &crate::core::NfseParty) -> String {
    party
        .contact
        .as_ref()
        .and_then(|c| c.phone.as_deref())
        .map(mask_phone)
        .unwrap_or_default()
}

fn email_of(party: &crate::core::NfseParty) -> String {
    party
        .contact
        .as_ref()
        .and_then(|c| c.email.as_deref())
        .unwrap_or_default()
        .to_string()
}

fn print_css(mode: PrintMode) -> &'static str {
    match mode {
        PrintMode::Inline => {
            "@media print {
                body { font: 19px \"Trebuchet MS\", Verdana, Arial; color: #175366; text-align: center; }
                .logo { max-width: 230px; padding: 10px; }
                .noprint { display: none; }
                .box01, .box02, .box03, .box04, .box05 { background: none; }
                .numeroDestaque { font-size: 30px; }
                .valorLiquido, .issRetido { font-size: 20px; color: #c32b16; padding: 5px 5px 2px; }
                .subTitulo { font-size: 19px; font-weight: bold; }
                .tableTributos th { font-size: 19px; background: #eeeeee; text-align: center; }
                .tableTributos td { font-size: 19px; background: #ffffff; text-align: right; }
                .dataEmissao { font-size: 19px; font-weight: bold; }
                .title { font-size: 25px; }
                .linhaDivisao { display: none; }
                .servicos { font-size: 19px; }
            }"
        }
        PrintMode::Compact => {
            "@media print {
                body { font: 10px \"Trebuchet MS\", Verdana, Arial; color: #175366; text-align: center; }
                .noprint { display: none; }
                .box01, .box02, .box03, .box04, .box05 { background: none; }
                .linhaDivisao { display: block; margin-bottom: -1px; }
                .servicos { padding: 0 2px; font-size: 9px; }
                .subTitulo { font-size: 11px; font-weight: bold; }
            }"
        }
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8"/>
<title>NFS-e {NFSE_NUMERO}/{ANO}</title>
<style>
body { font: 12px "Trebuchet MS", Verdana, Arial; color: #175366; margin: 0 auto; max-width: 780px; }
.title { font-size: 18px; font-weight: bold; text-align: center; }
.box01, .box02, .box03, .box04, .box05 { border: 1px solid #65a0c0; margin: 4px 0; padding: 6px; background: #f4f9fc; }
.subTitulo { font-weight: bold; }
.numeroDestaque { font-size: 22px; font-weight: bold; }
.dataEmissao { font-weight: bold; }
.valorLiquido { font-size: 16px; color: #c32b16; font-weight: bold; }
.servicos { text-align: left; white-space: pre-wrap; }
.tableTributos { width: 100%; border-collapse: collapse; }
.tableTributos th { background: #eeeeee; padding: 2px 4px; }
.tableTributos td { text-align: right; padding: 2px 4px; }
.linhaDivisao { border-top: 1px dashed #65a0c0; }
.logo { max-width: 180px; }
/* {PRINT_CSS}*/
</style>
</head>
<body>
<table width="100%">
<tr>
<td width="20%"><img class="logo" src="data:image/png;base64,{LOGO_BASE_64}" alt="logo"/></td>
<td width="55%">
<div class="title">NOTA FISCAL DE SERVIÇOS ELETRÔNICA — NFS-e</div>
<div class="dataEmissao">Emitida em {DATA_EMISSAO}{HORA_EMISSAO} — Competência {COMPETENCIA}</div>
</td>
<td width="25%">
<div class="box01">
<span class="subTitulo">Número</span><br/>
<span class="numeroDestaque">{NFSE_NUMERO}/{ANO}</span><br/>
<span class="subTitulo">Código de Verificação</span><br/>
{CODIGO_VERIFICACAO}
</div>
</td>
</tr>
{NFE_SUBSTITUIDA}
</table>
<div class="box02">
<span class="subTitulo">PRESTADOR DE SERVIÇOS</span><br/>
{RAZAO_SOCIAL_PRESTADOR}<br/>
CPF/CNPJ: {CPF_CNPJ_PRESTADOR} — Inscrição Municipal: {INSCRICAO_MUNICIPAL_PRESTADOR}<br/>
{ENDERECO_PRESTADOR}<br/>
Telefone: {TELEFONE_PRESTADOR} — E-mail: {EMAIL_PRESTADOR}
</div>
<div class="box02">
<span class="subTitulo">TOMADOR DE SERVIÇOS</span><br/>
{RAZAO_SOCIAL_TOMADOR}<br/>
CPF/CNPJ: {CPF_CNPJ_TOMADOR} — Inscrição Municipal: {INSCRICAO_MUNICIPAL_TOMADOR}<br/>
{ENDERECO_TOMADOR}<br/>
Telefone: {TELEFONE_TOMADOR} — E-mail: {EMAIL_TOMADOR}
</div>
<div class="box03">
<span class="subTitulo">DISCRIMINAÇÃO DOS SERVIÇOS</span>
<div class="servicos">{DESCRIMINACAO}</div>
</div>
<div class="box03">
<span class="subTitulo">Item da Lista de Serviços:</span> {ITEM_LISTA_SERVICO} — {DESCRICAO_LISTA_SERVICO}<br/>
<span class="subTitulo">Código de Tributação Municipal:</span> {CODIGO_TRIBUTACAO_MUNICIPAL} {DESCRICAO_TRIBUTACAO_MUNICIPAL}<br/>
<span class="subTitulo">Município Gerador:</span> {NOME_MUNICIPIO_GERADOR} ({CODIGO_MUNICIPIO_GERADOR})<br/>
<span class="subTitulo">Natureza da Operação:</span> {NATUREZA_OPERACAO}
</div>
{REGIME_ESPECIAL_TRIBUTACAO}
<table class="tableTributos">
<tr><th>PIS</th><th>COFINS</th><th>IR</th><th>CSLL</th><th>INSS</th><th>Retenções Federais</th></tr>
<tr><td>{VALOR_PIS}</td><td>{VALOR_COFINS}</td><td>{VALOR_IR}</td><td>{VALOR_CSLL}</td><td>{VALOR_INSS}</td><td>{TOTAL_RETENCOES_FEDERAIS}</td></tr>
</table>
<div class="box04">
<span class="subTitulo">Valor dos Serviços:</span> {VALOR_SERVICOS} —
<span class="subTitulo">Deduções:</span> {DEDUCOES} —
<span class="subTitulo">Desconto Incondicionado:</span> {VALOR_DESCONTO_INCONDICIONADO} —
<span class="subTitulo">Desconto Condicionado:</span> {VALOR_DESCONTO_CONDICIONADO}<br/>
<span class="subTitulo">Base de Cálculo:</span> {BASE_CALCULO} —
<span class="subTitulo">Alíquota:</span> {ALIQUOTA_SERVICOS} —
<span class="subTitulo">Valor do ISS:</span> {VALOR_ISS} —
<span class="subTitulo">ISS Retido:</span> {VALOR_ISS_RETIDO}<br/>
<span class="valorLiquido">VALOR LÍQUIDO: {VALOR_LIQUIDO}</span>
</div>
<table width="100%">{OPTANTE_PELO_SIMPLES}</table>
</body>
</html>
"#;
