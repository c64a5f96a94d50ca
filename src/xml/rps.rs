use crate::core::*;

use super::xml_utils::{XmlResult, XmlWriter, format_aliquot, format_value};
use super::{ABRASF_NS, rps_element_id};

fn yes_no(flag: bool) -> &'static str {
    // Schema boolean convention: 1 = yes, 2 = no.
    if flag { "1" } else { "2" }
}

/// Generate the single-RPS XML fragment of a lot.
///
/// Produces `<Rps><InfRps Id="rps:N">…</InfRps></Rps>` with every mandatory
/// schema field populated from the business record. The fragment carries its
/// own namespace declaration so it stays self-contained once signed and
/// spliced into the lot envelope.
///
/// Fails with [`NfseError::Validation`] when a mandatory field is missing or
/// structurally invalid — an incomplete fragment is never emitted.
pub fn to_rps_xml(lot: &Lot) -> XmlResult {
    let errors = validate_rps(&lot.rps);
    if !errors.is_empty() {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(NfseError::Validation(msg));
    }

    let rps = &lot.rps;
    let mut w = XmlWriter::fragment();

    w.start_element_with_attrs("Rps", &[("xmlns", ABRASF_NS)])?;
    w.start_element_with_attrs("InfRps", &[("Id", rps_element_id(rps).as_str())])?;

    w.start_element("IdentificacaoRps")?;
    w.text_element("Numero", &rps.number.to_string())?;
    w.text_element("Serie", &rps.series)?;
    w.text_element("Tipo", &rps.kind.code().to_string())?;
    w.end_element("IdentificacaoRps")?;

    w.text_element("DataEmissao", &rps.issue_date.format("%Y-%m-%d").to_string())?;
    w.text_element("NaturezaOperacao", &rps.nature.code().to_string())?;
    if let Some(regime) = rps.special_tax_regime {
        w.text_element("RegimeEspecialTributacao", &regime.code().to_string())?;
    }
    w.text_element("OptanteSimplesNacional", yes_no(rps.simple_national))?;
    w.text_element("IncentivadorCultural", yes_no(rps.cultural_promoter))?;
    w.text_element("Status", &rps.status.code().to_string())?;

    write_service(&mut w, &rps.service)?;
    write_provider(&mut w, &rps.provider)?;
    write_taker(&mut w, &rps.taker)?;

    w.end_element("InfRps")?;
    w.end_element("Rps")?;

    w.into_string()
}

fn write_service(w: &mut XmlWriter, service: &Service) -> Result<(), NfseError> {
    let v = &service.values;

    w.start_element("Servico")?;
    w.start_element("Valores")?;
    w.text_element("ValorServicos", &format_value(v.service_value))?;
    w.text_element("ValorDeducoes", &format_value(v.deductions))?;
    w.text_element("ValorPis", &format_value(v.pis))?;
    w.text_element("ValorCofins", &format_value(v.cofins))?;
    w.text_element("ValorInss", &format_value(v.inss))?;
    w.text_element("ValorIr", &format_value(v.ir))?;
    w.text_element("ValorCsll", &format_value(v.csll))?;
    w.text_element("IssRetido", yes_no(v.iss_withheld))?;
    w.text_element("ValorIss", &format_value(v.iss_value))?;
    w.text_element("OutrasRetencoes", &format_value(v.other_withholdings))?;
    w.text_element("BaseCalculo", &format_value(v.calculation_base))?;
    w.text_element("Aliquota", &format_aliquot(v.aliquot))?;
    w.text_element("ValorLiquidoNfse", &format_value(v.net_value))?;
    w.text_element("DescontoIncondicionado", &format_value(v.unconditioned_discount))?;
    w.text_element("DescontoCondicionado", &format_value(v.conditioned_discount))?;
    w.end_element("Valores")?;

    w.text_element("ItemListaServico", &service.item_list)?;
    if let Some(code) = &service.municipal_tax_code {
        w.text_element("CodigoTributacaoMunicipio", code)?;
    }
    w.text_element("Discriminacao", &service.description)?;
    w.text_element("CodigoMunicipio", &service.municipality_code)?;
    w.end_element("Servico")?;
    Ok(())
}

fn write_provider(w: &mut XmlWriter, provider: &Provider) -> Result<(), NfseError> {
    w.start_element("Prestador")?;
    w.text_element("Cnpj", &provider.cnpj)?;
    w.text_element("InscricaoMunicipal", &provider.municipal_registration)?;
    w.end_element("Prestador")?;
    Ok(())
}

fn write_taker(w: &mut XmlWriter, taker: &Taker) -> Result<(), NfseError> {
    w.start_element("Tomador")?;

    w.start_element("IdentificacaoTomador")?;
    w.start_element("CpfCnpj")?;
    if taker.document.len() == 11 {
        w.text_element("Cpf", &taker.document)?;
    } else {
        w.text_element("Cnpj", &taker.document)?;
    }
    w.end_element("CpfCnpj")?;
    if let Some(registration) = &taker.municipal_registration {
        w.text_element("InscricaoMunicipal", registration)?;
    }
    w.end_element("IdentificacaoTomador")?;

    w.text_element("RazaoSocial", &taker.name)?;

    if let Some(address) = &taker.address {
        w.start_element("Endereco")?;
        if let Some(street) = &address.street {
            w.text_element("Endereco", street)?;
        }
        if let Some(number) = &address.number {
            w.text_element("Numero", number)?;
        }
        if let Some(complement) = &address.complement {
            w.text_element("Complemento", complement)?;
        }
        if let Some(neighborhood) = &address.neighborhood {
            w.text_element("Bairro", neighborhood)?;
        }
        w.text_element("CodigoMunicipio", &address.municipality_code)?;
        w.text_element("Uf", &address.state)?;
        w.text_element("Cep", &address.zip_code)?;
        w.end_element("Endereco")?;
    }

    if let Some(contact) = &taker.contact {
        w.start_element("Contato")?;
        if let Some(phone) = &contact.phone {
            w.text_element("Telefone", phone)?;
        }
        if let Some(email) = &contact.email {
            w.text_element("Email", email)?;
        }
        w.end_element("Contato")?;
    }

    w.end_element("Tomador")?;
    Ok(())
}
