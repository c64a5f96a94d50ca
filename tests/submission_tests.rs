#![cfg(feature = "soap")]

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use nfse::core::*;
use nfse::signature::Signer;
use nfse::soap::RpsToNfse;
use rust_decimal_macros::dec;

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::{X509, X509NameBuilder};

// --- fixtures ---

fn test_pfx(passphrase: &str) -> Vec<u8> {
    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "ACME Servicos Digitais Ltda")
        .unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&pkey).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();
    let cert = builder.build();

    let mut pfx = Pkcs12::builder();
    pfx.name("test");
    pfx.pkey(&pkey);
    pfx.cert(&cert);
    pfx.build2(passphrase).unwrap().to_der().unwrap()
}

fn settings(url: &str, certificate_path: PathBuf) -> Settings {
    Settings {
        issuer: Issuer {
            cnpj: "46963370000125".into(),
            municipal_registration: "1234567".into(),
            city_code: "3550308".into(),
        },
        certificate: Certificate {
            path: certificate_path,
            passphrase: "secret".into(),
        },
        endpoint: Endpoint::new(url, "http://city.example/nfse"),
    }
}

fn service_at(url: &str) -> RpsToNfse {
    let signer = Signer::from_pfx_der(&test_pfx("secret"), "secret").unwrap();
    RpsToNfse::with_signer(settings(url, PathBuf::from("/unused.pfx")), signer).unwrap()
}

fn sample_lot() -> Lot {
    let rps = RpsBuilder::new(42, "A", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .provider(Provider::new("46963370000125", "1234567"))
        .taker(TakerBuilder::new("11144477735", "João da Silva").build())
        .service(
            ServiceBuilder::new("Desenvolvimento de software", "01.05", "3550308")
                .value(dec!(1500))
                .aliquot(dec!(0.05))
                .build(),
        )
        .build()
        .unwrap();
    LotBuilder::new("7").rps(rps).build().unwrap()
}

// --- in-process SOAP endpoint stub ---

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut tmp).unwrap();
        if n == 0 {
            return buf;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    buf
}

/// Serve `connections` requests with a fixed response, returning the raw
/// request bytes for assertions.
fn spawn_stub(
    status_line: &'static str,
    body: String,
    connections: usize,
) -> (String, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/ws", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for _ in 0..connections {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            let response = format!(
                "{status_line}\r\nContent-Type: text/xml; charset=utf-8\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        requests
    });
    (url, handle)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn soap_reply(inner_xml: &str) -> String {
    format!(
        "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body><GerarNfseResponse xmlns=\"http://city.example/nfse\">\
         <outputXML>{}</outputXML>\
         </GerarNfseResponse></soap:Body></soap:Envelope>",
        escape_xml(inner_xml)
    )
}

const SUCCESS_PAYLOAD: &str = "<GerarNfseResposta xmlns=\"http://www.abrasf.org.br/nfse.xsd\">\
    <ListaNfse><CompNfse><Nfse><InfNfse>\
    <Numero>8090</Numero><CodigoVerificacao>ABCD-1234</CodigoVerificacao>\
    <DataEmissao>2024-06-15T10:32:01</DataEmissao>\
    </InfNfse></Nfse></CompNfse></ListaNfse></GerarNfseResposta>";

const REJECTION_PAYLOAD: &str = "<GerarNfseResposta xmlns=\"http://www.abrasf.org.br/nfse.xsd\">\
    <ListaMensagemRetorno>\
    <MensagemRetorno><Codigo>E001</Codigo><Mensagem>Invalid CNPJ</Mensagem></MensagemRetorno>\
    <MensagemRetorno><Codigo>E002</Codigo><Mensagem>Missing service code</Mensagem></MensagemRetorno>\
    </ListaMensagemRetorno></GerarNfseResposta>";

// --- pipeline behavior ---

#[test]
fn issued_nfse_is_classified_as_success() {
    let (url, stub) = spawn_stub("HTTP/1.1 200 OK", soap_reply(SUCCESS_PAYLOAD), 1);
    let result = service_at(&url).submit(&sample_lot());

    let SubmissionResult::Issued(payload) = result else {
        panic!("expected Issued, got {result:?}");
    };
    assert_eq!(payload.nfse_number.as_deref(), Some("8090"));
    assert_eq!(payload.verification_code.as_deref(), Some("ABCD-1234"));
    assert_eq!(payload.raw_xml, SUCCESS_PAYLOAD);

    let requests = stub.join().unwrap();
    let request = String::from_utf8_lossy(&requests[0]).to_string();
    assert!(request.contains("POST /ws"));
    // Header names travel lowercased; the action value must be intact.
    assert!(request.to_lowercase().contains("soapaction"));
    assert!(request.contains("\"http://city.example/nfse/GerarNfseRequest\""));
    assert!(request.contains("<GerarNfseRequest xmlns=\"http://city.example/nfse\">"));
    // The signed lot travels escaped inside inputXML.
    assert!(request.contains("<inputXML>"));
    assert!(request.contains("&lt;EnviarLoteRpsEnvio"));
    assert!(request.contains("&lt;Signature"));
}

#[test]
fn rejection_messages_are_preserved_verbatim_in_order() {
    let (url, stub) = spawn_stub("HTTP/1.1 200 OK", soap_reply(REJECTION_PAYLOAD), 1);
    let result = service_at(&url).submit(&sample_lot());
    stub.join().unwrap();

    let SubmissionResult::Rejected(messages) = result else {
        panic!("expected Rejected, got {result:?}");
    };
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].code, "E001");
    assert_eq!(messages[0].message, "Invalid CNPJ");
    assert_eq!(messages[1].code, "E002");
    assert_eq!(messages[1].message, "Missing service code");
}

#[test]
fn resubmission_yields_the_same_classification() {
    let (url, stub) = spawn_stub("HTTP/1.1 200 OK", soap_reply(REJECTION_PAYLOAD), 2);
    let service = service_at(&url);
    let lot = sample_lot();

    let first = service.submit(&lot);
    let second = service.submit(&lot);
    stub.join().unwrap();

    assert!(first.is_rejected());
    assert!(second.is_rejected());
}

#[test]
fn unreachable_endpoint_is_a_transport_failure() {
    // Bind and immediately drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/ws", listener.local_addr().unwrap());
    drop(listener);

    let result = service_at(&url).submit(&sample_lot());
    let SubmissionResult::Failed(error) = result else {
        panic!("expected Failed, got {result:?}");
    };
    assert!(matches!(error, NfseError::Transport(_)));
}

#[test]
fn unparseable_authority_payload_is_unexpected_response() {
    let (url, stub) = spawn_stub("HTTP/1.1 200 OK", soap_reply("this is not xml at all"), 1);
    let result = service_at(&url).submit(&sample_lot());
    stub.join().unwrap();

    let SubmissionResult::Failed(error) = result else {
        panic!("expected Failed, got {result:?}");
    };
    assert!(matches!(error, NfseError::UnexpectedResponse(_)));
}

#[test]
fn soap_fault_is_a_transport_failure() {
    let fault = "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
                 <soap:Body><soap:Fault><faultcode>soap:Server</faultcode>\
                 <faultstring>internal error</faultstring></soap:Fault></soap:Body>\
                 </soap:Envelope>";
    let (url, stub) = spawn_stub("HTTP/1.1 200 OK", fault.to_string(), 1);
    let result = service_at(&url).submit(&sample_lot());
    stub.join().unwrap();

    let SubmissionResult::Failed(error) = result else {
        panic!("expected Failed, got {result:?}");
    };
    match error {
        NfseError::Transport(msg) => assert!(msg.contains("internal error"), "got: {msg}"),
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[test]
fn http_error_is_a_transport_failure() {
    let (url, stub) = spawn_stub(
        "HTTP/1.1 500 Internal Server Error",
        "<html>boom</html>".to_string(),
        1,
    );
    let result = service_at(&url).submit(&sample_lot());
    stub.join().unwrap();

    let SubmissionResult::Failed(error) = result else {
        panic!("expected Failed, got {result:?}");
    };
    assert!(matches!(error, NfseError::Transport(_)));
}

// --- certificate handling ---

#[test]
fn bad_certificate_fails_before_any_network_call() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let url = format!("http://{}/ws", listener.local_addr().unwrap());

    let error = RpsToNfse::new(settings(&url, PathBuf::from("/nonexistent/issuer.pfx")))
        .err()
        .expect("construction must fail");
    assert!(matches!(error, NfseError::CertificateLoad(_)));

    // The endpoint must never have been contacted.
    match listener.accept() {
        Err(e) if e.kind() == ErrorKind::WouldBlock => {}
        other => panic!("unexpected connection attempt: {other:?}"),
    }
}

#[test]
fn construction_loads_certificate_from_disk() {
    let path = std::env::temp_dir().join(format!("nfse-test-{}.pfx", std::process::id()));
    std::fs::write(&path, test_pfx("secret")).unwrap();

    let (url, stub) = spawn_stub("HTTP/1.1 200 OK", soap_reply(SUCCESS_PAYLOAD), 1);
    let service = RpsToNfse::new(settings(&url, path.clone())).unwrap();
    let result = service.submit(&sample_lot());
    stub.join().unwrap();
    std::fs::remove_file(&path).ok();

    assert!(result.is_issued());
    assert_eq!(service.settings().issuer.cnpj, "46963370000125");
}
