#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! TLS transport tests against an in-process rustls server on 127.0.0.1.
//!
//! The server presents the fixture leaf and intermediate from
//! `tests/certs/`. Trust is controlled through `DialOptions::trust_anchors`
//! so the results do not depend on the host's certificate store.

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection};
use std::io::Write;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use x509meta_lib::pem;
use x509meta_lib::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn certs_dir() -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.pop(); // up from x509meta-lib to workspace root
    p.push("tests");
    p.push("certs");
    p
}

fn pem_contents(name: &str) -> Vec<Vec<u8>> {
    let data = std::fs::read(certs_dir().join(name)).unwrap();
    pem::blocks(&data).map(|b| b.contents).collect()
}

fn cert_der(name: &str) -> CertificateDer<'static> {
    CertificateDer::from(pem_contents(name).remove(0))
}

/// Records warnings instead of printing them.
#[derive(Debug, Default)]
struct Recorder(Mutex<Vec<String>>);

impl WarningSink for Recorder {
    fn warn(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

impl Recorder {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Serve one TLS connection with the leaf + intermediate chain.
fn spawn_server() -> (u16, JoinHandle<()>) {
    let chain = vec![cert_der("leaf.pem"), cert_der("int.pem")];
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        pem_contents("leaf.key").remove(0),
    ));
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .unwrap();
    let config = Arc::new(config);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let (mut sock, _) = listener.accept().unwrap();
        sock.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut conn = ServerConnection::new(config).unwrap();
        while conn.is_handshaking() {
            if conn.complete_io(&mut sock).is_err() {
                return;
            }
        }
        // Wait for the client's close_notify.
        let _ = conn.complete_io(&mut sock);
    });
    (port, handle)
}

fn options(anchor: &str) -> DialOptions {
    DialOptions {
        timeout: Duration::from_secs(5),
        trust_anchors: Some(vec![cert_der(anchor)]),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn trusted_chain_has_no_warning() {
    let (port, server) = spawn_server();
    let sink = Arc::new(Recorder::default());
    let certs = dial(
        &format!("localhost:{}", port),
        &options("root.pem"),
        sink.clone(),
    )
    .unwrap();
    server.join().unwrap();

    assert_eq!(certs.len(), 2);
    assert_eq!(
        certs[0].subject.to_rfc2253(),
        "CN=leaf.example.com,O=Example Org,C=US"
    );
    assert_eq!(
        certs[1].subject.to_rfc2253(),
        "CN=Example Intermediate CA,O=Example Org,C=US"
    );
    assert!(sink.messages().is_empty(), "{:?}", sink.messages());
}

#[test]
fn trusted_chain_by_ip_address() {
    let (port, server) = spawn_server();
    let sink = Arc::new(Recorder::default());
    let certs = dial(
        &format!("127.0.0.1:{}", port),
        &options("root.pem"),
        sink.clone(),
    )
    .unwrap();
    server.join().unwrap();

    assert_eq!(certs.len(), 2);
    assert!(sink.messages().is_empty(), "{:?}", sink.messages());
}

#[test]
fn untrusted_chain_warns_and_still_returns_certificates() {
    let (port, server) = spawn_server();
    let sink = Arc::new(Recorder::default());
    // An unrelated self-signed certificate as the only trust anchor.
    let certs = dial(
        &format!("localhost:{}", port),
        &options("ec-p256.pem"),
        sink.clone(),
    )
    .unwrap();
    server.join().unwrap();

    let warnings = sink.messages();
    assert_eq!(warnings.len(), 1, "{:?}", warnings);
    assert!(
        warnings[0].starts_with("certificate verification failed: "),
        "{}",
        warnings[0]
    );

    let mut out = Vec::new();
    write_one(&mut out, &transform(&certs[0])).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["Subject"], "CN=leaf.example.com,O=Example Org,C=US");
    assert_eq!(json["SubjectPublicKeyInfo"]["Parameters"]["KeySizeBits"], 2048);
}

#[test]
fn chain_can_be_reexported_as_pem() {
    let (port, server) = spawn_server();
    let certs = dial(
        &format!("localhost:{}", port),
        &options("root.pem"),
        Arc::new(Recorder::default()),
    )
    .unwrap();
    server.join().unwrap();

    let mut out = Vec::new();
    write_pem(&mut out, &certs).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("-----BEGIN CERTIFICATE-----").count(), 2);
    assert_eq!(read_pem(text.as_bytes()).unwrap(), certs);

    let expected = std::fs::read(certs_dir().join("leaf.der")).unwrap();
    assert_eq!(certs[0].raw, expected);
}

#[test]
fn silent_peer_times_out() {
    // Accepted by the kernel backlog but never answered.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let opts = DialOptions {
        timeout: Duration::from_millis(300),
        trust_anchors: Some(Vec::new()),
    };
    let err = dial(
        &format!("127.0.0.1:{}", port),
        &opts,
        Arc::new(Recorder::default()),
    )
    .unwrap_err();
    assert!(matches!(err, MetaError::Connection(_)), "{:?}", err);
    drop(listener);
}

#[test]
fn trickling_peer_is_cut_off_at_deadline() {
    // A handshake record header announcing 16 KiB, then one byte every
    // 100ms: each read succeeds well within the timeout.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let (mut sock, _) = listener.accept().unwrap();
        let header = [0x16u8, 0x03, 0x03, 0x40, 0x00];
        for byte in header.iter().chain(std::iter::repeat(&0u8)).take(40) {
            if sock.write_all(&[*byte]).is_err() {
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    });

    let opts = DialOptions {
        timeout: Duration::from_millis(500),
        trust_anchors: Some(Vec::new()),
    };
    let start = Instant::now();
    let err = dial(
        &format!("127.0.0.1:{}", port),
        &opts,
        Arc::new(Recorder::default()),
    )
    .unwrap_err();
    let elapsed = start.elapsed();
    server.join().unwrap();

    assert!(matches!(err, MetaError::Connection(_)), "{:?}", err);
    assert!(err.to_string().contains("timed out"), "{}", err);
    assert!(elapsed < Duration::from_secs(2), "{:?}", elapsed);
}

#[test]
fn refused_connection_is_connection_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = dial(
        &format!("127.0.0.1:{}", port),
        &DialOptions {
            timeout: Duration::from_secs(1),
            trust_anchors: Some(Vec::new()),
        },
        Arc::new(Recorder::default()),
    )
    .unwrap_err();
    assert!(matches!(err, MetaError::Connection(_)), "{:?}", err);
}
