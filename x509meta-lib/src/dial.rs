//! TLS transport: connect to a peer and collect its certificate chain.
//!
//! The handshake accepts any certificate chain. Trust is still checked
//! against the configured roots, but a failure is reported through a
//! [`WarningSink`] instead of aborting the connection, so that expired,
//! self-signed or otherwise invalid chains can be inspected.

use crate::fields::Certificate;
use crate::parser::parse_der;
use crate::MetaError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use std::io::ErrorKind;
use std::net::{Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Port used when an address does not name one.
pub const DEFAULT_PORT: u16 = 443;

/// Receives diagnostics that must not mix with the data output.
pub trait WarningSink: Send + Sync + std::fmt::Debug {
    fn warn(&self, message: &str);
}

/// Writes warnings to standard error as `WARNING: <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl WarningSink for StderrSink {
    fn warn(&self, message: &str) {
        eprintln!("WARNING: {}", message);
    }
}

/// Connection settings for [`dial`].
#[derive(Debug, Clone)]
pub struct DialOptions {
    /// Bound on the whole dial: TCP connect plus TLS handshake.
    pub timeout: Duration,
    /// Roots used for the trust check. `None` loads the platform store,
    /// falling back to the bundled Mozilla roots when it is empty.
    pub trust_anchors: Option<Vec<CertificateDer<'static>>>,
}

impl Default for DialOptions {
    fn default() -> Self {
        DialOptions {
            timeout: Duration::from_secs(3),
            trust_anchors: None,
        }
    }
}

/// Append `:443` to an address that has no port.
///
/// Accepts `host`, `host:port`, `[v6]`, `[v6]:port` and bare IPv6 literals.
pub fn with_default_port(addr: &str) -> String {
    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((_, "")) => format!("{}:{}", addr, DEFAULT_PORT),
            _ => addr.to_string(),
        };
    }
    if addr.parse::<Ipv6Addr>().is_ok() {
        return format!("[{}]:{}", addr, DEFAULT_PORT);
    }
    if addr.contains(':') {
        addr.to_string()
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    }
}

/// Host part of a `host:port` address, without IPv6 brackets.
fn host_of(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(host, _)| host);
    }
    addr.rsplit_once(':').map_or(addr, |(host, _)| host)
}

/// Connect to `addr`, complete a TLS handshake and return the peer's
/// certificate chain, leaf first.
///
/// A chain that fails the trust check is still returned; the failure is
/// passed to `sink` as `certificate verification failed: <reason>`.
pub fn dial(
    addr: &str,
    options: &DialOptions,
    sink: Arc<dyn WarningSink>,
) -> Result<Vec<Certificate>, MetaError> {
    let addr = with_default_port(addr);
    let host = host_of(&addr);
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| MetaError::Connection(format!("invalid server name '{}': {}", host, e)))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = InspectingVerifier::new(options, provider.clone(), sink);
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| MetaError::Connection(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    let deadline = Instant::now() + options.timeout;
    let mut sock = connect(&addr, deadline)?;
    let mut conn = ClientConnection::new(Arc::new(config), server_name)
        .map_err(|e| MetaError::Connection(e.to_string()))?;

    handshake(&mut conn, &mut sock, &addr, deadline)?;
    tracing::debug!(%addr, version = ?conn.protocol_version(), "handshake complete");

    let chain: Vec<CertificateDer<'static>> = conn
        .peer_certificates()
        .map(|certs| certs.to_vec())
        .unwrap_or_default();

    conn.send_close_notify();
    while conn.wants_write() {
        if let Err(e) = conn.write_tls(&mut sock) {
            tracing::debug!(%addr, "close_notify not delivered: {}", e);
            break;
        }
    }

    if chain.is_empty() {
        return Err(MetaError::Connection(format!("{} presented no certificates", addr)));
    }
    tracing::debug!(%addr, count = chain.len(), "received peer certificates");
    chain.iter().map(|der| parse_der(der.as_ref())).collect()
}

fn timed_out(addr: &str) -> MetaError {
    MetaError::Connection(format!("connection to {} timed out", addr))
}

/// Time left before `deadline`, or a timeout error once it has passed.
fn remaining(addr: &str, deadline: Instant) -> Result<Duration, MetaError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(timed_out(addr));
    }
    Ok(left)
}

fn connect(addr: &str, deadline: Instant) -> Result<TcpStream, MetaError> {
    let targets: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| MetaError::Connection(format!("could not resolve {}: {}", addr, e)))?
        .collect();

    let mut last_err = None;
    for target in targets {
        tracing::debug!(%target, "connecting");
        match TcpStream::connect_timeout(&target, remaining(addr, deadline)?) {
            Ok(sock) => return Ok(sock),
            Err(e) => last_err = Some(e),
        }
    }
    Err(MetaError::Connection(match last_err {
        Some(e) => format!("could not connect to {}: {}", addr, e),
        None => format!("{} resolved to no addresses", addr),
    }))
}

/// Drive the handshake to completion, shrinking the socket timeouts so the
/// whole exchange finishes before `deadline` even if the peer trickles bytes.
fn handshake(
    conn: &mut ClientConnection,
    sock: &mut TcpStream,
    addr: &str,
    deadline: Instant,
) -> Result<(), MetaError> {
    let failed = |e: &dyn std::fmt::Display| {
        MetaError::Connection(format!("TLS handshake with {} failed: {}", addr, e))
    };
    let io_failed = |e: std::io::Error| match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => timed_out(addr),
        _ => failed(&e),
    };

    while conn.is_handshaking() {
        let left = remaining(addr, deadline)?;
        sock.set_read_timeout(Some(left))
            .and_then(|_| sock.set_write_timeout(Some(left)))
            .map_err(|e| failed(&e))?;

        if conn.wants_write() {
            conn.write_tls(sock).map_err(io_failed)?;
            continue;
        }
        if conn.read_tls(sock).map_err(io_failed)? == 0 {
            return Err(failed(&"peer closed the connection"));
        }
        if let Err(e) = conn.process_new_packets() {
            // Best effort: let the peer see the alert.
            let _ = conn.write_tls(sock);
            return Err(failed(&e));
        }
    }

    while conn.wants_write() {
        conn.write_tls(sock).map_err(io_failed)?;
    }
    Ok(())
}

fn root_store(options: &DialOptions) -> RootCertStore {
    let mut roots = RootCertStore::empty();
    if let Some(anchors) = &options.trust_anchors {
        let (added, ignored) = roots.add_parsable_certificates(anchors.iter().cloned());
        tracing::debug!(added, ignored, "loaded configured trust anchors");
        return roots;
    }

    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        tracing::debug!("native certificate store: {}", e);
    }
    let (added, _) = roots.add_parsable_certificates(native.certs);
    if added == 0 {
        tracing::debug!("no native roots found, using bundled webpki roots");
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    } else {
        tracing::debug!(added, "loaded native trust anchors");
    }
    roots
}

/// Accepts every chain, reporting trust failures to a [`WarningSink`].
///
/// Handshake signatures are still verified, so the peer must hold the key
/// for the certificate it presents.
#[derive(Debug)]
struct InspectingVerifier {
    webpki: Option<Arc<WebPkiServerVerifier>>,
    provider: Arc<CryptoProvider>,
    sink: Arc<dyn WarningSink>,
}

impl InspectingVerifier {
    fn new(
        options: &DialOptions,
        provider: Arc<CryptoProvider>,
        sink: Arc<dyn WarningSink>,
    ) -> Self {
        let roots = Arc::new(root_store(options));
        let webpki = match WebPkiServerVerifier::builder_with_provider(roots, provider.clone())
            .build()
        {
            Ok(verifier) => Some(verifier),
            Err(e) => {
                tracing::debug!("trust verifier unavailable: {}", e);
                None
            }
        };
        InspectingVerifier {
            webpki,
            provider,
            sink,
        }
    }
}

impl ServerCertVerifier for InspectingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let outcome = match &self.webpki {
            Some(webpki) => webpki
                .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            None => Err("no trust anchors available".to_string()),
        };
        if let Err(reason) = outcome {
            self.sink
                .warn(&format!("certificate verification failed: {}", reason));
        }
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
