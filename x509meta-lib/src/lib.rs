//! x509meta-lib: Library for rendering X.509 certificates as structured metadata.
//!
//! Certificates can come from a live TLS peer, a PEM bundle, or a raw DER blob.
//! Each one is parsed into a [`Certificate`], transformed into an [`X509Meta`]
//! record whose fields are already in display form (colon-separated hex,
//! decoded usage flags, per-algorithm key parameters), and serialized as
//! indented JSON resembling `openssl x509 -text`.

pub mod dial;
mod fields;
mod metadata;
mod oid;
mod parser;
pub mod pem;
mod reader;
mod source;
mod util;
mod writer;

pub use dial::{dial, with_default_port, DialOptions, StderrSink, WarningSink};
pub use fields::{
    AltNames, BasicConstraints, Certificate, DistinguishedName, ExtKeyUsage, KeyUsage, NameAttribute,
    PublicKey, SignatureAlgorithm,
};
pub use metadata::{
    format_time, transform, AuthorityInformation, BasicConstraintsMeta, PublicKeyParameters,
    Validity, X509Meta, X509v3Extensions,
};
pub use parser::parse_der;
pub use reader::{read_der, read_pem};
pub use source::{open_input, CertSource};
pub use util::hex_colon;
pub use writer::{write_many, write_one, write_pem};

/// Errors returned by x509meta-lib.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Zero or more than one certificate source was selected.
    #[error("{0}")]
    InputSelection(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("could not read data: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to decode PEM: {0}")]
    Decode(String),

    #[error("failed to parse certificate: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
