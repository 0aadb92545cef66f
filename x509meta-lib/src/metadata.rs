//! Presentation-ready certificate metadata.
//!
//! [`transform`] maps a parsed [`Certificate`] onto an [`X509Meta`] record
//! whose field names and value encodings follow the layout of
//! `openssl x509 -text`. Every value is already a display string or number,
//! so serializing the record needs no further formatting.

use crate::fields::{AltNames, Certificate, ExtKeyUsage, KeyUsage, PublicKey};
use crate::util::{hex_colon, strip_leading_zeros};
use serde::Serialize;
use time::OffsetDateTime;

/// Metadata record for one certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct X509Meta {
    pub version: u32,
    pub serial_number: String,
    pub issuer: String,
    pub subject: String,
    pub validity: Validity,
    pub subject_public_key_info: PublicKeyParameters,
    #[serde(rename = "X509v3Extensions")]
    pub x509v3_extensions: X509v3Extensions,
    pub authority_information: AuthorityInformation,
    pub subject_alternative_names: Vec<String>,
    pub certificate_policies: Vec<String>,
    #[serde(rename = "CRLDistributionPoints")]
    pub crl_distribution_points: Vec<String>,
    pub signature_algorithm: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Validity {
    pub not_before: String,
    pub not_after: String,
}

/// Public key algorithm and its per-algorithm parameters.
///
/// Serializes as `{"PublicKeyAlgorithm": "RSA", "Parameters": {...}}`.
/// The `Unknown` case carries no `Parameters` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "PublicKeyAlgorithm", content = "Parameters")]
pub enum PublicKeyParameters {
    #[serde(rename = "RSA", rename_all = "PascalCase")]
    Rsa {
        key_size_bits: u32,
        modulus: String,
        exponent: u64,
    },
    #[serde(rename = "DSA", rename_all = "PascalCase")]
    Dsa {
        p: String,
        q: String,
        g: String,
        y: String,
    },
    #[serde(rename = "ECDSA", rename_all = "PascalCase")]
    Ecdsa { curve: String, x: String, y: String },
    #[serde(rename_all = "PascalCase")]
    Ed25519 { public_key: String },
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct X509v3Extensions {
    pub key_usage: Vec<String>,
    pub extended_key_usage: Vec<String>,
    pub basic_constraints: BasicConstraintsMeta,
    pub subject_key_identifier: String,
    pub authority_key_identifier: String,
}

/// Basic Constraints as displayed.
///
/// `MaxPathLength` is omitted unless the certificate encoded a path length,
/// so an explicit zero stays distinguishable from "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BasicConstraintsMeta {
    #[serde(rename = "CA")]
    pub ca: bool,
    #[serde(rename = "MaxPathLength", skip_serializing_if = "Option::is_none")]
    pub max_path_length: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorityInformation {
    #[serde(rename = "OCSP")]
    pub ocsp: Vec<String>,
    #[serde(rename = "CAIssuers")]
    pub ca_issuers: Vec<String>,
}

/// Key usage labels in bit order.
static KEY_USAGE_LABELS: [(u16, &str); 9] = [
    (KeyUsage::DIGITAL_SIGNATURE, "Digital Signature"),
    (KeyUsage::CONTENT_COMMITMENT, "Content Commitment"),
    (KeyUsage::KEY_ENCIPHERMENT, "Key Encipherment"),
    (KeyUsage::DATA_ENCIPHERMENT, "Data Encipherment"),
    (KeyUsage::KEY_AGREEMENT, "Key Agreement"),
    (KeyUsage::CERT_SIGN, "Cert Sign"),
    (KeyUsage::CRL_SIGN, "CRL Sign"),
    (KeyUsage::ENCIPHER_ONLY, "Encipher Only"),
    (KeyUsage::DECIPHER_ONLY, "Decipher Only"),
];

/// Build the metadata record for a certificate.
///
/// Pure and deterministic: the same certificate always yields the same record.
pub fn transform(cert: &Certificate) -> X509Meta {
    let basic_constraints = cert
        .basic_constraints
        .map(|bc| BasicConstraintsMeta {
            ca: bc.ca,
            max_path_length: bc.max_path_len,
        })
        .unwrap_or_default();

    X509Meta {
        version: cert.version,
        serial_number: hex_colon(strip_leading_zeros(&cert.serial)),
        issuer: cert.issuer.to_rfc2253(),
        subject: cert.subject.to_rfc2253(),
        validity: Validity {
            not_before: format_time(&cert.not_before),
            not_after: format_time(&cert.not_after),
        },
        subject_public_key_info: public_key_parameters(&cert.public_key),
        x509v3_extensions: X509v3Extensions {
            key_usage: key_usage_labels(cert.key_usage),
            extended_key_usage: cert
                .ext_key_usage
                .iter()
                .map(|eku| eku_label(eku).to_string())
                .collect(),
            basic_constraints,
            subject_key_identifier: hex_colon(&cert.subject_key_id),
            authority_key_identifier: hex_colon(&cert.authority_key_id),
        },
        authority_information: AuthorityInformation {
            ocsp: cert.ocsp_servers.clone(),
            ca_issuers: cert.issuing_certificate_urls.clone(),
        },
        subject_alternative_names: alt_name_entries(&cert.alt_names),
        certificate_policies: cert.policies.clone(),
        crl_distribution_points: cert.crl_distribution_points.clone(),
        signature_algorithm: cert.signature_algorithm.to_string(),
        signature: hex_colon(&cert.signature),
    }
}

/// Format an instant as `"Mon D HH:MM:SS YYYY ZONE"`.
///
/// The day is not padded. The zone is `UTC` for UTC instants and a
/// `+hhmm`/`-hhmm` offset otherwise.
pub fn format_time(dt: &OffsetDateTime) -> String {
    let month = match u8::from(dt.month()) {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    };
    let offset = dt.offset();
    let zone = if offset.is_utc() {
        "UTC".to_string()
    } else {
        let (h, m, _) = offset.as_hms();
        let sign = if offset.is_negative() { '-' } else { '+' };
        format!("{}{:02}{:02}", sign, h.unsigned_abs(), m.unsigned_abs())
    };
    format!(
        "{} {} {:02}:{:02}:{:02} {} {}",
        month,
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.year(),
        zone
    )
}

fn public_key_parameters(key: &PublicKey) -> PublicKeyParameters {
    match key {
        PublicKey::Rsa { modulus, exponent } => PublicKeyParameters::Rsa {
            key_size_bits: PublicKey::rsa_bits(modulus),
            modulus: hex_colon(modulus),
            exponent: *exponent,
        },
        PublicKey::Dsa { p, q, g, y } => PublicKeyParameters::Dsa {
            p: hex_colon(strip_leading_zeros(p)),
            q: hex_colon(strip_leading_zeros(q)),
            g: hex_colon(strip_leading_zeros(g)),
            y: hex_colon(strip_leading_zeros(y)),
        },
        PublicKey::Ecdsa { curve, x, y } => PublicKeyParameters::Ecdsa {
            curve: curve.clone(),
            x: hex_colon(strip_leading_zeros(x)),
            y: hex_colon(strip_leading_zeros(y)),
        },
        PublicKey::Ed25519(bytes) => PublicKeyParameters::Ed25519 {
            public_key: hex_colon(bytes),
        },
        PublicKey::Unknown => PublicKeyParameters::Unknown,
    }
}

fn key_usage_labels(ku: KeyUsage) -> Vec<String> {
    KEY_USAGE_LABELS
        .iter()
        .filter(|(bit, _)| ku.contains(*bit))
        .map(|(_, label)| (*label).to_string())
        .collect()
}

fn eku_label(eku: &ExtKeyUsage) -> &'static str {
    match eku {
        ExtKeyUsage::Any => "Any",
        ExtKeyUsage::ServerAuth => "Server Auth",
        ExtKeyUsage::ClientAuth => "Client Auth",
        ExtKeyUsage::CodeSigning => "Code Signing",
        ExtKeyUsage::EmailProtection => "Email Protection",
        ExtKeyUsage::IpsecEndSystem => "IPSEC End System",
        ExtKeyUsage::IpsecTunnel => "IPSEC Tunnel",
        ExtKeyUsage::IpsecUser => "IPSEC User",
        ExtKeyUsage::TimeStamping => "Time Stamping",
        ExtKeyUsage::OcspSigning => "OCSP Signing",
        ExtKeyUsage::MicrosoftServerGatedCrypto => "Microsoft Server Gated Crypto",
        ExtKeyUsage::NetscapeServerGatedCrypto => "Netscape Server Gated Crypto",
        ExtKeyUsage::MicrosoftCommercialCodeSigning => "Microsoft Commercial Code Signing",
        ExtKeyUsage::MicrosoftKernelCodeSigning => "Microsoft Kernel Code Signing",
        ExtKeyUsage::Other(_) => "Unknown",
    }
}

// DNS names, then emails, then IPs, then URIs.
fn alt_name_entries(names: &AltNames) -> Vec<String> {
    let dns = names.dns.iter().map(|n| format!("DNS:{}", n));
    let emails = names.emails.iter().map(|e| format!("Email:{}", e));
    let ips = names.ips.iter().map(|ip| format!("IP:{}", ip));
    let uris = names.uris.iter().map(|u| format!("URI:{}", u));
    dns.chain(emails).chain(ips).chain(uris).collect()
}
