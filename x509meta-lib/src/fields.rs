//! Certificate data types produced by the parser.
//!
//! These are plain owned values with no display formatting applied; the
//! metadata transformer turns them into presentation-ready records.

use crate::oid;
use std::net::IpAddr;
use time::OffsetDateTime;

/// A parsed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// Certificate version (1, 2, or 3).
    pub version: u32,
    /// Serial number as a big-endian magnitude (no sign byte).
    pub serial: Vec<u8>,
    pub issuer: DistinguishedName,
    pub subject: DistinguishedName,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub public_key: PublicKey,
    pub key_usage: KeyUsage,
    /// Extended key usages in the order they appear in the certificate.
    pub ext_key_usage: Vec<ExtKeyUsage>,
    /// `None` when the certificate carries no Basic Constraints extension.
    pub basic_constraints: Option<BasicConstraints>,
    pub subject_key_id: Vec<u8>,
    pub authority_key_id: Vec<u8>,
    pub alt_names: AltNames,
    /// Certificate policy OIDs in dotted-decimal form.
    pub policies: Vec<String>,
    pub crl_distribution_points: Vec<String>,
    pub ocsp_servers: Vec<String>,
    pub issuing_certificate_urls: Vec<String>,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature: Vec<u8>,
    /// DER encoding of the whole certificate.
    pub raw: Vec<u8>,
}

/// Distinguished name as an ordered sequence of RDNs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    /// RDNs in encoding order. Each RDN holds one or more attributes.
    pub rdns: Vec<Vec<NameAttribute>>,
}

/// A single attribute type and value inside an RDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAttribute {
    /// Attribute type OID in dotted-decimal form.
    pub oid: String,
    /// The value, when it decodes as a directory string.
    pub text: Option<String>,
    /// DER encoding of the value (tag, length and content).
    pub der: Vec<u8>,
}

impl NameAttribute {
    /// Build a string-valued attribute without its DER encoding.
    pub fn text(oid: &str, value: &str) -> Self {
        NameAttribute {
            oid: oid.to_string(),
            text: Some(value.to_string()),
            der: Vec::new(),
        }
    }
}

impl DistinguishedName {
    /// Build a name with one attribute per RDN.
    pub fn from_attributes(attrs: Vec<NameAttribute>) -> Self {
        DistinguishedName {
            rdns: attrs.into_iter().map(|a| vec![a]).collect(),
        }
    }

    /// Format as an RFC 2253 string.
    ///
    /// Well-known attribute types are grouped into one RDN per type and
    /// written in the fixed order `SERIALNUMBER, CN, OU, O, POSTALCODE,
    /// STREET, L, ST, C`, whatever order the certificate encodes them in.
    /// Repeated values of a type are joined by `+`; for `CN` and
    /// `SERIALNUMBER` only the last value is kept. Other attribute types
    /// follow at the end, last encoded first, as a dotted OID with a
    /// `#`-prefixed hex DER value.
    pub fn to_rfc2253(&self) -> String {
        let attrs: Vec<&NameAttribute> = self.rdns.iter().flatten().collect();
        let mut seq: Vec<Vec<&NameAttribute>> = attrs
            .iter()
            .filter(|a| attribute_short_name(&a.oid).is_none())
            .map(|a| vec![*a])
            .collect();
        for oid_str in CANONICAL_ORDER {
            let mut group: Vec<&NameAttribute> =
                attrs.iter().copied().filter(|a| a.oid == oid_str).collect();
            if oid_str == oid::COMMON_NAME || oid_str == oid::SERIAL_NUMBER {
                group = group.split_off(group.len().saturating_sub(1));
            }
            if !group.is_empty() {
                seq.push(group);
            }
        }

        let mut result = String::new();
        for (i, rdn) in seq.iter().rev().enumerate() {
            if i > 0 {
                result.push(',');
            }
            for (j, attr) in rdn.iter().enumerate() {
                if j > 0 {
                    result.push('+');
                }
                match (attribute_short_name(&attr.oid), &attr.text) {
                    (Some(key), Some(value)) => {
                        result.push_str(key);
                        result.push('=');
                        escape_value(&mut result, value);
                    }
                    (key, _) => {
                        result.push_str(key.unwrap_or(&attr.oid));
                        result.push_str("=#");
                        result.push_str(&hex::encode(&attr.der));
                    }
                }
            }
        }
        result
    }
}

/// Encoding order of the well-known attribute types; printed reversed.
const CANONICAL_ORDER: [&str; 9] = [
    oid::COUNTRY,
    oid::STATE_OR_PROVINCE,
    oid::LOCALITY,
    oid::STREET_ADDRESS,
    oid::POSTAL_CODE,
    oid::ORGANIZATION,
    oid::ORGANIZATIONAL_UNIT,
    oid::COMMON_NAME,
    oid::SERIAL_NUMBER,
];

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc2253())
    }
}

fn attribute_short_name(oid_str: &str) -> Option<&'static str> {
    match oid_str {
        oid::COUNTRY => Some("C"),
        oid::ORGANIZATION => Some("O"),
        oid::ORGANIZATIONAL_UNIT => Some("OU"),
        oid::COMMON_NAME => Some("CN"),
        oid::SERIAL_NUMBER => Some("SERIALNUMBER"),
        oid::LOCALITY => Some("L"),
        oid::STATE_OR_PROVINCE => Some("ST"),
        oid::STREET_ADDRESS => Some("STREET"),
        oid::POSTAL_CODE => Some("POSTALCODE"),
        _ => None,
    }
}

fn escape_value(out: &mut String, value: &str) {
    let last = value.chars().count().saturating_sub(1);
    for (i, ch) in value.chars().enumerate() {
        let needs_escape = matches!(ch, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (i == 0 && (ch == '#' || ch == ' '))
            || (i == last && ch == ' ');
        if needs_escape {
            out.push('\\');
        }
        out.push(ch);
    }
}

/// Subject public key, tagged by algorithm.
///
/// Integer fields are big-endian magnitudes without sign bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa {
        modulus: Vec<u8>,
        exponent: u64,
    },
    Dsa {
        p: Vec<u8>,
        q: Vec<u8>,
        g: Vec<u8>,
        y: Vec<u8>,
    },
    Ecdsa {
        curve: String,
        x: Vec<u8>,
        y: Vec<u8>,
    },
    Ed25519(Vec<u8>),
    Unknown,
}

impl PublicKey {
    /// RSA key size in bits: modulus byte length times eight.
    pub fn rsa_bits(modulus: &[u8]) -> u32 {
        (modulus.len() as u32) * 8
    }
}

/// Key Usage bit set (RFC 5280 Section 4.2.1.3).
///
/// Bit `n` of the inner value corresponds to KeyUsage bit `n` in the
/// extension's BIT STRING (digitalSignature is bit 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyUsage(pub u16);

impl KeyUsage {
    pub const DIGITAL_SIGNATURE: u16 = 1 << 0;
    pub const CONTENT_COMMITMENT: u16 = 1 << 1;
    pub const KEY_ENCIPHERMENT: u16 = 1 << 2;
    pub const DATA_ENCIPHERMENT: u16 = 1 << 3;
    pub const KEY_AGREEMENT: u16 = 1 << 4;
    pub const CERT_SIGN: u16 = 1 << 5;
    pub const CRL_SIGN: u16 = 1 << 6;
    pub const ENCIPHER_ONLY: u16 = 1 << 7;
    pub const DECIPHER_ONLY: u16 = 1 << 8;

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }
}

/// Extended Key Usage purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtKeyUsage {
    Any,
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    IpsecEndSystem,
    IpsecTunnel,
    IpsecUser,
    TimeStamping,
    OcspSigning,
    MicrosoftServerGatedCrypto,
    NetscapeServerGatedCrypto,
    MicrosoftCommercialCodeSigning,
    MicrosoftKernelCodeSigning,
    /// An OID without a known purpose.
    Other(String),
}

impl ExtKeyUsage {
    pub fn from_oid(oid_str: &str) -> Self {
        match oid_str {
            oid::EKU_ANY => ExtKeyUsage::Any,
            oid::EKU_SERVER_AUTH => ExtKeyUsage::ServerAuth,
            oid::EKU_CLIENT_AUTH => ExtKeyUsage::ClientAuth,
            oid::EKU_CODE_SIGNING => ExtKeyUsage::CodeSigning,
            oid::EKU_EMAIL_PROTECTION => ExtKeyUsage::EmailProtection,
            oid::EKU_IPSEC_END_SYSTEM => ExtKeyUsage::IpsecEndSystem,
            oid::EKU_IPSEC_TUNNEL => ExtKeyUsage::IpsecTunnel,
            oid::EKU_IPSEC_USER => ExtKeyUsage::IpsecUser,
            oid::EKU_TIME_STAMPING => ExtKeyUsage::TimeStamping,
            oid::EKU_OCSP_SIGNING => ExtKeyUsage::OcspSigning,
            oid::EKU_MS_SERVER_GATED_CRYPTO => ExtKeyUsage::MicrosoftServerGatedCrypto,
            oid::EKU_NS_SERVER_GATED_CRYPTO => ExtKeyUsage::NetscapeServerGatedCrypto,
            oid::EKU_MS_COMMERCIAL_CODE_SIGNING => ExtKeyUsage::MicrosoftCommercialCodeSigning,
            oid::EKU_MS_KERNEL_CODE_SIGNING => ExtKeyUsage::MicrosoftKernelCodeSigning,
            other => ExtKeyUsage::Other(other.to_string()),
        }
    }
}

/// Basic Constraints extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraints {
    pub ca: bool,
    /// `Some` only when pathLenConstraint was present in the encoding,
    /// including an explicit zero.
    pub max_path_len: Option<u32>,
}

/// Subject alternative names grouped by type, each in certificate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltNames {
    pub dns: Vec<String>,
    pub emails: Vec<String>,
    pub ips: Vec<IpAddr>,
    pub uris: Vec<String>,
}

/// Certificate signature algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Md2WithRsa,
    Md5WithRsa,
    Sha1WithRsa,
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
    Sha256WithRsaPss,
    Sha384WithRsaPss,
    Sha512WithRsaPss,
    DsaWithSha1,
    DsaWithSha256,
    EcdsaWithSha1,
    EcdsaWithSha256,
    EcdsaWithSha384,
    EcdsaWithSha512,
    Ed25519,
    /// Unrecognized algorithm, kept as its dotted OID.
    Unknown(String),
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignatureAlgorithm::Md2WithRsa => "MD2-RSA",
            SignatureAlgorithm::Md5WithRsa => "MD5-RSA",
            SignatureAlgorithm::Sha1WithRsa => "SHA1-RSA",
            SignatureAlgorithm::Sha256WithRsa => "SHA256-RSA",
            SignatureAlgorithm::Sha384WithRsa => "SHA384-RSA",
            SignatureAlgorithm::Sha512WithRsa => "SHA512-RSA",
            SignatureAlgorithm::Sha256WithRsaPss => "SHA256-RSAPSS",
            SignatureAlgorithm::Sha384WithRsaPss => "SHA384-RSAPSS",
            SignatureAlgorithm::Sha512WithRsaPss => "SHA512-RSAPSS",
            SignatureAlgorithm::DsaWithSha1 => "DSA-SHA1",
            SignatureAlgorithm::DsaWithSha256 => "DSA-SHA256",
            SignatureAlgorithm::EcdsaWithSha1 => "ECDSA-SHA1",
            SignatureAlgorithm::EcdsaWithSha256 => "ECDSA-SHA256",
            SignatureAlgorithm::EcdsaWithSha384 => "ECDSA-SHA384",
            SignatureAlgorithm::EcdsaWithSha512 => "ECDSA-SHA512",
            SignatureAlgorithm::Ed25519 => "Ed25519",
            SignatureAlgorithm::Unknown(oid) => oid,
        };
        f.write_str(name)
    }
}
