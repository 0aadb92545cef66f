//! Certificate parsing from DER into the owned [`Certificate`] model.

use crate::fields::{
    AltNames, BasicConstraints, Certificate, DistinguishedName, ExtKeyUsage, KeyUsage,
    NameAttribute, PublicKey, SignatureAlgorithm,
};
use crate::oid;
use crate::util;
use crate::MetaError;
use x509_parser::der_parser::asn1_rs::ToDer;
use x509_parser::der_parser::ber::{BerObject, BerObjectContent};
use x509_parser::prelude::*;

/// Parse exactly one DER-encoded certificate.
///
/// Fails on malformed ASN.1, on bytes left over after the certificate, and
/// on unsupported X.509 versions. Unrecognized key or signature algorithms
/// are not errors; they surface as `Unknown` variants.
pub fn parse_der(input: &[u8]) -> Result<Certificate, MetaError> {
    if input.is_empty() {
        return Err(MetaError::Parse("empty input".into()));
    }

    let (remaining, x509) =
        X509Certificate::from_der(input).map_err(|e| MetaError::Parse(format!("{}", e)))?;
    if !remaining.is_empty() {
        return Err(MetaError::Parse(format!(
            "{} bytes of trailing data after certificate",
            remaining.len()
        )));
    }

    build_certificate(&x509, input)
}

fn build_certificate(x509: &X509Certificate, raw_der: &[u8]) -> Result<Certificate, MetaError> {
    let tbs = &x509.tbs_certificate;

    let raw_version = tbs.version.0;
    if raw_version > 2 {
        return Err(MetaError::Parse(format!(
            "unsupported X.509 version {} (expected v1, v2, or v3)",
            raw_version + 1
        )));
    }

    let mut cert = Certificate {
        version: raw_version + 1,
        serial: util::strip_leading_zeros(tbs.raw_serial()).to_vec(),
        issuer: build_dn(&tbs.issuer),
        subject: build_dn(&tbs.subject),
        not_before: tbs.validity.not_before.to_datetime(),
        not_after: tbs.validity.not_after.to_datetime(),
        public_key: build_public_key(&tbs.subject_pki)?,
        key_usage: KeyUsage::default(),
        ext_key_usage: Vec::new(),
        basic_constraints: None,
        subject_key_id: Vec::new(),
        authority_key_id: Vec::new(),
        alt_names: AltNames::default(),
        policies: Vec::new(),
        crl_distribution_points: Vec::new(),
        ocsp_servers: Vec::new(),
        issuing_certificate_urls: Vec::new(),
        signature_algorithm: build_signature_algorithm(&x509.signature_algorithm),
        signature: x509.signature_value.data.to_vec(),
        raw: raw_der.to_vec(),
    };

    for ext in tbs.extensions() {
        apply_extension(&mut cert, ext)?;
    }

    Ok(cert)
}

fn build_dn(name: &X509Name) -> DistinguishedName {
    let rdns = name
        .iter()
        .map(|rdn| {
            rdn.iter()
                .map(|attr| NameAttribute {
                    oid: attr.attr_type().to_id_string(),
                    text: attr.as_str().ok().map(str::to_string),
                    der: attr.attr_value().to_der_vec().unwrap_or_default(),
                })
                .collect()
        })
        .collect();
    DistinguishedName { rdns }
}

fn build_signature_algorithm(algo: &AlgorithmIdentifier) -> SignatureAlgorithm {
    match algo.algorithm.to_id_string().as_str() {
        oid::MD2_WITH_RSA => SignatureAlgorithm::Md2WithRsa,
        oid::MD5_WITH_RSA => SignatureAlgorithm::Md5WithRsa,
        oid::SHA1_WITH_RSA => SignatureAlgorithm::Sha1WithRsa,
        oid::SHA256_WITH_RSA => SignatureAlgorithm::Sha256WithRsa,
        oid::SHA384_WITH_RSA => SignatureAlgorithm::Sha384WithRsa,
        oid::SHA512_WITH_RSA => SignatureAlgorithm::Sha512WithRsa,
        oid::RSASSA_PSS => rsassa_pss_algorithm(algo),
        oid::DSA_WITH_SHA1 => SignatureAlgorithm::DsaWithSha1,
        oid::DSA_WITH_SHA256 => SignatureAlgorithm::DsaWithSha256,
        oid::ECDSA_WITH_SHA1 => SignatureAlgorithm::EcdsaWithSha1,
        oid::ECDSA_WITH_SHA256 => SignatureAlgorithm::EcdsaWithSha256,
        oid::ECDSA_WITH_SHA384 => SignatureAlgorithm::EcdsaWithSha384,
        oid::ECDSA_WITH_SHA512 => SignatureAlgorithm::EcdsaWithSha512,
        oid::ED25519 => SignatureAlgorithm::Ed25519,
        other => SignatureAlgorithm::Unknown(other.to_string()),
    }
}

/// RSASSA-PSS names depend on the hash carried in the algorithm parameters.
fn rsassa_pss_algorithm(algo: &AlgorithmIdentifier) -> SignatureAlgorithm {
    use x509_parser::signature_algorithm::SignatureAlgorithm as ParsedAlgorithm;

    let hash = match ParsedAlgorithm::try_from(algo) {
        Ok(ParsedAlgorithm::RSASSA_PSS(params)) => params.hash_algorithm_oid().to_id_string(),
        _ => return SignatureAlgorithm::Unknown(oid::RSASSA_PSS.into()),
    };
    match hash.as_str() {
        oid::SHA256 => SignatureAlgorithm::Sha256WithRsaPss,
        oid::SHA384 => SignatureAlgorithm::Sha384WithRsaPss,
        oid::SHA512 => SignatureAlgorithm::Sha512WithRsaPss,
        _ => SignatureAlgorithm::Unknown(oid::RSASSA_PSS.into()),
    }
}

fn build_public_key(spki: &SubjectPublicKeyInfo) -> Result<PublicKey, MetaError> {
    let key_data: &[u8] = &spki.subject_public_key.data;

    let key = match spki.algorithm.algorithm.to_id_string().as_str() {
        oid::RSA_ENCRYPTION => extract_rsa_params(key_data)
            .ok_or_else(|| MetaError::Parse("malformed RSA public key".into()))?,
        oid::DSA => extract_dsa_params(&spki.algorithm, key_data)
            .ok_or_else(|| MetaError::Parse("malformed DSA public key".into()))?,
        oid::EC_PUBLIC_KEY => {
            let (x, y) = split_ec_point(key_data);
            PublicKey::Ecdsa {
                curve: extract_ec_curve(&spki.algorithm),
                x,
                y,
            }
        }
        oid::ED25519 => PublicKey::Ed25519(key_data.to_vec()),
        _ => PublicKey::Unknown,
    };
    Ok(key)
}

/// Content bytes of a DER INTEGER, without leading zero bytes.
fn integer_bytes(obj: &BerObject) -> Option<Vec<u8>> {
    match obj.content {
        BerObjectContent::Integer(bytes) => Some(util::strip_leading_zeros(bytes).to_vec()),
        _ => None,
    }
}

/// Extract RSA modulus and exponent from an RSAPublicKey SEQUENCE.
fn extract_rsa_params(data: &[u8]) -> Option<PublicKey> {
    let (_, parsed) = x509_parser::der_parser::parse_der(data).ok()?;
    let seq = parsed.as_sequence().ok()?;
    let modulus = seq.first().and_then(integer_bytes)?;
    let exponent = seq.get(1).and_then(|e| e.as_u64().ok())?;
    Some(PublicKey::Rsa { modulus, exponent })
}

/// Extract P, Q, G from the algorithm parameters and Y from the key data.
fn extract_dsa_params(algo: &AlgorithmIdentifier, data: &[u8]) -> Option<PublicKey> {
    let params_der = algo.parameters.as_ref()?.to_der_vec().ok()?;
    let (_, params) = x509_parser::der_parser::parse_der(&params_der).ok()?;
    let seq = params.as_sequence().ok()?;
    let p = seq.first().and_then(integer_bytes)?;
    let q = seq.get(1).and_then(integer_bytes)?;
    let g = seq.get(2).and_then(integer_bytes)?;

    let (_, y) = x509_parser::der_parser::parse_der(data).ok()?;
    let y = integer_bytes(&y)?;
    Some(PublicKey::Dsa { p, q, g, y })
}

fn extract_ec_curve(algo: &AlgorithmIdentifier) -> String {
    if let Some(params) = &algo.parameters {
        if let Ok(oid) = params.as_oid() {
            return match oid.to_id_string().as_str() {
                oid::CURVE_P224 => "P-224".into(),
                oid::CURVE_P256 => "P-256".into(),
                oid::CURVE_P384 => "P-384".into(),
                oid::CURVE_P521 => "P-521".into(),
                other => other.to_string(),
            };
        }
    }
    "unknown".into()
}

/// Split an uncompressed SEC1 point (`04 || X || Y`) into its coordinates.
///
/// A compressed point yields only X; anything else yields two empty values.
fn split_ec_point(point: &[u8]) -> (Vec<u8>, Vec<u8>) {
    match point.split_first() {
        Some((&0x04, coords)) if !coords.is_empty() && coords.len() % 2 == 0 => {
            let (x, y) = coords.split_at(coords.len() / 2);
            (
                util::strip_leading_zeros(x).to_vec(),
                util::strip_leading_zeros(y).to_vec(),
            )
        }
        Some((&(0x02 | 0x03), x)) => (util::strip_leading_zeros(x).to_vec(), Vec::new()),
        _ => (Vec::new(), Vec::new()),
    }
}

fn apply_extension(cert: &mut Certificate, ext: &X509Extension) -> Result<(), MetaError> {
    match ext.parsed_extension() {
        ParsedExtension::BasicConstraints(bc) => {
            cert.basic_constraints = Some(BasicConstraints {
                ca: bc.ca,
                max_path_len: bc.path_len_constraint,
            });
        }
        ParsedExtension::KeyUsage(ku) => {
            let flags = [
                (ku.digital_signature(), KeyUsage::DIGITAL_SIGNATURE),
                (ku.non_repudiation(), KeyUsage::CONTENT_COMMITMENT),
                (ku.key_encipherment(), KeyUsage::KEY_ENCIPHERMENT),
                (ku.data_encipherment(), KeyUsage::DATA_ENCIPHERMENT),
                (ku.key_agreement(), KeyUsage::KEY_AGREEMENT),
                (ku.key_cert_sign(), KeyUsage::CERT_SIGN),
                (ku.crl_sign(), KeyUsage::CRL_SIGN),
                (ku.encipher_only(), KeyUsage::ENCIPHER_ONLY),
                (ku.decipher_only(), KeyUsage::DECIPHER_ONLY),
            ];
            let bits = flags
                .iter()
                .filter(|(set, _)| *set)
                .fold(0u16, |acc, (_, bit)| acc | bit);
            cert.key_usage = KeyUsage(bits);
        }
        ParsedExtension::ExtendedKeyUsage(_) => {
            cert.ext_key_usage = extract_eku_in_order(ext.value)?;
        }
        ParsedExtension::SubjectAlternativeName(san) => {
            for gn in &san.general_names {
                match gn {
                    GeneralName::DNSName(name) => cert.alt_names.dns.push(name.to_string()),
                    GeneralName::RFC822Name(email) => {
                        cert.alt_names.emails.push(email.to_string())
                    }
                    GeneralName::IPAddress(bytes) => {
                        if let Some(ip) = ip_from_bytes(bytes) {
                            cert.alt_names.ips.push(ip);
                        }
                    }
                    GeneralName::URI(uri) => cert.alt_names.uris.push(uri.to_string()),
                    _ => {}
                }
            }
        }
        ParsedExtension::SubjectKeyIdentifier(ski) => {
            cert.subject_key_id = ski.0.to_vec();
        }
        ParsedExtension::AuthorityKeyIdentifier(aki) => {
            if let Some(ki) = &aki.key_identifier {
                cert.authority_key_id = ki.0.to_vec();
            }
        }
        ParsedExtension::AuthorityInfoAccess(aia) => {
            for desc in &aia.accessdescs {
                let GeneralName::URI(uri) = &desc.access_location else {
                    continue;
                };
                match desc.access_method.to_id_string().as_str() {
                    oid::ACCESS_OCSP => cert.ocsp_servers.push(uri.to_string()),
                    oid::ACCESS_CA_ISSUERS => cert.issuing_certificate_urls.push(uri.to_string()),
                    _ => {}
                }
            }
        }
        ParsedExtension::CRLDistributionPoints(cdp) => {
            for point in &cdp.points {
                if let Some(x509_parser::extensions::DistributionPointName::FullName(names)) =
                    &point.distribution_point
                {
                    for gn in names {
                        if let GeneralName::URI(uri) = gn {
                            cert.crl_distribution_points.push(uri.to_string());
                        }
                    }
                }
            }
        }
        ParsedExtension::CertificatePolicies(policies) => {
            cert.policies = policies
                .iter()
                .map(|p| p.policy_id.to_id_string())
                .collect();
        }
        ParsedExtension::ParseError { error } => {
            return Err(MetaError::Parse(format!(
                "malformed extension {}: {}",
                ext.oid.to_id_string(),
                error
            )));
        }
        _ => {}
    }
    Ok(())
}

/// Decode the ExtKeyUsageSyntax SEQUENCE directly so that purposes keep
/// their encoded order.
fn extract_eku_in_order(value: &[u8]) -> Result<Vec<ExtKeyUsage>, MetaError> {
    let malformed = || MetaError::Parse("malformed extended key usage extension".into());
    let (_, parsed) = x509_parser::der_parser::parse_der(value).map_err(|_| malformed())?;
    let seq = parsed.as_sequence().map_err(|_| malformed())?;
    seq.iter()
        .map(|item| {
            item.as_oid()
                .map(|oid| ExtKeyUsage::from_oid(&oid.to_id_string()))
                .map_err(|_| malformed())
        })
        .collect()
}

fn ip_from_bytes(bytes: &[u8]) -> Option<std::net::IpAddr> {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        Some(std::net::Ipv4Addr::from(octets).into())
    } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        let v6 = std::net::Ipv6Addr::from(octets);
        Some(match v6.to_ipv4_mapped() {
            Some(v4) => v4.into(),
            None => v6.into(),
        })
    } else {
        None
    }
}
