//! Certificate source selection.

use crate::MetaError;
use std::io::Read;

/// Where certificates are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertSource {
    /// A TLS peer at `host[:port]`.
    Remote(String),
    /// A file of PEM `CERTIFICATE` blocks, or `-` for standard input.
    Pem(String),
    /// A file holding one DER certificate, or `-` for standard input.
    Der(String),
}

impl CertSource {
    /// Pick the single source given on the command line.
    ///
    /// Exactly one of the three options must be set.
    pub fn select(
        remote: Option<String>,
        pem: Option<String>,
        der: Option<String>,
    ) -> Result<Self, MetaError> {
        match (remote, pem, der) {
            (Some(addr), None, None) => Ok(CertSource::Remote(addr)),
            (None, Some(path), None) => Ok(CertSource::Pem(path)),
            (None, None, Some(path)) => Ok(CertSource::Der(path)),
            (None, None, None) => Err(MetaError::InputSelection(
                "no input given: specify one of --remote, --pem or --der".into(),
            )),
            _ => Err(MetaError::InputSelection(
                "more than one input given: specify only one of --remote, --pem or --der".into(),
            )),
        }
    }
}

/// Open a file for reading, with `-` meaning standard input.
pub fn open_input(path: &str) -> Result<Box<dyn Read>, MetaError> {
    if path == "-" {
        return Ok(Box::new(std::io::stdin()));
    }
    let file = std::fs::File::open(path).map_err(MetaError::Read)?;
    Ok(Box::new(file))
}
