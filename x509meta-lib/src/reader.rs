//! Reading certificates from byte streams.

use crate::fields::Certificate;
use crate::parser::parse_der;
use crate::pem::{self, CERTIFICATE};
use crate::MetaError;
use std::io::Read;

/// Maximum number of bytes read from a single input.
const MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

fn read_all<R: Read>(reader: R) -> Result<Vec<u8>, MetaError> {
    let mut buf = Vec::new();
    reader
        .take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(MetaError::Read)?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(MetaError::Read(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("input exceeds {} MiB limit", MAX_INPUT_BYTES / (1024 * 1024)),
        )));
    }
    Ok(buf)
}

/// Read every `CERTIFICATE` block from a PEM stream and parse it.
///
/// Fails with [`MetaError::Decode`] if a block carries any other label or
/// if the stream holds no PEM blocks at all. Data after the last block is
/// ignored.
pub fn read_pem<R: Read>(reader: R) -> Result<Vec<Certificate>, MetaError> {
    let data = read_all(reader)?;
    let mut certs = Vec::new();
    for block in pem::blocks(&data) {
        if block.label != CERTIFICATE {
            return Err(MetaError::Decode(format!(
                "file contains a PEM of unexpected type: {}",
                block.label
            )));
        }
        certs.push(parse_der(&block.contents)?);
    }
    if certs.is_empty() {
        return Err(MetaError::Decode("no PEM certificate blocks found".into()));
    }
    tracing::debug!("read {} certificate(s) from PEM input", certs.len());
    Ok(certs)
}

/// Read a single DER-encoded certificate.
pub fn read_der<R: Read>(reader: R) -> Result<Certificate, MetaError> {
    let data = read_all(reader)?;
    tracing::debug!("read {} bytes of DER input", data.len());
    parse_der(&data)
}
