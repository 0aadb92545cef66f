//! Serialization of metadata records and PEM re-export.
//!
//! Each call renders its whole document in memory and issues a single
//! `write_all`, so a failed write never leaves a partial record behind
//! from a second call.

use crate::fields::Certificate;
use crate::metadata::X509Meta;
use crate::pem::der_to_pem;
use crate::MetaError;
use serde::Serialize;
use std::io::Write;

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), MetaError> {
    let mut buf = serde_json::to_vec_pretty(value)?;
    buf.push(b'\n');
    out.write_all(&buf)?;
    Ok(())
}

/// Write one record as a JSON object.
pub fn write_one<W: Write>(out: &mut W, record: &X509Meta) -> Result<(), MetaError> {
    write_json(out, record)
}

/// Write records as a JSON array, in the order given.
pub fn write_many<W: Write>(out: &mut W, records: &[X509Meta]) -> Result<(), MetaError> {
    write_json(out, records)
}

/// Write each certificate as a `CERTIFICATE` PEM block, in input order.
pub fn write_pem<W: Write>(out: &mut W, certs: &[Certificate]) -> Result<(), MetaError> {
    let text: String = certs.iter().map(|c| der_to_pem(&c.raw)).collect();
    out.write_all(text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_list_is_empty_array() {
        let mut out = Vec::new();
        write_many(&mut out, &[]).unwrap();
        assert_eq!(out, b"[]\n");
    }

    #[test]
    fn empty_pem_export_writes_nothing() {
        let mut out = Vec::new();
        write_pem(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_record_is_an_object() {
        let record = X509Meta {
            version: 3,
            ..X509Meta::default()
        };
        let mut out = Vec::new();
        write_one(&mut out, &record).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("{\n  \"Version\": 3,\n"), "{}", text);
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn records_keep_their_order() {
        let records: Vec<X509Meta> = ["01", "02"]
            .iter()
            .map(|serial| X509Meta {
                serial_number: serial.to_string(),
                ..X509Meta::default()
            })
            .collect();
        let mut out = Vec::new();
        write_many(&mut out, &records).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["SerialNumber"], "01");
        assert_eq!(json[1]["SerialNumber"], "02");
    }

    #[test]
    fn write_failure_is_io_error() {
        let err = write_many(&mut BrokenPipe, &[]).unwrap_err();
        assert!(matches!(err, MetaError::Io(_)));
    }
}
