#![no_main]

use libfuzzer_sys::fuzz_target;
use x509meta_lib::pem::{blocks, der_to_pem};
use x509meta_lib::{parse_der, read_pem};

fuzz_target!(|data: &[u8]| {
    // Any payload survives a PEM encode/decode cycle unchanged.
    let text = der_to_pem(data);
    let decoded: Vec<_> = blocks(text.as_bytes()).collect();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].contents, data);

    // A certificate re-read from its own PEM export is identical.
    if let Ok(cert) = parse_der(data) {
        let reread = read_pem(text.as_bytes()).expect("exported PEM must re-parse");
        assert_eq!(reread, vec![cert]);
    }
});
