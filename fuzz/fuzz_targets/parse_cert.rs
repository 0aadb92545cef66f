#![no_main]

use libfuzzer_sys::fuzz_target;
use x509meta_lib::{parse_der, read_pem, transform, write_one};

fuzz_target!(|data: &[u8]| {
    // Neither input path may panic, regardless of input.
    if let Ok(cert) = parse_der(data) {
        let meta = transform(&cert);
        assert_eq!(meta, transform(&cert), "transform is not deterministic");

        let mut out = Vec::new();
        write_one(&mut out, &meta).expect("serializing to a Vec cannot fail");
        assert!(out.ends_with(b"}\n"));
    }

    let _ = read_pem(data);
});
