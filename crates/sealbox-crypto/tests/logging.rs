#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Log output must describe operations without leaking key material or
//! plaintext.

use std::io;
use std::sync::{Arc, Mutex};

use sealbox_crypto::{AsymmetricKeyManager, open, seal};

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[test]
fn debug_logs_do_not_leak_secrets() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let asym = AsymmetricKeyManager::new();
    let (private_export, opened) = tracing::subscriber::with_default(subscriber, || {
        let pair = asym.generate_key_pair().unwrap();
        let public = asym.export_public_key(&pair.public).unwrap();
        let private = asym.export_private_key(Some(&pair.private)).unwrap().unwrap();
        let restored = asym.import_private_key(&private).unwrap();

        let sealed = seal(&asym, "top secret plaintext", &public).unwrap();
        let opened = open(&asym, &sealed, &restored).unwrap();
        (private, opened)
    });

    assert_eq!(opened, "top secret plaintext");
    let logs = capture.contents();
    assert!(logs.contains("Generated RSA-OAEP key pair"), "logs: {logs}");
    assert!(logs.contains("Sealed message for recipient"), "logs: {logs}");
    assert!(logs.contains("Opened sealed message"), "logs: {logs}");
    assert!(!logs.contains("top secret plaintext"));
    assert!(!logs.contains(&private_export[..64]));
}
