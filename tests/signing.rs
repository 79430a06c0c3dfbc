//! Incremental-update signing through the façade: a `Signer` stands in for the
//! certificate/PKCS#7 machinery a real caller would supply.

use pdf_engine::signing::DigestAlgorithm;
use pdf_engine::units::Pt;
use pdf_engine::{Document, SignError, Signer};

/// Returns a fixed-length all-`0xAB` "signature", just long enough to exercise the
/// placeholder-reservation and byte-range substitution machinery without any real crypto.
struct FixedSigner;

impl Signer for FixedSigner {
    fn sign(&self, covered: &[u8], _algo: DigestAlgorithm) -> Result<Vec<u8>, SignError> {
        if covered.is_empty() {
            return Err(SignError("nothing to sign".to_string()));
        }
        Ok(vec![0xAB; 256])
    }

    fn max_signature_len(&self) -> usize {
        256
    }
}

#[test]
fn signed_save_produces_a_loadable_document_with_a_byte_range() {
    let mut doc = Document::create();
    doc.add_page(Pt(400.0), Pt(400.0)).unwrap();
    // First save establishes a base file; signing happens as an incremental update on
    // top of a document that was already loaded once (the realistic path: sign an
    // existing file, don't sign a document that was never serialized).
    let base = doc.save().unwrap();
    let mut loaded = Document::load(base).unwrap();
    loaded.info.author = "signer".to_string();

    let signed = loaded.save_with_signature(&FixedSigner, DigestAlgorithm::Sha256).unwrap();

    let text = String::from_utf8_lossy(&signed);
    assert!(text.contains("/ByteRange"));
    assert!(text.contains("/Contents"));

    let reloaded = Document::load(signed).unwrap();
    assert_eq!(reloaded.page_count(), 1);
}

#[test]
fn signing_chains_prev_onto_the_original_startxref() {
    let mut doc = Document::create();
    doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
    let base = doc.save().unwrap();
    let loaded = Document::load(base).unwrap();
    assert!(loaded.prev_startxref.is_some());

    let signed = loaded.save_with_signature(&FixedSigner, DigestAlgorithm::Sha256).unwrap();
    let reloaded = Document::load(signed).unwrap();
    // An incremental update's own startxref points at the new xref section, chained via
    // /Prev back to the base file's — reloading should still see exactly one page.
    assert_eq!(reloaded.page_count(), 1);
    assert!(reloaded.prev_startxref.is_some());
}
