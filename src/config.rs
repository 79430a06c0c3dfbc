//! Writer policy knobs (§10.3): small enough to pass by value, covering the points the
//! distilled design leaves implementer-defined.

/// Whether the writer packs eligible non-stream objects into fresh `/Type /ObjStm`
/// containers when targeting PDF >= 1.5, or leaves every object as its own indirect
/// object regardless of version. Resolved to `Preserve` as the default (§9 open
/// question) — `Repack` is supported but opt-in, and only takes effect together with
/// xref-stream output, since a classic xref table cannot address an object-stream member.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectStreamPolicy {
    Preserve,
    Repack,
}

/// Passed to [`crate::document::Document::save_with_config`]; `Document::save` uses
/// [`WriterConfig::default`].
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub object_stream_policy: ObjectStreamPolicy,
    /// Floor under the emitted version, regardless of what the header/catalog declare.
    pub min_version: (u8, u8),
    /// Force xref-stream output even when a classic table would suffice.
    pub use_xref_streams: bool,
    /// Minimum reserved width, in bytes, for a signature placeholder — the writer reserves
    /// `max(this, Signer::max_signature_len())`.
    pub signature_placeholder_len: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            object_stream_policy: ObjectStreamPolicy::Preserve,
            min_version: (1, 0),
            use_xref_streams: false,
            signature_placeholder_len: 16 * 1024,
        }
    }
}
