//! Errors for pdf_engine
//!
//! error_chain and failure are certainly nice, but completely overengineered
//! for this use-case. For example, neither of them allow error localization.
//! Additionally, debugging macros can get hairy really quick and matching with
//! `*e.kind()` or doing From conversions for other errors is really hard to do.
//!
//! So in this case, the best form of error handling is to use the simple Rust-native
//! way: just enums, `From` + pattern matching. No macros, except for this one.
//!
//! What this macro does is (simplified): `impl From<$a> for $b { $b::$variant(error) }`
macro_rules! impl_from {
    ($from:ident, $to:ident::$variant:ident) => {
        impl From<$from> for $to {
            fn from(err: $from) -> Self {
                $to::$variant(err)
            }
        }
    };
}

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// The stage at which a load failed. Carried by [`Error::Structural`] and
/// [`Error::Lexical`] so a caller can report "failed at xref" rather than a bare message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Lex,
    ObjectParse,
    Xref,
    Catalog,
    PageTree,
    AcroForm,
    ContentStream,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Lex => "lex",
            Stage::ObjectParse => "object-parse",
            Stage::Xref => "xref",
            Stage::Catalog => "catalog",
            Stage::PageTree => "page-tree",
            Stage::AcroForm => "acroform",
            Stage::ContentStream => "content-stream",
            Stage::Write => "write",
        };
        write!(f, "{s}")
    }
}

/// Top-level error type for every fallible entry point in this crate.
///
/// Lexical and structural errors abort a `load`; semantic and filter errors are surfaced
/// at the call that triggered them;
/// I/O errors propagate verbatim; signing errors propagate verbatim from the injected
/// [`crate::signing::Signer`].
#[derive(Debug)]
pub enum Error {
    /// Malformed token, unterminated string/stream, or a byte pattern the lexer could not
    /// make progress past.
    Lexical { stage: Stage, offset: usize, message: String },
    /// Missing `/Root`, broken xref, cyclic page tree, or an unresolved required
    /// reference. Always fails the load.
    Structural { stage: Stage, message: String },
    /// Wrong operand arity, unknown operator, a field value outside `/Opt`, or setting a
    /// value on a read-only field.
    Semantic(String),
    /// Unknown filter name, or a filter that could not decode its payload.
    Filter(String),
    /// Propagated verbatim from `std::io`.
    Io(io::Error),
    /// Propagated verbatim from a [`crate::signing::Signer`] callback.
    Signing(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexical { stage, offset, message } => {
                write!(f, "lexical error at {stage} (offset {offset}): {message}")
            }
            Error::Structural { stage, message } => write!(f, "structural error at {stage}: {message}"),
            Error::Semantic(m) => write!(f, "{m}"),
            Error::Filter(m) => write!(f, "filter error: {m}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::Signing(m) => write!(f, "signing failed: {m}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl_from!(io::Error, Error::Io);

impl Error {
    pub fn lexical(stage: Stage, offset: usize, message: impl Into<String>) -> Self {
        Error::Lexical { stage, offset, message: message.into() }
    }

    pub fn structural(stage: Stage, message: impl Into<String>) -> Self {
        Error::Structural { stage, message: message.into() }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Error::Semantic(message.into())
    }

    pub fn filter(message: impl Into<String>) -> Self {
        Error::Filter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal condition accumulated during `load`, filter decode, or appearance
/// regeneration. The parser tolerates as much as it can; these are the paper trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

impl Warning {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Warning { stage, message: message.into() }
    }
}
