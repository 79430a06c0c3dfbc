//! A library for loading, editing, and serializing PDF documents.
//!
//! The object model is a closed tagged variant (see [`object::Object`]) rather than a
//! class hierarchy: a [`registry::Registry`] owns the `(obj, gen) -> Object` mapping and
//! resolves references lazily, a [`document::Document`] wraps a registry with a page-tree
//! cache and `/Info` metadata, and [`page::Page`]/[`acroform::Field`]/[`acroform::Widget`]
//! are lightweight borrowing views that mutate the graph through the registry's interior
//! mutability.
//!
//! ```
//! use pdf_engine::Document;
//! use pdf_engine::units::Pt;
//!
//! let mut doc = Document::create();
//! doc.add_page(Pt(612.0), Pt(792.0)).unwrap();
//! let page = doc.get_page(0).unwrap();
//! assert_eq!(page.media_box().unwrap().width(), Pt(612.0));
//! ```

#![allow(dead_code)]

pub mod acroform;
pub mod config;
pub mod content;
pub mod date;
pub mod document;
pub mod document_info;
pub mod error;
pub mod filters;
pub mod lexer;
pub mod matrix;
pub mod object;
pub mod page;
pub mod parser;
pub mod rectangle;
pub mod registry;
pub mod scanner;
pub mod signing;
pub mod units;
pub mod writer;
mod utils;

pub use acroform::{AcroForm, Field, FieldType, Widget};
pub use config::{ObjectStreamPolicy, WriterConfig};
pub use document::Document;
pub use document_info::DocumentInfo;
pub use error::{Error, Result, Stage, Warning};
pub use object::{name, Dict, Name, Object, ObjectId, Stream, StringFormat};
pub use page::Page;
pub use registry::Registry;
pub use signing::{SignError, Signer};
