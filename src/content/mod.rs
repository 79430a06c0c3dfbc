//! The content-stream grammar (§4.6-§4.8): a tokenizer and parser distinct from the
//! object grammar, and a builder/serializer that round-trips parse → edit → emit.

pub mod builder;
pub mod operators;
pub mod parser;
pub mod token;

pub use builder::Builder;
pub use parser::{parse_content_stream, ContentItem, InlineImage, Operand, Operation};
