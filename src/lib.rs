//! C-callable boundary around a subword tokenizer.
//!
//! A [`Processor`] owns one loaded [`TokenizerEngine`]; the `extern "C"`
//! functions in [`ffi`] expose it to hosts that can only call flat C
//! functions. Encodes and decodes hand their results over as
//! [`OwnedBuffer`]s, piece lookups as borrowed [`Piece`]s.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod piece;
pub mod pipeline;
pub mod processor;
pub mod tokenizer;

pub use buffer::OwnedBuffer;
pub use config::{NarrowOverflow, ProcessorConfig};
pub use engine::{NarrowTokenId, TokenId, TokenizerEngine, NO_ID};
pub use error::{EngineError, ProcessorError, StatusCode};
pub use piece::Piece;
pub use pipeline::Affixes;
pub use processor::Processor;
pub use tokenizer::HfEngine;
