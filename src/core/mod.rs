//! Core markup parsing primitives
//!
//! This module contains the building blocks the document parser uses:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: pull parser for HTML tokens
//! - Entities: character reference decoding and escaping with Cow
//! - Attributes: start-tag attribute parsing

pub mod attributes;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
