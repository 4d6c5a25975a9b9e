//! ID3v1 items
//!
//! # ID3v1
//!
//! The tag is a fixed 128 bytes appended to the end of the file, and all text
//! fields are Latin-1. ID3v1.1 repurposes the last two comment bytes as a
//! track number.

pub mod constants;
mod read;
pub(crate) mod write;

mod tag;

pub use tag::Id3v1Tag;
