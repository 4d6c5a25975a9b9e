//! ID3v2 items and utilities
//!
//! # ID3v2
//!
//! The tag is versioned (2.2, 2.3, 2.4), framed, and hostile to the unprepared:
//! sizes may or may not be synchsafe depending on the version, content may be
//! unsynchronized, compressed, or grouped, and real-world files routinely declare
//! sizes that don't match what they store. Reading is built to survive all of that;
//! a frame that can't be decoded is carried as [`FrameValue::Invalid`] with its
//! stored bytes intact.

mod frame;
mod header;
pub(crate) mod read;
mod registry;
mod restrictions;
mod tag;
pub mod util;
pub(crate) mod write;

pub use frame::{Frame, FrameFlags, FrameId, FrameValue};
pub use header::{ExtendedHeader, Id3v2TagFlags, Id3v2Version, TagHeader};
pub use registry::{FrameCodec, FrameSpec, lookup, resolve_codec};
pub use restrictions::{
	ImageSizeRestrictions, TagRestrictions, TagSizeRestrictions, TextSizeRestrictions,
};
pub use tag::Id3v2Tag;
