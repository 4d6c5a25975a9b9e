//! The raw byte layout of a scanned file

use crate::mpeg::{RawMpegHeader, VbrHeader};

/// A byte region holding a tag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TagRegion {
	/// Absolute offset of the first byte
	pub start: u64,
	/// Absolute offset one past the last byte
	pub end: u64,
}

impl TagRegion {
	/// The region's length in bytes
	pub fn len(&self) -> u64 {
		self.end - self.start
	}
}

/// A stream head frame (Xing/Info/VBRI)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadFrame {
	/// Absolute offset of the frame carrying the side info
	pub offset: u64,
	/// The declared stream totals
	pub vbr: VbrHeader,
}

/// Everything a single scan pass learned about a file's bytes
///
/// Built incrementally while scanning and immutable afterwards. The MPEG headers
/// are raw candidates; run them through the chain resolver before trusting them
/// (see [`MpegFile::audio_frames`](crate::mpeg::MpegFile::audio_frames)).
#[derive(Default, Clone, Debug)]
pub struct RawLayout {
	/// Every candidate MPEG frame header, in scan order
	pub mpeg_frames: Vec<RawMpegHeader>,
	/// The stream head frame, if one was found
	pub head_frame: Option<HeadFrame>,
	/// Every ID3v2 tag region, in file order
	pub id3v2_regions: Vec<TagRegion>,
	/// The ID3v1 trailer region, when the file ends in one
	pub id3v1_region: Option<TagRegion>,
	/// The total file size in bytes
	pub file_size: u64,
}
