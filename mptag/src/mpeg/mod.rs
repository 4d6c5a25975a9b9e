//! MPEG audio framing
//!
//! Nothing here decodes audio. These types describe where the frames are and what
//! their headers declare, which is all tag rewriting needs.

pub(crate) mod chain;
mod constants;
mod header;

pub use header::{
	ChannelMode, Emphasis, Layer, MpegHeader, MpegVersion, RawMpegHeader, VbrHeader,
	VbrHeaderType,
};

pub(crate) use header::find_vbr_header;

use crate::config::ParseOptions;
use crate::error::Result;
use crate::id3::v1::Id3v1Tag;
use crate::id3::v2::Id3v2Tag;
use crate::layout::RawLayout;

use std::io::Read;

/// An MPEG file
///
/// Produced by [`read_from`](crate::read_from) or
/// [`read_from_path`](crate::read_from_path). A file without any recognizable
/// structure still reads successfully, with every part absent.
#[derive(Default, Clone, Debug)]
pub struct MpegFile {
	pub(crate) id3v2_tag: Option<Id3v2Tag>,
	pub(crate) id3v1_tag: Option<Id3v1Tag>,
	pub(crate) layout: RawLayout,
	pub(crate) audio_frames: Vec<RawMpegHeader>,
}

impl MpegFile {
	/// Read an `MpegFile` from a reader
	///
	/// # Errors
	///
	/// * I/O failures reading from `reader`
	/// * A tag exists but is unreadable under the requested [`ParseOptions`]
	pub fn read_from<R: Read>(reader: &mut R, parse_options: ParseOptions) -> Result<Self> {
		let mut stream = crate::io::ChunkedStream::new(reader);
		let output = crate::scan::scan(&mut stream, parse_options)?;

		let audio_frames = chain::resolve_chain(&output.layout.mpeg_frames);

		Ok(Self {
			id3v2_tag: output.id3v2,
			id3v1_tag: output.id3v1,
			layout: output.layout,
			audio_frames,
		})
	}

	/// The ID3v2 tag, if one exists
	pub fn id3v2(&self) -> Option<&Id3v2Tag> {
		self.id3v2_tag.as_ref()
	}

	/// The ID3v1 tag, if one exists
	pub fn id3v1(&self) -> Option<&Id3v1Tag> {
		self.id3v1_tag.as_ref()
	}

	/// The raw byte layout the scan produced
	pub fn layout(&self) -> &RawLayout {
		&self.layout
	}

	/// The resolved audio frame sequence
	///
	/// This is [`RawLayout::mpeg_frames`] with coincidental sync matches filtered
	/// out by the chain resolver.
	pub fn audio_frames(&self) -> &[RawMpegHeader] {
		&self.audio_frames
	}
}
