pub(crate) mod content;
pub(crate) mod read;

use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::util::text::TextEncoding;

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Embedded subframes (chapters/tables of contents) may nest, this bounds the recursion
/// against malicious or corrupt input.
pub(crate) const MAX_SUBFRAME_DEPTH: u8 = 4;

/// An `ID3v2` frame ID
///
/// A valid ID is 3 (ID3v2.2) or 4 (ID3v2.3/4) characters from `'A'..='Z'` and `'0'..='9'`.
#[derive(PartialEq, Clone, Debug, Eq, Hash)]
pub struct FrameId(Cow<'static, str>);

impl FrameId {
	/// Attempts to create a `FrameId` from an ID string
	///
	/// # Errors
	///
	/// * `id` contains invalid characters (must be 'A'..='Z' and '0'..='9')
	/// * `id` is an invalid length (must be 3 or 4)
	pub fn new<I>(id: I) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		Self::new_cow(id.into())
	}

	// Split from generic, public method to avoid code bloat by monomorphization.
	fn new_cow(id: Cow<'static, str>) -> Result<Self> {
		Self::verify_id(&id)?;

		match id.len() {
			3 | 4 => Ok(Self(id)),
			_ => Err(
				Id3v2Error::new(Id3v2ErrorKind::BadFrameId(id.into_owned().into_bytes())).into(),
			),
		}
	}

	/// Extracts the string from the ID
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub(crate) fn verify_id(id_str: &str) -> Result<()> {
		for c in id_str.chars() {
			if !c.is_ascii_uppercase() && !c.is_ascii_digit() {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameId(
					id_str.as_bytes().to_vec(),
				))
				.into());
			}
		}

		Ok(())
	}
}

impl Display for FrameId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Flags on an individual ID3v2 frame
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameFlags {
	/// Preserve frame on tag edit
	pub tag_alter_preservation: bool,
	/// Preserve frame on file edit
	pub file_alter_preservation: bool,
	/// Item cannot be written to
	pub read_only: bool,
	/// The group identifier the frame belongs to
	///
	/// All frames with the same group identifier byte belong to the same group.
	pub grouping_identity: Option<u8>,
	/// Frame is zlib compressed
	///
	/// It is **required** `data_length_indicator` be set if this is set.
	pub compression: bool,
	/// Frame encryption method symbol
	///
	/// The encryption method is opaque, frames carrying this cannot be decoded.
	pub encryption: Option<u8>,
	/// Frame is unsynchronised
	///
	/// See [`crate::id3::v2::util::synchsafe`] for an explanation. Never set on write.
	pub unsynchronisation: bool,
	/// Frame has a data length indicator
	///
	/// The data length indicator is the size of the frame if the flags were all zeroed out.
	pub data_length_indicator: Option<u32>,
}

impl FrameFlags {
	/// Parse the flags from an ID3v2.4 frame
	///
	/// NOTE: If any of the following flags are set, they will be set to `Some(0)`
	/// until the corresponding bytes are read:
	/// * `grouping_identity`
	/// * `encryption`
	/// * `data_length_indicator`
	pub fn parse_id3v24(flags: u16) -> Self {
		FrameFlags {
			tag_alter_preservation: flags & 0x4000 == 0x4000,
			file_alter_preservation: flags & 0x2000 == 0x2000,
			read_only: flags & 0x1000 == 0x1000,
			grouping_identity: (flags & 0x0040 == 0x0040).then_some(0),
			compression: flags & 0x0008 == 0x0008,
			encryption: (flags & 0x0004 == 0x0004).then_some(0),
			unsynchronisation: flags & 0x0002 == 0x0002,
			data_length_indicator: (flags & 0x0001 == 0x0001).then_some(0),
		}
	}

	/// Parse the flags from an ID3v2.3 frame
	pub fn parse_id3v23(flags: u16) -> Self {
		FrameFlags {
			tag_alter_preservation: flags & 0x8000 == 0x8000,
			file_alter_preservation: flags & 0x4000 == 0x4000,
			read_only: flags & 0x2000 == 0x2000,
			grouping_identity: (flags & 0x0020 == 0x0020).then_some(0),
			compression: flags & 0x0080 == 0x0080,
			encryption: (flags & 0x0040 == 0x0040).then_some(0),
			unsynchronisation: false,
			data_length_indicator: None,
		}
	}

	/// Get the ID3v2.4 byte representation of the flags
	pub fn as_id3v24_bytes(&self) -> u16 {
		let mut flags = 0;

		if self.tag_alter_preservation {
			flags |= 0x4000;
		}
		if self.file_alter_preservation {
			flags |= 0x2000;
		}
		if self.read_only {
			flags |= 0x1000;
		}
		if self.grouping_identity.is_some() {
			flags |= 0x0040;
		}
		if self.compression {
			flags |= 0x0008;
		}
		if self.encryption.is_some() {
			flags |= 0x0004;
		}
		if self.data_length_indicator.is_some() {
			flags |= 0x0001;
		}

		flags
	}

	/// Get the ID3v2.3 byte representation of the flags
	pub fn as_id3v23_bytes(&self) -> u16 {
		let mut flags = 0;

		if self.tag_alter_preservation {
			flags |= 0x8000;
		}
		if self.file_alter_preservation {
			flags |= 0x4000;
		}
		if self.read_only {
			flags |= 0x2000;
		}
		if self.compression {
			flags |= 0x0080;
		}
		if self.encryption.is_some() {
			flags |= 0x0040;
		}
		if self.grouping_identity.is_some() {
			flags |= 0x0020;
		}

		flags
	}
}

/// A frame as it sits in the tag, before its payload is decoded
///
/// `payload` holds the stored bytes of the frame content, with none of the
/// flag-driven transforms applied yet.
#[derive(Clone, Debug)]
pub(crate) struct RawFrame {
	pub id: FrameId,
	pub flags: FrameFlags,
	/// Offset of the frame header relative to the first frame
	pub offset: usize,
	pub payload: Vec<u8>,
}

/// A decoded ID3v2 frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
	pub(crate) id: FrameId,
	pub(crate) flags: FrameFlags,
	pub(crate) value: FrameValue,
}

impl Frame {
	/// Create a new frame
	///
	/// # Errors
	///
	/// * `id` is not a valid frame ID
	pub fn new<I>(id: I, value: FrameValue) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		Ok(Self {
			id: FrameId::new(id)?,
			flags: FrameFlags::default(),
			value,
		})
	}

	/// The frame's ID
	pub fn id(&self) -> &FrameId {
		&self.id
	}

	/// The frame's flags
	pub fn flags(&self) -> FrameFlags {
		self.flags
	}

	/// Set the frame's flags
	pub fn set_flags(&mut self, flags: FrameFlags) {
		self.flags = flags;
	}

	/// The decoded value
	pub fn value(&self) -> &FrameValue {
		&self.value
	}

	/// The group this frame belongs to, if any
	pub fn group_id(&self) -> Option<u8> {
		self.flags.grouping_identity
	}

	/// The text content, for frames that carry text
	pub fn text(&self) -> Option<&str> {
		match &self.value {
			FrameValue::Text { value, .. } => Some(value),
			FrameValue::Url(url) => Some(url),
			FrameValue::UserText { content, .. } => Some(content),
			FrameValue::UserUrl { url, .. } => Some(url),
			FrameValue::Comment { content, .. } => Some(content),
			_ => None,
		}
	}

	/// Whether this frame failed to decode and is carried as raw bytes
	pub fn is_invalid(&self) -> bool {
		matches!(self.value, FrameValue::Invalid { .. })
	}
}

/// The decoded payload of a frame, one variant per payload shape
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameValue {
	/// Any `T???` frame other than `TXXX`
	Text {
		/// The text encoding
		encoding: TextEncoding,
		/// The text itself
		value: String,
	},
	/// Any `W???` frame other than `WXXX`
	Url(String),
	/// A `TXXX` frame
	UserText {
		/// The text encoding of `description` and `content`
		encoding: TextEncoding,
		/// The key
		description: String,
		/// The value
		content: String,
	},
	/// A `WXXX` frame
	UserUrl {
		/// The text encoding of `description`
		encoding: TextEncoding,
		/// The key
		description: String,
		/// The URL itself, always Latin-1
		url: String,
	},
	/// A `COMM` or `USLT` frame
	Comment {
		/// The text encoding of `description` and `content`
		encoding: TextEncoding,
		/// An ISO-639-2 language code
		language: [u8; 3],
		/// The description of the content
		description: String,
		/// The content itself
		content: String,
	},
	/// A `CHAP` frame
	Chapter {
		/// A NUL-terminated identifier unique within the tag
		element_id: String,
		/// Chapter start in milliseconds
		start_time: u32,
		/// Chapter end in milliseconds
		end_time: u32,
		/// Byte offset of the chapter start, `0xFFFF_FFFF` when unused
		start_offset: u32,
		/// Byte offset of the chapter end, `0xFFFF_FFFF` when unused
		end_offset: u32,
		/// Embedded frames, usually a `TIT2`
		subframes: Vec<Frame>,
	},
	/// A `CTOC` frame
	TableOfContents {
		/// A NUL-terminated identifier unique within the tag
		element_id: String,
		/// Whether this is the root of the chapter hierarchy
		top_level: bool,
		/// Whether the children are ordered
		ordered: bool,
		/// The element IDs of the entries
		children: Vec<String>,
		/// Embedded frames, usually a `TIT2`
		subframes: Vec<Frame>,
	},
	/// Any frame without a more specific shape, carried through unchanged
	Binary(Vec<u8>),
	/// A frame that could not be decoded
	///
	/// The stored bytes are always retained, so a rewrite passes the frame
	/// through unchanged.
	Invalid {
		/// Why the payload failed to decode
		reason: String,
		/// The frame payload exactly as stored
		raw: Vec<u8>,
	},
}

impl FrameValue {
	pub(crate) fn name(&self) -> &'static str {
		match self {
			FrameValue::Text { .. } => "Text",
			FrameValue::Url(_) => "Url",
			FrameValue::UserText { .. } => "UserText",
			FrameValue::UserUrl { .. } => "UserUrl",
			FrameValue::Comment { .. } => "Comment",
			FrameValue::Chapter { .. } => "Chapter",
			FrameValue::TableOfContents { .. } => "TableOfContents",
			FrameValue::Binary(_) => "Binary",
			FrameValue::Invalid { .. } => "Invalid",
		}
	}
}
