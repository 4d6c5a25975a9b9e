use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::id3::v2::restrictions::TagRestrictions;
use crate::macros::err;
use crate::util::cursor::ByteCursor;

/// The ID3v2 version
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

/// Flags that apply to the entire tag
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Id3v2TagFlags {
	/// Whether or not all frames are unsynchronised
	///
	/// This flag has no effect when writing, content is never unsynchronized on write.
	pub unsynchronisation: bool,
	/// Indicates if the tag is in an experimental stage
	pub experimental: bool,
	/// Indicates that the tag includes a footer
	pub footer: bool,
	/// Whether or not a CRC-32 is stored in the extended header
	///
	/// This is calculated if an ID3v2.3 tag is written. Writing an ID3v2.4
	/// extended header is not supported, and fails.
	pub crc: bool,
	/// Restrictions on the tag, read from the ID3v2.4 extended header
	pub restrictions: Option<TagRestrictions>,
}

impl Id3v2TagFlags {
	/// Get the **ID3v2.4** byte representation of the flags
	///
	/// NOTE: This does not include the extended header flags
	pub fn as_id3v24_byte(&self) -> u8 {
		let mut byte = 0;

		if self.experimental {
			byte |= 0x20;
		}

		if self.footer {
			byte |= 0x10;
		}

		byte
	}

	/// Get the **ID3v2.3** byte representation of the flags
	///
	/// NOTE: This does not include the extended header flags
	pub fn as_id3v23_byte(&self) -> u8 {
		let mut byte = 0;

		if self.experimental {
			byte |= 0x20;
		}

		byte
	}
}

/// An ID3v2 tag header
///
/// `size` is the declared size of the tag content, which includes the extended
/// header and padding but not the 10-byte header or the footer.
#[derive(Copy, Clone, Debug)]
pub struct TagHeader {
	/// The major version of the tag
	pub version: Id3v2Version,
	/// The revision byte, kept purely for diagnostics
	pub revision: u8,
	/// Flags for the entire tag
	pub flags: Id3v2TagFlags,
	/// The declared content size
	pub size: u32,
	pub(crate) has_extended_header: bool,
}

impl TagHeader {
	/// The number of bytes this header occupies on disk
	pub const SIZE: u32 = 10;

	/// Parse the 10-byte tag header
	///
	/// # Errors
	///
	/// * The `ID3` marker is missing ([`ErrorKind::FakeTag`](crate::error::ErrorKind::FakeTag))
	/// * The version is not 2, 3, or 4
	/// * An ID3v2.2 tag has its compression flag set
	pub(crate) fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
		log::debug!("Parsing ID3v2 header");

		let marker = cursor.read_exact(3)?;
		if marker != b"ID3" {
			err!(FakeTag);
		}

		let major = cursor.read_u8()?;
		let revision = cursor.read_u8()?;
		let version = match major {
			2 => Id3v2Version::V2,
			3 => Id3v2Version::V3,
			4 => Id3v2Version::V4,
			_ => {
				return Err(
					Id3v2Error::new(Id3v2ErrorKind::BadId3v2Version(major, revision)).into(),
				);
			},
		};

		let flags = cursor.read_u8()?;

		// Compression was a flag only used in ID3v2.2 (bit 6).
		// At the time the ID3v2.2 specification was written, a compression scheme wasn't decided.
		// The spec recommends just ignoring the tag in this case.
		if version == Id3v2Version::V2 && flags & 0x40 == 0x40 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::V2Compression).into());
		}

		let is_v3_or_v4 = version == Id3v2Version::V3 || version == Id3v2Version::V4;
		let flags_parsed = Id3v2TagFlags {
			unsynchronisation: flags & 0x80 == 0x80,
			experimental: is_v3_or_v4 && flags & 0x20 == 0x20,
			footer: version == Id3v2Version::V4 && flags & 0x10 == 0x10,
			crc: false,         // Retrieved from the extended header if applicable
			restrictions: None, // Retrieved from the extended header if applicable
		};

		let size = cursor.read_synchsafe_u32()?;

		Ok(TagHeader {
			version,
			revision,
			flags: flags_parsed,
			size,
			has_extended_header: is_v3_or_v4 && flags & 0x40 == 0x40,
		})
	}

	/// The total on-disk size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u32 {
		self.size + Self::SIZE + if self.flags.footer { 10 } else { 0 }
	}
}

/// A parsed extended header
///
/// Only the pieces a rewrite has to carry forward are retained.
#[derive(Copy, Clone, Debug, Default)]
pub struct ExtendedHeader {
	/// The total number of bytes the extended header occupies within the tag content
	pub size: u32,
	/// The stored CRC-32 of the tag content, if any
	pub crc: Option<u32>,
	/// The declared padding size (ID3v2.3 only)
	pub padding_size: Option<u32>,
	/// Tag restrictions (ID3v2.4 only)
	pub restrictions: Option<TagRestrictions>,
}

impl ExtendedHeader {
	/// Parse a version-specific extended header from the start of the tag content
	pub(crate) fn parse(cursor: &mut ByteCursor<'_>, version: Id3v2Version) -> Result<Self> {
		log::debug!("Parsing ID3v2 extended header");

		match version {
			Id3v2Version::V2 => Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into()),
			Id3v2Version::V3 => Self::parse_v3(cursor),
			Id3v2Version::V4 => Self::parse_v4(cursor),
		}
	}

	// [size (4), flags (2), padding size (4), crc (4, optional)]
	//
	// The declared size excludes the size field itself, and can only be 6 or 10.
	fn parse_v3(cursor: &mut ByteCursor<'_>) -> Result<Self> {
		let mut declared = cursor.read_u32()?;
		if declared > 10 {
			// Real-world tags declare nonsense here. Clamping to the CRC-less size
			// loses nothing we'd act on.
			log::warn!(
				"Extended header declares an invalid size ({declared}), assuming 6"
			);
			declared = 6;
		}
		if declared < 6 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
		}

		let flags = cursor.read_u16()?;
		let padding_size = cursor.read_u32()?;

		let mut crc = None;
		if flags & 0x8000 == 0x8000 && declared >= 10 {
			crc = Some(cursor.read_u32()?);
		}

		Ok(Self {
			size: 4 + declared,
			crc,
			padding_size: Some(padding_size),
			restrictions: None,
		})
	}

	// [size (4, synchsafe, includes itself), flag byte count (1), flags (1), data...]
	fn parse_v4(cursor: &mut ByteCursor<'_>) -> Result<Self> {
		let start = cursor.position();

		let declared = cursor.read_synchsafe_u32()?;
		if declared < 6 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
		}

		// Useless byte since there's only 1 byte for flags
		let _num_flag_bytes = cursor.read_u8()?;
		let flags = cursor.read_u8()?;

		let mut header = Self {
			size: declared,
			..Self::default()
		};

		// Tag is an update (no data)
		if flags & 0x40 == 0x40 {
			let _data_length = cursor.read_u8()?;
		}

		if flags & 0x20 == 0x20 {
			// 5-byte CRC, preceded by its length byte
			let _data_length = cursor.read_u8()?;
			let crc_bytes = cursor.read_exact(5)?;

			let mut crc = 0u32;
			for &b in crc_bytes {
				crc = (crc << 7) | u32::from(b & 0x7F);
			}
			header.crc = Some(crc);
		}

		if flags & 0x10 == 0x10 {
			// We don't care about the length byte, it is always 1
			let _data_length = cursor.read_u8()?;
			header.restrictions = Some(TagRestrictions::from_byte(cursor.read_u8()?));
		}

		// Skip whatever remains of the declared size
		let consumed = (cursor.position() - start) as u32;
		if consumed < declared {
			cursor.skip((declared - consumed) as usize)?;
		}

		Ok(header)
	}
}

#[cfg(test)]
mod tests {
	use super::{ExtendedHeader, Id3v2Version, TagHeader};
	use crate::error::ErrorKind;
	use crate::util::cursor::ByteCursor;

	#[test_log::test]
	fn parse_header() {
		let bytes = [b'I', b'D', b'3', 4, 0, 0x80, 0x00, 0x00, 0x02, 0x01];
		let mut cursor = ByteCursor::new(&bytes);

		let header = TagHeader::parse(&mut cursor).unwrap();
		assert_eq!(header.version, Id3v2Version::V4);
		assert_eq!(header.revision, 0);
		assert!(header.flags.unsynchronisation);
		assert!(!header.has_extended_header);
		assert_eq!(header.size, 257);
		assert_eq!(header.full_tag_size(), 267);
	}

	#[test_log::test]
	fn reject_bad_marker_and_version() {
		let mut cursor = ByteCursor::new(&[b'X', b'D', b'3', 4, 0, 0, 0, 0, 0, 0]);
		let err = TagHeader::parse(&mut cursor).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::FakeTag));

		let mut cursor = ByteCursor::new(&[b'I', b'D', b'3', 5, 0, 0, 0, 0, 0, 0]);
		assert!(TagHeader::parse(&mut cursor).is_err());
	}

	#[test_log::test]
	fn v3_extended_header_clamps_size() {
		// A bogus declared size of 257 clamps down to 6
		let bytes = [0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40];
		let mut cursor = ByteCursor::new(&bytes);

		let ext = ExtendedHeader::parse(&mut cursor, Id3v2Version::V3).unwrap();
		assert_eq!(ext.size, 10);
		assert_eq!(ext.padding_size, Some(64));
		assert_eq!(ext.crc, None);
		assert_eq!(cursor.position(), 10);
	}
}
