mod frame;

use super::header::Id3v2Version;
use super::tag::Id3v2Tag;
use super::util::synchsafe::SynchsafeInteger;
use crate::config::WriteOptions;
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::try_vec;
use crate::util::cursor::ByteWriter;

use std::sync::OnceLock;

fn crc_32_table() -> &'static [u32; 256] {
	static INSTANCE: OnceLock<[u32; 256]> = OnceLock::new();
	INSTANCE.get_or_init(|| {
		let mut crc32_table = [0; 256];

		for n in 0..256 {
			crc32_table[n as usize] = (0..8).fold(n as u32, |acc, _| match acc & 1 {
				1 => 0xEDB8_8320 ^ (acc >> 1),
				_ => acc >> 1,
			});
		}

		crc32_table
	})
}

fn calculate_crc(content: &[u8]) -> u32 {
	!content.iter().fold(!0u32, |crc, octet| {
		(crc >> 8) ^ crc_32_table()[((crc ^ u32::from(*octet)) & 0xFF) as usize]
	})
}

/// Render a tag to its on-disk form
///
/// The target version comes from [`WriteOptions::use_id3v23`]; frame IDs not valid
/// there are substituted through the registry's upgrade/downgrade chain, and the
/// render fails when no mapping exists. Unsynchronization is never applied.
///
/// An empty tag renders to an empty buffer, the signal to strip the tag.
///
/// # Errors
///
/// * The tag requires an ID3v2.4 extended header (CRC/restrictions), which is not
///   implemented. This fails up front rather than emitting wrong bytes.
/// * A frame has no ID mapping in the target version
pub(crate) fn create_tag(tag: &Id3v2Tag, write_options: WriteOptions) -> Result<Vec<u8>> {
	if tag.is_empty() {
		return Ok(Vec::new());
	}

	let version = if write_options.use_id3v23 {
		log::debug!("Using ID3v2.3");
		Id3v2Version::V3
	} else {
		Id3v2Version::V4
	};

	let flags = tag.flags();

	// An ID3v2.4 extended header would be required to carry these, and writing one
	// is not implemented.
	if version == Id3v2Version::V4 && (flags.crc || flags.restrictions.is_some()) {
		return Err(Id3v2Error::new(Id3v2ErrorKind::ExtendedHeaderWriteUnsupported).into());
	}

	// Footers only exist in ID3v2.4
	let has_footer = flags.footer && version == Id3v2Version::V4;

	let padding_len = if has_footer {
		// A tag with a footer must not be padded
		log::trace!("Footer requested, not padding tag");
		0
	} else {
		write_options.preferred_padding.unwrap_or(0) as usize
	};

	let mut writer = ByteWriter::new();

	writer.write_all(b"ID3");
	match version {
		Id3v2Version::V3 => writer.write_all(&[3, 0]),
		_ => writer.write_all(&[4, 0]),
	}

	let flag_byte = match version {
		Id3v2Version::V3 => {
			let mut byte = flags.as_id3v23_byte();
			if flags.crc {
				// Extended header present
				byte |= 0x40;
			}
			byte
		},
		_ => flags.as_id3v24_byte(),
	};
	writer.write_u8(flag_byte);

	// Patched once the content length is known
	writer.write_u32(0);

	let mut extended_header_len = 0u32;
	let mut crc_pos = None;
	if version == Id3v2Version::V3 && flags.crc {
		// [size (4), flags (2), padding size (4), crc (4)]
		writer.write_u32(10);
		writer.write_u16(0x8000);
		writer.write_u32(padding_len as u32);

		crc_pos = Some(writer.len());
		writer.write_u32(0);

		extended_header_len = 14;
	}

	let frames_start = writer.len();
	frame::create_frames(&mut writer, tag.frames(), version, write_options)?;
	let frames_len = writer.len() - frames_start;

	if let Some(crc_pos) = crc_pos {
		let crc = calculate_crc(&writer.as_slice()[frames_start..]);
		writer.write_u32_at(crc_pos, crc);
	}

	let size = extended_header_len + frames_len as u32 + padding_len as u32;
	writer.write_u32_at(6, size.synch()?);

	if padding_len > 0 {
		log::trace!("Padding tag with {} bytes", padding_len);
		writer.write_all(&try_vec![0; padding_len]);
	}

	if has_footer {
		// The footer is the same as the header, but with the identifier reversed
		let head = writer.as_slice()[3..10].to_vec();
		writer.write_all(b"3DI");
		writer.write_all(&head);
	}

	Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
	use super::create_tag;
	use crate::config::{ParseOptions, WriteOptions};
	use crate::id3::v2::header::{Id3v2TagFlags, TagHeader};
	use crate::id3::v2::read::parse_id3v2;
	use crate::id3::v2::{Frame, FrameValue, Id3v2Tag};
	use crate::util::cursor::ByteCursor;
	use crate::util::text::TextEncoding;

	fn sample_tag() -> Id3v2Tag {
		let mut tag = Id3v2Tag::new();
		tag.insert(
			Frame::new(
				"TIT2",
				FrameValue::Text {
					encoding: TextEncoding::Latin1,
					value: String::from("Hello"),
				},
			)
			.unwrap(),
		);
		tag
	}

	fn read_back(bytes: &[u8]) -> Id3v2Tag {
		let mut cursor = ByteCursor::new(bytes);
		let header = TagHeader::parse(&mut cursor).unwrap();
		parse_id3v2(cursor.remaining(), header, ParseOptions::new()).unwrap()
	}

	#[test_log::test]
	fn known_byte_output() {
		let rendered = sample_tag()
			.dump(WriteOptions::new().preferred_padding(1))
			.unwrap();

		let mut expected = Vec::new();
		expected.extend_from_slice(b"ID3\x04\x00\x00");
		expected.extend_from_slice(&[0x00, 0x00, 0x00, 17]);
		expected.extend_from_slice(b"TIT2");
		expected.extend_from_slice(&[0, 0, 0, 6, 0, 0]);
		expected.extend_from_slice(b"\x00Hello");
		expected.push(0);

		assert_eq!(rendered, expected);
	}

	#[test_log::test]
	fn empty_tag_renders_to_nothing() {
		assert!(Id3v2Tag::new().dump(WriteOptions::new()).unwrap().is_empty());
	}

	#[test_log::test]
	fn v24_extended_header_write_fails_loudly() {
		let mut tag = sample_tag();
		tag.set_flags(Id3v2TagFlags {
			crc: true,
			..Id3v2TagFlags::default()
		});

		assert!(create_tag(&tag, WriteOptions::new()).is_err());

		// The same tag is writable as ID3v2.3
		let rendered = create_tag(&tag, WriteOptions::new().use_id3v23(true)).unwrap();
		assert_eq!(&rendered[3..5], &[3, 0]);

		let parsed = read_back(&rendered);
		assert_eq!(parsed.get_text("TIT2"), Some("Hello"));
		assert!(parsed.flags().crc);
	}

	#[test_log::test]
	fn footer_suppresses_padding() {
		let mut tag = sample_tag();
		tag.set_flags(Id3v2TagFlags {
			footer: true,
			..Id3v2TagFlags::default()
		});

		let rendered = tag.dump(WriteOptions::new()).unwrap();
		assert_eq!(&rendered[rendered.len() - 10..rendered.len() - 7], b"3DI");

		// Header and footer agree on everything but the marker
		assert_eq!(rendered[3..10], rendered[rendered.len() - 7..]);
	}
}
