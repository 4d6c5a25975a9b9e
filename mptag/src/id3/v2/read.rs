use super::frame::read::{decode_frame, read_raw_frames};
use super::header::{ExtendedHeader, Id3v2Version, TagHeader};
use super::tag::Id3v2Tag;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::id3::v2::util::synchsafe::remove_unsynchronization;
use crate::util::cursor::ByteCursor;

/// Parse a tag's content, given its already-parsed header
///
/// `bytes` is the tag content as stored: everything between the 10-byte header and
/// the footer, `header.size` bytes long.
pub(crate) fn parse_id3v2(
	bytes: &[u8],
	header: TagHeader,
	parse_options: ParseOptions,
) -> Result<Id3v2Tag> {
	log::debug!(
		"Parsing ID3v2 tag, size: {}, version: {:?}",
		header.size,
		header.version
	);

	// With the tag-level flag set, the entire content was unsynchronized as one
	// stream. Frame-level flags are handled per frame.
	let unsynchronized;
	let mut content = bytes;
	if header.flags.unsynchronisation {
		unsynchronized = remove_unsynchronization(bytes);
		content = &unsynchronized;
	}

	let mut cursor = ByteCursor::new(content);

	let mut flags = header.flags;
	if header.has_extended_header {
		let extended = ExtendedHeader::parse(&mut cursor, header.version)?;
		flags.crc = extended.crc.is_some();
		if header.version == Id3v2Version::V4 {
			flags.restrictions = extended.restrictions;
		}
	}

	let raw_frames = read_raw_frames(&mut cursor, header.version, parse_options)?;

	let mut tag = Id3v2Tag::new();
	tag.original_version = header.version;
	tag.set_flags(flags);

	for raw in raw_frames {
		let frame = decode_frame(raw, header.version, parse_options, 0)?;
		if let Some(replaced) = tag.insert(frame) {
			log::warn!(
				"Replaced frame with ID \"{id}\" by a frame with the same ID",
				id = replaced.id()
			);
		}
	}

	Ok(tag)
}

#[cfg(test)]
mod tests {
	use super::parse_id3v2;
	use crate::config::ParseOptions;
	use crate::id3::v2::header::TagHeader;
	use crate::util::cursor::ByteCursor;

	fn parse(bytes: &[u8]) -> crate::id3::v2::Id3v2Tag {
		let mut cursor = ByteCursor::new(bytes);
		let header = TagHeader::parse(&mut cursor).unwrap();
		parse_id3v2(cursor.remaining(), header, ParseOptions::new()).unwrap()
	}

	#[test_log::test]
	fn resync_keeps_subsequent_frames() {
		// TIT2 declares 5 bytes but actually stores 8, leaving 3 bytes of garbage
		// in front of the next frame ID
		let mut tag = Vec::new();
		tag.extend_from_slice(b"TIT2");
		tag.extend_from_slice(&[0, 0, 0, 5, 0, 0]);
		tag.extend_from_slice(b"\x00Hell(o)");
		tag.extend_from_slice(b"TALB");
		tag.extend_from_slice(&[0, 0, 0, 6, 0, 0]);
		tag.extend_from_slice(b"\x00Album");

		let mut bytes = Vec::new();
		bytes.extend_from_slice(b"ID3\x04\x00\x00");
		bytes.push(0);
		bytes.push(0);
		bytes.push((tag.len() >> 7) as u8);
		bytes.push((tag.len() & 0x7F) as u8);
		bytes.extend_from_slice(&tag);

		let parsed = parse(&bytes);
		assert_eq!(parsed.len(), 2);

		// The skipped bytes were handed back to the preceding frame
		assert_eq!(parsed.get("TIT2").unwrap().text(), Some("Hell(o)"));
		assert_eq!(parsed.get("TALB").unwrap().text(), Some("Album"));
	}

	#[test_log::test]
	fn whole_tag_unsynchronization() {
		// Content holds a 0xFF followed by a stuffed 0x00
		let mut frame = Vec::new();
		frame.extend_from_slice(b"TIT2");
		frame.extend_from_slice(&[0, 0, 0, 3, 0, 0]);
		frame.extend_from_slice(&[0x00, 0xFF, 0xE1]);

		let stuffed = crate::id3::v2::util::synchsafe::apply_unsynchronization(&frame);
		assert_eq!(stuffed.len(), frame.len() + 1);

		let mut bytes = Vec::new();
		bytes.extend_from_slice(b"ID3\x04\x00\x80");
		bytes.push(0);
		bytes.push(0);
		bytes.push((stuffed.len() >> 7) as u8);
		bytes.push((stuffed.len() & 0x7F) as u8);
		bytes.extend_from_slice(&stuffed);

		let parsed = parse(&bytes);
		assert_eq!(parsed.len(), 1);

		let frame = parsed.get("TIT2").unwrap();
		let crate::id3::v2::FrameValue::Text { value, .. } = frame.value() else {
			panic!("expected text");
		};
		assert_eq!(value.as_str(), "\u{00FF}\u{00E1}");
	}
}
