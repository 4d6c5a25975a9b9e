use super::read::{decode_frame, read_raw_frames};
use super::{Frame, FrameValue, MAX_SUBFRAME_DEPTH};
use crate::config::ParseOptions;
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::id3::v2::header::Id3v2Version;
use crate::id3::v2::registry::{self, FrameCodec};
use crate::macros::err;
use crate::util::cursor::ByteCursor;
use crate::util::text::{self, TextEncoding};

/// Decode a frame payload through the codec the registry assigns to its ID
///
/// `content` arrives with every flag-driven transform already reversed.
pub(crate) fn parse_value(
	id: &str,
	content: &[u8],
	version: Id3v2Version,
	parse_options: ParseOptions,
	depth: u8,
) -> Result<FrameValue> {
	let Some(codec) = registry::resolve_codec(id.as_bytes()) else {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameId(id.as_bytes().to_vec())).into());
	};

	let mut cursor = ByteCursor::new(content);

	match codec {
		FrameCodec::Text => {
			let encoding = read_encoding(&mut cursor)?;
			let value = text::decode_slice(cursor.remaining(), encoding)?;
			Ok(FrameValue::Text { encoding, value })
		},
		FrameCodec::Url => Ok(FrameValue::Url(text::latin1_decode(content))),
		FrameCodec::UserText => {
			let encoding = read_encoding(&mut cursor)?;
			let description = cursor.read_terminated_text(encoding)?;
			let content = text::decode_slice(cursor.remaining(), encoding)?;
			Ok(FrameValue::UserText {
				encoding,
				description,
				content,
			})
		},
		FrameCodec::UserUrl => {
			let encoding = read_encoding(&mut cursor)?;
			let description = cursor.read_terminated_text(encoding)?;
			// The URL itself is always Latin-1
			let url = text::latin1_decode(cursor.remaining());
			Ok(FrameValue::UserUrl {
				encoding,
				description,
				url,
			})
		},
		FrameCodec::Comment => {
			let encoding = read_encoding(&mut cursor)?;
			let language_bytes = cursor.read_exact(3)?;
			let language = [language_bytes[0], language_bytes[1], language_bytes[2]];
			let description = cursor.read_terminated_text(encoding)?;
			let content = text::decode_slice(cursor.remaining(), encoding)?;
			Ok(FrameValue::Comment {
				encoding,
				language,
				description,
				content,
			})
		},
		FrameCodec::Chapter => {
			let element_id = cursor.read_terminated_text(TextEncoding::Latin1)?;
			let start_time = cursor.read_u32()?;
			let end_time = cursor.read_u32()?;
			let start_offset = cursor.read_u32()?;
			let end_offset = cursor.read_u32()?;
			let subframes = parse_subframes(&mut cursor, version, parse_options, depth)?;

			Ok(FrameValue::Chapter {
				element_id,
				start_time,
				end_time,
				start_offset,
				end_offset,
				subframes,
			})
		},
		FrameCodec::TableOfContents => {
			let element_id = cursor.read_terminated_text(TextEncoding::Latin1)?;
			let flags = cursor.read_u8()?;
			let entry_count = cursor.read_u8()?;

			let mut children = Vec::with_capacity(usize::from(entry_count));
			for _ in 0..entry_count {
				children.push(cursor.read_terminated_text(TextEncoding::Latin1)?);
			}

			let subframes = parse_subframes(&mut cursor, version, parse_options, depth)?;

			Ok(FrameValue::TableOfContents {
				element_id,
				top_level: flags & 0x02 == 0x02,
				ordered: flags & 0x01 == 0x01,
				children,
				subframes,
			})
		},
		FrameCodec::Binary => Ok(FrameValue::Binary(content.to_vec())),
	}
}

fn read_encoding(cursor: &mut ByteCursor<'_>) -> Result<TextEncoding> {
	let byte = cursor.read_u8()?;
	match TextEncoding::from_u8(byte) {
		Some(encoding) => Ok(encoding),
		None => err!(TextDecode("Found invalid encoding")),
	}
}

fn parse_subframes(
	cursor: &mut ByteCursor<'_>,
	version: Id3v2Version,
	parse_options: ParseOptions,
	depth: u8,
) -> Result<Vec<Frame>> {
	if !cursor.has_data() {
		return Ok(Vec::new());
	}

	if depth >= MAX_SUBFRAME_DEPTH {
		log::warn!("Embedded frames nested too deeply, discarding the rest");
		cursor.skip(cursor.remaining_len())?;
		return Ok(Vec::new());
	}

	let raw_frames = read_raw_frames(cursor, version, parse_options)?;

	let mut subframes = Vec::with_capacity(raw_frames.len());
	for raw in raw_frames {
		subframes.push(decode_frame(raw, version, parse_options, depth + 1)?);
	}

	Ok(subframes)
}
