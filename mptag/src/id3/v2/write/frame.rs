use crate::config::WriteOptions;
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::id3::v2::frame::{Frame, FrameFlags, FrameValue};
use crate::id3::v2::header::Id3v2Version;
use crate::id3::v2::registry;
use crate::id3::v2::util::synchsafe::SynchsafeInteger;
use crate::util::cursor::ByteWriter;
use crate::util::text::TextEncoding;

pub(super) fn create_frames(
	writer: &mut ByteWriter,
	frames: &[Frame],
	version: Id3v2Version,
	write_options: WriteOptions,
) -> Result<()> {
	for frame in frames {
		write_frame(writer, frame, version, write_options)?;
	}

	Ok(())
}

fn write_frame(
	writer: &mut ByteWriter,
	frame: &Frame,
	version: Id3v2Version,
	write_options: WriteOptions,
) -> Result<()> {
	// Substitute the ID through the registry chain when the target version
	// doesn't know this one. The value is carried over unconverted.
	let id = match registry::ensure_id_for_version(frame.id().as_str(), version)? {
		Some(substitute) => {
			log::warn!(
				"Frame ID \"{}\" is not valid in {:?}, writing as \"{}\"",
				frame.id(),
				version,
				substitute
			);
			substitute
		},
		None => frame.id().as_str(),
	};

	let payload = render_value(frame, version, write_options)?;

	let flags = match frame.value() {
		// A carried-through frame keeps its stored form, and with it its stored
		// flags. Anything else is written from its decoded payload, so the
		// transform flags no longer apply.
		FrameValue::Invalid { .. } => frame.flags(),
		_ => FrameFlags {
			unsynchronisation: false,
			compression: false,
			encryption: None,
			data_length_indicator: None,
			..frame.flags()
		},
	};

	let is_grouping_identity = flags.grouping_identity.is_some()
		&& !matches!(frame.value(), FrameValue::Invalid { .. });
	let len = if is_grouping_identity {
		payload.len() as u32 + 1
	} else {
		payload.len() as u32
	};

	write_frame_header(writer, id, len, flags, version)?;

	if is_grouping_identity {
		// Guaranteed to be `Some` at this point.
		writer.write_u8(flags.grouping_identity.unwrap());
	}

	writer.write_all(&payload);

	Ok(())
}

fn write_frame_header(
	writer: &mut ByteWriter,
	id: &str,
	len: u32,
	flags: FrameFlags,
	version: Id3v2Version,
) -> Result<()> {
	writer.write_all(id.as_bytes());

	match version {
		Id3v2Version::V2 => writer.write_u24(len),
		Id3v2Version::V3 => {
			writer.write_u32(len);
			writer.write_u16(flags.as_id3v23_bytes());
		},
		Id3v2Version::V4 => {
			writer.write_u32(len.synch()?);
			writer.write_u16(flags.as_id3v24_bytes());
		},
	}

	Ok(())
}

// The inverse of `content::parse_value`, one arm per payload shape
fn render_value(
	frame: &Frame,
	version: Id3v2Version,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let mut writer = ByteWriter::new();

	match frame.value() {
		FrameValue::Text { encoding, value } => {
			let encoding = effective_encoding(*encoding, version);
			writer.write_u8(encoding as u8);
			writer.write_text(value, encoding, false)?;
		},
		FrameValue::Url(url) => {
			writer.write_text(url, TextEncoding::Latin1, false)?;
		},
		FrameValue::UserText {
			encoding,
			description,
			content,
		} => {
			let encoding = effective_encoding(*encoding, version);
			writer.write_u8(encoding as u8);
			writer.write_text(description, encoding, true)?;
			writer.write_text(content, encoding, false)?;
		},
		FrameValue::UserUrl {
			encoding,
			description,
			url,
		} => {
			let encoding = effective_encoding(*encoding, version);
			writer.write_u8(encoding as u8);
			writer.write_text(description, encoding, true)?;
			writer.write_text(url, TextEncoding::Latin1, false)?;
		},
		FrameValue::Comment {
			encoding,
			language,
			description,
			content,
		} => {
			let encoding = effective_encoding(*encoding, version);
			writer.write_u8(encoding as u8);
			writer.write_all(language);
			writer.write_text(description, encoding, true)?;
			writer.write_text(content, encoding, false)?;
		},
		FrameValue::Chapter {
			element_id,
			start_time,
			end_time,
			start_offset,
			end_offset,
			subframes,
		} => {
			writer.write_text(element_id, TextEncoding::Latin1, true)?;
			writer.write_u32(*start_time);
			writer.write_u32(*end_time);
			writer.write_u32(*start_offset);
			writer.write_u32(*end_offset);
			create_frames(&mut writer, subframes, version, write_options)?;
		},
		FrameValue::TableOfContents {
			element_id,
			top_level,
			ordered,
			children,
			subframes,
		} => {
			if children.len() > usize::from(u8::MAX) {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrame(
					frame.id().to_string(),
					"too many entries",
				))
				.into());
			}

			writer.write_text(element_id, TextEncoding::Latin1, true)?;

			let mut flags = 0u8;
			if *top_level {
				flags |= 0x02;
			}
			if *ordered {
				flags |= 0x01;
			}
			writer.write_u8(flags);

			writer.write_u8(children.len() as u8);
			for child in children {
				writer.write_text(child, TextEncoding::Latin1, true)?;
			}

			create_frames(&mut writer, subframes, version, write_options)?;
		},
		FrameValue::Binary(data) => writer.write_all(data),
		FrameValue::Invalid { raw, .. } => writer.write_all(raw),
	}

	Ok(writer.into_inner())
}

fn effective_encoding(encoding: TextEncoding, version: Id3v2Version) -> TextEncoding {
	match version {
		Id3v2Version::V4 => encoding,
		_ => encoding.to_id3v23(),
	}
}
