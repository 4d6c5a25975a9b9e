use super::content;
use super::{Frame, FrameFlags, FrameId, FrameValue, RawFrame};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::id3::v2::header::Id3v2Version;
use crate::id3::v2::registry;
use crate::id3::v2::util::synchsafe::remove_unsynchronization;
use crate::macros::parse_mode_choice;
use crate::util::cursor::ByteCursor;
use crate::util::text::utf8_decode_str;

fn id_width(version: Id3v2Version) -> usize {
	match version {
		Id3v2Version::V2 => 3,
		Id3v2Version::V3 | Id3v2Version::V4 => 4,
	}
}

/// Read the stored frame sequence out of the tag content
///
/// Reading stops once the content is exhausted or a NUL byte sits where a frame ID
/// is expected (the start of the padding).
///
/// A frame ID position that fails registry validation starts a resynchronization:
/// the reader advances one byte at a time until a valid ID comes up, and the bytes
/// stepped over are appended to the previous frame's payload. A single corrupt size
/// field loses no subsequent frames this way.
pub(crate) fn read_raw_frames(
	cursor: &mut ByteCursor<'_>,
	version: Id3v2Version,
	parse_options: ParseOptions,
) -> Result<Vec<RawFrame>> {
	let id_width = id_width(version);
	let mut frames: Vec<RawFrame> = Vec::new();

	while cursor.has_data() {
		let remaining = cursor.remaining();

		// A NUL where an ID belongs means we've hit the padding
		if remaining[0] == 0 {
			break;
		}

		if remaining.len() < id_width || !registry::is_acceptable_id(&remaining[..id_width]) {
			let skipped = resync(remaining, id_width);
			let parse_mode = parse_options.parsing_mode;
			parse_mode_choice!(
				parse_mode,
				STRICT: return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameId(
					remaining[..id_width.min(remaining.len())].to_vec(),
				))
				.into()),
				DEFAULT: {}
			);

			log::warn!(
				"Failed to read a frame ID, skipping {} bytes to resynchronize",
				skipped
			);

			cursor.skip(skipped)?;
			match frames.last_mut() {
				// The skipped bytes most likely belong to the previous frame, whose
				// declared size was wrong. Give them back rather than dropping them.
				Some(previous) => previous.payload.extend_from_slice(&remaining[..skipped]),
				None => log::warn!("Discarding {} leading garbage bytes", skipped),
			}

			continue;
		}

		let offset = cursor.position();

		let id_bytes = cursor.read_exact(id_width)?;
		// Writers occasionally pad a 3-character ID out to 4 bytes
		let id_trimmed = match id_bytes {
			[head @ .., b' ' | b'\0'] => head,
			_ => id_bytes,
		};
		let id_str = utf8_decode_str(id_trimmed)
			.map_err(|_| Id3v2Error::new(Id3v2ErrorKind::BadFrameId(id_bytes.to_vec())))?;
		let id = FrameId::new(id_str.to_string())?;

		let size = match version {
			Id3v2Version::V2 => cursor.read_u24()?,
			Id3v2Version::V3 => cursor.read_u32()?,
			Id3v2Version::V4 => cursor.read_synchsafe_u32()?,
		};

		let flags = match version {
			Id3v2Version::V2 => FrameFlags::default(),
			Id3v2Version::V3 => FrameFlags::parse_id3v23(cursor.read_u16()?),
			Id3v2Version::V4 => FrameFlags::parse_id3v24(cursor.read_u16()?),
		};

		if size == 0 {
			let parse_mode = parse_options.parsing_mode;
			parse_mode_choice!(
				parse_mode,
				STRICT: return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into()),
				DEFAULT: {
					log::debug!("Encountered a zero length frame, skipping");
					continue;
				}
			);
		}

		let available = cursor.remaining_len();
		let take = (size as usize).min(available);
		if take < size as usize {
			if parse_options.parsing_mode == ParsingMode::Strict {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
			}

			log::warn!(
				"Frame \"{}\" declares {} bytes but only {} remain",
				id,
				size,
				available
			);
		}

		let payload = cursor.read_exact(take)?.to_vec();

		frames.push(RawFrame {
			id,
			flags,
			offset,
			payload,
		});
	}

	Ok(frames)
}

// Count the garbage bytes in front of the next registry-valid frame ID.
// Consumes everything when no further ID exists.
fn resync(remaining: &[u8], id_width: usize) -> usize {
	let mut skipped = 1;

	while skipped < remaining.len() {
		let candidate = &remaining[skipped..];
		if candidate.len() >= id_width && registry::is_acceptable_id(&candidate[..id_width]) {
			return skipped;
		}

		skipped += 1;
	}

	remaining.len()
}

/// Decode one stored frame into its semantic form
///
/// Payload transforms happen here, in stored order: the grouping byte and data
/// length indicator come off the front, then unsynchronization is reversed, then
/// the payload is inflated.
///
/// # Errors
///
/// * The frame is encrypted. There is no safe partial result, so this aborts the tag.
/// * Any decode failure in [`ParsingMode::Strict`]
pub(crate) fn decode_frame(
	raw: RawFrame,
	version: Id3v2Version,
	parse_options: ParseOptions,
	depth: u8,
) -> Result<Frame> {
	if raw.flags.encryption.is_some() {
		return Err(Id3v2Error::new(Id3v2ErrorKind::EncryptedFrameEncountered).into());
	}

	match decode_payload(&raw, version, parse_options, depth) {
		Ok((flags, value)) => Ok(Frame {
			id: raw.id,
			flags,
			value,
		}),
		Err(err) => {
			if parse_options.parsing_mode == ParsingMode::Strict {
				return Err(err);
			}

			log::warn!(
				"Failed to decode frame \"{}\" at offset {}: {}",
				raw.id,
				raw.offset,
				err
			);

			// The original bytes are kept so a rewrite can pass the frame through
			// untouched.
			Ok(Frame {
				id: raw.id,
				flags: raw.flags,
				value: FrameValue::Invalid {
					reason: err.to_string(),
					raw: raw.payload,
				},
			})
		},
	}
}

fn decode_payload(
	raw: &RawFrame,
	version: Id3v2Version,
	parse_options: ParseOptions,
	depth: u8,
) -> Result<(FrameFlags, FrameValue)> {
	let mut flags = raw.flags;
	let mut work: &[u8] = &raw.payload;

	if flags.grouping_identity.is_some() {
		log::trace!("Reading group identifier");

		if work.is_empty() {
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
		}

		flags.grouping_identity = Some(work[0]);
		work = &work[1..];
	}

	if flags.data_length_indicator.is_some() || flags.compression {
		log::trace!("Reading data length indicator");

		if work.len() < 4 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
		}

		let stored = u32::from_be_bytes([work[0], work[1], work[2], work[3]]);
		// ID3v2.3 stores the decompressed size plainly, ID3v2.4 as a synchsafe integer
		let len = match version {
			Id3v2Version::V4 => {
				use crate::id3::v2::util::synchsafe::SynchsafeInteger;
				stored.unsynch()
			},
			_ => stored,
		};
		flags.data_length_indicator = Some(len);
		work = &work[4..];
	}

	let unsynchronized;
	if flags.unsynchronisation {
		unsynchronized = remove_unsynchronization(work);
		work = &unsynchronized;
	}

	let inflated;
	if flags.compression {
		inflated = inflate(work, flags.data_length_indicator)?;
		work = &inflated;
	}

	if work.is_empty() {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
	}

	let value = content::parse_value(raw.id.as_str(), work, version, parse_options, depth)?;
	Ok((flags, value))
}

#[cfg(feature = "id3v2_compression_support")]
fn inflate(data: &[u8], size_hint: Option<u32>) -> Result<Vec<u8>> {
	use crate::macros::try_vec;

	use std::io::Read;

	let mut out = match size_hint {
		Some(hint) => {
			let mut v: Vec<u8> = try_vec![0; hint as usize];
			v.clear();
			v
		},
		None => Vec::new(),
	};

	flate2::read::ZlibDecoder::new(data).read_to_end(&mut out)?;
	Ok(out)
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn inflate(_: &[u8], _: Option<u32>) -> Result<Vec<u8>> {
	Err(Id3v2Error::new(Id3v2ErrorKind::CompressedFrameEncountered).into())
}
