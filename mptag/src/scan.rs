//! The container scanner
//!
//! One forward pass over the byte stream classifies every region of the file. Three
//! independent interests (ID3v2, ID3v1, MPEG) drive the pass; each is dropped as
//! soon as its format is conclusively resolved, and scanning degrades to a plain
//! drain once none remain.

use crate::config::ParseOptions;
use crate::error::Result;
use crate::id3::v1::Id3v1Tag;
use crate::id3::v2::read::parse_id3v2;
use crate::id3::v2::{Id3v2Tag, TagHeader};
use crate::io::ChunkedStream;
use crate::layout::{HeadFrame, RawLayout, TagRegion};
use crate::mpeg::{RawMpegHeader, find_vbr_header};
use crate::util::cursor::ByteCursor;

use std::io::Read;

const SCAN_CHUNK_SIZE: usize = 20_000;

// Must exceed the largest structure handled inline: the 128-byte ID3v1 trailer
// and every header (<= 10 bytes).
const MIN_CHUNK_TAIL: usize = 200;

// In a quick scan, candidate collection stops here. The chain resolver never
// considers more than this many candidates when picking the stream start.
const QUICK_SCAN_CANDIDATE_LIMIT: usize = 500;

pub(crate) struct ScanOutput {
	pub layout: RawLayout,
	pub id3v2: Option<Id3v2Tag>,
	pub id3v1: Option<Id3v1Tag>,
}

struct Id3v1Candidate {
	offset: u64,
	bytes: [u8; 128],
}

/// Run the scan to completion, producing the layout and any tags
pub(crate) fn scan<R: Read>(
	stream: &mut ChunkedStream<R>,
	parse_options: ParseOptions,
) -> Result<ScanOutput> {
	let mut layout = RawLayout::default();
	let mut id3v2_tag: Option<Id3v2Tag> = None;
	let mut id3v1_candidate: Option<Id3v1Candidate> = None;

	let mut id3v2_interest = true;
	let mut id3v1_interest = true;
	let mut mpeg_interest = parse_options.read_mpeg_frames;

	'scan: loop {
		if !id3v2_interest && !id3v1_interest && !mpeg_interest {
			break;
		}

		let chunk = stream.read(SCAN_CHUNK_SIZE)?;
		if chunk.is_empty() {
			break;
		}

		let chunk_start = stream.offset() - chunk.len() as u64;
		let mut pos = 0usize;

		while pos < chunk.len() {
			let remaining = chunk.len() - pos;

			// Never let an inline structure straddle the chunk edge
			if remaining < MIN_CHUNK_TAIL && !stream.source_ended() {
				stream.unshift(chunk[pos..].to_vec());
				continue 'scan;
			}

			let absolute = chunk_start + pos as u64;
			let trigger = chunk[pos];

			if id3v2_interest && trigger == b'I' && chunk[pos..].starts_with(b"ID3") {
				stream.unshift(chunk[pos..].to_vec());
				read_id3v2(
					stream,
					&mut layout,
					&mut id3v2_tag,
					&mut id3v2_interest,
					parse_options,
				)?;
				continue 'scan;
			}

			if id3v1_interest && trigger == b'T' && chunk[pos..].starts_with(b"TAG") {
				// Only a trailer filling the last 128 bytes is real; that isn't
				// knowable until the file size is, so keep the latest candidate.
				if remaining >= 128 {
					let mut bytes = [0u8; 128];
					bytes.copy_from_slice(&chunk[pos..pos + 128]);
					id3v1_candidate = Some(Id3v1Candidate {
						offset: absolute,
						bytes,
					});

					if parse_options.file_size == Some(absolute + 128) {
						id3v1_interest = false;
					}
				}
			}

			if mpeg_interest && trigger == 0xFF && remaining >= 4 {
				let header_bytes = [
					chunk[pos],
					chunk[pos + 1],
					chunk[pos + 2],
					chunk[pos + 3],
				];

				if let Some(header) = RawMpegHeader::parse(absolute, header_bytes) {
					if layout.head_frame.is_none() {
						if let Some(vbr) = find_vbr_header(&chunk[pos + 4..]) {
							if vbr.is_valid() {
								log::debug!("MPEG: Found a {:?} head frame", vbr.ty);
								layout.head_frame = Some(HeadFrame {
									offset: absolute,
									vbr,
								});
							}
						}
					}

					layout.mpeg_frames.push(header);

					if !parse_options.full_mpeg_scan
						&& layout.mpeg_frames.len() >= QUICK_SCAN_CANDIDATE_LIMIT
					{
						log::debug!(
							"MPEG: Collected {} candidates, stopping the frame scan",
							layout.mpeg_frames.len()
						);
						mpeg_interest = false;
					}
				}
			}

			// Candidates may overlap, so the scan advances a single byte even
			// after a match. The chain resolver sorts out which ones are real.
			pos += 1;
		}
	}

	// Whatever is left only matters for the total size
	if let Some(size) = parse_options.file_size {
		layout.file_size = size;
	} else {
		while stream.skip(SCAN_CHUNK_SIZE)? > 0 {}
		layout.file_size = stream.offset();
	}

	let mut id3v1_tag = None;
	if let Some(candidate) = id3v1_candidate {
		if candidate.offset + 128 == layout.file_size {
			layout.id3v1_region = Some(TagRegion {
				start: candidate.offset,
				end: candidate.offset + 128,
			});

			if parse_options.read_tags {
				id3v1_tag = Some(Id3v1Tag::parse(
					candidate.bytes,
					parse_options.parsing_mode,
				)?);
			}
		}
	}

	Ok(ScanOutput {
		layout,
		id3v2: id3v2_tag,
		id3v1: id3v1_tag,
	})
}

// Reads a tag at the stream position, which sits on an `ID3` marker.
//
// Structural failures (bad version, truncated input) are treated as the absence of
// a tag and scanning moves on; decode failures inside an intact tag propagate.
fn read_id3v2<R: Read>(
	stream: &mut ChunkedStream<R>,
	layout: &mut RawLayout,
	tag_out: &mut Option<Id3v2Tag>,
	interest: &mut bool,
	parse_options: ParseOptions,
) -> Result<()> {
	let start = stream.offset();

	let header_bytes = stream.read(TagHeader::SIZE as usize)?;
	if header_bytes.len() < TagHeader::SIZE as usize {
		// The file ends inside the header. Not a tag.
		return Ok(());
	}

	let mut cursor = ByteCursor::new(&header_bytes);
	let header = match TagHeader::parse(&mut cursor) {
		Ok(header) => header,
		Err(err) => {
			log::debug!("Skipping an ID3 marker that isn't a tag: {}", err);

			// Resume the scan one byte in, the marker may overlap real data
			stream.unshift(header_bytes[1..].to_vec());
			return Ok(());
		},
	};

	let body = stream.read(header.size as usize)?;
	if body.len() < header.size as usize {
		log::warn!(
			"ID3v2 tag declares {} bytes but the file ends after {}",
			header.size,
			body.len()
		);
		return Ok(());
	}

	if header.flags.footer {
		stream.skip(10)?;
	}

	layout.id3v2_regions.push(TagRegion {
		start,
		end: stream.offset(),
	});

	if parse_options.read_tags {
		let parsed = parse_id3v2(&body, header, parse_options)?;
		match tag_out {
			// Frames of any further tag are appended to the first
			Some(existing) => {
				log::warn!("Found a duplicate ID3v2 tag, merging frames");
				for frame in parsed.frames {
					existing.insert(frame);
				}
			},
			None => *tag_out = Some(parsed),
		}
	}

	if !parse_options.detect_duplicate_id3v2 {
		*interest = false;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::scan;
	use crate::config::ParseOptions;
	use crate::io::ChunkedStream;

	use std::io::Cursor;

	fn minimal_id3v2() -> Vec<u8> {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(b"ID3\x04\x00\x00");
		bytes.extend_from_slice(&[0, 0, 0, 16]);
		bytes.extend_from_slice(b"TIT2");
		bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0]);
		bytes.extend_from_slice(b"\x00Hello");
		bytes
	}

	fn id3v1_trailer() -> Vec<u8> {
		let mut bytes = vec![0u8; 128];
		bytes[..3].copy_from_slice(b"TAG");
		bytes[3..8].copy_from_slice(b"Title");
		bytes[125] = 0;
		bytes[126] = 3;
		bytes[127] = 255;
		bytes
	}

	fn audio_frames(count: usize) -> Vec<u8> {
		let mut bytes = Vec::new();
		for _ in 0..count {
			let mut frame = vec![0u8; 417];
			frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
			bytes.extend_from_slice(&frame);
		}
		bytes
	}

	#[test_log::test]
	fn full_file() {
		let mut file = minimal_id3v2();
		let audio_start = file.len() as u64;
		file.extend_from_slice(&audio_frames(3));
		file.extend_from_slice(&id3v1_trailer());
		let total = file.len() as u64;

		let mut stream = ChunkedStream::new(Cursor::new(file));
		let output = scan(&mut stream, ParseOptions::new()).unwrap();

		assert_eq!(output.layout.file_size, total);
		assert_eq!(output.layout.id3v2_regions.len(), 1);
		assert_eq!(output.layout.id3v2_regions[0].start, 0);
		assert_eq!(output.layout.id3v2_regions[0].end, 26);
		assert_eq!(
			output.layout.id3v1_region.map(|r| r.start),
			Some(total - 128)
		);

		let id3v2 = output.id3v2.unwrap();
		assert_eq!(id3v2.get_text("TIT2"), Some("Hello"));

		let id3v1 = output.id3v1.unwrap();
		assert_eq!(id3v1.title.as_deref(), Some("Title"));
		assert_eq!(id3v1.track_number, Some(3));

		// The first audio frame was seen at its true offset
		assert!(
			output
				.layout
				.mpeg_frames
				.iter()
				.any(|frame| frame.offset == audio_start)
		);
	}

	#[test_log::test]
	fn truncated_header_is_absence() {
		// A 10-byte file with a plausible header but nothing after it
		let bytes = b"ID3\x04\x00\x00\x00\x00\x00\x11".to_vec();

		let mut stream = ChunkedStream::new(Cursor::new(bytes));
		let output = scan(&mut stream, ParseOptions::new()).unwrap();

		assert!(output.id3v2.is_none());
		assert!(output.layout.id3v2_regions.is_empty());
		assert_eq!(output.layout.file_size, 10);
	}

	#[test_log::test]
	fn non_mp3_is_absence() {
		let bytes = vec![0x42u8; 4096];

		let mut stream = ChunkedStream::new(Cursor::new(bytes));
		let output = scan(&mut stream, ParseOptions::new()).unwrap();

		assert!(output.id3v2.is_none());
		assert!(output.id3v1.is_none());
		assert!(output.layout.mpeg_frames.is_empty());
		assert_eq!(output.layout.file_size, 4096);
	}

	#[test_log::test]
	fn mid_file_tag_marker_is_not_a_trailer() {
		// "TAG" in the middle of the data, far from EOF
		let mut bytes = vec![0u8; 64];
		bytes.extend_from_slice(b"TAGnot a trailer");
		bytes.extend_from_slice(&vec![0u8; 512]);

		let mut stream = ChunkedStream::new(Cursor::new(bytes));
		let output = scan(&mut stream, ParseOptions::new()).unwrap();

		assert!(output.id3v1.is_none());
		assert!(output.layout.id3v1_region.is_none());
	}

	#[test_log::test]
	fn duplicate_tags_merge_when_requested() {
		let mut file = minimal_id3v2();

		// A second tag with a different frame
		let mut second = Vec::new();
		second.extend_from_slice(b"ID3\x04\x00\x00");
		second.extend_from_slice(&[0, 0, 0, 16]);
		second.extend_from_slice(b"TALB");
		second.extend_from_slice(&[0, 0, 0, 6, 0, 0]);
		second.extend_from_slice(b"\x00Album");
		file.extend_from_slice(&second);

		let mut stream = ChunkedStream::new(Cursor::new(file.clone()));
		let output = scan(
			&mut stream,
			ParseOptions::new().detect_duplicate_id3v2(true),
		)
		.unwrap();

		let tag = output.id3v2.unwrap();
		assert_eq!(tag.get_text("TIT2"), Some("Hello"));
		assert_eq!(tag.get_text("TALB"), Some("Album"));
		assert_eq!(output.layout.id3v2_regions.len(), 2);

		// Without duplicate detection the second tag is not parsed
		let mut stream = ChunkedStream::new(Cursor::new(file));
		let output = scan(&mut stream, ParseOptions::new()).unwrap();
		let tag = output.id3v2.unwrap();
		assert_eq!(tag.get_text("TIT2"), Some("Hello"));
		assert!(tag.get_text("TALB").is_none());
	}
}
