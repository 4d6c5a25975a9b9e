use mptag::config::ParseOptions;
use mptag::mpeg::VbrHeaderType;
use mptag::read_from;

use std::io::Cursor;

// MPEG-1 Layer III, 128 kbps, 44100 Hz -> 417 bytes per frame
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const FRAME_SIZE: usize = 417;

fn frame_with_body(fill: u8) -> Vec<u8> {
	let mut frame = vec![fill; FRAME_SIZE];
	frame[..4].copy_from_slice(&FRAME_HEADER);
	frame
}

#[test_log::test]
fn resolves_stream_through_junk() {
	let mut file = Vec::new();

	// Junk that happens to contain a sync pattern, then a run of real frames
	file.extend_from_slice(&[0x01, 0x02]);
	file.extend_from_slice(&FRAME_HEADER);
	file.extend_from_slice(&[0x09; 60]);
	let stream_start = file.len() as u64;
	for _ in 0..4 {
		file.extend_from_slice(&frame_with_body(0));
	}

	let parsed = read_from(&mut Cursor::new(file), ParseOptions::new()).unwrap();

	// The raw layout keeps every candidate, the resolved chain only the real run
	assert!(parsed.layout().mpeg_frames.len() > 4);
	let offsets: Vec<u64> = parsed
		.audio_frames()
		.iter()
		.map(|frame| frame.offset)
		.collect();
	assert_eq!(
		offsets,
		[
			stream_start,
			stream_start + 417,
			stream_start + 834,
			stream_start + 1251
		]
	);
}

#[test_log::test]
fn xing_head_frame() {
	let mut file = Vec::new();

	// First frame carries a Xing header after the side information (32 bytes
	// for MPEG-1 stereo)
	let mut head = frame_with_body(0);
	head[4 + 32..4 + 36].copy_from_slice(b"Xing");
	head[4 + 36..4 + 40].copy_from_slice(&3u32.to_be_bytes());
	head[4 + 40..4 + 44].copy_from_slice(&1000u32.to_be_bytes());
	head[4 + 44..4 + 48].copy_from_slice(&4_000_000u32.to_be_bytes());
	file.extend_from_slice(&head);
	file.extend_from_slice(&frame_with_body(0));

	let parsed = read_from(&mut Cursor::new(file), ParseOptions::new()).unwrap();

	let head_frame = parsed.layout().head_frame.as_ref().expect("a head frame");
	assert_eq!(head_frame.offset, 0);
	assert_eq!(head_frame.vbr.ty, VbrHeaderType::Xing);
	assert_eq!(head_frame.vbr.frames, 1000);
	assert_eq!(head_frame.vbr.size, 4_000_000);
}

#[test_log::test]
fn decoded_header_properties() {
	let file = frame_with_body(0);
	let parsed = read_from(&mut Cursor::new(file), ParseOptions::new()).unwrap();

	let raw = parsed.layout().mpeg_frames[0];
	let header = raw.decode();
	assert_eq!(header.bitrate, 128);
	assert_eq!(header.sample_rate, 44100);
	assert_eq!(raw.encode(), FRAME_HEADER);
}

#[test_log::test]
fn empty_input() {
	let parsed = read_from(&mut Cursor::new(Vec::new()), ParseOptions::new()).unwrap();
	assert!(parsed.id3v2().is_none());
	assert!(parsed.id3v1().is_none());
	assert!(parsed.audio_frames().is_empty());
	assert_eq!(parsed.layout().file_size, 0);
}
