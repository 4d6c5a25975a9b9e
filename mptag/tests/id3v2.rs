use mptag::config::{ParseOptions, WriteOptions};
use mptag::id3::v2::{Frame, FrameValue, Id3v2Tag};
use mptag::{TextEncoding, read_from};

use std::io::Cursor;

fn text_frame(id: &'static str, encoding: TextEncoding, value: &str) -> Frame {
	Frame::new(
		id,
		FrameValue::Text {
			encoding,
			value: String::from(value),
		},
	)
	.unwrap()
}

#[test_log::test]
fn end_to_end_known_bytes() {
	// "ID3", v2.4.0, no flags, synchsafe size 17,
	// "TIT2", size 6, no flags, Latin-1, "Hello", one byte of padding
	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"ID3");
	bytes.extend_from_slice(&[4, 0, 0]);
	bytes.extend_from_slice(&[0, 0, 0, 17]);
	bytes.extend_from_slice(b"TIT2");
	bytes.extend_from_slice(&[0, 0, 0, 6]);
	bytes.extend_from_slice(&[0, 0]);
	bytes.push(0);
	bytes.extend_from_slice(b"Hello");
	bytes.push(0);

	let file = read_from(&mut Cursor::new(&bytes), ParseOptions::new()).unwrap();
	let tag = file.id3v2().expect("a v2.4 tag");

	assert_eq!(tag.len(), 1);
	let frame = tag.get("TIT2").unwrap();
	let FrameValue::Text { encoding, value } = frame.value() else {
		panic!("expected text");
	};
	assert_eq!(*encoding, TextEncoding::Latin1);
	assert_eq!(value, "Hello");

	// Re-encoding with the matching encoding reproduces the exact bytes
	let rendered = tag.dump(WriteOptions::new().preferred_padding(1)).unwrap();
	assert_eq!(rendered, bytes);
}

#[test_log::test]
fn round_trip_both_versions() {
	let mut tag = Id3v2Tag::new();
	tag.insert(text_frame("TIT2", TextEncoding::UTF8, "Title \u{2606}"));
	tag.insert(text_frame("TALB", TextEncoding::Latin1, "Album"));
	tag.insert(
		Frame::new(
			"TXXX",
			FrameValue::UserText {
				encoding: TextEncoding::UTF16,
				description: String::from("CATALOG"),
				content: String::from("ABC-123"),
			},
		)
		.unwrap(),
	);
	tag.insert(
		Frame::new(
			"COMM",
			FrameValue::Comment {
				encoding: TextEncoding::UTF8,
				language: *b"eng",
				description: String::new(),
				content: String::from("A comment"),
			},
		)
		.unwrap(),
	);
	tag.insert(
		Frame::new("WOAR", FrameValue::Url(String::from("https://example.com"))).unwrap(),
	);

	for use_id3v23 in [false, true] {
		let rendered = tag
			.dump(WriteOptions::new().use_id3v23(use_id3v23))
			.unwrap();

		let file = read_from(&mut Cursor::new(rendered), ParseOptions::new()).unwrap();
		let read_back = file.id3v2().expect("a tag");

		// Decoded values survive; encodings may differ where the target version
		// forced a substitution
		assert_eq!(read_back.len(), tag.len());
		assert_eq!(read_back.get_text("TIT2"), Some("Title \u{2606}"));
		assert_eq!(read_back.get_text("TALB"), Some("Album"));
		assert_eq!(read_back.get_text("WOAR"), Some("https://example.com"));

		let FrameValue::UserText {
			description,
			content,
			..
		} = read_back.get("TXXX").unwrap().value()
		else {
			panic!("expected user text");
		};
		assert_eq!(description, "CATALOG");
		assert_eq!(content, "ABC-123");

		let FrameValue::Comment {
			language, content, ..
		} = read_back.get("COMM").unwrap().value()
		else {
			panic!("expected a comment");
		};
		assert_eq!(language, b"eng");
		assert_eq!(content, "A comment");
	}
}

#[test_log::test]
fn version_substitution_on_write() {
	let mut tag = Id3v2Tag::new();
	tag.insert(text_frame("TDRC", TextEncoding::Latin1, "2004"));

	// TDRC only exists in ID3v2.4, writing as v2.3 substitutes TYER
	let rendered = tag.dump(WriteOptions::new().use_id3v23(true)).unwrap();

	let file = read_from(&mut Cursor::new(rendered), ParseOptions::new()).unwrap();
	let read_back = file.id3v2().unwrap();

	assert!(read_back.get("TDRC").is_none());
	assert_eq!(read_back.get_text("TYER"), Some("2004"));
}

#[test_log::test]
fn id3v22_tag() {
	// 3-byte IDs, 3-byte sizes, no frame flags
	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"ID3");
	bytes.extend_from_slice(&[2, 0, 0]);
	bytes.extend_from_slice(&[0, 0, 0, 25]);
	bytes.extend_from_slice(b"TT2");
	bytes.extend_from_slice(&[0, 0, 6]);
	bytes.extend_from_slice(b"\x00Hello");
	bytes.extend_from_slice(b"TP1");
	bytes.extend_from_slice(&[0, 0, 7]);
	bytes.extend_from_slice(b"\x00Artist");

	let file = read_from(&mut Cursor::new(bytes), ParseOptions::new()).unwrap();
	let tag = file.id3v2().unwrap();

	assert_eq!(tag.len(), 2);
	assert_eq!(tag.get_text("TT2"), Some("Hello"));
	assert_eq!(tag.get_text("TP1"), Some("Artist"));
}

#[test_log::test]
fn encrypted_frame_is_fatal() {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"ID3");
	bytes.extend_from_slice(&[4, 0, 0]);
	bytes.extend_from_slice(&[0, 0, 0, 17]);
	bytes.extend_from_slice(b"TIT2");
	bytes.extend_from_slice(&[0, 0, 0, 7]);
	// Encryption flag set
	bytes.extend_from_slice(&[0x00, 0x04]);
	bytes.push(0x01);
	bytes.push(0);
	bytes.extend_from_slice(b"Hello");

	assert!(read_from(&mut Cursor::new(bytes), ParseOptions::new()).is_err());
}

#[test_log::test]
fn invalid_frame_round_trips_unchanged() {
	// A COMM frame too short to carry its language bytes
	let bad_payload: &[u8] = &[0x00, b'e'];

	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"ID3");
	bytes.extend_from_slice(&[4, 0, 0]);
	bytes.extend_from_slice(&[0, 0, 0, 28]);
	bytes.extend_from_slice(b"COMM");
	bytes.extend_from_slice(&[0, 0, 0, 2]);
	bytes.extend_from_slice(&[0, 0]);
	bytes.extend_from_slice(bad_payload);
	bytes.extend_from_slice(b"TIT2");
	bytes.extend_from_slice(&[0, 0, 0, 6]);
	bytes.extend_from_slice(&[0, 0]);
	bytes.extend_from_slice(b"\x00Hello");

	let file = read_from(&mut Cursor::new(&bytes), ParseOptions::new()).unwrap();
	let tag = file.id3v2().unwrap();

	// The bad frame is carried, not dropped, and the rest of the tag survived
	assert_eq!(tag.len(), 2);
	let invalid = tag.get("COMM").unwrap();
	assert!(invalid.is_invalid());
	assert_eq!(tag.get_text("TIT2"), Some("Hello"));

	let FrameValue::Invalid { raw, .. } = invalid.value() else {
		panic!("expected an invalid frame");
	};
	assert_eq!(raw, bad_payload);

	// Writing passes the stored bytes through unchanged
	let rendered = tag.dump(WriteOptions::new().preferred_padding(0)).unwrap();
	assert_eq!(rendered, bytes);
}

#[test_log::test]
fn chapter_round_trip() {
	let mut tag = Id3v2Tag::new();
	tag.insert(
		Frame::new(
			"CHAP",
			FrameValue::Chapter {
				element_id: String::from("chp0"),
				start_time: 0,
				end_time: 60_000,
				start_offset: u32::MAX,
				end_offset: u32::MAX,
				subframes: vec![text_frame("TIT2", TextEncoding::UTF8, "Intro")],
			},
		)
		.unwrap(),
	);
	tag.insert(
		Frame::new(
			"CTOC",
			FrameValue::TableOfContents {
				element_id: String::from("toc"),
				top_level: true,
				ordered: true,
				children: vec![String::from("chp0")],
				subframes: Vec::new(),
			},
		)
		.unwrap(),
	);

	let rendered = tag.dump(WriteOptions::new()).unwrap();
	let file = read_from(&mut Cursor::new(rendered), ParseOptions::new()).unwrap();
	let read_back = file.id3v2().unwrap();

	let FrameValue::Chapter {
		element_id,
		end_time,
		subframes,
		..
	} = read_back.get("CHAP").unwrap().value()
	else {
		panic!("expected a chapter");
	};
	assert_eq!(element_id, "chp0");
	assert_eq!(*end_time, 60_000);
	assert_eq!(subframes.len(), 1);
	assert_eq!(subframes[0].text(), Some("Intro"));

	let FrameValue::TableOfContents {
		children,
		top_level,
		..
	} = read_back.get("CTOC").unwrap().value()
	else {
		panic!("expected a table of contents");
	};
	assert!(top_level);
	assert_eq!(children, &[String::from("chp0")]);
}
