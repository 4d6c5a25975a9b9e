use super::frame::{Frame, FrameValue};
use super::header::{Id3v2TagFlags, Id3v2Version};
use crate::config::WriteOptions;
use crate::error::Result;

/// An ID3v2 tag
///
/// Frames are kept in the order they were read or inserted. Inserting a frame that
/// shares its identity with an existing one replaces it; for the described frame
/// kinds (`TXXX`, `WXXX`, `COMM`, `USLT`, chapters and tables of contents) the
/// identity includes their descriptor, so multiple instances can coexist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Id3v2Tag {
	pub(crate) original_version: Id3v2Version,
	flags: Id3v2TagFlags,
	pub(crate) frames: Vec<Frame>,
}

impl Default for Id3v2Tag {
	fn default() -> Self {
		Self {
			original_version: Id3v2Version::V4,
			flags: Id3v2TagFlags::default(),
			frames: Vec::new(),
		}
	}
}

impl Id3v2Tag {
	/// Create an empty tag
	pub fn new() -> Self {
		Self::default()
	}

	/// The version this tag was read as
	///
	/// A newly created tag reports [`Id3v2Version::V4`]. The version used when
	/// writing is controlled by [`WriteOptions::use_id3v23`], not by this.
	pub fn original_version(&self) -> Id3v2Version {
		self.original_version
	}

	/// The tag-level flags
	pub fn flags(&self) -> Id3v2TagFlags {
		self.flags
	}

	/// Restrict the tag's flags
	pub fn set_flags(&mut self, flags: Id3v2TagFlags) {
		self.flags = flags;
	}

	/// The frames in this tag, in stored order
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// The number of frames in this tag
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the tag has no frames
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// The first frame with the given ID
	pub fn get(&self, id: &str) -> Option<&Frame> {
		self.frames.iter().find(|frame| frame.id().as_str() == id)
	}

	/// The text of the first frame with the given ID
	pub fn get_text(&self, id: &str) -> Option<&str> {
		self.get(id).and_then(Frame::text)
	}

	/// Insert a frame, replacing any existing frame with the same identity
	///
	/// Returns the replaced frame, if any.
	pub fn insert(&mut self, frame: Frame) -> Option<Frame> {
		let replaced = self
			.frames
			.iter()
			.position(|existing| same_identity(existing, &frame))
			.map(|pos| self.frames.remove(pos));

		self.frames.push(frame);
		replaced
	}

	/// Remove the first frame with the given ID
	pub fn remove(&mut self, id: &str) -> Option<Frame> {
		self.frames
			.iter()
			.position(|frame| frame.id().as_str() == id)
			.map(|pos| self.frames.remove(pos))
	}

	/// Render the tag to its on-disk form
	///
	/// See [`create_tag`](crate::id3::v2::write) for the details; an empty tag
	/// renders to nothing, which strips the tag when written back to a file.
	pub fn dump(&self, write_options: WriteOptions) -> Result<Vec<u8>> {
		super::write::create_tag(self, write_options)
	}
}

fn same_identity(a: &Frame, b: &Frame) -> bool {
	if a.id() != b.id() {
		return false;
	}

	match (a.value(), b.value()) {
		(
			FrameValue::UserText {
				description: a_description,
				..
			},
			FrameValue::UserText {
				description: b_description,
				..
			},
		)
		| (
			FrameValue::UserUrl {
				description: a_description,
				..
			},
			FrameValue::UserUrl {
				description: b_description,
				..
			},
		) => a_description == b_description,
		(
			FrameValue::Comment {
				language: a_language,
				description: a_description,
				..
			},
			FrameValue::Comment {
				language: b_language,
				description: b_description,
				..
			},
		) => a_language == b_language && a_description == b_description,
		(
			FrameValue::Chapter {
				element_id: a_element,
				..
			},
			FrameValue::Chapter {
				element_id: b_element,
				..
			},
		)
		| (
			FrameValue::TableOfContents {
				element_id: a_element,
				..
			},
			FrameValue::TableOfContents {
				element_id: b_element,
				..
			},
		) => a_element == b_element,
		// Carried-through frames never displace anything
		(FrameValue::Invalid { .. }, _) | (_, FrameValue::Invalid { .. }) => false,
		(FrameValue::Binary(_), FrameValue::Binary(_)) => false,
		_ => true,
	}
}

#[cfg(test)]
mod tests {
	use super::Id3v2Tag;
	use crate::id3::v2::{Frame, FrameValue};
	use crate::util::text::TextEncoding;

	fn text_frame(id: &'static str, value: &str) -> Frame {
		Frame::new(
			id,
			FrameValue::Text {
				encoding: TextEncoding::UTF8,
				value: String::from(value),
			},
		)
		.unwrap()
	}

	fn user_text_frame(description: &str, content: &str) -> Frame {
		Frame::new(
			"TXXX",
			FrameValue::UserText {
				encoding: TextEncoding::UTF8,
				description: String::from(description),
				content: String::from(content),
			},
		)
		.unwrap()
	}

	#[test_log::test]
	fn insert_replaces_same_id() {
		let mut tag = Id3v2Tag::new();
		assert!(tag.insert(text_frame("TIT2", "First")).is_none());

		let replaced = tag.insert(text_frame("TIT2", "Second")).unwrap();
		assert_eq!(replaced.text(), Some("First"));

		assert_eq!(tag.len(), 1);
		assert_eq!(tag.get_text("TIT2"), Some("Second"));
	}

	#[test_log::test]
	fn described_frames_coexist() {
		let mut tag = Id3v2Tag::new();
		assert!(tag.insert(user_text_frame("key1", "a")).is_none());
		assert!(tag.insert(user_text_frame("key2", "b")).is_none());
		assert_eq!(tag.len(), 2);

		// Same description replaces
		assert!(tag.insert(user_text_frame("key1", "c")).is_some());
		assert_eq!(tag.len(), 2);
	}

	#[test_log::test]
	fn remove_frame() {
		let mut tag = Id3v2Tag::new();
		tag.insert(text_frame("TIT2", "Title"));
		tag.insert(text_frame("TALB", "Album"));

		assert!(tag.remove("TIT2").is_some());
		assert!(tag.get("TIT2").is_none());
		assert_eq!(tag.len(), 1);
	}
}
