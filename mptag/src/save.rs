//! Rewriting tags on disk
//!
//! Replacement is copy-then-rename for crash safety: the new tag and the remaining
//! audio go to a temp file first, the original becomes the `.bak`, and the temp
//! takes the original's name. At no point does a crash leave the path without a
//! complete file, and nothing touches the original until the new content has fully
//! reached the disk.

use crate::config::WriteOptions;
use crate::error::Result;
use crate::id3::v2::{Id3v2Tag, TagHeader};
use crate::util::cursor::ByteCursor;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Replace (or create) the ID3v2 tag at the front of the file
///
/// An empty `tag` strips the existing tag instead, see [`strip_id3v2`].
///
/// # Errors
///
/// * The tag cannot be rendered for the target version (nothing on disk is touched)
/// * I/O failures; the temp file is removed and the original restored where possible
pub fn replace_id3v2<P>(path: P, tag: &Id3v2Tag, write_options: WriteOptions) -> Result<()>
where
	P: AsRef<Path>,
{
	// Render first. An unsupported target state must fail before any
	// destructive step.
	let new_tag = crate::id3::v2::write::create_tag(tag, write_options)?;
	replace_leading_tag(path.as_ref(), &new_tag, write_options)
}

/// Remove the ID3v2 tag at the front of the file, if any
///
/// # Errors
///
/// Same as [`replace_id3v2`]
pub fn strip_id3v2<P>(path: P, write_options: WriteOptions) -> Result<()>
where
	P: AsRef<Path>,
{
	replace_leading_tag(path.as_ref(), &[], write_options)
}

// Where the audio starts: one past the existing leading tag, or 0
fn existing_tag_end(file: &mut File) -> Result<u64> {
	let mut header = [0u8; TagHeader::SIZE as usize];

	let mut filled = 0;
	while filled < header.len() {
		match file.read(&mut header[filled..])? {
			0 => return Ok(0),
			n => filled += n,
		}
	}

	let mut cursor = ByteCursor::new(&header);
	match TagHeader::parse(&mut cursor) {
		Ok(parsed) => Ok(u64::from(parsed.full_tag_size())),
		Err(_) => Ok(0),
	}
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
	let mut name = OsString::from(path.as_os_str());
	name.push(suffix);
	PathBuf::from(name)
}

fn replace_leading_tag(path: &Path, new_tag: &[u8], write_options: WriteOptions) -> Result<()> {
	let mut original = File::open(path)?;

	let file_len = original.metadata()?.len();
	let audio_start = existing_tag_end(&mut original)?.min(file_len);

	let temp_path = sibling_path(path, ".tmp");
	let backup_path = sibling_path(path, ".bak");

	let copy_result = (|| -> Result<()> {
		let mut temp = File::create(&temp_path)?;

		temp.write_all(new_tag)?;

		original.seek(SeekFrom::Start(audio_start))?;
		io::copy(&mut original, &mut temp)?;

		// The original must remain untouched until the replacement has fully
		// round-tripped to disk
		temp.sync_all()?;
		Ok(())
	})();

	drop(original);

	if let Err(err) = copy_result {
		let _ = fs::remove_file(&temp_path);
		return Err(err);
	}

	if let Err(err) = fs::rename(path, &backup_path) {
		let _ = fs::remove_file(&temp_path);
		return Err(err.into());
	}

	if let Err(err) = fs::rename(&temp_path, path) {
		// Put the original back under its own name
		let _ = fs::rename(&backup_path, path);
		let _ = fs::remove_file(&temp_path);
		return Err(err.into());
	}

	if !write_options.keep_backup {
		fs::remove_file(&backup_path)?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{replace_id3v2, strip_id3v2};
	use crate::config::WriteOptions;
	use crate::id3::v2::{Frame, FrameValue, Id3v2Tag, Id3v2TagFlags};
	use crate::util::text::TextEncoding;

	use std::io::Write;

	const AUDIO: &[u8] = &[0xFF, 0xFB, 0x90, 0x00, 0x01, 0x02, 0x03, 0x04];

	fn tag_with_title(title: &str) -> Id3v2Tag {
		let mut tag = Id3v2Tag::new();
		tag.insert(
			Frame::new(
				"TIT2",
				FrameValue::Text {
					encoding: TextEncoding::Latin1,
					value: String::from(title),
				},
			)
			.unwrap(),
		);
		tag
	}

	fn file_with_tag() -> tempfile::TempDir {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("test.mp3");

		let mut content = tag_with_title("Old")
			.dump(WriteOptions::new().preferred_padding(0))
			.unwrap();
		content.extend_from_slice(AUDIO);
		std::fs::File::create(&path)
			.unwrap()
			.write_all(&content)
			.unwrap();

		dir
	}

	#[test_log::test]
	fn replace_keeps_audio() {
		let dir = file_with_tag();
		let path = dir.path().join("test.mp3");

		replace_id3v2(
			&path,
			&tag_with_title("New"),
			WriteOptions::new().preferred_padding(0),
		)
		.unwrap();

		let written = std::fs::read(&path).unwrap();
		assert!(written.ends_with(AUDIO));

		let file = crate::read_from_path(&path).unwrap();
		assert_eq!(file.id3v2().unwrap().get_text("TIT2"), Some("New"));

		// Backup removed by default
		assert!(!dir.path().join("test.mp3.bak").exists());
		assert!(!dir.path().join("test.mp3.tmp").exists());
	}

	#[test_log::test]
	fn backup_kept_on_request() {
		let dir = file_with_tag();
		let path = dir.path().join("test.mp3");
		let original = std::fs::read(&path).unwrap();

		replace_id3v2(
			&path,
			&tag_with_title("New"),
			WriteOptions::new().preferred_padding(0).keep_backup(true),
		)
		.unwrap();

		let backup = std::fs::read(dir.path().join("test.mp3.bak")).unwrap();
		assert_eq!(backup, original);
	}

	#[test_log::test]
	fn strip_removes_tag() {
		let dir = file_with_tag();
		let path = dir.path().join("test.mp3");

		strip_id3v2(&path, WriteOptions::new()).unwrap();

		let written = std::fs::read(&path).unwrap();
		assert_eq!(written, AUDIO);
	}

	#[test_log::test]
	fn unsupported_write_leaves_file_untouched() {
		let dir = file_with_tag();
		let path = dir.path().join("test.mp3");
		let original = std::fs::read(&path).unwrap();

		// Requires an ID3v2.4 extended header, which cannot be written
		let mut tag = tag_with_title("New");
		tag.set_flags(Id3v2TagFlags {
			crc: true,
			..Id3v2TagFlags::default()
		});

		assert!(replace_id3v2(&path, &tag, WriteOptions::new()).is_err());

		assert_eq!(std::fs::read(&path).unwrap(), original);
		assert!(!dir.path().join("test.mp3.tmp").exists());
		assert!(!dir.path().join("test.mp3.bak").exists());
	}
}
