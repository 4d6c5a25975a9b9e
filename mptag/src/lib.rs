//! Parse and rewrite MP3 container metadata without decoding audio.
//!
//! mptag reads ID3v1 trailers, ID3v2 tags (2.2, 2.3, 2.4), and the raw MPEG frame
//! layout (bitrate, Xing/Info/VBRI) of a file, and writes tags back. It is built
//! for real-world files: garbage between structures, sync patterns that appear by
//! coincidence, frames whose declared sizes are wrong, and tags nobody can decode
//! are all survived rather than fatal.
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> mptag::error::Result<()> {
//! use mptag::read_from_path;
//!
//! let mpeg_file = read_from_path("test.mp3")?;
//!
//! if let Some(id3v2) = mpeg_file.id3v2() {
//! 	println!("Title: {:?}", id3v2.get_text("TIT2"));
//! }
//!
//! println!("{} audio frames", mpeg_file.audio_frames().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Rewriting a tag
//!
//! ```rust,no_run
//! # fn main() -> mptag::error::Result<()> {
//! use mptag::config::WriteOptions;
//! use mptag::id3::v2::{Frame, FrameValue, Id3v2Tag};
//! use mptag::TextEncoding;
//!
//! let mut tag = Id3v2Tag::new();
//! tag.insert(Frame::new(
//! 	"TIT2",
//! 	FrameValue::Text {
//! 		encoding: TextEncoding::UTF8,
//! 		value: String::from("Title"),
//! 	},
//! )?);
//!
//! mptag::save::replace_id3v2("test.mp3", &tag, WriteOptions::new())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub(crate) mod macros;
pub mod probe;
pub mod save;
pub(crate) mod scan;
mod util;

pub mod id3;
pub mod mpeg;

pub use crate::probe::{read_from, read_from_path};

pub use util::cursor::{ByteCursor, ByteWriter};
pub use util::text::TextEncoding;
