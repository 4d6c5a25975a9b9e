//! Entry points for reading files

use crate::config::ParseOptions;
use crate::error::Result;
use crate::mpeg::MpegFile;

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read an [`MpegFile`] from a reader
///
/// # Errors
///
/// See [`MpegFile::read_from`]
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> mptag::error::Result<()> {
/// use mptag::config::ParseOptions;
/// use mptag::read_from;
/// use std::fs::File;
///
/// let mut file = File::open("test.mp3")?;
/// let mpeg_file = read_from(&mut file, ParseOptions::new())?;
/// # Ok(())
/// # }
/// ```
pub fn read_from<R: Read>(reader: &mut R, parse_options: ParseOptions) -> Result<MpegFile> {
	MpegFile::read_from(reader, parse_options)
}

/// Read an [`MpegFile`] from a path
///
/// The file size is taken from the filesystem up front, which lets the scanner
/// stop early once everything else is resolved.
///
/// # Errors
///
/// * `path` does not exist
/// * See [`MpegFile::read_from`]
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> mptag::error::Result<()> {
/// use mptag::read_from_path;
///
/// let mpeg_file = read_from_path("test.mp3")?;
/// # Ok(())
/// # }
/// ```
pub fn read_from_path<P>(path: P) -> Result<MpegFile>
where
	P: AsRef<Path>,
{
	let mut file = File::open(path)?;
	let file_size = file.metadata()?.len();

	MpegFile::read_from(
		&mut file,
		ParseOptions::new().file_size(Some(file_size)),
	)
}
