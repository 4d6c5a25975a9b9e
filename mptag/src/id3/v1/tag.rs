use super::constants::GENRES;

/// An ID3v1 tag
///
/// All fields are optional; an empty (all-NUL) field reads back as `None`.
///
/// A `track_number` is only present for ID3v1.1 tags, where the comment is cut
/// to 28 bytes to make room for it.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
	/// The title, 30 bytes max
	pub title: Option<String>,
	/// The artist, 30 bytes max
	pub artist: Option<String>,
	/// The album, 30 bytes max
	pub album: Option<String>,
	/// A 4-digit year
	pub year: Option<u16>,
	/// The comment, 30 bytes max (28 with a track number)
	pub comment: Option<String>,
	/// The track number (ID3v1.1 only, never 0)
	pub track_number: Option<u8>,
	/// The genre index into [`GENRES`](super::constants::GENRES)
	pub genre: Option<u8>,
}

impl Id3v1Tag {
	/// Create a new empty `Id3v1Tag`
	pub fn new() -> Self {
		Self::default()
	}

	/// The name of the stored genre index, if it is within the genre list
	pub fn genre_str(&self) -> Option<&'static str> {
		self.genre
			.and_then(|genre| GENRES.get(genre as usize).copied())
	}

	/// Whether every field is empty
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}
