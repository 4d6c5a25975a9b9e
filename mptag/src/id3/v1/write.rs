use super::constants::ID3V1_TAG_MARKER;
use super::tag::Id3v1Tag;

impl Id3v1Tag {
	/// Render the tag to its fixed 128-byte form
	///
	/// Text fields are truncated to fit and encoded lossily as Latin-1. When a track
	/// number is present, the comment field is cut to 28 bytes (ID3v1.1).
	pub fn render(&self) -> [u8; 128] {
		let mut out = [0u8; 128];
		out[..3].copy_from_slice(&ID3V1_TAG_MARKER);

		encode_field(&mut out[3..33], self.title.as_deref());
		encode_field(&mut out[33..63], self.artist.as_deref());
		encode_field(&mut out[63..93], self.album.as_deref());

		if let Some(year) = self.year {
			if year <= 9999 {
				let digits = format!("{year:04}");
				out[93..97].copy_from_slice(digits.as_bytes());
			}
		}

		match self.track_number {
			// A track number of 0 is invalid, it doubles as the ID3v1 comment terminator
			Some(track) if track > 0 => {
				encode_field(&mut out[97..125], self.comment.as_deref());
				out[125] = 0;
				out[126] = track;
			},
			_ => encode_field(&mut out[97..127], self.comment.as_deref()),
		}

		out[127] = self.genre.unwrap_or(255);

		out
	}
}

fn encode_field(dest: &mut [u8], text: Option<&str>) {
	let Some(text) = text else { return };

	for (slot, c) in dest.iter_mut().zip(text.chars()) {
		*slot = if (c as u32) <= 255 { c as u8 } else { b'?' };
	}
}

#[cfg(test)]
mod tests {
	use super::Id3v1Tag;
	use crate::config::ParsingMode;

	#[test_log::test]
	fn render_parse_round_trip() {
		let tag = Id3v1Tag {
			title: Some(String::from("Title")),
			artist: Some(String::from("Artist")),
			album: Some(String::from("Album")),
			year: Some(2004),
			comment: Some(String::from("A comment")),
			track_number: Some(12),
			genre: Some(17),
		};

		let rendered = tag.render();
		assert_eq!(&rendered[..3], b"TAG");
		assert_eq!(rendered.len(), 128);

		let parsed = Id3v1Tag::parse(rendered, ParsingMode::BestAttempt).unwrap();
		assert_eq!(parsed, tag);
	}

	#[test_log::test]
	fn oversized_fields_truncate() {
		let tag = Id3v1Tag {
			title: Some("x".repeat(64)),
			..Id3v1Tag::default()
		};

		let rendered = tag.render();
		let parsed = Id3v1Tag::parse(rendered, ParsingMode::BestAttempt).unwrap();
		assert_eq!(parsed.title.as_deref(), Some("x".repeat(30).as_str()));
	}
}
