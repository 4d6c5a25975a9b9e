//! The frame ID registry
//!
//! Every known ID3v2 frame ID is registered here with its human-readable title, the
//! codec used to decode its payload, the set of tag versions the ID may appear in,
//! and (for legacy IDs) the ID it upgrades to in the next version.
//!
//! Lookups are binary-safe: raw ID bytes are resolved through a prefix trie without
//! allocating, tolerating one trailing space/NUL padding byte. IDs not present in the
//! registry fall back to pattern matching: any remaining `T???` is generic text and
//! any `W???` a generic URL.

use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::id3::v2::header::Id3v2Version;

use std::sync::OnceLock;

pub(crate) const V2: u8 = 1 << 0;
pub(crate) const V3: u8 = 1 << 1;
pub(crate) const V4: u8 = 1 << 2;

pub(crate) fn version_bit(version: Id3v2Version) -> u8 {
	match version {
		Id3v2Version::V2 => V2,
		Id3v2Version::V3 => V3,
		Id3v2Version::V4 => V4,
	}
}

/// How a frame's payload is decoded and re-encoded
///
/// Frames are handled uniformly through this closed set of payload shapes rather
/// than a codec per frame ID.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameCodec {
	/// A text encoding byte followed by text
	Text,
	/// Latin-1 text
	Url,
	/// A text encoding byte, a described key, and text
	UserText,
	/// A text encoding byte, a described key, and a Latin-1 URL
	UserUrl,
	/// A text encoding byte, a 3-byte language, a description, and text
	Comment,
	/// A chapter with timing info and embedded subframes
	Chapter,
	/// A table of contents with child element IDs and embedded subframes
	TableOfContents,
	/// An opaque payload, carried through unchanged
	Binary,
}

/// A registry entry for a single frame ID
#[derive(Debug)]
pub struct FrameSpec {
	/// The frame ID, 3 characters for ID3v2.2 and 4 otherwise
	pub id: &'static str,
	/// The title given to the frame by the ID3v2 specification
	pub title: &'static str,
	/// The payload codec
	pub codec: FrameCodec,
	/// The versions this ID may appear in
	pub(crate) versions: u8,
	/// The ID this one was renamed to in the following tag version
	pub(crate) upgrade: Option<&'static str>,
}

macro_rules! frame_specs {
	($($id:literal => $versions:expr, $codec:ident, $upgrade:expr, $title:literal;)+) => {
		&[
			$(FrameSpec {
				id: $id,
				title: $title,
				codec: FrameCodec::$codec,
				versions: $versions,
				upgrade: $upgrade,
			},)+
		]
	};
}

#[rustfmt::skip]
static FRAME_SPECS: &[FrameSpec] = frame_specs! {
	// ID3v2.2
	"BUF" => V2, Binary,   Some("RBUF"), "Recommended buffer size";
	"CNT" => V2, Binary,   Some("PCNT"), "Play counter";
	"COM" => V2, Comment,  Some("COMM"), "Comments";
	"CRA" => V2, Binary,   Some("AENC"), "Audio encryption";
	"CRM" => V2, Binary,   None,         "Encrypted meta frame";
	"EQU" => V2, Binary,   Some("EQUA"), "Equalization";
	"ETC" => V2, Binary,   Some("ETCO"), "Event timing codes";
	"GEO" => V2, Binary,   Some("GEOB"), "General encapsulated object";
	"IPL" => V2, Text,     Some("IPLS"), "Involved people list";
	"LNK" => V2, Binary,   Some("LINK"), "Linked information";
	"MCI" => V2, Binary,   Some("MCDI"), "Music CD identifier";
	"MLL" => V2, Binary,   Some("MLLT"), "MPEG location lookup table";
	"PIC" => V2, Binary,   Some("APIC"), "Attached picture";
	"POP" => V2, Binary,   Some("POPM"), "Popularimeter";
	"REV" => V2, Binary,   Some("RVRB"), "Reverb";
	"RVA" => V2, Binary,   Some("RVAD"), "Relative volume adjustment";
	"SLT" => V2, Binary,   Some("SYLT"), "Synchronized lyric/text";
	"STC" => V2, Binary,   Some("SYTC"), "Synced tempo codes";
	"TAL" => V2, Text,     Some("TALB"), "Album/Movie/Show title";
	"TBP" => V2, Text,     Some("TBPM"), "BPM (Beats Per Minute)";
	"TCM" => V2, Text,     Some("TCOM"), "Composer";
	"TCO" => V2, Text,     Some("TCON"), "Content type";
	"TCR" => V2, Text,     Some("TCOP"), "Copyright message";
	"TDA" => V2, Text,     Some("TDAT"), "Date";
	"TDY" => V2, Text,     Some("TDLY"), "Playlist delay";
	"TEN" => V2, Text,     Some("TENC"), "Encoded by";
	"TFT" => V2, Text,     Some("TFLT"), "File type";
	"TIM" => V2, Text,     Some("TIME"), "Time";
	"TKE" => V2, Text,     Some("TKEY"), "Initial key";
	"TLA" => V2, Text,     Some("TLAN"), "Language(s)";
	"TLE" => V2, Text,     Some("TLEN"), "Length";
	"TMT" => V2, Text,     Some("TMED"), "Media type";
	"TOA" => V2, Text,     Some("TOPE"), "Original artist(s)/performer(s)";
	"TOF" => V2, Text,     Some("TOFN"), "Original filename";
	"TOL" => V2, Text,     Some("TOLY"), "Original lyricist(s)/text writer(s)";
	"TOR" => V2, Text,     Some("TORY"), "Original release year";
	"TOT" => V2, Text,     Some("TOAL"), "Original album/movie/show title";
	"TP1" => V2, Text,     Some("TPE1"), "Lead artist(s)/Lead performer(s)";
	"TP2" => V2, Text,     Some("TPE2"), "Band/Orchestra/Accompaniment";
	"TP3" => V2, Text,     Some("TPE3"), "Conductor";
	"TP4" => V2, Text,     Some("TPE4"), "Interpreted, remixed, or otherwise modified by";
	"TPA" => V2, Text,     Some("TPOS"), "Part of a set";
	"TPB" => V2, Text,     Some("TPUB"), "Publisher";
	"TRC" => V2, Text,     Some("TSRC"), "ISRC (International Standard Recording Code)";
	"TRD" => V2, Text,     Some("TRDA"), "Recording dates";
	"TRK" => V2, Text,     Some("TRCK"), "Track number/Position in set";
	"TSI" => V2, Text,     Some("TSIZ"), "Size";
	"TSS" => V2, Text,     Some("TSSE"), "Software/hardware and settings used for encoding";
	"TT1" => V2, Text,     Some("TIT1"), "Content group description";
	"TT2" => V2, Text,     Some("TIT2"), "Title/Songname/Content description";
	"TT3" => V2, Text,     Some("TIT3"), "Subtitle/Description refinement";
	"TXT" => V2, Text,     Some("TEXT"), "Lyricist/text writer";
	"TXX" => V2, UserText, Some("TXXX"), "User defined text information frame";
	"TYE" => V2, Text,     Some("TYER"), "Year";
	"UFI" => V2, Binary,   Some("UFID"), "Unique file identifier";
	"ULT" => V2, Comment,  Some("USLT"), "Unsynchronized lyric/text transcription";
	"WAF" => V2, Url,      Some("WOAF"), "Official audio file webpage";
	"WAR" => V2, Url,      Some("WOAR"), "Official artist/performer webpage";
	"WAS" => V2, Url,      Some("WOAS"), "Official audio source webpage";
	"WCM" => V2, Url,      Some("WCOM"), "Commercial information";
	"WCP" => V2, Url,      Some("WCOP"), "Copyright/Legal information";
	"WPB" => V2, Url,      Some("WPUB"), "Publishers official webpage";
	"WXX" => V2, UserUrl,  Some("WXXX"), "User defined URL link frame";

	// ID3v2.3 and ID3v2.4
	"AENC" => V3 | V4, Binary,          None, "Audio encryption";
	"APIC" => V3 | V4, Binary,          None, "Attached picture";
	"CHAP" => V3 | V4, Chapter,         None, "Chapter";
	"COMM" => V3 | V4, Comment,         None, "Comments";
	"COMR" => V3 | V4, Binary,          None, "Commercial frame";
	"CTOC" => V3 | V4, TableOfContents, None, "Table of contents";
	"ENCR" => V3 | V4, Binary,          None, "Encryption method registration";
	"ETCO" => V3 | V4, Binary,          None, "Event timing codes";
	"GEOB" => V3 | V4, Binary,          None, "General encapsulated object";
	"GRID" => V3 | V4, Binary,          None, "Group identification registration";
	"LINK" => V3 | V4, Binary,          None, "Linked information";
	"MCDI" => V3 | V4, Binary,          None, "Music CD identifier";
	"MLLT" => V3 | V4, Binary,          None, "MPEG location lookup table";
	"OWNE" => V3 | V4, Binary,          None, "Ownership frame";
	"PCNT" => V3 | V4, Binary,          None, "Play counter";
	"POPM" => V3 | V4, Binary,          None, "Popularimeter";
	"POSS" => V3 | V4, Binary,          None, "Position synchronisation frame";
	"PRIV" => V3 | V4, Binary,          None, "Private frame";
	"RBUF" => V3 | V4, Binary,          None, "Recommended buffer size";
	"RVRB" => V3 | V4, Binary,          None, "Reverb";
	"SYLT" => V3 | V4, Binary,          None, "Synchronized lyric/text";
	"SYTC" => V3 | V4, Binary,          None, "Synchronized tempo codes";
	"TALB" => V3 | V4, Text,            None, "Album/Movie/Show title";
	"TBPM" => V3 | V4, Text,            None, "BPM (beats per minute)";
	"TCOM" => V3 | V4, Text,            None, "Composer";
	"TCON" => V3 | V4, Text,            None, "Content type";
	"TCOP" => V3 | V4, Text,            None, "Copyright message";
	"TDLY" => V3 | V4, Text,            None, "Playlist delay";
	"TENC" => V3 | V4, Text,            None, "Encoded by";
	"TEXT" => V3 | V4, Text,            None, "Lyricist/Text writer";
	"TFLT" => V3 | V4, Text,            None, "File type";
	"TIT1" => V3 | V4, Text,            None, "Content group description";
	"TIT2" => V3 | V4, Text,            None, "Title/songname/content description";
	"TIT3" => V3 | V4, Text,            None, "Subtitle/Description refinement";
	"TKEY" => V3 | V4, Text,            None, "Initial key";
	"TLAN" => V3 | V4, Text,            None, "Language(s)";
	"TLEN" => V3 | V4, Text,            None, "Length";
	"TMED" => V3 | V4, Text,            None, "Media type";
	"TOAL" => V3 | V4, Text,            None, "Original album/movie/show title";
	"TOFN" => V3 | V4, Text,            None, "Original filename";
	"TOLY" => V3 | V4, Text,            None, "Original lyricist(s)/text writer(s)";
	"TOPE" => V3 | V4, Text,            None, "Original artist(s)/performer(s)";
	"TOWN" => V3 | V4, Text,            None, "File owner/licensee";
	"TPE1" => V3 | V4, Text,            None, "Lead performer(s)/Soloist(s)";
	"TPE2" => V3 | V4, Text,            None, "Band/orchestra/accompaniment";
	"TPE3" => V3 | V4, Text,            None, "Conductor/performer refinement";
	"TPE4" => V3 | V4, Text,            None, "Interpreted, remixed, or otherwise modified by";
	"TPOS" => V3 | V4, Text,            None, "Part of a set";
	"TPUB" => V3 | V4, Text,            None, "Publisher";
	"TRCK" => V3 | V4, Text,            None, "Track number/Position in set";
	"TRSN" => V3 | V4, Text,            None, "Internet radio station name";
	"TRSO" => V3 | V4, Text,            None, "Internet radio station owner";
	"TSRC" => V3 | V4, Text,            None, "ISRC (international standard recording code)";
	"TSSE" => V3 | V4, Text,            None, "Software/Hardware and settings used for encoding";
	"TXXX" => V3 | V4, UserText,        None, "User defined text information frame";
	"UFID" => V3 | V4, Binary,          None, "Unique file identifier";
	"USER" => V3 | V4, Binary,          None, "Terms of use";
	"USLT" => V3 | V4, Comment,         None, "Unsynchronized lyric/text transcription";
	"WCOM" => V3 | V4, Url,             None, "Commercial information";
	"WCOP" => V3 | V4, Url,             None, "Copyright/Legal information";
	"WOAF" => V3 | V4, Url,             None, "Official audio file webpage";
	"WOAR" => V3 | V4, Url,             None, "Official artist/performer webpage";
	"WOAS" => V3 | V4, Url,             None, "Official audio source webpage";
	"WORS" => V3 | V4, Url,             None, "Official Internet radio station homepage";
	"WPAY" => V3 | V4, Url,             None, "Payment";
	"WPUB" => V3 | V4, Url,             None, "Publishers official webpage";
	"WXXX" => V3 | V4, UserUrl,         None, "User defined URL link frame";

	// ID3v2.3 only
	"EQUA" => V3, Binary, Some("EQU2"), "Equalization";
	"IPLS" => V3, Text,   Some("TIPL"), "Involved people list";
	"RVAD" => V3, Binary, Some("RVA2"), "Relative volume adjustment";
	"TDAT" => V3, Text,   None,         "Date";
	"TIME" => V3, Text,   None,         "Time";
	"TORY" => V3, Text,   Some("TDOR"), "Original release year";
	"TRDA" => V3, Text,   None,         "Recording dates";
	"TSIZ" => V3, Text,   None,         "Size";
	"TYER" => V3, Text,   Some("TDRC"), "Year";

	// ID3v2.4 only
	"ASPI" => V4, Binary, None, "Audio seek point index";
	"EQU2" => V4, Binary, None, "Equalisation (2)";
	"RVA2" => V4, Binary, None, "Relative volume adjustment (2)";
	"SEEK" => V4, Binary, None, "Seek frame";
	"SIGN" => V4, Binary, None, "Signature frame";
	"TDEN" => V4, Text,   None, "Encoding time";
	"TDOR" => V4, Text,   None, "Original release time";
	"TDRC" => V4, Text,   None, "Recording time";
	"TDRL" => V4, Text,   None, "Release time";
	"TDTG" => V4, Text,   None, "Tagging time";
	"TIPL" => V4, Text,   None, "Involved people list";
	"TMCL" => V4, Text,   None, "Musician credits list";
	"TMOO" => V4, Text,   None, "Mood";
	"TPRO" => V4, Text,   None, "Produced notice";
	"TSOA" => V4, Text,   None, "Album sort order";
	"TSOP" => V4, Text,   None, "Performer sort order";
	"TSOT" => V4, Text,   None, "Title sort order";
	"TSST" => V4, Text,   None, "Set subtitle";
};

#[derive(Default)]
struct TrieNode {
	children: Vec<(u8, u16)>,
	spec: Option<u16>,
}

/// A prefix trie over the registered frame IDs
struct IdTrie {
	nodes: Vec<TrieNode>,
}

impl IdTrie {
	fn build() -> Self {
		let mut trie = IdTrie {
			nodes: vec![TrieNode::default()],
		};

		for (spec_idx, spec) in FRAME_SPECS.iter().enumerate() {
			let mut node = 0usize;
			for &byte in spec.id.as_bytes() {
				node = match trie.nodes[node]
					.children
					.iter()
					.find(|(b, _)| *b == byte)
				{
					Some((_, child)) => *child as usize,
					None => {
						let child = trie.nodes.len();
						trie.nodes.push(TrieNode::default());
						trie.nodes[node].children.push((byte, child as u16));
						child
					},
				};
			}

			debug_assert!(trie.nodes[node].spec.is_none(), "duplicate frame ID");
			trie.nodes[node].spec = Some(spec_idx as u16);
		}

		trie
	}

	fn get(&self, id: &[u8]) -> Option<&'static FrameSpec> {
		let mut node = 0usize;
		for &byte in id {
			node = self.nodes[node]
				.children
				.iter()
				.find(|(b, _)| *b == byte)
				.map(|(_, child)| *child as usize)?;
		}

		self.nodes[node]
			.spec
			.map(|idx| &FRAME_SPECS[idx as usize])
	}
}

fn id_trie() -> &'static IdTrie {
	static INSTANCE: OnceLock<IdTrie> = OnceLock::new();
	INSTANCE.get_or_init(IdTrie::build)
}

// Drops at most one trailing space/NUL, left behind by writers that pad 3-character
// IDs out to 4 bytes.
fn trim_padding(id: &[u8]) -> &[u8] {
	match id {
		[head @ .., b' ' | b'\0'] if !head.is_empty() => head,
		_ => id,
	}
}

/// Look up a known frame ID from its raw bytes, without allocating
pub fn lookup(id: &[u8]) -> Option<&'static FrameSpec> {
	id_trie().get(trim_padding(id))
}

fn well_formed(id: &[u8]) -> bool {
	matches!(id.len(), 3 | 4)
		&& id
			.iter()
			.all(|&b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

// The pattern fallback. `TXXX`/`WXXX` (and their v2.2 forms) are reserved for the
// described variants and never reach this, they are registered above.
fn pattern_codec(id: &[u8]) -> Option<FrameCodec> {
	if !well_formed(id) {
		return None;
	}

	match id[0] {
		b'T' => Some(FrameCodec::Text),
		b'W' => Some(FrameCodec::Url),
		_ => None,
	}
}

/// Resolve the payload codec for raw ID bytes
///
/// Falls back to the `T???`/`W???` patterns for IDs not present in the registry.
/// Returns `None` when the bytes are not an acceptable frame ID at all.
pub fn resolve_codec(id: &[u8]) -> Option<FrameCodec> {
	if let Some(spec) = lookup(id) {
		return Some(spec.codec);
	}

	pattern_codec(trim_padding(id))
}

/// Whether raw bytes pass registry validation as a frame ID
///
/// This is the check the tag reader uses to distinguish a frame boundary from
/// garbage while resynchronizing.
pub(crate) fn is_acceptable_id(id: &[u8]) -> bool {
	resolve_codec(id).is_some()
}

/// Find an ID valid in `target`, walking the upgrade/downgrade chain when needed
///
/// Returns `Ok(None)` when the ID is already valid for `target`, and
/// `Ok(Some(substitute))` when a chain mapping exists.
///
/// # Errors
///
/// * No mapping to `target` exists for this ID
pub(crate) fn ensure_id_for_version(
	id: &str,
	target: Id3v2Version,
) -> Result<Option<&'static str>> {
	let bit = version_bit(target);

	let Some(spec) = lookup(id.as_bytes()) else {
		// Pattern IDs are valid wherever their length fits the frame header
		let generic_ok = match target {
			Id3v2Version::V2 => id.len() == 3,
			Id3v2Version::V3 | Id3v2Version::V4 => id.len() == 4,
		};
		if pattern_codec(id.as_bytes()).is_some() && generic_ok {
			return Ok(None);
		}

		return Err(
			Id3v2Error::new(Id3v2ErrorKind::NoVersionMapping(id.to_string())).into(),
		);
	};

	if spec.versions & bit != 0 {
		return Ok(None);
	}

	// Upgrade: follow this ID's own chain forward
	let mut current = spec;
	while let Some(upgraded) = current.upgrade.and_then(|up| lookup(up.as_bytes())) {
		if upgraded.versions & bit != 0 {
			return Ok(Some(upgraded.id));
		}
		current = upgraded;
	}

	// Downgrade: find a legacy ID whose chain reaches this one
	for candidate in FRAME_SPECS {
		if candidate.versions & bit == 0 {
			continue;
		}

		let mut walk = candidate.upgrade;
		while let Some(up) = walk {
			if up == spec.id {
				return Ok(Some(candidate.id));
			}
			walk = lookup(up.as_bytes()).and_then(|s| s.upgrade);
		}
	}

	Err(Id3v2Error::new(Id3v2ErrorKind::NoVersionMapping(id.to_string())).into())
}

#[cfg(test)]
mod tests {
	use super::{FrameCodec, ensure_id_for_version, is_acceptable_id, lookup, resolve_codec};
	use crate::id3::v2::header::Id3v2Version;

	#[test_log::test]
	fn exact_lookup() {
		let spec = lookup(b"TIT2").unwrap();
		assert_eq!(spec.id, "TIT2");
		assert_eq!(spec.codec, FrameCodec::Text);

		assert_eq!(lookup(b"TT2").unwrap().id, "TT2");
		assert!(lookup(b"ZZZZ").is_none());
		assert!(lookup(b"TIT").is_none());
	}

	#[test_log::test]
	fn padded_lookup() {
		// One trailing pad byte is tolerated
		assert_eq!(lookup(b"TT2\0").unwrap().id, "TT2");
		assert_eq!(lookup(b"TT2 ").unwrap().id, "TT2");
		assert!(lookup(b"TT\0\0").is_none());
	}

	#[test_log::test]
	fn pattern_fallback() {
		assert_eq!(resolve_codec(b"TABC"), Some(FrameCodec::Text));
		assert_eq!(resolve_codec(b"W123"), Some(FrameCodec::Url));
		assert_eq!(resolve_codec(b"TXXX"), Some(FrameCodec::UserText));
		assert_eq!(resolve_codec(b"XABC"), None);
		assert_eq!(resolve_codec(b"t???"), None);

		assert!(is_acceptable_id(b"TABC"));
		assert!(!is_acceptable_id(b"\0\0\0\0"));
	}

	macro_rules! chain_tests {
		($($name:ident: $id:literal @ $target:ident => $expected:expr;)+) => {
			$(
				paste::paste! {
					#[test_log::test]
					fn [<chain_ $name>]() {
						assert_eq!(
							ensure_id_for_version($id, Id3v2Version::$target).unwrap(),
							$expected
						);
					}
				}
			)+
		};
	}

	chain_tests! {
		// Upgrades, including two hops (TYE -> TYER -> TDRC)
		v22_to_v24:     "TT2"  @ V4 => Some("TIT2");
		v22_to_v23:     "TYE"  @ V3 => Some("TYER");
		v22_two_hops:   "TYE"  @ V4 => Some("TDRC");
		already_valid:  "TIT2" @ V4 => None;

		// Downgrades, found by walking legacy chains backwards
		v24_to_v23:     "TDRC" @ V3 => Some("TYER");
		v24_people:     "TIPL" @ V3 => Some("IPLS");
		v24_to_v22:     "TIT2" @ V2 => Some("TT2");
	}

	#[test_log::test]
	fn no_mapping_fails() {
		// TSST has no ID3v2.3 equivalent
		assert!(ensure_id_for_version("TSST", Id3v2Version::V3).is_err());
	}
}
