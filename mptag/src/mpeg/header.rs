use super::constants::{BITRATES, PADDING_SIZES, SAMPLE_RATES, SAMPLES, SIDE_INFORMATION_SIZES};
use crate::util::cursor::ByteCursor;

/// The version and layer index bits of the second header byte, used when deciding
/// whether two headers could belong to the same stream.
pub(crate) const VERSION_LAYER_MASK: u16 = 0x001E;

pub(crate) fn verify_frame_sync(frame_sync: [u8; 2]) -> bool {
	frame_sync[0] == 0xFF && frame_sync[1] >> 5 == 0b111
}

/// MPEG Audio version
#[derive(Default, PartialEq, Eq, Copy, Clone, Debug)]
#[allow(missing_docs)]
pub enum MpegVersion {
	#[default]
	V1,
	V2,
	V2_5,
}

/// MPEG layer
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Layer {
	Layer1 = 1,
	Layer2 = 2,
	#[default]
	Layer3 = 3,
}

/// Channel mode
#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum ChannelMode {
	#[default]
	Stereo = 0,
	JointStereo = 1,
	/// Two independent mono channels
	DualChannel = 2,
	SingleChannel = 3,
}

/// A rarely-used decoder hint that the file must be de-emphasized
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[allow(missing_docs, non_camel_case_types)]
pub enum Emphasis {
	/// 50/15 ms
	MS5015,
	Reserved,
	/// CCIT J.17
	CCIT_J17,
}

/// An MPEG frame header in its canonical form
///
/// This is the source of truth for a frame: where it sits, how long it is, and the
/// 32 stored header bits split into two 16-bit words. The decoded view is derived
/// through [`RawMpegHeader::decode`] and never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawMpegHeader {
	/// Absolute byte offset of the frame sync
	pub offset: u64,
	/// The full frame length in bytes, including the header
	pub size: u32,
	/// The first 16 header bits (sync, version, layer, protection)
	pub front: u16,
	/// The last 16 header bits (bitrate, sample rate, padding, mode, emphasis)
	pub back: u16,
}

impl RawMpegHeader {
	/// Validate 4 header bytes at `offset`
	///
	/// Returns `None` for anything with reserved version/layer/bitrate/sample-rate
	/// bits, or without the sync pattern.
	pub fn parse(offset: u64, bytes: [u8; 4]) -> Option<Self> {
		if !verify_frame_sync([bytes[0], bytes[1]]) {
			return None;
		}

		let data = u32::from_be_bytes(bytes);
		let decoded = MpegHeader::read(data)?;

		Some(Self {
			offset,
			size: decoded.len,
			front: (data >> 16) as u16,
			back: data as u16,
		})
	}

	/// The stored 32 header bits
	pub fn data(&self) -> u32 {
		(u32::from(self.front) << 16) | u32::from(self.back)
	}

	/// Reproduce the 4 stored header bytes
	pub fn encode(&self) -> [u8; 4] {
		self.data().to_be_bytes()
	}

	/// Expand into the decoded view
	pub fn decode(&self) -> MpegHeader {
		// The raw form only exists for bit patterns `MpegHeader::read` accepted
		MpegHeader::read(self.data()).expect("raw header holds validated bits")
	}

	/// The offset one past the end of this frame, where the next frame of the same
	/// stream starts
	pub fn end_offset(&self) -> u64 {
		self.offset + u64::from(self.size)
	}

	/// Whether `other` could belong to the same stream (version and layer bits agree)
	pub(crate) fn cmp_stream(&self, other: &Self) -> bool {
		self.front & VERSION_LAYER_MASK == other.front & VERSION_LAYER_MASK
	}
}

/// The decoded view of an MPEG frame header
#[derive(Copy, Clone, Debug)]
#[allow(missing_docs)]
pub struct MpegHeader {
	pub sample_rate: u32,
	pub len: u32,
	pub data_start: u32,
	pub samples: u16,
	pub bitrate: u32,
	pub version: MpegVersion,
	pub layer: Layer,
	pub channel_mode: ChannelMode,
	pub mode_extension: Option<u8>,
	pub copyright: bool,
	pub original: bool,
	pub emphasis: Option<Emphasis>,
}

impl MpegHeader {
	pub(crate) fn read(data: u32) -> Option<Self> {
		let version = match (data >> 19) & 0b11 {
			0b00 => MpegVersion::V2_5,
			0b10 => MpegVersion::V2,
			0b11 => MpegVersion::V1,
			_ => return None,
		};

		let version_index = if version == MpegVersion::V1 { 0 } else { 1 };

		let layer = match (data >> 17) & 0b11 {
			0b01 => Layer::Layer3,
			0b10 => Layer::Layer2,
			0b11 => Layer::Layer1,
			_ => {
				log::debug!("MPEG: Frame header uses a reserved layer");
				return None;
			},
		};

		let layer_index = (layer as usize).saturating_sub(1);

		let bitrate_index = (data >> 12) & 0xF;
		let bitrate = BITRATES[version_index][layer_index][bitrate_index as usize];
		if bitrate == 0 {
			return None;
		}

		let sample_rate_index = (data >> 10) & 0b11;
		let sample_rate = match sample_rate_index {
			// This is invalid
			0b11 => return None,
			_ => SAMPLE_RATES[version as usize][sample_rate_index as usize],
		};

		let mut padding = 0;
		if ((data >> 9) & 1) == 1 {
			padding = u32::from(PADDING_SIZES[layer_index]);
		}

		let channel_mode = match (data >> 6) & 0b11 {
			0b00 => ChannelMode::Stereo,
			0b01 => ChannelMode::JointStereo,
			0b10 => ChannelMode::DualChannel,
			0b11 => ChannelMode::SingleChannel,
			_ => unreachable!(),
		};

		let mode_extension = match channel_mode {
			ChannelMode::JointStereo => Some(((data >> 4) & 3) as u8),
			_ => None,
		};

		let emphasis = match data & 0b11 {
			0b00 => None,
			0b01 => Some(Emphasis::MS5015),
			0b10 => Some(Emphasis::Reserved),
			0b11 => Some(Emphasis::CCIT_J17),
			_ => unreachable!(),
		};

		let samples = SAMPLES[layer_index][version_index];
		let len = (u32::from(samples) * bitrate * 125 / sample_rate) + padding;

		Some(MpegHeader {
			sample_rate,
			len,
			data_start: SIDE_INFORMATION_SIZES[version_index][channel_mode as usize] + 4,
			samples,
			bitrate,
			version,
			layer,
			channel_mode,
			mode_extension,
			copyright: ((data >> 3) & 1) == 1,
			original: ((data >> 2) & 1) == 1,
			emphasis,
		})
	}
}

/// The kind of stream head frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum VbrHeaderType {
	Xing,
	Info,
	Vbri,
}

/// Xing/Info/VBRI side information, declaring totals for the whole stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VbrHeader {
	/// Which marker introduced this header
	pub ty: VbrHeaderType,
	/// The total number of frames in the stream
	pub frames: u32,
	/// The total number of audio bytes in the stream
	pub size: u32,
	/// The 100-byte seek table, when stored (Xing only)
	pub toc: Option<[u8; 100]>,
	/// The encoder quality indicator, when stored
	pub quality: Option<u32>,
}

impl VbrHeader {
	/// Parse the side info at the start of `bytes`, which must begin with the marker
	fn read(bytes: &[u8]) -> Option<Self> {
		let mut cursor = ByteCursor::new(bytes);
		let marker = cursor.read_exact(4).ok()?;

		match marker {
			b"Xing" | b"Info" => {
				let ty = if marker == b"Xing" {
					VbrHeaderType::Xing
				} else {
					VbrHeaderType::Info
				};

				let flags = cursor.read_u32().ok()?;
				if flags & 0x03 != 0x03 {
					log::debug!(
						"MPEG: Xing header doesn't have required flags set (0x0001 and 0x0002)"
					);
					return None;
				}

				let frames = cursor.read_u32().ok()?;
				let size = cursor.read_u32().ok()?;

				let mut toc = None;
				if flags & 0x04 == 0x04 {
					let table = cursor.read_exact(100).ok()?;
					let mut owned = [0u8; 100];
					owned.copy_from_slice(table);
					toc = Some(owned);
				}

				let mut quality = None;
				if flags & 0x08 == 0x08 {
					quality = cursor.read_u32().ok();
				}

				Some(Self {
					ty,
					frames,
					size,
					toc,
					quality,
				})
			},
			b"VBRI" => {
				// Version ID (2), delay (2)
				cursor.skip(4).ok()?;
				let quality = cursor.read_u16().ok()?;
				let size = cursor.read_u32().ok()?;
				let frames = cursor.read_u32().ok()?;

				Some(Self {
					ty: VbrHeaderType::Vbri,
					frames,
					size,
					toc: None,
					quality: Some(u32::from(quality)),
				})
			},
			_ => None,
		}
	}

	/// Whether the declared totals are usable
	pub fn is_valid(&self) -> bool {
		self.frames > 0 && self.size > 0
	}
}

/// How many bytes past a frame header the side-info markers are searched for.
///
/// A Xing header sits after the side information (at most 36 bytes in), VBRI at a
/// fixed 32.
const VBR_SEARCH_WINDOW: usize = 40;

/// Scan the bytes following a frame header for Xing/Info/VBRI side info
///
/// `bytes` starts immediately after the 4 header bytes.
pub(crate) fn find_vbr_header(bytes: &[u8]) -> Option<VbrHeader> {
	let window = bytes.len().min(VBR_SEARCH_WINDOW);

	for start in 0..window {
		match bytes.get(start..start + 4)? {
			b"Xing" | b"Info" | b"VBRI" => return VbrHeader::read(&bytes[start..]),
			_ => {},
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::{ChannelMode, Layer, MpegVersion, RawMpegHeader, VbrHeaderType, find_vbr_header};

	#[test_log::test]
	fn decode_full_header() {
		// MPEG-1 Layer III, 128 kbps, 44100 Hz, no padding, joint stereo
		let raw = RawMpegHeader::parse(0, [0xFF, 0xFB, 0x90, 0x40]).unwrap();

		let header = raw.decode();
		assert_eq!(header.version, MpegVersion::V1);
		assert_eq!(header.layer, Layer::Layer3);
		assert_eq!(header.bitrate, 128);
		assert_eq!(header.sample_rate, 44100);
		assert_eq!(header.channel_mode, ChannelMode::JointStereo);
		assert_eq!(header.samples, 1152);

		// 1152 * 128 * 125 / 44100
		assert_eq!(header.len, 417);
		assert_eq!(raw.size, 417);
		assert_eq!(raw.end_offset(), 417);
	}

	#[test_log::test]
	fn padding_adds_one_slot() {
		let unpadded = RawMpegHeader::parse(0, [0xFF, 0xFB, 0x90, 0x00]).unwrap();
		let padded = RawMpegHeader::parse(0, [0xFF, 0xFB, 0x92, 0x00]).unwrap();
		assert_eq!(padded.size, unpadded.size + 1);
	}

	#[test_log::test]
	fn reserved_bits_are_invalid() {
		// No sync
		assert!(RawMpegHeader::parse(0, [0xFB, 0x90, 0x00, 0x00]).is_none());
		// Reserved version (01)
		assert!(RawMpegHeader::parse(0, [0xFF, 0xEB, 0x90, 0x00]).is_none());
		// Reserved layer (00)
		assert!(RawMpegHeader::parse(0, [0xFF, 0xF9, 0x90, 0x00]).is_none());
		// Free bitrate (0000)
		assert!(RawMpegHeader::parse(0, [0xFF, 0xFB, 0x00, 0x00]).is_none());
		// Bad bitrate (1111)
		assert!(RawMpegHeader::parse(0, [0xFF, 0xFB, 0xF0, 0x00]).is_none());
		// Reserved sample rate (11)
		assert!(RawMpegHeader::parse(0, [0xFF, 0xFB, 0x9C, 0x00]).is_none());
	}

	#[test_log::test]
	fn encode_reproduces_stored_bits() {
		let bytes = [0xFF, 0xFB, 0x90, 0x40];
		let raw = RawMpegHeader::parse(12345, bytes).unwrap();
		assert_eq!(raw.encode(), bytes);
		assert_eq!(raw.offset, 12345);
	}

	#[test_log::test]
	fn xing_header() {
		let mut bytes = vec![0u8; 32];
		bytes.extend_from_slice(b"Xing");
		bytes.extend_from_slice(&3u32.to_be_bytes());
		bytes.extend_from_slice(&1000u32.to_be_bytes());
		bytes.extend_from_slice(&4_000_000u32.to_be_bytes());

		let vbr = find_vbr_header(&bytes).unwrap();
		assert_eq!(vbr.ty, VbrHeaderType::Xing);
		assert_eq!(vbr.frames, 1000);
		assert_eq!(vbr.size, 4_000_000);
		assert!(vbr.toc.is_none());
		assert!(vbr.is_valid());
	}

	#[test_log::test]
	fn vbri_header() {
		let mut bytes = vec![0u8; 32];
		bytes.extend_from_slice(b"VBRI");
		bytes.extend_from_slice(&[0, 1, 0, 0]); // version, delay
		bytes.extend_from_slice(&[0, 80]); // quality
		bytes.extend_from_slice(&4_000_000u32.to_be_bytes());
		bytes.extend_from_slice(&1000u32.to_be_bytes());

		let vbr = find_vbr_header(&bytes).unwrap();
		assert_eq!(vbr.ty, VbrHeaderType::Vbri);
		assert_eq!(vbr.frames, 1000);
		assert_eq!(vbr.size, 4_000_000);
		assert_eq!(vbr.quality, Some(80));
	}

	#[test_log::test]
	fn no_marker() {
		assert!(find_vbr_header(&[0u8; 64]).is_none());
	}
}
