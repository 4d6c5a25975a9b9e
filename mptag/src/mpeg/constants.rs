// Bitrates in kbps, keyed by [version index][layer index][bitrate index].
// Version index 0 is MPEG-1, 1 covers MPEG-2 and 2.5. Index 0 ("free") and 15 are
// reserved and mark a header invalid.
#[rustfmt::skip]
pub(super) const BITRATES: [[[u32; 16]; 3]; 2] = [
	[
		[0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0],
		[0, 32, 48, 56,  64,  80,  96, 112, 128, 160, 192, 224, 256, 320, 384, 0],
		[0, 32, 40, 48,  56,  64,  80,  96, 112, 128, 160, 192, 224, 256, 320, 0],
	],
	[
		[0, 32, 48, 56,  64,  80,  96, 112, 128, 144, 160, 176, 192, 224, 256, 0],
		[0,  8, 16, 24,  32,  40,  48,  56,  64,  80,  96, 112, 128, 144, 160, 0],
		[0,  8, 16, 24,  32,  40,  48,  56,  64,  80,  96, 112, 128, 144, 160, 0],
	],
];

// Sample rates in Hz, keyed by [version][sample rate index]. Index 3 is reserved.
pub(super) const SAMPLE_RATES: [[u32; 3]; 3] = [
	[44100, 48000, 32000], // MPEG-1
	[22050, 24000, 16000], // MPEG-2
	[11025, 12000, 8000],  // MPEG-2.5
];

// Samples per frame, keyed by [layer index][version index]
pub(super) const SAMPLES: [[u16; 2]; 3] = [
	[384, 384],   // Layer I
	[1152, 1152], // Layer II
	[1152, 576],  // Layer III
];

// One slot of padding, keyed by layer index. Layer I slots are 4 bytes wide.
pub(super) const PADDING_SIZES: [u8; 3] = [4, 1, 1];

// Side information size, keyed by [version index][channel mode]
pub(super) const SIDE_INFORMATION_SIZES: [[u32; 4]; 2] = [
	[32, 32, 32, 17], // MPEG-1
	[17, 17, 17, 9],  // MPEG-2/2.5
];
