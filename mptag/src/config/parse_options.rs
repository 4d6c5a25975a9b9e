/// The parsing strictness mode
///
/// This can be set with [`ParseOptions::parsing_mode`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Will eagerly error on invalid input
	///
	/// This mode will eagerly error on any non-conformant spec violations, no matter
	/// how minor.
	Strict,
	/// Default mode, less eager to error on recoverably malformed input
	///
	/// This mode will attempt to fill in any holes where possible in otherwise
	/// valid, partially malformed input.
	#[default]
	BestAttempt,
	/// Least eager to error, may produce invalid/partial output
	///
	/// This mode will discard any invalid fields, and will attempt to continue
	/// parsing.
	Relaxed,
}

/// Options to control how mptag parses a file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) read_tags: bool,
	pub(crate) read_mpeg_frames: bool,
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) detect_duplicate_id3v2: bool,
	pub(crate) full_mpeg_scan: bool,
	pub(crate) file_size: Option<u64>,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	read_tags: true,
	/// 	read_mpeg_frames: true,
	/// 	parsing_mode: ParsingMode::BestAttempt,
	/// 	detect_duplicate_id3v2: false,
	/// 	full_mpeg_scan: false,
	/// 	file_size: None,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			read_tags: true,
			read_mpeg_frames: true,
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			detect_duplicate_id3v2: false,
			full_mpeg_scan: false,
			file_size: None,
		}
	}

	/// Whether or not to read the tags
	///
	/// With this disabled, tag regions are still located and recorded in the layout, but
	/// their contents are not decoded.
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::ParseOptions;
	///
	/// // By default, `read_tags` is enabled. Here, we only want the layout.
	/// let parsing_options = ParseOptions::new().read_tags(false);
	/// ```
	pub fn read_tags(&mut self, read_tags: bool) -> Self {
		self.read_tags = read_tags;
		*self
	}

	/// Whether or not to collect MPEG frame headers
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::ParseOptions;
	///
	/// // I only care about the tags
	/// let parsing_options = ParseOptions::new().read_mpeg_frames(false);
	/// ```
	pub fn read_mpeg_frames(&mut self, read_mpeg_frames: bool) -> Self {
		self.read_mpeg_frames = read_mpeg_frames;
		*self
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::{ParseOptions, ParsingMode};
	///
	/// // By default, `parsing_mode` is ParsingMode::BestAttempt. Here, we need absolute correctness.
	/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	/// ```
	pub fn parsing_mode(&mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		*self
	}

	/// Whether to keep looking for ID3v2 tags after the first one
	///
	/// Some encoders will write a second ID3v2 tag directly after the first. With this
	/// enabled, the frames of any extra tags are merged into the first.
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new().detect_duplicate_id3v2(true);
	/// ```
	pub fn detect_duplicate_id3v2(&mut self, detect_duplicate_id3v2: bool) -> Self {
		self.detect_duplicate_id3v2 = detect_duplicate_id3v2;
		*self
	}

	/// Whether to collect MPEG frame headers for the entire audio stream
	///
	/// By default, collection stops once enough candidates exist to resolve the true
	/// frame chain. Enabling this scans to the end of the file.
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new().full_mpeg_scan(true);
	/// ```
	pub fn full_mpeg_scan(&mut self, full_mpeg_scan: bool) -> Self {
		self.full_mpeg_scan = full_mpeg_scan;
		*self
	}

	/// The total size of the input, if known up front
	///
	/// When provided, the scanner can stop early instead of draining the input just to
	/// establish the file size, and trailing structures can be validated as they are found.
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new().file_size(Some(40_960));
	/// ```
	pub fn file_size(&mut self, file_size: Option<u64>) -> Self {
		self.file_size = file_size;
		*self
	}
}
