/// Options to control how mptag writes to a file
///
/// This is best used as an application global config that gets set once.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) preferred_padding: Option<u32>,
	pub(crate) use_id3v23: bool,
	pub(crate) keep_backup: bool,
}

impl WriteOptions {
	/// Default preferred padding size in bytes
	pub const DEFAULT_PREFERRED_PADDING: u32 = 1024;

	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preferred_padding: Some(Self::DEFAULT_PREFERRED_PADDING),
			use_id3v23: false,
			keep_backup: false,
		}
	}

	/// Set the preferred padding size in bytes
	///
	/// NOTES:
	///
	/// * The actual padding size may be different from this value, depending on tag size limitations
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::WriteOptions;
	///
	/// // I really don't want my files rewritten, so I'll double the padding size!
	/// let options = WriteOptions::new().preferred_padding(2048);
	///
	/// // ...Or I don't want padding under any circumstances!
	/// let options = WriteOptions::new().preferred_padding(0);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		match preferred_padding {
			0 => self.preferred_padding = None,
			_ => self.preferred_padding = Some(preferred_padding),
		}
		self
	}

	/// Whether or not to use ID3v2.3 when writing
	///
	/// By default, tags are written as ID3v2.4. Frames whose IDs only exist in the other
	/// version are substituted through the frame registry where an equivalent exists.
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::WriteOptions;
	///
	/// // I need to support older software!
	/// let options = WriteOptions::new().use_id3v23(true);
	/// ```
	pub fn use_id3v23(mut self, use_id3v23: bool) -> Self {
		self.use_id3v23 = use_id3v23;
		self
	}

	/// Whether to keep the `.bak` copy of the original file after a successful rewrite
	///
	/// The backup is only removed after the replacement file is fully in place.
	///
	/// # Examples
	///
	/// ```rust
	/// use mptag::config::WriteOptions;
	///
	/// let options = WriteOptions::new().keep_backup(true);
	/// ```
	pub fn keep_backup(mut self, keep_backup: bool) -> Self {
		self.keep_backup = keep_backup;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	/// 	preferred_padding: Some(1024),
	/// 	use_id3v23: false,
	/// 	keep_backup: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
