//! Buffered pull access to a byte source
//!
//! [`ChunkedStream`] is the single reader the scanner works through. It buffers the
//! source in chunks, keeps a running absolute offset, and supports pushing bytes
//! back to the front for "peek, fail to parse, retry from elsewhere" flows.

use crate::error::Result;

use std::collections::VecDeque;
use std::io::Read;

const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// A pull-based, buffered reader over any byte source
///
/// End-of-stream is sticky: once the source is exhausted, [`ChunkedStream::read`]
/// returns whatever remains buffered, including nothing at all.
pub struct ChunkedStream<R: Read> {
	reader: R,
	chunks: VecDeque<Vec<u8>>,
	buffered: usize,
	offset: u64,
	chunk_size: usize,
	eof: bool,
}

impl<R: Read> ChunkedStream<R> {
	/// Create a new `ChunkedStream` with the default chunk size
	pub fn new(reader: R) -> Self {
		Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
	}

	/// Create a new `ChunkedStream`, pulling `chunk_size` bytes from the source at a time
	pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
		Self {
			reader,
			chunks: VecDeque::new(),
			buffered: 0,
			offset: 0,
			chunk_size: chunk_size.max(1),
			eof: false,
		}
	}

	/// The absolute offset of the next byte [`ChunkedStream::read`] would return
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// Whether the source has ended *and* no buffered bytes remain
	pub fn is_exhausted(&self) -> bool {
		self.eof && self.buffered == 0
	}

	/// Whether the underlying source has ended
	pub fn source_ended(&self) -> bool {
		self.eof
	}

	// Pull one chunk from the source, returning the number of bytes gained
	fn fill(&mut self) -> Result<usize> {
		if self.eof {
			return Ok(0);
		}

		let mut chunk = vec![0; self.chunk_size];
		let mut filled = 0;

		// A reader is allowed to return short counts, keep going until the chunk is
		// full or the source ends
		while filled < chunk.len() {
			match self.reader.read(&mut chunk[filled..]) {
				Ok(0) => {
					self.eof = true;
					break;
				},
				Ok(n) => filled += n,
				Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}

		chunk.truncate(filled);
		if filled > 0 {
			self.buffered += filled;
			self.chunks.push_back(chunk);
		}

		Ok(filled)
	}

	/// Read up to `count` bytes, advancing the running offset
	///
	/// This pulls from the source until at least `count` bytes are buffered or the
	/// source ends. The result is only short at end-of-source.
	pub fn read(&mut self, count: usize) -> Result<Vec<u8>> {
		while self.buffered < count && !self.eof {
			self.fill()?;
		}

		let take = count.min(self.buffered);
		let mut out = Vec::with_capacity(take);

		while out.len() < take {
			let mut front = match self.chunks.pop_front() {
				Some(front) => front,
				None => break,
			};

			let needed = take - out.len();
			if front.len() <= needed {
				self.buffered -= front.len();
				out.append(&mut front);
			} else {
				out.extend_from_slice(&front[..needed]);
				front.drain(..needed);
				self.buffered -= needed;
				self.chunks.push_front(front);
			}
		}

		self.offset += out.len() as u64;
		Ok(out)
	}

	/// Push bytes back to the front of the stream
	///
	/// The running offset moves back by the same amount, so a subsequent
	/// [`ChunkedStream::read`] returns these bytes first at their original offsets.
	pub fn unshift(&mut self, bytes: Vec<u8>) {
		if bytes.is_empty() {
			return;
		}

		self.offset = self.offset.saturating_sub(bytes.len() as u64);
		self.buffered += bytes.len();
		self.chunks.push_front(bytes);
	}

	/// Discard up to `count` bytes without materializing them, returning how many
	/// were actually discarded
	pub fn skip(&mut self, count: usize) -> Result<usize> {
		let mut skipped = 0;

		while skipped < count {
			if self.buffered == 0 {
				if self.eof || self.fill()? == 0 {
					break;
				}
			}

			let mut front = match self.chunks.pop_front() {
				Some(front) => front,
				None => continue,
			};

			let needed = count - skipped;
			if front.len() <= needed {
				skipped += front.len();
				self.buffered -= front.len();
			} else {
				front.drain(..needed);
				skipped += needed;
				self.buffered -= needed;
				self.chunks.push_front(front);
			}
		}

		self.offset += skipped as u64;
		Ok(skipped)
	}

	/// Search forward for `marker` without consuming anything
	///
	/// Buffered chunks are concatenated and searched; on a miss, more data is pulled
	/// and the search repeats. Returns the absolute offset of the first occurrence,
	/// or `None` once the source ends without a match.
	pub fn scan(&mut self, marker: &[u8]) -> Result<Option<u64>> {
		if marker.is_empty() {
			return Ok(Some(self.offset));
		}

		loop {
			let flat: Vec<u8> = self
				.chunks
				.iter()
				.flat_map(|c| c.iter().copied())
				.collect();

			if flat.len() >= marker.len() {
				if let Some(idx) = flat
					.windows(marker.len())
					.position(|window| window == marker)
				{
					return Ok(Some(self.offset + idx as u64));
				}
			}

			if self.eof {
				return Ok(None);
			}

			self.fill()?;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::ChunkedStream;

	use std::io::Cursor;

	#[test_log::test]
	fn read_spans_chunks() {
		let data: Vec<u8> = (0..=255).collect();
		let mut stream = ChunkedStream::with_chunk_size(Cursor::new(data.clone()), 16);

		let first = stream.read(100).unwrap();
		assert_eq!(first, data[..100]);
		assert_eq!(stream.offset(), 100);

		// Short read only at end-of-source
		let rest = stream.read(1000).unwrap();
		assert_eq!(rest, data[100..]);
		assert!(stream.is_exhausted());

		// Sticky end-of-stream
		assert!(stream.read(10).unwrap().is_empty());
	}

	#[test_log::test]
	fn unshift_rewinds_offset() {
		let mut stream = ChunkedStream::with_chunk_size(Cursor::new(vec![1, 2, 3, 4, 5]), 2);

		let bytes = stream.read(4).unwrap();
		assert_eq!(stream.offset(), 4);

		stream.unshift(bytes[1..].to_vec());
		assert_eq!(stream.offset(), 1);

		assert_eq!(stream.read(4).unwrap(), [2, 3, 4, 5]);
	}

	#[test_log::test]
	fn skip_discards() {
		let data: Vec<u8> = (0..100).collect();
		let mut stream = ChunkedStream::with_chunk_size(Cursor::new(data), 8);

		assert_eq!(stream.skip(50).unwrap(), 50);
		assert_eq!(stream.read(1).unwrap(), [50]);

		// Skipping past the end reports the short count
		assert_eq!(stream.skip(1000).unwrap(), 49);
		assert!(stream.is_exhausted());
	}

	#[test_log::test]
	fn scan_crosses_chunk_boundaries() {
		let mut data = vec![0u8; 100];
		data.extend_from_slice(b"TAG");
		data.extend_from_slice(&[0u8; 25]);

		let mut stream = ChunkedStream::with_chunk_size(Cursor::new(data), 7);
		assert_eq!(stream.scan(b"TAG").unwrap(), Some(100));

		// Nothing was consumed
		assert_eq!(stream.offset(), 0);
		assert_eq!(stream.skip(100).unwrap(), 100);
		assert_eq!(stream.read(3).unwrap(), b"TAG");

		assert_eq!(stream.scan(b"TAG").unwrap(), None);
	}
}
