//! Picking the true audio stream out of sync-pattern candidates
//!
//! An 11-bit sync pattern shows up by chance in ordinary data, so a raw scan over a
//! file yields far more candidate headers than real frames. No checksum exists to
//! validate a single candidate, but real frames have a property junk doesn't: each
//! frame's declared size lands exactly on the next frame's sync. Chaining candidates
//! end-to-start and keeping the longest chain separates the stream from the noise
//! without O(n²) content validation.

use super::header::RawMpegHeader;

/// A chain is grown until it has this many links; longer proof isn't needed.
const MAX_CHAIN_LENGTH: usize = 20;

const INITIAL_CANDIDATE_WINDOW: usize = 50;
const CANDIDATE_WINDOW_STEP: usize = 50;
const MAX_CANDIDATE_WINDOW: usize = 500;

/// The gap tolerance of [`filter_best_chain`]. Covers stray padding or tag remnants
/// between frames without re-admitting random matches.
const MAX_SYNC_GAP: u64 = 8;

/// Resolve the true frame sequence from raw scan candidates
///
/// Chains are built over a window of the first 50 candidates, growing by 50 up to
/// 500 (or exhaustion) while nothing chains at all. The start of the winning chain
/// then seeds [`filter_best_chain`] over the full candidate list.
///
/// With fewer than two candidates there is nothing to disambiguate, and the input
/// is returned as-is.
pub(crate) fn resolve_chain(candidates: &[RawMpegHeader]) -> Vec<RawMpegHeader> {
	if candidates.len() < 2 {
		return candidates.to_vec();
	}

	let mut window = INITIAL_CANDIDATE_WINDOW;

	loop {
		let in_window = &candidates[..window.min(candidates.len())];
		let best = best_chain_start(in_window);

		if let Some((start, links)) = best {
			if links >= 2 || window >= MAX_CANDIDATE_WINDOW || window >= candidates.len() {
				log::debug!(
					"MPEG: Accepting a chain of {} frames out of {} candidates",
					links,
					candidates.len()
				);
				return filter_best_chain(candidates, in_window[start].offset);
			}
		}

		if window >= MAX_CANDIDATE_WINDOW || window >= candidates.len() {
			// Nothing chains at all. Best effort: keep the first candidate.
			log::debug!("MPEG: No candidate chains, keeping the first");
			return filter_best_chain(candidates, candidates[0].offset);
		}

		window += CANDIDATE_WINDOW_STEP;
	}
}

// Builds a chain from every unclaimed candidate and returns the start index and
// link count of the longest one. Ties resolve to the first found, which makes the
// result scan-order dependent; that order dependence is part of the contract.
fn best_chain_start(candidates: &[RawMpegHeader]) -> Option<(usize, usize)> {
	let mut claimed = vec![false; candidates.len()];
	let mut best: Option<(usize, usize)> = None;

	for start in 0..candidates.len() {
		if claimed[start] {
			continue;
		}

		let mut links = 1;
		let mut current = start;
		claimed[start] = true;

		while links < MAX_CHAIN_LENGTH {
			let want = candidates[current].end_offset();
			let Some(next) = candidates
				.iter()
				.position(|header| header.offset == want)
			else {
				break;
			};

			// A candidate claimed by an earlier chain can't start a better one,
			// but it can still extend this one
			claimed[next] = true;
			current = next;
			links += 1;
		}

		match best {
			Some((_, best_links)) if best_links >= links => {},
			_ => best = Some((start, links)),
		}
	}

	best
}

/// Walk the full candidate list from `start_offset`, reconstructing the stream
///
/// Follows the same end-offset rule chains are built with, additionally accepting a
/// small positive gap when the version/layer bits still agree. This recovers frames
/// past gaps the windowed chain search never saw.
pub(crate) fn filter_best_chain(
	candidates: &[RawMpegHeader],
	start_offset: u64,
) -> Vec<RawMpegHeader> {
	let Some(mut position) = candidates
		.iter()
		.position(|header| header.offset == start_offset)
	else {
		return Vec::new();
	};

	let mut chain = vec![candidates[position]];

	loop {
		let current = candidates[position];
		let want = current.end_offset();

		// An exact continuation wins; otherwise tolerate a small gap if the
		// candidate still looks like the same stream
		let next = candidates
			.iter()
			.position(|header| header.offset == want)
			.or_else(|| {
				candidates.iter().position(|header| {
					header.offset > want
						&& header.offset <= want + MAX_SYNC_GAP
						&& current.cmp_stream(header)
				})
			});

		let Some(next) = next else { break };

		chain.push(candidates[next]);
		position = next;
	}

	chain
}
