//! Shuffle selection
//!
//! Shuffle never reorders the queue. Each skip picks a random position,
//! uniformly, from every queue position except the current one.

use rand::Rng;

/// Pick a random index in `0..len`, skipping `exclude`
///
/// When excluding leaves nothing to choose from (a single-entry queue
/// holding the current track) the excluded index itself is returned, so a
/// lone track simply replays. Returns `None` only for an empty queue.
pub fn pick_excluding<R: Rng + ?Sized>(len: usize, exclude: Option<usize>, rng: &mut R) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let exclude = exclude.filter(|&i| i < len);
    let candidates = len - usize::from(exclude.is_some());
    if candidates == 0 {
        return exclude;
    }

    let pick = rng.gen_range(0..candidates);
    Some(match exclude {
        Some(skip) if pick >= skip => pick + 1,
        _ => pick,
    })
}
