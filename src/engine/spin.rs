use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::time::Duration;

/// Full visual revolutions added to every spin so the wheel always travels
/// several turns before settling.
pub const EXTRA_TURNS: u32 = 4;

/// How long the wheel animation runs before the question is revealed. The
/// engine only declares the constant; the session driver owns the timer.
pub const SPIN_DURATION: Duration = Duration::from_millis(3600);

/// Pick the next segment uniformly from the available set. Returns `None`
/// when every slot has been retired.
pub fn choose_segment<R: Rng + ?Sized>(available: &BTreeSet<usize>, rng: &mut R) -> Option<usize> {
    available.iter().copied().choose(rng)
}

/// Compute the cumulative rotation (degrees) that lands `slot`'s angular
/// center under the fixed pointer at angle 0.
///
/// `spin_index` is the 0-based count of spins so far; it keeps successive
/// rotations monotonically increasing so the wheel never snaps backward.
pub fn compute_rotation(slot: usize, segment_count: usize, spin_index: u32) -> f64 {
    debug_assert!(segment_count > 0, "cannot rotate an empty wheel");
    debug_assert!(slot < segment_count, "slot {} outside wheel", slot);

    let segment_angle = 360.0 / segment_count as f64;
    let center_offset = segment_angle * slot as f64 + segment_angle / 2.0;
    let alignment = 360.0 - center_offset;

    f64::from(spin_index + 1) * f64::from(EXTRA_TURNS) * 360.0 + alignment
}

/// Inverse of `compute_rotation`: which slot's center sits under the pointer
/// for a given cumulative rotation.
pub fn landing_slot(rotation: f64, segment_count: usize) -> usize {
    debug_assert!(segment_count > 0);

    let segment_angle = 360.0 / segment_count as f64;
    let center_offset = (360.0 - rotation.rem_euclid(360.0)).rem_euclid(360.0);
    ((center_offset / segment_angle) as usize).min(segment_count - 1)
}
