use super::{EngineError, EngineResult};
use crate::types::Question;
use std::collections::BTreeSet;

/// Outcome of resolving a wheel slot after its question was answered
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The slot received fresh content from the overflow pool and stays
    /// spinnable.
    Replaced(Question),
    /// No overflow remains; the slot is permanently out of play.
    Retired,
}

/// Fixed-capacity window over the full question set plus the overflow pool.
///
/// A displayed slot is in one of three states: live (not in `used`),
/// replaced-and-live-again (removed from both sets when it got new content),
/// or permanently retired (in both `used` and `empty`).
#[derive(Debug, Clone)]
pub struct SegmentPool {
    displayed: Vec<Question>,
    overflow: Vec<Question>,
    used: BTreeSet<usize>,
    empty: BTreeSet<usize>,
    next_pool_cursor: usize,
    answered: usize,
    total: usize,
}

impl SegmentPool {
    pub fn new(questions: &[Question], display_cap: usize) -> Self {
        debug_assert!(display_cap > 0, "display cap must be positive");
        let window = display_cap.min(questions.len());

        Self {
            displayed: questions[..window].to_vec(),
            overflow: questions[window..].to_vec(),
            used: BTreeSet::new(),
            empty: BTreeSet::new(),
            next_pool_cursor: 0,
            answered: 0,
            total: questions.len(),
        }
    }

    /// Slots that can currently land under the pointer. Empty iff every slot
    /// has been retired — the authoritative "no more plays" signal.
    pub fn available_slots(&self) -> BTreeSet<usize> {
        (0..self.displayed.len())
            .filter(|slot| !self.used.contains(slot) && !self.empty.contains(slot))
            .collect()
    }

    /// Resolve a slot after its question was shown and answered. Called
    /// exactly once per question lifecycle; resolving a retired slot is a
    /// contract violation.
    pub fn resolve(&mut self, slot: usize) -> EngineResult<Resolution> {
        if slot >= self.displayed.len() {
            debug_assert!(false, "slot {} out of range", slot);
            return Err(EngineError::SlotOutOfRange(slot));
        }
        if self.used.contains(&slot) {
            debug_assert!(false, "slot {} already retired", slot);
            return Err(EngineError::SlotRetired(slot));
        }

        let resolution = if self.next_pool_cursor < self.overflow.len() {
            // Replacement resets the slot's eligibility: it stays out of
            // `used` and spins again with the new question.
            let replacement = self.overflow[self.next_pool_cursor].clone();
            self.next_pool_cursor += 1;
            self.displayed[slot] = replacement.clone();
            Resolution::Replaced(replacement)
        } else {
            self.used.insert(slot);
            self.empty.insert(slot);
            Resolution::Retired
        };

        self.answered += 1;
        Ok(resolution)
    }

    pub fn displayed(&self) -> &[Question] {
        &self.displayed
    }

    pub fn segment_count(&self) -> usize {
        self.displayed.len()
    }

    pub fn is_retired(&self, slot: usize) -> bool {
        self.used.contains(&slot)
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.available_slots().is_empty()
    }
}
