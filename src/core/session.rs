use crate::core::filters::build_queue;
use crate::models::{MatchFilters, Profile};

/// Stateful consumption of a filtered candidate queue.
///
/// The queue is derived once from the approved candidate set and the
/// session's filters; the cursor only ever moves forward. Running off the
/// end is the normal terminal state ("no more candidates"), not an error;
/// it takes a filter change or new data to exit it.
#[derive(Debug, Clone)]
pub struct SwipeSession {
    user_id: String,
    filters: MatchFilters,
    queue: Vec<Profile>,
    cursor: usize,
}

impl SwipeSession {
    /// Start a session for `viewer` with the given filters over the approved
    /// candidate set.
    pub fn new(viewer: &Profile, candidates: &[Profile], filters: MatchFilters) -> Self {
        let queue = build_queue(viewer, candidates, &filters);
        Self {
            user_id: viewer.user_id.clone(),
            filters,
            queue,
            cursor: 0,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn filters(&self) -> &MatchFilters {
        &self.filters
    }

    /// The candidate currently presented, or None once exhausted.
    pub fn current(&self) -> Option<&Profile> {
        self.queue.get(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }

    pub fn exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    /// Skip the current candidate. No persistence.
    pub fn pass(&mut self) {
        self.advance();
    }

    /// Move the cursor forward by one; saturates at the queue end.
    pub fn advance(&mut self) {
        if self.cursor < self.queue.len() {
            self.cursor += 1;
        }
    }

    /// Replace filters, rebuild the queue from the given candidate set, and
    /// reset the cursor to the start.
    pub fn set_filters(
        &mut self,
        viewer: &Profile,
        candidates: &[Profile],
        filters: MatchFilters,
    ) {
        self.queue = build_queue(viewer, candidates, &filters);
        self.filters = filters;
        self.cursor = 0;
    }
}
