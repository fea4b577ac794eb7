// Copyright @yucwang 2026

/// What made the accumulated image stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Camera,
    Scene,
    Resize,
}

/// Lazy reset: mutations only mark the state, the clear happens once at the
/// start of the next sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetState {
    #[default]
    Clean,
    /// Holds the first invalidation since the last clear.
    PendingReset(Invalidation),
}

impl ResetState {
    pub fn invalidate(&mut self, reason: Invalidation) {
        if *self == ResetState::Clean {
            *self = ResetState::PendingReset(reason);
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ResetState::PendingReset(_))
    }

    /// Returns the pending invalidation, if any, and goes back to `Clean`.
    pub fn take_pending(&mut self) -> Option<Invalidation> {
        match std::mem::take(self) {
            ResetState::Clean => None,
            ResetState::PendingReset(reason) => Some(reason),
        }
    }
}
