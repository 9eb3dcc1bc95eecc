//! Session state owned by the coordinator task

use serde::Serialize;

use crate::subsystem::TargetId;

/// Monitored targets, the active target and the binding epoch
///
/// Invariant: `active` is only ever set to a monitored target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    targets: Vec<TargetId>,
    active: Option<TargetId>,
    epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    /// Replace the monitored set wholesale
    pub fn set_targets(&mut self, targets: Vec<TargetId>) {
        self.targets = targets;
    }

    pub fn is_monitored(&self, target: TargetId) -> bool {
        self.targets.contains(&target)
    }

    pub fn active(&self) -> Option<TargetId> {
        self.active
    }

    /// Make `target` the active target; refused for unmonitored targets
    pub fn activate(&mut self, target: TargetId) -> bool {
        if !self.is_monitored(target) {
            return false;
        }
        self.active = Some(target);
        true
    }

    /// End the current session, returning the target that was active
    pub fn clear_active(&mut self) -> Option<TargetId> {
        self.active.take()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start a new binding generation
    pub fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}
