//! Confirmation gate for destructive actions.
//!
//! One slot per user: a guarded action must be requested twice (or confirmed
//! with the explicit phrase) inside the TTL window before it executes. The
//! state is a tagged variant per user with a pure `transition` function;
//! expiry is checked lazily against the timestamp stored in the slot, so
//! there are no timers and no stale-timer races.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Destructive actions that go through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetScope {
    Balance,
    Savings,
    Emergency,
    Installments,
    Everything,
}

/// How the user is poking the gate: repeating the guarded command, or sending
/// the explicit confirmation phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRequest {
    Arm(ResetScope),
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Slot armed (or re-armed); caller should warn and wait.
    Pending,
    /// Second matching request inside the window; caller executes now.
    Executed,
    /// No live pending entry to confirm.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    Pending {
        action: ResetScope,
        requested_at: DateTime<Utc>,
    },
}

/// Pure transition: expired slots collapse to Idle before the request is
/// applied.
pub fn transition(
    state: GateState,
    request: GateRequest,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> (GateState, GateStatus) {
    let state = match state {
        GateState::Pending { requested_at, .. } if now - requested_at > ttl => GateState::Idle,
        live => live,
    };

    match (state, request) {
        (GateState::Idle, GateRequest::Arm(action)) => {
            (GateState::Pending { action, requested_at: now }, GateStatus::Pending)
        }
        (GateState::Pending { action, .. }, GateRequest::Arm(requested)) if action == requested => {
            (GateState::Idle, GateStatus::Executed)
        }
        // Single slot per user: a different guarded action overwrites the
        // pending one and restarts the window.
        (GateState::Pending { .. }, GateRequest::Arm(requested)) => (
            GateState::Pending { action: requested, requested_at: now },
            GateStatus::Pending,
        ),
        (GateState::Idle, GateRequest::Confirm) => (GateState::Idle, GateStatus::Rejected),
        // The explicit phrase only ever confirms a pending full reset.
        (GateState::Pending { action: ResetScope::Everything, .. }, GateRequest::Confirm) => {
            (GateState::Idle, GateStatus::Executed)
        }
        (pending @ GateState::Pending { .. }, GateRequest::Confirm) => {
            (pending, GateStatus::Rejected)
        }
    }
}

/// Session store: per-user gate slots, expired lazily on access.
#[derive(Debug)]
pub struct ConfirmationGate {
    ttl: TimeDelta,
    slots: HashMap<String, GateState>,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(120))
    }
}

impl ConfirmationGate {
    pub fn new(ttl: TimeDelta) -> Self {
        Self { ttl, slots: HashMap::new() }
    }

    /// Run one request through the user's slot and return the outcome.
    pub fn check(&mut self, user_id: &str, request: GateRequest, now: DateTime<Utc>) -> GateStatus {
        let state = self.slots.get(user_id).copied().unwrap_or_default();
        let (next, status) = transition(state, request, self.ttl, now);

        match next {
            GateState::Idle => {
                self.slots.remove(user_id);
            }
            pending => {
                self.slots.insert(user_id.to_string(), pending);
            }
        }

        status
    }

    /// The action currently pending for a user, if its window is still open.
    pub fn pending_action(&self, user_id: &str, now: DateTime<Utc>) -> Option<ResetScope> {
        match self.slots.get(user_id) {
            Some(GateState::Pending { action, requested_at }) if now - *requested_at <= self.ttl => {
                Some(*action)
            }
            _ => None,
        }
    }
}
