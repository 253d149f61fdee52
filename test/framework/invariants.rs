//! # Action Invariant Definitions & Verification
//!
//! Defines invariants that must hold for every tracked action across all
//! lifecycle transitions. Invariants are checked after every operation during
//! state exploration and can be composed via the `InvariantSet` builder.
//!
//! ## Complexity
//!
//! - Each invariant check is O(n) in the number of tracked actions.
//! - A full verification after each operation is O(k·n) for k invariants.

extern crate std;

use std::string::{String, ToString};
use std::vec::Vec;

use common::ActionState;

use super::{ActionSnapshot, GovernanceSnapshot};

// ── Invariant Trait ──────────────────────────────────────────────────────────

/// A named invariant that can be verified against a state snapshot.
pub trait Invariant {
    /// Human-readable name for error messages.
    fn name(&self) -> &str;

    /// Check the invariant. Returns `Ok(())` on success, `Err(description)` on violation.
    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String>;
}

fn each_action(
    snapshot: &GovernanceSnapshot,
    check: impl Fn(&ActionSnapshot) -> Result<(), String>,
) -> Result<(), String> {
    snapshot.actions.iter().try_for_each(check)
}

// ── Built-in Invariants ──────────────────────────────────────────────────────

/// **Exclusive Terminal Flags**: an action is never both executed and canceled.
pub struct ExecutedCanceledExclusive;

impl Invariant for ExecutedCanceledExclusive {
    fn name(&self) -> &str {
        "!(executed && canceled)"
    }

    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String> {
        each_action(snapshot, |a| {
            if a.record.executed && a.record.canceled {
                return Err(std::format!("Action {} is executed and canceled", a.info.id));
            }
            Ok(())
        })
    }
}

/// **Flags Drive Terminal States**: `canceled` reads as `Canceled`,
/// `executed` reads as `Executed`, and neither state appears without its flag.
pub struct TerminalFlagsMatchState;

impl Invariant for TerminalFlagsMatchState {
    fn name(&self) -> &str {
        "terminal state <=> stored flag"
    }

    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String> {
        each_action(snapshot, |a| {
            let expected = if a.record.canceled {
                Some(ActionState::Canceled)
            } else if a.record.executed {
                Some(ActionState::Executed)
            } else {
                None
            };
            match expected {
                Some(state) if a.state != state => Err(std::format!(
                    "Action {} has flag for {:?} but reads {:?}",
                    a.info.id, state, a.state
                )),
                None if a.state.is_terminal() => Err(std::format!(
                    "Action {} reads {:?} without a stored flag",
                    a.info.id, a.state
                )),
                _ => Ok(()),
            }
        })
    }
}

/// **Queue Marker**: `Approved` actions have no execution time yet, and
/// `Queued`, `Expired` and `Executed` actions always have one.
pub struct QueueMarkerConsistency;

impl Invariant for QueueMarkerConsistency {
    fn name(&self) -> &str {
        "min_execution_time != 0 <=> action was queued"
    }

    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String> {
        each_action(snapshot, |a| {
            let queued = a.record.min_execution_time != 0;
            let consistent = match a.state {
                ActionState::Approved => !queued,
                ActionState::Queued | ActionState::Expired | ActionState::Executed => queued,
                _ => true,
            };
            if !consistent {
                return Err(std::format!(
                    "Action {} reads {:?} with min_execution_time={}",
                    a.info.id, a.state, a.record.min_execution_time
                ));
            }
            Ok(())
        })
    }
}

/// **No Tally Without Casts**: totals stay zero until someone has cast.
pub struct TalliesBackedByCasts;

impl Invariant for TalliesBackedByCasts {
    fn name(&self) -> &str {
        "total > 0 => at least one cast recorded"
    }

    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String> {
        each_action(snapshot, |a| {
            if a.record.total_approvals > 0 && a.approvals_cast == 0 {
                return Err(std::format!(
                    "Action {} has {} approvals but no recorded approver",
                    a.info.id, a.record.total_approvals
                ));
            }
            if a.record.total_disapprovals > 0 && a.disapprovals_cast == 0 {
                return Err(std::format!(
                    "Action {} has {} disapprovals but no recorded disapprover",
                    a.info.id, a.record.total_disapprovals
                ));
            }
            Ok(())
        })
    }
}

/// **Causal Times**: creation is never in the future and the execution time
/// never precedes creation.
pub struct CausalTimestamps;

impl Invariant for CausalTimestamps {
    fn name(&self) -> &str {
        "creation_time <= now && (min_exec == 0 || min_exec >= creation_time)"
    }

    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String> {
        each_action(snapshot, |a| {
            if a.record.creation_time > snapshot.timestamp {
                return Err(std::format!(
                    "Action {} created at {} after now={}",
                    a.info.id, a.record.creation_time, snapshot.timestamp
                ));
            }
            let min_exec = a.record.min_execution_time;
            if min_exec != 0 && min_exec < a.record.creation_time {
                return Err(std::format!(
                    "Action {} executable at {} before creation at {}",
                    a.info.id, min_exec, a.record.creation_time
                ));
            }
            Ok(())
        })
    }
}

/// **Dense Ids**: every tracked id is below the action counter.
pub struct IdsBelowCount;

impl Invariant for IdsBelowCount {
    fn name(&self) -> &str {
        "id < action_count"
    }

    fn check(&self, snapshot: &GovernanceSnapshot) -> Result<(), String> {
        each_action(snapshot, |a| {
            if a.info.id >= snapshot.action_count {
                return Err(std::format!(
                    "Action id {} not below count {}",
                    a.info.id, snapshot.action_count
                ));
            }
            Ok(())
        })
    }
}

/// **Monotonic Time**: The timestamp in a snapshot must not decrease between
/// consecutive checks.
pub struct MonotonicTime;

impl TransitionInvariant for MonotonicTime {
    fn name(&self) -> &str {
        "ledger time never decreases"
    }

    fn check(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) -> Result<(), String> {
        if after.timestamp < before.timestamp {
            return Err(std::format!(
                "Time went backwards: {} -> {}",
                before.timestamp, after.timestamp
            ));
        }
        Ok(())
    }
}

// ── Invariant Set ────────────────────────────────────────────────────────────

/// A composable set of invariants that are checked together.
pub struct InvariantSet {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantSet {
    /// Create an empty invariant set.
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Create a set pre-loaded with all built-in action invariants.
    pub fn governance_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(ExecutedCanceledExclusive));
        set.add(Box::new(TerminalFlagsMatchState));
        set.add(Box::new(QueueMarkerConsistency));
        set.add(Box::new(TalliesBackedByCasts));
        set.add(Box::new(CausalTimestamps));
        set.add(Box::new(IdsBelowCount));
        set
    }

    /// Add a custom invariant.
    pub fn add(&mut self, invariant: Box<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Verify all invariants against a snapshot.
    /// Returns a list of (invariant_name, violation_message) for all failures.
    pub fn check_all(&self, snapshot: &GovernanceSnapshot) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(snapshot) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    /// Assert all invariants hold, panicking with details on violation.
    pub fn assert_all(&self, snapshot: &GovernanceSnapshot) {
        let violations = self.check_all(snapshot);
        if !violations.is_empty() {
            let mut report = String::from("Invariant violations detected:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }

    /// Number of invariants in the set.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl Default for InvariantSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── Transition Invariants ────────────────────────────────────────────────────

/// Invariants that verify the relationship between two consecutive snapshots
/// (before and after an operation).
pub trait TransitionInvariant {
    fn name(&self) -> &str;
    fn check(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) -> Result<(), String>;
}

fn each_pair(
    before: &GovernanceSnapshot,
    after: &GovernanceSnapshot,
    check: impl Fn(&ActionSnapshot, &ActionSnapshot) -> Result<(), String>,
) -> Result<(), String> {
    for prev in &before.actions {
        if let Some(next) = after.find(prev.info.id) {
            check(prev, next)?;
        }
    }
    Ok(())
}

/// **Terminal Freeze**: once `Executed` or `Canceled`, the stored record and
/// the derived state never change again.
pub struct TerminalStateFrozen;

impl TransitionInvariant for TerminalStateFrozen {
    fn name(&self) -> &str {
        "terminal actions are immutable"
    }

    fn check(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) -> Result<(), String> {
        each_pair(before, after, |prev, next| {
            if prev.state.is_terminal() && (prev.record != next.record || prev.state != next.state)
            {
                return Err(std::format!(
                    "Terminal action {} changed: {:?} -> {:?}",
                    prev.info.id, prev.state, next.state
                ));
            }
            Ok(())
        })
    }
}

/// **Monotonic Tallies**: approval and disapproval totals only grow.
pub struct MonotonicTallies;

impl TransitionInvariant for MonotonicTallies {
    fn name(&self) -> &str {
        "tallies never decrease"
    }

    fn check(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) -> Result<(), String> {
        each_pair(before, after, |prev, next| {
            if next.record.total_approvals < prev.record.total_approvals
                || next.record.total_disapprovals < prev.record.total_disapprovals
            {
                return Err(std::format!(
                    "Tallies of action {} decreased: ({}, {}) -> ({}, {})",
                    prev.info.id,
                    prev.record.total_approvals,
                    prev.record.total_disapprovals,
                    next.record.total_approvals,
                    next.record.total_disapprovals
                ));
            }
            Ok(())
        })
    }
}

/// **Queue Once**: a non-zero execution time is never rewritten.
pub struct ExecutionTimeSetOnce;

impl TransitionInvariant for ExecutionTimeSetOnce {
    fn name(&self) -> &str {
        "min_execution_time is written at most once"
    }

    fn check(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) -> Result<(), String> {
        each_pair(before, after, |prev, next| {
            let was = prev.record.min_execution_time;
            if was != 0 && next.record.min_execution_time != was {
                return Err(std::format!(
                    "Execution time of action {} moved: {} -> {}",
                    prev.info.id, was, next.record.min_execution_time
                ));
            }
            Ok(())
        })
    }
}

/// **Identity Preserved**: the info hash and creation time are fixed at
/// creation, and the counter never shrinks.
pub struct IdentityPreserved;

impl TransitionInvariant for IdentityPreserved {
    fn name(&self) -> &str {
        "info_hash, creation_time and action_count are stable"
    }

    fn check(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) -> Result<(), String> {
        if after.action_count < before.action_count {
            return Err(std::format!(
                "Action count decreased: {} -> {}",
                before.action_count, after.action_count
            ));
        }
        each_pair(before, after, |prev, next| {
            if prev.record.info_hash != next.record.info_hash
                || prev.record.creation_time != next.record.creation_time
            {
                return Err(std::format!("Identity of action {} changed", prev.info.id));
            }
            Ok(())
        })
    }
}

/// Composite checker for transition invariants.
pub struct TransitionInvariantSet {
    invariants: Vec<Box<dyn TransitionInvariant>>,
}

impl TransitionInvariantSet {
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Create a set pre-loaded with all built-in transition invariants.
    pub fn governance_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(MonotonicTime));
        set.add(Box::new(TerminalStateFrozen));
        set.add(Box::new(MonotonicTallies));
        set.add(Box::new(ExecutionTimeSetOnce));
        set.add(Box::new(IdentityPreserved));
        set
    }

    pub fn add(&mut self, invariant: Box<dyn TransitionInvariant>) {
        self.invariants.push(invariant);
    }

    pub fn check_all(
        &self,
        before: &GovernanceSnapshot,
        after: &GovernanceSnapshot,
    ) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(before, after) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    pub fn assert_all(&self, before: &GovernanceSnapshot, after: &GovernanceSnapshot) {
        let violations = self.check_all(before, after);
        if !violations.is_empty() {
            let mut report = String::from("Transition invariant violations:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }
}

impl Default for TransitionInvariantSet {
    fn default() -> Self {
        Self::new()
    }
}
