//! Quorum arithmetic.
//!
//! Thresholds are computed with round-up division everywhere: creation-time
//! validation and the live quorum check use [`minimum_amount_needed`], so a
//! strategy can never accept an action whose quorum is arithmetically
//! unreachable.

use common::{AbsoluteQuorum, GovernanceError, QuorumRule, RelativeQuorum, ONE_HUNDRED_IN_BPS};

/// `ceil(supply × min_pct / 10 000)`, exact for every `supply`.
///
/// Split as `(supply / d) × pct + ceil((supply % d) × pct / d)` so the
/// product never overflows for `min_pct <= 10 000`.
pub fn minimum_amount_needed(supply: u128, min_pct: u32) -> u128 {
    let denominator = ONE_HUNDRED_IN_BPS as u128;
    let pct = min_pct as u128;
    let whole = (supply / denominator).saturating_mul(pct);
    let rest = (supply % denominator) * pct;
    whole.saturating_add(rest / denominator + u128::from(rest % denominator != 0))
}

pub fn disapproval_enabled(rule: &QuorumRule) -> bool {
    match rule {
        QuorumRule::Relative(RelativeQuorum {
            min_disapproval_pct,
            ..
        }) => *min_disapproval_pct <= ONE_HUNDRED_IN_BPS,
        QuorumRule::Absolute(AbsoluteQuorum {
            min_disapprovals, ..
        }) => *min_disapprovals != u128::MAX,
    }
}

/// Approvals required given the approval-role supply at creation.
pub fn approval_threshold(rule: &QuorumRule, supply: u128) -> u128 {
    match rule {
        QuorumRule::Relative(q) => minimum_amount_needed(supply, q.min_approval_pct),
        QuorumRule::Absolute(q) => q.min_approvals,
    }
}

/// Disapprovals required, or `None` when disapprovals are disabled.
pub fn disapproval_threshold(rule: &QuorumRule, supply: u128) -> Option<u128> {
    if !disapproval_enabled(rule) {
        return None;
    }
    Some(match rule {
        QuorumRule::Relative(q) => minimum_amount_needed(supply, q.min_disapproval_pct),
        QuorumRule::Absolute(q) => q.min_disapprovals,
    })
}

pub fn meets_approval(total_approvals: u128, threshold: u128) -> bool {
    total_approvals >= threshold
}

/// A veto needs at least one cast, so a zero threshold means "any single
/// disapproval", never "always disapproved".
pub fn meets_disapproval(total_disapprovals: u128, threshold: u128) -> bool {
    total_disapprovals > 0 && total_disapprovals >= threshold
}

/// Creation-time reachability check against the snapshotted supplies.
pub fn validate_supplies(
    rule: &QuorumRule,
    approval_supply: u128,
    disapproval_supply: u128,
) -> Result<(), GovernanceError> {
    if approval_supply == 0 {
        return Err(GovernanceError::RoleHasZeroSupply);
    }
    let disapprovals_on = disapproval_enabled(rule);
    if disapprovals_on && disapproval_supply == 0 {
        return Err(GovernanceError::RoleHasZeroSupply);
    }
    if let QuorumRule::Absolute(q) = rule {
        if q.min_approvals > approval_supply {
            return Err(GovernanceError::InsufficientApprovalQuantity);
        }
        if disapprovals_on && q.min_disapprovals > disapproval_supply {
            return Err(GovernanceError::InsufficientDisapprovalQuantity);
        }
    }
    Ok(())
}
