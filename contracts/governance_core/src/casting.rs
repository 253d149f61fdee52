//! Approval and disapproval casting.
//!
//! Approvals are accepted while an action is `Active`, disapprovals while it
//! is `Queued`. The quantity is the caster's weight at the action's creation
//! time and is added to the running total with saturating arithmetic.

use common::{
    ActionInfo, ActionState, GovernanceError, PolicyClient, StrategyClient,
};
use soroban_sdk::{Address, Env, String};

use crate::{action, events, state};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CastKind {
    Approval,
    Disapproval,
}

impl CastKind {
    fn required_state(self) -> ActionState {
        match self {
            CastKind::Approval => ActionState::Active,
            CastKind::Disapproval => ActionState::Queued,
        }
    }
}

pub(crate) fn cast(
    env: &Env,
    policy: &Address,
    kind: CastKind,
    policyholder: &Address,
    role: u32,
    info: &ActionInfo,
    reason: &String,
) -> Result<u128, GovernanceError> {
    let mut record = action::load_verified(env, info)?;
    state::require(env, info, &record, kind.required_state())?;

    let already = match kind {
        CastKind::Approval => action::has_approved(env, info.id, policyholder),
        CastKind::Disapproval => action::has_disapproved(env, info.id, policyholder),
    };
    if already {
        return Err(GovernanceError::DuplicateCast);
    }

    let policy = PolicyClient::new(env, policy);
    if !policy.has_role(policyholder, &role, &record.creation_time) {
        return Err(GovernanceError::InvalidPolicyholder);
    }

    let strategy = StrategyClient::new(env, &info.strategy);
    let quantity = match kind {
        CastKind::Approval => {
            state::forward(
                env,
                strategy.try_check_approval_enabled(info, policyholder, &role),
            )?;
            state::forward(
                env,
                strategy.try_approval_quantity_at(policyholder, &role, &record.creation_time),
            )?
        }
        CastKind::Disapproval => {
            state::forward(
                env,
                strategy.try_check_disapproval_enabled(info, policyholder, &role),
            )?;
            state::forward(
                env,
                strategy.try_disapproval_quantity_at(policyholder, &role, &record.creation_time),
            )?
        }
    };
    if quantity == 0 {
        return Err(GovernanceError::CannotCastWithZeroQuantity);
    }

    match kind {
        CastKind::Approval => {
            record.total_approvals = record.total_approvals.saturating_add(quantity);
            action::record_approval(env, info.id, policyholder);
            events::publish_approval_cast(env, info.id, policyholder, role, quantity, reason);
        }
        CastKind::Disapproval => {
            record.total_disapprovals = record.total_disapprovals.saturating_add(quantity);
            action::record_disapproval(env, info.id, policyholder);
            events::publish_disapproval_cast(env, info.id, policyholder, role, quantity, reason);
        }
    }
    action::store(env, info.id, &record);
    Ok(quantity)
}
