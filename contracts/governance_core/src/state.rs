//! Action state derivation.
//!
//! Only `executed`, `canceled` and `min_execution_time` are stored. Every
//! other state is re-derived on each call from the stored record, the
//! strategy and the ledger clock, evaluated as a strict priority cascade:
//!
//! ```text
//! Canceled  if canceled
//! Executed  if executed
//! Active    if strategy.is_active
//! Failed    if !strategy.is_action_approved
//! Approved  if min_execution_time == 0
//! Failed    if strategy.is_action_disapproved
//! Expired   if strategy.is_action_expired
//! Queued    otherwise
//! ```

use common::{Action, ActionInfo, ActionState, GovernanceError, StrategyClient};
use soroban_sdk::{log, Env, InvokeError};

/// Unwrap a `try_` strategy call.
///
/// A `GovernanceError` raised by the strategy reaches the caller unchanged;
/// anything else (missing contract, host trap, undecodable value) means the
/// address does not behave as a strategy.
pub(crate) fn forward<T, C>(
    env: &Env,
    result: Result<Result<T, C>, Result<GovernanceError, InvokeError>>,
) -> Result<T, GovernanceError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(err)) => Err(err),
        Ok(Err(_)) | Err(Err(_)) => {
            log!(env, "strategy call failed");
            Err(GovernanceError::InvalidStrategy)
        }
    }
}

pub(crate) fn derive(
    env: &Env,
    info: &ActionInfo,
    action: &Action,
) -> Result<ActionState, GovernanceError> {
    if action.canceled {
        return Ok(ActionState::Canceled);
    }
    if action.executed {
        return Ok(ActionState::Executed);
    }

    let strategy = StrategyClient::new(env, &info.strategy);
    if forward(env, strategy.try_is_active(info, action))? {
        return Ok(ActionState::Active);
    }
    if !forward(env, strategy.try_is_action_approved(info, action))? {
        return Ok(ActionState::Failed);
    }
    if action.min_execution_time == 0 {
        return Ok(ActionState::Approved);
    }
    if forward(env, strategy.try_is_action_disapproved(info, action))? {
        return Ok(ActionState::Failed);
    }
    if forward(env, strategy.try_is_action_expired(info, action))? {
        return Ok(ActionState::Expired);
    }
    Ok(ActionState::Queued)
}

/// Fail unless the action is currently in `expected`.
pub(crate) fn require(
    env: &Env,
    info: &ActionInfo,
    action: &Action,
    expected: ActionState,
) -> Result<(), GovernanceError> {
    if derive(env, info, action)? != expected {
        return Err(GovernanceError::invalid_action_state(expected));
    }
    Ok(())
}
