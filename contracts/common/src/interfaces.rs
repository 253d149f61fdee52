//! Cross-contract interfaces consumed by the core.
//!
//! Each trait generates a typed client (`PolicyClient`, `StrategyClient`,
//! `ActionGuardClient`). Any contract exposing the same functions can be
//! plugged in.

use soroban_sdk::{contractclient, Address, BytesN, Env};

use crate::errors::GovernanceError;
use crate::types::{Action, ActionInfo, ActionState};

/// Read-only view of the time-checkpointed role ledger.
///
/// Every query takes the ledger timestamp the answer must be valid at.
#[contractclient(name = "PolicyClient")]
pub trait PolicyInterface {
    fn has_permission(
        env: Env,
        policyholder: Address,
        role: u32,
        permission_id: BytesN<32>,
        timestamp: u64,
    ) -> bool;

    fn has_role(env: Env, policyholder: Address, role: u32, timestamp: u64) -> bool;

    fn role_weight(env: Env, policyholder: Address, role: u32, timestamp: u64) -> u128;

    fn role_supply(env: Env, role: u32, timestamp: u64) -> u128;
}

/// Approval math and timing for the actions that name this strategy.
///
/// Strategies never call back into the core; the core passes the stored
/// `Action` record alongside the verified `ActionInfo`.
#[contractclient(name = "StrategyClient")]
pub trait StrategyInterface {
    /// Snapshots role supplies for `info.id`. Only the bound core may call.
    fn validate_action_creation(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<(), GovernanceError>;

    fn check_approval_enabled(
        env: Env,
        info: ActionInfo,
        policyholder: Address,
        role: u32,
    ) -> Result<(), GovernanceError>;

    fn check_disapproval_enabled(
        env: Env,
        info: ActionInfo,
        policyholder: Address,
        role: u32,
    ) -> Result<(), GovernanceError>;

    fn approval_quantity_at(
        env: Env,
        policyholder: Address,
        role: u32,
        timestamp: u64,
    ) -> Result<u128, GovernanceError>;

    fn disapproval_quantity_at(
        env: Env,
        policyholder: Address,
        role: u32,
        timestamp: u64,
    ) -> Result<u128, GovernanceError>;

    fn is_active(env: Env, info: ActionInfo, action: Action) -> Result<bool, GovernanceError>;

    fn is_action_approved(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<bool, GovernanceError>;

    fn is_action_disapproved(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<bool, GovernanceError>;

    fn is_action_expired(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<bool, GovernanceError>;

    /// Earliest execution time if the action were queued now.
    fn min_execution_time(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<u64, GovernanceError>;

    fn validate_action_cancelation(
        env: Env,
        info: ActionInfo,
        action: Action,
        state: ActionState,
        caller: Address,
    ) -> Result<(), GovernanceError>;

    /// The core this strategy instance is bound to.
    fn get_core(env: Env) -> Result<Address, GovernanceError>;
}

/// Optional veto hook registered per (target, selector).
///
/// A guard rejects by failing with its own error; the core does not catch
/// it, so the guard's error aborts the call unchanged.
#[contractclient(name = "ActionGuardClient")]
pub trait ActionGuardInterface {
    fn validate_action_creation(env: Env, info: ActionInfo) -> Result<(), GovernanceError>;

    fn validate_pre_action_execution(env: Env, info: ActionInfo) -> Result<(), GovernanceError>;

    fn validate_post_action_execution(env: Env, info: ActionInfo)
        -> Result<(), GovernanceError>;
}
