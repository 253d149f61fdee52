#![no_std]

//! # Quorum Strategy
//!
//! Built-in strategy for governance instance actions. One deployed instance
//! holds one immutable [`StrategyConfig`] and is bound to one core.
//!
//! - **Relative quorum**: approvals/disapprovals measured in basis points of
//!   the role supply snapshotted at action creation
//! - **Absolute quorum**: fixed quantities, optionally with peer review
//!   (the creator cannot cast)
//! - **Force roles**: a single holder satisfies the respective quorum
//! - **Fixed or flexible approval window**: flexible windows close as soon
//!   as quorum is reached
//!
//! All weights are read at the action's creation time, never at cast time.

pub mod config;
pub mod events;
pub mod quorum;

use common::{
    Action, ActionInfo, ActionState, GovernanceError, PolicyClient, QuorumRule, StrategyConfig,
    StrategyInterface, MAX_QUANTITY,
};
use soroban_sdk::{contract, contractimpl, Address, Env};

#[contract]
pub struct QuorumStrategy;

#[contractimpl]
impl QuorumStrategy {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Bind the strategy to `core` and `policy` and fix its configuration.
    pub fn initialize(
        env: Env,
        core: Address,
        policy: Address,
        strategy_config: StrategyConfig,
    ) -> Result<(), GovernanceError> {
        if config::is_initialized(&env) {
            return Err(GovernanceError::AlreadyInitialized);
        }
        config::validate(&strategy_config)?;
        config::store(&env, &core, &policy, &strategy_config);
        events::publish_strategy_initialized(&env, &core, &policy, &strategy_config);
        Ok(())
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn is_initialized(env: Env) -> bool {
        config::is_initialized(&env)
    }

    pub fn get_config(env: Env) -> Result<StrategyConfig, GovernanceError> {
        config::load(&env)
    }

    pub fn get_policy(env: Env) -> Result<Address, GovernanceError> {
        config::policy(&env)
    }

    pub fn approval_supply(env: Env, action_id: u64) -> Option<u128> {
        config::approval_supply(&env, action_id)
    }

    pub fn disapproval_supply(env: Env, action_id: u64) -> Option<u128> {
        config::disapproval_supply(&env, action_id)
    }

    pub fn approval_end_time(env: Env, action: Action) -> Result<u64, GovernanceError> {
        let cfg = config::load(&env)?;
        Ok(action.creation_time.saturating_add(cfg.approval_period))
    }

    pub fn is_force_approval_role(env: Env, role: u32) -> Result<bool, GovernanceError> {
        let cfg = config::load(&env)?;
        Ok(config::is_force_role(&cfg.force_approval_roles, role))
    }

    pub fn is_force_disapproval_role(env: Env, role: u32) -> Result<bool, GovernanceError> {
        let cfg = config::load(&env)?;
        Ok(config::is_force_role(&cfg.force_disapproval_roles, role))
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn approved(env: &Env, cfg: &StrategyConfig, info: &ActionInfo, action: &Action) -> bool {
        let supply = match &cfg.quorum {
            QuorumRule::Relative(_) => match config::approval_supply(env, info.id) {
                Some(supply) => supply,
                None => return false,
            },
            QuorumRule::Absolute(_) => 0,
        };
        let threshold = quorum::approval_threshold(&cfg.quorum, supply);
        quorum::meets_approval(action.total_approvals, threshold)
    }

    fn disapproved(env: &Env, cfg: &StrategyConfig, info: &ActionInfo, action: &Action) -> bool {
        let supply = config::disapproval_supply(env, info.id).unwrap_or(0);
        if supply == 0 && matches!(cfg.quorum, QuorumRule::Relative(_)) {
            return false;
        }
        match quorum::disapproval_threshold(&cfg.quorum, supply) {
            Some(threshold) => quorum::meets_disapproval(action.total_disapprovals, threshold),
            None => false,
        }
    }

    fn check_peer_review(
        cfg: &StrategyConfig,
        info: &ActionInfo,
        policyholder: &Address,
    ) -> Result<(), GovernanceError> {
        if let QuorumRule::Absolute(q) = &cfg.quorum {
            if q.peer_review && *policyholder == info.creator {
                return Err(GovernanceError::ActionCreatorCannotCast);
            }
        }
        Ok(())
    }

    fn quantity_at(
        env: &Env,
        policyholder: &Address,
        role: u32,
        timestamp: u64,
        is_force: bool,
    ) -> Result<u128, GovernanceError> {
        let policy = PolicyClient::new(env, &config::policy(env)?);
        let weight = policy.role_weight(policyholder, &role, &timestamp);
        if weight > 0 && is_force {
            return Ok(MAX_QUANTITY);
        }
        Ok(weight)
    }
}

#[contractimpl]
impl StrategyInterface for QuorumStrategy {
    fn validate_action_creation(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<(), GovernanceError> {
        config::core(&env)?.require_auth();
        let cfg = config::load(&env)?;
        let policy = PolicyClient::new(&env, &config::policy(&env)?);

        let approval_supply = policy.role_supply(&cfg.approval_role, &action.creation_time);
        let disapproval_supply = policy.role_supply(&cfg.disapproval_role, &action.creation_time);
        quorum::validate_supplies(&cfg.quorum, approval_supply, disapproval_supply)?;

        config::store_supplies(&env, info.id, approval_supply, disapproval_supply);
        events::publish_supplies_snapshotted(&env, info.id, approval_supply, disapproval_supply);
        Ok(())
    }

    fn check_approval_enabled(
        env: Env,
        info: ActionInfo,
        policyholder: Address,
        role: u32,
    ) -> Result<(), GovernanceError> {
        let cfg = config::load(&env)?;
        if role != cfg.approval_role && !config::is_force_role(&cfg.force_approval_roles, role) {
            return Err(GovernanceError::InvalidRole);
        }
        Self::check_peer_review(&cfg, &info, &policyholder)
    }

    fn check_disapproval_enabled(
        env: Env,
        info: ActionInfo,
        policyholder: Address,
        role: u32,
    ) -> Result<(), GovernanceError> {
        let cfg = config::load(&env)?;
        if !quorum::disapproval_enabled(&cfg.quorum) {
            return Err(GovernanceError::DisapprovalDisabled);
        }
        if role != cfg.disapproval_role
            && !config::is_force_role(&cfg.force_disapproval_roles, role)
        {
            return Err(GovernanceError::InvalidRole);
        }
        Self::check_peer_review(&cfg, &info, &policyholder)
    }

    fn approval_quantity_at(
        env: Env,
        policyholder: Address,
        role: u32,
        timestamp: u64,
    ) -> Result<u128, GovernanceError> {
        let cfg = config::load(&env)?;
        let is_force = config::is_force_role(&cfg.force_approval_roles, role);
        if role != cfg.approval_role && !is_force {
            return Ok(0);
        }
        Self::quantity_at(&env, &policyholder, role, timestamp, is_force)
    }

    fn disapproval_quantity_at(
        env: Env,
        policyholder: Address,
        role: u32,
        timestamp: u64,
    ) -> Result<u128, GovernanceError> {
        let cfg = config::load(&env)?;
        let is_force = config::is_force_role(&cfg.force_disapproval_roles, role);
        if role != cfg.disapproval_role && !is_force {
            return Ok(0);
        }
        Self::quantity_at(&env, &policyholder, role, timestamp, is_force)
    }

    fn is_active(env: Env, info: ActionInfo, action: Action) -> Result<bool, GovernanceError> {
        let cfg = config::load(&env)?;
        let approval_end = action.creation_time.saturating_add(cfg.approval_period);
        if env.ledger().timestamp() > approval_end {
            return Ok(false);
        }
        if cfg.fixed_length_approval_period {
            return Ok(true);
        }
        Ok(!Self::approved(&env, &cfg, &info, &action))
    }

    fn is_action_approved(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<bool, GovernanceError> {
        let cfg = config::load(&env)?;
        Ok(Self::approved(&env, &cfg, &info, &action))
    }

    fn is_action_disapproved(
        env: Env,
        info: ActionInfo,
        action: Action,
    ) -> Result<bool, GovernanceError> {
        let cfg = config::load(&env)?;
        Ok(Self::disapproved(&env, &cfg, &info, &action))
    }

    fn is_action_expired(
        env: Env,
        _info: ActionInfo,
        action: Action,
    ) -> Result<bool, GovernanceError> {
        let cfg = config::load(&env)?;
        if action.min_execution_time == 0 {
            return Ok(false);
        }
        let expires_at = action
            .min_execution_time
            .saturating_add(cfg.expiration_period);
        Ok(expires_at <= env.ledger().timestamp())
    }

    fn min_execution_time(
        env: Env,
        _info: ActionInfo,
        _action: Action,
    ) -> Result<u64, GovernanceError> {
        let cfg = config::load(&env)?;
        Ok(env.ledger().timestamp().saturating_add(cfg.queuing_period))
    }

    fn validate_action_cancelation(
        env: Env,
        info: ActionInfo,
        action: Action,
        state: ActionState,
        caller: Address,
    ) -> Result<(), GovernanceError> {
        let cfg = config::load(&env)?;
        match state {
            ActionState::Active | ActionState::Approved | ActionState::Queued => {
                if caller != info.creator {
                    return Err(GovernanceError::OnlyActionCreator);
                }
                Ok(())
            }
            // Absolute rule: anyone may clean up an action vetoed after queuing.
            ActionState::Failed
                if matches!(cfg.quorum, QuorumRule::Absolute(_))
                    && action.min_execution_time != 0 =>
            {
                Ok(())
            }
            _ => Err(GovernanceError::CannotCancelInState),
        }
    }

    fn get_core(env: Env) -> Result<Address, GovernanceError> {
        config::core(&env)
    }
}
