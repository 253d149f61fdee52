//! Strategy configuration: validation and instance storage.

use common::{GovernanceError, QuorumRule, StrategyConfig, ONE_HUNDRED_IN_BPS};
use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

// ── Storage keys ─────────────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CORE: Symbol = symbol_short!("CORE");
const POLICY: Symbol = symbol_short!("POLICY");
const CONFIG: Symbol = symbol_short!("CONFIG");

const APPROVAL_SUPPLY: Symbol = symbol_short!("APP_SUP");
const DISAPPROVAL_SUPPLY: Symbol = symbol_short!("DIS_SUP");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Validation ───────────────────────────────────────────────────────────────

fn validate_roles(roles: &Vec<u32>) -> Result<(), GovernanceError> {
    for (i, role) in roles.iter().enumerate() {
        if role == 0 {
            return Err(GovernanceError::InvalidRole);
        }
        if roles.iter().skip(i + 1).any(|other| other == role) {
            return Err(GovernanceError::InvalidRole);
        }
    }
    Ok(())
}

/// Reject configurations that could never approve anything.
pub(crate) fn validate(config: &StrategyConfig) -> Result<(), GovernanceError> {
    if config.approval_role == 0 || config.disapproval_role == 0 {
        return Err(GovernanceError::InvalidRole);
    }
    validate_roles(&config.force_approval_roles)?;
    validate_roles(&config.force_disapproval_roles)?;

    match &config.quorum {
        QuorumRule::Relative(q) => {
            if q.min_approval_pct > ONE_HUNDRED_IN_BPS {
                return Err(GovernanceError::InvalidMinApprovalPct);
            }
        }
        QuorumRule::Absolute(q) => {
            if q.min_approvals == 0 {
                return Err(GovernanceError::InvalidMinApprovalPct);
            }
        }
    }
    Ok(())
}

// ── Instance storage ─────────────────────────────────────────────────────────

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub(crate) fn store(env: &Env, core: &Address, policy: &Address, config: &StrategyConfig) {
    let storage = env.storage().instance();
    storage.set(&CORE, core);
    storage.set(&POLICY, policy);
    storage.set(&CONFIG, config);
    storage.set(&INITIALIZED, &true);
}

pub(crate) fn load(env: &Env) -> Result<StrategyConfig, GovernanceError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(GovernanceError::NotInitialized)
}

pub(crate) fn core(env: &Env) -> Result<Address, GovernanceError> {
    env.storage()
        .instance()
        .get(&CORE)
        .ok_or(GovernanceError::NotInitialized)
}

pub(crate) fn policy(env: &Env) -> Result<Address, GovernanceError> {
    env.storage()
        .instance()
        .get(&POLICY)
        .ok_or(GovernanceError::NotInitialized)
}

pub(crate) fn is_force_role(roles: &Vec<u32>, role: u32) -> bool {
    roles.contains(role)
}

// ── Per-action supply snapshots ──────────────────────────────────────────────

pub(crate) fn store_supplies(env: &Env, action_id: u64, approval: u128, disapproval: u128) {
    let storage = env.storage().persistent();
    let approval_key = (APPROVAL_SUPPLY, action_id);
    let disapproval_key = (DISAPPROVAL_SUPPLY, action_id);
    storage.set(&approval_key, &approval);
    storage.set(&disapproval_key, &disapproval);
    storage.extend_ttl(&approval_key, TTL_THRESHOLD, TTL_EXTEND_TO);
    storage.extend_ttl(&disapproval_key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn approval_supply(env: &Env, action_id: u64) -> Option<u128> {
    env.storage()
        .persistent()
        .get(&(APPROVAL_SUPPLY, action_id))
}

pub(crate) fn disapproval_supply(env: &Env, action_id: u64) -> Option<u128> {
    env.storage()
        .persistent()
        .get(&(DISAPPROVAL_SUPPLY, action_id))
}
