//! Action records, the id counter and per-holder cast records.

use common::{info_hash, Action, ActionInfo, GovernanceError};
use soroban_sdk::{symbol_short, Address, Env, Symbol};

// ── Storage key prefixes ─────────────────────────────────────────────────────

const ACTION_CTR: Symbol = symbol_short!("ACT_CTR");
const ACTION: Symbol = symbol_short!("ACT");
const APPROVED: Symbol = symbol_short!("APPR");
const DISAPPROVED: Symbol = symbol_short!("DISAPPR");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Counter ──────────────────────────────────────────────────────────────────

pub(crate) fn count(env: &Env) -> u64 {
    env.storage().instance().get(&ACTION_CTR).unwrap_or(0u64)
}

/// Claim the next sequential id. Ids start at zero.
pub(crate) fn next_id(env: &Env) -> Result<u64, GovernanceError> {
    let id = count(env);
    let next = id.checked_add(1).ok_or(GovernanceError::InvalidInput)?;
    env.storage().instance().set(&ACTION_CTR, &next);
    Ok(id)
}

// ── Action records ───────────────────────────────────────────────────────────

fn action_key(id: u64) -> (Symbol, u64) {
    (ACTION, id)
}

pub(crate) fn store(env: &Env, id: u64, action: &Action) {
    let key = action_key(id);
    env.storage().persistent().set(&key, action);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn load(env: &Env, id: u64) -> Option<Action> {
    env.storage().persistent().get(&action_key(id))
}

/// Load the record for `info.id` and check `info` against its commitment.
pub(crate) fn load_verified(env: &Env, info: &ActionInfo) -> Result<Action, GovernanceError> {
    let action = load(env, info.id).ok_or(GovernanceError::ActionNotFound)?;
    if info_hash(env, info) != action.info_hash {
        return Err(GovernanceError::InfoHashMismatch);
    }
    Ok(action)
}

// ── Cast records ─────────────────────────────────────────────────────────────

fn cast_key(prefix: Symbol, action_id: u64, policyholder: &Address) -> (Symbol, u64, Address) {
    (prefix, action_id, policyholder.clone())
}

fn record(env: &Env, key: &(Symbol, u64, Address)) {
    env.storage().persistent().set(key, &true);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn has_approved(env: &Env, action_id: u64, policyholder: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&cast_key(APPROVED, action_id, policyholder))
}

pub(crate) fn has_disapproved(env: &Env, action_id: u64, policyholder: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&cast_key(DISAPPROVED, action_id, policyholder))
}

pub(crate) fn record_approval(env: &Env, action_id: u64, policyholder: &Address) {
    record(env, &cast_key(APPROVED, action_id, policyholder));
}

pub(crate) fn record_disapproval(env: &Env, action_id: u64, policyholder: &Address) {
    record(env, &cast_key(DISAPPROVED, action_id, policyholder));
}
