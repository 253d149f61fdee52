//! In-process mock contracts for tests (feature `testutils`).
//!
//! - [`MockPolicy`]: checkpointed role ledger with per-holder weights,
//!   per-role supply and permission grants.
//! - [`MockGuard`]: action guard whose three hooks can be switched on/off.
//! - [`MockTarget`]: call target that records invocations and can fail.
//! - [`MockScript`]: script that plans calls for the core to perform.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, vec, Address, BytesN, Env,
    IntoVal, Symbol, Vec,
};

use crate::errors::GovernanceError;
use crate::types::{ActionInfo, CallData, ScriptCall};

// ── MockPolicy ───────────────────────────────────────────────────────────────

const WEIGHT: Symbol = symbol_short!("WEIGHT");
const SUPPLY: Symbol = symbol_short!("SUPPLY");
const PERM: Symbol = symbol_short!("PERM");

/// A value valid from `timestamp` until the next checkpoint.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub timestamp: u64,
    pub value: u128,
}

fn value_at(checkpoints: &Vec<Checkpoint>, timestamp: u64) -> u128 {
    let mut i = checkpoints.len();
    while i > 0 {
        i -= 1;
        if let Some(cp) = checkpoints.get(i) {
            if cp.timestamp <= timestamp {
                return cp.value;
            }
        }
    }
    0
}

fn push_checkpoint(env: &Env, checkpoints: &mut Vec<Checkpoint>, value: u128) {
    let now = env.ledger().timestamp();
    let last = checkpoints.len().checked_sub(1);
    if let Some(idx) = last {
        if let Some(cp) = checkpoints.get(idx) {
            if cp.timestamp == now {
                checkpoints.set(idx, Checkpoint { timestamp: now, value });
                return;
            }
        }
    }
    checkpoints.push_back(Checkpoint { timestamp: now, value });
}

#[contract]
pub struct MockPolicy;

#[contractimpl]
impl MockPolicy {
    /// Set `policyholder`'s weight for `role` from the current timestamp on.
    pub fn set_role_weight(env: Env, policyholder: Address, role: u32, weight: u128) {
        let key = (WEIGHT, policyholder, role);
        let mut weights: Vec<Checkpoint> = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or(Vec::new(&env));
        let now = env.ledger().timestamp();
        let previous = value_at(&weights, now);
        push_checkpoint(&env, &mut weights, weight);
        env.storage().persistent().set(&key, &weights);

        let supply_key = (SUPPLY, role);
        let mut supply: Vec<Checkpoint> = env
            .storage()
            .persistent()
            .get(&supply_key)
            .unwrap_or(Vec::new(&env));
        let current = value_at(&supply, now);
        let next = current.saturating_sub(previous).saturating_add(weight);
        push_checkpoint(&env, &mut supply, next);
        env.storage().persistent().set(&supply_key, &supply);
    }

    pub fn set_permission(
        env: Env,
        policyholder: Address,
        role: u32,
        permission_id: BytesN<32>,
        allowed: bool,
    ) {
        let key = (PERM, policyholder, role, permission_id);
        env.storage().persistent().set(&key, &allowed);
    }

    pub fn has_permission(
        env: Env,
        policyholder: Address,
        role: u32,
        permission_id: BytesN<32>,
        timestamp: u64,
    ) -> bool {
        let key = (PERM, policyholder.clone(), role, permission_id);
        let allowed: bool = env.storage().persistent().get(&key).unwrap_or(false);
        allowed && Self::role_weight(env, policyholder, role, timestamp) > 0
    }

    pub fn has_role(env: Env, policyholder: Address, role: u32, timestamp: u64) -> bool {
        Self::role_weight(env, policyholder, role, timestamp) > 0
    }

    pub fn role_weight(env: Env, policyholder: Address, role: u32, timestamp: u64) -> u128 {
        let weights: Vec<Checkpoint> = env
            .storage()
            .persistent()
            .get(&(WEIGHT, policyholder, role))
            .unwrap_or(Vec::new(&env));
        value_at(&weights, timestamp)
    }

    pub fn role_supply(env: Env, role: u32, timestamp: u64) -> u128 {
        let supply: Vec<Checkpoint> = env
            .storage()
            .persistent()
            .get(&(SUPPLY, role))
            .unwrap_or(Vec::new(&env));
        value_at(&supply, timestamp)
    }
}

// ── MockGuard ────────────────────────────────────────────────────────────────

const GUARD_CFG: Symbol = symbol_short!("GRD_CFG");
const GUARD_PRE: Symbol = symbol_short!("GRD_PRE");
const GUARD_POST: Symbol = symbol_short!("GRD_POST");

/// Errors raised by the mock target, outside the `GovernanceError` range.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockError {
    TargetFailed = 901,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuardBehavior {
    pub allow_creation: bool,
    pub allow_pre_execution: bool,
    pub allow_post_execution: bool,
}

#[contract]
pub struct MockGuard;

#[contractimpl]
impl MockGuard {
    pub fn set_behavior(env: Env, behavior: GuardBehavior) {
        env.storage().instance().set(&GUARD_CFG, &behavior);
    }

    pub fn validate_action_creation(env: Env, _info: ActionInfo) -> Result<(), GovernanceError> {
        if Self::behavior(&env).allow_creation {
            Ok(())
        } else {
            Err(GovernanceError::ProhibitedByActionGuard)
        }
    }

    pub fn validate_pre_action_execution(env: Env, _info: ActionInfo) -> Result<(), GovernanceError> {
        if !Self::behavior(&env).allow_pre_execution {
            return Err(GovernanceError::ProhibitedByActionGuard);
        }
        let count: u32 = env.storage().instance().get(&GUARD_PRE).unwrap_or(0);
        env.storage().instance().set(&GUARD_PRE, &(count + 1));
        Ok(())
    }

    pub fn validate_post_action_execution(env: Env, _info: ActionInfo) -> Result<(), GovernanceError> {
        if !Self::behavior(&env).allow_post_execution {
            return Err(GovernanceError::ProhibitedByActionGuard);
        }
        let count: u32 = env.storage().instance().get(&GUARD_POST).unwrap_or(0);
        env.storage().instance().set(&GUARD_POST, &(count + 1));
        Ok(())
    }

    pub fn pre_count(env: Env) -> u32 {
        env.storage().instance().get(&GUARD_PRE).unwrap_or(0)
    }

    pub fn post_count(env: Env) -> u32 {
        env.storage().instance().get(&GUARD_POST).unwrap_or(0)
    }

    fn behavior(env: &Env) -> GuardBehavior {
        env.storage().instance().get(&GUARD_CFG).unwrap_or(GuardBehavior {
            allow_creation: true,
            allow_pre_execution: true,
            allow_post_execution: true,
        })
    }
}

// ── MockTarget ───────────────────────────────────────────────────────────────

const CALLS: Symbol = symbol_short!("CALLS");

#[contract]
pub struct MockTarget;

#[contractimpl]
impl MockTarget {
    /// Records the call and returns `x * 2`.
    pub fn ping(env: Env, x: u32) -> u32 {
        let count: u32 = env.storage().instance().get(&CALLS).unwrap_or(0);
        env.storage().instance().set(&CALLS, &(count + 1));
        x.saturating_mul(2)
    }

    pub fn fail(_env: Env) -> Result<u32, MockError> {
        Err(MockError::TargetFailed)
    }

    pub fn calls(env: Env) -> u32 {
        env.storage().instance().get(&CALLS).unwrap_or(0)
    }
}

// ── MockScript ───────────────────────────────────────────────────────────────

#[contract]
pub struct MockScript;

#[contractimpl]
impl MockScript {
    /// Plans `target.ping(x)` twice, the second with `x + 1`.
    pub fn ping_twice(env: Env, target: Address, x: u32) -> Vec<ScriptCall> {
        vec![
            &env,
            ScriptCall {
                target: target.clone(),
                value: 0,
                data: CallData {
                    selector: symbol_short!("ping"),
                    args: vec![&env, x.into_val(&env)],
                },
            },
            ScriptCall {
                target,
                value: 0,
                data: CallData {
                    selector: symbol_short!("ping"),
                    args: vec![&env, x.saturating_add(1).into_val(&env)],
                },
            },
        ]
    }

    /// Plans a self-call on `core` authorising `strategy`.
    pub fn authorize_strategy(env: Env, core: Address, strategy: Address) -> Vec<ScriptCall> {
        vec![
            &env,
            ScriptCall {
                target: core,
                value: 0,
                data: CallData {
                    selector: Symbol::new(&env, "set_strategy_authorization"),
                    args: vec![&env, strategy.into_val(&env), true.into_val(&env)],
                },
            },
        ]
    }
}
