//! Strategy, script and guard registries and the self-call admin surface.
//!
//! Registry writes are only reachable through an executed action that
//! targets the core. Such actions are dispatched here in-process by selector
//! via [`apply_self_call`].

use common::{ActionGuardClient, ActionInfo, GovernanceError, StrategyClient};
use soroban_sdk::{
    log, symbol_short, Address, Env, IntoVal, InvokeError, Symbol, TryFromVal, Val, Vec,
};

use crate::{events, state};

// ── Storage key prefixes ─────────────────────────────────────────────────────

const STRATEGY: Symbol = symbol_short!("STRAT");
const SCRIPT: Symbol = symbol_short!("SCRIPT");
const GUARD: Symbol = symbol_short!("GUARD");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Self-call selectors ──────────────────────────────────────────────────────

pub const FN_SET_STRATEGY: &str = "set_strategy_authorization";
pub const FN_SET_SCRIPT: &str = "set_script_authorization";
pub const FN_SET_GUARD: &str = "set_guard";

// ── Strategies ───────────────────────────────────────────────────────────────

pub(crate) fn is_strategy_authorized(env: &Env, strategy: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&(STRATEGY, strategy.clone()))
        .unwrap_or(false)
}

/// Authorize or revoke `strategy`. An authorized strategy must be bound to
/// this core.
pub(crate) fn set_strategy(
    env: &Env,
    strategy: &Address,
    authorized: bool,
) -> Result<(), GovernanceError> {
    if authorized {
        let bound = state::forward(env, StrategyClient::new(env, strategy).try_get_core())?;
        if bound != env.current_contract_address() {
            return Err(GovernanceError::UnauthorizedStrategyLogic);
        }
    }
    let key = (STRATEGY, strategy.clone());
    env.storage().persistent().set(&key, &authorized);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    events::publish_strategy_authorization(env, strategy, authorized);
    Ok(())
}

// ── Scripts ──────────────────────────────────────────────────────────────────

pub(crate) fn is_script_authorized(env: &Env, script: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&(SCRIPT, script.clone()))
        .unwrap_or(false)
}

pub(crate) fn set_script(
    env: &Env,
    policy: &Address,
    script: &Address,
    authorized: bool,
) -> Result<(), GovernanceError> {
    if *script == env.current_contract_address() || script == policy {
        return Err(GovernanceError::RestrictedAddress);
    }
    let key = (SCRIPT, script.clone());
    env.storage().persistent().set(&key, &authorized);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    events::publish_script_authorization(env, script, authorized);
    Ok(())
}

// ── Guards ───────────────────────────────────────────────────────────────────

fn guard_key(target: &Address, selector: &Symbol) -> (Symbol, Address, Symbol) {
    (GUARD, target.clone(), selector.clone())
}

pub(crate) fn guard(env: &Env, target: &Address, selector: &Symbol) -> Option<Address> {
    env.storage().persistent().get(&guard_key(target, selector))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GuardHook {
    Creation,
    PreExecution,
    PostExecution,
}

/// Run `hook` on the guard registered for the action's call, if any.
///
/// A `GovernanceError` from the guard is returned unchanged. Any other
/// failure becomes `InvalidActionGuard` with the cause in the diagnostic log.
pub(crate) fn run_guard(
    env: &Env,
    hook: GuardHook,
    info: &ActionInfo,
) -> Result<(), GovernanceError> {
    let address = match guard(env, &info.target, &info.data.selector) {
        Some(address) => address,
        None => return Ok(()),
    };
    let client = ActionGuardClient::new(env, &address);
    let result = match hook {
        GuardHook::Creation => client.try_validate_action_creation(info),
        GuardHook::PreExecution => client.try_validate_pre_action_execution(info),
        GuardHook::PostExecution => client.try_validate_post_action_execution(info),
    };
    match result {
        Ok(Ok(())) => Ok(()),
        Err(Ok(reason)) => Err(reason),
        Ok(Err(_)) => {
            log!(env, "guard returned an undecodable value", address);
            Err(GovernanceError::InvalidActionGuard)
        }
        Err(Err(InvokeError::Contract(code))) => {
            log!(env, "guard error", address, code);
            Err(GovernanceError::InvalidActionGuard)
        }
        Err(Err(InvokeError::Abort)) => {
            log!(env, "guard trapped", address);
            Err(GovernanceError::InvalidActionGuard)
        }
    }
}

/// Set or clear (`None`) the guard for `selector` on `target`.
pub(crate) fn set_guard(
    env: &Env,
    target: &Address,
    selector: &Symbol,
    guard: &Option<Address>,
) -> Result<(), GovernanceError> {
    if *target == env.current_contract_address() {
        return Err(GovernanceError::RestrictedAddress);
    }
    let key = guard_key(target, selector);
    match guard {
        Some(address) => {
            env.storage().persistent().set(&key, address);
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
        None => env.storage().persistent().remove(&key),
    }
    events::publish_guard_set(env, target, selector, guard);
    Ok(())
}

// ── Self-call dispatch ───────────────────────────────────────────────────────

fn arg<T: TryFromVal<Env, Val>>(
    env: &Env,
    args: &Vec<Val>,
    index: u32,
) -> Result<T, GovernanceError> {
    let raw = args.get(index).ok_or(GovernanceError::InvalidInput)?;
    T::try_from_val(env, &raw).map_err(|_| GovernanceError::InvalidInput)
}

/// Run an admin operation addressed to the core by an executed action.
pub(crate) fn apply_self_call(
    env: &Env,
    policy: &Address,
    selector: &Symbol,
    args: &Vec<Val>,
) -> Result<Val, GovernanceError> {
    if *selector == Symbol::new(env, FN_SET_STRATEGY) {
        let strategy: Address = arg(env, args, 0)?;
        let authorized: bool = arg(env, args, 1)?;
        set_strategy(env, &strategy, authorized)?;
    } else if *selector == Symbol::new(env, FN_SET_SCRIPT) {
        let script: Address = arg(env, args, 0)?;
        let authorized: bool = arg(env, args, 1)?;
        set_script(env, policy, &script, authorized)?;
    } else if *selector == Symbol::new(env, FN_SET_GUARD) {
        let target: Address = arg(env, args, 0)?;
        let guarded: Symbol = arg(env, args, 1)?;
        let guard: Option<Address> = arg(env, args, 2)?;
        set_guard(env, &target, &guarded, &guard)?;
    } else {
        log!(env, "unknown self-call", selector.clone());
        return Err(GovernanceError::UnknownSelfCall);
    }
    Ok(().into_val(env))
}
