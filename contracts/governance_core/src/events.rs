#![allow(deprecated)] // events().publish migration to #[contractevent] tracked separately

//! Structured event publishing for the governance core.

use common::{ActionInfo, CallData};
use soroban_sdk::{symbol_short, Address, BytesN, Env, String, Symbol, Val};

#[allow(clippy::too_many_arguments)]
pub fn publish_action_created(
    env: &Env,
    id: u64,
    creator: &Address,
    role: u32,
    strategy: &Address,
    target: &Address,
    value: i128,
    data: &CallData,
    description: &String,
) {
    env.events().publish(
        (symbol_short!("ACT_NEW"), id),
        (
            creator.clone(),
            role,
            strategy.clone(),
            target.clone(),
            value,
            data.clone(),
            description.clone(),
        ),
    );
}

pub fn publish_action_canceled(env: &Env, id: u64, caller: &Address) {
    env.events()
        .publish((symbol_short!("ACT_CNCL"), id), caller.clone());
}

pub fn publish_action_queued(
    env: &Env,
    info: &ActionInfo,
    caller: &Address,
    min_execution_time: u64,
) {
    env.events().publish(
        (symbol_short!("ACT_QUE"), info.id),
        (caller.clone(), info.strategy.clone(), info.creator.clone(), min_execution_time),
    );
}

pub fn publish_action_executed(env: &Env, info: &ActionInfo, caller: &Address, result: &Val) {
    env.events().publish(
        (symbol_short!("ACT_EXE"), info.id),
        (caller.clone(), info.strategy.clone(), info.creator.clone(), *result),
    );
}

pub fn publish_approval_cast(
    env: &Env,
    id: u64,
    policyholder: &Address,
    role: u32,
    quantity: u128,
    reason: &String,
) {
    env.events().publish(
        (symbol_short!("APPR_CST"), id),
        (policyholder.clone(), role, quantity, reason.clone()),
    );
}

pub fn publish_disapproval_cast(
    env: &Env,
    id: u64,
    policyholder: &Address,
    role: u32,
    quantity: u128,
    reason: &String,
) {
    env.events().publish(
        (symbol_short!("DISP_CST"), id),
        (policyholder.clone(), role, quantity, reason.clone()),
    );
}

pub fn publish_strategy_authorization(env: &Env, strategy: &Address, authorized: bool) {
    env.events()
        .publish((symbol_short!("STRAT_AU"),), (strategy.clone(), authorized));
}

pub fn publish_script_authorization(env: &Env, script: &Address, authorized: bool) {
    env.events()
        .publish((symbol_short!("SCRPT_AU"),), (script.clone(), authorized));
}

pub fn publish_guard_set(env: &Env, target: &Address, selector: &Symbol, guard: &Option<Address>) {
    env.events().publish(
        (symbol_short!("GUARD_SET"), target.clone()),
        (selector.clone(), guard.clone()),
    );
}

pub fn publish_signer_key_set(env: &Env, policyholder: &Address, key: &BytesN<65>) {
    env.events()
        .publish((symbol_short!("SIGNER"),), (policyholder.clone(), key.clone()));
}

pub fn publish_nonce_incremented(env: &Env, policyholder: &Address, selector: &Symbol, nonce: u64) {
    env.events().publish(
        (symbol_short!("NONCE"), policyholder.clone()),
        (selector.clone(), nonce),
    );
}
