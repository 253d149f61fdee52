#![allow(deprecated)] // events().publish migration to #[contractevent] tracked separately

use common::StrategyConfig;
use soroban_sdk::{symbol_short, Address, Env};

pub fn publish_strategy_initialized(
    env: &Env,
    core: &Address,
    policy: &Address,
    config: &StrategyConfig,
) {
    env.events().publish(
        (symbol_short!("STR_INIT"), core.clone()),
        (policy.clone(), config.clone()),
    );
}

pub fn publish_supplies_snapshotted(env: &Env, action_id: u64, approval: u128, disapproval: u128) {
    env.events().publish(
        (symbol_short!("STR_SNAP"), action_id),
        (approval, disapproval),
    );
}
