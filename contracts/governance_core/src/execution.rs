//! Action dispatch.
//!
//! ## Call kinds
//! - **Self-call**: `target` is the core; handled in-process by
//!   [`registry::apply_self_call`].
//! - **Script**: `target` is an authorized script. The script is invoked as
//!   a planner returning `Vec<ScriptCall>`, and the core performs each
//!   planned call in its own context. The result is the `Vec<Val>` of
//!   planned-call results.
//! - **Plain call**: anything else. `value` of the native token is
//!   transferred to the target first.
//!
//! Any failed call aborts the whole execution with `FailedActionExecution`.
//! A contract error crosses the host boundary as a bare `u32` code and a
//! failed invocation drops its contract events, so the callee's code is
//! reported as an `"action call failed"` diagnostic log entry holding the
//! target and the code. A trap is logged as `"action call trapped"`.

use common::{ActionInfo, CallData, GovernanceError, ScriptCall};
use soroban_sdk::{log, token, Address, Env, IntoVal, InvokeError, Val, Vec};

use crate::registry;

pub(crate) fn dispatch(
    env: &Env,
    policy: &Address,
    native_token: &Address,
    info: &ActionInfo,
) -> Result<Val, GovernanceError> {
    if registry::is_script_authorized(env, &info.target) {
        return run_script(env, policy, native_token, info);
    }
    perform(env, policy, native_token, &info.target, info.value, &info.data)
}

fn run_script(
    env: &Env,
    policy: &Address,
    native_token: &Address,
    info: &ActionInfo,
) -> Result<Val, GovernanceError> {
    let planned = env.try_invoke_contract::<Vec<ScriptCall>, GovernanceError>(
        &info.target,
        &info.data.selector,
        info.data.args.clone(),
    );
    let plan = match planned {
        Ok(Ok(plan)) => plan,
        Ok(Err(_)) => {
            log!(env, "script returned an invalid plan", info.id);
            return Err(GovernanceError::FailedActionExecution);
        }
        Err(Ok(err)) => {
            log_invoke_error(env, &info.target, InvokeError::Contract(err as u32));
            return Err(GovernanceError::FailedActionExecution);
        }
        Err(Err(err)) => {
            log_invoke_error(env, &info.target, err);
            return Err(GovernanceError::FailedActionExecution);
        }
    };

    let mut results: Vec<Val> = Vec::new(env);
    for call in plan.iter() {
        let result = perform(env, policy, native_token, &call.target, call.value, &call.data)?;
        results.push_back(result);
    }
    Ok(results.into_val(env))
}

fn perform(
    env: &Env,
    policy: &Address,
    native_token: &Address,
    target: &Address,
    value: i128,
    data: &CallData,
) -> Result<Val, GovernanceError> {
    if *target == env.current_contract_address() {
        return registry::apply_self_call(env, policy, &data.selector, &data.args);
    }
    if value < 0 {
        return Err(GovernanceError::InvalidInput);
    }
    if value > 0 {
        token::Client::new(env, native_token).transfer(
            &env.current_contract_address(),
            target,
            &value,
        );
    }

    let called =
        env.try_invoke_contract::<Val, GovernanceError>(target, &data.selector, data.args.clone());
    match called {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(_)) => {
            log!(env, "action call returned an undecodable value", target.clone());
            Err(GovernanceError::FailedActionExecution)
        }
        Err(Ok(err)) => {
            log_invoke_error(env, target, InvokeError::Contract(err as u32));
            Err(GovernanceError::FailedActionExecution)
        }
        Err(Err(err)) => {
            log_invoke_error(env, target, err);
            Err(GovernanceError::FailedActionExecution)
        }
    }
}

fn log_invoke_error(env: &Env, target: &Address, err: InvokeError) {
    match err {
        InvokeError::Contract(code) => log!(env, "action call failed", target.clone(), code),
        InvokeError::Abort => log!(env, "action call trapped", target.clone()),
    }
}
