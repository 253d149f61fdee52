#![no_main]

use arbitrary::Arbitrary;
use common::testutils::{MockPolicy, MockPolicyClient, MockTarget};
use common::{ActionInfo, ActionState, CallData, QuorumRule, RelativeQuorum, StrategyConfig};
use governance_core::{GovernanceCore, GovernanceCoreClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger},
    vec, Address, Env, IntoVal, String, Vec,
};
use strategy::{QuorumStrategy, QuorumStrategyClient};

const CREATOR: u32 = 1;
const APPROVER: u32 = 2;
const DISAPPROVER: u32 = 3;
const FORCE: u32 = 4;

/// Operations modelling every lifecycle entry point plus clock and weight
/// changes.
///
/// Indices select from the pools by modular indexing so most inputs reach
/// real state transitions instead of trivially missing actions.
#[derive(Arbitrary, Debug)]
pub enum FuzzOp {
    Create { x: u8 },
    Approve { action: u8, voter: u8 },
    Disapprove { action: u8, voter: u8 },
    ForceApprove { action: u8 },
    ForceDisapprove { action: u8 },
    Queue { action: u8 },
    Execute { action: u8 },
    Cancel { action: u8, by_creator: bool },
    SetWeight { voter: u8, weight: u16 },
    AdvanceTime { delta: u32 },
}

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    approval_period: u16,
    queuing_period: u16,
    expiration_period: u16,
    fixed_length: bool,
    min_approval_pct: u16,
    min_disapproval_pct: u16,
    ops: std::vec::Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(10_000);

    let policy_id = env.register(MockPolicy, ());
    let policy = MockPolicyClient::new(&env, &policy_id);
    let creator = Address::generate(&env);
    policy.set_role_weight(&creator, &CREATOR, &1);
    let voters: std::vec::Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    for v in &voters {
        policy.set_role_weight(v, &APPROVER, &1);
        policy.set_role_weight(v, &DISAPPROVER, &1);
    }
    let forcer = Address::generate(&env);
    policy.set_role_weight(&forcer, &FORCE, &1);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let core_id = env.register(GovernanceCore, ());
    let core = GovernanceCoreClient::new(&env, &core_id);
    let strategy_id = env.register(QuorumStrategy, ());

    let config = StrategyConfig {
        approval_period: u64::from(input.approval_period).max(1),
        queuing_period: u64::from(input.queuing_period),
        expiration_period: u64::from(input.expiration_period),
        fixed_length_approval_period: input.fixed_length,
        approval_role: APPROVER,
        disapproval_role: DISAPPROVER,
        force_approval_roles: vec![&env, FORCE],
        force_disapproval_roles: vec![&env, FORCE],
        quorum: QuorumRule::Relative(RelativeQuorum {
            min_approval_pct: u32::from(input.min_approval_pct),
            min_disapproval_pct: u32::from(input.min_disapproval_pct),
        }),
    };
    if QuorumStrategyClient::new(&env, &strategy_id)
        .try_initialize(&core_id, &policy_id, &config)
        .is_err()
    {
        return;
    }
    core.initialize(&policy_id, &token, &vec![&env, strategy_id.clone()], &Vec::new(&env));

    let target = env.register(MockTarget, ());
    let ping = symbol_short!("ping");
    let permission = core.permission_id(&target, &ping, &strategy_id);
    policy.set_permission(&creator, &CREATOR, &permission, &true);

    let reason = String::from_str(&env, "");
    let mut actions: std::vec::Vec<ActionInfo> = std::vec::Vec::new();
    let pick = |actions: &[ActionInfo], i: u8| -> Option<ActionInfo> {
        if actions.is_empty() {
            None
        } else {
            actions.get(usize::from(i) % actions.len()).cloned()
        }
    };

    for op in input.ops.into_iter().take(64) {
        let touched = match op {
            FuzzOp::Create { x } => {
                let data = CallData {
                    selector: ping.clone(),
                    args: vec![&env, u32::from(x).into_val(&env)],
                };
                if let Ok(Ok(id)) = core.try_create_action(
                    &creator,
                    &CREATOR,
                    &strategy_id,
                    &target,
                    &0,
                    &data,
                    &reason,
                ) {
                    actions.push(ActionInfo {
                        id,
                        creator: creator.clone(),
                        strategy: strategy_id.clone(),
                        target: target.clone(),
                        value: 0,
                        data,
                    });
                }
                None
            }
            FuzzOp::Approve { action, voter } => pick(&actions, action).map(|info| {
                let v = &voters[usize::from(voter) % voters.len()];
                let _ = core.try_cast_approval(v, &APPROVER, &info, &reason);
                info
            }),
            FuzzOp::Disapprove { action, voter } => pick(&actions, action).map(|info| {
                let v = &voters[usize::from(voter) % voters.len()];
                let _ = core.try_cast_disapproval(v, &DISAPPROVER, &info, &reason);
                info
            }),
            FuzzOp::ForceApprove { action } => pick(&actions, action).map(|info| {
                let _ = core.try_cast_approval(&forcer, &FORCE, &info, &reason);
                info
            }),
            FuzzOp::ForceDisapprove { action } => pick(&actions, action).map(|info| {
                let _ = core.try_cast_disapproval(&forcer, &FORCE, &info, &reason);
                info
            }),
            FuzzOp::Queue { action } => pick(&actions, action).map(|info| {
                let _ = core.try_queue_action(&creator, &info);
                info
            }),
            FuzzOp::Execute { action } => pick(&actions, action).map(|info| {
                let _ = core.try_execute_action(&creator, &info, &0);
                info
            }),
            FuzzOp::Cancel { action, by_creator } => pick(&actions, action).map(|info| {
                let caller = if by_creator { &creator } else { &voters[0] };
                let _ = core.try_cancel_action(caller, &info);
                info
            }),
            FuzzOp::SetWeight { voter, weight } => {
                let v = &voters[usize::from(voter) % voters.len()];
                policy.set_role_weight(v, &APPROVER, &u128::from(weight));
                None
            }
            FuzzOp::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(u64::from(delta));
                env.ledger().set_timestamp(ts);
                None
            }
        };

        // ── Post-op invariant checks ──
        if let Some(info) = touched {
            let Some(record) = core.get_action(&info.id) else {
                panic!("INVARIANT VIOLATION: tracked action {} vanished", info.id);
            };
            assert!(
                !(record.executed && record.canceled),
                "INVARIANT VIOLATION: action {} executed and canceled",
                info.id
            );
            let state = core.get_action_state(&info);
            if record.canceled {
                assert_eq!(state, ActionState::Canceled);
            } else if record.executed {
                assert_eq!(state, ActionState::Executed);
            }
            if matches!(state, ActionState::Queued | ActionState::Expired) {
                assert!(
                    record.min_execution_time != 0,
                    "INVARIANT VIOLATION: {:?} action {} was never queued",
                    state,
                    info.id
                );
            }
        }
        assert_eq!(core.action_count(), actions.len() as u64);
    }
});
