//! # Governance Contract Testing Framework
//!
//! A reusable testing harness for the governance core and its quorum
//! strategy, supporting property-based testing, invariant checking, state
//! exploration, and a declarative scenario DSL.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs             : TestEnv, GovernanceHarness, snapshots
//! ├── generators.rs      : property-based value and operation generators
//! ├── invariants.rs      : action invariants and transition checks
//! ├── state_explorer.rs  : systematic lifecycle exploration
//! └── scenario_dsl.rs    : declarative scenario builder
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use test_framework::{GovernanceHarness, GovernanceParams, TestEnv};
//!
//! let mut env = TestEnv::new();
//! let h = GovernanceHarness::new(&mut env, GovernanceParams::default());
//! let info = h.create_ping(7);
//! h.approve_n(&info, 2);
//! ```

extern crate std;

pub mod invariants;

use common::testutils::{MockPolicy, MockPolicyClient, MockTarget, MockTargetClient};
use common::{
    Action, ActionInfo, ActionState, CallData, QuorumRule, RelativeQuorum, StrategyConfig,
};
use governance_core::{GovernanceCore, GovernanceCoreClient};
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    vec, Address, Env, IntoVal, String, Symbol, Val, Vec,
};
use strategy::{QuorumStrategy, QuorumStrategyClient};

// ── Roles and clock ──────────────────────────────────────────────────────────

pub const CREATOR_ROLE: u32 = 1;
pub const APPROVER_ROLE: u32 = 2;
pub const DISAPPROVER_ROLE: u32 = 3;
pub const FORCE_ROLE: u32 = 4;

pub const DAY: u64 = 86_400;
/// Ledger timestamp every harness starts at.
pub const GENESIS: u64 = 10_000;

// ── Core Test Environment ────────────────────────────────────────────────────

/// A high-level test environment that wraps the Soroban `Env` and provides
/// contract deployment, time control, and address management.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    /// Generate a fresh Soroban address.
    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    /// Generate `n` distinct addresses.
    pub fn generate_addresses(&mut self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| self.generate_address()).collect()
    }

    /// Every address generated so far, in order.
    pub fn addresses(&self) -> &[Address] {
        &self.generated_addresses
    }

    /// Set the ledger timestamp.
    pub fn set_timestamp(&self, ts: u64) {
        self.env.ledger().set_timestamp(ts);
    }

    /// Advance the ledger timestamp by `delta` seconds.
    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }

    /// Current ledger timestamp.
    pub fn timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    /// Deploy a SAC token to serve as the native value token.
    pub fn deploy_native_token(&self) -> Address {
        self.env
            .register_stellar_asset_contract_v2(Address::generate(&self.env))
            .address()
    }

    /// Mint tokens from a SAC token to a recipient.
    pub fn mint_tokens(&self, token: &Address, recipient: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, token).mint(recipient, &amount);
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ── Governance Harness ───────────────────────────────────────────────────────

/// Strategy and membership parameters for a [`GovernanceHarness`].
#[derive(Debug, Clone)]
pub struct GovernanceParams {
    pub approval_period: u64,
    pub queuing_period: u64,
    pub expiration_period: u64,
    pub fixed_length: bool,
    pub quorum: QuorumRule,
    pub approvers: usize,
    pub disapprovers: usize,
}

impl Default for GovernanceParams {
    /// Two-day fixed window, one-day queue, three-day grace, 60% approval,
    /// 50% disapproval and three holders of each role.
    fn default() -> Self {
        Self {
            approval_period: 2 * DAY,
            queuing_period: DAY,
            expiration_period: 3 * DAY,
            fixed_length: true,
            quorum: QuorumRule::Relative(RelativeQuorum {
                min_approval_pct: 6_000,
                min_disapproval_pct: 5_000,
            }),
            approvers: 3,
            disapprovers: 3,
        }
    }
}

/// Pre-wired governance fixture: policy, core, one bound strategy, a native
/// token and a call target the creator may `ping`.
pub struct GovernanceHarness<'a> {
    pub env: &'a mut TestEnv,
    pub core: GovernanceCoreClient<'static>,
    pub policy: MockPolicyClient<'static>,
    pub strategy: QuorumStrategyClient<'static>,
    pub target: MockTargetClient<'static>,
    pub native_token: Address,
    pub creator: Address,
    pub approvers: std::vec::Vec<Address>,
    pub disapprovers: std::vec::Vec<Address>,
    pub forcer: Address,
    pub params: GovernanceParams,
}

impl<'a> GovernanceHarness<'a> {
    /// Deploy and wire every contract. Each approver and disapprover gets
    /// weight 1, the forcer holds the force role for both directions.
    pub fn new(env: &'a mut TestEnv, params: GovernanceParams) -> Self {
        env.set_timestamp(GENESIS);

        let policy_id = env.env.register(MockPolicy, ());
        let policy = MockPolicyClient::new(&env.env, &policy_id);

        let creator = env.generate_address();
        policy.set_role_weight(&creator, &CREATOR_ROLE, &1);
        let approvers = env.generate_addresses(params.approvers);
        for a in &approvers {
            policy.set_role_weight(a, &APPROVER_ROLE, &1);
        }
        let disapprovers = env.generate_addresses(params.disapprovers);
        for d in &disapprovers {
            policy.set_role_weight(d, &DISAPPROVER_ROLE, &1);
        }
        let forcer = env.generate_address();
        policy.set_role_weight(&forcer, &FORCE_ROLE, &1);

        let native_token = env.deploy_native_token();

        let core_id = env.env.register(GovernanceCore, ());
        let core = GovernanceCoreClient::new(&env.env, &core_id);

        let strategy_id = env.env.register(QuorumStrategy, ());
        let strategy = QuorumStrategyClient::new(&env.env, &strategy_id);
        strategy.initialize(&core_id, &policy_id, &Self::strategy_config(&env.env, &params));

        core.initialize(
            &policy_id,
            &native_token,
            &vec![&env.env, strategy_id],
            &Vec::new(&env.env),
        );

        let target_id = env.env.register(MockTarget, ());
        let target = MockTargetClient::new(&env.env, &target_id);

        let harness = Self {
            env,
            core,
            policy,
            strategy,
            target,
            native_token,
            creator,
            approvers,
            disapprovers,
            forcer,
            params,
        };
        harness.grant(&harness.target.address, &symbol_short!("ping"));
        harness
    }

    fn strategy_config(env: &Env, params: &GovernanceParams) -> StrategyConfig {
        StrategyConfig {
            approval_period: params.approval_period,
            queuing_period: params.queuing_period,
            expiration_period: params.expiration_period,
            fixed_length_approval_period: params.fixed_length,
            approval_role: APPROVER_ROLE,
            disapproval_role: DISAPPROVER_ROLE,
            force_approval_roles: vec![env, FORCE_ROLE],
            force_disapproval_roles: vec![env, FORCE_ROLE],
            quorum: params.quorum.clone(),
        }
    }

    /// Allow the creator to create actions calling `target.selector`.
    pub fn grant(&self, target: &Address, selector: &Symbol) {
        let permission = self
            .core
            .permission_id(target, selector, &self.strategy.address);
        self.policy
            .set_permission(&self.creator, &CREATOR_ROLE, &permission, &true);
    }

    /// Change `holder`'s weight for `role` from now on.
    pub fn set_weight(&self, holder: &Address, role: u32, weight: u128) {
        self.policy.set_role_weight(holder, &role, &weight);
    }

    pub fn ping_data(&self, x: u32) -> CallData {
        CallData {
            selector: symbol_short!("ping"),
            args: vec![&self.env.env, x.into_val(&self.env.env)],
        }
    }

    pub fn reason(&self) -> String {
        String::from_str(&self.env.env, "")
    }

    /// The identifying tuple the core hashed for action `id`.
    pub fn info_for(&self, id: u64, target: &Address, value: i128, data: &CallData) -> ActionInfo {
        ActionInfo {
            id,
            creator: self.creator.clone(),
            strategy: self.strategy.address.clone(),
            target: target.clone(),
            value,
            data: data.clone(),
        }
    }

    // ── Lifecycle operations ────────────────────────────────────────────────

    pub fn create(&self, target: &Address, value: i128, data: CallData) -> ActionInfo {
        let id = self.core.create_action(
            &self.creator,
            &CREATOR_ROLE,
            &self.strategy.address,
            target,
            &value,
            &data,
            &String::from_str(&self.env.env, "harness action"),
        );
        self.info_for(id, target, value, &data)
    }

    /// Create an action calling `target.ping(x)`.
    pub fn create_ping(&self, x: u32) -> ActionInfo {
        let target = self.target.address.clone();
        self.create(&target, 0, self.ping_data(x))
    }

    pub fn approve(&self, info: &ActionInfo, voter: &Address) -> u128 {
        self.core
            .cast_approval(voter, &APPROVER_ROLE, info, &self.reason())
    }

    /// Approve with the first `n` approvers.
    pub fn approve_n(&self, info: &ActionInfo, n: usize) {
        for a in self.approvers.iter().take(n) {
            self.approve(info, a);
        }
    }

    pub fn disapprove(&self, info: &ActionInfo, voter: &Address) -> u128 {
        self.core
            .cast_disapproval(voter, &DISAPPROVER_ROLE, info, &self.reason())
    }

    /// Disapprove with the first `n` disapprovers.
    pub fn disapprove_n(&self, info: &ActionInfo, n: usize) {
        for d in self.disapprovers.iter().take(n) {
            self.disapprove(info, d);
        }
    }

    pub fn queue(&self, info: &ActionInfo) -> u64 {
        self.core.queue_action(&self.creator, info)
    }

    pub fn execute(&self, info: &ActionInfo) -> Val {
        self.core.execute_action(&self.creator, info, &info.value)
    }

    pub fn cancel(&self, info: &ActionInfo) {
        self.core.cancel_action(&self.creator, info);
    }

    pub fn state(&self, info: &ActionInfo) -> ActionState {
        self.core.get_action_state(info)
    }

    pub fn record(&self, id: u64) -> Option<Action> {
        self.core.get_action(&id)
    }

    /// Move past the end of the approval window.
    pub fn close_approval_window(&self) {
        self.env.advance_time(self.params.approval_period + 1);
    }

    /// Move past the queuing timelock.
    pub fn wait_for_timelock(&self) {
        self.env.advance_time(self.params.queuing_period);
    }

    /// Approve with a quorum, close the window and queue.
    pub fn approve_and_queue(&self, info: &ActionInfo) -> u64 {
        self.approve_n(info, self.approvers.len());
        self.close_approval_window();
        self.queue(info)
    }

    /// Give the core `amount` of the native token.
    pub fn fund_core(&self, amount: i128) {
        self.env
            .mint_tokens(&self.native_token, &self.core.address, amount);
    }

    /// Snapshot of every tracked action for invariant checking.
    pub fn snapshot(&self, infos: &[ActionInfo]) -> GovernanceSnapshot {
        let actions = infos
            .iter()
            .filter_map(|info| {
                let record = self.record(info.id)?;
                let state = self.core.try_get_action_state(info).ok()?.ok()?;
                let approvals_cast = self
                    .approvers
                    .iter()
                    .chain(std::iter::once(&self.forcer))
                    .filter(|a| self.core.has_approved(&info.id, a))
                    .count();
                let disapprovals_cast = self
                    .disapprovers
                    .iter()
                    .chain(std::iter::once(&self.forcer))
                    .filter(|d| self.core.has_disapproved(&info.id, d))
                    .count();
                Some(ActionSnapshot {
                    info: info.clone(),
                    record,
                    state,
                    approvals_cast,
                    disapprovals_cast,
                })
            })
            .collect();

        GovernanceSnapshot {
            timestamp: self.env.timestamp(),
            action_count: self.core.action_count(),
            actions,
        }
    }
}

/// Observable state of one action at a point in time.
#[derive(Debug, Clone)]
pub struct ActionSnapshot {
    pub info: ActionInfo,
    pub record: Action,
    pub state: ActionState,
    pub approvals_cast: usize,
    pub disapprovals_cast: usize,
}

/// Immutable snapshot of the core's tracked actions at a point in time.
#[derive(Debug, Clone)]
pub struct GovernanceSnapshot {
    pub timestamp: u64,
    pub action_count: u64,
    pub actions: std::vec::Vec<ActionSnapshot>,
}

impl GovernanceSnapshot {
    pub fn find(&self, id: u64) -> Option<&ActionSnapshot> {
        self.actions.iter().find(|a| a.info.id == id)
    }

    /// Number of tracked actions currently in `state`.
    pub fn count_in(&self, state: ActionState) -> usize {
        self.actions.iter().filter(|a| a.state == state).count()
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

/// Result of a single test operation, used by the state explorer and scenario DSL.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// The operation succeeded.
    Ok,
    /// The operation failed with a contract error code.
    ExpectedError(u32),
    /// The operation failed in the host or with an undecodable error.
    UnexpectedError(std::string::String),
}

/// Summary of a test run with coverage metrics.
#[derive(Debug, Clone)]
pub struct TestRunSummary {
    pub actions_executed: usize,
    pub invariant_checks: usize,
    pub invariant_violations: std::vec::Vec<std::string::String>,
    pub entry_points_hit: std::collections::HashSet<std::string::String>,
    pub transitions_observed: usize,
}

impl TestRunSummary {
    pub fn new() -> Self {
        Self {
            actions_executed: 0,
            invariant_checks: 0,
            invariant_violations: std::vec::Vec::new(),
            entry_points_hit: std::collections::HashSet::new(),
            transitions_observed: 0,
        }
    }

    /// True when no invariant violations were detected.
    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    /// Coverage ratio: entry points hit / total known entry points.
    pub fn entry_point_coverage(&self, total_entry_points: usize) -> f64 {
        if total_entry_points == 0 {
            return 0.0;
        }
        self.entry_points_hit.len() as f64 / total_entry_points as f64
    }
}

impl Default for TestRunSummary {
    fn default() -> Self {
        Self::new()
    }
}
