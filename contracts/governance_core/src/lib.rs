#![no_std]

//! # Governance Core
//!
//! The action lifecycle of a governance instance:
//!
//! - **Creation**: a policyholder with the permission for
//!   `(target, selector, strategy)` proposes a call; only a commitment to the
//!   action info is stored
//! - **Casting**: weighted approvals while `Active`, disapprovals while
//!   `Queued`, always at the weight held at creation time
//! - **Queuing**: an `Approved` action is given its earliest execution time
//! - **Execution**: guarded dispatch as a plain call, a script plan or an
//!   admin self-call
//! - **Cancelation**: eligibility decided by the action's strategy
//! - **Signed variants**: creation and casting authorised by a recoverable
//!   secp256k1 signature with per-operation nonces
//!
//! Strategy, script and guard registries can only be changed by an executed
//! action that targets the core itself.

pub mod action;
pub mod casting;
pub mod events;
pub mod execution;
pub mod registry;
pub mod signature;
pub mod state;

use common::{
    info_hash, Action, ActionInfo, ActionState, CallData, CastRequest,
    CreateActionRequest, GovernanceError, PolicyClient, SignedBody, StrategyClient,
};
use soroban_sdk::{
    contract, contractimpl, symbol_short, token, Address, BytesN, Env, String, Symbol, Val, Vec,
};

use casting::CastKind;
use registry::GuardHook;

// ── Storage key constants ─────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const POLICY: Symbol = symbol_short!("POLICY");
const NATIVE_TOKEN: Symbol = symbol_short!("NATIVE");

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct GovernanceCore;

#[contractimpl]
impl GovernanceCore {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Bootstrap the core.
    ///
    /// * `policy`: role ledger queried for permissions and weights.
    /// * `native_token`: token contract used for action `value`.
    /// * `strategies`: strategies authorized from the start; each must
    ///   already be bound to this core.
    /// * `scripts`: scripts authorized from the start.
    pub fn initialize(
        env: Env,
        policy: Address,
        native_token: Address,
        strategies: Vec<Address>,
        scripts: Vec<Address>,
    ) -> Result<(), GovernanceError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(GovernanceError::AlreadyInitialized);
        }

        env.storage().instance().set(&POLICY, &policy);
        env.storage().instance().set(&NATIVE_TOKEN, &native_token);
        env.storage().instance().set(&INITIALIZED, &true);

        for strategy in strategies.iter() {
            registry::set_strategy(&env, &strategy, true)?;
        }
        for script in scripts.iter() {
            registry::set_script(&env, &policy, &script, true)?;
        }
        Ok(())
    }

    // ── Action creation ───────────────────────────────────────────────────────

    /// Create an action and return its id.
    #[allow(clippy::too_many_arguments)]
    pub fn create_action(
        env: Env,
        policyholder: Address,
        role: u32,
        strategy: Address,
        target: Address,
        value: i128,
        data: CallData,
        description: String,
    ) -> Result<u64, GovernanceError> {
        Self::require_initialized(&env)?;
        policyholder.require_auth();

        let request = CreateActionRequest {
            policyholder,
            role,
            strategy,
            target,
            value,
            data,
            description,
        };
        Self::create(&env, &request)
    }

    /// [`Self::create_action`] authorised by the policyholder's signature
    /// over [`Self::create_action_digest`].
    pub fn create_action_by_sig(
        env: Env,
        request: CreateActionRequest,
        signature: BytesN<65>,
    ) -> Result<u64, GovernanceError> {
        Self::require_initialized(&env)?;
        let body = SignedBody::CreateAction(request.clone());
        signature::verify(&env, &request.policyholder, &body, &signature)?;
        Self::create(&env, &request)
    }

    // ── Casting ───────────────────────────────────────────────────────────────

    /// Approve an `Active` action. Returns the quantity cast.
    pub fn cast_approval(
        env: Env,
        policyholder: Address,
        role: u32,
        info: ActionInfo,
        reason: String,
    ) -> Result<u128, GovernanceError> {
        let policy = Self::policy(&env)?;
        policyholder.require_auth();
        casting::cast(
            &env,
            &policy,
            CastKind::Approval,
            &policyholder,
            role,
            &info,
            &reason,
        )
    }

    pub fn cast_approval_by_sig(
        env: Env,
        request: CastRequest,
        signature: BytesN<65>,
    ) -> Result<u128, GovernanceError> {
        let policy = Self::policy(&env)?;
        let body = SignedBody::CastApproval(request.clone());
        signature::verify(&env, &request.policyholder, &body, &signature)?;
        casting::cast(
            &env,
            &policy,
            CastKind::Approval,
            &request.policyholder,
            request.role,
            &request.info,
            &request.reason,
        )
    }

    /// Disapprove a `Queued` action. Returns the quantity cast.
    pub fn cast_disapproval(
        env: Env,
        policyholder: Address,
        role: u32,
        info: ActionInfo,
        reason: String,
    ) -> Result<u128, GovernanceError> {
        let policy = Self::policy(&env)?;
        policyholder.require_auth();
        casting::cast(
            &env,
            &policy,
            CastKind::Disapproval,
            &policyholder,
            role,
            &info,
            &reason,
        )
    }

    pub fn cast_disapproval_by_sig(
        env: Env,
        request: CastRequest,
        signature: BytesN<65>,
    ) -> Result<u128, GovernanceError> {
        let policy = Self::policy(&env)?;
        let body = SignedBody::CastDisapproval(request.clone());
        signature::verify(&env, &request.policyholder, &body, &signature)?;
        casting::cast(
            &env,
            &policy,
            CastKind::Disapproval,
            &request.policyholder,
            request.role,
            &request.info,
            &request.reason,
        )
    }

    // ── Queue / execute / cancel ──────────────────────────────────────────────

    /// Queue an `Approved` action. Returns its minimum execution time.
    pub fn queue_action(env: Env, caller: Address, info: ActionInfo) -> Result<u64, GovernanceError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let mut record = action::load_verified(&env, &info)?;
        state::require(&env, &info, &record, ActionState::Approved)?;

        let strategy = StrategyClient::new(&env, &info.strategy);
        let min_execution_time =
            state::forward(&env, strategy.try_min_execution_time(&info, &record))?;
        // Zero marks "not queued".
        record.min_execution_time = min_execution_time.max(1);
        action::store(&env, info.id, &record);

        events::publish_action_queued(&env, &info, &caller, record.min_execution_time);
        Ok(record.min_execution_time)
    }

    /// Execute a matured `Queued` action and return the call's result.
    ///
    /// `value` of the native token is pulled from `caller` and must cover
    /// `info.value`.
    pub fn execute_action(
        env: Env,
        caller: Address,
        info: ActionInfo,
        value: i128,
    ) -> Result<Val, GovernanceError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        let policy = Self::policy(&env)?;
        let native_token = Self::native_token(&env)?;

        let mut record = action::load_verified(&env, &info)?;
        state::require(&env, &info, &record, ActionState::Queued)?;
        if env.ledger().timestamp() < record.min_execution_time {
            return Err(GovernanceError::TimelockNotFinished);
        }
        if value < 0 {
            return Err(GovernanceError::InvalidInput);
        }
        if value < info.value {
            return Err(GovernanceError::InsufficientMsgValue);
        }

        // Marked before any external call.
        record.executed = true;
        action::store(&env, info.id, &record);

        if value > 0 {
            token::Client::new(&env, &native_token).transfer(
                &caller,
                &env.current_contract_address(),
                &value,
            );
        }

        registry::run_guard(&env, GuardHook::PreExecution, &info)?;

        let result = execution::dispatch(&env, &policy, &native_token, &info)?;

        registry::run_guard(&env, GuardHook::PostExecution, &info)?;

        events::publish_action_executed(&env, &info, &caller, &result);
        Ok(result)
    }

    /// Cancel an action if its strategy allows `caller` to in the current
    /// state.
    pub fn cancel_action(env: Env, caller: Address, info: ActionInfo) -> Result<(), GovernanceError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let mut record = action::load_verified(&env, &info)?;
        let current = state::derive(&env, &info, &record)?;
        if current.is_terminal() {
            return Err(GovernanceError::CannotCancelInState);
        }

        let strategy = StrategyClient::new(&env, &info.strategy);
        state::forward(
            &env,
            strategy.try_validate_action_cancelation(&info, &record, &current, &caller),
        )?;

        record.canceled = true;
        action::store(&env, info.id, &record);
        events::publish_action_canceled(&env, info.id, &caller);
        Ok(())
    }

    // ── Admin (self-call only) ────────────────────────────────────────────────

    pub fn set_strategy_authorization(
        env: Env,
        caller: Address,
        strategy: Address,
        authorized: bool,
    ) -> Result<(), GovernanceError> {
        Self::require_core(&env, &caller)?;
        registry::set_strategy(&env, &strategy, authorized)
    }

    pub fn set_script_authorization(
        env: Env,
        caller: Address,
        script: Address,
        authorized: bool,
    ) -> Result<(), GovernanceError> {
        Self::require_core(&env, &caller)?;
        let policy = Self::policy(&env)?;
        registry::set_script(&env, &policy, &script, authorized)
    }

    pub fn set_guard(
        env: Env,
        caller: Address,
        target: Address,
        selector: Symbol,
        guard: Option<Address>,
    ) -> Result<(), GovernanceError> {
        Self::require_core(&env, &caller)?;
        registry::set_guard(&env, &target, &selector, &guard)
    }

    // ── Signer registry ───────────────────────────────────────────────────────

    /// Bind the uncompressed secp256k1 public key (`0x04 || x || y`) that
    /// `policyholder`'s signed requests must recover to.
    pub fn set_signer_key(env: Env, policyholder: Address, key: BytesN<65>) {
        policyholder.require_auth();
        signature::set_signer_key(&env, &policyholder, &key);
    }

    pub fn get_signer_key(env: Env, policyholder: Address) -> Option<BytesN<65>> {
        signature::signer_key(&env, &policyholder)
    }

    pub fn get_nonce(env: Env, policyholder: Address, selector: Symbol) -> u64 {
        signature::nonce(&env, &policyholder, &selector)
    }

    /// Invalidate any outstanding signature for `selector`. Returns the new
    /// nonce.
    pub fn increment_nonce(
        env: Env,
        policyholder: Address,
        selector: Symbol,
    ) -> Result<u64, GovernanceError> {
        policyholder.require_auth();
        signature::use_nonce(&env, &policyholder, &selector)?;
        Ok(signature::nonce(&env, &policyholder, &selector))
    }

    pub fn create_action_digest(env: Env, request: CreateActionRequest) -> BytesN<32> {
        let holder = request.policyholder.clone();
        signature::pending_digest(&env, &holder, &SignedBody::CreateAction(request))
    }

    pub fn cast_approval_digest(env: Env, request: CastRequest) -> BytesN<32> {
        let holder = request.policyholder.clone();
        signature::pending_digest(&env, &holder, &SignedBody::CastApproval(request))
    }

    pub fn cast_disapproval_digest(env: Env, request: CastRequest) -> BytesN<32> {
        let holder = request.policyholder.clone();
        signature::pending_digest(&env, &holder, &SignedBody::CastDisapproval(request))
    }

    // ── View functions ────────────────────────────────────────────────────────

    /// Current derived state. Fails with `InfoHashMismatch` unless `info`
    /// matches what was committed at creation.
    pub fn get_action_state(env: Env, info: ActionInfo) -> Result<ActionState, GovernanceError> {
        let record = action::load_verified(&env, &info)?;
        state::derive(&env, &info, &record)
    }

    pub fn get_action(env: Env, id: u64) -> Option<Action> {
        action::load(&env, id)
    }

    pub fn action_count(env: Env) -> u64 {
        action::count(&env)
    }

    pub fn has_approved(env: Env, action_id: u64, policyholder: Address) -> bool {
        action::has_approved(&env, action_id, &policyholder)
    }

    pub fn has_disapproved(env: Env, action_id: u64, policyholder: Address) -> bool {
        action::has_disapproved(&env, action_id, &policyholder)
    }

    pub fn is_strategy_authorized(env: Env, strategy: Address) -> bool {
        registry::is_strategy_authorized(&env, &strategy)
    }

    pub fn is_script_authorized(env: Env, script: Address) -> bool {
        registry::is_script_authorized(&env, &script)
    }

    pub fn get_guard(env: Env, target: Address, selector: Symbol) -> Option<Address> {
        registry::guard(&env, &target, &selector)
    }

    pub fn get_policy(env: Env) -> Result<Address, GovernanceError> {
        Self::policy(&env)
    }

    pub fn get_native_token(env: Env) -> Result<Address, GovernanceError> {
        Self::native_token(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn permission_id(env: Env, target: Address, selector: Symbol, strategy: Address) -> BytesN<32> {
        common::permission_id(&env, &target, &selector, &strategy)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), GovernanceError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(GovernanceError::NotInitialized);
        }
        Ok(())
    }

    fn require_core(env: &Env, caller: &Address) -> Result<(), GovernanceError> {
        Self::require_initialized(env)?;
        if *caller != env.current_contract_address() {
            return Err(GovernanceError::OnlyCore);
        }
        caller.require_auth();
        Ok(())
    }

    fn policy(env: &Env) -> Result<Address, GovernanceError> {
        env.storage()
            .instance()
            .get(&POLICY)
            .ok_or(GovernanceError::NotInitialized)
    }

    fn native_token(env: &Env) -> Result<Address, GovernanceError> {
        env.storage()
            .instance()
            .get(&NATIVE_TOKEN)
            .ok_or(GovernanceError::NotInitialized)
    }

    fn create(env: &Env, request: &CreateActionRequest) -> Result<u64, GovernanceError> {
        let policy = Self::policy(env)?;
        if !registry::is_strategy_authorized(env, &request.strategy) {
            return Err(GovernanceError::InvalidStrategy);
        }
        if request.value < 0 {
            return Err(GovernanceError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        let permission = common::permission_id(
            env,
            &request.target,
            &request.data.selector,
            &request.strategy,
        );
        let allowed = PolicyClient::new(env, &policy).has_permission(
            &request.policyholder,
            &request.role,
            &permission,
            &now,
        );
        if !allowed {
            return Err(GovernanceError::PolicyholderDoesNotHavePermission);
        }

        let id = action::next_id(env)?;
        let info = ActionInfo {
            id,
            creator: request.policyholder.clone(),
            strategy: request.strategy.clone(),
            target: request.target.clone(),
            value: request.value,
            data: request.data.clone(),
        };
        let record = Action {
            info_hash: info_hash(env, &info),
            creation_time: now,
            min_execution_time: 0,
            total_approvals: 0,
            total_disapprovals: 0,
            executed: false,
            canceled: false,
        };
        action::store(env, id, &record);

        let strategy = StrategyClient::new(env, &request.strategy);
        state::forward(env, strategy.try_validate_action_creation(&info, &record))?;

        registry::run_guard(env, GuardHook::Creation, &info)?;

        events::publish_action_created(
            env,
            id,
            &request.policyholder,
            request.role,
            &request.strategy,
            &request.target,
            request.value,
            &request.data,
            &request.description,
        );
        Ok(id)
    }
}
