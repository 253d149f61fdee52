//! Data model shared by the core, strategies and off-chain tooling.

use soroban_sdk::{contracttype, Address, BytesN, String, Symbol, Val, Vec};

// ── Action lifecycle ─────────────────────────────────────────────────────────

/// Derived lifecycle state of an action.
///
/// ```text
/// Active ──► Approved ──► Queued ──► Executed
///   │                       │  │
///   └──► Failed             │  └──► Expired
///                           └──► Failed   (disapproved)
///
/// Canceled: reachable from Active / Approved / Queued
/// ```
///
/// Only `executed`, `canceled` and `min_execution_time` are stored; every
/// other state is re-derived from the tallies, the strategy and the clock.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ActionState {
    Active = 0,
    Canceled = 1,
    Failed = 2,
    Approved = 3,
    Queued = 4,
    Expired = 5,
    Executed = 6,
}

impl ActionState {
    /// `Executed` and `Canceled` are permanent.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionState::Executed | ActionState::Canceled)
    }
}

/// The call an action performs: a function selector on the target and its
/// arguments.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallData {
    pub selector: Symbol,
    pub args: Vec<Val>,
}

/// Caller-supplied description of an action.
///
/// Only `keccak256(XDR(ActionInfo))` is stored; callers reproduce the exact
/// tuple on every subsequent call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionInfo {
    pub id: u64,
    pub creator: Address,
    pub strategy: Address,
    pub target: Address,
    /// Amount of the instance's native token forwarded with the call.
    pub value: i128,
    pub data: CallData,
}

/// The stored per-action record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Action {
    pub info_hash: BytesN<32>,
    /// Ledger timestamp at creation; anchors every role snapshot.
    pub creation_time: u64,
    /// Zero until queued, then fixed.
    pub min_execution_time: u64,
    pub total_approvals: u128,
    pub total_disapprovals: u128,
    pub executed: bool,
    pub canceled: bool,
}

/// One call planned by an authorised script and performed by the core in
/// its own context.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScriptCall {
    pub target: Address,
    pub value: i128,
    pub data: CallData,
}

/// Preimage of a permission id.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PermissionData {
    pub target: Address,
    pub selector: Symbol,
    pub strategy: Address,
}

// ── Strategy configuration ───────────────────────────────────────────────────

/// Percentage quorum against the role supply snapshotted at creation.
///
/// A `min_disapproval_pct` above 10 000 bps disables disapprovals.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelativeQuorum {
    pub min_approval_pct: u32,
    pub min_disapproval_pct: u32,
}

/// Fixed-quantity quorum. `min_disapprovals == u128::MAX` disables
/// disapprovals; with `peer_review` the creator may not cast.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AbsoluteQuorum {
    pub min_approvals: u128,
    pub min_disapprovals: u128,
    pub peer_review: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QuorumRule {
    Relative(RelativeQuorum),
    Absolute(AbsoluteQuorum),
}

/// Immutable configuration of one deployed strategy instance.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyConfig {
    /// Seconds after creation during which approvals may be cast.
    pub approval_period: u64,
    /// Timelock between queuing and earliest execution.
    pub queuing_period: u64,
    /// Seconds after `min_execution_time` before a queued action expires.
    pub expiration_period: u64,
    /// When false, the approval window closes as soon as quorum is reached.
    pub fixed_length_approval_period: bool,
    pub approval_role: u32,
    pub disapproval_role: u32,
    pub force_approval_roles: Vec<u32>,
    pub force_disapproval_roles: Vec<u32>,
    pub quorum: QuorumRule,
}

// ── Signed payloads ──────────────────────────────────────────────────────────

/// Binds a signature to one core deployment on one network.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningDomain {
    pub core: Address,
    pub network_id: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateActionRequest {
    pub policyholder: Address,
    pub role: u32,
    pub strategy: Address,
    pub target: Address,
    pub value: i128,
    pub data: CallData,
    pub description: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CastRequest {
    pub policyholder: Address,
    pub role: u32,
    pub info: ActionInfo,
    pub reason: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignedBody {
    CreateAction(CreateActionRequest),
    CastApproval(CastRequest),
    CastDisapproval(CastRequest),
}

/// The structure whose SHA-256 over XDR is signed by a policyholder.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedPayload {
    pub domain: SigningDomain,
    pub nonce: u64,
    pub body: SignedBody,
}
