use soroban_sdk::contracterror;

use crate::types::ActionState;

/// Error codes shared by the core and the built-in strategies.
///
/// # Code ranges
/// | Range   | Purpose                                   |
/// |---------|-------------------------------------------|
/// | 1 – 9   | Lifecycle / initialisation                |
/// | 10 – 19 | Authorization                             |
/// | 20 – 29 | Integrity                                 |
/// | 30 – 39 | Action state conflicts                    |
/// | 40 – 49 | Configuration / input validation          |
/// | 50 – 59 | Timing                                    |
/// | 60 – 69 | External call failures                    |
/// | 70 – 79 | Signatures and value                      |
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GovernanceError {
    // ── Lifecycle (1–9) ──────────────────────────────────────
    NotInitialized = 1,
    AlreadyInitialized = 2,
    ActionNotFound = 3,

    // ── Authorization (10–19) ────────────────────────────────
    /// Admin operation invoked by anyone other than the core itself.
    OnlyCore = 10,
    PolicyholderDoesNotHavePermission = 11,
    /// Caller did not hold the casting role at the action's creation time.
    InvalidPolicyholder = 12,
    /// Strategy is not bound to this core.
    UnauthorizedStrategyLogic = 13,
    InvalidStrategy = 14,
    OnlyActionCreator = 15,
    ActionCreatorCannotCast = 16,
    /// The core (or its policy) cannot be a script or carry a guard.
    RestrictedAddress = 17,
    InvalidRole = 18,
    /// A guard failed without a `GovernanceError` reason.
    InvalidActionGuard = 19,

    // ── Integrity (20–29) ────────────────────────────────────
    InfoHashMismatch = 20,

    // ── Action state (30–39) ─────────────────────────────────
    InvalidActionStateActive = 30,
    InvalidActionStateApproved = 31,
    InvalidActionStateQueued = 32,
    DuplicateCast = 33,
    RoleHasZeroSupply = 34,
    CannotCastWithZeroQuantity = 35,
    CannotCancelInState = 36,
    DisapprovalDisabled = 37,

    // ── Validation (40–49) ───────────────────────────────────
    InvalidInput = 40,
    InvalidMinApprovalPct = 41,
    InsufficientApprovalQuantity = 42,
    InsufficientDisapprovalQuantity = 43,
    UnknownSelfCall = 44,

    // ── Timing (50–59) ───────────────────────────────────────
    TimelockNotFinished = 50,

    // ── External (60–69) ─────────────────────────────────────
    /// The target or a script-planned call failed. The callee's error code
    /// is written to the diagnostic log.
    FailedActionExecution = 60,
    /// Reason a guard returns to veto creation or execution.
    ProhibitedByActionGuard = 61,

    // ── Signatures and value (70–79) ─────────────────────────
    InvalidSignature = 70,
    InsufficientMsgValue = 71,
    NonceOverflow = 72,
}

impl GovernanceError {
    /// The `InvalidActionState` variant for the state an operation required.
    pub fn invalid_action_state(expected: ActionState) -> Self {
        match expected {
            ActionState::Active => GovernanceError::InvalidActionStateActive,
            ActionState::Approved => GovernanceError::InvalidActionStateApproved,
            _ => GovernanceError::InvalidActionStateQueued,
        }
    }
}
