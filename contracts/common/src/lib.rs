//! Shared data model, error codes and cross-contract interfaces for the
//! governance instance contracts.
//!
//! This crate provides:
//! - [`GovernanceError`]: the single error enum used by the core and every
//!   built-in strategy, so error codes survive cross-contract forwarding.
//! - [`types`]: `ActionInfo`, `Action`, `ActionState`, strategy configuration
//!   and the signed-payload envelope.
//! - [`hashing`]: info commitments, permission ids and signing digests.
//! - [`interfaces`]: `#[contractclient]` traits for the role ledger (policy),
//!   strategies and action guards.
//! - [`testutils`] (feature `testutils`): in-process mock contracts.

#![no_std]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod errors;
pub mod hashing;
pub mod interfaces;
pub mod types;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use errors::*;
pub use hashing::*;
pub use interfaces::*;
pub use types::*;

/// Basis-point denominator: 10 000 bps = 100 %.
pub const ONE_HUNDRED_IN_BPS: u32 = 10_000;

/// Saturation sentinel for cast quantities and running totals.
///
/// A force-role cast contributes this value, which pins the respective total
/// at the sentinel and satisfies any quorum.
pub const MAX_QUANTITY: u128 = u128::MAX;
