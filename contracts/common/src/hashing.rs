//! Commitments and digests.
//!
//! All hashes are taken over the XDR encoding of a `#[contracttype]` value so
//! off-chain tooling can reproduce them from the same type definitions.

use soroban_sdk::{crypto::Hash, xdr::ToXdr, Address, BytesN, Env, Symbol};

use crate::types::{ActionInfo, PermissionData, SignedPayload};

/// `keccak256(XDR(info))`, the only per-action commitment the core stores.
pub fn info_hash(env: &Env, info: &ActionInfo) -> BytesN<32> {
    env.crypto().keccak256(&info.clone().to_xdr(env)).into()
}

/// Permission id for calling `selector` on `target` through `strategy`.
pub fn permission_id(
    env: &Env,
    target: &Address,
    selector: &Symbol,
    strategy: &Address,
) -> BytesN<32> {
    let data = PermissionData {
        target: target.clone(),
        selector: selector.clone(),
        strategy: strategy.clone(),
    };
    env.crypto().sha256(&data.to_xdr(env)).into()
}

/// Message a policyholder signs for a `*_by_sig` entry point.
pub fn signed_digest(env: &Env, payload: &SignedPayload) -> BytesN<32> {
    signed_message_hash(env, payload).into()
}

/// [`signed_digest`] as a host hash, the form key recovery accepts.
pub fn signed_message_hash(env: &Env, payload: &SignedPayload) -> Hash<32> {
    env.crypto().sha256(&payload.clone().to_xdr(env))
}
