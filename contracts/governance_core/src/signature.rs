//! Signed entry points: signer keys, nonces and digests.
//!
//! A policyholder binds an uncompressed SEC-1 secp256k1 public key once. A
//! signed request carries `r || s || recovery_id` over
//! `sha256(XDR(SignedPayload { domain, nonce, body }))`; the key recovered
//! from it must equal the bound key. The domain pins the core address and
//! the network id, and the nonce is tracked per (policyholder, operation).

use common::{
    signed_digest, signed_message_hash, GovernanceError, SignedBody, SignedPayload, SigningDomain,
};
use soroban_sdk::{symbol_short, Address, BytesN, Env, Symbol};

use crate::events;

// ── Storage key prefixes ─────────────────────────────────────────────────────

const SIGNER: Symbol = symbol_short!("SIGNER");
const NONCE: Symbol = symbol_short!("NONCE");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

/// secp256k1 group order halved, big-endian. Larger `s` values are rejected
/// by the host.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];
const ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];
const MAX_RECOVERY_ID: u8 = 3;

// ── Operation selectors ──────────────────────────────────────────────────────

pub const OP_CREATE_ACTION: &str = "create_action";
pub const OP_CAST_APPROVAL: &str = "cast_approval";
pub const OP_CAST_DISAPPROVAL: &str = "cast_disapproval";

/// The nonce selector a signed body consumes.
pub(crate) fn selector_of(env: &Env, body: &SignedBody) -> Symbol {
    match body {
        SignedBody::CreateAction(_) => Symbol::new(env, OP_CREATE_ACTION),
        SignedBody::CastApproval(_) => Symbol::new(env, OP_CAST_APPROVAL),
        SignedBody::CastDisapproval(_) => Symbol::new(env, OP_CAST_DISAPPROVAL),
    }
}

// ── Signer keys ──────────────────────────────────────────────────────────────

pub(crate) fn set_signer_key(env: &Env, policyholder: &Address, key: &BytesN<65>) {
    let storage_key = (SIGNER, policyholder.clone());
    env.storage().persistent().set(&storage_key, key);
    env.storage()
        .persistent()
        .extend_ttl(&storage_key, TTL_THRESHOLD, TTL_EXTEND_TO);
    events::publish_signer_key_set(env, policyholder, key);
}

pub(crate) fn signer_key(env: &Env, policyholder: &Address) -> Option<BytesN<65>> {
    env.storage()
        .persistent()
        .get(&(SIGNER, policyholder.clone()))
}

// ── Nonces ───────────────────────────────────────────────────────────────────

fn nonce_key(policyholder: &Address, selector: &Symbol) -> (Symbol, Address, Symbol) {
    (NONCE, policyholder.clone(), selector.clone())
}

pub(crate) fn nonce(env: &Env, policyholder: &Address, selector: &Symbol) -> u64 {
    env.storage()
        .persistent()
        .get(&nonce_key(policyholder, selector))
        .unwrap_or(0u64)
}

/// Return the current nonce and advance it.
pub(crate) fn use_nonce(
    env: &Env,
    policyholder: &Address,
    selector: &Symbol,
) -> Result<u64, GovernanceError> {
    let current = nonce(env, policyholder, selector);
    let next = current
        .checked_add(1)
        .ok_or(GovernanceError::NonceOverflow)?;
    let key = nonce_key(policyholder, selector);
    env.storage().persistent().set(&key, &next);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    events::publish_nonce_incremented(env, policyholder, selector, next);
    Ok(current)
}

// ── Digests ──────────────────────────────────────────────────────────────────

fn domain(env: &Env) -> SigningDomain {
    SigningDomain {
        core: env.current_contract_address(),
        network_id: env.ledger().network_id(),
    }
}

pub(crate) fn digest(env: &Env, nonce: u64, body: &SignedBody) -> BytesN<32> {
    let payload = SignedPayload {
        domain: domain(env),
        nonce,
        body: body.clone(),
    };
    signed_digest(env, &payload)
}

/// Digest `policyholder` must sign next for `body`.
pub(crate) fn pending_digest(env: &Env, policyholder: &Address, body: &SignedBody) -> BytesN<32> {
    let selector = selector_of(env, body);
    digest(env, nonce(env, policyholder, &selector), body)
}

/// Consume the nonce, then check that `signature` recovers to the bound key.
///
/// Malformed or mismatched signatures return `InvalidSignature`. An `r` with
/// no matching curve point still traps in the host. Either way the nonce
/// write is rolled back with the rest of the call.
pub(crate) fn verify(
    env: &Env,
    policyholder: &Address,
    body: &SignedBody,
    signature: &BytesN<65>,
) -> Result<(), GovernanceError> {
    let key = signer_key(env, policyholder).ok_or(GovernanceError::InvalidSignature)?;
    if key == BytesN::from_array(env, &[0u8; 65]) {
        return Err(GovernanceError::InvalidSignature);
    }
    let selector = selector_of(env, body);
    let nonce = use_nonce(env, policyholder, &selector)?;

    let raw = signature.to_array();
    let (rs, recovery_id) = split_signature(&raw).ok_or(GovernanceError::InvalidSignature)?;
    let payload = SignedPayload {
        domain: domain(env),
        nonce,
        body: body.clone(),
    };
    let hash = signed_message_hash(env, &payload);
    let recovered = env
        .crypto()
        .secp256k1_recover(&hash, &BytesN::from_array(env, &rs), recovery_id);
    if recovered != key {
        return Err(GovernanceError::InvalidSignature);
    }
    Ok(())
}

/// Split `r || s || v` into the 64-byte signature and recovery id, refusing
/// anything the host would trap on.
fn split_signature(raw: &[u8; 65]) -> Option<([u8; 64], u32)> {
    let mut rs = [0u8; 64];
    rs.copy_from_slice(&raw[..64]);
    let (r, s) = rs.split_at(32);
    let v = raw[64];
    if v > MAX_RECOVERY_ID || !in_scalar_range(r) || !in_scalar_range(s) {
        return None;
    }
    if s > HALF_ORDER.as_slice() {
        return None;
    }
    Some((rs, u32::from(v)))
}

fn in_scalar_range(bytes: &[u8]) -> bool {
    bytes.iter().any(|b| *b != 0) && bytes < ORDER.as_slice()
}
