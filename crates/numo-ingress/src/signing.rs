//! secp256k1 signer recovery.
//!
//! A message is signed over `H(0x19 || 0x01 || domainSeparator ||
//! H(body))`. The signer is recovered from `r || s || v` and its address
//! (`keccak256(pubkey)[12..]`) must equal the trader the message claims.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use numo_types::{Address, Hash32, MessageSignature, NumoError, Result, SignedMessage, keccak256};

/// Account address of a public key.
#[must_use]
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

/// Recover the signing address of `hash`.
pub fn recover_signer(hash: &Hash32, signature: &MessageSignature) -> Result<Address> {
    let recovery_id = signature
        .recovery_id()
        .and_then(RecoveryId::from_byte)
        .ok_or(NumoError::SignatureInvalid)?;
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r);
    rs[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&rs).map_err(|_| NumoError::SignatureInvalid)?;
    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| NumoError::SignatureInvalid)?;
    Ok(address_of(&key))
}

/// Check that `signed` was signed by its claimed trader under
/// `domain_separator`. Returns the message hash.
pub fn verify_message(domain_separator: &Hash32, signed: &SignedMessage) -> Result<Hash32> {
    let hash = signed.message.hash(domain_separator);
    let recovered = recover_signer(&hash, &signed.signature)?;
    let claimed = signed.message.trader();
    if recovered != claimed {
        return Err(NumoError::SignerMismatch { claimed, recovered });
    }
    Ok(hash)
}
