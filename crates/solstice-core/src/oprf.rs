// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use crate::crypto;
use crate::types::{
    is_all_zero, OpaqueError, OpaqueResult, HASH_LENGTH, MAX_PASSWORD_LENGTH, PRIVATE_KEY_LENGTH,
    PUBLIC_KEY_LENGTH,
};
use zeroize::Zeroize;

/// Maps arbitrary input to a ristretto255 group element.
///
/// SHA-512 followed by the ristretto from-hash map; the output is uniform
/// in the group and the identity is rejected.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `input` is empty.
/// Returns [`OpaqueError::CryptoError`] if the mapping fails or yields the
/// identity.
pub fn hash_to_group(input: &[u8], point_out: &mut [u8; PUBLIC_KEY_LENGTH]) -> OpaqueResult<()> {
    if input.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }

    let mut hash = [0u8; HASH_LENGTH];
    crypto::sha512(input, &mut hash);

    // SAFETY: hash is a 64-byte array, point_out a 32-byte array as required.
    // Return code is checked.
    let rc = unsafe {
        libsodium_sys::crypto_core_ristretto255_from_hash(point_out.as_mut_ptr(), hash.as_ptr())
    };
    hash.zeroize();
    if rc != 0 || is_all_zero(point_out) {
        return Err(OpaqueError::CryptoError);
    }
    Ok(())
}

/// Blinds `input` with a fresh random scalar: `blinded = H(input) * r`.
///
/// Returns both the blinded element (sent to the responder) and the blind
/// scalar (kept to unblind the evaluation).
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `input` is empty or oversized.
pub fn blind(
    input: &[u8],
    blinded_element: &mut [u8; PUBLIC_KEY_LENGTH],
    blind_scalar: &mut [u8; PRIVATE_KEY_LENGTH],
) -> OpaqueResult<()> {
    if input.is_empty() || input.len() > MAX_PASSWORD_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }

    *blind_scalar = crypto::random_nonzero_scalar();

    let mut element = [0u8; PUBLIC_KEY_LENGTH];
    hash_to_group(input, &mut element)?;

    let result = crypto::scalar_mult(blind_scalar, &element, blinded_element);
    element.zeroize();
    result
}

/// Evaluates the OPRF on a blinded element: `evaluated = blinded * key`.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidPublicKey`] if `blinded_element` is not a
/// canonical non-identity encoding or the product is the identity.
pub fn evaluate(
    blinded_element: &[u8; PUBLIC_KEY_LENGTH],
    oprf_key: &[u8; PRIVATE_KEY_LENGTH],
    evaluated_element: &mut [u8; PUBLIC_KEY_LENGTH],
) -> OpaqueResult<()> {
    crypto::validate_element(blinded_element)?;
    crypto::scalar_mult(oprf_key, blinded_element, evaluated_element)
}

/// Unblinds the evaluated element and derives the 64-byte OPRF output.
///
/// Computes `unblinded = evaluated * r⁻¹` and extracts
/// `HKDF-Extract(∅, input ‖ unblinded)`.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `input` is empty.
/// Returns [`OpaqueError::CryptoError`] if the blind scalar cannot be
/// inverted.
/// Returns [`OpaqueError::InvalidPublicKey`] if `evaluated_element` is not
/// a valid group element.
pub fn finalize(
    input: &[u8],
    blind_scalar: &[u8; PRIVATE_KEY_LENGTH],
    evaluated_element: &[u8; PUBLIC_KEY_LENGTH],
    oprf_output: &mut [u8; HASH_LENGTH],
) -> OpaqueResult<()> {
    if input.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }

    let mut scalar_inv = [0u8; PRIVATE_KEY_LENGTH];
    crypto::scalar_invert(blind_scalar, &mut scalar_inv)?;

    let mut unblinded = [0u8; PUBLIC_KEY_LENGTH];
    let result = crypto::scalar_mult(&scalar_inv, evaluated_element, &mut unblinded);
    scalar_inv.zeroize();
    result?;

    let mut ikm = Vec::with_capacity(input.len() + PUBLIC_KEY_LENGTH);
    ikm.extend_from_slice(input);
    ikm.extend_from_slice(&unblinded);
    unblinded.zeroize();

    let extract = crypto::hkdf_extract(b"", &ikm, oprf_output);
    ikm.zeroize();
    extract
}
