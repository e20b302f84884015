// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

//! Credential envelope seal and open.
//!
//! The envelope stores the initiator's long-term private key and the master
//! key under a key derived from the randomized password, doubly
//! authenticated: an inner cipher tag over the ciphertext and an outer
//! transcript MAC binding the envelope nonce, the responder public key, and
//! the initiator public key. Swapping the configured responder key after
//! registration is therefore detected at open time.

use crate::crypto;
use crate::types::{
    constant_time_eq, labels, Envelope, OpaqueError, OpaqueResult, ENVELOPE_OUTER_TAG_LENGTH,
    ENVELOPE_PLAINTEXT_LENGTH, MAC_LENGTH, MASTER_KEY_LENGTH, NONCE_LENGTH, PRIVATE_KEY_LENGTH,
    PUBLIC_KEY_LENGTH, SECRETBOX_KEY_LENGTH, SECRETBOX_MAC_LENGTH,
};
use zeroize::Zeroize;

fn derive_envelope_keys(
    randomized_pwd: &[u8],
    nonce: &[u8; NONCE_LENGTH],
    envelope_key: &mut [u8; SECRETBOX_KEY_LENGTH],
    outer_mac_key: &mut [u8; SECRETBOX_KEY_LENGTH],
) -> OpaqueResult<()> {
    let mut info = Vec::with_capacity(labels::ENVELOPE_KEY_INFO.len() + NONCE_LENGTH);
    info.extend_from_slice(labels::ENVELOPE_KEY_INFO);
    info.extend_from_slice(nonce);
    crypto::hkdf_expand(randomized_pwd, &info, envelope_key)?;

    info.clear();
    info.extend_from_slice(labels::ENVELOPE_MAC_INFO);
    info.extend_from_slice(nonce);
    crypto::hkdf_expand(randomized_pwd, &info, outer_mac_key)?;
    Ok(())
}

fn outer_transcript_mac(
    outer_mac_key: &[u8; SECRETBOX_KEY_LENGTH],
    nonce: &[u8; NONCE_LENGTH],
    responder_public_key: &[u8; PUBLIC_KEY_LENGTH],
    initiator_public_key: &[u8; PUBLIC_KEY_LENGTH],
    tag_out: &mut [u8; ENVELOPE_OUTER_TAG_LENGTH],
) -> OpaqueResult<()> {
    let mut transcript = [0u8; NONCE_LENGTH + 2 * PUBLIC_KEY_LENGTH];
    transcript[..NONCE_LENGTH].copy_from_slice(nonce);
    transcript[NONCE_LENGTH..NONCE_LENGTH + PUBLIC_KEY_LENGTH]
        .copy_from_slice(responder_public_key);
    transcript[NONCE_LENGTH + PUBLIC_KEY_LENGTH..].copy_from_slice(initiator_public_key);

    let mut mac = [0u8; MAC_LENGTH];
    let result = crypto::hmac_sha512(outer_mac_key, &transcript, &mut mac);
    if result.is_ok() {
        tag_out.copy_from_slice(&mac[..ENVELOPE_OUTER_TAG_LENGTH]);
    }
    mac.zeroize();
    result
}

/// Seals the initiator key material and master key into an envelope.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `randomized_pwd` is empty.
/// Returns [`OpaqueError::CryptoError`] if key derivation or encryption
/// fails.
pub fn seal(
    randomized_pwd: &[u8],
    responder_public_key: &[u8; PUBLIC_KEY_LENGTH],
    initiator_private_key: &[u8; PRIVATE_KEY_LENGTH],
    initiator_public_key: &[u8; PUBLIC_KEY_LENGTH],
    master_key: &[u8; MASTER_KEY_LENGTH],
    envelope: &mut Envelope,
) -> OpaqueResult<()> {
    if randomized_pwd.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }

    crypto::random_bytes(&mut envelope.nonce)?;

    let mut envelope_key = [0u8; SECRETBOX_KEY_LENGTH];
    let mut outer_mac_key = [0u8; SECRETBOX_KEY_LENGTH];
    derive_envelope_keys(randomized_pwd, &envelope.nonce, &mut envelope_key, &mut outer_mac_key)?;

    let mut plaintext = [0u8; ENVELOPE_PLAINTEXT_LENGTH];
    plaintext[..PRIVATE_KEY_LENGTH].copy_from_slice(initiator_private_key);
    plaintext[PRIVATE_KEY_LENGTH..PRIVATE_KEY_LENGTH + PUBLIC_KEY_LENGTH]
        .copy_from_slice(responder_public_key);
    plaintext[PRIVATE_KEY_LENGTH + PUBLIC_KEY_LENGTH..].copy_from_slice(master_key);

    let mut inner_tag = [0u8; SECRETBOX_MAC_LENGTH];
    let sealed = crypto::aead_seal(
        &envelope_key,
        &plaintext,
        &envelope.nonce,
        &mut envelope.ciphertext,
        &mut inner_tag,
    );
    envelope_key.zeroize();
    plaintext.zeroize();
    sealed?;

    let mut outer_tag = [0u8; ENVELOPE_OUTER_TAG_LENGTH];
    let result = outer_transcript_mac(
        &outer_mac_key,
        &envelope.nonce,
        responder_public_key,
        initiator_public_key,
        &mut outer_tag,
    );
    outer_mac_key.zeroize();
    result?;

    envelope.auth_tag[..ENVELOPE_OUTER_TAG_LENGTH].copy_from_slice(&outer_tag);
    envelope.auth_tag[ENVELOPE_OUTER_TAG_LENGTH..].copy_from_slice(&inner_tag);
    Ok(())
}

/// Opens an envelope, recovering the responder key witness, the initiator
/// key pair, and the master key.
///
/// Every verification step runs regardless of earlier failures and the
/// outcome is folded into a single final branch, so a wrong password, a
/// tampered tag, and a swapped responder key are indistinguishable in
/// timing as well as in the returned error.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `randomized_pwd` is empty.
/// Returns [`OpaqueError::AuthenticationError`] if either tag fails to
/// verify, the recovered private key does not match the bound public key,
/// or the witnessed responder key differs from `known_responder_public_key`.
pub fn open(
    envelope: &Envelope,
    randomized_pwd: &[u8],
    known_responder_public_key: &[u8; PUBLIC_KEY_LENGTH],
    responder_public_key: &mut [u8; PUBLIC_KEY_LENGTH],
    initiator_private_key: &mut [u8; PRIVATE_KEY_LENGTH],
    initiator_public_key: &mut [u8; PUBLIC_KEY_LENGTH],
    master_key: &mut [u8; MASTER_KEY_LENGTH],
) -> OpaqueResult<()> {
    if randomized_pwd.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }

    let mut envelope_key = [0u8; SECRETBOX_KEY_LENGTH];
    let mut outer_mac_key = [0u8; SECRETBOX_KEY_LENGTH];
    derive_envelope_keys(randomized_pwd, &envelope.nonce, &mut envelope_key, &mut outer_mac_key)?;

    let inner_tag: &[u8; SECRETBOX_MAC_LENGTH] = envelope.auth_tag
        [ENVELOPE_OUTER_TAG_LENGTH..]
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;

    let mut plaintext = [0u8; ENVELOPE_PLAINTEXT_LENGTH];
    let inner_ok = crypto::aead_open(
        &envelope_key,
        &envelope.ciphertext,
        &envelope.nonce,
        inner_tag,
        &mut plaintext,
    )
    .is_ok();
    envelope_key.zeroize();
    if !inner_ok {
        plaintext.zeroize();
    }

    let mut recovered_sk = [0u8; PRIVATE_KEY_LENGTH];
    let mut witness_pk = [0u8; PUBLIC_KEY_LENGTH];
    let mut recovered_mk = [0u8; MASTER_KEY_LENGTH];
    recovered_sk.copy_from_slice(&plaintext[..PRIVATE_KEY_LENGTH]);
    witness_pk
        .copy_from_slice(&plaintext[PRIVATE_KEY_LENGTH..PRIVATE_KEY_LENGTH + PUBLIC_KEY_LENGTH]);
    recovered_mk.copy_from_slice(&plaintext[PRIVATE_KEY_LENGTH + PUBLIC_KEY_LENGTH..]);
    plaintext.zeroize();

    let (derived_pk, base_ok) = match crypto::scalarmult_base(&recovered_sk) {
        Ok(pk) => (pk, true),
        Err(_) => ([0u8; PUBLIC_KEY_LENGTH], false),
    };

    let mut expected_outer = [0u8; ENVELOPE_OUTER_TAG_LENGTH];
    let outer_computed = outer_transcript_mac(
        &outer_mac_key,
        &envelope.nonce,
        known_responder_public_key,
        &derived_pk,
        &mut expected_outer,
    )
    .is_ok();
    outer_mac_key.zeroize();

    let outer_ok = outer_computed
        && constant_time_eq(&expected_outer, &envelope.auth_tag[..ENVELOPE_OUTER_TAG_LENGTH]);
    let witness_ok = constant_time_eq(&witness_pk, known_responder_public_key);
    expected_outer.zeroize();

    if inner_ok && base_ok && outer_ok && witness_ok {
        responder_public_key.copy_from_slice(&witness_pk);
        initiator_private_key.copy_from_slice(&recovered_sk);
        initiator_public_key.copy_from_slice(&derived_pk);
        master_key.copy_from_slice(&recovered_mk);
        recovered_sk.zeroize();
        recovered_mk.zeroize();
        Ok(())
    } else {
        recovered_sk.zeroize();
        witness_pk.zeroize();
        recovered_mk.zeroize();
        Err(OpaqueError::AuthenticationError)
    }
}
