// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use solstice_core::types::{
    constant_time_eq, Envelope, OpaqueError, OpaqueResult, SecureBytes, HASH_LENGTH, KE1_LENGTH,
    KE2_LENGTH, MASTER_KEY_LENGTH, MAX_PASSWORD_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH,
    SESSION_KEY_LENGTH,
};
use solstice_core::{crypto, envelope, key_schedule, oprf, protocol};
use zeroize::Zeroize;

use crate::state::{InitiatorPhase, InitiatorState, Ke1Message, Ke3Message, OpaqueInitiator};

/// Generates the first key-exchange message (KE1) to begin authentication.
///
/// Blinds the password, creates an ephemeral ristretto255 key pair and a
/// random nonce, and stores all of it in `state` for KE2 processing.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `password` is empty or exceeds
/// the maximum allowed length, or if `state` has already been used.
pub fn generate_ke1(
    password: &[u8],
    ke1: &mut Ke1Message,
    state: &mut InitiatorState,
) -> OpaqueResult<()> {
    if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    if state.phase != InitiatorPhase::Created {
        return Err(OpaqueError::InvalidInput);
    }

    let result = (|| {
        state.password = SecureBytes::from_slice(password);

        state.ephemeral_private_key = crypto::random_nonzero_scalar();
        state.ephemeral_public_key = crypto::scalarmult_base(&state.ephemeral_private_key)?;

        crypto::random_bytes(&mut state.initiator_nonce)?;

        oprf::blind(password, &mut state.credential_request, &mut state.blind_scalar)
    })();

    match result {
        Ok(()) => {
            ke1.initiator_nonce = state.initiator_nonce;
            ke1.initiator_ephemeral_public_key = state.ephemeral_public_key;
            ke1.credential_request = state.credential_request;
            state.phase = InitiatorPhase::AwaitingKe2;
            Ok(())
        }
        Err(e) => {
            state.fail();
            Err(e)
        }
    }
}

/// Processes the responder's KE2 message and produces the KE3 confirmation.
///
/// Unblinds the OPRF output, derives the randomized password, opens the
/// envelope to recover the long-term key pair and master key, runs the 3DH
/// exchange and key schedule, verifies the responder MAC, and computes the
/// initiator MAC. On success the session key and master key are stored in
/// `state` for [`initiator_finish`].
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `ke2_data` has the wrong length
/// or `state` is not awaiting a KE2 message; both are rejected before any
/// cryptographic work.
/// Returns [`OpaqueError::InvalidPublicKey`] if a transported group element
/// is malformed.
/// Returns [`OpaqueError::AuthenticationError`] if the envelope cannot be
/// opened or the responder MAC does not verify.
pub fn generate_ke3(
    initiator: &OpaqueInitiator,
    ke2_data: &[u8],
    state: &mut InitiatorState,
    ke3: &mut Ke3Message,
) -> OpaqueResult<()> {
    if ke2_data.len() != KE2_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    if state.phase != InitiatorPhase::AwaitingKe2 {
        return Err(OpaqueError::InvalidInput);
    }

    let result = generate_ke3_inner(initiator, ke2_data, state, ke3);
    match result {
        Ok(()) => {
            state.phase = InitiatorPhase::Ke3Generated;
            Ok(())
        }
        Err(e) => {
            state.fail();
            Err(e)
        }
    }
}

fn generate_ke3_inner(
    initiator: &OpaqueInitiator,
    ke2_data: &[u8],
    state: &mut InitiatorState,
    ke3: &mut Ke3Message,
) -> OpaqueResult<()> {
    let protocol::Ke2Ref {
        responder_nonce,
        responder_ephemeral_public_key,
        credential_response,
        responder_mac,
    } = protocol::parse_ke2(ke2_data)?;

    crypto::validate_public_key(responder_ephemeral_public_key)?;
    let responder_ephemeral: &[u8; PUBLIC_KEY_LENGTH] = responder_ephemeral_public_key
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;

    let cred = protocol::parse_credential_response(credential_response)?;
    crypto::validate_element(cred.evaluated_element)?;
    let evaluated: &[u8; PUBLIC_KEY_LENGTH] = cred
        .evaluated_element
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;

    let mut oprf_output = [0u8; HASH_LENGTH];
    oprf::finalize(&state.password, &state.blind_scalar, evaluated, &mut oprf_output)?;

    let mut randomized_pwd = [0u8; HASH_LENGTH];
    let derived =
        crate::registration::derive_randomized_password(&oprf_output, &state.password, &mut randomized_pwd);
    oprf_output.zeroize();
    derived?;

    let env = Envelope::from_bytes(cred.envelope)?;
    let mut recovered_rpk = [0u8; PUBLIC_KEY_LENGTH];
    let mut recovered_sk = [0u8; PRIVATE_KEY_LENGTH];
    let mut recovered_pk = [0u8; PUBLIC_KEY_LENGTH];
    let mut recovered_mk = [0u8; MASTER_KEY_LENGTH];

    let opened = envelope::open(
        &env,
        &randomized_pwd,
        initiator.responder_public_key(),
        &mut recovered_rpk,
        &mut recovered_sk,
        &mut recovered_pk,
        &mut recovered_mk,
    );
    randomized_pwd.zeroize();
    opened?;

    let mut ke1_bytes = [0u8; KE1_LENGTH];
    protocol::write_ke1(
        &state.initiator_nonce,
        &state.ephemeral_public_key,
        &state.credential_request,
        &mut ke1_bytes,
    )?;

    let mut transcript = [0u8; HASH_LENGTH];
    key_schedule::transcript_hash(
        &ke1_bytes,
        credential_response,
        responder_nonce,
        responder_ephemeral,
        &mut transcript,
    );

    let mut dh1 = [0u8; PUBLIC_KEY_LENGTH];
    let mut dh2 = [0u8; PUBLIC_KEY_LENGTH];
    let mut dh3 = [0u8; PUBLIC_KEY_LENGTH];

    let shares = (|| {
        crypto::scalar_mult(&state.ephemeral_private_key, responder_ephemeral, &mut dh1)?;
        crypto::scalar_mult(&state.ephemeral_private_key, &recovered_rpk, &mut dh2)?;
        crypto::scalar_mult(&recovered_sk, responder_ephemeral, &mut dh3)
    })();
    if let Err(e) = shares {
        dh1.zeroize();
        dh2.zeroize();
        dh3.zeroize();
        recovered_sk.zeroize();
        recovered_mk.zeroize();
        return Err(e);
    }

    let secrets = key_schedule::derive_session(&transcript, &dh1, &dh2, &dh3);
    dh1.zeroize();
    dh2.zeroize();
    dh3.zeroize();
    let secrets = match secrets {
        Ok(s) => s,
        Err(e) => {
            recovered_sk.zeroize();
            recovered_mk.zeroize();
            return Err(e);
        }
    };

    if !constant_time_eq(responder_mac, &secrets.responder_mac) {
        recovered_sk.zeroize();
        recovered_mk.zeroize();
        return Err(OpaqueError::AuthenticationError);
    }

    ke3.initiator_mac = secrets.initiator_mac;

    state.responder_public_key = recovered_rpk;
    state.initiator_private_key = recovered_sk;
    state.initiator_public_key = recovered_pk;
    state.master_key = recovered_mk;
    state.session_key = secrets.session_key;

    recovered_sk.zeroize();
    recovered_mk.zeroize();
    Ok(())
}

/// Extracts the session key and master key after a successful key exchange.
///
/// Copies both keys out of `state`, wipes every remaining secret, and moves
/// the state to [`InitiatorPhase::Finished`].
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if the key exchange has not
/// completed on this state.
pub fn initiator_finish(
    state: &mut InitiatorState,
    session_key: &mut [u8; SESSION_KEY_LENGTH],
    master_key: &mut [u8; MASTER_KEY_LENGTH],
) -> OpaqueResult<()> {
    if state.phase != InitiatorPhase::Ke3Generated {
        return Err(OpaqueError::InvalidInput);
    }

    session_key.copy_from_slice(&state.session_key);
    master_key.copy_from_slice(&state.master_key);

    state.wipe(InitiatorPhase::Finished);
    Ok(())
}
