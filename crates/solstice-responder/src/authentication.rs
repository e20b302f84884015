// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use solstice_core::types::{
    constant_time_eq, OpaqueError, OpaqueResult, HASH_LENGTH, KE1_LENGTH, KE3_LENGTH,
    PUBLIC_KEY_LENGTH, SESSION_KEY_LENGTH,
};
use solstice_core::{crypto, key_schedule, oprf, protocol};
use zeroize::Zeroize;

use crate::state::{Ke2Message, OpaqueResponder, ResponderCredentials, ResponderPhase, ResponderState};

/// Processes a KE1 message and produces the responder's KE2.
///
/// Re-evaluates the OPRF with the credential's registration-time key,
/// replays the stored envelope, generates the responder ephemerals, runs
/// the 3DH exchange and key schedule, and emits the responder MAC. The
/// session key and the MAC expected from the initiator are stored in
/// `state` for [`responder_finish`].
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `ke1_data` has the wrong length
/// or the state has already been used; both are rejected before any
/// cryptographic work.
/// Returns [`OpaqueError::ValidationError`] if `credentials` has no stored
/// registration record.
/// Returns [`OpaqueError::InvalidPublicKey`] if a transported group element
/// is malformed.
pub fn generate_ke2(
    responder: &OpaqueResponder,
    ke1_data: &[u8],
    credentials: &ResponderCredentials,
    ke2: &mut Ke2Message,
    state: &mut ResponderState,
) -> OpaqueResult<()> {
    if ke1_data.len() != KE1_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    if state.phase != ResponderPhase::Created {
        return Err(OpaqueError::InvalidInput);
    }
    if !credentials.registered {
        return Err(OpaqueError::ValidationError);
    }

    let result = generate_ke2_inner(responder, ke1_data, credentials, ke2, state);
    match result {
        Ok(()) => {
            state.phase = ResponderPhase::AwaitingKe3;
            Ok(())
        }
        Err(e) => {
            state.fail();
            Err(e)
        }
    }
}

fn generate_ke2_inner(
    responder: &OpaqueResponder,
    ke1_data: &[u8],
    credentials: &ResponderCredentials,
    ke2: &mut Ke2Message,
    state: &mut ResponderState,
) -> OpaqueResult<()> {
    let ke1 = protocol::parse_ke1(ke1_data)?;

    crypto::validate_element(ke1.credential_request)?;
    crypto::validate_public_key(ke1.initiator_ephemeral_public_key)?;
    crypto::validate_public_key(&credentials.initiator_public_key)?;

    let initiator_ephemeral: &[u8; PUBLIC_KEY_LENGTH] = ke1
        .initiator_ephemeral_public_key
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;
    let credential_request: &[u8; PUBLIC_KEY_LENGTH] = ke1
        .credential_request
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;

    state.initiator_ephemeral_public_key = *initiator_ephemeral;

    let mut evaluated = [0u8; PUBLIC_KEY_LENGTH];
    oprf::evaluate(credential_request, &credentials.oprf_key, &mut evaluated)?;

    protocol::write_credential_response(
        &evaluated,
        &credentials.envelope,
        &mut ke2.credential_response,
    )?;

    state.ephemeral_private_key = crypto::random_nonzero_scalar();
    state.ephemeral_public_key = crypto::scalarmult_base(&state.ephemeral_private_key)?;
    crypto::random_bytes(&mut ke2.responder_nonce)?;
    ke2.responder_ephemeral_public_key = state.ephemeral_public_key;

    let mut transcript = [0u8; HASH_LENGTH];
    key_schedule::transcript_hash(
        ke1_data,
        &ke2.credential_response,
        &ke2.responder_nonce,
        &state.ephemeral_public_key,
        &mut transcript,
    );

    let mut dh1 = [0u8; PUBLIC_KEY_LENGTH];
    let mut dh2 = [0u8; PUBLIC_KEY_LENGTH];
    let mut dh3 = [0u8; PUBLIC_KEY_LENGTH];

    let shares = (|| {
        crypto::scalar_mult(&state.ephemeral_private_key, initiator_ephemeral, &mut dh1)?;
        crypto::scalar_mult(
            &responder.keypair().private_key,
            initiator_ephemeral,
            &mut dh2,
        )?;
        crypto::scalar_mult(
            &state.ephemeral_private_key,
            &credentials.initiator_public_key,
            &mut dh3,
        )
    })();
    if let Err(e) = shares {
        dh1.zeroize();
        dh2.zeroize();
        dh3.zeroize();
        return Err(e);
    }

    let secrets = key_schedule::derive_session(&transcript, &dh1, &dh2, &dh3);
    dh1.zeroize();
    dh2.zeroize();
    dh3.zeroize();
    let secrets = secrets?;

    ke2.responder_mac = secrets.responder_mac;
    state.session_key = secrets.session_key;
    state.expected_initiator_mac = secrets.initiator_mac;
    Ok(())
}

/// Verifies the initiator's KE3 MAC and releases the session key.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `ke3_data` has the wrong length
/// or the state is not awaiting KE3.
/// Returns [`OpaqueError::AuthenticationError`] if the MAC does not match;
/// the state's secrets are wiped before returning.
pub fn responder_finish(
    ke3_data: &[u8],
    state: &mut ResponderState,
    session_key: &mut [u8; SESSION_KEY_LENGTH],
) -> OpaqueResult<()> {
    if ke3_data.len() != KE3_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    if state.phase != ResponderPhase::AwaitingKe3 {
        return Err(OpaqueError::InvalidInput);
    }

    let ke3 = protocol::parse_ke3(ke3_data)?;

    if !constant_time_eq(ke3.initiator_mac, &state.expected_initiator_mac) {
        state.fail();
        return Err(OpaqueError::AuthenticationError);
    }

    session_key.copy_from_slice(&state.session_key);
    state.wipe(ResponderPhase::Finished);
    Ok(())
}
