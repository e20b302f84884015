// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use solstice_core::types::{
    constant_time_eq, Envelope, OpaqueError, OpaqueResult, SecureBytes, HASH_LENGTH,
    MASTER_KEY_LENGTH, MAX_PASSWORD_LENGTH, PUBLIC_KEY_LENGTH, REGISTRATION_RESPONSE_LENGTH,
};
use solstice_core::{crypto, envelope, oprf, protocol};
use zeroize::Zeroize;

use crate::state::{
    InitiatorPhase, InitiatorState, OpaqueInitiator, RegistrationRecord, RegistrationRequest,
};

/// Creates a registration request by blinding the password with a random
/// OPRF scalar.
///
/// The password copy and the blind scalar are kept in `state` for
/// [`finalize_registration`]; the blinded element is written into `request`.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `password` is empty or exceeds
/// the maximum allowed length, or if `state` has already been used.
pub fn create_registration_request(
    password: &[u8],
    request: &mut RegistrationRequest,
    state: &mut InitiatorState,
) -> OpaqueResult<()> {
    if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    if state.phase != InitiatorPhase::Created {
        return Err(OpaqueError::InvalidInput);
    }

    state.password = SecureBytes::from_slice(password);

    let result = oprf::blind(password, &mut request.data, &mut state.blind_scalar);
    match result {
        Ok(()) => {
            state.credential_request = request.data;
            state.phase = InitiatorPhase::AwaitingRegistrationResponse;
            Ok(())
        }
        Err(e) => {
            state.fail();
            Err(e)
        }
    }
}

/// Finalizes registration: unblinds the OPRF output, derives the randomized
/// password, generates a fresh long-term key pair, and seals it together
/// with `master_key` into the envelope. The resulting record is written to
/// `record` and should be sent to the responder for storage.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if a buffer has the wrong size or
/// the state is not awaiting a registration response.
/// Returns [`OpaqueError::InvalidPublicKey`] if the responder key in the
/// response is malformed.
/// Returns [`OpaqueError::AuthenticationError`] if it differs from the key
/// this initiator was configured with.
pub fn finalize_registration(
    initiator: &OpaqueInitiator,
    registration_response: &[u8],
    master_key: &[u8],
    state: &mut InitiatorState,
    record: &mut RegistrationRecord,
) -> OpaqueResult<()> {
    if registration_response.len() != REGISTRATION_RESPONSE_LENGTH
        || master_key.len() != MASTER_KEY_LENGTH
    {
        return Err(OpaqueError::InvalidInput);
    }
    if state.phase != InitiatorPhase::AwaitingRegistrationResponse {
        return Err(OpaqueError::InvalidInput);
    }

    let result = finalize_inner(initiator, registration_response, master_key, state, record);
    match result {
        Ok(()) => {
            state.wipe(InitiatorPhase::RegistrationDone);
            Ok(())
        }
        Err(e) => {
            state.fail();
            Err(e)
        }
    }
}

fn finalize_inner(
    initiator: &OpaqueInitiator,
    registration_response: &[u8],
    master_key: &[u8],
    state: &mut InitiatorState,
    record: &mut RegistrationRecord,
) -> OpaqueResult<()> {
    let protocol::RegistrationResponseRef {
        evaluated_element,
        responder_public_key,
        masking_key: _,
    } = protocol::parse_registration_response(registration_response)?;

    crypto::validate_public_key(responder_public_key)?;
    let expected = initiator.responder_public_key();
    if !constant_time_eq(responder_public_key, expected) {
        return Err(OpaqueError::AuthenticationError);
    }
    let responder_key: &[u8; PUBLIC_KEY_LENGTH] = responder_public_key
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;
    let evaluated: &[u8; PUBLIC_KEY_LENGTH] = evaluated_element
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;

    let mut oprf_output = [0u8; HASH_LENGTH];
    oprf::finalize(&state.password, &state.blind_scalar, evaluated, &mut oprf_output)?;

    let mut randomized_pwd = [0u8; HASH_LENGTH];
    let derived = derive_randomized_password(&oprf_output, &state.password, &mut randomized_pwd);
    oprf_output.zeroize();
    derived?;

    state.initiator_private_key = crypto::random_nonzero_scalar();
    state.initiator_public_key = crypto::scalarmult_base(&state.initiator_private_key)?;

    let mk: &[u8; MASTER_KEY_LENGTH] = master_key
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;

    let mut env = Envelope::new();
    let sealed = envelope::seal(
        &randomized_pwd,
        responder_key,
        &state.initiator_private_key,
        &state.initiator_public_key,
        mk,
        &mut env,
    );
    randomized_pwd.zeroize();
    sealed?;

    env.write_bytes(&mut record.envelope)?;
    record.initiator_public_key = state.initiator_public_key;
    Ok(())
}

/// Derives the randomized password that keys the envelope:
/// `HKDF-Extract(∅, oprf_output ‖ SHA-512(password))`.
///
/// A single changed password bit flips the OPRF output and the password
/// hash, so the envelope key changes with certainty.
pub(crate) fn derive_randomized_password(
    oprf_output: &[u8; HASH_LENGTH],
    password: &[u8],
    randomized_pwd: &mut [u8; HASH_LENGTH],
) -> OpaqueResult<()> {
    let mut password_hash = [0u8; HASH_LENGTH];
    crypto::sha512(password, &mut password_hash);

    let mut ikm = [0u8; 2 * HASH_LENGTH];
    ikm[..HASH_LENGTH].copy_from_slice(oprf_output);
    ikm[HASH_LENGTH..].copy_from_slice(&password_hash);
    password_hash.zeroize();

    let result = crypto::hkdf_extract(b"", &ikm, randomized_pwd);
    ikm.zeroize();
    result
}
