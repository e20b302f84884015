// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use solstice_core::types::{
    OpaqueError, OpaqueResult, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH,
    REGISTRATION_RECORD_LENGTH, REGISTRATION_REQUEST_LENGTH,
};
use solstice_core::{crypto, oprf, protocol};
use zeroize::Zeroize;

use crate::state::{OpaqueResponder, RegistrationResponse, ResponderCredentials};

/// Evaluates the OPRF on a blinded registration request and builds the
/// registration response.
///
/// Derives the per-credential OPRF key from the responder seed and the
/// request itself, evaluates the blinded element, and draws a fresh masking
/// key. The OPRF key and masking key are stored in `credentials`; the
/// responder replays the same OPRF key at every later login so the
/// initiator recovers the same randomized password.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `registration_request` has the
/// wrong length.
/// Returns [`OpaqueError::InvalidPublicKey`] if it is not a canonical
/// non-identity group element.
pub fn create_registration_response(
    responder: &OpaqueResponder,
    registration_request: &[u8],
    response: &mut RegistrationResponse,
    credentials: &mut ResponderCredentials,
) -> OpaqueResult<()> {
    if registration_request.len() != REGISTRATION_REQUEST_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    crypto::validate_element(registration_request)?;

    let mut oprf_key = [0u8; PRIVATE_KEY_LENGTH];
    crypto::derive_oprf_key(responder.oprf_seed(), registration_request, &mut oprf_key)?;

    let blinded: &[u8; PUBLIC_KEY_LENGTH] = registration_request
        .try_into()
        .map_err(|_| OpaqueError::InvalidInput)?;
    let mut evaluated = [0u8; PUBLIC_KEY_LENGTH];
    let result = (|| {
        oprf::evaluate(blinded, &oprf_key, &mut evaluated)?;
        crypto::random_bytes(&mut credentials.masking_key)?;
        protocol::write_registration_response(
            &evaluated,
            responder.public_key(),
            &credentials.masking_key,
            &mut response.data,
        )
    })();

    match result {
        Ok(()) => {
            credentials.oprf_key = oprf_key;
            oprf_key.zeroize();
            Ok(())
        }
        Err(e) => {
            oprf_key.zeroize();
            Err(e)
        }
    }
}

/// Stores an uploaded registration record in the credential entry.
///
/// Extracts the envelope and the initiator public key and marks the
/// credential as registered. Refuses to overwrite a populated entry.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if the record has the wrong length.
/// Returns [`OpaqueError::ValidationError`] if the entry is already
/// registered.
/// Returns [`OpaqueError::InvalidPublicKey`] if the initiator public key is
/// malformed.
pub fn store_registration_record(
    registration_record: &[u8],
    credentials: &mut ResponderCredentials,
) -> OpaqueResult<()> {
    if registration_record.len() != REGISTRATION_RECORD_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    if credentials.registered {
        return Err(OpaqueError::ValidationError);
    }

    let view = protocol::parse_registration_record(registration_record)?;
    crypto::validate_public_key(view.initiator_public_key)?;

    credentials.envelope.copy_from_slice(view.envelope);
    credentials
        .initiator_public_key
        .copy_from_slice(view.initiator_public_key);
    credentials.registered = true;
    Ok(())
}
