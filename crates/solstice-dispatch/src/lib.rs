// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

//! Handle-based dispatch API for the Solstice OPAQUE initiator.
//!
//! This is the operation surface a C shim wraps one-to-one: opaque handle
//! types with private implementations, integer status codes (`0` success,
//! negative codes per the protocol error taxonomy), exact-size input
//! checks, and output buffers that may be oversized but are written with
//! exactly the declared number of bytes. The shim itself (raw pointers,
//! null checks) lives outside this workspace.

use solstice_core::types::{
    OpaqueError, OpaqueResult, KE1_LENGTH, KE2_LENGTH, KE3_LENGTH, MASTER_KEY_LENGTH,
    PUBLIC_KEY_LENGTH, REGISTRATION_RECORD_LENGTH, REGISTRATION_REQUEST_LENGTH,
    REGISTRATION_RESPONSE_LENGTH, SESSION_KEY_LENGTH,
};
use solstice_initiator::{
    create_registration_request as initiator_create_registration_request,
    finalize_registration as initiator_finalize_registration,
    generate_ke1 as initiator_generate_ke1, generate_ke3 as initiator_generate_ke3,
    initiator_finish, InitiatorState, Ke1Message, Ke3Message, OpaqueInitiator,
    RegistrationRecord, RegistrationRequest,
};

/// Compiled-in responder public key used by [`create_default`]: the
/// canonical ristretto255 base point encoding. For testing only; production
/// callers must provision a real responder key via [`create`].
pub const DEFAULT_RESPONDER_PUBLIC_KEY: [u8; PUBLIC_KEY_LENGTH] = [
    0xe2, 0xf2, 0xae, 0x0a, 0x6a, 0xbc, 0x4e, 0x71, 0xa8, 0x84, 0xa9, 0x61, 0xc5, 0x00, 0x51,
    0x5f, 0x58, 0xe3, 0x0b, 0x6a, 0xa5, 0x82, 0xdd, 0x8d, 0xb6, 0xa6, 0x59, 0x45, 0xe0, 0x8d,
    0x2d, 0x76,
];

/// Opaque handle for an initiator bound to one responder key.
pub struct InitiatorHandle {
    initiator: OpaqueInitiator,
}

/// Opaque handle for one initiator session state.
pub struct SessionHandle {
    state: InitiatorState,
}

fn status(r: OpaqueResult<()>) -> i32 {
    match r {
        Ok(()) => 0,
        Err(e) => e.to_c_int(),
    }
}

/// Returns the library version string.
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Creates an initiator handle bound to `responder_public_key`.
///
/// Writes the handle into `handle` and returns `0`, or returns a negative
/// status and leaves `handle` empty.
pub fn create(responder_public_key: &[u8], handle: &mut Option<InitiatorHandle>) -> i32 {
    *handle = None;
    if responder_public_key.len() != PUBLIC_KEY_LENGTH {
        return OpaqueError::InvalidInput.to_c_int();
    }
    match OpaqueInitiator::new(responder_public_key) {
        Ok(initiator) => {
            *handle = Some(InitiatorHandle { initiator });
            0
        }
        Err(e) => e.to_c_int(),
    }
}

/// Creates an initiator handle bound to the compiled-in test key.
pub fn create_default(handle: &mut Option<InitiatorHandle>) -> i32 {
    create(&DEFAULT_RESPONDER_PUBLIC_KEY, handle)
}

/// Destroys an initiator handle.
pub fn destroy(handle: InitiatorHandle) {
    drop(handle);
}

/// Creates a fresh session state handle.
pub fn state_create() -> SessionHandle {
    SessionHandle {
        state: InitiatorState::new(),
    }
}

/// Destroys a session state handle, wiping its secrets.
pub fn state_destroy(state: SessionHandle) {
    drop(state);
}

/// Registration step 1: writes the 32-byte registration request.
pub fn create_registration_request(
    _handle: &InitiatorHandle,
    password: &[u8],
    state: &mut SessionHandle,
    request_out: &mut [u8],
) -> i32 {
    if password.is_empty() || request_out.len() < REGISTRATION_REQUEST_LENGTH {
        return OpaqueError::InvalidInput.to_c_int();
    }

    let mut request = RegistrationRequest::new();
    let result = initiator_create_registration_request(password, &mut request, &mut state.state);
    if result.is_ok() {
        request_out[..REGISTRATION_REQUEST_LENGTH].copy_from_slice(&request.data);
    }
    status(result)
}

/// Registration step 2: writes the 208-byte registration record.
pub fn finalize_registration(
    handle: &InitiatorHandle,
    response: &[u8],
    master_key: &[u8],
    state: &mut SessionHandle,
    record_out: &mut [u8],
) -> i32 {
    if response.len() != REGISTRATION_RESPONSE_LENGTH
        || master_key.len() != MASTER_KEY_LENGTH
        || record_out.len() < REGISTRATION_RECORD_LENGTH
    {
        return OpaqueError::InvalidInput.to_c_int();
    }

    let mut record = RegistrationRecord::new();
    let result = initiator_finalize_registration(
        &handle.initiator,
        response,
        master_key,
        &mut state.state,
        &mut record,
    );
    if result.is_ok() {
        let r = solstice_core::protocol::write_registration_record(
            &record.envelope,
            &record.initiator_public_key,
            record_out,
        );
        return status(r);
    }
    status(result)
}

/// Authentication step 1: writes the 96-byte KE1 message.
pub fn generate_ke1(
    _handle: &InitiatorHandle,
    password: &[u8],
    state: &mut SessionHandle,
    ke1_out: &mut [u8],
) -> i32 {
    if password.is_empty() || ke1_out.len() < KE1_LENGTH {
        return OpaqueError::InvalidInput.to_c_int();
    }

    let mut ke1 = Ke1Message::new();
    let result = initiator_generate_ke1(password, &mut ke1, &mut state.state);
    if result.is_ok() {
        let r = solstice_core::protocol::write_ke1(
            &ke1.initiator_nonce,
            &ke1.initiator_ephemeral_public_key,
            &ke1.credential_request,
            ke1_out,
        );
        return status(r);
    }
    status(result)
}

/// Authentication step 2: consumes KE2 and writes the 64-byte KE3 message.
pub fn generate_ke3(
    handle: &InitiatorHandle,
    ke2: &[u8],
    state: &mut SessionHandle,
    ke3_out: &mut [u8],
) -> i32 {
    if ke2.len() != KE2_LENGTH || ke3_out.len() < KE3_LENGTH {
        return OpaqueError::InvalidInput.to_c_int();
    }

    let mut ke3 = Ke3Message::new();
    let result = initiator_generate_ke3(&handle.initiator, ke2, &mut state.state, &mut ke3);
    if result.is_ok() {
        let r = solstice_core::protocol::write_ke3(&ke3.initiator_mac, ke3_out);
        return status(r);
    }
    status(result)
}

/// Authentication step 3: writes the 64-byte session key and the 32-byte
/// recovered master key.
pub fn finish(
    _handle: &InitiatorHandle,
    state: &mut SessionHandle,
    session_key_out: &mut [u8],
    master_key_out: &mut [u8],
) -> i32 {
    if session_key_out.len() < SESSION_KEY_LENGTH || master_key_out.len() < MASTER_KEY_LENGTH {
        return OpaqueError::InvalidInput.to_c_int();
    }

    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    let mut master_key = [0u8; MASTER_KEY_LENGTH];
    let result = initiator_finish(&mut state.state, &mut session_key, &mut master_key);
    if result.is_ok() {
        session_key_out[..SESSION_KEY_LENGTH].copy_from_slice(&session_key);
        master_key_out[..MASTER_KEY_LENGTH].copy_from_slice(&master_key);
    }
    status(result)
}
