use solstice_core::protocol;
use solstice_core::types::*;
use solstice_dispatch as dispatch;
use solstice_responder::*;

fn responder_ke2(
    responder: &OpaqueResponder,
    credentials: &ResponderCredentials,
    ke1_bytes: &[u8],
    state: &mut ResponderState,
) -> [u8; KE2_LENGTH] {
    let mut ke2 = Ke2Message::new();
    generate_ke2(responder, ke1_bytes, credentials, &mut ke2, state).unwrap();
    let mut ke2_bytes = [0u8; KE2_LENGTH];
    protocol::write_ke2(
        &ke2.responder_nonce,
        &ke2.responder_ephemeral_public_key,
        &ke2.credential_response,
        &ke2.responder_mac,
        &mut ke2_bytes,
    )
    .unwrap();
    ke2_bytes
}

#[test]
fn version_is_static_and_idempotent() {
    let v1 = dispatch::get_version();
    let v2 = dispatch::get_version();
    assert_eq!(v1, v2);
    assert!(!v1.is_empty());
}

#[test]
fn create_rejects_bad_keys() {
    let mut handle = None;
    assert_eq!(dispatch::create(&[0u8; 16], &mut handle), -1);
    assert!(handle.is_none());

    assert_eq!(
        dispatch::create(&[0u8; PUBLIC_KEY_LENGTH], &mut handle),
        OpaqueError::InvalidPublicKey.to_c_int()
    );
    assert!(handle.is_none());
}

#[test]
fn create_default_uses_compiled_in_key() {
    let mut handle = None;
    assert_eq!(dispatch::create_default(&mut handle), 0);
    let handle = handle.unwrap();

    let mut state = dispatch::state_create();
    let mut request = [0u8; REGISTRATION_REQUEST_LENGTH];
    assert_eq!(
        dispatch::create_registration_request(&handle, b"password", &mut state, &mut request),
        0
    );
    assert!(!request.iter().all(|&b| b == 0));

    dispatch::state_destroy(state);
    dispatch::destroy(handle);
}

#[test]
fn full_flow_through_handles() {
    let responder = OpaqueResponder::generate().unwrap();

    let mut handle = None;
    assert_eq!(dispatch::create(responder.public_key(), &mut handle), 0);
    let handle = handle.unwrap();

    let master_key = [0x33u8; MASTER_KEY_LENGTH];

    // Registration through the handle API. Output buffers are oversized on
    // purpose; exactly the declared byte counts must be written.
    let mut reg_state = dispatch::state_create();
    let mut request = [0xEEu8; REGISTRATION_REQUEST_LENGTH + 8];
    assert_eq!(
        dispatch::create_registration_request(&handle, b"hunter2!", &mut reg_state, &mut request),
        0
    );
    assert!(request[REGISTRATION_REQUEST_LENGTH..].iter().all(|&b| b == 0xEE));

    let mut response = RegistrationResponse::new();
    let mut credentials = ResponderCredentials::new();
    create_registration_response(
        &responder,
        &request[..REGISTRATION_REQUEST_LENGTH],
        &mut response,
        &mut credentials,
    )
    .unwrap();

    let mut record = [0xEEu8; REGISTRATION_RECORD_LENGTH + 8];
    assert_eq!(
        dispatch::finalize_registration(
            &handle,
            &response.data,
            &master_key,
            &mut reg_state,
            &mut record
        ),
        0
    );
    assert!(record[REGISTRATION_RECORD_LENGTH..].iter().all(|&b| b == 0xEE));
    store_registration_record(&record[..REGISTRATION_RECORD_LENGTH], &mut credentials).unwrap();
    dispatch::state_destroy(reg_state);

    // Authentication through the handle API.
    let mut auth_state = dispatch::state_create();
    let mut ke1 = [0u8; KE1_LENGTH];
    assert_eq!(
        dispatch::generate_ke1(&handle, b"hunter2!", &mut auth_state, &mut ke1),
        0
    );

    let mut responder_state = ResponderState::new();
    let ke2 = responder_ke2(&responder, &credentials, &ke1, &mut responder_state);

    let mut ke3 = [0u8; KE3_LENGTH];
    assert_eq!(dispatch::generate_ke3(&handle, &ke2, &mut auth_state, &mut ke3), 0);

    let mut responder_session_key = [0u8; SESSION_KEY_LENGTH];
    responder_finish(&ke3, &mut responder_state, &mut responder_session_key).unwrap();

    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    let mut recovered_master_key = [0u8; MASTER_KEY_LENGTH];
    assert_eq!(
        dispatch::finish(&handle, &mut auth_state, &mut session_key, &mut recovered_master_key),
        0
    );

    assert_eq!(session_key, responder_session_key);
    assert_eq!(recovered_master_key, master_key);

    dispatch::state_destroy(auth_state);
    dispatch::destroy(handle);
}

#[test]
fn truncated_ke2_returns_invalid_input() {
    let mut handle = None;
    dispatch::create_default(&mut handle);
    let handle = handle.unwrap();

    let mut state = dispatch::state_create();
    let mut ke1 = [0u8; KE1_LENGTH];
    assert_eq!(dispatch::generate_ke1(&handle, b"password", &mut state, &mut ke1), 0);

    let mut ke3 = [0u8; KE3_LENGTH];
    assert_eq!(
        dispatch::generate_ke3(&handle, &[0u8; KE2_LENGTH - 1], &mut state, &mut ke3),
        -1
    );

    dispatch::state_destroy(state);
}

#[test]
fn out_of_order_returns_invalid_input() {
    let mut handle = None;
    dispatch::create_default(&mut handle);
    let handle = handle.unwrap();

    // KE3 on a fresh state.
    let mut state = dispatch::state_create();
    let mut ke3 = [0u8; KE3_LENGTH];
    assert_eq!(
        dispatch::generate_ke3(&handle, &[0u8; KE2_LENGTH], &mut state, &mut ke3),
        -1
    );

    // Finish on a fresh state.
    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    let mut master_key = [0u8; MASTER_KEY_LENGTH];
    assert_eq!(
        dispatch::finish(&handle, &mut state, &mut session_key, &mut master_key),
        -1
    );

    // The state is still destroyable.
    dispatch::state_destroy(state);
    dispatch::destroy(handle);
}

#[test]
fn undersized_output_buffers_are_rejected() {
    let mut handle = None;
    dispatch::create_default(&mut handle);
    let handle = handle.unwrap();

    let mut state = dispatch::state_create();
    let mut small = [0u8; REGISTRATION_REQUEST_LENGTH - 1];
    assert_eq!(
        dispatch::create_registration_request(&handle, b"password", &mut state, &mut small),
        -1
    );

    let mut small_ke1 = [0u8; KE1_LENGTH - 1];
    assert_eq!(
        dispatch::generate_ke1(&handle, b"password", &mut state, &mut small_ke1),
        -1
    );

    dispatch::state_destroy(state);
}
