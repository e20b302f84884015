//! State-machine ordering, size-exactness, and zeroization checks.

use solstice_core::protocol;
use solstice_core::types::*;
use solstice_initiator::*;
use solstice_responder::*;

fn run_registration(
    password: &[u8],
    responder: &OpaqueResponder,
) -> (ResponderCredentials, InitiatorState) {
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();
    let mut state = InitiatorState::new();

    let mut request = RegistrationRequest::new();
    create_registration_request(password, &mut request, &mut state).unwrap();

    let mut response = RegistrationResponse::new();
    let mut credentials = ResponderCredentials::new();
    create_registration_response(responder, &request.data, &mut response, &mut credentials)
        .unwrap();

    let mut record = RegistrationRecord::new();
    finalize_registration(
        &initiator,
        &response.data,
        &[0x11u8; MASTER_KEY_LENGTH],
        &mut state,
        &mut record,
    )
    .unwrap();

    let mut record_bytes = [0u8; REGISTRATION_RECORD_LENGTH];
    protocol::write_registration_record(
        &record.envelope,
        &record.initiator_public_key,
        &mut record_bytes,
    )
    .unwrap();
    store_registration_record(&record_bytes, &mut credentials).unwrap();
    (credentials, state)
}

#[test]
fn ke3_on_fresh_state_is_rejected() {
    let responder = OpaqueResponder::generate().unwrap();
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut ke3 = Ke3Message::new();
    let err = generate_ke3(&initiator, &[0u8; KE2_LENGTH], &mut state, &mut ke3).unwrap_err();
    assert_eq!(err, OpaqueError::InvalidInput);
    assert_eq!(err.to_c_int(), -1);

    // The rejection has no side effects: the state is still fresh and a
    // normal KE1 still works.
    assert_eq!(state.phase, InitiatorPhase::Created);
    let mut ke1 = Ke1Message::new();
    generate_ke1(b"password", &mut ke1, &mut state).unwrap();
}

#[test]
fn truncated_ke2_is_rejected_before_crypto() {
    let responder = OpaqueResponder::generate().unwrap();
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut ke1 = Ke1Message::new();
    generate_ke1(b"password", &mut ke1, &mut state).unwrap();

    let mut ke3 = Ke3Message::new();
    let err =
        generate_ke3(&initiator, &[0u8; KE2_LENGTH - 1], &mut state, &mut ke3).unwrap_err();
    assert_eq!(err, OpaqueError::InvalidInput);

    // Size rejection leaves the session intact and still awaiting KE2.
    assert_eq!(state.phase, InitiatorPhase::AwaitingKe2);
}

#[test]
fn oversized_ke2_is_rejected() {
    let responder = OpaqueResponder::generate().unwrap();
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut ke1 = Ke1Message::new();
    generate_ke1(b"password", &mut ke1, &mut state).unwrap();

    let mut ke3 = Ke3Message::new();
    assert_eq!(
        generate_ke3(&initiator, &[0u8; KE2_LENGTH + 1], &mut state, &mut ke3),
        Err(OpaqueError::InvalidInput)
    );
}

#[test]
fn registration_response_size_is_exact() {
    let responder = OpaqueResponder::generate().unwrap();
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut request = RegistrationRequest::new();
    create_registration_request(b"password", &mut request, &mut state).unwrap();

    let mut record = RegistrationRecord::new();
    assert_eq!(
        finalize_registration(
            &initiator,
            &[0u8; REGISTRATION_RESPONSE_LENGTH - 1],
            &[0x11u8; MASTER_KEY_LENGTH],
            &mut state,
            &mut record,
        ),
        Err(OpaqueError::InvalidInput)
    );
    assert_eq!(state.phase, InitiatorPhase::AwaitingRegistrationResponse);
}

#[test]
fn master_key_size_is_exact() {
    let responder = OpaqueResponder::generate().unwrap();
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut request = RegistrationRequest::new();
    create_registration_request(b"password", &mut request, &mut state).unwrap();

    let mut record = RegistrationRecord::new();
    assert_eq!(
        finalize_registration(
            &initiator,
            &[0u8; REGISTRATION_RESPONSE_LENGTH],
            &[0x11u8; MASTER_KEY_LENGTH - 1],
            &mut state,
            &mut record,
        ),
        Err(OpaqueError::InvalidInput)
    );
}

#[test]
fn finish_before_ke3_is_rejected() {
    let mut state = InitiatorState::new();
    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    let mut master_key = [0u8; MASTER_KEY_LENGTH];
    assert_eq!(
        initiator_finish(&mut state, &mut session_key, &mut master_key),
        Err(OpaqueError::InvalidInput)
    );
}

#[test]
fn state_cannot_be_reused_across_flows() {
    let responder = OpaqueResponder::generate().unwrap();
    let (_, mut state) = run_registration(b"password", &responder);
    assert_eq!(state.phase, InitiatorPhase::RegistrationDone);

    // A finished registration state cannot start an authentication.
    let mut ke1 = Ke1Message::new();
    assert_eq!(
        generate_ke1(b"password", &mut ke1, &mut state),
        Err(OpaqueError::InvalidInput)
    );

    // Nor can it run a second registration.
    let mut request = RegistrationRequest::new();
    assert_eq!(
        create_registration_request(b"password", &mut request, &mut state),
        Err(OpaqueError::InvalidInput)
    );
}

#[test]
fn registration_state_is_wiped_after_finalize() {
    let responder = OpaqueResponder::generate().unwrap();
    let (_, state) = run_registration(b"password", &responder);

    assert!(state.password.is_empty());
    assert!(state.blind_scalar.iter().all(|&b| b == 0));
    assert!(state.initiator_private_key.iter().all(|&b| b == 0));
}

#[test]
fn authentication_state_is_wiped_after_finish() {
    let responder = OpaqueResponder::generate().unwrap();
    let (credentials, _) = run_registration(b"password", &responder);
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut ke1 = Ke1Message::new();
    generate_ke1(b"password", &mut ke1, &mut state).unwrap();

    let mut ke1_bytes = [0u8; KE1_LENGTH];
    protocol::write_ke1(
        &ke1.initiator_nonce,
        &ke1.initiator_ephemeral_public_key,
        &ke1.credential_request,
        &mut ke1_bytes,
    )
    .unwrap();

    let mut responder_state = ResponderState::new();
    let mut ke2 = Ke2Message::new();
    generate_ke2(&responder, &ke1_bytes, &credentials, &mut ke2, &mut responder_state).unwrap();

    let mut ke2_bytes = [0u8; KE2_LENGTH];
    protocol::write_ke2(
        &ke2.responder_nonce,
        &ke2.responder_ephemeral_public_key,
        &ke2.credential_response,
        &ke2.responder_mac,
        &mut ke2_bytes,
    )
    .unwrap();

    let mut ke3 = Ke3Message::new();
    generate_ke3(&initiator, &ke2_bytes, &mut state, &mut ke3).unwrap();

    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    let mut master_key = [0u8; MASTER_KEY_LENGTH];
    initiator_finish(&mut state, &mut session_key, &mut master_key).unwrap();

    // Every secret field is zero after finish; only the extracted copies
    // survive.
    assert!(state.password.is_empty());
    assert!(state.session_key.iter().all(|&b| b == 0));
    assert!(state.master_key.iter().all(|&b| b == 0));
    assert!(state.ephemeral_private_key.iter().all(|&b| b == 0));
    assert!(state.initiator_private_key.iter().all(|&b| b == 0));
    assert!(!session_key.iter().all(|&b| b == 0));

    // A second finish returns nothing.
    assert_eq!(
        initiator_finish(&mut state, &mut session_key, &mut master_key),
        Err(OpaqueError::InvalidInput)
    );

    // The responder half completes normally.
    let mut ke3_bytes = [0u8; KE3_LENGTH];
    protocol::write_ke3(&ke3.initiator_mac, &mut ke3_bytes).unwrap();
    let mut responder_session_key = [0u8; SESSION_KEY_LENGTH];
    responder_finish(&ke3_bytes, &mut responder_state, &mut responder_session_key).unwrap();
    assert_eq!(responder_session_key, session_key);
}

#[test]
fn failed_state_stays_failed() {
    let responder = OpaqueResponder::generate().unwrap();
    let (credentials, _) = run_registration(b"password", &responder);
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    let mut state = InitiatorState::new();
    let mut ke1 = Ke1Message::new();
    generate_ke1(b"wrong password", &mut ke1, &mut state).unwrap();

    let mut ke1_bytes = [0u8; KE1_LENGTH];
    protocol::write_ke1(
        &ke1.initiator_nonce,
        &ke1.initiator_ephemeral_public_key,
        &ke1.credential_request,
        &mut ke1_bytes,
    )
    .unwrap();

    let mut responder_state = ResponderState::new();
    let mut ke2 = Ke2Message::new();
    generate_ke2(&responder, &ke1_bytes, &credentials, &mut ke2, &mut responder_state).unwrap();

    let mut ke2_bytes = [0u8; KE2_LENGTH];
    protocol::write_ke2(
        &ke2.responder_nonce,
        &ke2.responder_ephemeral_public_key,
        &ke2.credential_response,
        &ke2.responder_mac,
        &mut ke2_bytes,
    )
    .unwrap();

    let mut ke3 = Ke3Message::new();
    assert_eq!(
        generate_ke3(&initiator, &ke2_bytes, &mut state, &mut ke3),
        Err(OpaqueError::AuthenticationError)
    );
    assert_eq!(state.phase, InitiatorPhase::Failed);
    assert!(state.password.is_empty());

    // Every further call on the failed state is rejected; destruction via
    // drop remains the only exit.
    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    let mut master_key = [0u8; MASTER_KEY_LENGTH];
    assert_eq!(
        initiator_finish(&mut state, &mut session_key, &mut master_key),
        Err(OpaqueError::InvalidInput)
    );
    assert_eq!(
        generate_ke3(&initiator, &ke2_bytes, &mut state, &mut ke3),
        Err(OpaqueError::InvalidInput)
    );
}

#[test]
fn responder_out_of_order_calls_are_rejected() {
    let responder = OpaqueResponder::generate().unwrap();
    let (credentials, _) = run_registration(b"password", &responder);

    // KE3 before KE2.
    let mut state = ResponderState::new();
    let mut session_key = [0u8; SESSION_KEY_LENGTH];
    assert_eq!(
        responder_finish(&[0u8; KE3_LENGTH], &mut state, &mut session_key),
        Err(OpaqueError::InvalidInput)
    );

    // Truncated KE1.
    let mut ke2 = Ke2Message::new();
    assert_eq!(
        generate_ke2(
            &responder,
            &[0u8; KE1_LENGTH - 1],
            &credentials,
            &mut ke2,
            &mut state
        ),
        Err(OpaqueError::InvalidInput)
    );

    // Unregistered credentials.
    let empty = ResponderCredentials::new();
    assert_eq!(
        generate_ke2(&responder, &[0u8; KE1_LENGTH], &empty, &mut ke2, &mut state),
        Err(OpaqueError::ValidationError)
    );
}
