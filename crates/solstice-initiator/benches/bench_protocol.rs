use criterion::{criterion_group, criterion_main, Criterion};
use solstice_core::protocol;
use solstice_core::types::*;
use solstice_initiator::*;
use solstice_responder::*;

fn register(
    password: &[u8],
    responder: &OpaqueResponder,
) -> ResponderCredentials {
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
    credentials
}

fn bench_registration(c: &mut Criterion) {
    let responder = OpaqueResponder::generate().unwrap();

    c.bench_function("protocol/registration", |b| {
        b.iter(|| register(b"benchmark password", &responder))
    });
}

fn bench_full_authentication(c: &mut Criterion) {
    let responder = OpaqueResponder::generate().unwrap();
    let credentials = register(b"benchmark password", &responder);
    let initiator = OpaqueInitiator::new(responder.public_key()).unwrap();

    c.bench_function("protocol/authentication", |b| {
        b.iter(|| {
            let mut initiator_state = InitiatorState::new();
            let mut ke1 = Ke1Message::new();
            generate_ke1(b"benchmark password", &mut ke1, &mut initiator_state).unwrap();

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
            generate_ke2(
                &responder,
                &ke1_bytes,
                &credentials,
                &mut ke2,
                &mut responder_state,
            )
            .unwrap();

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
            generate_ke3(&initiator, &ke2_bytes, &mut initiator_state, &mut ke3).unwrap();

            let mut ke3_bytes = [0u8; KE3_LENGTH];
            protocol::write_ke3(&ke3.initiator_mac, &mut ke3_bytes).unwrap();

            let mut responder_session_key = [0u8; SESSION_KEY_LENGTH];
            responder_finish(&ke3_bytes, &mut responder_state, &mut responder_session_key)
                .unwrap();

            let mut session_key = [0u8; SESSION_KEY_LENGTH];
            let mut master_key = [0u8; MASTER_KEY_LENGTH];
            initiator_finish(&mut initiator_state, &mut session_key, &mut master_key).unwrap();
            (session_key, master_key)
        })
    });
}

// Timing probe for the MAC check: the valid and invalid paths should show
// no measurable difference beyond noise.
fn bench_mac_verification_timing(c: &mut Criterion) {
    use solstice_core::crypto;

    let key = [0x42u8; 32];
    let message = [0x5Au8; 256];
    let mut valid_mac = [0u8; MAC_LENGTH];
    crypto::hmac_sha512(&key, &message, &mut valid_mac).unwrap();
    let mut invalid_mac = valid_mac;
    invalid_mac[0] ^= 0x01;

    let mut group = c.benchmark_group("mac_verify");
    group.bench_function("valid", |b| {
        b.iter(|| crypto::verify_hmac(&key, &message, &valid_mac).is_ok())
    });
    group.bench_function("invalid", |b| {
        b.iter(|| crypto::verify_hmac(&key, &message, &invalid_mac).is_err())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_full_authentication,
    bench_mac_verification_timing
);
criterion_main!(benches);
