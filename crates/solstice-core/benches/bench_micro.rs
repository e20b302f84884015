use criterion::{criterion_group, criterion_main, Criterion};
use solstice_core::types::*;
use solstice_core::{crypto, envelope, oprf};

fn bench_ristretto_keygen(c: &mut Criterion) {
    c.bench_function("ristretto255/keygen", |b| {
        b.iter(|| {
            let scalar = crypto::random_nonzero_scalar();
            crypto::scalarmult_base(&scalar).unwrap()
        })
    });
}

fn bench_ristretto_dh(c: &mut Criterion) {
    let scalar = crypto::random_nonzero_scalar();
    let point = crypto::scalarmult_base(&crypto::random_nonzero_scalar()).unwrap();

    c.bench_function("ristretto255/single_dh", |b| {
        let mut result = [0u8; PUBLIC_KEY_LENGTH];
        b.iter(|| {
            crypto::scalar_mult(&scalar, &point, &mut result).unwrap();
        })
    });
}

fn bench_hash_to_group(c: &mut Criterion) {
    c.bench_function("oprf/hash_to_group", |b| {
        let mut point = [0u8; PUBLIC_KEY_LENGTH];
        b.iter(|| {
            oprf::hash_to_group(b"benchmark password input", &mut point).unwrap();
        })
    });
}

fn bench_oprf_blind_finalize(c: &mut Criterion) {
    let oprf_key = crypto::random_nonzero_scalar();

    c.bench_function("oprf/blind_evaluate_finalize", |b| {
        b.iter(|| {
            let mut blinded = [0u8; PUBLIC_KEY_LENGTH];
            let mut blind_scalar = [0u8; PRIVATE_KEY_LENGTH];
            oprf::blind(b"benchmark password", &mut blinded, &mut blind_scalar).unwrap();

            let mut evaluated = [0u8; PUBLIC_KEY_LENGTH];
            oprf::evaluate(&blinded, &oprf_key, &mut evaluated).unwrap();

            let mut output = [0u8; HASH_LENGTH];
            oprf::finalize(b"benchmark password", &blind_scalar, &evaluated, &mut output)
                .unwrap();
            output
        })
    });
}

fn bench_hkdf(c: &mut Criterion) {
    let mut prk = [0u8; HASH_LENGTH];
    crypto::hkdf_extract(b"bench salt", b"bench ikm", &mut prk).unwrap();

    c.bench_function("hkdf/expand_64", |b| {
        let mut okm = [0u8; 64];
        b.iter(|| {
            crypto::hkdf_expand(&prk, b"bench info", &mut okm).unwrap();
        })
    });
}

fn bench_envelope_seal_open(c: &mut Criterion) {
    let randomized_pwd = [0x42u8; HASH_LENGTH];
    let responder_sk = crypto::random_nonzero_scalar();
    let responder_pk = crypto::scalarmult_base(&responder_sk).unwrap();
    let initiator_sk = crypto::random_nonzero_scalar();
    let initiator_pk = crypto::scalarmult_base(&initiator_sk).unwrap();
    let master_key = [0xA5u8; MASTER_KEY_LENGTH];

    c.bench_function("envelope/seal", |b| {
        b.iter(|| {
            let mut env = Envelope::new();
            envelope::seal(
                &randomized_pwd,
                &responder_pk,
                &initiator_sk,
                &initiator_pk,
                &master_key,
                &mut env,
            )
            .unwrap();
            env
        })
    });

    let mut env = Envelope::new();
    envelope::seal(
        &randomized_pwd,
        &responder_pk,
        &initiator_sk,
        &initiator_pk,
        &master_key,
        &mut env,
    )
    .unwrap();

    c.bench_function("envelope/open", |b| {
        let mut rpk = [0u8; PUBLIC_KEY_LENGTH];
        let mut isk = [0u8; PRIVATE_KEY_LENGTH];
        let mut ipk = [0u8; PUBLIC_KEY_LENGTH];
        let mut mk = [0u8; MASTER_KEY_LENGTH];
        b.iter(|| {
            envelope::open(
                &env,
                &randomized_pwd,
                &responder_pk,
                &mut rpk,
                &mut isk,
                &mut ipk,
                &mut mk,
            )
            .unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_ristretto_keygen,
    bench_ristretto_dh,
    bench_hash_to_group,
    bench_oprf_blind_finalize,
    bench_hkdf,
    bench_envelope_seal_open
);
criterion_main!(benches);
