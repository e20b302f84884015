// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

//! The two-party key schedule shared by both roles.
//!
//! Both sides hash the same transcript, feed their three Diffie-Hellman
//! shares through HKDF, and split the handshake secret into a responder MAC
//! key (first half) and an initiator MAC key (second half). The roles differ
//! only in which scalars they multiply to obtain the shares.

use crate::crypto;
use crate::types::{
    labels, OpaqueResult, HASH_LENGTH, MAC_LENGTH, PUBLIC_KEY_LENGTH, SESSION_KEY_LENGTH,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Handshake secret split point: bytes `[..32]` key the responder MAC,
/// bytes `[32..]` key the initiator MAC.
const MAC_KEY_LENGTH: usize = 32;

/// Keys and tags derived from one protocol run.
///
/// Dropping the struct wipes all fields.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionSecrets {
    pub session_key: [u8; SESSION_KEY_LENGTH],
    pub responder_mac: [u8; MAC_LENGTH],
    pub initiator_mac: [u8; MAC_LENGTH],
}

/// Hashes the handshake transcript:
/// `T = SHA-512(KE1 ‖ credential_response ‖ responder_nonce ‖ responder_epk)`.
pub fn transcript_hash(
    ke1: &[u8],
    credential_response: &[u8],
    responder_nonce: &[u8],
    responder_ephemeral_public_key: &[u8],
    out: &mut [u8; HASH_LENGTH],
) {
    crypto::sha512_multi(
        &[
            ke1,
            credential_response,
            responder_nonce,
            responder_ephemeral_public_key,
        ],
        out,
    );
}

/// Runs the HKDF schedule over the transcript hash and the three DH shares.
///
/// `prk = HKDF-Extract(T, dh1 ‖ dh2 ‖ dh3)`, then the handshake secret and
/// session key are expanded with their protocol labels and both
/// authentication tags are computed over the transcript.
///
/// # Errors
///
/// Returns an error if any underlying HMAC operation fails.
pub fn derive_session(
    transcript: &[u8; HASH_LENGTH],
    dh1: &[u8; PUBLIC_KEY_LENGTH],
    dh2: &[u8; PUBLIC_KEY_LENGTH],
    dh3: &[u8; PUBLIC_KEY_LENGTH],
) -> OpaqueResult<SessionSecrets> {
    let mut ikm = [0u8; 3 * PUBLIC_KEY_LENGTH];
    ikm[..PUBLIC_KEY_LENGTH].copy_from_slice(dh1);
    ikm[PUBLIC_KEY_LENGTH..2 * PUBLIC_KEY_LENGTH].copy_from_slice(dh2);
    ikm[2 * PUBLIC_KEY_LENGTH..].copy_from_slice(dh3);

    let mut prk = [0u8; HASH_LENGTH];
    let mut handshake_secret = [0u8; HASH_LENGTH];
    let mut secrets = SessionSecrets {
        session_key: [0u8; SESSION_KEY_LENGTH],
        responder_mac: [0u8; MAC_LENGTH],
        initiator_mac: [0u8; MAC_LENGTH],
    };

    let result = (|| {
        crypto::hkdf_extract(transcript, &ikm, &mut prk)?;
        crypto::hkdf_expand(&prk, labels::HANDSHAKE_INFO, &mut handshake_secret)?;
        crypto::hkdf_expand(&prk, labels::SESSION_KEY_INFO, &mut secrets.session_key)?;

        let mut mac_input =
            Vec::with_capacity(labels::INITIATOR_MAC_INFO.len() + HASH_LENGTH + MAC_LENGTH);
        mac_input.extend_from_slice(labels::RESPONDER_MAC_INFO);
        mac_input.extend_from_slice(transcript);
        crypto::hmac_sha512(
            &handshake_secret[..MAC_KEY_LENGTH],
            &mac_input,
            &mut secrets.responder_mac,
        )?;

        mac_input.clear();
        mac_input.extend_from_slice(labels::INITIATOR_MAC_INFO);
        mac_input.extend_from_slice(transcript);
        mac_input.extend_from_slice(&secrets.responder_mac);
        crypto::hmac_sha512(
            &handshake_secret[MAC_KEY_LENGTH..],
            &mac_input,
            &mut secrets.initiator_mac,
        )?;
        Ok(())
    })();

    ikm.zeroize();
    prk.zeroize();
    handshake_secret.zeroize();
    result.map(|()| secrets)
}
