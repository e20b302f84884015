// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const OPRF_SEED_LENGTH: usize = 32;
pub const PRIVATE_KEY_LENGTH: usize = 32;
pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const MASTER_KEY_LENGTH: usize = 32;
pub const MASKING_KEY_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 32;
pub const MAC_LENGTH: usize = 64;
pub const HASH_LENGTH: usize = 64;
pub const SESSION_KEY_LENGTH: usize = 64;

pub const SECRETBOX_KEY_LENGTH: usize = 32;
pub const SECRETBOX_NONCE_LENGTH: usize = 24;
pub const SECRETBOX_MAC_LENGTH: usize = 16;

pub const ENVELOPE_PLAINTEXT_LENGTH: usize =
    PRIVATE_KEY_LENGTH + PUBLIC_KEY_LENGTH + MASTER_KEY_LENGTH;
/// Outer transcript MAC (truncated HMAC-SHA-512) plus the inner cipher tag.
pub const ENVELOPE_TAG_LENGTH: usize = 48;
pub const ENVELOPE_OUTER_TAG_LENGTH: usize = ENVELOPE_TAG_LENGTH - SECRETBOX_MAC_LENGTH;
pub const ENVELOPE_LENGTH: usize = NONCE_LENGTH + ENVELOPE_PLAINTEXT_LENGTH + ENVELOPE_TAG_LENGTH;

pub const REGISTRATION_REQUEST_LENGTH: usize = 32;
pub const REGISTRATION_RESPONSE_LENGTH: usize =
    PUBLIC_KEY_LENGTH + PUBLIC_KEY_LENGTH + MASKING_KEY_LENGTH;
pub const REGISTRATION_RECORD_LENGTH: usize = ENVELOPE_LENGTH + PUBLIC_KEY_LENGTH;
pub const CREDENTIAL_REQUEST_LENGTH: usize = REGISTRATION_REQUEST_LENGTH;
pub const CREDENTIAL_RESPONSE_LENGTH: usize = PUBLIC_KEY_LENGTH + ENVELOPE_LENGTH;

pub const KE1_LENGTH: usize = NONCE_LENGTH + PUBLIC_KEY_LENGTH + CREDENTIAL_REQUEST_LENGTH;
pub const KE2_LENGTH: usize =
    NONCE_LENGTH + PUBLIC_KEY_LENGTH + CREDENTIAL_RESPONSE_LENGTH + MAC_LENGTH;
pub const KE3_LENGTH: usize = MAC_LENGTH;

pub const MAX_PASSWORD_LENGTH: usize = 4096;

const _: () = assert!(PRIVATE_KEY_LENGTH == PUBLIC_KEY_LENGTH);
const _: () = assert!(PRIVATE_KEY_LENGTH == 32);
const _: () = assert!(NONCE_LENGTH >= SECRETBOX_NONCE_LENGTH);
const _: () = assert!(MAC_LENGTH == 64);
const _: () = assert!(ENVELOPE_LENGTH == 176);
const _: () = assert!(REGISTRATION_RESPONSE_LENGTH == 96);
const _: () = assert!(REGISTRATION_RECORD_LENGTH == 208);
const _: () = assert!(CREDENTIAL_RESPONSE_LENGTH == 208);
const _: () = assert!(KE1_LENGTH == 96);
const _: () = assert!(KE2_LENGTH == 336);
const _: () = assert!(KE3_LENGTH == 64);

/// Key-derivation info strings. These are part of the wire protocol; a
/// single byte change breaks interoperability.
pub mod labels {
    pub const ENVELOPE_KEY_INFO: &[u8] = b"EnvelopeKey";
    pub const ENVELOPE_MAC_INFO: &[u8] = b"EnvelopeMAC";
    pub const HANDSHAKE_INFO: &[u8] = b"Handshake";
    pub const SESSION_KEY_INFO: &[u8] = b"SessionKey";
    pub const RESPONDER_MAC_INFO: &[u8] = b"ServerMAC";
    pub const INITIATOR_MAC_INFO: &[u8] = b"ClientMAC";
    pub const OPRF_KEY_INFO: &[u8] = b"OPRF";
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueError {
    #[error("invalid input")]
    InvalidInput,
    #[error("cryptographic operation failed")]
    CryptoError,
    #[error("memory error")]
    MemoryError,
    #[error("validation error")]
    ValidationError,
    #[error("authentication error")]
    AuthenticationError,
    #[error("invalid public key")]
    InvalidPublicKey,
}

impl OpaqueError {
    pub fn to_c_int(self) -> i32 {
        match self {
            OpaqueError::InvalidInput => -1,
            OpaqueError::CryptoError => -2,
            OpaqueError::MemoryError => -3,
            OpaqueError::ValidationError => -4,
            OpaqueError::AuthenticationError => -5,
            OpaqueError::InvalidPublicKey => -6,
        }
    }
}

pub type OpaqueResult<T> = Result<T, OpaqueError>;

/// Heap-allocated secret bytes, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    pub fn new(len: usize) -> Self {
        Self(vec![0u8; len])
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self(data.to_vec())
    }

    pub fn data(&self) -> &[u8] {
        &self.0
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        let mut s = self;
        std::mem::take(&mut s.0)
    }
}

impl std::ops::Deref for SecureBytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::DerefMut for SecureBytes {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl Default for SecureBytes {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBytes([REDACTED; {}])", self.0.len())
    }
}

/// Sealed credential envelope: nonce ‖ ciphertext ‖ tag region.
///
/// The tag region is the 32-byte outer transcript MAC followed by the
/// 16-byte inner cipher tag.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Envelope {
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: [u8; ENVELOPE_PLAINTEXT_LENGTH],
    pub auth_tag: [u8; ENVELOPE_TAG_LENGTH],
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            nonce: [0u8; NONCE_LENGTH],
            ciphertext: [0u8; ENVELOPE_PLAINTEXT_LENGTH],
            auth_tag: [0u8; ENVELOPE_TAG_LENGTH],
        }
    }

    /// Parses an envelope from its 176-byte wire form.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidInput`] if `data` is not exactly
    /// [`ENVELOPE_LENGTH`] bytes.
    pub fn from_bytes(data: &[u8]) -> OpaqueResult<Self> {
        if data.len() != ENVELOPE_LENGTH {
            return Err(OpaqueError::InvalidInput);
        }
        let mut env = Self::new();
        env.nonce.copy_from_slice(&data[..NONCE_LENGTH]);
        env.ciphertext
            .copy_from_slice(&data[NONCE_LENGTH..NONCE_LENGTH + ENVELOPE_PLAINTEXT_LENGTH]);
        env.auth_tag
            .copy_from_slice(&data[NONCE_LENGTH + ENVELOPE_PLAINTEXT_LENGTH..]);
        Ok(env)
    }

    /// Writes the 176-byte wire form into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidInput`] if `out` is shorter than
    /// [`ENVELOPE_LENGTH`].
    pub fn write_bytes(&self, out: &mut [u8]) -> OpaqueResult<()> {
        if out.len() < ENVELOPE_LENGTH {
            return Err(OpaqueError::InvalidInput);
        }
        out[..NONCE_LENGTH].copy_from_slice(&self.nonce);
        out[NONCE_LENGTH..NONCE_LENGTH + ENVELOPE_PLAINTEXT_LENGTH]
            .copy_from_slice(&self.ciphertext);
        out[NONCE_LENGTH + ENVELOPE_PLAINTEXT_LENGTH..ENVELOPE_LENGTH]
            .copy_from_slice(&self.auth_tag);
        Ok(())
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    unsafe {
        libsodium_sys::sodium_memcmp(
            a.as_ptr() as *const _,
            b.as_ptr() as *const _,
            a.len(),
        ) == 0
    }
}

pub fn is_all_zero(data: &[u8]) -> bool {
    unsafe { libsodium_sys::sodium_is_zero(data.as_ptr(), data.len()) == 1 }
}
