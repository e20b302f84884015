// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use solstice_core::crypto;
use solstice_core::secure::SecureBuffer;
use solstice_core::types::{
    constant_time_eq, OpaqueError, OpaqueResult, CREDENTIAL_RESPONSE_LENGTH, ENVELOPE_LENGTH,
    MAC_LENGTH, MASKING_KEY_LENGTH, NONCE_LENGTH, OPRF_SEED_LENGTH, PRIVATE_KEY_LENGTH,
    PUBLIC_KEY_LENGTH, REGISTRATION_RESPONSE_LENGTH, SESSION_KEY_LENGTH,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Tracks which protocol step the responder session is at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderPhase {
    /// State has been created but no protocol function has been called.
    Created,
    /// `generate_ke2` has completed; awaiting KE3 from the initiator.
    AwaitingKe3,
    /// `responder_finish` has been called; the session key was extracted.
    Finished,
    /// A protocol or crypto step failed; the state only admits destruction.
    Failed,
}

/// Mutable session state held by the responder for one key exchange.
///
/// All sensitive fields are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ResponderState {
    #[zeroize(skip)]
    pub phase: ResponderPhase,
    /// Ephemeral ristretto255 private key for this session.
    pub ephemeral_private_key: [u8; PRIVATE_KEY_LENGTH],
    /// Ephemeral ristretto255 public key for this session.
    pub ephemeral_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Ephemeral public key the initiator sent in KE1.
    pub initiator_ephemeral_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Session key derived by the key exchange.
    pub session_key: [u8; SESSION_KEY_LENGTH],
    /// MAC the initiator must present in KE3.
    pub expected_initiator_mac: [u8; MAC_LENGTH],
}

impl ResponderState {
    /// Creates a zero-initialized responder state.
    pub fn new() -> Self {
        Self {
            phase: ResponderPhase::Created,
            ephemeral_private_key: [0u8; PRIVATE_KEY_LENGTH],
            ephemeral_public_key: [0u8; PUBLIC_KEY_LENGTH],
            initiator_ephemeral_public_key: [0u8; PUBLIC_KEY_LENGTH],
            session_key: [0u8; SESSION_KEY_LENGTH],
            expected_initiator_mac: [0u8; MAC_LENGTH],
        }
    }

    /// Wipes all secret fields and moves the state to the given phase.
    pub(crate) fn wipe(&mut self, phase: ResponderPhase) {
        self.zeroize();
        self.phase = phase;
    }

    /// Wipes all secret fields and parks the state in [`ResponderPhase::Failed`].
    pub(crate) fn fail(&mut self) {
        self.wipe(ResponderPhase::Failed);
    }
}

impl Default for ResponderState {
    fn default() -> Self {
        Self::new()
    }
}

/// Long-term ristretto255 key pair of a responder.
#[derive(Debug, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct ResponderKeyPair {
    pub private_key: [u8; PRIVATE_KEY_LENGTH],
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl ResponderKeyPair {
    /// Generates a fresh random key pair.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::CryptoError`] if the backend fails.
    pub fn generate() -> OpaqueResult<Self> {
        crypto::init()?;
        let private_key = crypto::random_nonzero_scalar();
        let public_key = crypto::scalarmult_base(&private_key)?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Builds a key pair from an existing private scalar, computing the
    /// matching public key.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidInput`] if `private_key` has the wrong
    /// length, and [`OpaqueError::CryptoError`] if it reduces to zero.
    pub fn from_private_key(private_key: &[u8]) -> OpaqueResult<Self> {
        if private_key.len() != PRIVATE_KEY_LENGTH {
            return Err(OpaqueError::InvalidInput);
        }
        crypto::init()?;
        let sk: &[u8; PRIVATE_KEY_LENGTH] = private_key
            .try_into()
            .map_err(|_| OpaqueError::InvalidInput)?;
        let public_key = crypto::scalarmult_base(sk)?;
        let mut kp = Self {
            private_key: [0u8; PRIVATE_KEY_LENGTH],
            public_key,
        };
        kp.private_key.copy_from_slice(private_key);
        Ok(kp)
    }

    /// Builds a key pair from stored private and public halves, verifying
    /// that they belong together.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidPublicKey`] if `public_key` is
    /// malformed or does not match `private_key`.
    pub fn from_keys(private_key: &[u8], public_key: &[u8]) -> OpaqueResult<Self> {
        if private_key.len() != PRIVATE_KEY_LENGTH || public_key.len() != PUBLIC_KEY_LENGTH {
            return Err(OpaqueError::InvalidInput);
        }
        crypto::init()?;
        crypto::validate_public_key(public_key)?;

        let sk: &[u8; PRIVATE_KEY_LENGTH] = private_key
            .try_into()
            .map_err(|_| OpaqueError::InvalidInput)?;
        let derived = crypto::scalarmult_base(sk)?;
        if !constant_time_eq(public_key, &derived) {
            return Err(OpaqueError::InvalidPublicKey);
        }

        let mut kp = Self {
            private_key: [0u8; PRIVATE_KEY_LENGTH],
            public_key: [0u8; PUBLIC_KEY_LENGTH],
        };
        kp.private_key.copy_from_slice(private_key);
        kp.public_key.copy_from_slice(public_key);
        Ok(kp)
    }

    /// Derives a key pair deterministically from a seed.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidInput`] if `seed` is empty, and
    /// [`OpaqueError::CryptoError`] if the derived scalar is zero.
    pub fn from_seed(seed: &[u8]) -> OpaqueResult<Self> {
        let mut kp = Self {
            private_key: [0u8; PRIVATE_KEY_LENGTH],
            public_key: [0u8; PUBLIC_KEY_LENGTH],
        };
        crypto::derive_key_pair(seed, &mut kp.private_key, &mut kp.public_key)?;
        Ok(kp)
    }
}

/// Registration response emitted by the responder:
/// evaluated element ‖ responder public key ‖ masking key.
pub struct RegistrationResponse {
    pub data: [u8; REGISTRATION_RESPONSE_LENGTH],
}

impl RegistrationResponse {
    pub fn new() -> Self {
        Self {
            data: [0u8; REGISTRATION_RESPONSE_LENGTH],
        }
    }
}

impl Default for RegistrationResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Second key-exchange message sent from the responder to the initiator.
pub struct Ke2Message {
    /// Random nonce contributed by the responder.
    pub responder_nonce: [u8; NONCE_LENGTH],
    /// Ephemeral ristretto255 public key of the responder.
    pub responder_ephemeral_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Evaluated element and stored envelope for this credential.
    pub credential_response: [u8; CREDENTIAL_RESPONSE_LENGTH],
    /// HMAC-SHA-512 tag authenticating the responder to the initiator.
    pub responder_mac: [u8; MAC_LENGTH],
}

impl Ke2Message {
    pub fn new() -> Self {
        Self {
            responder_nonce: [0u8; NONCE_LENGTH],
            responder_ephemeral_public_key: [0u8; PUBLIC_KEY_LENGTH],
            credential_response: [0u8; CREDENTIAL_RESPONSE_LENGTH],
            responder_mac: [0u8; MAC_LENGTH],
        }
    }
}

impl Default for Ke2Message {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the responder persists for one registered credential.
///
/// Populated in two steps: [`create_registration_response`] stores the
/// per-credential OPRF key and masking key, and
/// [`store_registration_record`] adds the envelope and initiator public key
/// once the initiator uploads its record. Layout-stable across restarts.
///
/// [`create_registration_response`]: crate::create_registration_response
/// [`store_registration_record`]: crate::store_registration_record
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ResponderCredentials {
    /// Sealed envelope from the registration record, replayed in KE2.
    pub envelope: [u8; ENVELOPE_LENGTH],
    /// Long-term public key of the registered initiator.
    pub initiator_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Per-credential OPRF key, fixed at registration time.
    pub oprf_key: [u8; PRIVATE_KEY_LENGTH],
    /// Responder-contributed masking key echoed in the registration response.
    pub masking_key: [u8; MASKING_KEY_LENGTH],
    /// Whether a registration record has been stored.
    #[zeroize(skip)]
    pub registered: bool,
}

impl ResponderCredentials {
    pub fn new() -> Self {
        Self {
            envelope: [0u8; ENVELOPE_LENGTH],
            initiator_public_key: [0u8; PUBLIC_KEY_LENGTH],
            oprf_key: [0u8; PRIVATE_KEY_LENGTH],
            masking_key: [0u8; MASKING_KEY_LENGTH],
            registered: false,
        }
    }
}

impl Default for ResponderCredentials {
    fn default() -> Self {
        Self::new()
    }
}

/// High-level handle for an OPAQUE responder.
///
/// Holds the long-term key pair and the OPRF seed. The seed lives in a
/// guard-paged allocation that is locked out of swap and marked read-only
/// after construction where the OS allows it; both fields are immutable
/// afterwards and safe to share across concurrent sessions.
pub struct OpaqueResponder {
    keypair: ResponderKeyPair,
    oprf_seed: SecureBuffer,
}

impl OpaqueResponder {
    /// Creates a responder from an existing key pair and OPRF seed.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidInput`] if `oprf_seed` has the wrong
    /// length, [`OpaqueError::InvalidPublicKey`] if the key pair's public
    /// half is malformed, and [`OpaqueError::MemoryError`] if the secure
    /// allocation fails.
    pub fn new(keypair: ResponderKeyPair, oprf_seed: &[u8]) -> OpaqueResult<Self> {
        if oprf_seed.len() != OPRF_SEED_LENGTH {
            return Err(OpaqueError::InvalidInput);
        }
        crypto::validate_public_key(&keypair.public_key)?;
        let seed = SecureBuffer::from_slice(oprf_seed)?;
        // Page protection is defense-in-depth; platforms without mprotect
        // support still run correctly.
        let _ = seed.make_readonly();
        Ok(Self {
            keypair,
            oprf_seed: seed,
        })
    }

    /// Creates a responder with a fresh random key pair and OPRF seed.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::CryptoError`] if the backend fails.
    pub fn generate() -> OpaqueResult<Self> {
        let keypair = ResponderKeyPair::generate()?;
        let mut seed = [0u8; OPRF_SEED_LENGTH];
        crypto::random_bytes(&mut seed)?;
        let responder = Self::new(keypair, &seed);
        seed.zeroize();
        responder
    }

    pub fn keypair(&self) -> &ResponderKeyPair {
        &self.keypair
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.keypair.public_key
    }

    pub(crate) fn oprf_seed(&self) -> &[u8] {
        self.oprf_seed.data()
    }
}
