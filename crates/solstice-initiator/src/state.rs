// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use solstice_core::crypto;
use solstice_core::types::{
    OpaqueResult, SecureBytes, CREDENTIAL_REQUEST_LENGTH, ENVELOPE_LENGTH, MAC_LENGTH,
    MASTER_KEY_LENGTH, NONCE_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH,
    REGISTRATION_REQUEST_LENGTH, SESSION_KEY_LENGTH,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Tracks which protocol step the initiator session is at.
///
/// A session follows exactly one of the two linear paths (registration or
/// authentication); any call outside that order is rejected without side
/// effects, and any protocol failure parks the state in [`Failed`].
///
/// [`Failed`]: InitiatorPhase::Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorPhase {
    /// State has been created but no protocol function has been called.
    Created,
    /// `create_registration_request` has completed; awaiting the response.
    AwaitingRegistrationResponse,
    /// `finalize_registration` has completed; the record has been emitted.
    RegistrationDone,
    /// `generate_ke1` has completed; awaiting KE2 from the responder.
    AwaitingKe2,
    /// `generate_ke3` has completed; session keys are available.
    Ke3Generated,
    /// `initiator_finish` has been called; keys have been extracted.
    Finished,
    /// A protocol or crypto step failed; the state only admits destruction.
    Failed,
}

/// Mutable session state held by the initiator across registration and
/// authentication.
///
/// All sensitive fields are zeroized on drop, and [`wipe`](Self::wipe)
/// clears them early on failure paths.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct InitiatorState {
    /// Current protocol phase. Prevents out-of-order function calls.
    #[zeroize(skip)]
    pub phase: InitiatorPhase,
    /// Copy of the password used as OPRF input.
    pub password: SecureBytes,
    /// OPRF blinding scalar masking the password on the wire.
    pub blind_scalar: [u8; PRIVATE_KEY_LENGTH],
    /// Blinded element sent as the credential request.
    pub credential_request: [u8; CREDENTIAL_REQUEST_LENGTH],
    /// Random nonce contributed by the initiator in KE1.
    pub initiator_nonce: [u8; NONCE_LENGTH],
    /// Ephemeral ristretto255 private key for a single session.
    pub ephemeral_private_key: [u8; PRIVATE_KEY_LENGTH],
    /// Ephemeral ristretto255 public key for a single session.
    pub ephemeral_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Long-term private key recovered from the envelope.
    pub initiator_private_key: [u8; PRIVATE_KEY_LENGTH],
    /// Long-term public key recovered from the envelope.
    pub initiator_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Responder public key witnessed at envelope open.
    pub responder_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Session key derived by the key exchange.
    pub session_key: [u8; SESSION_KEY_LENGTH],
    /// Master key recovered from the envelope.
    pub master_key: [u8; MASTER_KEY_LENGTH],
}

impl InitiatorState {
    /// Creates a zero-initialized initiator state.
    pub fn new() -> Self {
        Self {
            phase: InitiatorPhase::Created,
            password: SecureBytes::default(),
            blind_scalar: [0u8; PRIVATE_KEY_LENGTH],
            credential_request: [0u8; CREDENTIAL_REQUEST_LENGTH],
            initiator_nonce: [0u8; NONCE_LENGTH],
            ephemeral_private_key: [0u8; PRIVATE_KEY_LENGTH],
            ephemeral_public_key: [0u8; PUBLIC_KEY_LENGTH],
            initiator_private_key: [0u8; PRIVATE_KEY_LENGTH],
            initiator_public_key: [0u8; PUBLIC_KEY_LENGTH],
            responder_public_key: [0u8; PUBLIC_KEY_LENGTH],
            session_key: [0u8; SESSION_KEY_LENGTH],
            master_key: [0u8; MASTER_KEY_LENGTH],
        }
    }

    /// Wipes all secret fields and moves the state to the given phase.
    pub(crate) fn wipe(&mut self, phase: InitiatorPhase) {
        self.zeroize();
        self.phase = phase;
    }

    /// Wipes all secret fields and parks the state in [`InitiatorPhase::Failed`].
    pub(crate) fn fail(&mut self) {
        self.wipe(InitiatorPhase::Failed);
    }
}

impl Default for InitiatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Blinded OPRF element sent by the initiator to begin registration.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RegistrationRequest {
    /// Serialized blinded ristretto255 point.
    pub data: [u8; REGISTRATION_REQUEST_LENGTH],
}

impl RegistrationRequest {
    pub fn new() -> Self {
        Self {
            data: [0u8; REGISTRATION_REQUEST_LENGTH],
        }
    }
}

impl Default for RegistrationRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Record produced by the initiator at the end of registration.
///
/// The responder stores this record and replays the envelope to the
/// initiator during subsequent authentications.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RegistrationRecord {
    /// Sealed envelope in wire form (nonce ‖ ciphertext ‖ tag region).
    pub envelope: [u8; ENVELOPE_LENGTH],
    /// Long-term ristretto255 public key of the initiator.
    pub initiator_public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl RegistrationRecord {
    pub fn new() -> Self {
        Self {
            envelope: [0u8; ENVELOPE_LENGTH],
            initiator_public_key: [0u8; PUBLIC_KEY_LENGTH],
        }
    }
}

impl Default for RegistrationRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// First key-exchange message sent from the initiator to the responder.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Ke1Message {
    /// Random nonce contributed by the initiator.
    pub initiator_nonce: [u8; NONCE_LENGTH],
    /// Ephemeral ristretto255 public key of the initiator.
    pub initiator_ephemeral_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Blinded OPRF element derived from the password.
    pub credential_request: [u8; CREDENTIAL_REQUEST_LENGTH],
}

impl Ke1Message {
    pub fn new() -> Self {
        Self {
            initiator_nonce: [0u8; NONCE_LENGTH],
            initiator_ephemeral_public_key: [0u8; PUBLIC_KEY_LENGTH],
            credential_request: [0u8; CREDENTIAL_REQUEST_LENGTH],
        }
    }
}

impl Default for Ke1Message {
    fn default() -> Self {
        Self::new()
    }
}

/// Third key-exchange message sent from the initiator to the responder.
///
/// Carries only the MAC proving the initiator opened the envelope and
/// derived the same session keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Ke3Message {
    /// HMAC-SHA-512 tag authenticating the initiator to the responder.
    pub initiator_mac: [u8; MAC_LENGTH],
}

impl Ke3Message {
    pub fn new() -> Self {
        Self {
            initiator_mac: [0u8; MAC_LENGTH],
        }
    }
}

impl Default for Ke3Message {
    fn default() -> Self {
        Self::new()
    }
}

/// High-level handle for an OPAQUE initiator bound to a specific responder.
///
/// Stores the expected responder public key so that every registration and
/// authentication attempt can verify the responder identity. Immutable
/// after construction; safe to share across concurrent sessions.
#[derive(Zeroize)]
pub struct OpaqueInitiator {
    responder_public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl OpaqueInitiator {
    /// Creates a new initiator handle bound to the given responder key.
    ///
    /// # Errors
    ///
    /// Returns [`solstice_core::types::OpaqueError::InvalidPublicKey`] if
    /// `responder_public_key` is not a valid ristretto255 point.
    pub fn new(responder_public_key: &[u8]) -> OpaqueResult<Self> {
        crypto::init()?;
        crypto::validate_public_key(responder_public_key)?;
        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key.copy_from_slice(responder_public_key);
        Ok(Self {
            responder_public_key: key,
        })
    }

    /// Returns the responder long-term public key this initiator expects.
    pub fn responder_public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.responder_public_key
    }
}
