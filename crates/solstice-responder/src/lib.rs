// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

//! Responder (server) role of the Solstice OPAQUE protocol.
//!
//! The responder holds a long-term ristretto255 key pair and a 32-byte OPRF
//! seed. Per credential it persists the uploaded registration record, a
//! masking key, and the registration-time OPRF key, and it never learns the
//! initiator's password or the OPRF output.

mod authentication;
mod registration;
mod state;

pub use authentication::{generate_ke2, responder_finish};
pub use registration::{create_registration_response, store_registration_record};
pub use state::{
    Ke2Message, OpaqueResponder, RegistrationResponse, ResponderCredentials, ResponderKeyPair,
    ResponderPhase, ResponderState,
};
