// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

//! Initiator (client) role of the Solstice OPAQUE protocol.
//!
//! Covers both the two-message registration flow and the three-message
//! authenticated key exchange. The initiator holds only the password; the
//! responder holds a blinded credential record, so a stolen record admits
//! no offline dictionary attack without interacting with the responder's
//! OPRF key.

/// Password registration flow for the initiator.
mod registration;
/// Authenticated key exchange flow for the initiator.
mod authentication;
/// Protocol state types and message containers used by the initiator.
mod state;

pub use authentication::{generate_ke1, generate_ke3, initiator_finish};
pub use registration::{create_registration_request, finalize_registration};
pub use state::{
    InitiatorPhase, InitiatorState, Ke1Message, Ke3Message, OpaqueInitiator, RegistrationRecord,
    RegistrationRequest,
};
