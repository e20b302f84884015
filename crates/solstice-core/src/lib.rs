// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

//! Core library for the Solstice OPAQUE protocol.
//!
//! Implements the building blocks of an augmented PAKE (aPAKE): the two
//! parties derive a mutually authenticated, high-entropy session key from a
//! low-entropy secret known only to the initiator, while the responder
//! stores only a blinded credential record. All group operations run over
//! ristretto255; KDF and MAC are SHA-512 based.
//!
//! # Crate layout
//!
//! * [`types`] -- shared constants, error types, and secret byte containers.
//! * [`secure`] -- guard-paged allocations with page-protection transitions.
//! * [`crypto`] -- low-level cryptographic primitives (libsodium wrappers, HKDF).
//! * [`oprf`] -- oblivious pseudo-random function over ristretto255.
//! * [`envelope`] -- credential envelope seal/open with dual authentication tags.
//! * [`key_schedule`] -- transcript hashing and the shared HKDF key schedule.
//! * [`protocol`] -- wire-format serialization and parsing for all messages.

/// Low-level cryptographic primitives wrapping libsodium.
pub mod crypto;
/// Credential envelope seal and open operations.
pub mod envelope;
/// Transcript hashing and the two-party key schedule.
pub mod key_schedule;
/// Oblivious pseudo-random function (OPRF) over ristretto255.
pub mod oprf;
/// Wire-format serialization and parsing for protocol messages.
pub mod protocol;
/// Guard-paged secret allocations with optional page protection.
pub mod secure;
/// Shared constants, error types, and secret byte containers.
pub mod types;
