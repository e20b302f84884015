// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use std::sync::OnceLock;

use crate::types::{
    is_all_zero, labels, OpaqueError, OpaqueResult, HASH_LENGTH, MAC_LENGTH, NONCE_LENGTH,
    OPRF_SEED_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, REGISTRATION_REQUEST_LENGTH,
    SECRETBOX_KEY_LENGTH, SECRETBOX_MAC_LENGTH, SECRETBOX_NONCE_LENGTH,
};
use zeroize::Zeroize;

static SODIUM_INIT: OnceLock<bool> = OnceLock::new();

/// Initializes the libsodium backend.
///
/// Idempotent and thread-safe; every public entry point that touches the
/// backend calls this first, so callers never need to.
///
/// # Errors
///
/// Returns [`OpaqueError::CryptoError`] if the backend cannot be brought up.
pub fn init() -> OpaqueResult<()> {
    // SAFETY: sodium_init is safe to call from any thread; a negative
    // return means the library is unusable.
    let ok = *SODIUM_INIT.get_or_init(|| unsafe { libsodium_sys::sodium_init() >= 0 });
    if ok {
        Ok(())
    } else {
        Err(OpaqueError::CryptoError)
    }
}

/// Fills `buf` with cryptographically secure random bytes.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `buf` is empty.
pub fn random_bytes(buf: &mut [u8]) -> OpaqueResult<()> {
    if buf.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }
    init()?;
    // SAFETY: buf is a valid mutable slice; length matches buf.len().
    unsafe {
        libsodium_sys::randombytes_buf(buf.as_mut_ptr() as *mut _, buf.len());
    }
    Ok(())
}

/// Derives a ristretto255 key pair deterministically from a seed.
///
/// Hashes the seed with SHA-512, reduces modulo the group order to obtain
/// the private scalar, and computes the corresponding public point.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `seed` is empty.
/// Returns [`OpaqueError::CryptoError`] if the scalar reduces to zero or
/// the base-point multiplication fails.
pub fn derive_key_pair(
    seed: &[u8],
    private_key: &mut [u8; PRIVATE_KEY_LENGTH],
    public_key: &mut [u8; PUBLIC_KEY_LENGTH],
) -> OpaqueResult<()> {
    if seed.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }
    init()?;

    let mut hash = [0u8; HASH_LENGTH];
    // SAFETY: hash is a 64-byte array as required by the reduce call; seed
    // is a valid slice with its length cast from usize.
    unsafe {
        libsodium_sys::crypto_hash_sha512(hash.as_mut_ptr(), seed.as_ptr(), seed.len() as u64);
        libsodium_sys::crypto_core_ristretto255_scalar_reduce(
            private_key.as_mut_ptr(),
            hash.as_ptr(),
        );
    }
    hash.zeroize();

    if is_all_zero(private_key) {
        return Err(OpaqueError::CryptoError);
    }

    *public_key = scalarmult_base(private_key)?;
    Ok(())
}

/// Performs ristretto255 scalar multiplication: `result = scalar * point`.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidPublicKey`] if `point` is not a canonical
/// encoding or the product is the identity.
pub fn scalar_mult(
    scalar_bytes: &[u8; PRIVATE_KEY_LENGTH],
    point_bytes: &[u8; PUBLIC_KEY_LENGTH],
    result: &mut [u8; PUBLIC_KEY_LENGTH],
) -> OpaqueResult<()> {
    // SAFETY: All arrays are 32 bytes as required. Return code is checked;
    // libsodium fails on a non-canonical point or an identity result.
    unsafe {
        if libsodium_sys::crypto_scalarmult_ristretto255(
            result.as_mut_ptr(),
            scalar_bytes.as_ptr(),
            point_bytes.as_ptr(),
        ) != 0
        {
            return Err(OpaqueError::InvalidPublicKey);
        }
    }
    Ok(())
}

/// Validates that `point` is a canonical, non-identity ristretto255 group element.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidPublicKey`] if `point` has the wrong length,
/// is the identity, or is not a valid ristretto255 encoding.
pub fn validate_element(point: &[u8]) -> OpaqueResult<()> {
    if point.len() != PUBLIC_KEY_LENGTH {
        return Err(OpaqueError::InvalidPublicKey);
    }
    if is_all_zero(point) {
        return Err(OpaqueError::InvalidPublicKey);
    }
    // SAFETY: Pointer comes from a valid slice of PUBLIC_KEY_LENGTH bytes.
    unsafe {
        if libsodium_sys::crypto_core_ristretto255_is_valid_point(point.as_ptr()) != 1 {
            return Err(OpaqueError::InvalidPublicKey);
        }
    }
    Ok(())
}

/// Validates a ristretto255 public key. Identical checks to
/// [`validate_element`]; kept separate so call sites read as what they check.
pub fn validate_public_key(key: &[u8]) -> OpaqueResult<()> {
    validate_element(key)
}

/// Computes HMAC-SHA-512 over `message` using the given `key`.
///
/// An empty key is permitted (HMAC pads it to the block size), matching the
/// HKDF-Extract convention for an absent salt.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `message` is empty.
/// Returns [`OpaqueError::CryptoError`] if the HMAC init, update, or final
/// step fails.
pub fn hmac_sha512(key: &[u8], message: &[u8], mac_out: &mut [u8; MAC_LENGTH]) -> OpaqueResult<()> {
    if message.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }
    // SAFETY: State is initialized by _init before use and wiped afterwards
    // to scrub the derived ipad/opad blocks from the stack. Return codes are
    // checked.
    unsafe {
        let mut state =
            std::mem::MaybeUninit::<libsodium_sys::crypto_auth_hmacsha512_state>::uninit();
        let state_ptr = state.as_mut_ptr();
        let state_len = std::mem::size_of::<libsodium_sys::crypto_auth_hmacsha512_state>();
        if libsodium_sys::crypto_auth_hmacsha512_init(state_ptr, key.as_ptr(), key.len()) != 0
            || libsodium_sys::crypto_auth_hmacsha512_update(
                state_ptr,
                message.as_ptr(),
                message.len() as u64,
            ) != 0
            || libsodium_sys::crypto_auth_hmacsha512_final(state_ptr, mac_out.as_mut_ptr()) != 0
        {
            libsodium_sys::sodium_memzero(state_ptr as *mut _, state_len);
            return Err(OpaqueError::CryptoError);
        }
        libsodium_sys::sodium_memzero(state_ptr as *mut _, state_len);
    }
    Ok(())
}

/// Computes HMAC-SHA-512 and compares it to `expected_mac` in constant time.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `message` is empty or
/// `expected_mac` is not exactly [`MAC_LENGTH`] bytes.
/// Returns [`OpaqueError::AuthenticationError`] if the MAC does not match.
pub fn verify_hmac(key: &[u8], message: &[u8], expected_mac: &[u8]) -> OpaqueResult<()> {
    if message.is_empty() || expected_mac.len() != MAC_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }
    let mut computed = [0u8; MAC_LENGTH];
    hmac_sha512(key, message, &mut computed)?;
    // SAFETY: Both pointers come from valid slices. Lengths were verified.
    let matches = unsafe {
        libsodium_sys::sodium_memcmp(
            computed.as_ptr() as *const _,
            expected_mac.as_ptr() as *const _,
            MAC_LENGTH,
        ) == 0
    };
    computed.zeroize();
    if matches {
        Ok(())
    } else {
        Err(OpaqueError::AuthenticationError)
    }
}

/// Performs the HKDF-Extract step: `PRK = HMAC-SHA-512(salt, IKM)`.
///
/// An empty `salt` follows RFC 5869 and is treated as a hash-length string
/// of zeros.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `ikm` is empty.
/// Returns [`OpaqueError::CryptoError`] if the underlying HMAC fails.
pub fn hkdf_extract(salt: &[u8], ikm: &[u8], prk: &mut [u8; HASH_LENGTH]) -> OpaqueResult<()> {
    if ikm.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }
    if salt.is_empty() {
        let zero_salt = [0u8; HASH_LENGTH];
        hmac_sha512(&zero_salt, ikm, prk)
    } else {
        hmac_sha512(salt, ikm, prk)
    }
}

/// Performs the HKDF-Expand step, producing output keying material of
/// arbitrary length (at most `255 * 64` bytes).
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `prk` or `okm` is empty, or if
/// the requested output length exceeds the HKDF-Expand maximum.
/// Returns [`OpaqueError::CryptoError`] if the underlying HMAC fails.
pub fn hkdf_expand(prk: &[u8], info: &[u8], okm: &mut [u8]) -> OpaqueResult<()> {
    if prk.is_empty() || okm.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }

    const MAX_BLOCKS: usize = 255;

    let n = okm.len().div_ceil(HASH_LENGTH);
    if n > MAX_BLOCKS {
        return Err(OpaqueError::InvalidInput);
    }

    let mut t_prev = [0u8; HASH_LENGTH];
    let mut t_current = [0u8; HASH_LENGTH];
    let mut input = Vec::with_capacity(HASH_LENGTH + info.len() + 1);

    let result = (|| {
        for i in 1..=n {
            input.clear();
            if i > 1 {
                input.extend_from_slice(&t_prev);
            }
            input.extend_from_slice(info);
            input.push(i as u8);

            hmac_sha512(prk, &input, &mut t_current)?;

            let offset = (i - 1) * HASH_LENGTH;
            let copy_len = std::cmp::min(HASH_LENGTH, okm.len() - offset);
            okm[offset..offset + copy_len].copy_from_slice(&t_current[..copy_len]);

            std::mem::swap(&mut t_prev, &mut t_current);
        }
        Ok(())
    })();

    t_prev.zeroize();
    t_current.zeroize();
    input.zeroize();
    result
}

/// Derives the per-credential OPRF scalar key from the responder OPRF seed
/// and the registration request that created the credential.
///
/// Expands `oprf_seed` with the request as salt material and reduces the
/// output modulo the group order; a trailing counter byte is incremented
/// until the scalar is non-zero, so the derivation is deterministic for a
/// given request.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `oprf_seed` or `request` has
/// the wrong length.
/// Returns [`OpaqueError::CryptoError`] if no non-zero scalar is found
/// after 255 attempts or the underlying HMAC fails.
pub fn derive_oprf_key(
    oprf_seed: &[u8],
    request: &[u8],
    oprf_key: &mut [u8; PRIVATE_KEY_LENGTH],
) -> OpaqueResult<()> {
    if oprf_seed.len() != OPRF_SEED_LENGTH || request.len() != REGISTRATION_REQUEST_LENGTH {
        return Err(OpaqueError::InvalidInput);
    }

    let mut info = Vec::with_capacity(labels::OPRF_KEY_INFO.len() + request.len() + 1);
    info.extend_from_slice(labels::OPRF_KEY_INFO);
    info.extend_from_slice(request);
    info.push(0u8);
    let counter_offset = info.len() - 1;

    let mut okm = [0u8; PRIVATE_KEY_LENGTH];
    let mut wide = [0u8; HASH_LENGTH];

    let result = (|| {
        for counter in 0u8..=254 {
            info[counter_offset] = counter;
            hkdf_expand(oprf_seed, &info, &mut okm)?;

            wide[..PRIVATE_KEY_LENGTH].copy_from_slice(&okm);
            // SAFETY: wide is a 64-byte array, oprf_key a 32-byte array as
            // required by the reduce call.
            unsafe {
                libsodium_sys::crypto_core_ristretto255_scalar_reduce(
                    oprf_key.as_mut_ptr(),
                    wide.as_ptr(),
                );
            }
            if !is_all_zero(oprf_key) {
                return Ok(());
            }
        }
        Err(OpaqueError::CryptoError)
    })();

    okm.zeroize();
    wide.zeroize();
    info.zeroize();
    result
}

/// Encrypts `plaintext` in detached secretbox mode under the envelope nonce.
///
/// The cipher consumes the first 24 bytes of the 32-byte protocol nonce;
/// the remaining bytes still bind the derivation of the envelope keys.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `key` is not
/// [`SECRETBOX_KEY_LENGTH`] bytes, `plaintext` is empty, or `ciphertext`
/// is shorter than `plaintext`.
pub fn aead_seal(
    key: &[u8],
    plaintext: &[u8],
    nonce: &[u8; NONCE_LENGTH],
    ciphertext: &mut [u8],
    auth_tag: &mut [u8; SECRETBOX_MAC_LENGTH],
) -> OpaqueResult<()> {
    if key.len() != SECRETBOX_KEY_LENGTH || plaintext.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }
    if ciphertext.len() < plaintext.len() {
        return Err(OpaqueError::InvalidInput);
    }

    let cipher_nonce: &[u8] = &nonce[..SECRETBOX_NONCE_LENGTH];
    // SAFETY: Key is SECRETBOX_KEY_LENGTH, nonce slice is the cipher nonce
    // length, and the output buffers were checked above.
    unsafe {
        libsodium_sys::crypto_secretbox_detached(
            ciphertext.as_mut_ptr(),
            auth_tag.as_mut_ptr(),
            plaintext.as_ptr(),
            plaintext.len() as u64,
            cipher_nonce.as_ptr(),
            key.as_ptr(),
        );
    }
    Ok(())
}

/// Decrypts `ciphertext` in detached secretbox mode, verifying `auth_tag`
/// in constant time before releasing the plaintext.
///
/// # Errors
///
/// Returns [`OpaqueError::InvalidInput`] if `key` is not
/// [`SECRETBOX_KEY_LENGTH`] bytes, `ciphertext` is empty, or `plaintext`
/// is shorter than `ciphertext`.
/// Returns [`OpaqueError::AuthenticationError`] if the tag does not verify.
pub fn aead_open(
    key: &[u8],
    ciphertext: &[u8],
    nonce: &[u8; NONCE_LENGTH],
    auth_tag: &[u8; SECRETBOX_MAC_LENGTH],
    plaintext: &mut [u8],
) -> OpaqueResult<()> {
    if key.len() != SECRETBOX_KEY_LENGTH || ciphertext.is_empty() {
        return Err(OpaqueError::InvalidInput);
    }
    if plaintext.len() < ciphertext.len() {
        return Err(OpaqueError::InvalidInput);
    }

    let cipher_nonce: &[u8] = &nonce[..SECRETBOX_NONCE_LENGTH];
    // SAFETY: All buffer lengths were checked above. Return code is checked
    // for the open call; libsodium performs the tag comparison in constant
    // time.
    unsafe {
        if libsodium_sys::crypto_secretbox_open_detached(
            plaintext.as_mut_ptr(),
            ciphertext.as_ptr(),
            auth_tag.as_ptr(),
            ciphertext.len() as u64,
            cipher_nonce.as_ptr(),
            key.as_ptr(),
        ) != 0
        {
            return Err(OpaqueError::AuthenticationError);
        }
    }
    Ok(())
}

/// Generates a uniformly random, non-zero ristretto255 scalar.
pub fn random_nonzero_scalar() -> [u8; PRIVATE_KEY_LENGTH] {
    let _ = init();
    loop {
        let mut scalar = [0u8; PRIVATE_KEY_LENGTH];
        // SAFETY: Output is a 32-byte array.
        unsafe {
            libsodium_sys::crypto_core_ristretto255_scalar_random(scalar.as_mut_ptr());
        }
        if !is_all_zero(&scalar) {
            return scalar;
        }
    }
}

/// Computes the ristretto255 base-point multiplication: `result = scalar * G`.
///
/// # Errors
///
/// Returns [`OpaqueError::CryptoError`] if the scalar reduces to zero.
pub fn scalarmult_base(scalar: &[u8; PRIVATE_KEY_LENGTH]) -> OpaqueResult<[u8; PUBLIC_KEY_LENGTH]> {
    let mut result = [0u8; PUBLIC_KEY_LENGTH];
    // SAFETY: Both arrays are 32 bytes as required. Return code is checked.
    unsafe {
        if libsodium_sys::crypto_scalarmult_ristretto255_base(
            result.as_mut_ptr(),
            scalar.as_ptr(),
        ) != 0
        {
            return Err(OpaqueError::CryptoError);
        }
    }
    Ok(result)
}

/// Computes the modular inverse of a ristretto255 scalar.
///
/// # Errors
///
/// Returns [`OpaqueError::CryptoError`] if the scalar is zero.
pub fn scalar_invert(
    scalar: &[u8; PRIVATE_KEY_LENGTH],
    result: &mut [u8; PRIVATE_KEY_LENGTH],
) -> OpaqueResult<()> {
    // SAFETY: Both arrays are 32 bytes. Return code is checked.
    unsafe {
        if libsodium_sys::crypto_core_ristretto255_scalar_invert(
            result.as_mut_ptr(),
            scalar.as_ptr(),
        ) != 0
        {
            return Err(OpaqueError::CryptoError);
        }
    }
    Ok(())
}

/// Computes the SHA-512 digest of `input`.
pub fn sha512(input: &[u8], out: &mut [u8; HASH_LENGTH]) {
    // SAFETY: Output is a 64-byte array, input is a valid slice.
    unsafe {
        libsodium_sys::crypto_hash_sha512(out.as_mut_ptr(), input.as_ptr(), input.len() as u64);
    }
}

/// Computes the SHA-512 digest of the concatenation of all `parts`.
///
/// Uses the streaming SHA-512 API to avoid allocating a contiguous buffer.
pub fn sha512_multi(parts: &[&[u8]], out: &mut [u8; HASH_LENGTH]) {
    // SAFETY: State is initialized by _init before the _update and _final
    // calls that use it.
    unsafe {
        let mut state =
            std::mem::MaybeUninit::<libsodium_sys::crypto_hash_sha512_state>::uninit();
        let state_ptr = state.as_mut_ptr();
        libsodium_sys::crypto_hash_sha512_init(state_ptr);
        for part in parts {
            libsodium_sys::crypto_hash_sha512_update(
                state_ptr,
                part.as_ptr(),
                part.len() as u64,
            );
        }
        libsodium_sys::crypto_hash_sha512_final(state_ptr, out.as_mut_ptr());
    }
}
