// Copyright (c) 2026 Solstice Security
// Solstice OPAQUE — Augmented PAKE over ristretto255
// Licensed under the MIT License

use crate::crypto;
use crate::types::{OpaqueError, OpaqueResult};

/// Guard-paged, swap-locked allocation for long-lived secrets.
///
/// Backed by `sodium_malloc`: the region sits between guard pages, is
/// locked out of swap where the OS allows it, and is wiped on free. Page
/// protection can be tightened between use windows with
/// [`make_readonly`](Self::make_readonly) /
/// [`make_noaccess`](Self::make_noaccess); these transitions are
/// best-effort and callers are expected to ignore their failure on
/// platforms without mprotect support.
pub struct SecureBuffer {
    ptr: *mut u8,
    len: usize,
}

impl SecureBuffer {
    /// Allocates a zero-filled secure region of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::InvalidInput`] if `len` is zero and
    /// [`OpaqueError::MemoryError`] if the allocation fails.
    pub fn new(len: usize) -> OpaqueResult<Self> {
        if len == 0 {
            return Err(OpaqueError::InvalidInput);
        }
        crypto::init()?;
        // SAFETY: sodium_malloc returns either a guarded allocation of at
        // least len bytes or null. The region is zero-initialized via memzero.
        let ptr = unsafe { libsodium_sys::sodium_malloc(len) as *mut u8 };
        if ptr.is_null() {
            return Err(OpaqueError::MemoryError);
        }
        unsafe {
            libsodium_sys::sodium_memzero(ptr as *mut _, len);
        }
        Ok(Self { ptr, len })
    }

    /// Allocates a secure region holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> OpaqueResult<Self> {
        let mut buf = Self::new(data.len())?;
        buf.data_mut().copy_from_slice(data);
        Ok(buf)
    }

    pub fn data(&self) -> &[u8] {
        // SAFETY: ptr is valid for len bytes for the lifetime of self.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid for len bytes and uniquely borrowed.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Marks the region read-only.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::MemoryError`] if the OS refuses the
    /// transition. Callers may treat this as a benign degradation.
    pub fn make_readonly(&self) -> OpaqueResult<()> {
        // SAFETY: ptr was returned by sodium_malloc.
        let rc = unsafe { libsodium_sys::sodium_mprotect_readonly(self.ptr as *mut _) };
        if rc == 0 {
            Ok(())
        } else {
            Err(OpaqueError::MemoryError)
        }
    }

    /// Revokes all access to the region until the next transition.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::MemoryError`] if the OS refuses the
    /// transition. Callers may treat this as a benign degradation.
    pub fn make_noaccess(&self) -> OpaqueResult<()> {
        // SAFETY: ptr was returned by sodium_malloc.
        let rc = unsafe { libsodium_sys::sodium_mprotect_noaccess(self.ptr as *mut _) };
        if rc == 0 {
            Ok(())
        } else {
            Err(OpaqueError::MemoryError)
        }
    }

    /// Restores read-write access to the region.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueError::MemoryError`] if the OS refuses the
    /// transition.
    pub fn make_readwrite(&self) -> OpaqueResult<()> {
        // SAFETY: ptr was returned by sodium_malloc.
        let rc = unsafe { libsodium_sys::sodium_mprotect_readwrite(self.ptr as *mut _) };
        if rc == 0 {
            Ok(())
        } else {
            Err(OpaqueError::MemoryError)
        }
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by sodium_malloc and is freed exactly
        // once. The region must be writable before sodium_free wipes it, so
        // any earlier protection transition is undone first.
        unsafe {
            libsodium_sys::sodium_mprotect_readwrite(self.ptr as *mut _);
            libsodium_sys::sodium_free(self.ptr as *mut _);
        }
    }
}

// SAFETY: SecureBuffer uniquely owns its allocation; the raw pointer is
// never aliased outside the borrow rules enforced by data()/data_mut().
unsafe impl Send for SecureBuffer {}
// SAFETY: Shared access only exposes immutable reads of the region.
unsafe impl Sync for SecureBuffer {}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBuffer([LOCKED; {}])", self.len)
    }
}
