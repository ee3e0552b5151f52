//! Random MIME boundary tokens drawn from the OS random source

use crate::error::{MailError, Result};
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of a generated boundary token
pub const BOUNDARY_LENGTH: usize = 16;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a [`BOUNDARY_LENGTH`]-character alphanumeric boundary
pub fn generate_boundary() -> Result<String> {
    generate_boundary_from(&mut OsRng)
}

/// Generate a boundary from the given random source
///
/// Fails if the source cannot produce bytes.
pub fn generate_boundary_from<R: RngCore + ?Sized>(rng: &mut R) -> Result<String> {
    let mut bytes = [0u8; BOUNDARY_LENGTH];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| MailError::Boundary(e.to_string()))?;

    Ok(bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect())
}
