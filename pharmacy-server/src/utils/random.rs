//! Randomness helpers built on the system CSPRNG
//!
//! Both the order reference suffix and the delivery OTP come from
//! `ring::rand::SystemRandom`; neither may be predictable.

use ring::rand::{SecureRandom, SystemRandom};

/// Alphabet for order reference suffixes (uppercase alphanumerics)
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random suffix in an order reference
const REFERENCE_SUFFIX_LEN: usize = 9;

/// Generate a human-readable order reference: `ORD-<epoch millis>-<suffix>`
pub fn order_reference() -> Result<String, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; REFERENCE_SUFFIX_LEN];
    rng.fill(&mut bytes)?;

    let suffix: String = bytes
        .iter()
        .map(|b| REFERENCE_ALPHABET[(*b as usize) % REFERENCE_ALPHABET.len()] as char)
        .collect();

    Ok(format!(
        "ORD-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        suffix
    ))
}

/// Generate a 4-digit delivery OTP, uniform over 1000..=9999
pub fn delivery_otp() -> Result<String, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    // Rejection sampling keeps the distribution uniform
    loop {
        let mut bytes = [0u8; 2];
        rng.fill(&mut bytes)?;
        let value = u16::from_be_bytes(bytes);
        // 9000 * 7 = 63000 is the largest multiple of 9000 within u16 range
        if value < 63000 {
            return Ok(format!("{}", 1000 + (value % 9000)));
        }
    }
}
