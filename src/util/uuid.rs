//! Client-side identifiers for draft entities.
//!
//! Survey question drafts need an id before the backend assigns real ones.
//! Generation walks three tiers and uses the first one the platform supports:
//!
//! 1. the platform UUID generator (`crypto.randomUUID` in the browser, the
//!    `uuid` crate's v4 generator elsewhere),
//! 2. OS random bytes formatted by hand into the v4 layout,
//! 3. a clock-seeded non-cryptographic PRNG.
//!
//! The last tier only keeps drafts distinct within one process.

#[cfg(test)]
#[path = "uuid_test.rs"]
mod uuid_test;

use std::cell::RefCell;
#[cfg(not(feature = "hydrate"))]
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng, TryRngCore};

/// Length of a hyphenated UUID string.
pub const UUID_LEN: usize = 36;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Generation strategies, strongest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UuidTier {
    Platform,
    RandomBytes,
    Clock,
}

impl UuidTier {
    pub const ALL: [UuidTier; 3] = [UuidTier::Platform, UuidTier::RandomBytes, UuidTier::Clock];

    /// Generate with this tier, or `None` if the platform lacks it.
    #[must_use]
    pub fn generate(self) -> Option<String> {
        match self {
            UuidTier::Platform => platform_uuid(),
            UuidTier::RandomBytes => random_bytes_uuid(),
            UuidTier::Clock => Some(clock_uuid()),
        }
    }
}

/// Generate a v4-layout UUID string using the strongest available tier.
#[must_use]
pub fn generate_uuid() -> String {
    platform_uuid()
        .or_else(random_bytes_uuid)
        .unwrap_or_else(clock_uuid)
}

/// True if `value` is 36 chars of lowercase/uppercase hex in 8-4-4-4-12 groups.
#[must_use]
pub fn is_hyphenated_uuid(value: &str) -> bool {
    value.len() == UUID_LEN
        && value.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

#[cfg(feature = "hydrate")]
fn platform_uuid() -> Option<String> {
    let crypto = web_sys::window()?.crypto().ok()?;
    Some(crypto.random_uuid())
}

#[cfg(not(feature = "hydrate"))]
fn platform_uuid() -> Option<String> {
    if os_rng_available() {
        Some(::uuid::Uuid::new_v4().to_string())
    } else {
        None
    }
}

#[cfg(not(feature = "hydrate"))]
fn os_rng_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| OsRng.try_next_u32().is_ok())
}

fn random_bytes_uuid() -> Option<String> {
    let mut bytes = [0_u8; 16];
    OsRng.try_fill_bytes(&mut bytes).ok()?;
    Some(format_v4(bytes))
}

thread_local! {
    static CLOCK_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::seed_from_u64(clock_seed()));
}

fn clock_uuid() -> String {
    let mut bytes = [0_u8; 16];
    CLOCK_RNG.with(|rng| rng.borrow_mut().fill_bytes(&mut bytes));
    format_v4(bytes)
}

fn clock_seed() -> u64 {
    let Ok(elapsed) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    // Fold the 128-bit nanosecond count into 64 bits.
    let nanos = elapsed.as_nanos();
    (nanos as u64) ^ ((nanos >> 64) as u64)
}

/// Stamp the v4 version and RFC 4122 variant bits, then render 8-4-4-4-12.
fn format_v4(mut bytes: [u8; 16]) -> String {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let mut out = String::with_capacity(UUID_LEN);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
