//! Seedable identifier generation for reproducible exports.
//!
//! The copyright page carries a placeholder catalog number and the package
//! manifest carries a `urn:uuid` identifier. Both come from [`IdGenerator`],
//! which is time-seeded by default but accepts an explicit seed so that two
//! exports of the same manuscript can be byte-identical.

use crate::util::time_seed_nanos;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Deterministic generator for the identifiers an export embeds.
///
/// Not cryptographically secure; these are placeholder catalog numbers and
/// package identifiers, not secrets.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    state: u64,
}

impl IdGenerator {
    /// Create a generator seeded from the current time.
    pub fn new() -> Self {
        Self::seeded(time_seed_nanos())
    }

    /// Create a generator with a fixed seed for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        IdGenerator { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        self.state >> 33
    }

    /// Placeholder catalog number for the copyright page: eight uppercase
    /// base-36 digits followed by `-XX`.
    pub fn catalog_number(&mut self) -> String {
        let mut number = String::with_capacity(11);
        for _ in 0..8 {
            number.push(BASE36[(self.next() % 36) as usize] as char);
        }
        number.push_str("-XX");
        number
    }

    /// Package identifier in `urn:uuid:` form.
    pub fn package_identifier(&mut self) -> String {
        format!("urn:uuid:{}", self.uuid_v4())
    }

    /// Generate a simple UUID v4 (random)
    fn uuid_v4(&mut self) -> String {
        let mut bytes = [0u8; 16];
        for byte in &mut bytes {
            *byte = self.next() as u8;
        }

        // Set version (4) and variant (2)
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        format!(
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            bytes[0],
            bytes[1],
            bytes[2],
            bytes[3],
            bytes[4],
            bytes[5],
            bytes[6],
            bytes[7],
            bytes[8],
            bytes[9],
            bytes[10],
            bytes[11],
            bytes[12],
            bytes[13],
            bytes[14],
            bytes[15]
        )
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
