//! One-time verification codes and temporary passwords
//!
//! Both are bearer credentials, so they are drawn from the OS CSPRNG.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use subtle::ConstantTimeEq;

/// Number of digits in a verification code
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Length of generated temporary passwords
pub const TEMPORARY_PASSWORD_LENGTH: usize = 12;

const LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*?-_";

/// Uniform code in `000000..=999999`, zero-padded.
pub fn generate_verification_code() -> String {
    let value: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:06}", value)
}

/// Strip whitespace from a submitted code (`"123 456"` → `"123456"`).
pub fn normalize_code(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == VERIFICATION_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Compare codes without leaking how many leading bytes match.
/// Different lengths are rejected before any byte comparison.
pub fn codes_match(stored: &str, provided: &str) -> bool {
    let left = stored.as_bytes();
    let right = provided.as_bytes();

    if left.is_empty() || left.len() != right.len() {
        return false;
    }

    left.ct_eq(right).into()
}

fn pick(rng: &mut OsRng, set: &[u8]) -> u8 {
    set[rng.gen_range(0..set.len())]
}

/// 12 characters with at least one letter, digit and symbol, shuffled.
pub fn generate_temporary_password() -> String {
    let mut rng = OsRng;

    let mut chars = Vec::with_capacity(TEMPORARY_PASSWORD_LENGTH);
    chars.push(pick(&mut rng, LETTERS));
    chars.push(pick(&mut rng, DIGITS));
    chars.push(pick(&mut rng, SYMBOLS));

    let combined: Vec<u8> = [LETTERS, DIGITS, SYMBOLS].concat();
    while chars.len() < TEMPORARY_PASSWORD_LENGTH {
        chars.push(pick(&mut rng, &combined[..]));
    }

    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}
