//! Short human-readable codes printed on labels
//!
//! Codes use an alphabet without look-alike characters (`0/O`, `1/I`) so they
//! can be typed back from a printed label.

use rand::Rng;

pub const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of QR code short codes (globally unique)
pub const QR_CODE_LEN: usize = 8;

/// Length of box short codes (unique per workspace)
pub const BOX_CODE_LEN: usize = 6;

/// How many fresh candidates are drawn before giving up on a single code
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// Source of candidate short codes. Uniqueness is enforced by the store, so
/// implementations only need to produce well-formed candidates.
pub trait ShortCodeSource: Send + Sync + 'static {
	fn next_code(&self, len: usize) -> String;
}

/// Default source backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShortCodes;

impl ShortCodeSource for RandomShortCodes {
	fn next_code(&self, len: usize) -> String {
		let mut rng = rand::thread_rng();
		(0..len)
			.map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
			.collect()
	}
}

/// Canonical form of a user-entered code: trimmed and uppercased
pub fn normalize(raw: &str) -> String {
	raw.trim().to_uppercase()
}

pub fn is_well_formed(code: &str, len: usize) -> bool {
	code.len() == len && code.bytes().all(|b| ALPHABET.contains(&b))
}
