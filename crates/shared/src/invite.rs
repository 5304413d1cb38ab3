use rand::Rng;

pub const INVITE_CODE_LEN: usize = 6;
pub const INVITE_CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random code drawn uniformly from `[A-Z0-9]`. Uniqueness is up to the caller.
pub fn new_invite_code<R: Rng>(rng: &mut R) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Codes are matched case-insensitively and ignoring surrounding whitespace
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
