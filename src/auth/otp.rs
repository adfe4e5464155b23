use rand::Rng;

pub const OTP_LENGTH: usize = 6;

/// Draw a fresh one-time password: six independent, uniform decimal digits.
pub fn generate_otp() -> String {
    generate_otp_with(&mut rand::thread_rng())
}

pub fn generate_otp_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Exact comparison against the code held in the session. No trimming and no
/// numeric normalisation: `"012345"` and `"12345"` are different codes.
pub fn otp_matches(expected: Option<&str>, submitted: &str) -> bool {
    match expected {
        Some(expected) => expected == submitted,
        None => false,
    }
}
