//! Generation of tenant API keys and signing secrets.
//!
//! Both are 32 random bytes, base64url-encoded without padding, behind a
//! prefix that tells a public key (`la_`) from a private secret (`sk_`)
//! at a glance. Neither is derived from the tenant id.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use localauth_core::models::tenant::{API_KEY_PREFIX, SIGNING_SECRET_PREFIX};

fn random_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn generate_api_key() -> String {
    format!("{API_KEY_PREFIX}{}", random_token())
}

pub fn generate_signing_secret() -> String {
    format!("{SIGNING_SECRET_PREFIX}{}", random_token())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_carry_distinct_prefixes() {
        assert!(generate_api_key().starts_with("la_"));
        assert!(generate_signing_secret().starts_with("sk_"));
    }

    #[test]
    fn keys_are_url_safe() {
        let key = generate_api_key();
        let body = key.strip_prefix("la_").unwrap();
        // 32 bytes → 43 base64url chars.
        assert_eq!(body.len(), 43);
        assert!(
            body.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn keys_are_not_repeated() {
        assert_ne!(generate_api_key(), generate_api_key());
        assert_ne!(generate_signing_secret(), generate_signing_secret());
    }
}
