//! Unique identity generation for ephemeral principals.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random token embedded in each generated address.
pub const TOKEN_LENGTH: usize = 10;

/// Source of the unique token embedded in a principal address.
///
/// Injected so tests can supply deterministic values.
pub trait IdentityGenerator {
    /// Returns a fresh token.
    fn token(&self) -> String;
}

/// Generates random alphanumeric tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentity;

impl IdentityGenerator for RandomIdentity {
    fn token(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// Formats the address registered for a principal.
#[must_use]
pub fn principal_address(prefix: &str, token: &str, domain: &str) -> String {
    format!("{prefix}-{token}@{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_tokens_are_alphanumeric_and_sized() {
        let token = RandomIdentity.token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn random_tokens_differ_between_calls() {
        assert_ne!(RandomIdentity.token(), RandomIdentity.token());
    }

    #[test]
    fn address_embeds_token_in_domain() {
        let address = principal_address("scriptrig", "AbC123xyz0", "scriptrig.test");
        assert_eq!(address, "scriptrig-AbC123xyz0@scriptrig.test");
    }
}
