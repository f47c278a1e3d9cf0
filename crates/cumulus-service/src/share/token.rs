//! Share token generation.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of generated link and federation tokens.
pub const TOKEN_LENGTH: usize = 15;

/// Generates random tokens for link and remote shares.
#[derive(Debug, Clone, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Creates a new token generator.
    pub fn new() -> Self {
        Self
    }

    /// A random token of upper and lower case letters and digits.
    pub fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let generator = TokenGenerator::new();
        let token = generator.generate();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generator.generate());
    }
}
