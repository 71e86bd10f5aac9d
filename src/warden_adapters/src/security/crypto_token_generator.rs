use rand::TryRngCore;
use rand::rngs::OsRng;
use warden_core::{SecureTokenGenerator, TokenGeneratorError};

const TOKEN_BYTES: usize = 32;

/// Draws straight from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct CryptoTokenGenerator;

impl CryptoTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SecureTokenGenerator for CryptoTokenGenerator {
    fn generate(&self) -> Result<String, TokenGeneratorError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenGeneratorError(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    fn generate_numeric(&self, length: usize) -> Result<String, TokenGeneratorError> {
        let mut code = String::with_capacity(length);
        let mut buffer = [0u8; 16];

        while code.len() < length {
            OsRng
                .try_fill_bytes(&mut buffer)
                .map_err(|e| TokenGeneratorError(e.to_string()))?;

            // Bytes >= 250 are rejected so every digit stays equally likely.
            for byte in buffer.iter().filter(|b| **b < 250) {
                if code.len() == length {
                    break;
                }
                code.push(char::from(b'0' + byte % 10));
            }
        }

        Ok(code)
    }
}
