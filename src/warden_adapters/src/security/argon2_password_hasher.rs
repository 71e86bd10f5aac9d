use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use secrecy::{ExposeSecret, Secret};
use warden_core::{Password, PasswordHasher, PasswordHasherError};

/// Argon2id with the cost parameters every stored hash in this service uses.
#[derive(Debug, Clone, Copy)]
pub struct Argon2PasswordHasher {
    memory_cost_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            memory_cost_kib: 15000,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    fn argon2(&self) -> Result<Argon2<'static>, String> {
        let params = Params::new(self.memory_cost_kib, self.iterations, self.parallelism, None)
            .map_err(|e| e.to_string())?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[async_trait::async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Password) -> Result<Secret<String>, PasswordHasherError> {
        let current_span = tracing::Span::current();
        let hasher = *self;
        let password = password.as_ref().clone();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let salt = SaltString::generate(&mut OsRng);
                hasher
                    .argon2()
                    .map_err(PasswordHasherError::HashingFailed)?
                    .hash_password(password.expose_secret().as_bytes(), &salt)
                    .map(|hash| Secret::new(hash.to_string()))
                    .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))
            })
        })
        .await
        .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))?
    }

    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn compare(
        &self,
        hash: &Secret<String>,
        password: &Password,
    ) -> Result<bool, PasswordHasherError> {
        let current_span = tracing::Span::current();
        let hasher = *self;
        let hash = hash.clone();
        let password = password.as_ref().clone();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected = PasswordHash::new(hash.expose_secret())
                    .map_err(|e| PasswordHasherError::MalformedHash(e.to_string()))?;

                match hasher
                    .argon2()
                    .map_err(PasswordHasherError::HashingFailed)?
                    .verify_password(password.expose_secret().as_bytes(), &expected)
                {
                    Ok(()) => Ok(true),
                    Err(argon2::password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(PasswordHasherError::HashingFailed(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))?
    }
}
