pub mod argon2_password_hasher;
pub mod crypto_token_generator;
pub mod jwt_session_manager;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use crypto_token_generator::CryptoTokenGenerator;
pub use jwt_session_manager::{Claims, JwtSessionManager};
