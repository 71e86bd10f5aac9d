//! # Warden - Identity Security Pipeline
//!
//! Facade crate that re-exports the public APIs of the warden components.
//! Depend on this crate to get login, password reset, email change, account
//! verification and the notification worker in one place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! warden = { path = "../warden" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `User`, `ActionToken`, etc.
//! - **Ports**: `UserStore`, `ActionTokenStore`, `RateLimiter`, `SessionManager`, ...
//! - **Use cases**: `LoginUseCase`, `ConfirmPasswordResetUseCase`, etc.
//! - **Adapters**: `PostgresActionTokenStore`, `RedisJobQueue`, `PostmarkEmailClient`, etc.
//! - **Service**: `IdentityService` wires every use case to one set of ports

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use warden_core::*;
}

pub use warden_core::{
    ActionLinks, ActionToken, ActionType, Email, Identity, NotificationJob, Password, Role, User,
    UserId,
};

// ============================================================================
// Ports
// ============================================================================

/// Repository and service trait definitions
pub mod ports {
    pub use warden_core::{
        ActionTokenStore, ActionTokenStoreError, EmailClient, EmailDeliveryError,
        InvalidTokenReason, JobEnqueuer, NotificationHandler, OutgoingEmail, PasswordHasher,
        RateLimiter, SecureTokenGenerator, SessionManager, TemplateRenderer, UserStore,
        UserStoreError,
    };
}

pub use ports::{
    ActionTokenStore, JobEnqueuer, PasswordHasher, RateLimiter, SecureTokenGenerator,
    SessionManager, UserStore,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use warden_application::*;
}

pub use warden_application::{
    ChangePasswordUseCase, ClassifyError, ConfirmAccountUserUseCase, ConfirmEmailChangeUseCase,
    ConfirmPasswordResetUseCase, DeleteUserUseCase, ErrorKind, LoginUseCase,
    NotificationFailurePolicy, NotificationProcessor, PromoteUserUseCase, RegisterUserUseCase,
    RequestAccountValidationUseCase, RequestEmailChangeUseCase, RequestPasswordResetUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use warden_adapters::persistence::*;
    }

    /// Email client implementations
    pub mod email {
        pub use warden_adapters::email::*;
    }

    /// Job queue and notification worker
    pub mod queue {
        pub use warden_adapters::queue::*;
    }

    /// Password hashing, token generation and sessions
    pub mod security {
        pub use warden_adapters::security::*;
    }

    /// Configuration
    pub mod config {
        pub use warden_adapters::config::*;
    }
}

pub use warden_adapters::{
    Argon2PasswordHasher, AskamaTemplateRenderer, CryptoTokenGenerator, HashMapActionTokenStore,
    HashMapUserStore, InMemoryJobQueue, InMemoryRateLimiter, JwtSessionManager, MockEmailClient,
    NotificationWorker, PostgresActionTokenStore, PostgresUserStore, PostmarkEmailClient,
    RedisJobQueue, RedisRateLimiter, Settings, WorkerConfig,
};

// ============================================================================
// Identity Service (Main Entry Point)
// ============================================================================

pub use warden_service::{
    IdentityConfig, IdentityPorts, IdentityService, build_identity_service, configure_postgresql,
    configure_redis, get_redis_client, run_token_purge,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
