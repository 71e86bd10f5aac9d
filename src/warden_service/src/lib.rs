pub mod helpers;
pub mod identity_service;
pub mod maintenance;
pub mod tracing;

pub use helpers::{
    ProductionIdentityService, ServiceError, build_identity_service, configure_postgresql,
    configure_redis, get_postgres_pool, get_redis_client,
};
pub use identity_service::{IdentityConfig, IdentityPorts, IdentityService};
pub use maintenance::run_token_purge;
