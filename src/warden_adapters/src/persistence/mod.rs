pub mod hashmap_action_token_store;
pub mod hashmap_user_store;
pub mod postgres_action_token_store;
pub mod postgres_user_store;

pub use hashmap_action_token_store::HashMapActionTokenStore;
pub use hashmap_user_store::HashMapUserStore;
pub use postgres_action_token_store::PostgresActionTokenStore;
pub use postgres_user_store::PostgresUserStore;
