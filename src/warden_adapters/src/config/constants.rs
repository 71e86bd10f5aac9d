pub mod env {
    pub const CONFIG_DIR_ENV_VAR: &str = "WARDEN_CONFIG_DIR";
    pub const ENV_PREFIX: &str = "WARDEN";
    pub const ENV_SEPARATOR: &str = "__";
}

pub mod defaults {
    pub const CONFIG_DIR: &str = "config";
    pub const JWT_ISSUER: &str = "warden";
    pub const JWT_TTL_SECONDS: i64 = 60 * 60 * 24;
    pub const ACTION_TOKEN_TTL_MINUTES: i64 = 30;
    pub const RESEND_VERIFICATION_WINDOW_SECONDS: u64 = 5 * 60;
    pub const REDIS_HOST_NAME: &str = "127.0.0.1";

    pub mod worker {
        pub const QUEUE_NAME: &str = "notifications";
        pub const CONCURRENCY: usize = 10;
        pub const POLL_INTERVAL_MILLIS: u64 = 500;
        pub const MAX_ATTEMPTS: u32 = 5;
        pub const HEARTBEAT_INTERVAL_MILLIS: u64 = 10_000;
        pub const RETRY_BACKOFF_MILLIS: u64 = 1_000;
        pub const MAX_RETRY_BACKOFF_MILLIS: u64 = 5 * 60 * 1_000;
        pub const TOKEN_PURGE_INTERVAL_SECONDS: u64 = 60 * 60;
    }
}

pub mod prod {
    pub mod email_client {
        pub const BASE_URL: &str = "https://api.postmarkapp.com/";
        pub const TIMEOUT_MILLIS: u64 = 10_000;
    }
}

pub mod test {
    pub mod email_client {
        use std::time::Duration;

        pub const SENDER: &str = "test@email.com";
        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
}
