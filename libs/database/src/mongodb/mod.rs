//! MongoDB connector and helpers

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{
    DUPLICATE_KEY_CODE, connect_from_config, connect_from_config_with_retry,
    is_duplicate_key_error,
};
pub use health::{HealthStatus, check_health, check_health_detailed};

pub use mongodb::{Client, Collection, Database};
