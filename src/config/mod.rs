mod schema;

pub use schema::{BackendConfig, Config, RulesConfig, ServerConfig, SessionConfig};
