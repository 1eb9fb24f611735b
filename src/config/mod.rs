/// Database configuration and connection management
pub mod database;

/// Marketplace settings loading from config.toml and seeding
pub mod settings;
