//! Runtime configuration (TOML file + env overrides).

pub mod scorer;

pub use scorer::ScorerConfig;
