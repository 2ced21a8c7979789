//! Database schema

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Settings key holding the API key
pub const API_KEY: &str = "OPENAI_KEY";
/// Settings key holding the model identifier
pub const MODEL_KEY: &str = "OPENAI_MODEL";
