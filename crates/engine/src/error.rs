use std::fmt;

#[derive(Debug)]
pub enum MapError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold range, empty name).
    ConfigValidation(String),
    /// Required column missing from an input table. Raised before any
    /// row is processed.
    MissingColumn { source: String, column: String },
    /// IO error (file read, CSV parse, etc.).
    Io(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "{source} input: missing column '{column}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}
