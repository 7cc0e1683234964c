/// Configuration error kinds.
///
/// All of these are fatal at initialization time; configuration is never
/// re-validated during stepping. The `Display` output is a single line
/// naming the offending key and the reason.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A value is outside its admissible range.
    #[error("config `{key}`: {reason}")]
    InvalidValue {
        /// The offending configuration key.
        key: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A required entry is absent.
    #[error("config `{key}`: missing required entry")]
    MissingRequired {
        /// The missing configuration key.
        key: &'static str,
    },

    /// Two or more entries are individually valid but mutually inconsistent.
    #[error("config `{keys}`: {reason}")]
    Inconsistent {
        /// The keys involved, in `a/b` form.
        keys: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}
