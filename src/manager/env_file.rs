//! # Env File
//!
//! Reads `.env`-style files for `update-from-env` and maps the known variables to
//! their Secret Manager ids.
//!
//! Values are held in [`Zeroizing`] buffers and the process environment is never touched.

use super::ManagerError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

/// An environment variable and the secret it is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretMapping {
    pub env_var: &'static str,
    pub secret_id: &'static str,
}

/// Variables `update-from-env` pushes, and the secrets `validate` requires
pub const SECRET_MAPPINGS: [SecretMapping; 4] = [
    SecretMapping {
        env_var: "DATABASE_URL",
        secret_id: "database-url",
    },
    SecretMapping {
        env_var: "REDIS_URL",
        secret_id: "redis-url",
    },
    SecretMapping {
        env_var: "JWT_SECRET",
        secret_id: "jwt-secret",
    },
    SecretMapping {
        env_var: "API_KEY",
        secret_id: "api-key",
    },
];

/// Secret ids checked by `validate`
pub fn required_secret_ids() -> impl Iterator<Item = &'static str> {
    SECRET_MAPPINGS.iter().map(|mapping| mapping.secret_id)
}

/// Parse an env file into a name → value map
///
/// Values are taken literally: `$NAME` and `${NAME}` are not expanded. Quoting,
/// escapes, `export` prefixes and comments follow dotenv rules. Later assignments of
/// the same variable win.
///
/// # Errors
/// Returns [`ManagerError::EnvFile`] if the file is missing or malformed
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, Zeroizing<String>>, ManagerError> {
    let env_file_error = |source| ManagerError::EnvFile {
        path: path.display().to_string(),
        source,
    };

    let contents = Zeroizing::new(
        fs::read_to_string(path).map_err(|e| env_file_error(dotenvy::Error::Io(e)))?,
    );
    let escaped = escape_substitutions(&contents);

    let mut values = BTreeMap::new();
    for item in dotenvy::from_read_iter(escaped.as_bytes()) {
        let (key, value) = item.map_err(env_file_error)?;
        values.insert(key, Zeroizing::new(value));
    }
    Ok(values)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    LineStart,
    Key,
    ValueStart,
    Value,
    SingleQuoted,
    DoubleQuoted,
    /// Comment line, or the tail of an unquoted value after whitespace
    Rest,
}

/// Escape every `$` dotenvy would substitute, i.e. those outside single quotes
///
/// Existing backslash escapes are copied untouched so `\$` keeps its meaning.
fn escape_substitutions(contents: &str) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::with_capacity(contents.len() + 16));
    let mut state = ScanState::LineStart;
    let mut chars = contents.chars();

    while let Some(c) = chars.next() {
        if c == '\n' && !matches!(state, ScanState::SingleQuoted | ScanState::DoubleQuoted) {
            out.push(c);
            state = ScanState::LineStart;
            continue;
        }
        if state == ScanState::ValueStart && c != ' ' && c != '\t' {
            state = ScanState::Value;
        }

        match (state, c) {
            (ScanState::LineStart, ' ' | '\t' | '\r') => {}
            (ScanState::LineStart, '#') => state = ScanState::Rest,
            (ScanState::LineStart, _) => state = ScanState::Key,
            (ScanState::Key, '=') => state = ScanState::ValueStart,
            (ScanState::Value | ScanState::DoubleQuoted, '\\') => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
                continue;
            }
            (ScanState::Value | ScanState::DoubleQuoted, '$') => out.push('\\'),
            (ScanState::Value, '\'') => state = ScanState::SingleQuoted,
            (ScanState::Value, '"') => state = ScanState::DoubleQuoted,
            (ScanState::Value, ' ' | '\t') => state = ScanState::Rest,
            (ScanState::SingleQuoted, '\'') | (ScanState::DoubleQuoted, '"') => {
                state = ScanState::Value;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}
