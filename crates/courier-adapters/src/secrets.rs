use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

/// Flat key/value secret material applied to the process environment before
/// any record is processed. Values stay wrapped in [`SecretString`] until
/// the moment they are exported.
pub trait SecretStore: Send + Sync {
    fn load(&self) -> Result<HashMap<String, SecretString>, SecretsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("failed to read secrets file: {0}")]
    Io(String),

    #[error("secrets file is not valid JSON: {0}")]
    Parse(String),

    #[error("secrets file must be a flat JSON object of strings")]
    NotAFlatObject,
}

/// Store backed by a JSON object file: `{ "NAME": "value", ... }`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, SecretString>, SecretsError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| SecretsError::Io(e.to_string()))?;
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| SecretsError::Parse(e.to_string()))?;

        let object = value.as_object().ok_or(SecretsError::NotAFlatObject)?;
        let mut secrets = HashMap::with_capacity(object.len());
        for (name, value) in object {
            let value = value.as_str().ok_or(SecretsError::NotAFlatObject)?;
            secrets.insert(name.clone(), SecretString::from(value));
        }
        Ok(secrets)
    }
}

/// Merge the loaded secrets into the process environment. Existing variables
/// with the same name are overwritten, matching the upstream-secrets-win
/// behavior of the batch entry point.
pub fn apply_to_env(secrets: &HashMap<String, SecretString>) {
    for (name, value) in secrets {
        std::env::set_var(name, value.expose_secret());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("courier-secrets-{}.json", uuid::Uuid::now_v7()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_flat_object() {
        let path = temp_file(r#"{"API_KEY": "abc123", "OTHER": "zzz"}"#);
        let secrets = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets["API_KEY"].expose_secret(), "abc123");
    }

    #[test]
    fn rejects_missing_file() {
        let store = JsonFileStore::new("/nonexistent/secrets.json");
        assert!(matches!(store.load(), Err(SecretsError::Io(_))));
    }

    #[test]
    fn rejects_invalid_json() {
        let path = temp_file("{nope");
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(SecretsError::Parse(_))
        ));
    }

    #[test]
    fn rejects_non_flat_shapes() {
        let path = temp_file(r#"["a", "b"]"#);
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(SecretsError::NotAFlatObject)
        ));

        let path = temp_file(r#"{"nested": {"x": 1}}"#);
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(SecretsError::NotAFlatObject)
        ));
    }

    #[test]
    fn apply_to_env_exports_values() {
        let name = format!("COURIER_TEST_SECRET_{}", uuid::Uuid::now_v7().simple());
        let mut secrets = HashMap::new();
        secrets.insert(name.clone(), SecretString::from("s3cret"));

        apply_to_env(&secrets);
        assert_eq!(std::env::var(&name).unwrap(), "s3cret");
        std::env::remove_var(&name);
    }
}
