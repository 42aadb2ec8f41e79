use crate::error::SettingsError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Snapshot of the process environment that can merge `.env` files on
/// top before settings are resolved.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from an explicit variable map; settings tests use this to
    /// stay off the real environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Load variables from a .env file; file entries override values
    /// already present.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SettingsError::EnvFile(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        info!(file = %path.display(), "Loaded environment overrides");
        Ok(())
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), SettingsError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.find('=') {
                Some(eq_pos) => {
                    let key = line[..eq_pos].trim();
                    let value = Self::unquote_value(line[eq_pos + 1..].trim());

                    if key.is_empty() {
                        return Err(SettingsError::EnvFile(format!(
                            "empty key at line {}",
                            line_num + 1
                        )));
                    }

                    self.vars.insert(key.to_string(), value);
                }
                None => {
                    return Err(SettingsError::EnvFile(format!(
                        "malformed line {} (expected KEY=VALUE)",
                        line_num + 1
                    )));
                }
            }
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
            return value[1..value.len() - 1].to_string();
        }

        if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
            return value[1..value.len() - 1].to_string();
        }

        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_entries() {
        let mut env = EnvManager::default();
        let content = r#"
# Comment
KEY1=value1
KEY2=value2
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("KEY1"), Some("value1"));
        assert_eq!(env.get("KEY2"), Some("value2"));
    }

    #[test]
    fn strips_quotes() {
        let mut env = EnvManager::default();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("UNQUOTED"), Some("no_spaces"));
    }

    #[test]
    fn file_entries_override_existing_values() {
        let mut env = EnvManager::from_vars(HashMap::from([(
            "INGEST_BUCKET".to_string(),
            "from-process".to_string(),
        )]));

        env.parse_env_content("INGEST_BUCKET=from-file").unwrap();
        assert_eq!(env.get("INGEST_BUCKET"), Some("from-file"));
    }

    #[test]
    fn rejects_lines_without_equals() {
        let mut env = EnvManager::default();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
    }
}
