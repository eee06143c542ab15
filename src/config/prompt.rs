use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;

const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful WhatsApp assistant. \
     Do not reveal private data. Keep responses concise unless asked otherwise.";

#[derive(Debug)]
pub enum PromptError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub system_instruction: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

/// Loads the prompt configuration from `path`, or the built-in defaults
/// when no path is configured.
pub fn load_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    let path = match path {
        Some(p) => p,
        None => {
            info!("No prompts file configured, using built-in system instruction");
            return Ok(Arc::new(PromptConfig::default()));
        }
    };

    let content = fs::read_to_string(Path::new(path))?;
    let config: PromptConfig = serde_json::from_str(&content)?;
    info!("Loaded prompt configuration from {}", path);
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_path() {
        let config = load_prompts(None).unwrap();
        assert!(config.system_instruction.contains("WhatsApp assistant"));
    }

    #[test]
    fn loads_instruction_from_file() {
        let path = std::env::temp_dir().join("whatsapp_relay_prompts_test.json");
        fs::write(&path, r#"{ "system_instruction": "talk like a pirate" }"#).unwrap();

        let config = load_prompts(path.to_str()).unwrap();
        assert_eq!(config.system_instruction, "talk like a pirate");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_prompts(Some("/nonexistent/prompts.json")).is_err());
    }
}
