use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use super::error::ViewerError;
use super::log;

pub const API_KEY_KEY: &str = "pgn_viewer.api_key";
pub const SYSTEM_PROMPT_KEY: &str = "pgn_viewer.system_prompt";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You convert chess book notation into PGN. \
Reply with a single game in standard PGN: tag pairs first (use [Event], [White], [Black], \
[Date] and [Result] when the text names them), then the movetext in SAN. \
Attach the book's commentary to the move it follows as a {comment}. \
Do not add variations or any text outside the PGN.";

/// Key-value persistence for the two user settings.
pub trait SettingsStore {
    fn load(&self, key: &str) -> Result<Option<String>, ViewerError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), ViewerError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, ViewerError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), ViewerError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings kept as one JSON object on disk. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<Map<String, Value>, ViewerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(ViewerError::Settings(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ViewerError::Settings(format!(
                "{}: expected a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(ViewerError::Settings(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, ViewerError> {
        Ok(self
            .read_map()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), ViewerError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        let json = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| ViewerError::Settings(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| ViewerError::Settings(format!("{}: {e}", self.path.display())))
    }
}

/// A blank prompt falls back to the default one.
fn prompt_or_default(prompt: Option<String>) -> String {
    prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub system_prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Settings {
    pub fn load(store: &dyn SettingsStore) -> Result<Self, ViewerError> {
        let api_key = store.load(API_KEY_KEY)?.filter(|k| !k.trim().is_empty());
        let system_prompt = prompt_or_default(store.load(SYSTEM_PROMPT_KEY)?);

        log::info(format!(
            "settings loaded (api key {})",
            if api_key.is_some() { "present" } else { "absent" }
        ));
        Ok(Self {
            api_key,
            system_prompt,
        })
    }

    /// Usable credential, if any. Blank keys count as missing.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn set_api_key(
        &mut self,
        store: &mut dyn SettingsStore,
        value: &str,
    ) -> Result<(), ViewerError> {
        store.save(API_KEY_KEY, value)?;
        self.api_key = Some(value.to_string()).filter(|k| !k.trim().is_empty());
        Ok(())
    }

    pub fn set_system_prompt(
        &mut self,
        store: &mut dyn SettingsStore,
        value: &str,
    ) -> Result<(), ViewerError> {
        store.save(SYSTEM_PROMPT_KEY, value)?;
        self.system_prompt = prompt_or_default(Some(value.to_string()));
        Ok(())
    }
}
