use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::speech::SpeechConfig;

pub const QUIZ_SIZES: [usize; 4] = [5, 10, 15, 20];
pub const BACKENDS: [&str; 2] = ["local", "supabase"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default)]
    pub default_level: Option<String>,
    #[serde(default = "default_quiz_size")]
    pub quiz_size: usize,
    #[serde(default = "default_true")]
    pub hangul_first: bool,
    #[serde(default = "default_true")]
    pub show_keyboard: bool,
    #[serde(default = "default_true")]
    pub speech_enabled: bool,
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    #[serde(default = "default_speech_args")]
    pub speech_args: Vec<String>,
    #[serde(default = "default_speech_lang")]
    pub speech_lang: String,
    #[serde(default = "default_speech_timeout_ms")]
    pub speech_timeout_ms: u64,
    #[serde(default = "default_drill_advance_ms")]
    pub drill_advance_ms: u64,
    #[serde(default = "default_quiz_advance_ms")]
    pub quiz_advance_ms: u64,
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_anon_key: String,
    #[serde(default)]
    pub supabase_access_token: Option<String>,
    #[serde(default = "default_sync_retry_secs")]
    pub sync_retry_secs: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_quiz_size() -> usize {
    10
}
fn default_true() -> bool {
    true
}
fn default_speech_command() -> String {
    "espeak-ng".to_string()
}
fn default_speech_args() -> Vec<String> {
    vec!["-v".to_string(), "{lang}".to_string()]
}
fn default_speech_lang() -> String {
    "ko".to_string()
}
fn default_speech_timeout_ms() -> u64 {
    3000
}
fn default_drill_advance_ms() -> u64 {
    700
}
fn default_quiz_advance_ms() -> u64 {
    1000
}
fn default_backend() -> String {
    "local".to_string()
}
fn default_sync_retry_secs() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_user: None,
            default_level: None,
            quiz_size: default_quiz_size(),
            hangul_first: true,
            show_keyboard: true,
            speech_enabled: true,
            speech_command: default_speech_command(),
            speech_args: default_speech_args(),
            speech_lang: default_speech_lang(),
            speech_timeout_ms: default_speech_timeout_ms(),
            drill_advance_ms: default_drill_advance_ms(),
            quiz_advance_ms: default_quiz_advance_ms(),
            backend: default_backend(),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_access_token: None,
            sync_retry_secs: default_sync_retry_secs(),
            seed: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hanmadi")
            .join("config.toml")
    }

    /// Clamp numeric fields and reset unknown names to their defaults.
    /// Call after deserialization; hand-edited files are not trusted.
    pub fn validate(&mut self, valid_themes: &[String]) {
        self.quiz_size = self.quiz_size.clamp(1, 50);
        self.speech_timeout_ms = self.speech_timeout_ms.clamp(500, 30_000);
        self.drill_advance_ms = self.drill_advance_ms.min(10_000);
        self.quiz_advance_ms = self.quiz_advance_ms.min(10_000);
        self.sync_retry_secs = self.sync_retry_secs.clamp(1, 600);
        if !BACKENDS.contains(&self.backend.as_str()) {
            self.backend = default_backend();
        }
        if !valid_themes.is_empty() && !valid_themes.contains(&self.theme) {
            self.theme = default_theme();
        }
        if self
            .default_level
            .as_deref()
            .is_some_and(|level| crate::curriculum::find(level).is_none())
        {
            self.default_level = None;
        }
    }

    pub fn speech(&self) -> SpeechConfig {
        SpeechConfig {
            enabled: self.speech_enabled,
            command: self.speech_command.clone(),
            args: self.speech_args.clone(),
            lang: self.speech_lang.clone(),
            timeout: Duration::from_millis(self.speech_timeout_ms),
        }
    }

    pub fn drill_advance(&self) -> Duration {
        Duration::from_millis(self.drill_advance_ms)
    }

    pub fn quiz_advance(&self) -> Duration {
        Duration::from_millis(self.quiz_advance_ms)
    }

    pub fn sync_retry(&self) -> Duration {
        Duration::from_secs(self.sync_retry_secs)
    }

    /// Step the quiz size through the presets offered on the settings screen.
    pub fn cycle_quiz_size(&mut self) {
        let next = QUIZ_SIZES
            .iter()
            .position(|&s| s == self.quiz_size)
            .map(|i| QUIZ_SIZES[(i + 1) % QUIZ_SIZES.len()])
            .unwrap_or(default_quiz_size());
        self.quiz_size = next;
    }
}
