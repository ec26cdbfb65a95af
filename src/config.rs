use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::FlashError;
use crate::flags::{DEFAULT_URL_TEMPLATE, FlagSource};
use crate::latex::DocumentTemplate;
use crate::store::Store;

pub const DEFAULT_CONFIG_FILE: &str = "flagdeck.json";
pub const DEFAULT_CSV_PATH: &str = "data/facts.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "flashcards.tex";
pub const DEFAULT_FLAGS_DIR: &str = "flags";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Characters that would break `\includegraphics{...}` if they appeared in
/// the flags directory.
const LATEX_UNSAFE_PATH_CHARS: &[char] = &['%', '#', '$', '&', '{', '}', '~', '^'];

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub csv_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub output_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub flags_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub flag_url_template: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub preamble_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub postamble_path: Option<Utf8PathBuf>,
}

impl Config {
    /// Fields set in `overrides` win over the ones in `self`.
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            csv_path: overrides.csv_path.or(self.csv_path),
            output_path: overrides.output_path.or(self.output_path),
            flags_dir: overrides.flags_dir.or(self.flags_dir),
            flag_url_template: overrides.flag_url_template.or(self.flag_url_template),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            preamble_path: overrides.preamble_path.or(self.preamble_path),
            postamble_path: overrides.postamble_path.or(self.postamble_path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub csv_path: Utf8PathBuf,
    pub output_path: Utf8PathBuf,
    pub flags_dir: Utf8PathBuf,
    pub flag_source: FlagSource,
    pub timeout: Duration,
    pub template: DocumentTemplate,
}

impl ResolvedConfig {
    pub fn store(&self) -> Store {
        Store::new(self.flags_dir.clone(), self.output_path.clone())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the config file (an explicit `path`, or `flagdeck.json` when it
    /// exists) and applies `overrides` on top.
    pub fn resolve(path: Option<&str>, overrides: Config) -> Result<ResolvedConfig, FlashError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| FlashError::ConfigRead(config_path.clone()))?;
            serde_json::from_str::<Config>(&content)
                .map_err(|err| FlashError::ConfigParse(err.to_string()))?
        } else if path.is_some() {
            return Err(FlashError::MissingConfig(config_path));
        } else {
            Config::default()
        };

        Self::resolve_config(config.merge(overrides))
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, FlashError> {
        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(FlashError::InvalidConfig(
                "timeout_secs must be positive".to_string(),
            ));
        }

        let flag_source = FlagSource::new(
            config
                .flag_url_template
                .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string()),
        )?;
        let template = DocumentTemplate::with_overrides(
            config.preamble_path.as_deref().map(|path| path.as_std_path()),
            config.postamble_path.as_deref().map(|path| path.as_std_path()),
        )?;

        let flags_dir = config
            .flags_dir
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_FLAGS_DIR));
        if flags_dir.as_str().contains(LATEX_UNSAFE_PATH_CHARS) {
            return Err(FlashError::InvalidConfig(format!(
                "flags_dir must not contain any of {LATEX_UNSAFE_PATH_CHARS:?}: {flags_dir}"
            )));
        }

        Ok(ResolvedConfig {
            csv_path: config
                .csv_path
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CSV_PATH)),
            output_path: config
                .output_path
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_PATH)),
            flags_dir,
            flag_source,
            timeout: Duration::from_secs(timeout_secs),
            template,
        })
    }
}
