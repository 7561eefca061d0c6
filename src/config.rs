//! User configuration (`config.toml` in the platform config dir).
//!
//! A missing file means defaults. Unreadable or invalid files produce
//! warnings and fall back to defaults; they never abort the program.

use cellgraph_engine::engine::{DEFAULT_DECIMALS, SelfReference};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;
const MAX_DECIMALS: usize = 15;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    decimals: Option<usize>,
    self_reference: Option<SelfReference>,
}

/// Effective settings after merging the config file with defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub decimals: usize,
    pub self_reference: SelfReference,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            decimals: DEFAULT_DECIMALS,
            self_reference: SelfReference::Ignore,
        }
    }
}

/// Load the config from `config_file`, or from the user config dir.
/// Returns the config and any warnings encountered.
pub fn load_config(config_file: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match read_config_file(&path) {
        Ok(content) => match parse_config_content(&content, &mut warnings) {
            Ok(config) => (config, warnings),
            Err(err) => {
                warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                (Config::default(), warnings)
            }
        },
        Err(err) => {
            warnings.push(err);
            (Config::default(), warnings)
        }
    }
}

fn read_config_file(path: &Path) -> Result<String, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    std::fs::read_to_string(path).map_err(|err| format!("Failed to read {}: {}", path.display(), err))
}

/// Parse config TOML, clamping out-of-range values with a warning.
fn parse_config_content(content: &str, warnings: &mut Vec<String>) -> Result<Config, toml::de::Error> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = Config::default();

    if let Some(decimals) = file.decimals {
        if decimals > MAX_DECIMALS {
            warnings.push(format!(
                "decimals = {} is too large; using {}",
                decimals, MAX_DECIMALS
            ));
            config.decimals = MAX_DECIMALS;
        } else {
            config.decimals = decimals;
        }
    }
    if let Some(policy) = file.self_reference {
        config.self_reference = policy;
    }

    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgraph")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
