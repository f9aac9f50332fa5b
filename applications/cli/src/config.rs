/// Leveler configuration
use crate::error::{AppError, Result};
use leveler_loudness::{EngineSettings, TargetPolicy, DEFAULT_PEAK_CEILING_DBTP};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "leveler.toml";

/// Prefix of configuration environment variables (`LEVELER_PATHS__INPUT_ROOT`)
pub const ENV_PREFIX: &str = "LEVELER";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LevelerConfig {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub loudness: LoudnessSettings,

    #[serde(default)]
    pub scan: ScanSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathSettings {
    #[serde(default = "default_input_root")]
    pub input_root: PathBuf,

    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoudnessSettings {
    /// Ceiling used to rank files before picking the target; never applied
    /// to the written files
    #[serde(default = "default_peak_ceiling_dbtp")]
    pub peak_ceiling_dbtp: f64,

    #[serde(default = "default_target_policy")]
    pub target_policy: String,

    /// Fixed target in LUFS; bypasses the collection minimum
    #[serde(default)]
    pub target_override_lufs: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanSettings {
    #[serde(default)]
    pub follow_links: bool,

    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Values given on the command line; they win over every other source
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub ceiling: Option<f64>,
    pub policy: Option<String>,
    pub target: Option<f64>,
}

impl LevelerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `leveler.toml` in the working
    /// directory is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        Self::load_from(path, environment)
    }

    /// Load from an optional file and an explicit environment source
    pub fn load_from(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (LEVELER_SECTION__KEY)
        settings = settings.add_source(environment);

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Apply command-line values on top of the loaded configuration
    pub fn apply(&mut self, overrides: CliOverrides) {
        if let Some(input) = overrides.input {
            self.paths.input_root = input;
        }
        if let Some(output) = overrides.output {
            self.paths.output_root = output;
        }
        if let Some(ceiling) = overrides.ceiling {
            self.loudness.peak_ceiling_dbtp = ceiling;
        }
        if let Some(policy) = overrides.policy {
            self.loudness.target_policy = policy;
        }
        if overrides.target.is_some() {
            self.loudness.target_override_lufs = overrides.target;
        }
    }

    /// Engine settings described by the `loudness` section
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let settings = EngineSettings {
            peak_ceiling_dbtp: self.loudness.peak_ceiling_dbtp,
            target_policy: self.loudness.target_policy.parse::<TargetPolicy>()?,
            target_override_lufs: self.loudness.target_override_lufs,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let input = &self.paths.input_root;
        if !input.exists() {
            return Err(AppError::Config(format!(
                "input root not found: {}",
                input.display()
            )));
        }
        if !input.is_dir() {
            return Err(AppError::Config(format!(
                "input root is not a directory: {}",
                input.display()
            )));
        }

        let input = input.canonicalize()?;
        let output = resolve(&self.paths.output_root)?;
        if output.starts_with(&input) {
            return Err(AppError::Config(format!(
                "output root {} must not be inside input root {}",
                self.paths.output_root.display(),
                self.paths.input_root.display()
            )));
        }

        self.engine_settings()?;
        Ok(())
    }
}

/// Absolute form of a path that may not exist yet
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.canonicalize()?);
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    // Canonicalize the deepest existing ancestor so symlinked roots compare
    // equal, then re-attach the missing tail
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in tail.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

// Default values
impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_root: default_input_root(),
            output_root: default_output_root(),
        }
    }
}

impl Default for LoudnessSettings {
    fn default() -> Self {
        Self {
            peak_ceiling_dbtp: default_peak_ceiling_dbtp(),
            target_policy: default_target_policy(),
            target_override_lufs: None,
        }
    }
}

fn default_input_root() -> PathBuf {
    PathBuf::from("origs")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_peak_ceiling_dbtp() -> f64 {
    DEFAULT_PEAK_CEILING_DBTP
}

fn default_target_policy() -> String {
    TargetPolicy::default().as_str().to_string()
}
