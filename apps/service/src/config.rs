use std::{env, fmt, fs, io, path};

use autoconf::{ProviderConfig, kubelet::KubeletConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    ReadFailed {
        path: path::PathBuf,
        source: io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    WriteFailed {
        path: path::PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ParseFailed {
        path: path::PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config path available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: Service,
    pub provider: ProviderConfig,
    pub kubelet: KubeletConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Seconds between two crawls in watch mode
    pub interval_seconds: u64,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/autoconf/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("autoconf/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let provider = &self.provider;
        let kubelet = &self.kubelet;

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Service")?;
        write_1(f, "Interval (s)", &self.service.interval_seconds)?;
        write_title_1(f, "Provider")?;
        write_1(f, "Backend", &provider.backend)?;
        write_1(f, "Template URL", &provider.template_url)?;
        write_1(f, "Template Dir", &provider.template_dir)?;
        write_1(
            f,
            "Leaves",
            &format!(
                "{}, {}, {}",
                provider.layout.check_names, provider.layout.init_configs, provider.layout.instances
            ),
        )?;
        write_1(f, "Name Delimiter", &format!("{:?}", provider.parsing.check_name_delimiter))?;
        write_1(f, "Wrap Single Object", &provider.parsing.wrap_single_object)?;
        write_1(f, "Fill Policy", &format!("{:?}", provider.fill))?;
        write_title_1(f, "Kubelet")?;
        write_1(f, "Host", &kubelet.host.as_deref().unwrap_or("$HOSTNAME"))?;
        write_1(f, "HTTP Port", &kubelet.http_port)?;
        write_1(f, "HTTPS Port", &kubelet.https_port)?;
        write_1(f, "Retries", &kubelet.retry_count)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/autoconf/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust,ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| Error::ReadFailed {
                    path: config_path.clone(),
                    source,
                })?;
            toml::from_str(raw_string.as_str())
                .map_err(|source| Error::ParseFailed {
                    path: config_path,
                    source,
                })
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Error::WriteFailed {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        std::fs::write(path, config_str)
            .map_err(|source| Error::WriteFailed {
                path: path.to_path_buf(),
                source,
            })
    }
}
