//! Configuration for the devsel CLI.
//!
//! TOML config file + `DEVSEL_*` environment overrides, and the rule
//! files that extend (or replace) the built-in device selector rules.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devsel_core::{RuleRegistry, builtin};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid rule file {}: {source}", .path.display())]
    RuleToml {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },

    #[error("invalid rule file {}: {source}", .path.display())]
    RuleJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported rule file format {}: expected .toml or .json", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default output format: table, json, json-compact, yaml, or plain.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub rules: RulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: default_output(),
            rules: RulesConfig::default(),
        }
    }
}

/// Where rules come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Start from the built-in device selector rules.
    #[serde(default = "default_builtin")]
    pub builtin: bool,

    /// Extra rule file (TOML or JSON), appended after the built-ins.
    ///
    /// A relative path written in a config file is resolved against that
    /// file's directory. One from the environment or the command line is
    /// resolved against the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            builtin: default_builtin(),
            file: None,
        }
    }
}

/// Output formats accepted in the `output` key.
pub const OUTPUT_FORMATS: [&str; 5] = ["table", "json", "json-compact", "yaml", "plain"];

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !OUTPUT_FORMATS.contains(&self.output.as_str()) {
            return Err(ConfigError::Validation {
                field: "output".into(),
                reason: format!(
                    "expected one of {}, got '{}'",
                    OUTPUT_FORMATS.join(", "),
                    self.output
                ),
            });
        }
        Ok(())
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_builtin() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "devsel", "devsel").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("devsel");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Layer defaults, the config file, and `DEVSEL_*` environment variables.
///
/// `path` overrides the platform config path. A missing file is not an
/// error; the defaults and environment still apply.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DEVSEL_").split("_"))
}

/// Load the full Config from file + environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let figment = figment(path);
    let mut config: Config = figment.extract()?;
    config.validate()?;
    config.rules.file = config
        .rules
        .file
        .map(|file| anchor_to_source(&figment, "rules.file", file));
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Join a relative path onto the directory of the file that declared `key`.
fn anchor_to_source(figment: &Figment, key: &str, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    let declared_in = figment
        .find_metadata(key)
        .and_then(|meta| meta.source.as_ref())
        .and_then(|source| source.file_path())
        .and_then(Path::parent);
    match declared_in {
        Some(dir) => dir.join(path),
        None => path,
    }
}

/// Render a config as pretty TOML.
pub fn to_toml(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Rule loading ────────────────────────────────────────────────────

/// Parse a rule file. The format follows the extension: `.json` is JSON,
/// `.toml` (or no extension) is TOML.
pub fn load_rule_file(path: &Path) -> Result<RuleRegistry, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let registry: RuleRegistry = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|source| ConfigError::RuleJson {
            path: path.to_path_buf(),
            source,
        })?,
        Some("toml") | None => toml::from_str(&text).map_err(|source| ConfigError::RuleToml {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?,
        Some(_) => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    tracing::debug!(path = %path.display(), rules = registry.len(), "loaded rule file");
    Ok(registry)
}

/// Build the registry a run should use: the built-ins (unless disabled)
/// followed by the rules of the configured rule file.
pub fn load_registry(rules: &RulesConfig) -> Result<RuleRegistry, ConfigError> {
    let mut registry = if rules.builtin {
        builtin::build()
    } else {
        RuleRegistry::new()
    };

    if let Some(ref path) = rules.file {
        registry.extend(load_rule_file(path)?);
    }

    if registry.is_empty() {
        tracing::warn!("rule registry is empty; no attributes will be computed");
    }
    Ok(registry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use devsel_core::{Node, Root};
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const BADGE_RULES: &str = r#"
        [[rule]]
        attribute = "button_badge"
        target = "device"
        tree = { attr = "wifiStatus", when_true = "on", when_false = "off" }
    "#;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_use_builtin_rules_and_table_output() {
        let config = Config::default();
        assert_eq!(config.output, "table");
        assert!(config.rules.builtin);
        assert_eq!(config.rules.file, None);
    }

    #[test]
    fn file_and_env_layers_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "devsel.toml",
                r#"
                output = "yaml"

                [rules]
                file = "extra.toml"
                "#,
            )?;
            jail.set_env("DEVSEL_RULES_BUILTIN", "false");

            let config =
                load_config(Some(Path::new("devsel.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.output, "yaml");
            let file = config.rules.file.unwrap();
            assert!(file.is_absolute(), "{}", file.display());
            assert!(file.ends_with("extra.toml"));
            assert!(!config.rules.builtin);
            Ok(())
        });
    }

    #[test]
    fn relative_rule_file_resolves_next_to_the_config_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("conf")?;
            jail.create_file("conf/devsel.toml", "[rules]\nfile = \"rules.toml\"\n")?;

            let config =
                load_config(Some(Path::new("conf/devsel.toml"))).map_err(|e| e.to_string())?;
            let file = config.rules.file.unwrap();
            assert!(file.ends_with("conf/rules.toml"), "{}", file.display());
            Ok(())
        });
    }

    #[test]
    fn rule_file_from_environment_stays_relative() {
        Jail::expect_with(|jail| {
            jail.create_file("devsel.toml", "[rules]\nfile = \"ignored.toml\"\n")?;
            jail.set_env("DEVSEL_RULES_FILE", "extra.toml");

            let config =
                load_config(Some(Path::new("devsel.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.rules.file, Some(PathBuf::from("extra.toml")));
            Ok(())
        });
    }

    #[test]
    fn misspelled_rule_table_names_the_file() {
        let file = write_temp(".toml", &BADGE_RULES.replace("[[rule]]", "[[rules]]"));
        let err = load_rule_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::RuleToml { .. }), "{err}");
        assert!(err.to_string().contains("rules"), "{err}");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let config =
                load_config(Some(Path::new("does-not-exist.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn unknown_output_format_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("DEVSEL_OUTPUT", "html");
            let err = load_config(Some(Path::new("none.toml"))).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation { ref field, .. } if field == "output"),
                "{err}"
            );
            Ok(())
        });
    }

    #[test]
    fn toml_rule_file_is_appended_after_builtins() {
        let file = write_temp(".toml", BADGE_RULES);
        let registry = load_registry(&RulesConfig {
            builtin: true,
            file: Some(file.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(registry.len(), builtin::registry().len() + 1);
        let last = registry.rules().last().unwrap();
        assert_eq!(last.attribute, "button_badge");
        assert_eq!(last.target, Root::Device);
        assert_eq!(last.tree, Node::branch("wifiStatus", "on", "off"));
    }

    #[test]
    fn json_rule_file_can_replace_builtins() {
        let file = write_temp(
            ".json",
            r#"{ "rule": [{ "attribute": "button_state", "target": "connection", "tree": null }] }"#,
        );
        let registry = load_registry(&RulesConfig {
            builtin: false,
            file: Some(file.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.rules()[0].tree, Node::null());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".yaml", BADGE_RULES);
        let err = load_rule_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }), "{err}");
    }

    #[test]
    fn malformed_rule_file_names_the_file() {
        let file = write_temp(".toml", "[[rule]]\nattribute = \"x\"\n");
        let err = load_rule_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::RuleToml { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_rule_file_is_an_io_error() {
        let err = load_rule_file(Path::new("/nonexistent/devsel/rules.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn config_renders_as_toml() {
        let rendered = to_toml(&Config::default()).unwrap();
        assert!(rendered.contains("output = \"table\""));
        assert!(rendered.contains("builtin = true"));
    }
}
