//! # Configuration de pmowsman
//!
//! La configuration par défaut est intégrée au binaire (`wsman.yaml`) puis
//! fusionnée avec un éventuel `config.yaml` et les variables
//! d'environnement `PMOWSMAN_CONFIG__SECTION__CLE`.
//!
//! ```no_run
//! use pmowsman::config::get_config;
//!
//! let config = get_config();
//! println!("max pulls: {}", config.max_pulls);
//! ```
//!
//! Les constantes du protocole (MaxElements, OperationTimeout, ReplyTo) ne
//! sont pas configurables.

use std::{env, fs, path::Path, sync::Arc};

use anyhow::{Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::soap::FieldOrder;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("wsman.yaml");

const ENV_CONFIG_DIR: &str = "PMOWSMAN_CONFIG";
const ENV_PREFIX: &str = "PMOWSMAN_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmowsman";

const DEFAULT_MAX_PULLS: usize = 256;

lazy_static! {
    static ref CONFIG: Arc<WsmanConfig> = Arc::new(WsmanConfig::load("").unwrap_or_else(|err| {
        warn!(error = %err, "Failed to load pmowsman configuration, using defaults");
        WsmanConfig::default()
    }));
}

/// Réglages typés de pmowsman
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsmanConfig {
    /// `envelope.escape_fields`
    pub escape_fields: bool,
    /// `serializer.field_order`
    pub field_order: FieldOrder,
    /// `session.max_pulls`
    pub max_pulls: usize,
}

impl Default for WsmanConfig {
    fn default() -> Self {
        Self {
            escape_fields: false,
            field_order: FieldOrder::Document,
            max_pulls: DEFAULT_MAX_PULLS,
        }
    }
}

impl WsmanConfig {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> Option<String> {
        // 1. Try provided directory
        if !directory.is_empty() {
            return Some(directory.to_string());
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(env_path);
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return Some(CONFIG_DIR_NAME.to_string());
        }

        // 4. Try home directory
        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .filter(|path| path.exists())
            .map(|path| path.to_string_lossy().to_string())
    }

    /// Charge la configuration depuis `directory` (ou l'emplacement par défaut
    /// si vide) et les variables d'environnement du processus
    pub fn load(directory: &str) -> Result<Self> {
        Self::load_with_env(directory, env::vars())
    }

    /// Comme [`load`](Self::load) avec un jeu de variables explicite
    pub fn load_with_env<I>(directory: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value = lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);

        if let Some(config_dir) = Self::find_config_dir(directory) {
            let path = Path::new(&config_dir).join("config.yaml");
            match fs::read(&path) {
                Ok(data) => {
                    info!(config_file = %path.display(), "Loaded config file");
                    let external: Value = serde_yaml::from_slice(&data)?;
                    merge_yaml(&mut value, &lower_keys_value(external));
                }
                Err(_) => {
                    info!(config_file = %path.display(), "Config file not found, using default embedded config");
                }
            }
        }

        apply_env_overrides(&mut value, vars);
        Self::from_value(&value)
    }

    /// Extrait les réglages typés d'un arbre YAML déjà fusionné
    pub fn from_value(value: &Value) -> Result<Self> {
        let defaults = Self::default();

        let escape_fields = match get_value(value, &["envelope", "escape_fields"]) {
            Some(Value::Bool(b)) => *b,
            Some(other) => return Err(anyhow!("envelope.escape_fields must be a boolean, got {other:?}")),
            None => defaults.escape_fields,
        };

        let field_order = match get_value(value, &["serializer", "field_order"]) {
            Some(order) => serde_yaml::from_value(order.clone())
                .map_err(|err| anyhow!("Invalid serializer.field_order: {err}"))?,
            None => defaults.field_order,
        };

        let max_pulls = match get_value(value, &["session", "max_pulls"]) {
            Some(Value::Number(n)) => n
                .as_u64()
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .ok_or_else(|| anyhow!("session.max_pulls must be a positive integer"))?,
            Some(other) => return Err(anyhow!("session.max_pulls must be an integer, got {other:?}")),
            None => defaults.max_pulls,
        };

        Ok(Self {
            escape_fields,
            field_order,
            max_pulls,
        })
    }
}

/// Configuration globale, chargée une seule fois
pub fn get_config() -> Arc<WsmanConfig> {
    CONFIG.clone()
}

fn get_value<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(data, |current, key| match current {
        Value::Mapping(map) => map.get(&Value::String(key.to_lowercase())),
        _ => None,
    })
}

fn set_value(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return Ok(());
    };
    let Value::Mapping(map) = data else {
        return Err(anyhow!("Current node is not a map"));
    };
    let key = Value::String(first.to_lowercase());
    if rest.is_empty() {
        map.insert(key, value);
        Ok(())
    } else {
        let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
        set_value(entry, rest, value)
    }
}

fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(path) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path: Vec<&str> = path.split("__").collect();
        if let Err(err) = set_value(config, &key_path, convert_env_value(&value)) {
            warn!(env_var = %key, error = %err, "Ignoring configuration override");
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lower_keys_value(v))
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}
