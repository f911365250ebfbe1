/// Configuration system for worklog.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::WorklogConfig::default()`]
/// 2. **User global config**: `~/.worklog/config.toml`
/// 3. **Project local config**: `.worklog.toml` in the current working directory
/// 4. **Environment variables**: `WORKLOG_*` overrides (highest precedence)
///
/// File layers are merged key by key, so a project file that only sets
/// `display.chunk_size` keeps everything else from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use worklog::config;
///
/// let cfg = config::load();
/// let chunks = worklog::grouping::group_days(&days, cfg.display.chunk_size);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::WorklogConfig;

use crate::logging::Level;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved worklog configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars, then clamps degenerate values.
pub fn load() -> WorklogConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config.normalize();
    config
}

/// Merge the given TOML files over the built-in defaults.
///
/// Missing, unreadable, or malformed files are skipped. A file whose values
/// have the wrong types is skipped as a whole rather than poisoning the other
/// layers.
pub fn load_layers(paths: &[Option<PathBuf>]) -> WorklogConfig {
    let Ok(mut merged) = toml::Value::try_from(WorklogConfig::default()) else {
        return WorklogConfig::default();
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_layer(path) {
            merge_toml(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read one TOML layer, returning it only if it deserializes on its own.
fn load_toml_layer(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    value.clone().try_into::<WorklogConfig>().ok()?;
    Some(value)
}

/// Recursively merge `overlay` into `base`. Tables merge per key; any other
/// value replaces the base value.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.worklog/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".worklog").join("config.toml"))
}

/// Path to the project local config: `.worklog.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".worklog.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        return None;
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None if path == "~" => dirs::home_dir(),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `WORKLOG_SOURCE_URL`: payload endpoint
/// - `WORKLOG_SOURCE_PATH`: local payload file
/// - `WORKLOG_CHUNK_SIZE`: days per detail row
/// - `WORKLOG_CHART_AUTHOR`: author to chart
/// - `WORKLOG_WEB_ADDR`: dashboard bind address
/// - `WORKLOG_LOG_LEVEL`: `debug`, `info`, `warn`, `error`
/// - `WORKLOG_LOGGING`: event log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut WorklogConfig) {
    if let Ok(val) = std::env::var("WORKLOG_SOURCE_URL")
        && !val.is_empty()
    {
        config.source.url = val;
    }
    if let Ok(val) = std::env::var("WORKLOG_SOURCE_PATH") {
        config.source.path = val;
    }
    if let Ok(val) = std::env::var("WORKLOG_CHUNK_SIZE")
        && let Ok(n) = val.parse::<usize>()
    {
        config.display.chunk_size = n;
    }
    if let Ok(val) = std::env::var("WORKLOG_CHART_AUTHOR") {
        config.chart.author = val;
    }
    if let Ok(val) = std::env::var("WORKLOG_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("WORKLOG_LOG_LEVEL")
        && let Some(level) = Level::parse(&val)
    {
        config.logging.level = level.to_string();
    }
    if let Ok(val) = std::env::var("WORKLOG_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.worklog/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.worklog/ directory")?;
    }

    fs::write(&path, WorklogConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `display.chunk_size`. The new value is parsed
/// according to the type of the current value, and the result must still be
/// a valid config before it is written.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&WorklogConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;

    // Fill in sections the file omits so any known key can be set.
    let mut full = toml::Value::try_from(WorklogConfig::default())
        .context("failed to serialize default config")?;
    merge_toml(&mut full, root.clone());
    if lookup(&root, key).is_none() && lookup(&full, key).is_some() {
        root = full;
    }

    set_toml_value(&mut root, key, value)?;
    root.clone()
        .try_into::<WorklogConfig>()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' is not a scalar value"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
