/// Configuration system for salesdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::SalesdashConfig::default()`]
/// 2. **User global config**: `~/.salesdash/config.toml`
/// 3. **Project local config**: `.salesdash.toml` in the current directory
/// 4. **Environment variables**: `SALESDASH_*` overrides
///
/// The `--data-dir` CLI flag is applied on top by `main`.
///
/// Later layers override earlier ones at the key level: a file that only sets
/// `dashboard.preferred_year` leaves every other value from the layers below
/// untouched. Malformed files are ignored.
///
/// # Usage
///
/// ```rust,ignore
/// use salesdash::config;
///
/// let cfg = config::load();
/// let events = salesdash::logging::EventLog::from_config(&cfg.logging);
/// let dataset = salesdash::data::loader::load_dataset(&cfg.data, &events)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::SalesdashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> SalesdashConfig {
    let mut merged = defaults_as_value();

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: SalesdashConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

fn defaults_as_value() -> toml::Value {
    toml::Value::try_from(SalesdashConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Read a TOML file as a raw value tree.
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed.
fn load_toml_value(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // Reject layers that don't fit the schema at all.
    value.clone().try_into::<SalesdashConfig>().ok()?;
    Some(value)
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other
/// value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
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

/// Path to the user global config: `~/.salesdash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".salesdash").join("config.toml"))
}

/// Path to the project local config: `.salesdash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".salesdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest file-independent layer).
///
/// Supported variables:
/// - `SALESDASH_DATA_DIR`: dataset directory
/// - `SALESDASH_PREFERRED_YEAR`: default year selection
/// - `SALESDASH_WEB_ADDR`: dashboard bind address
/// - `SALESDASH_LOGGING`: event log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut SalesdashConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("SALESDASH_DATA_DIR")
        && !val.is_empty()
    {
        config.data.dir = PathBuf::from(val);
    }
    if let Some(val) = var("SALESDASH_PREFERRED_YEAR")
        && let Ok(year) = val.trim().parse::<i32>()
    {
        config.dashboard.preferred_year = year;
    }
    if let Some(val) = var("SALESDASH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Some(val) = var("SALESDASH_LOGGING") {
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

/// Write the default annotated config to `~/.salesdash/config.toml`.
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
        fs::create_dir_all(parent).context("failed to create ~/.salesdash/ directory")?;
    }

    fs::write(&path, SalesdashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Starts from the existing global file (or the serialized defaults), updates
/// the dotted key, validates the result against the schema and writes it
/// back.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        defaults_as_value()
    };

    // Keys missing from a sparse file are resolved against the defaults so
    // their type is known.
    let mut full = defaults_as_value();
    merge_values(&mut full, root.clone());
    set_toml_value(&mut full, key, value)?;
    full.clone()
        .try_into::<SalesdashConfig>()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let leaf = lookup(&full, key).cloned().context("config key vanished after update")?;
    insert_dotted(&mut root, key, leaf)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path, keeping the
/// type of the value already there.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let (parent_key, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            current = current
                .get_mut(part)
                .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
        }
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{}'", parent_key.unwrap_or("")))?;

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
        Some(toml::Value::Table(_)) => anyhow::bail!("'{key}' is a section, not a value"),
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}

/// Insert `value` at a dotted key, creating intermediate tables.
fn insert_dotted(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .with_context(|| format!("expected table for '{key}'"))?
        .insert(leaf.to_string(), value);
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

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = SalesdashConfig::default();
        apply_env_overrides(
            &mut cfg,
            env(&[
                ("SALESDASH_DATA_DIR", "/srv/orders"),
                ("SALESDASH_PREFERRED_YEAR", "2019"),
                ("SALESDASH_WEB_ADDR", "0.0.0.0:8080"),
                ("SALESDASH_LOGGING", "off"),
            ]),
        );
        assert_eq!(cfg.data.dir, PathBuf::from("/srv/orders"));
        assert_eq!(cfg.dashboard.preferred_year, 2019);
        assert_eq!(cfg.web.addr, "0.0.0.0:8080");
        assert!(!cfg.logging.enabled);
    }

    #[test]
    fn env_overrides_ignore_bad_values() {
        let mut cfg = SalesdashConfig::default();
        apply_env_overrides(
            &mut cfg,
            env(&[("SALESDASH_PREFERRED_YEAR", "soon"), ("SALESDASH_DATA_DIR", "")]),
        );
        assert_eq!(cfg, SalesdashConfig::default());
    }

    #[test]
    fn merge_keeps_unset_keys() {
        let mut base = defaults_as_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[dashboard]
top_categories = 5
"#,
        )
        .unwrap();
        merge_values(&mut base, overlay);
        let cfg: SalesdashConfig = base.try_into().unwrap();
        assert_eq!(cfg.dashboard.top_categories, 5);
        assert_eq!(cfg.dashboard.preferred_year, 2023);
        assert_eq!(cfg.web.addr, "127.0.0.1:9747");
    }

    #[test]
    fn set_toml_value_keeps_types() {
        let mut root = defaults_as_value();
        set_toml_value(&mut root, "dashboard.preferred_year", "2018").unwrap();
        set_toml_value(&mut root, "logging.enabled", "no").unwrap();
        set_toml_value(&mut root, "data.dir", "/tmp/olist").unwrap();

        let cfg: SalesdashConfig = root.try_into().unwrap();
        assert_eq!(cfg.dashboard.preferred_year, 2018);
        assert!(!cfg.logging.enabled);
        assert_eq!(cfg.data.dir, PathBuf::from("/tmp/olist"));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root = defaults_as_value();
        assert!(set_toml_value(&mut root, "dashboard.preferred_year", "later").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "dashboard.colour", "blue").is_err());
        assert!(set_toml_value(&mut root, "dashboard", "x").is_err());
    }

    #[test]
    fn insert_dotted_creates_sections() {
        let mut root = toml::Value::Table(toml::map::Map::new());
        insert_dotted(&mut root, "web.addr", toml::Value::String("x:1".into())).unwrap();
        assert_eq!(lookup(&root, "web.addr").and_then(|v| v.as_str()), Some("x:1"));
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: SalesdashConfig = toml::from_str(&toml_str).unwrap();
    }
}
