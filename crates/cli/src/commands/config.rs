use std::env;
use std::fs;
use std::path::Path;

use cabinguard_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "validation.rbd_by_cabin_enabled",
        &config.validation.rbd_by_cabin_enabled.to_string(),
        source(
            "validation.rbd_by_cabin_enabled",
            &["CABINGUARD_VALIDATION_RBD_BY_CABIN_ENABLED"],
        ),
    ));
    lines.push(render_line(
        "validation.diagnostic_level",
        config.validation.diagnostic_level.as_str(),
        source("validation.diagnostic_level", &["CABINGUARD_VALIDATION_DIAGNOSTIC_LEVEL"]),
    ));
    let cabin_table = config
        .validation
        .cabin_table_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(render_line(
        "validation.cabin_table_path",
        &cabin_table,
        source("validation.cabin_table_path", &["CABINGUARD_VALIDATION_CABIN_TABLE_PATH"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["CABINGUARD_LOGGING_LEVEL", "CABINGUARD_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["CABINGUARD_LOGGING_FORMAT", "CABINGUARD_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, render_line};

    #[test]
    fn nested_key_paths_are_resolved_in_toml_documents() {
        let doc: toml::Value =
            "[validation]\ndiagnostic_level = \"detail\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "validation.diagnostic_level"));
        assert!(!contains_path(&doc, "validation.cabin_table_path"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn lines_name_their_source() {
        assert_eq!(
            render_line("logging.level", "debug", "env (CABINGUARD_LOG_LEVEL)".to_string()),
            "- logging.level = debug (source: env (CABINGUARD_LOG_LEVEL))"
        );
    }
}
