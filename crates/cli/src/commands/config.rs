use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use gamewise_core::config::{AppConfig, ConfigOverrides, LoadOptions, CONFIG_FILE_CANDIDATES};
use secrecy::ExposeSecret;
use toml::Value;

use super::CommandResult;

struct Field {
    key: &'static str,
    value: String,
    /// CLI flag that set the value, when it was passed.
    flag: Option<&'static str>,
    env_keys: &'static [&'static str],
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let overrides = options.overrides.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("config", &error),
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    for field in fields(&config, &overrides) {
        let source = field_source(
            field.key,
            field.flag,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig, overrides: &ConfigOverrides) -> Vec<Field> {
    let api_key = match &config.llm.api_key {
        Some(key) => redact_token(key.expose_secret()),
        None => "<unset>".to_string(),
    };
    let catalog_path = match &config.catalog.path {
        Some(path) => path.display().to_string(),
        None => "<builtin>".to_string(),
    };

    vec![
        Field {
            key: "llm.provider",
            value: format!("{:?}", config.llm.provider),
            flag: flag_if(&overrides.llm_provider, "--llm-provider"),
            env_keys: &["GAMEWISE_LLM_PROVIDER"],
        },
        Field {
            key: "llm.api_key",
            value: api_key,
            flag: None,
            env_keys: &["GAMEWISE_LLM_API_KEY", "OPENAI_API_KEY"],
        },
        Field {
            key: "llm.base_url",
            value: config.llm.base_url.clone(),
            flag: None,
            env_keys: &["GAMEWISE_LLM_BASE_URL"],
        },
        Field {
            key: "llm.model",
            value: config.llm.model.clone(),
            flag: flag_if(&overrides.llm_model, "--llm-model"),
            env_keys: &["GAMEWISE_LLM_MODEL"],
        },
        Field {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            flag: None,
            env_keys: &["GAMEWISE_LLM_TIMEOUT_SECS"],
        },
        Field {
            key: "solver.command",
            value: config.solver.command.clone(),
            flag: flag_if(&overrides.solver_command, "--solver"),
            env_keys: &["GAMEWISE_SOLVER_COMMAND"],
        },
        Field {
            key: "solver.args",
            value: config.solver.args.join(" "),
            flag: None,
            env_keys: &["GAMEWISE_SOLVER_ARGS"],
        },
        Field {
            key: "solver.rules_path",
            value: config.solver.rules_path.display().to_string(),
            flag: flag_if(&overrides.rules_path, "--rules"),
            env_keys: &["GAMEWISE_SOLVER_RULES_PATH"],
        },
        Field {
            key: "catalog.path",
            value: catalog_path,
            flag: flag_if(&overrides.catalog_path, "--catalog"),
            env_keys: &["GAMEWISE_CATALOG_PATH"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            flag: flag_if(&overrides.log_level, "--log-level"),
            env_keys: &["GAMEWISE_LOGGING_LEVEL", "GAMEWISE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            flag: None,
            env_keys: &["GAMEWISE_LOGGING_FORMAT", "GAMEWISE_LOG_FORMAT"],
        },
    ]
}

fn flag_if<T>(value: &Option<T>, flag: &'static str) -> Option<&'static str> {
    value.as_ref().map(|_| flag)
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    flag: Option<&str>,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(flag) = flag {
        return format!("flag ({flag})");
    }

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

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
