use std::collections::HashMap;

use super::record::FieldSpec;
use super::{ConfigError, ConfigMap};

/// A source of environment variables.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Returns the variable that overrides a field's `external_name`: the name
/// upper-cased, after `prefix`.
pub fn env_var_name(prefix: &str, external_name: &str) -> String {
    format!("{prefix}{}", external_name.to_uppercase())
}

/// Replaces map entries with the environment variables that override them.
///
/// A field named `port` is overridden by `PORT`, or by `APP_PORT` with the
/// prefix `APP_`. Variables are only consulted for the given fields, and a set
/// variable wins even when the key was absent from the map.
///
/// Returns the `(key, variable)` pairs that were applied.
pub fn apply_env_overrides(
    map: &mut ConfigMap,
    fields: &[FieldSpec],
    env: &(impl Environment + ?Sized),
    prefix: &str,
) -> Vec<(String, String)> {
    let mut applied = Vec::new();
    for field in fields {
        let var = env_var_name(prefix, &field.external_name);
        if let Some(value) = env.var(&var) {
            tracing::debug!(key = %field.external_name, var = %var, "config value overridden by environment");
            map.insert(field.external_name.clone(), value);
            applied.push((field.external_name.clone(), var));
        }
    }
    applied
}

/// Checks that every variable in `names` is set in `env`.
pub fn check_env_set(env: &(impl Environment + ?Sized), names: &[&str]) -> Result<(), ConfigError> {
    match names.iter().find(|name| env.var(name).is_none()) {
        Some(name) => Err(ConfigError::EnvNotSet(name.to_string())),
        None => Ok(()),
    }
}

/// Exits the process if any variable in `names` is missing from the process
/// environment.
///
/// Meant for startup code, where a missing variable cannot be recovered from.
/// The message goes to stderr as well as to `tracing`, so it is visible even
/// when no subscriber is installed.
pub fn ensure_env_set(names: &[&str]) {
    if let Err(err) = check_env_set(&ProcessEnv, names) {
        tracing::error!(error = %err, "required environment variable missing");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
