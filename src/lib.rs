//! Flat `key = value` configuration files bound onto typed records.
//!
//! A file is parsed line by line into a [`ConfigMap`]. `#` starts a comment
//! unless it appears inside a `'` or `"` quoted value:
//!
//! ```text
//! # server settings
//! listen_port = 8080
//! motd = 'welcome # to the server'
//! ```
//!
//! Records declared with [`config_record!`] (or implementing [`Record`] by
//! hand) are then filled from the map. A field is looked up under the
//! snake_case form of its name unless its tag renames it, and the upper-cased
//! name of the field in the environment can override the file.

pub mod config;

pub use config::{
    bind, bind_with_env, describe, ensure_env_set, parse, read, read_file, read_with_env,
    BoxError, Config, ConfigError, ConfigMap, Environment, FieldDescriptor, FieldKind, FieldSpec,
    FieldValue, Record, ValueError, ValueParser,
};
