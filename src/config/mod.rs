//! Configuration loading and binding.

mod bind;
mod builder;
mod env;
mod error;
mod file;
mod lexer;
mod map;
mod naming;
mod parse;
mod record;
mod value;

pub use bind::{bind, bind_with_env, read, read_with_env};
pub use builder::Config;
pub use env::{
    apply_env_overrides, check_env_set, ensure_env_set, env_var_name, Environment, ProcessEnv,
};
pub use error::{ConfigError, SyntaxErrorKind};
pub use file::read_file;
pub use lexer::{lex_line, RawPair};
pub use map::ConfigMap;
pub use naming::{resolve_tag, to_snake_case, ResolvedName};
pub use parse::parse;
pub use record::{describe, FieldDescriptor, FieldSpec, Record, RecordError};
pub use value::{
    parse_bool, parse_float, parse_integer, BoxError, FieldKind, FieldValue, ValueError,
    ValueParser,
};
