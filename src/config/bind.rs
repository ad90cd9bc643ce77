//! Binding of parsed values onto records.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::env::{apply_env_overrides, Environment};
use super::parse::parse;
use super::record::{resolve_fields, FieldDescriptor, FieldSpec, Record};
use super::{ConfigError, ConfigMap};

/// Fills the fields of `target` from `map`.
///
/// Fields are processed in declaration order and the first failure aborts the
/// bind; fields assigned before it keep their new values. Optional fields
/// missing from the map keep their current values.
pub fn bind<R: Record + ?Sized>(
    path: impl AsRef<Path>,
    map: &ConfigMap,
    target: &mut R,
) -> Result<(), ConfigError> {
    bind_inner(Cow::Borrowed(map), Origins::new(path.as_ref()), target, None)
}

/// Like [`bind`], but environment variables named after each field override
/// the values in `map`.
///
/// See [`apply_env_overrides`] for how variable names are derived.
pub fn bind_with_env<R: Record + ?Sized>(
    path: impl AsRef<Path>,
    map: &ConfigMap,
    target: &mut R,
    env: &dyn Environment,
    prefix: &str,
) -> Result<(), ConfigError> {
    bind_inner(
        Cow::Borrowed(map),
        Origins::new(path.as_ref()),
        target,
        Some((env, prefix)),
    )
}

/// Parses `reader` and binds the result onto `target`.
///
/// ```
/// flatconf::config_record! {
///     #[derive(Default)]
///     struct Conf {
///         cool: String,
///     }
/// }
///
/// let mut conf = Conf::default();
/// flatconf::read("<input>", "cool = beans # comment\n".as_bytes(), &mut conf)?;
/// assert_eq!(conf.cool, "beans");
/// # Ok::<(), flatconf::ConfigError>(())
/// ```
pub fn read<R: Record + ?Sized>(
    path: impl AsRef<Path>,
    reader: impl Read,
    target: &mut R,
) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let map = parse(path, reader)?;
    bind_inner(Cow::Owned(map), Origins::new(path), target, None)
}

/// Parses `reader` and binds the result onto `target`, letting environment
/// variables override file values.
pub fn read_with_env<R: Record + ?Sized>(
    path: impl AsRef<Path>,
    reader: impl Read,
    target: &mut R,
    env: &dyn Environment,
) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let map = parse(path, reader)?;
    bind_inner(Cow::Owned(map), Origins::new(path), target, Some((env, "")))
}

/// Where each key of a bound map came from, used to label binder errors.
#[derive(Debug, Clone)]
pub(crate) struct Origins {
    fallback: PathBuf,
    by_key: BTreeMap<String, PathBuf>,
}

impl Origins {
    /// Every key is attributed to `fallback` until recorded otherwise.
    pub(crate) fn new(fallback: impl Into<PathBuf>) -> Self {
        Self {
            fallback: fallback.into(),
            by_key: BTreeMap::new(),
        }
    }

    /// Attributes every key of `map` to `source`, which also becomes the
    /// label for keys no source supplied.
    pub(crate) fn record(&mut self, map: &ConfigMap, source: &Path) {
        for (key, _) in map.iter() {
            self.by_key.insert(key.to_string(), source.to_path_buf());
        }
        self.fallback = source.to_path_buf();
    }

    fn set(&mut self, key: &str, origin: PathBuf) {
        self.by_key.insert(key.to_string(), origin);
    }

    fn of(&self, key: &str) -> &Path {
        self.by_key.get(key).unwrap_or(&self.fallback)
    }

    fn fallback(&self) -> &Path {
        &self.fallback
    }
}

pub(crate) fn bind_inner<R: Record + ?Sized>(
    mut map: Cow<'_, ConfigMap>,
    mut origins: Origins,
    target: &mut R,
    env: Option<(&dyn Environment, &str)>,
) -> Result<(), ConfigError> {
    let mut fields = target.fields();
    let specs = resolve_fields(&fields).map_err(ConfigError::InvalidTarget)?;

    if let Some((env, prefix)) = env {
        for (key, var) in apply_env_overrides(map.to_mut(), &specs, env, prefix) {
            origins.set(&key, PathBuf::from(format!("${var}")));
        }
    }

    for (field, spec) in fields.iter_mut().zip(&specs) {
        bind_field(&origins, &map, field, spec)?;
    }

    tracing::debug!(path = %origins.fallback().display(), fields = specs.len(), "bound config record");
    Ok(())
}

fn bind_field(
    origins: &Origins,
    map: &ConfigMap,
    field: &mut FieldDescriptor<'_>,
    spec: &FieldSpec,
) -> Result<(), ConfigError> {
    let Some(raw) = map.get(&spec.external_name) else {
        if spec.optional {
            tracing::trace!(key = %spec.external_name, "optional config value absent");
            return Ok(());
        }
        return Err(ConfigError::MissingField {
            path: origins.fallback().to_path_buf(),
            name: spec.external_name.clone(),
        });
    };

    field.assign(raw).map_err(|source| ConfigError::Field {
        path: origins.of(&spec.external_name).to_path_buf(),
        field: spec.external_name.clone(),
        source,
    })
}
