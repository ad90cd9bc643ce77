use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use super::bind::{bind_inner, Origins};
use super::env::{Environment, ProcessEnv};
use super::file::load_config_file;
use super::parse::parse;
use super::record::Record;
use super::{ConfigError, ConfigMap};

/// A configuration source in the loading pipeline.
#[derive(Debug)]
enum ConfigSource {
    File { path: PathBuf, required: bool },
    Text { name: PathBuf, contents: String },
}

/// Environment override settings.
struct EnvOverrides {
    prefix: String,
    env: Box<dyn Environment>,
}

impl fmt::Debug for EnvOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvOverrides")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Builder for loading configuration from several `key = value` sources.
///
/// Sources are merged in registration order, with keys from later sources
/// overriding earlier ones. When environment overrides are enabled they are
/// applied last, so a set variable beats every file.
///
/// ## Example
///
/// ```no_run
/// use flatconf::Config;
///
/// flatconf::config_record! {
///     #[derive(Debug, Default)]
///     struct MyConfig {
///         name: String,
///         port: u16,
///     }
/// }
///
/// // With PORT=9000 set, `port` is 9000 whatever the files say.
/// let config: MyConfig = Config::builder()
///     .with_file("config/default.conf", true)
///     .with_file("config/local.conf", false)
///     .with_env()
///     .build()?;
/// # Ok::<(), flatconf::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<ConfigSource>,
    env: Option<EnvOverrides>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a config file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(ConfigSource::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Adds config text held in memory. `name` labels error messages.
    pub fn with_text(mut self, name: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Text {
            name: name.as_ref().to_path_buf(),
            contents: contents.into(),
        });
        self
    }

    /// Lets process environment variables override file values.
    ///
    /// A field with external name `listen_port` is overridden by
    /// `LISTEN_PORT`.
    pub fn with_env(self) -> Self {
        self.with_env_prefix("")
    }

    /// Like [`with_env`](Self::with_env), but variable names start with
    /// `prefix`, e.g. `MYAPP_LISTEN_PORT` for the prefix `MYAPP_`.
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        self.with_environment(ProcessEnv, prefix)
    }

    /// Reads overrides from `env` instead of the process environment.
    pub fn with_environment(
        mut self,
        env: impl Environment + 'static,
        prefix: impl Into<String>,
    ) -> Self {
        self.env = Some(EnvOverrides {
            prefix: prefix.into(),
            env: Box::new(env),
        });
        self
    }

    /// Loads and merges every source into a single map.
    ///
    /// Environment overrides are not part of the map, since they are looked
    /// up per record field.
    pub fn build_map(&self) -> Result<ConfigMap, ConfigError> {
        self.load().map(|(merged, _)| merged)
    }

    /// Builds a default record and fills it from the configured sources.
    pub fn build<T: Record + Default>(self) -> Result<T, ConfigError> {
        let mut target = T::default();
        self.bind(&mut target)?;
        Ok(target)
    }

    /// Fills an existing record, so optional fields keep their preset values
    /// when absent.
    ///
    /// A value that fails to convert is reported against the source that
    /// supplied it. A missing required key is reported against the last source
    /// that was actually loaded.
    pub fn bind<T: Record + ?Sized>(self, target: &mut T) -> Result<(), ConfigError> {
        let (merged, origins) = self.load()?;
        let env = self
            .env
            .as_ref()
            .map(|o| (o.env.as_ref(), o.prefix.as_str()));
        bind_inner(Cow::Owned(merged), origins, target, env)
    }

    fn load(&self) -> Result<(ConfigMap, Origins), ConfigError> {
        let mut merged = ConfigMap::new();
        let mut origins = Origins::new("<none>");

        for source in &self.sources {
            let (path, map) = match source {
                ConfigSource::File { path, required } => match load_config_file(path, *required)? {
                    Some(map) => (path, map),
                    None => continue,
                },
                ConfigSource::Text { name, contents } => (name, parse(name, contents.as_bytes())?),
            };
            origins.record(&map, path);
            merged.merge(map);
        }

        Ok((merged, origins))
    }
}
