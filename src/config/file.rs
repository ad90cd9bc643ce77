//! File-based configuration sources.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use super::bind::read;
use super::parse::parse;
use super::record::Record;
use super::{ConfigError, ConfigMap};

/// Loads and parses a config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
pub(crate) fn load_config_file(path: &Path, required: bool) -> Result<Option<ConfigMap>, ConfigError> {
    match File::open(path) {
        Ok(file) => parse(path, file).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                tracing::debug!(path = %path.display(), "optional config file not found, skipping");
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reads the config file at `path` into `target`.
pub fn read_file<R: Record + ?Sized>(path: impl AsRef<Path>, target: &mut R) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    read(path, file, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    crate::config_record! {
        #[derive(Debug, Default)]
        struct Database {
            host: String,
            port: u16,
        }
    }

    #[test]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key = \"value\"").unwrap();

        let map = load_config_file(file.path(), true).unwrap().unwrap();
        assert_eq!(map.get("key"), Some("value"));
    }

    #[test]
    fn test_required_missing() {
        let result = load_config_file(Path::new("/nonexistent/path/app.conf"), true);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_optional_missing() {
        let result = load_config_file(Path::new("/nonexistent/path/app.conf"), false).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_syntax_error_names_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "host = db\noops").unwrap();

        let err = load_config_file(file.path(), true).unwrap_err();
        assert!(matches!(&err, ConfigError::Syntax { path, line: 2, .. } if path == file.path()));
    }

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# database\nhost = db.internal\nport = 5432").unwrap();

        let mut db = Database::default();
        read_file(file.path(), &mut db).unwrap();
        assert_eq!(db.host, "db.internal");
        assert_eq!(db.port, 5432);

        let err = read_file("/nonexistent/path/app.conf", &mut db).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
