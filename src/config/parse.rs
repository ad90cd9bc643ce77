use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::lexer::lex_line;
use super::{ConfigError, ConfigMap, SyntaxErrorKind};

/// Parses `key = value` lines from `reader` into a [`ConfigMap`].
///
/// `path` only labels error messages; nothing is read from it. Blank lines and
/// lines starting with `#` are ignored, and a later assignment to the same key
/// replaces an earlier one.
pub fn parse(path: impl AsRef<Path>, reader: impl Read) -> Result<ConfigMap, ConfigError> {
    let path = path.as_ref();
    let mut map = ConfigMap::new();

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let syntax_error = |kind| ConfigError::Syntax {
            path: path.to_path_buf(),
            line: line_no,
            kind,
        };

        let raw = lex_line(text).map_err(syntax_error)?;
        if raw.skip {
            continue;
        }

        let left = raw.left.trim();
        if left.is_empty() {
            return Err(syntax_error(SyntaxErrorKind::EmptyKey));
        }

        tracing::trace!(path = %path.display(), line = line_no, key = left, "parsed assignment");
        map.insert(left, raw.right.trim());
    }

    tracing::debug!(path = %path.display(), entries = map.len(), "parsed config");
    Ok(map)
}
