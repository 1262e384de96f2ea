//! Parse and load configuration files.

use std::{fs, path::Path};

use tracing::debug;

use crate::{Error, PipConfig, excerpt_at};

/// Parse a configuration from RON text and validate it.
pub fn from_ron(text: &str) -> Result<PipConfig, Error> {
    let cfg: PipConfig = ron::from_str(text).map_err(|err| {
        let line = err.span.start.line;
        let col = err.span.start.col;
        Error::Parse {
            path: None,
            line,
            col,
            message: err.code.to_string(),
            excerpt: excerpt_at(text, line, col),
        }
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load a configuration from a `.ron` file at `path`.
pub fn load(path: &Path) -> Result<PipConfig, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let cfg = from_ron(&text).map_err(|e| e.with_path(path))?;
    debug!(path = %path.display(), "loaded pip config");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = from_ron("(enter_duration_ms: 300)").unwrap();
        assert_eq!(cfg.enter_duration_ms, 300);
        assert_eq!(cfg.resize_duration_ms, PipConfig::default().resize_duration_ms);
    }

    #[test]
    fn unknown_field_reports_location() {
        let err = from_ron("(\n  enter_ms: 3,\n)").unwrap_err();
        match err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(line, 2);
                assert!(excerpt.contains("enter_ms"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_attaches_path_to_validation_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "(default_snap_fraction: 5.0)").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.path(), Some(file.path()));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load(Path::new("/nonexistent/pip.ron")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
