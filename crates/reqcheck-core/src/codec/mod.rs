//! JSON checkpoint codec.
//!
//! Records are written pretty-printed (4-space indent, UTF-8) through a
//! temporary file in the destination directory that is renamed into place, so
//! a reader sees either the previous file or the complete new document.
//! Reads go through [`decode_record`] before typed conversion.

pub mod shape;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ReqcheckError, Result};

pub use shape::{decode_record, FieldType, RecordShape, Shaped};

/// Serialize `record` to `path`, replacing any existing file.
pub fn write_record<T: Serialize>(record: &T, path: &Path) -> Result<()> {
    write_atomically(path, |out| {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(out, formatter);
        record
            .serialize(&mut ser)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    debug!(path = %path.display(), "wrote json checkpoint");
    Ok(())
}

/// Read `path` and project it onto `shape` without typed conversion.
pub fn read_shaped(path: &Path, shape: &RecordShape) -> Result<Map<String, Value>> {
    let data = fs::read_to_string(path).map_err(|e| ReqcheckError::io(path, e))?;
    let value: Value = serde_json::from_str(&data).map_err(|e| {
        ReqcheckError::Schema(format!("{}: malformed JSON: {e}", path.display()))
    })?;
    decode_record(&value, shape)
}

/// Read `path` as a typed record.
pub fn read_record<T: Shaped + DeserializeOwned>(path: &Path) -> Result<T> {
    let projected = read_shaped(path, &T::shape())?;
    record_from_map(projected)
        .map_err(|e| ReqcheckError::Schema(format!("{}: {e}", path.display())))
}

/// Validate an untyped value (e.g. a provider answer) as a typed record.
pub fn decode_value<T: Shaped + DeserializeOwned>(value: &Value) -> Result<T> {
    let projected = decode_record(value, &T::shape())?;
    record_from_map(projected)
}

fn record_from_map<T: DeserializeOwned>(projected: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(projected)).map_err(ReqcheckError::from)
}

/// Write a plain-text checkpoint.
pub fn write_text(text: &str, path: &Path) -> Result<()> {
    write_atomically(path, |out| out.write_all(text.as_bytes()))?;
    debug!(path = %path.display(), "wrote text checkpoint");
    Ok(())
}

/// Read a plain-text file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ReqcheckError::io(path, e))
}

fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ReqcheckError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ReqcheckError::io(dir, e))?;
    {
        let mut out = BufWriter::new(&mut tmp);
        fill(&mut out).map_err(|e| ReqcheckError::io(path, e))?;
        out.flush().map_err(|e| ReqcheckError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| ReqcheckError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| ReqcheckError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CriteriaSet, Criterion};

    #[test]
    fn writes_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        write_record(&CriteriaSet::new(vec![Criterion::new("t", "e")]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"criteria\""), "{text}");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis").join("mock-1").join("r_improved");
        write_text("Buy milk", &path).unwrap();
        assert_eq!(read_text(&path).unwrap(), "Buy milk");
    }

    #[test]
    fn non_ascii_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        write_record(&CriteriaSet::new(vec![Criterion::new("Titel", "Größe")]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Größe"));
    }

    #[test]
    fn malformed_json_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"criteria\": [").unwrap();
        let err = read_record::<CriteriaSet>(&path).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_record::<CriteriaSet>(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ReqcheckError::Io { .. }));
    }

    #[test]
    fn missing_required_field_fails_typed_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{"criteria": [{"title": "only"}]}"#).unwrap();

        let partial = read_shaped(&path, &CriteriaSet::shape()).unwrap();
        assert_eq!(partial["criteria"][0], serde_json::json!({"title": "only"}));

        let err = read_record::<CriteriaSet>(&path).unwrap_err();
        assert!(err.is_schema());
    }
}
