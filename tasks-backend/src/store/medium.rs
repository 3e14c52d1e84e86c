//! File operations for the task table
//!
//! Handles reading the CSV file into tasks, appending one row, and rewriting
//! the whole file. Every function opens the file itself and drops the handle
//! before returning.

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};
use super::schema::{self, SchemaVersion};
use crate::models::Task;

/// Decoded contents of a non-empty task file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub schema: SchemaVersion,
    pub tasks: Vec<Task>,
}

/// Ids found by a lenient scan, plus the layout of the header if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdScan {
    pub schema: Option<SchemaVersion>,
    pub ids: Vec<u64>,
}

/// Open the task file for reading, returning None if it doesn't exist yet
fn open_existing(path: &Path) -> StoreResult<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::unavailable(path, e)),
    }
}

fn reader(file: File) -> csv::Reader<File> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(file)
}

/// Read the header row; None means the file is empty
fn read_headers(path: &Path, rdr: &mut csv::Reader<File>) -> StoreResult<Option<StringRecord>> {
    let headers = rdr
        .headers()
        .map_err(|e| StoreError::from_csv(path, e))?
        .clone();
    if headers.is_empty() {
        return Ok(None);
    }
    Ok(Some(headers))
}

/// Read and decode every row, in file order.
///
/// Returns None if the file is absent or empty. The first row that fails to
/// decode aborts the read.
pub fn read_table(path: &Path) -> StoreResult<Option<Table>> {
    let Some(file) = open_existing(path)? else {
        return Ok(None);
    };
    let mut rdr = reader(file);

    let Some(headers) = read_headers(path, &mut rdr)? else {
        return Ok(None);
    };
    let schema = SchemaVersion::detect(&headers).map_err(|e| StoreError::malformed(path, 1, e))?;

    let mut tasks = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| StoreError::from_csv(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let task = schema::decode(&record, &headers)
            .map_err(|reason| StoreError::malformed(path, line, reason))?;
        tasks.push(task);
    }

    Ok(Some(Table { schema, tasks }))
}

/// Collect every integer id in the file, skipping rows whose id doesn't parse
/// or that the csv reader rejects.
pub fn scan_ids(path: &Path) -> StoreResult<IdScan> {
    let Some(file) = open_existing(path)? else {
        return Ok(IdScan::default());
    };
    let mut rdr = reader(file);

    let Some(headers) = read_headers(path, &mut rdr)? else {
        return Ok(IdScan::default());
    };
    let schema = SchemaVersion::detect(&headers).map_err(|e| StoreError::malformed(path, 1, e))?;
    let id_col = headers.iter().position(|h| h == "id").unwrap_or(0);

    let mut ids = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(StoreError::from_csv(path, e)),
            Err(e) => {
                log::debug!("[TASKS] Skipping unreadable row during id scan: {}", e);
                continue;
            }
        };
        if let Some(id) = record.get(id_col).and_then(schema::parse_id) {
            ids.push(id);
        }
    }

    Ok(IdScan {
        schema: Some(schema),
        ids,
    })
}

fn ensure_parent(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(path, e))?;
        }
    }
    Ok(())
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Append one task as a new row. If the file is empty or absent it is created
/// and `schema`'s header row is written first. A last row missing its line
/// terminator gets one before the new row.
pub fn append_task(path: &Path, schema: SchemaVersion, task: &Task) -> StoreResult<()> {
    ensure_parent(path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::unavailable(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| StoreError::unavailable(path, e))?
        .len();
    let is_empty = len == 0;

    if !is_empty {
        let terminated =
            ends_with_newline(&mut file, len).map_err(|e| StoreError::unavailable(path, e))?;
        if !terminated {
            file.write_all(b"\n")
                .map_err(|e| StoreError::unavailable(path, e))?;
        }
    }

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
    if is_empty {
        wtr.write_record(schema.columns())
            .map_err(|e| StoreError::from_csv(path, e))?;
    }
    wtr.write_record(schema.encode(task))
        .map_err(|e| StoreError::from_csv(path, e))?;
    wtr.flush().map_err(|e| StoreError::unavailable(path, e))?;

    Ok(())
}

/// Sibling file a rewrite is staged in before it replaces the task file
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "tasks.csv".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Replace the whole file with a header row plus `tasks`, in order.
///
/// The new contents are written to a staging file and renamed over the task
/// file, so a failed write leaves the previous contents in place.
pub fn rewrite_table(path: &Path, schema: SchemaVersion, tasks: &[Task]) -> StoreResult<()> {
    ensure_parent(path)?;

    let staging = staging_path(path);
    let result = write_all(&staging, schema, tasks).and_then(|_| fs::rename(&staging, path));

    if let Err(e) = result {
        fs::remove_file(&staging).ok();
        return Err(StoreError::unavailable(path, e));
    }
    Ok(())
}

fn write_all(path: &Path, schema: SchemaVersion, tasks: &[Task]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

    wtr.write_record(schema.columns()).map_err(io::Error::from)?;
    for task in tasks {
        wtr.write_record(schema.encode(task)).map_err(io::Error::from)?;
    }

    let mut file = wtr.into_inner().map_err(|e| e.into_error())?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: format!("{} description", title),
            status: "Ready".to_string(),
            priority: "lower".to_string(),
        }
    }

    #[test]
    fn test_read_table_absent_and_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        assert_eq!(read_table(&path).unwrap(), None);

        fs::write(&path, "").unwrap();
        assert_eq!(read_table(&path).unwrap(), None);
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/tasks.csv");

        append_task(&path, SchemaVersion::V1, &task(1, "one")).unwrap();
        append_task(&path, SchemaVersion::V1, &task(2, "two")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,title,description,status\n"));
        assert_eq!(content.matches("id,title").count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_append_terminates_unfinished_last_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(&path, "id,title,description,status\n1,a,b,c").unwrap();

        append_task(&path, SchemaVersion::V1, &task(2, "two")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "id,title,description,status\n1,a,b,c\n2,two,two description,Ready\n"
        );
        assert_eq!(read_table(&path).unwrap().unwrap().tasks.len(), 2);
    }

    #[test]
    fn test_rewrite_preserves_order_and_quotes_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");

        let mut tricky = task(2, "comma, \"quote\"");
        tricky.description = "line one\nline two".to_string();
        let tasks = vec![task(5, "five"), tricky.clone(), task(1, "one")];

        rewrite_table(&path, SchemaVersion::V2, &tasks).unwrap();

        let table = read_table(&path).unwrap().unwrap();
        assert_eq!(table.schema, SchemaVersion::V2);
        assert_eq!(table.tasks, tasks);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_read_table_malformed_row_aborts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(
            &path,
            "id,title,description,status\n1,a,b,c\nnope,d,e,f\n3,g,h,i\n",
        )
        .unwrap();

        match read_table(&path) {
            Err(StoreError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_ids_skips_non_numeric() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(
            &path,
            "id,title,description,status\n4,a,b,c\nx,d,e,f\n2,g,h,i\n",
        )
        .unwrap();

        let scan = scan_ids(&path).unwrap();
        assert_eq!(scan.schema, Some(SchemaVersion::V1));
        assert_eq!(scan.ids, vec![4, 2]);
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(&path, "id,title,status\n1,a,c\n").unwrap();

        assert!(matches!(
            read_table(&path),
            Err(StoreError::MalformedRecord { line: 1, .. })
        ));
    }
}
