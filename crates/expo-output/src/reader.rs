//! Readers for persisted artifacts, used by the weekly phase.

use std::io::Read;
use std::path::{Path, PathBuf};

use expo_core::AgentId;
use expo_exposure::DayValues;

use crate::layout::DAILY_CSV;
#[cfg(feature = "sqlite")]
use crate::layout::SQLITE_DB;
use crate::{OutputError, OutputResult};

/// A realisation's day summary: variable names and per-agent values.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyTable {
    pub variables: Vec<String>,
    pub values:    DayValues,
}

/// Load the day summary of the realisation artifact in `dir`.
///
/// `daily.csv` is preferred; with the `sqlite` feature the `daily` table of
/// `output.db` is read when no CSV is present.
pub fn load_daily_artifact(dir: &Path) -> OutputResult<DailyTable> {
    let csv = dir.join(DAILY_CSV);
    if csv.is_file() {
        return load_daily_csv(&csv);
    }
    #[cfg(feature = "sqlite")]
    {
        let db = dir.join(SQLITE_DB);
        if db.is_file() {
            return load_daily_sqlite(&db);
        }
    }
    Err(OutputError::MissingArtifact(csv))
}

/// Load `daily.csv` from `path`.
pub fn load_daily_csv(path: &Path) -> OutputResult<DailyTable> {
    if !path.is_file() {
        return Err(OutputError::MissingArtifact(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    load_daily_reader(file, path)
}

/// Load daily rows from any reader; `origin` names the source in errors.
///
/// The first column must be `agent_id`; every other column is a variable.
/// Empty cells are missing values.
pub fn load_daily_reader<R: Read>(reader: R, origin: &Path) -> OutputResult<DailyTable> {
    let parse_err = |message: String| OutputError::Parse { path: PathBuf::from(origin), message };

    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    match headers.get(0) {
        Some("agent_id") => {}
        other => return Err(parse_err(format!("first column must be agent_id, found {other:?}"))),
    }
    let variables: Vec<String> = headers.iter().skip(1).map(str::to_owned).collect();

    let mut values = DayValues::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let agent: u32 = record
            .get(0)
            .unwrap_or_default()
            .trim()
            .parse()
            .map_err(|e| parse_err(format!("row {}: bad agent_id: {e}", line + 1)))?;

        let row = record
            .iter()
            .skip(1)
            .map(|cell| match cell.trim() {
                "" => Ok(None),
                s => s
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|e| parse_err(format!("row {}: bad value {s:?}: {e}", line + 1))),
            })
            .collect::<OutputResult<Vec<_>>>()?;
        if values.insert(AgentId(agent), row).is_some() {
            return Err(parse_err(format!("agent {agent} appears twice")));
        }
    }

    tracing::debug!(path = %origin.display(), agents = values.len(), variables = variables.len(), "daily artifact loaded");
    Ok(DailyTable { variables, values })
}

/// Load the `daily` table of an `output.db` written by
/// [`SqliteWriter`](crate::SqliteWriter).
#[cfg(feature = "sqlite")]
pub fn load_daily_sqlite(db: &Path) -> OutputResult<DailyTable> {
    use rusqlite::{Connection, OpenFlags};

    if !db.is_file() {
        return Err(OutputError::MissingArtifact(db.to_path_buf()));
    }
    let parse_err = |message: String| OutputError::Parse { path: db.to_path_buf(), message };

    // Read-write without CREATE: a WAL database may need its -shm file rebuilt.
    let conn = Connection::open_with_flags(db, OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX)?;
    let mut stmt = conn.prepare("SELECT * FROM daily ORDER BY agent_id")?;
    let names: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
    match names.first().map(String::as_str) {
        Some("agent_id") => {}
        other => return Err(parse_err(format!("first column must be agent_id, found {other:?}"))),
    }
    let variables: Vec<String> = names[1..].to_vec();
    let width = names.len();

    let mut values = DayValues::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let raw: i64 = row.get(0)?;
        let agent = u32::try_from(raw).map_err(|_| parse_err(format!("bad agent_id {raw}")))?;
        let cells = (1..width).map(|i| row.get::<_, Option<f64>>(i)).collect::<Result<Vec<_>, _>>()?;
        if values.insert(AgentId(agent), cells).is_some() {
            return Err(parse_err(format!("agent {agent} appears twice")));
        }
    }

    tracing::debug!(path = %db.display(), agents = values.len(), variables = variables.len(), "daily table loaded");
    Ok(DailyTable { variables, values })
}
