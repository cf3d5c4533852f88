//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the artifact directory with three
//! tables: `slices`, `activities` and `daily`.  Each variable is a nullable
//! `REAL` column named after the variable.
//!
//! [`write_weekly_sqlite`] stores weekly tables in `weekly.db`, one table
//! `weekly_<variable>` per variable.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use rusqlite::types::Value;

use expo_exposure::WeeklyTable;

use crate::layout::{SQLITE_DB, WEEKLY_DB};
use crate::writer::OutputWriter;
use crate::{ActivityRow, DailyRow, OutputResult, SliceRow, WeeklyRow};

/// Writes realisation output to an SQLite database.
pub struct SqliteWriter {
    conn:            Connection,
    insert_slice:    String,
    insert_activity: String,
    insert_daily:    String,
    finished:        bool,
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table(name: &str, fixed: &[(&str, &str)], variables: &[String]) -> String {
    let cols: Vec<String> = fixed
        .iter()
        .map(|(c, ty)| format!("{c} {ty}"))
        .chain(variables.iter().map(|v| format!("{} REAL", quoted(v))))
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {name} ({});", cols.join(", "))
}

fn insert(name: &str, fixed: &[(&str, &str)], variables: &[String]) -> String {
    let cols: Vec<String> = fixed
        .iter()
        .map(|(c, _)| c.to_string())
        .chain(variables.iter().map(|v| quoted(v)))
        .collect();
    let params: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
    format!("INSERT INTO {name} ({}) VALUES ({})", cols.join(", "), params.join(", "))
}

const SLICE_COLS: [(&str, &str); 8] = [
    ("slice_id",             "INTEGER PRIMARY KEY"),
    ("agent_id",             "INTEGER NOT NULL"),
    ("activity_idx",         "INTEGER NOT NULL"),
    ("time_start",           "TEXT NOT NULL"),
    ("time_end",             "TEXT NOT NULL"),
    ("activity_group",       "INTEGER NOT NULL"),
    ("activity_description", "INTEGER NOT NULL"),
    ("travel_mode",          "INTEGER"),
];

const ACTIVITY_COLS: [(&str, &str); 6] = [
    ("agent_id",             "INTEGER NOT NULL"),
    ("act_idx",              "INTEGER NOT NULL"),
    ("duration",             "REAL NOT NULL"),
    ("activity_type",        "INTEGER NOT NULL"),
    ("activity_description", "INTEGER NOT NULL"),
    ("commute_mode",         "INTEGER"),
];

const DAILY_COLS: [(&str, &str); 1] = [("agent_id", "INTEGER PRIMARY KEY")];

fn real(v: Option<f64>) -> Value {
    v.map(Value::Real).unwrap_or(Value::Null)
}

fn integer(v: Option<i32>) -> Value {
    v.map(|v| Value::Integer(v as i64)).unwrap_or(Value::Null)
}

impl SqliteWriter {
    /// Create `dir` if needed, open (or create) `output.db` and initialise
    /// the schema.
    pub fn new(dir: &Path, variables: &[String]) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join(SQLITE_DB))?;

        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             {}
             {}
             {}",
            create_table("slices", &SLICE_COLS, variables),
            create_table("activities", &ACTIVITY_COLS, variables),
            create_table("daily", &DAILY_COLS, variables),
        ))?;

        Ok(Self {
            conn,
            insert_slice:    insert("slices", &SLICE_COLS, variables),
            insert_activity: insert("activities", &ACTIVITY_COLS, variables),
            insert_daily:    insert("daily", &DAILY_COLS, variables),
            finished:        false,
        })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_slices(&mut self, rows: &[SliceRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&self.insert_slice)?;
            for row in rows {
                let mut params = vec![
                    Value::Integer(row.slice_id as i64),
                    Value::Integer(row.agent_id as i64),
                    Value::Integer(row.activity_idx as i64),
                    Value::Text(row.time_start.clone()),
                    Value::Text(row.time_end.clone()),
                    Value::Integer(row.activity_group as i64),
                    Value::Integer(row.activity_description as i64),
                    integer(row.travel_mode),
                ];
                params.extend(row.values.iter().map(|v| real(*v)));
                stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_activities(&mut self, rows: &[ActivityRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&self.insert_activity)?;
            for row in rows {
                let mut params = vec![
                    Value::Integer(row.agent_id as i64),
                    Value::Integer(row.act_idx as i64),
                    Value::Real(row.duration),
                    Value::Integer(row.activity_type as i64),
                    Value::Integer(row.activity_description as i64),
                    integer(row.commute_mode),
                ];
                params.extend(row.values.iter().map(|v| real(*v)));
                stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_daily(&mut self, row: &DailyRow) -> OutputResult<()> {
        let mut params = vec![Value::Integer(row.agent_id as i64)];
        params.extend(row.values.iter().map(|v| real(*v)));
        self.conn
            .prepare_cached(&self.insert_daily)?
            .execute(rusqlite::params_from_iter(params))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

// ── Weekly ────────────────────────────────────────────────────────────────────

/// Write every table to `<dir>/weekly.db` as `weekly_<variable>` with
/// columns `agent_id,R1..RN,mean,std,var,min,max`.  Existing tables of the
/// same name are replaced.
pub fn write_weekly_sqlite(dir: &Path, tables: &[WeeklyTable], realisations: usize) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(WEEKLY_DB);
    let mut conn = Connection::open(&path)?;

    let stats: Vec<String> = (1..=realisations)
        .map(|r| format!("R{r}"))
        .chain(["mean", "std", "var", "min", "max"].map(String::from))
        .collect();

    let tx = conn.transaction()?;
    for table in tables {
        let name = quoted(&format!("weekly_{}", table.variable.name));
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name}; {}",
            create_table(&name, &DAILY_COLS, &stats)
        ))?;
        let mut stmt = tx.prepare(&insert(&name, &DAILY_COLS, &stats))?;
        for record in &table.records {
            let row = WeeklyRow::from(record);
            let mut params = vec![Value::Integer(row.agent_id as i64)];
            params.extend((0..realisations).map(|i| real(row.realisations.get(i).copied().flatten())));
            params.extend([row.mean, row.std, row.var, row.min, row.max].map(real));
            stmt.execute(rusqlite::params_from_iter(params))?;
        }
    }
    tx.commit()?;

    tracing::info!(path = %path.display(), tables = tables.len(), "weekly database written");
    Ok(path)
}
