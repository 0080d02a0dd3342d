// ==========================================
// 供应商目录导入 - 检查点与运行记录仓储
// ==========================================
// 职责: 批次游标持久化（续传）+ 导入运行日志
// 表: import_checkpoint（每个 run_key 一行）/ import_run（每次运行一行）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::cursor::{BatchCursor, ImportRun, RunStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS import_checkpoint (
    run_key             TEXT PRIMARY KEY,
    start_row           INTEGER NOT NULL,
    batch_size          INTEGER NOT NULL,
    last_row_processed  INTEGER NOT NULL,
    total_imported      INTEGER NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS import_run (
    run_id              TEXT PRIMARY KEY,
    run_key             TEXT NOT NULL,
    vendor              TEXT NOT NULL,
    status              TEXT NOT NULL,
    imported_rows       INTEGER NOT NULL,
    skipped_rows        INTEGER NOT NULL,
    last_row_processed  INTEGER NOT NULL,
    started_at          TEXT NOT NULL,
    finished_at         TEXT,
    message             TEXT
);

CREATE INDEX IF NOT EXISTS idx_import_run_key ON import_run(run_key, started_at);
"#;

// ==========================================
// CheckpointRepository Trait
// ==========================================
// 实现者: SqliteCheckpointRepository, InMemoryCheckpointRepository
pub trait CheckpointRepository: Send + Sync {
    /// 读取游标（无检查点 → None）
    fn load(&self, run_key: &str) -> RepositoryResult<Option<BatchCursor>>;

    /// 保存游标（覆盖）
    fn save(&self, run_key: &str, cursor: &BatchCursor) -> RepositoryResult<()>;

    /// 清除游标（运行成功完成后）
    fn clear(&self, run_key: &str) -> RepositoryResult<()>;

    /// 写入或更新运行记录（按 run_id）
    fn record_run(&self, run: &ImportRun) -> RepositoryResult<()>;

    /// 查询某 run_key 的运行记录（按开始时间倒序）
    fn list_runs(&self, run_key: &str) -> RepositoryResult<Vec<ImportRun>>;
}

// ==========================================
// SqliteCheckpointRepository
// ==========================================
pub struct SqliteCheckpointRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCheckpointRepository {
    /// 打开（或创建）检查点库
    pub fn open<P: AsRef<Path>>(db_path: P) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path.as_ref())
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::with_schema(conn)
    }

    /// 内存库（测试 / 一次性运行）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::with_schema(conn)
    }

    fn with_schema(conn: Connection) -> RepositoryResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl CheckpointRepository for SqliteCheckpointRepository {
    fn load(&self, run_key: &str) -> RepositoryResult<Option<BatchCursor>> {
        let conn = self.get_conn()?;
        let cursor = conn
            .query_row(
                r#"
                SELECT start_row, batch_size, last_row_processed, total_imported
                FROM import_checkpoint
                WHERE run_key = ?1
                "#,
                params![run_key],
                |row| {
                    Ok(BatchCursor {
                        start_row: from_db_count(row.get(0)?),
                        batch_size: from_db_count(row.get(1)?),
                        last_row_processed: from_db_count(row.get(2)?),
                        total_imported: from_db_count(row.get(3)?),
                    })
                },
            )
            .optional()?;
        Ok(cursor)
    }

    fn save(&self, run_key: &str, cursor: &BatchCursor) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_checkpoint (
                run_key, start_row, batch_size, last_row_processed, total_imported, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(run_key) DO UPDATE SET
                start_row = excluded.start_row,
                batch_size = excluded.batch_size,
                last_row_processed = excluded.last_row_processed,
                total_imported = excluded.total_imported,
                updated_at = excluded.updated_at
            "#,
            params![
                run_key,
                to_db_count(cursor.start_row),
                to_db_count(cursor.batch_size),
                to_db_count(cursor.last_row_processed),
                to_db_count(cursor.total_imported),
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    fn clear(&self, run_key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM import_checkpoint WHERE run_key = ?1",
            params![run_key],
        )?;
        Ok(())
    }

    fn record_run(&self, run: &ImportRun) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO import_run (
                run_id, run_key, vendor, status,
                imported_rows, skipped_rows, last_row_processed,
                started_at, finished_at, message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                run.run_id,
                run.run_key,
                run.vendor,
                run.status.to_string(),
                to_db_count(run.imported_rows),
                to_db_count(run.skipped_rows),
                to_db_count(run.last_row_processed),
                run.started_at,
                run.finished_at,
                run.message,
            ],
        )?;
        Ok(())
    }

    fn list_runs(&self, run_key: &str) -> RepositoryResult<Vec<ImportRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                run_id, run_key, vendor, status,
                imported_rows, skipped_rows, last_row_processed,
                started_at, finished_at, message
            FROM import_run
            WHERE run_key = ?1
            ORDER BY started_at DESC
            "#,
        )?;

        let runs = stmt
            .query_map(params![run_key], |row| {
                Ok(ImportRun {
                    run_id: row.get(0)?,
                    run_key: row.get(1)?,
                    vendor: row.get(2)?,
                    status: RunStatus::parse(&row.get::<_, String>(3)?),
                    imported_rows: from_db_count(row.get(4)?),
                    skipped_rows: from_db_count(row.get(5)?),
                    last_row_processed: from_db_count(row.get(6)?),
                    started_at: row.get::<_, DateTime<Utc>>(7)?,
                    finished_at: row.get::<_, Option<DateTime<Utc>>>(8)?,
                    message: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}

fn to_db_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

// ==========================================
// InMemoryCheckpointRepository
// ==========================================
#[derive(Default)]
pub struct InMemoryCheckpointRepository {
    cursors: Mutex<HashMap<String, BatchCursor>>,
    runs: Mutex<Vec<ImportRun>>,
}

impl InMemoryCheckpointRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(mutex: &Mutex<T>) -> RepositoryResult<MutexGuard<'_, T>> {
        mutex
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl CheckpointRepository for InMemoryCheckpointRepository {
    fn load(&self, run_key: &str) -> RepositoryResult<Option<BatchCursor>> {
        Ok(Self::lock(&self.cursors)?.get(run_key).copied())
    }

    fn save(&self, run_key: &str, cursor: &BatchCursor) -> RepositoryResult<()> {
        Self::lock(&self.cursors)?.insert(run_key.to_string(), *cursor);
        Ok(())
    }

    fn clear(&self, run_key: &str) -> RepositoryResult<()> {
        Self::lock(&self.cursors)?.remove(run_key);
        Ok(())
    }

    fn record_run(&self, run: &ImportRun) -> RepositoryResult<()> {
        let mut runs = Self::lock(&self.runs)?;
        match runs.iter_mut().find(|r| r.run_id == run.run_id) {
            Some(existing) => *existing = run.clone(),
            None => runs.push(run.clone()),
        }
        Ok(())
    }

    fn list_runs(&self, run_key: &str) -> RepositoryResult<Vec<ImportRun>> {
        let mut runs: Vec<ImportRun> = Self::lock(&self.runs)?
            .iter()
            .filter(|r| r.run_key == run_key)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn run(run_id: &str, started_at: DateTime<Utc>, status: RunStatus) -> ImportRun {
        ImportRun {
            run_id: run_id.to_string(),
            run_key: "Crystal::a.csv->b.csv".to_string(),
            vendor: "Crystal".to_string(),
            status,
            imported_rows: 10,
            skipped_rows: 2,
            last_row_processed: 51,
            started_at,
            finished_at: None,
            message: None,
        }
    }

    fn exercise(repo: &dyn CheckpointRepository) {
        let key = "Crystal::a.csv->b.csv";
        assert_eq!(repo.load(key).unwrap(), None);

        let cursor = BatchCursor::new(50).advance(51, 12);
        repo.save(key, &cursor).unwrap();
        assert_eq!(repo.load(key).unwrap(), Some(cursor));

        let moved = cursor.advance(101, 8);
        repo.save(key, &moved).unwrap();
        assert_eq!(repo.load(key).unwrap(), Some(moved));
        assert_eq!(repo.load("other").unwrap(), None);

        repo.clear(key).unwrap();
        assert_eq!(repo.load(key).unwrap(), None);

        let t0 = Utc::now();
        repo.record_run(&run("r1", t0, RunStatus::Running)).unwrap();
        repo.record_run(&run("r2", t0 + Duration::seconds(5), RunStatus::Running))
            .unwrap();

        let mut finished = run("r1", t0, RunStatus::Failed);
        finished.finished_at = Some(t0 + Duration::seconds(1));
        finished.message = Some("disk full".to_string());
        repo.record_run(&finished).unwrap();

        let runs = repo.list_runs(key).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id, "r2");
        assert_eq!(runs[1].status, RunStatus::Failed);
        assert_eq!(runs[1].message.as_deref(), Some("disk full"));
        assert!(runs[1].finished_at.is_some());
        assert_eq!(runs[1].last_row_processed, 51);
    }

    #[test]
    fn test_sqlite_checkpoint_repository() {
        let repo = SqliteCheckpointRepository::in_memory().unwrap();
        exercise(&repo);
    }

    #[test]
    fn test_in_memory_checkpoint_repository() {
        let repo = InMemoryCheckpointRepository::new();
        exercise(&repo);
    }

    #[test]
    fn test_sqlite_checkpoint_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("checkpoints.db");
        let cursor = BatchCursor::new(20).advance(21, 20);

        {
            let repo = SqliteCheckpointRepository::open(&path).unwrap();
            repo.save("k", &cursor).unwrap();
        }

        let repo = SqliteCheckpointRepository::open(&path).unwrap();
        assert_eq!(repo.load("k").unwrap(), Some(cursor));
    }
}
