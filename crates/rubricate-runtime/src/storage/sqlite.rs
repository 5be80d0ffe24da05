use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rubricate_core::{GradedRecord, Question};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::{schema, GradeStore, StoreError};

/// SQLite-backed store. One connection, serialized behind a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        debug!(path = %path.display(), "opened grade store");
        Ok(store)
    }

    pub fn memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(schema::DDL)?;
        Ok(())
    }
}

impl GradeStore for SqliteStore {
    fn questions_for(&self, filename: &str) -> Result<Vec<Question>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT filename, question_text, rubric
             FROM questions
             WHERE filename = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![filename], |row| {
            Ok(Question::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut questions = Vec::new();
        for q in rows {
            questions.push(q?);
        }
        Ok(questions)
    }

    fn insert_questions(&self, questions: &[Question]) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO questions (filename, question_text, rubric) VALUES (?1, ?2, ?3)",
            )?;
            for q in questions {
                stmt.execute(params![q.filename, q.question_text, q.rubric])?;
            }
        }
        tx.commit()?;
        Ok(questions.len())
    }

    fn record_graded(&self, record: &GradedRecord) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO graded_answers
               (filename, question_text, student_answer, score, out_of, feedback, graded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.filename,
                record.question_text,
                record.student_answer,
                record.score,
                record.out_of,
                record.feedback,
                record.graded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn graded_for(&self, filename: &str) -> Result<Vec<GradedRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT filename, question_text, student_answer, score, out_of, feedback, graded_at
             FROM graded_answers
             WHERE filename = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![filename], |row| {
            Ok((
                GradedRecord {
                    filename: row.get(0)?,
                    question_text: row.get(1)?,
                    student_answer: row.get(2)?,
                    score: row.get(3)?,
                    out_of: row.get(4)?,
                    feedback: row.get(5)?,
                    graded_at: DateTime::<Utc>::MIN_UTC,
                },
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for r in rows {
            let (mut record, graded_at) = r?;
            record.graded_at = DateTime::parse_from_rfc3339(&graded_at)
                .map_err(|e| StoreError::Corrupt(format!("graded_at '{}': {}", graded_at, e)))?
                .with_timezone(&Utc);
            records.push(record);
        }
        Ok(records)
    }
}
