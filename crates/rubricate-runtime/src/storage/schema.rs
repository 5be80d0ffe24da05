pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  filename TEXT NOT NULL,
  question_text TEXT NOT NULL,
  rubric TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_questions_filename ON questions(filename);

CREATE TABLE IF NOT EXISTS graded_answers (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  filename TEXT NOT NULL,
  question_text TEXT NOT NULL,
  student_answer TEXT NOT NULL,
  score INTEGER NOT NULL,
  out_of INTEGER NOT NULL,
  feedback TEXT NOT NULL,
  graded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_graded_answers_filename ON graded_answers(filename);
"#;
