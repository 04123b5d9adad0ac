//! SQL schema for the Quizz SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Identities are issued by the authentication layer; this table only anchors
-- ownership references.
CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    name        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quizzes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    user_id     TEXT NOT NULL REFERENCES users(user_id)
);

-- "order" is caller-supplied and kept dense (0..N-1) per quiz by payload
-- validation. No UNIQUE index: reordering updates rows one at a time.
CREATE TABLE IF NOT EXISTS questions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    quiz_id       INTEGER NOT NULL REFERENCES quizzes(id),
    question_text TEXT NOT NULL,
    type          TEXT NOT NULL DEFAULT 'multiple_choice'
                  CHECK (type IN ('multiple_choice', 'write', 'listen')),
    audio_text    TEXT,            -- only for 'listen'
    "order"       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS question_answers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL REFERENCES questions(id),
    answer_text TEXT NOT NULL,
    is_correct  INTEGER NOT NULL
);

-- Submissions and user answers are write-once history.
CREATE TABLE IF NOT EXISTS quizz_submissions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    quizz_id    INTEGER NOT NULL REFERENCES quizzes(id),
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    score       INTEGER NOT NULL,
    created_at  TEXT NOT NULL      -- RFC 3339 UTC; server-assigned
);

-- Question and answer references survive quiz edits as NULL.
CREATE TABLE IF NOT EXISTS user_answers (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id      INTEGER NOT NULL
                       REFERENCES quizz_submissions(id) ON DELETE CASCADE,
    question_id        INTEGER REFERENCES questions(id) ON DELETE SET NULL,
    selected_answer_id INTEGER REFERENCES question_answers(id) ON DELETE SET NULL,
    user_answer_text   TEXT,
    is_correct         INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS quizzes_user_idx          ON quizzes(user_id);
CREATE INDEX IF NOT EXISTS questions_quiz_idx        ON questions(quiz_id);
CREATE INDEX IF NOT EXISTS answers_question_idx      ON question_answers(question_id);
CREATE INDEX IF NOT EXISTS submissions_quiz_idx      ON quizz_submissions(quizz_id);
CREATE INDEX IF NOT EXISTS user_answers_sub_idx      ON user_answers(submission_id);
CREATE INDEX IF NOT EXISTS user_answers_question_idx ON user_answers(question_id);
CREATE INDEX IF NOT EXISTS user_answers_answer_idx   ON user_answers(selected_answer_id);

PRAGMA user_version = 1;
"#;
