//! SQL DDL for initializing the rule tables.

/// SQLite schema includes:
/// - `habitica_habit_rule`: habit counter threshold that scores a daily (one rule per habit)
/// - `todoist_text_rule`: lowercase content prefix mapped to a habit, ordered by `priority, id`
/// - `todoist_project_rule`: project mapped to a habit (one rule per project)
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Habit progress rules
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS habitica_habit_rule (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    habit_id TEXT NOT NULL,
    daily_id TEXT NOT NULL,
    min_score INTEGER NOT NULL,
    UNIQUE(habit_id)
);

-- ---------------------------------------------------------------------------
-- Task completion rules (text prefix first, project second)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS todoist_text_rule (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    rule_text TEXT NOT NULL,
    habit_id TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_todoist_text_rule_order ON todoist_text_rule(priority, id);

CREATE TABLE IF NOT EXISTS todoist_project_rule (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    project_id TEXT NOT NULL,
    habit_id TEXT NOT NULL,
    UNIQUE(project_id)
);
";
