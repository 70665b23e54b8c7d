use futures::future::join_all;
use pulsedash_schema::{Daily, Habit, TodoistStats, WidgetSnapshot};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::DashError;
use crate::providers::{HabitReader, TaskReader};

pub const WATER_HABIT: &str = "Water";
pub const READING_HABIT: &str = "Reading";

/// Result of one branch; each variant owns a disjoint set of snapshot fields.
#[derive(Debug)]
enum Partial {
    Habits {
        water_value: i64,
        water_goal: i64,
        read_value: i64,
        read_goal: i64,
    },
    Dailies {
        done: i64,
        due: i64,
    },
    Tasks {
        due: i64,
    },
    Stats {
        done: i64,
        goal: i64,
    },
}

impl Partial {
    fn from_habits(habits: &[Habit]) -> Self {
        let mut water = (0, 0);
        let mut reading = (0, 0);
        for habit in habits {
            match habit.task.text.as_str() {
                WATER_HABIT => {
                    water = (
                        habit.counter_up - habit.counter_down,
                        habit.parse_goal().unwrap_or(0),
                    );
                }
                READING_HABIT => reading = (habit.counter_up, habit.parse_goal().unwrap_or(0)),
                _ => {}
            }
        }
        Partial::Habits {
            water_value: water.0,
            water_goal: water.1,
            read_value: reading.0,
            read_goal: reading.1,
        }
    }

    fn from_dailies(dailies: &[Daily]) -> Self {
        let due = dailies.iter().filter(|d| d.is_due);
        Partial::Dailies {
            due: count(due.clone()),
            done: count(due.filter(|d| d.completed)),
        }
    }

    fn from_stats(stats: &TodoistStats) -> Self {
        Partial::Stats {
            done: stats.completed_today(),
            goal: stats.goals.daily_goal,
        }
    }

    fn apply(self, snapshot: &mut WidgetSnapshot) {
        match self {
            Partial::Habits {
                water_value,
                water_goal,
                read_value,
                read_goal,
            } => {
                snapshot.habitica_water_value = water_value;
                snapshot.habitica_water_goal = water_goal;
                snapshot.habitica_read_value = read_value;
                snapshot.habitica_read_goal = read_goal;
            }
            Partial::Dailies { done, due } => {
                snapshot.habitica_dailys_done = done;
                snapshot.habitica_dailys_due = due;
            }
            Partial::Tasks { due } => snapshot.todoist_tasks_due = due,
            Partial::Stats { done, goal } => {
                snapshot.todoist_tasks_done = done;
                snapshot.todoist_tasks_goal = goal;
            }
        }
    }
}

fn count<I: Iterator>(iter: I) -> i64 {
    i64::try_from(iter.count()).unwrap_or(i64::MAX)
}

/// Builds [`WidgetSnapshot`]s. A failed read leaves its fields at zero and adds one error.
#[derive(Clone)]
pub struct WidgetService {
    habits: Arc<dyn HabitReader>,
    tasks: Arc<dyn TaskReader>,
    task_query: Arc<str>,
    task_limit: u32,
}

impl WidgetService {
    pub fn new(
        habits: Arc<dyn HabitReader>,
        tasks: Arc<dyn TaskReader>,
        task_query: &str,
        task_limit: u32,
    ) -> Self {
        Self {
            habits,
            tasks,
            task_query: Arc::from(task_query),
            task_limit,
        }
    }

    /// Runs every branch to completion; nothing is cancelled when one fails.
    pub async fn get_snapshot(&self) -> WidgetSnapshot {
        let habits = self.habits.clone();
        let dailies = self.habits.clone();
        let tasks = self.tasks.clone();
        let stats = self.tasks.clone();
        let (query, limit) = (self.task_query.clone(), self.task_limit);

        let branches = vec![
            (
                "habits",
                tokio::spawn(async move {
                    habits.habits().await.map(|h| Partial::from_habits(&h))
                }),
            ),
            (
                "dailies",
                tokio::spawn(async move {
                    dailies.dailies().await.map(|d| Partial::from_dailies(&d))
                }),
            ),
            (
                "tasks",
                tokio::spawn(async move {
                    tasks
                        .filter_tasks(&query, limit)
                        .await
                        .map(|t| Partial::Tasks { due: count(t.iter()) })
                }),
            ),
            (
                "stats",
                tokio::spawn(async move {
                    stats.completed_stats().await.map(|s| Partial::from_stats(&s))
                }),
            ),
        ];

        let (names, handles): (Vec<_>, Vec<_>) = branches.into_iter().unzip();
        let results = join_all(handles).await;

        let mut snapshot = WidgetSnapshot::default();
        for (branch, joined) in names.into_iter().zip(results) {
            match joined {
                Ok(Ok(partial)) => partial.apply(&mut snapshot),
                Ok(Err(e)) => {
                    warn!(branch, "widget read failed: {e}");
                    snapshot.errors.push(branch_error(branch, &e));
                }
                Err(join_err) => {
                    error!(branch, "widget branch aborted: {join_err}");
                    snapshot.errors.push(format!("{branch}: task failed: {join_err}"));
                }
            }
        }
        snapshot
    }
}

fn branch_error(branch: &str, e: &DashError) -> String {
    format!("{branch}: {e}")
}
