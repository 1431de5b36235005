//! Daily ETL workflow
//!
//! A workflow is one root task (table creation) followed by independent
//! per-ticker tasks. The runner executes a definition once; the schedule
//! decides when.

mod runner;
mod schedule;

pub use runner::{run_daily, WorkflowRunner};
pub use schedule::DailySchedule;

use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default delay before a failed task is retried
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5 * 60);

/// Unit of work in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKind {
    CreateTables,
    FetchPrice(Ticker),
    FetchSentiment(Ticker),
}

impl TaskKind {
    /// Stable identifier used in logs and reports
    pub fn id(&self) -> String {
        match self {
            TaskKind::CreateTables => "create_tables".to_string(),
            TaskKind::FetchPrice(t) => format!("fetch_price_{}", t.as_str().to_lowercase()),
            TaskKind::FetchSentiment(t) => format!("fetch_sentiment_{}", t.as_str().to_lowercase()),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Per-task retry behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, DEFAULT_RETRY_DELAY)
    }
}

/// Declarative shape of a workflow run
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    pub name: String,
    /// Runs first; if it fails nothing else runs
    pub root: TaskKind,
    /// Run concurrently after the root succeeds
    pub fan_out: Vec<TaskKind>,
    pub retry: RetryPolicy,
}

impl WorkflowDefinition {
    /// Schema creation, then one price and one sentiment task per ticker
    pub fn daily(tickers: &[Ticker], retry: RetryPolicy) -> Self {
        let fan_out = tickers
            .iter()
            .flat_map(|t| [TaskKind::FetchPrice(t.clone()), TaskKind::FetchSentiment(t.clone())])
            .collect();

        Self {
            name: "stock_sentiment_etl".to_string(),
            root: TaskKind::CreateTables,
            fan_out,
            retry,
        }
    }

    /// All tasks in execution order
    pub fn tasks(&self) -> impl Iterator<Item = &TaskKind> {
        std::iter::once(&self.root).chain(self.fan_out.iter())
    }
}

/// Final state of one task in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Succeeded { attempts: u32, summary: String },
    Failed { attempts: u32, error: String },
    /// Never started because the root task failed
    UpstreamFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    #[serde(flatten)]
    pub state: TaskState,
}

/// Result of one workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub workflow: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Root first, then fan-out tasks in definition order
    pub tasks: Vec<TaskOutcome>,
}

impl RunReport {
    /// True when every task succeeded
    pub fn succeeded(&self) -> bool {
        self.tasks
            .iter()
            .all(|t| matches!(t.state, TaskState::Succeeded { .. }))
    }

    pub fn failed_tasks(&self) -> Vec<&TaskOutcome> {
        self.tasks
            .iter()
            .filter(|t| !matches!(t.state, TaskState::Succeeded { .. }))
            .collect()
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskOutcome> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}
