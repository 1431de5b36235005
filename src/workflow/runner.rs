//! Workflow execution

use super::{
    DailySchedule, RetryPolicy, RunReport, TaskKind, TaskOutcome, TaskState, WorkflowDefinition,
};
use crate::error::Result;
use crate::services::{EtlContext, PriceService, SchemaService, SentimentService};
use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Executes a workflow definition against a shared context
#[derive(Debug, Clone)]
pub struct WorkflowRunner {
    ctx: EtlContext,
    definition: WorkflowDefinition,
}

impl WorkflowRunner {
    pub fn new(ctx: EtlContext, definition: WorkflowDefinition) -> Self {
        Self { ctx, definition }
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Run every task once, honouring the retry policy.
    ///
    /// Never returns early: a failed root marks the fan-out as upstream
    /// failed, and a failed fan-out task does not affect its siblings.
    pub async fn run_once(&self) -> RunReport {
        let started_at = Utc::now();
        let def = &self.definition;
        let ids: Vec<String> = def.tasks().map(TaskKind::id).collect();
        info!("Starting workflow {} ({} tasks): {}", def.name, ids.len(), ids.join(", "));

        let root = run_with_retry(self.ctx.clone(), def.root.clone(), def.retry).await;
        let root_ok = matches!(root.state, TaskState::Succeeded { .. });

        let mut tasks = Vec::with_capacity(def.fan_out.len() + 1);
        tasks.push(root);

        if root_ok {
            let mut slots: Vec<Option<TaskOutcome>> = vec![None; def.fan_out.len()];
            let mut set = JoinSet::new();

            for (index, task) in def.fan_out.iter().cloned().enumerate() {
                let ctx = self.ctx.clone();
                let policy = def.retry;
                set.spawn(async move { (index, run_with_retry(ctx, task, policy).await) });
            }

            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((index, outcome)) => slots[index] = Some(outcome),
                    Err(e) => error!("Workflow task aborted: {}", e),
                }
            }

            for (slot, task) in slots.into_iter().zip(def.fan_out.iter()) {
                tasks.push(slot.unwrap_or_else(|| TaskOutcome {
                    task_id: task.id(),
                    state: TaskState::Failed {
                        attempts: 0,
                        error: "task did not complete".to_string(),
                    },
                }));
            }
        } else {
            warn!("{} failed; skipping downstream tasks", def.root);
            tasks.extend(def.fan_out.iter().map(|task| TaskOutcome {
                task_id: task.id(),
                state: TaskState::UpstreamFailed,
            }));
        }

        let report = RunReport {
            workflow: def.name.clone(),
            started_at,
            finished_at: Utc::now(),
            tasks,
        };

        if report.succeeded() {
            info!("Workflow {} succeeded", report.workflow);
        } else {
            let failed: Vec<&str> = report.failed_tasks().iter().map(|t| t.task_id.as_str()).collect();
            error!("Workflow {} failed: {}", report.workflow, failed.join(", "));
        }

        report
    }
}

async fn run_with_retry(ctx: EtlContext, task: TaskKind, policy: RetryPolicy) -> TaskOutcome {
    let task_id = task.id();
    let mut attempts = 0;

    loop {
        attempts += 1;
        info!("Task {} attempt {}/{}", task_id, attempts, policy.max_attempts());

        match execute(&ctx, &task).await {
            Ok(summary) => {
                info!("Task {} succeeded: {}", task_id, summary);
                return TaskOutcome {
                    task_id,
                    state: TaskState::Succeeded { attempts, summary },
                };
            }
            Err(e) if attempts < policy.max_attempts() => {
                warn!(
                    "Task {} failed: {}; retrying in {}s",
                    task_id,
                    e,
                    policy.delay.as_secs()
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                error!("Task {} failed after {} attempts: {}", task_id, attempts, e);
                return TaskOutcome {
                    task_id,
                    state: TaskState::Failed {
                        attempts,
                        error: e.to_string(),
                    },
                };
            }
        }
    }
}

async fn execute(ctx: &EtlContext, task: &TaskKind) -> Result<String> {
    match task {
        TaskKind::CreateTables => {
            SchemaService::create_tables(ctx).await?;
            Ok("tables ready".to_string())
        }
        TaskKind::FetchPrice(ticker) => {
            let result = PriceService::ingest(ctx, ticker).await?;
            Ok(format!("{} bars fetched, {} inserted", result.fetched, result.inserted))
        }
        TaskKind::FetchSentiment(ticker) => {
            let result = SentimentService::ingest(ctx, ticker).await?;
            Ok(format!(
                "{} articles fetched, {} inserted, {} skipped",
                result.fetched, result.inserted, result.skipped
            ))
        }
    }
}

/// Run the workflow once per day until the process stops.
///
/// With `run_on_start` the current day is executed immediately; otherwise the
/// first run waits for the next trigger.
pub async fn run_daily(runner: WorkflowRunner, schedule: DailySchedule, run_on_start: bool) {
    if run_on_start {
        runner.run_once().await;
    }

    loop {
        let wait = schedule.duration_until_next_run();
        info!(
            "Next {} run in {} hours {} minutes ({})",
            runner.definition().name,
            wait.as_secs() / 3600,
            (wait.as_secs() % 3600) / 60,
            schedule.timezone()
        );

        tokio::time::sleep(wait).await;
        runner.run_once().await;
    }
}
