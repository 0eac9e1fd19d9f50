//! Executes the actions of a task under the project lock.

use crate::actions::{ActionContext, IncrementalInputs, TaskClassInfoStore};
use crate::config::ExecutionConfig;
use crate::core::TaskRef;
use crate::errors::TaskflowError;
use crate::isolation::{Instantiator, ProjectLock};
use crate::observability::{SpanTimer, TaskSpanAttributes};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Summary of a successful task execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskExecutionOutcome {
    /// The task path.
    pub task: String,
    /// Display names of the actions that ran, in order.
    pub actions: Vec<String>,
    /// Whether the task type has an incremental action.
    pub incremental: bool,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

/// Runs task actions in order, recording each completed action in the
/// project state.
#[derive(Debug, Clone)]
pub struct TaskActionExecuter {
    project: Arc<ProjectLock>,
    store: Arc<TaskClassInfoStore>,
    instantiator: Instantiator,
    config: ExecutionConfig,
}

impl TaskActionExecuter {
    /// Creates an executer over the given project lock and metadata store.
    #[must_use]
    pub fn new(project: Arc<ProjectLock>, store: Arc<TaskClassInfoStore>) -> Self {
        Self {
            project,
            store,
            instantiator: Instantiator::default(),
            config: ExecutionConfig::default(),
        }
    }

    /// Sets the instantiator used for isolated actions.
    #[must_use]
    pub fn with_instantiator(mut self, instantiator: Instantiator) -> Self {
        self.instantiator = instantiator;
        self
    }

    /// Sets the execution configuration.
    #[must_use]
    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the project lock.
    #[must_use]
    pub fn project(&self) -> &Arc<ProjectLock> {
        &self.project
    }

    /// Returns the metadata store.
    #[must_use]
    pub fn store(&self) -> &Arc<TaskClassInfoStore> {
        &self.store
    }

    /// Executes all actions of `task`, stopping at the first failure.
    ///
    /// The project lock is held for the whole execution, except while an
    /// isolated action body runs.
    ///
    /// # Errors
    ///
    /// Returns [`TaskflowError::ActionMetadata`] if the task's type has
    /// invalid action declarations, or [`TaskflowError::ActionExecution`] if
    /// an action fails.
    pub fn execute(
        &self,
        task: &TaskRef,
        inputs: Option<&IncrementalInputs>,
    ) -> Result<TaskExecutionOutcome, TaskflowError> {
        let timer = SpanTimer::start(task.path());
        let attributes = TaskSpanAttributes::new(task.path()).with_task_type(task.task_type().name());

        let info = self.store.task_class_info(task.task_type())?;
        let rebuild = IncrementalInputs::rebuild();
        let inputs = inputs.or_else(|| {
            (info.is_incremental() && self.config.rebuild_when_inputs_missing).then_some(&rebuild)
        });

        let mut executed = Vec::with_capacity(info.factories().len());
        let mut guard = self.project.lock();
        for factory in info.factories() {
            let action = factory.create();
            let name = action.display_name();
            debug!(task = task.path(), action = %name, kind = %factory.kind(), "Executing action");

            let mut context = ActionContext::new(&mut guard, inputs, &self.instantiator);
            if let Err(err) = action.execute(task, &mut context) {
                let attributes = attributes
                    .clone()
                    .with_actions(executed.len())
                    .with_status("failed")
                    .with_duration_ms(timer.elapsed_ms())
                    .with_error(err.to_string());
                error!(
                    task = task.path(),
                    action = %name,
                    attributes = ?attributes.to_otel_attributes(),
                    "Task action failed"
                );
                return Err(err.into());
            }

            guard.state_mut().record_completed(task.path(), &name);
            executed.push(name);
        }
        drop(guard);

        let duration_ms = timer.finish();
        let attributes = attributes
            .with_actions(executed.len())
            .with_incremental(info.is_incremental())
            .with_status("completed")
            .with_duration_ms(duration_ms);
        info!(
            task = task.path(),
            actions = executed.len(),
            duration_ms,
            attributes = ?attributes.to_otel_attributes(),
            "Task executed"
        );

        Ok(TaskExecutionOutcome {
            task: task.path().to_string(),
            actions: executed,
            incremental: info.is_incremental(),
            duration_ms,
        })
    }

    /// Executes `task` on a blocking worker thread.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`execute`](Self::execute), or
    /// [`TaskflowError::Internal`] if the worker panicked.
    pub async fn execute_async(
        &self,
        task: TaskRef,
        inputs: Option<IncrementalInputs>,
    ) -> Result<TaskExecutionOutcome, TaskflowError> {
        let executer = self.clone();
        tokio::task::spawn_blocking(move || executer.execute(&task, inputs.as_ref()))
            .await
            .map_err(|e| TaskflowError::Internal(format!("Task execution worker failed: {e}")))?
    }

    /// Executes independent tasks concurrently and returns their results in
    /// input order.
    pub async fn execute_all(
        &self,
        tasks: impl IntoIterator<Item = TaskRef>,
    ) -> Vec<Result<TaskExecutionOutcome, TaskflowError>> {
        join_all(tasks.into_iter().map(|task| self.execute_async(task, None))).await
    }
}
