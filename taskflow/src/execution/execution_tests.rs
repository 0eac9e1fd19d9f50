//! Tests for task action execution.

#[cfg(test)]
mod tests {
    use crate::actions::{ChangeKind, IncrementalInputs, InputChange, TaskClassInfoStore, TaskType};
    use crate::config::ExecutionConfig;
    use crate::core::TaskNode;
    use crate::errors::{ActionExecutionError, TaskflowError};
    use crate::execution::TaskActionExecuter;
    use crate::isolation::{
        Instantiator, IsolatedAction, IsolatedActionType, IsolatedParameters, ProjectLock,
        Services,
    };
    use crate::testing::{assert_completed_actions, task_of, ActionRecorder};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use std::sync::{Arc, Barrier};

    fn executer() -> TaskActionExecuter {
        TaskActionExecuter::new(Arc::new(ProjectLock::new()), Arc::new(TaskClassInfoStore::new()))
    }

    #[test]
    fn test_actions_run_in_order_and_are_recorded() {
        let recorder = ActionRecorder::new();
        let base = TaskType::builder("Base").action(recorder.action("cleanup")).build();
        let compile = TaskType::builder("Compile")
            .extends(&base)
            .action(recorder.action("compile"))
            .action(recorder.action("verify"))
            .build();
        let task = task_of(":app:compile", &compile);
        let executer = executer();

        let outcome = executer.execute(&task, None).unwrap();

        assert_eq!(
            recorder.entries(),
            vec![":app:compile:compile", ":app:compile:verify", ":app:compile:cleanup"]
        );
        assert_eq!(
            outcome.actions,
            vec!["Compile.compile()", "Compile.verify()", "Base.cleanup()"]
        );
        assert!(!outcome.incremental);
        let guard = executer.project().lock();
        assert_completed_actions(
            guard.state(),
            &[
                (":app:compile", "Compile.compile()"),
                (":app:compile", "Compile.verify()"),
                (":app:compile", "Base.cleanup()"),
            ],
        );
    }

    #[test]
    fn test_first_failure_stops_execution() {
        let recorder = ActionRecorder::new();
        let task_type = TaskType::builder("Flaky")
            .action(recorder.action("first"))
            .action(recorder.failing_action("second", "network down"))
            .action(recorder.action("third"))
            .build();
        let task = task_of(":flaky", &task_type);
        let executer = executer();

        let err = executer.execute(&task, None).unwrap_err();

        match err {
            TaskflowError::ActionExecution(ActionExecutionError::ActionFailed {
                task, action, source,
            }) => {
                assert_eq!(task, ":flaky");
                assert_eq!(action, "Flaky.second()");
                assert_eq!(source.to_string(), "network down");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(recorder.entries(), vec![":flaky:first", ":flaky:second"]);
        assert_eq!(executer.project().lock().state().completed_actions().len(), 1);
        assert!(!executer.project().is_locked());
    }

    #[test]
    fn test_invalid_task_type_fails_before_any_action() {
        let recorder = ActionRecorder::new();
        let task_type = TaskType::builder("Broken")
            .action(recorder.action("run"))
            .action(recorder.action("run"))
            .build();
        let task = task_of(":broken", &task_type);
        let executer = executer();

        let first = executer.execute(&task, None).unwrap_err();
        let second = executer.execute(&task, None).unwrap_err();

        assert!(matches!(first, TaskflowError::ActionMetadata(_)));
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(recorder.count(), 0);
        assert_eq!(executer.store().constructions(), 1);
    }

    #[test]
    fn test_incremental_inputs_are_passed_through() {
        let recorder = ActionRecorder::new();
        let task_type = TaskType::builder("Sync")
            .action(recorder.incremental_action("sync"))
            .build();
        let task = task_of(":sync", &task_type);
        let inputs = IncrementalInputs::changes([
            InputChange::new("a", ChangeKind::Added),
            InputChange::new("b", ChangeKind::Removed),
        ]);

        let outcome = executer().execute(&task, Some(&inputs)).unwrap();

        assert!(outcome.incremental);
        assert_eq!(recorder.entries(), vec![":sync:sync(2)"]);
    }

    #[test]
    fn test_missing_inputs_become_a_rebuild() {
        let recorder = ActionRecorder::new();
        let task_type = TaskType::builder("Sync")
            .action(recorder.incremental_action("sync"))
            .build();
        let task = task_of(":sync", &task_type);

        executer().execute(&task, None).unwrap();

        assert_eq!(recorder.entries(), vec![":sync:sync(rebuild)"]);
    }

    #[test]
    fn test_missing_inputs_rejected_when_configured() {
        let recorder = ActionRecorder::new();
        let task_type = TaskType::builder("Sync")
            .action(recorder.incremental_action("sync"))
            .build();
        let task = task_of(":sync", &task_type);
        let executer = executer().with_config(ExecutionConfig {
            rebuild_when_inputs_missing: false,
        });

        let err = executer.execute(&task, None).unwrap_err();

        assert!(matches!(
            err,
            TaskflowError::ActionExecution(ActionExecutionError::MissingIncrementalInputs { .. })
        ));
        assert_eq!(recorder.count(), 0);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct RendezvousParams {
        label: String,
    }

    struct RendezvousLog {
        barrier: Barrier,
        labels: Mutex<Vec<String>>,
    }

    /// Waits until every participating task is inside its body.
    struct Rendezvous {
        log: Arc<RendezvousLog>,
    }

    impl IsolatedAction for Rendezvous {
        type Params = RendezvousParams;

        fn create(services: &Services) -> anyhow::Result<Self> {
            Ok(Self {
                log: services.require::<RendezvousLog>()?,
            })
        }

        fn execute(self, params: RendezvousParams) -> anyhow::Result<()> {
            self.log.barrier.wait();
            self.log.labels.lock().push(params.label);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_isolated_actions_run_concurrently() {
        let log = Arc::new(RendezvousLog {
            barrier: Barrier::new(2),
            labels: Mutex::new(Vec::new()),
        });
        let services = Services::new();
        services.register(log.clone());
        let executer = executer().with_instantiator(Instantiator::new(services));

        let recorder = ActionRecorder::new();
        let worker_type = TaskType::builder("Worker")
            .isolatable()
            .action(recorder.action("prepare"))
            .build();
        let tasks: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|label| {
                let params = IsolatedParameters::new(
                    IsolatedActionType::of::<Rendezvous>(),
                    &RendezvousParams {
                        label: label.to_string(),
                    },
                )
                .unwrap();
                TaskNode::new(format!(":{label}"), Arc::clone(&worker_type))
                    .with_isolated_parameters(params)
                    .into_ref()
            })
            .collect();

        let results = executer.execute_all(tasks).await;

        for result in &results {
            let outcome = result.as_ref().unwrap();
            assert_eq!(outcome.actions, vec!["Worker.prepare()", "Worker (isolated)"]);
        }
        let mut labels = log.labels.lock().clone();
        labels.sort();
        assert_eq!(labels, vec!["left", "right"]);
        assert_eq!(recorder.count(), 2);
        assert_eq!(executer.store().constructions(), 1);
    }

    #[tokio::test]
    async fn test_execute_async_reports_errors() {
        let recorder = ActionRecorder::new();
        let task_type = TaskType::builder("Failing")
            .action(recorder.failing_action("run", "boom"))
            .build();
        let task = task_of(":failing", &task_type);

        let err = executer().execute_async(task, None).await.unwrap_err();

        assert!(err.to_string().contains(":failing"));
    }
}
