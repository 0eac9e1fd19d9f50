//! Tests for running isolated actions off the project lock.

#[cfg(test)]
mod tests {
    use crate::actions::{ActionContext, ActionKind, TaskActionFactory, TaskType};
    use crate::core::{TaskNode, TaskRef};
    use crate::errors::ActionExecutionError;
    use crate::isolation::{
        Instantiator, IsolatedAction, IsolatedActionType, IsolatedParameters,
        IsolatedTaskActionFactory, ProjectLock, Services,
    };
    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};
    use std::sync::{Arc, Barrier};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct ProbeParams {
        message: String,
    }

    struct ProbeHooks {
        started: Barrier,
        resume: Barrier,
        observed: Mutex<Option<String>>,
    }

    impl ProbeHooks {
        fn new() -> Self {
            Self {
                started: Barrier::new(2),
                resume: Barrier::new(2),
                observed: Mutex::new(None),
            }
        }
    }

    /// Parks inside its body until the test lets it continue.
    struct Probe {
        hooks: Arc<ProbeHooks>,
    }

    impl IsolatedAction for Probe {
        type Params = ProbeParams;

        fn create(services: &Services) -> anyhow::Result<Self> {
            Ok(Self {
                hooks: services.require::<ProbeHooks>()?,
            })
        }

        fn execute(self, params: ProbeParams) -> anyhow::Result<()> {
            self.hooks.started.wait();
            self.hooks.resume.wait();
            *self.hooks.observed.lock() = Some(params.message);
            Ok(())
        }
    }

    struct Exploding;

    impl IsolatedAction for Exploding {
        type Params = ProbeParams;

        fn create(_services: &Services) -> anyhow::Result<Self> {
            Ok(Self)
        }

        fn execute(self, params: ProbeParams) -> anyhow::Result<()> {
            anyhow::bail!("exploded on {}", params.message)
        }
    }

    fn isolated_task(action_type: IsolatedActionType, message: &str) -> (TaskRef, IsolatedParameters) {
        let params = IsolatedParameters::new(
            action_type,
            &ProbeParams {
                message: message.to_string(),
            },
        )
        .unwrap();
        let task_type = TaskType::builder("Worker").isolatable().build();
        let task = TaskNode::new(":worker", task_type)
            .with_isolated_parameters(params.clone())
            .into_ref();
        (task, params)
    }

    #[test]
    fn test_body_sees_snapshot_and_lock_is_free() {
        let hooks = Arc::new(ProbeHooks::new());
        let services = Services::new();
        services.register(hooks.clone());
        let instantiator = Instantiator::new(services);
        let (task, live) = isolated_task(IsolatedActionType::of::<Probe>(), "original");
        let lock = ProjectLock::new();
        let factory = IsolatedTaskActionFactory::new("Worker");

        let (lock_was_free, result) = std::thread::scope(|scope| {
            let worker = scope.spawn(|| {
                let mut guard = lock.lock();
                let mut context = ActionContext::new(&mut guard, None, &instantiator);
                factory.create().execute(&task, &mut context)
            });

            hooks.started.wait();
            let lock_was_free = lock.try_lock().is_some();
            live.set("message", "mutated").unwrap();
            hooks.resume.wait();

            (lock_was_free, worker.join().unwrap())
        });

        result.unwrap();
        assert!(lock_was_free);
        assert_eq!(hooks.observed.lock().as_deref(), Some("original"));
        assert_eq!(live.current()["message"], "mutated");
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_lock_is_reacquired_after_body() {
        let (task, _) = isolated_task(IsolatedActionType::of::<Exploding>(), "boom");
        let lock = ProjectLock::new();
        let instantiator = Instantiator::default();
        let mut guard = lock.lock();
        let mut context = ActionContext::new(&mut guard, None, &instantiator);

        let _ = IsolatedTaskActionFactory::new("Worker")
            .create()
            .execute(&task, &mut context);

        assert!(lock.is_locked());
        assert!(lock.try_lock().is_none());
    }

    #[test]
    fn test_body_failure_propagates() {
        let (task, _) = isolated_task(IsolatedActionType::of::<Exploding>(), "boom");
        let lock = ProjectLock::new();
        let instantiator = Instantiator::default();
        let mut guard = lock.lock();
        let mut context = ActionContext::new(&mut guard, None, &instantiator);

        let err = IsolatedTaskActionFactory::new("Worker")
            .create()
            .execute(&task, &mut context)
            .unwrap_err();

        match err {
            ActionExecutionError::ActionFailed { task, source, .. } => {
                assert_eq!(task, ":worker");
                assert_eq!(source.to_string(), "exploded on boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_service_is_instantiation_failure() {
        let (task, _) = isolated_task(IsolatedActionType::of::<Probe>(), "x");
        let lock = ProjectLock::new();
        let instantiator = Instantiator::default();
        let mut guard = lock.lock();
        let mut context = ActionContext::new(&mut guard, None, &instantiator);

        let err = IsolatedTaskActionFactory::new("Worker")
            .create()
            .execute(&task, &mut context)
            .unwrap_err();

        assert!(matches!(err, ActionExecutionError::Instantiation { .. }));
    }

    #[test]
    fn test_mismatched_parameters_fail_isolation() {
        let (task, live) = isolated_task(IsolatedActionType::of::<Exploding>(), "x");
        live.set("message", 7).unwrap();
        let lock = ProjectLock::new();
        let instantiator = Instantiator::default();
        let mut guard = lock.lock();
        let mut context = ActionContext::new(&mut guard, None, &instantiator);

        let err = IsolatedTaskActionFactory::new("Worker")
            .create()
            .execute(&task, &mut context)
            .unwrap_err();

        assert!(matches!(err, ActionExecutionError::Isolation { .. }));
    }

    #[test]
    fn test_task_without_parameters_is_rejected() {
        let task = TaskNode::new(":bare", TaskType::builder("Worker").isolatable().build());
        let lock = ProjectLock::new();
        let instantiator = Instantiator::default();
        let mut guard = lock.lock();
        let mut context = ActionContext::new(&mut guard, None, &instantiator);

        let factory = IsolatedTaskActionFactory::new("Worker");
        assert_eq!(factory.kind(), ActionKind::Isolated);
        let err = factory.create().execute(&task, &mut context).unwrap_err();
        assert!(matches!(err, ActionExecutionError::NotIsolatable { .. }));
    }
}
