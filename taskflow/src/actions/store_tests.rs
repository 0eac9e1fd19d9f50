//! Tests for task class info construction and caching.

#[cfg(test)]
mod tests {
    use crate::actions::{
        ActionKind, ActionMethod, ParameterType, TaskClassInfo, TaskClassInfoStore, TaskType,
    };
    use crate::errors::ActionMetadataError;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Barrier};

    fn noop(name: &str) -> ActionMethod {
        ActionMethod::new(name, |_| Ok(()))
    }

    fn incremental(name: &str) -> ActionMethod {
        ActionMethod::incremental(name, |_, _| Ok(()))
    }

    fn action_names(info: &TaskClassInfo) -> Vec<String> {
        info.factories()
            .iter()
            .map(|f| f.create().display_name())
            .collect()
    }

    #[test]
    fn test_actions_ordered_most_derived_first() {
        let base = TaskType::builder("Base")
            .action(noop("prepare"))
            .action(noop("cleanup"))
            .build();
        let leaf = TaskType::builder("Leaf")
            .extends(&base)
            .action(noop("compile"))
            .action(noop("link"))
            .build();

        let info = TaskClassInfo::build(&leaf).unwrap();

        assert_eq!(
            action_names(&info),
            vec![
                "Leaf.compile()",
                "Leaf.link()",
                "Base.prepare()",
                "Base.cleanup()",
            ]
        );
        assert!(!info.is_incremental());
        assert!(!info.is_cacheable());
    }

    #[test]
    fn test_subclass_override_yields_one_factory() {
        // Overrides are matched by name only; parameter lists are not compared.
        let base = TaskType::builder("Base").action(incremental("run")).build();
        let leaf = TaskType::builder("Leaf").extends(&base).action(noop("run")).build();

        let info = TaskClassInfo::build(&leaf).unwrap();

        assert_eq!(action_names(&info), vec!["Leaf.run()"]);
        assert!(!info.is_incremental());
    }

    #[test]
    fn test_override_across_grandparent() {
        let root = TaskType::builder("Root").action(noop("run")).build();
        let middle = TaskType::builder("Middle").extends(&root).build();
        let leaf = TaskType::builder("Leaf").extends(&middle).action(noop("run")).build();

        let info = TaskClassInfo::build(&leaf).unwrap();
        assert_eq!(action_names(&info), vec!["Leaf.run()"]);
    }

    #[test]
    fn test_single_incremental_action() {
        let task_type = TaskType::builder("Sync")
            .cacheable()
            .action(noop("validate"))
            .action(incremental("sync"))
            .build();

        let info = TaskClassInfo::build(&task_type).unwrap();

        assert!(info.is_incremental());
        assert!(info.is_cacheable());
        let kinds: Vec<_> = info.factories().iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec![ActionKind::Standard, ActionKind::Incremental]);
    }

    #[test]
    fn test_multiple_incremental_actions_rejected() {
        let base = TaskType::builder("Base").action(incremental("first")).build();
        let leaf = TaskType::builder("Leaf")
            .extends(&base)
            .action(incremental("second"))
            .build();

        let err = TaskClassInfo::build(&leaf).unwrap_err();
        assert_eq!(
            err,
            ActionMetadataError::MultipleIncrementalActions {
                type_name: "Leaf".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_overload_rejected() {
        let task_type = TaskType::builder("Copy")
            .action(noop("copy"))
            .action(incremental("copy"))
            .build();

        let err = TaskClassInfo::build(&task_type).unwrap_err();
        assert_eq!(
            err,
            ActionMetadataError::DuplicateActionOverload {
                type_name: "Copy".to_string(),
                method: "copy".to_string(),
            }
        );
    }

    #[test]
    fn test_overloads_in_overridden_ancestor_rejected() {
        let base = TaskType::builder("Base")
            .action(noop("run"))
            .action(incremental("run"))
            .build();
        let leaf = TaskType::builder("Leaf").extends(&base).action(noop("run")).build();

        let expected = ActionMetadataError::DuplicateActionOverload {
            type_name: "Base".to_string(),
            method: "run".to_string(),
        };
        assert_eq!(TaskClassInfo::build(&base).unwrap_err(), expected);
        assert_eq!(TaskClassInfo::build(&leaf).unwrap_err(), expected);
    }

    #[test]
    fn test_multiple_incremental_reported_before_later_ancestor_errors() {
        let base = TaskType::builder("Base")
            .action(noop("archive").static_method())
            .build();
        let leaf = TaskType::builder("Leaf")
            .extends(&base)
            .action(incremental("first"))
            .action(incremental("second"))
            .build();

        let err = TaskClassInfo::build(&leaf).unwrap_err();
        assert_eq!(
            err,
            ActionMetadataError::MultipleIncrementalActions {
                type_name: "Leaf".to_string()
            }
        );
    }

    #[test]
    fn test_static_action_rejected() {
        let task_type = TaskType::builder("Zip")
            .action(noop("archive").static_method())
            .build();

        let err = TaskClassInfo::build(&task_type).unwrap_err();
        assert_eq!(err.code(), "ACTION-001-STATIC");
        assert_eq!(err.to_string(), "Cannot declare static method Zip.archive() as a task action.");
    }

    #[test]
    fn test_too_many_parameters_rejected() {
        let task_type = TaskType::builder("Exec")
            .action(noop("exec").with_parameters([
                ParameterType::IncrementalInputs,
                ParameterType::Named("String".to_string()),
            ]))
            .build();

        let err = TaskClassInfo::build(&task_type).unwrap_err();
        assert!(matches!(err, ActionMetadataError::TooManyActionParameters { .. }));
    }

    #[test]
    fn test_invalid_parameter_rejected() {
        let task_type = TaskType::builder("Exec")
            .action(noop("exec").with_parameters([ParameterType::Named("Path".to_string())]))
            .build();

        let err = TaskClassInfo::build(&task_type).unwrap_err();
        assert_eq!(
            err,
            ActionMetadataError::InvalidActionParameter {
                type_name: "Exec".to_string(),
                method: "exec".to_string(),
                parameter: "Path".to_string(),
            }
        );
    }

    #[test]
    fn test_overridden_ancestor_is_still_validated() {
        let base = TaskType::builder("Base").action(noop("run").static_method()).build();
        let leaf = TaskType::builder("Leaf").extends(&base).action(noop("run")).build();

        let err = TaskClassInfo::build(&leaf).unwrap_err();
        assert_eq!(err.type_name(), "Base");
    }

    #[test]
    fn test_isolatable_type_gets_trailing_bridge() {
        let base = TaskType::builder("Worker").isolatable().action(noop("before")).build();
        let leaf = TaskType::builder("Custom").extends(&base).action(noop("run")).build();

        let info = TaskClassInfo::build(&leaf).unwrap();

        let kinds: Vec<_> = info.factories().iter().map(|f| f.kind()).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Standard, ActionKind::Standard, ActionKind::Isolated]
        );
    }

    #[test]
    fn test_store_caches_by_type() {
        let store = TaskClassInfoStore::new();
        let task_type = TaskType::builder("Compile").action(noop("compile")).build();

        let first = store.task_class_info(&task_type).unwrap();
        let second = store.task_class_info(&task_type).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.constructions(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_memoizes_failures() {
        let store = TaskClassInfoStore::new();
        let task_type = TaskType::builder("Broken")
            .action(incremental("a"))
            .action(incremental("b"))
            .build();

        let first = store.task_class_info(&task_type).unwrap_err();
        let second = store.task_class_info(&task_type).unwrap_err();

        assert_eq!(first, second);
        assert_eq!(store.constructions(), 1);
    }

    #[test]
    fn test_store_evict_and_clear() {
        let store = TaskClassInfoStore::new();
        let a = TaskType::builder("A").build();
        let b = TaskType::builder("B").build();
        store.task_class_info(&a).unwrap();
        store.task_class_info(&b).unwrap();

        assert!(store.evict(a.id()));
        assert!(!store.evict(a.id()));
        store.task_class_info(&a).unwrap();
        assert_eq!(store.constructions(), 3);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_first_lookups_construct_once() {
        const THREADS: usize = 16;
        let store = TaskClassInfoStore::new();
        let task_type = TaskType::builder("Shared")
            .action(noop("one"))
            .action(incremental("two"))
            .build();
        let barrier = Barrier::new(THREADS);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        store.task_class_info(&task_type).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(store.constructions(), 1);
        assert!(results.iter().all(|info| Arc::ptr_eq(info, &results[0])));
        assert!(results[0].is_incremental());
    }

    #[test]
    fn test_concurrent_lookups_of_distinct_types() {
        let store = TaskClassInfoStore::new();
        let types: Vec<_> = (0..8)
            .map(|i| TaskType::builder(format!("Type{i}")).action(noop("run")).build())
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for task_type in &types {
                        store.task_class_info(task_type).unwrap();
                    }
                });
            }
        });

        assert_eq!(store.len(), 8);
        assert_eq!(store.constructions(), 8);
    }
}
