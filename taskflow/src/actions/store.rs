//! Memoized per-type action metadata.

use super::{
    ActionMethod, IncrementalTaskActionFactory, ParameterType, StandardTaskActionFactory,
    TaskActionFactory, TaskType, TaskTypeId,
};
use crate::errors::ActionMetadataError;
use crate::isolation::IsolatedTaskActionFactory;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Validated, immutable action metadata of one task type.
#[derive(Debug)]
pub struct TaskClassInfo {
    type_name: String,
    cacheable: bool,
    incremental: bool,
    factories: Vec<Arc<dyn TaskActionFactory>>,
}

impl TaskClassInfo {
    /// Returns the name of the described task type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns true if the task type is marked as cacheable.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Returns true if exactly one action accepts incremental inputs.
    #[must_use]
    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    /// Returns the action factories in execution order.
    #[must_use]
    pub fn factories(&self) -> &[Arc<dyn TaskActionFactory>] {
        &self.factories
    }

    /// Builds the metadata of `task_type`, validating every declared action.
    ///
    /// Types are walked most-derived first; within a type, actions keep their
    /// declaration order. An action name already registered by a more-derived
    /// type is treated as overridden and skipped. Overrides are matched by
    /// name only.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionMetadataError`] for the first structurally invalid
    /// declaration found.
    pub fn build(task_type: &TaskType) -> Result<Self, ActionMetadataError> {
        let mut factories: Vec<Arc<dyn TaskActionFactory>> = Vec::new();
        let mut processed: HashMap<&str, TaskTypeId> = HashMap::new();
        let mut incremental = false;

        for declaring in task_type.hierarchy() {
            for method in declaring.declared_methods() {
                let factory = validate(declaring, method)?;
                // The owner is replaced on every declaration so that a type
                // overloading a name it also overrides is still rejected.
                match processed.insert(method.name(), declaring.id()) {
                    Some(owner) if owner == declaring.id() => {
                        return Err(ActionMetadataError::DuplicateActionOverload {
                            type_name: declaring.name().to_string(),
                            method: method.name().to_string(),
                        });
                    }
                    Some(_) => continue,
                    None => {}
                }
                if factory.is_incremental() {
                    if incremental {
                        return Err(ActionMetadataError::MultipleIncrementalActions {
                            type_name: task_type.name().to_string(),
                        });
                    }
                    incremental = true;
                }
                factories.push(factory);
            }
        }

        if task_type.is_isolatable() {
            factories.push(Arc::new(IsolatedTaskActionFactory::new(task_type.name())));
        }

        Ok(Self {
            type_name: task_type.name().to_string(),
            cacheable: task_type.is_cacheable(),
            incremental,
            factories,
        })
    }
}

fn validate(
    declaring: &TaskType,
    method: &ActionMethod,
) -> Result<Arc<dyn TaskActionFactory>, ActionMetadataError> {
    let type_name = declaring.name().to_string();
    let method_name = method.name().to_string();

    if method.is_static() {
        return Err(ActionMetadataError::StaticActionMethod {
            type_name,
            method: method_name,
        });
    }

    match method.parameters() {
        [] => Ok(Arc::new(StandardTaskActionFactory::new(type_name, method.clone()))),
        [ParameterType::IncrementalInputs] => Ok(Arc::new(IncrementalTaskActionFactory::new(
            type_name,
            method.clone(),
        ))),
        [other] => Err(ActionMetadataError::InvalidActionParameter {
            type_name,
            method: method_name,
            parameter: other.to_string(),
        }),
        _ => Err(ActionMetadataError::TooManyActionParameters {
            type_name,
            method: method_name,
        }),
    }
}

type ClassInfoCell = Arc<OnceLock<Result<Arc<TaskClassInfo>, ActionMetadataError>>>;

/// Thread-safe cache of [`TaskClassInfo`] keyed by task type.
///
/// Each type's metadata is built at most once. Concurrent first lookups of
/// the same type block until the first caller finishes and then observe the
/// same result. Construction failures are cached as well, so repeated lookups
/// of an invalid type report the same error.
#[derive(Default)]
pub struct TaskClassInfoStore {
    cache: DashMap<TaskTypeId, ClassInfoCell>,
    constructions: AtomicUsize,
}

impl TaskClassInfoStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the action metadata of `task_type`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns the (memoized) [`ActionMetadataError`] if the type's action
    /// declarations are invalid.
    pub fn task_class_info(
        &self,
        task_type: &TaskType,
    ) -> Result<Arc<TaskClassInfo>, ActionMetadataError> {
        // Clone the cell out so the shard lock is not held during construction.
        let cell = self.cache.entry(task_type.id()).or_default().clone();
        cell.get_or_init(|| {
            self.constructions.fetch_add(1, Ordering::SeqCst);
            match TaskClassInfo::build(task_type) {
                Ok(info) => {
                    debug!(
                        task_type = task_type.name(),
                        actions = info.factories.len(),
                        incremental = info.incremental,
                        cacheable = info.cacheable,
                        "Built task class info"
                    );
                    Ok(Arc::new(info))
                }
                Err(err) => {
                    warn!(
                        task_type = task_type.name(),
                        code = err.code(),
                        error = %err,
                        "Invalid task action declarations"
                    );
                    Err(err)
                }
            }
        })
        .clone()
    }

    /// Removes the cached metadata of one type. Returns true if it was cached.
    pub fn evict(&self, id: TaskTypeId) -> bool {
        self.cache.remove(&id).is_some()
    }

    /// Removes all cached metadata.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Returns the number of cached types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns how many times metadata construction has run.
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for TaskClassInfoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskClassInfoStore")
            .field("cached_types", &self.cache.len())
            .field("constructions", &self.constructions())
            .finish()
    }
}
