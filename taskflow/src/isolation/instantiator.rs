//! Dependency-injected creation of isolated action logic.

use super::IsolatedSnapshot;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// User-supplied logic run by an isolatable task, off the project lock.
///
/// A fresh instance is created for every execution, so implementations do
/// not carry state between runs.
pub trait IsolatedAction: Sized + Send + 'static {
    /// The parameter type materialized from the task's isolated parameters.
    type Params: DeserializeOwned + Send + 'static;

    /// Creates the action, pulling collaborators from `services`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required service is missing.
    fn create(services: &Services) -> anyhow::Result<Self>;

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails.
    fn execute(self, params: Self::Params) -> anyhow::Result<()>;
}

/// Registry of services available to isolated actions, keyed by type.
#[derive(Default)]
pub struct Services {
    entries: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service, returning the registry.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(self, service: T) -> Self {
        self.register(Arc::new(service));
        self
    }

    /// Registers a shared service, replacing any previous one of the same type.
    pub fn register<T: Any + Send + Sync>(&self, service: Arc<T>) {
        self.entries.insert(TypeId::of::<T>(), service);
    }

    /// Looks up a service by type.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        Arc::clone(entry.value()).downcast::<T>().ok()
    }

    /// Looks up a service by type, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing service type.
    pub fn require<T: Any + Send + Sync>(&self) -> anyhow::Result<Arc<T>> {
        self.get::<T>()
            .ok_or_else(|| anyhow::anyhow!("No service of type {} is registered", type_name::<T>()))
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Creates isolated action instances with injected services.
#[derive(Debug, Clone, Default)]
pub struct Instantiator {
    services: Arc<Services>,
}

impl Instantiator {
    /// Creates an instantiator over the given services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self {
            services: Arc::new(services),
        }
    }

    /// Returns the available services.
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Creates a new instance of `A`.
    ///
    /// # Errors
    ///
    /// Returns the error raised by [`IsolatedAction::create`].
    pub fn new_instance<A: IsolatedAction>(&self) -> anyhow::Result<A> {
        A::create(&self.services)
    }
}

/// Why a prepared isolated action did not complete.
#[derive(Debug)]
pub(crate) enum InvocationError {
    Instantiation(anyhow::Error),
    Body(anyhow::Error),
}

/// An isolated action bound to its materialized parameters, ready to run.
pub(crate) struct PreparedAction {
    invoke: Box<dyn FnOnce(&Instantiator) -> Result<(), InvocationError> + Send>,
}

impl PreparedAction {
    pub(crate) fn invoke(self, instantiator: &Instantiator) -> Result<(), InvocationError> {
        (self.invoke)(instantiator)
    }
}

type PrepareFn = fn(&IsolatedSnapshot) -> Result<PreparedAction, serde_json::Error>;

/// Type-erased reference to an [`IsolatedAction`] implementation.
#[derive(Clone, Copy)]
pub struct IsolatedActionType {
    name: &'static str,
    prepare: PrepareFn,
}

impl IsolatedActionType {
    /// Refers to the action implementation `A`.
    #[must_use]
    pub fn of<A: IsolatedAction>() -> Self {
        Self {
            name: type_name::<A>(),
            prepare: prepare::<A>,
        }
    }

    /// Returns the implementation's type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Materializes typed parameters from `snapshot`.
    pub(crate) fn prepare(
        &self,
        snapshot: &IsolatedSnapshot,
    ) -> Result<PreparedAction, serde_json::Error> {
        (self.prepare)(snapshot)
    }
}

impl fmt::Debug for IsolatedActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IsolatedActionType").field(&self.name).finish()
    }
}

fn prepare<A: IsolatedAction>(
    snapshot: &IsolatedSnapshot,
) -> Result<PreparedAction, serde_json::Error> {
    let params: A::Params = snapshot.materialize()?;
    Ok(PreparedAction {
        invoke: Box::new(move |instantiator: &Instantiator| {
            let action = instantiator
                .new_instance::<A>()
                .map_err(InvocationError::Instantiation)?;
            action.execute(params).map_err(InvocationError::Body)
        }),
    })
}
