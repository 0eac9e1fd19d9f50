//! Task parameters that can be isolated from the live task.

use super::IsolatedActionType;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The live parameter value graph of an isolatable task.
///
/// Parameters are plain values, so isolating them is a structural copy.
/// Clones share the same live graph.
#[derive(Clone)]
pub struct IsolatedParameters {
    values: Arc<RwLock<Value>>,
    action_type: IsolatedActionType,
}

impl IsolatedParameters {
    /// Creates parameters from a serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` cannot be represented as a value graph.
    pub fn new<P: Serialize>(
        action_type: IsolatedActionType,
        params: &P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::from_value(action_type, serde_json::to_value(params)?))
    }

    /// Creates parameters from an existing value graph.
    #[must_use]
    pub fn from_value(action_type: IsolatedActionType, values: Value) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
            action_type,
        }
    }

    /// Returns the action logic these parameters are handed to.
    #[must_use]
    pub fn action_type(&self) -> &IsolatedActionType {
        &self.action_type
    }

    /// Sets a top-level parameter.
    ///
    /// A non-object graph is replaced by an object holding only `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn set<V: Serialize>(&self, key: impl Into<String>, value: V) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        let mut values = self.values.write();
        if let Value::Object(map) = &mut *values {
            map.insert(key.into(), value);
        } else {
            let mut map = serde_json::Map::new();
            map.insert(key.into(), value);
            *values = Value::Object(map);
        }
        Ok(())
    }

    /// Mutates the live value graph in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Value),
    {
        f(&mut *self.values.write());
    }

    /// Returns a copy of the current value graph.
    #[must_use]
    pub fn current(&self) -> Value {
        self.values.read().clone()
    }

    /// Takes an immutable snapshot sharing nothing with the live graph.
    #[must_use]
    pub fn isolate(&self) -> IsolatedSnapshot {
        IsolatedSnapshot {
            values: self.current(),
        }
    }
}

impl fmt::Debug for IsolatedParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsolatedParameters")
            .field("action_type", &self.action_type)
            .field("values", &*self.values.read())
            .finish()
    }
}

/// An immutable copy of a task's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolatedSnapshot {
    values: Value,
}

impl IsolatedSnapshot {
    /// Returns the copied value graph.
    #[must_use]
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Materializes a fresh typed parameter instance from the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the value graph does not match `P`.
    pub fn materialize<P: DeserializeOwned>(&self) -> Result<P, serde_json::Error> {
        P::deserialize(&self.values)
    }
}
