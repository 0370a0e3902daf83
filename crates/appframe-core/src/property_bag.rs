//! UUID-keyed property table with change notification
//!
//! Values are stored as `serde_json::Value` in a table behind a mutex.
//! Observers are always called with the lock released, so
//! [`PropertyBag::set_value`] re-checks the stored value before writing and
//! gives way to any write that landed while observers ran.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Raised before a value changes; set `cancel` to keep the old value.
#[derive(Debug, Clone)]
pub struct PropertyChangingEventArgs {
    pub id: Uuid,
    pub old_value: Option<Value>,
    pub new_value: Value,
    pub cancel: bool,
}

/// Raised after a value changed.
#[derive(Debug, Clone)]
pub struct PropertyChangedEventArgs {
    pub id: Uuid,
    pub old_value: Option<Value>,
    pub new_value: Value,
}

/// Raised when a value is read that has never been set.
///
/// An observer that supplies a value sets `handled`; with `cache` the value
/// is stored in the bag.
#[derive(Debug, Clone)]
pub struct PropertyRequestedEventArgs {
    pub id: Uuid,
    pub value: Value,
    pub handled: bool,
    pub cache: bool,
}

/// Observer hooks for a [`PropertyBag`]. Every hook defaults to a no-op.
pub trait PropertyBagObserver: Send + Sync + fmt::Debug {
    fn on_changing(&self, _e: &mut PropertyChangingEventArgs) {}

    fn on_changed(&self, _e: &PropertyChangedEventArgs) {}

    fn on_requested(&self, _e: &mut PropertyRequestedEventArgs) {}
}

#[derive(Debug, Default)]
pub struct PropertyBag {
    values: Mutex<HashMap<Uuid, Value>>,
    names: HashMap<Uuid, String>,
    observers: Vec<Arc<dyn PropertyBagObserver>>,
    initialized: bool,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_observer(&mut self, observer: Arc<dyn PropertyBagObserver>) {
        self.observers.push(observer);
    }

    pub fn name(&self, id: Uuid) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn set_name(&mut self, id: Uuid, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    /// Store a value. Returns `Ok(true)` if the stored value changed and
    /// `Ok(false)` if it was equal to the old one or an observer cancelled.
    ///
    /// If another write to `id` lands while the "changing" observers run,
    /// that write is kept, "changed" observers are not called and the
    /// result is `Ok(false)`.
    pub fn set_value<T: Serialize>(&self, id: Uuid, value: T) -> Result<bool> {
        let new_value = serde_json::to_value(value)?;

        let old_value = self.lock().get(&id).cloned();
        let changed = old_value.as_ref() != Some(&new_value);
        if !changed {
            return Ok(false);
        }

        let mut changing = PropertyChangingEventArgs {
            id,
            old_value: old_value.clone(),
            new_value: new_value.clone(),
            cancel: false,
        };
        for observer in &self.observers {
            observer.on_changing(&mut changing);
        }
        if changing.cancel {
            tracing::debug!("Property {} change cancelled", id);
            return Ok(false);
        }

        {
            let mut values = self.lock();
            if values.get(&id) != old_value.as_ref() {
                tracing::debug!("Property {} changed while notifying, keeping newer value", id);
                return Ok(false);
            }
            values.insert(id, new_value.clone());
        }

        let changed_args = PropertyChangedEventArgs {
            id,
            old_value,
            new_value,
        };
        for observer in &self.observers {
            observer.on_changed(&changed_args);
        }
        Ok(true)
    }

    /// Read a value, falling back to observers and then to `default`.
    ///
    /// A stored value that does not deserialize as `T` yields `default`
    /// without consulting observers.
    pub fn get_value<T: Serialize + DeserializeOwned>(&self, id: Uuid, default: T) -> T {
        if let Some(stored) = self.lock().get(&id).cloned() {
            return serde_json::from_value(stored).unwrap_or(default);
        }

        let default_value = match serde_json::to_value(&default) {
            Ok(v) => v,
            Err(_) => return default,
        };
        let mut requested = PropertyRequestedEventArgs {
            id,
            value: default_value,
            handled: false,
            cache: false,
        };
        for observer in &self.observers {
            observer.on_requested(&mut requested);
            if requested.handled {
                break;
            }
        }
        if !requested.handled {
            return default;
        }

        if requested.cache {
            self.lock().insert(id, requested.value.clone());
        }
        serde_json::from_value(requested.value).unwrap_or(default)
    }

    /// Raw stored value.
    pub fn get_raw(&self, id: Uuid) -> Option<Value> {
        self.lock().get(&id).cloned()
    }

    /// Snapshot of every stored value.
    pub fn all(&self) -> Vec<(Uuid, Value)> {
        self.lock()
            .iter()
            .map(|(id, v)| (*id, v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mark the bag initialized. Returns `false` if it already was.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        true
    }
}
