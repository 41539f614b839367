//! Registry of object constructors keyed by ROOT class name.
//!
//! Decoding a new-class tag only yields a class name; the registry turns it
//! into a fresh, zero-valued instance that then decodes itself. Modules that
//! define streamable types register them at startup, usually into
//! [`Factory::global`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::ObjectRef;

/// Constructor for a fresh instance of one class.
pub type FactoryFn = Arc<dyn Fn() -> ObjectRef + Send + Sync>;

/// String-keyed registry of object constructors.
///
/// Safe for concurrent use: many buffers may look classes up while another
/// thread registers new ones.
#[derive(Default)]
pub struct Factory {
    db: RwLock<HashMap<String, FactoryFn>>,
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("keys", &self.keys()).finish()
    }
}

static GLOBAL: OnceLock<Factory> = OnceLock::new();

impl Factory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by buffers unless told otherwise.
    pub fn global() -> &'static Factory {
        GLOBAL.get_or_init(Factory::new)
    }

    /// Registers (or replaces) the constructor for `name`.
    pub fn add<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn() -> ObjectRef + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(class = %name, "rtypes: registering factory");
        self.db.write().insert(name, Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<FactoryFn> {
        self.db.read().get(name).cloned()
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.db.read().contains_key(name)
    }

    /// Registered class names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.db.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.db.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.read().is_empty()
    }
}
