use std::{collections::HashMap, fmt, sync::Arc};

use tracing::{info, warn};

use crate::{
    driver::{Session, StoreDriver},
    util::{Result, Status},
};

/// Pooled session for one logical keyspace.
#[derive(Clone)]
pub struct KeyspaceHandle {
    name: String,
    session: Arc<dyn Session>,
}

impl KeyspaceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }
}

impl fmt::Debug for KeyspaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyspaceHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One connected session per keyspace, set up before any operation runs.
///
/// After `init` the map is never written again, so lookups need no lock.
#[derive(Debug, Default)]
pub struct KeyspaceRegistry {
    keyspaces: HashMap<String, KeyspaceHandle>,
}

impl KeyspaceRegistry {
    /// Connect once per distinct keyspace name.
    ///
    /// Repeated names are connected only the first time. A connect failure
    /// aborts initialisation with `StorageUnavailable`.
    pub fn init<I, S>(driver: &dyn StoreDriver, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keyspaces = HashMap::new();

        for name in names {
            let name = name.as_ref();
            if keyspaces.contains_key(name) {
                continue;
            }

            let session = driver.connect(name).map_err(|e| {
                warn!(target: "widecol::persistence", event = "connect_failed", keyspace = name, error = %e);
                Status::storage_unavailable(format!("cannot connect keyspace '{name}'")).caused_by(e)
            })?;
            info!(target: "widecol::persistence", event = "keyspace_connected", keyspace = name);

            keyspaces.insert(
                name.to_string(),
                KeyspaceHandle {
                    name: name.to_string(),
                    session,
                },
            );
        }

        Ok(KeyspaceRegistry { keyspaces })
    }

    /// Pure lookup. Never touches the driver.
    pub fn resolve(&self, name: &str) -> Result<&KeyspaceHandle> {
        self.keyspaces
            .get(name)
            .ok_or_else(|| Status::unknown_keyspace(format!("keyspace '{name}' is not registered")))
    }

    pub fn handles(&self) -> impl Iterator<Item = &KeyspaceHandle> {
        self.keyspaces.values()
    }

    pub fn count(&self) -> usize {
        self.keyspaces.len()
    }
}
