// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-wide registry of EXPRESS built-in types
//!
//! Entries are created the first time a schema references a built-in and
//! are shared by every schema parsed in the process afterwards. The
//! registry is append-only and guarded by an `RwLock`, so schemas may be
//! loaded from several threads. Per-schema data (such as which selects
//! list a built-in) lives on the schema, never here.

use crate::PrimitiveKind;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock, RwLock};

/// A registered built-in type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub kind: PrimitiveKind,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

type Entries = RwLock<FxHashMap<PrimitiveKind, Arc<PrimitiveType>>>;

fn entries() -> &'static Entries {
    static ENTRIES: OnceLock<Entries> = OnceLock::new();
    ENTRIES.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Handle to the shared built-in type catalogue
pub struct PrimitiveRegistry;

impl PrimitiveRegistry {
    /// Look up a built-in, creating its entry on first use
    pub fn register(kind: PrimitiveKind) -> Arc<PrimitiveType> {
        if let Some(existing) = Self::get(kind) {
            return existing;
        }

        let created = Arc::new(PrimitiveType { kind });
        match entries().write() {
            Ok(mut map) => Arc::clone(map.entry(kind).or_insert_with(|| {
                log::trace!("registered built-in type {kind}");
                created
            })),
            // A poisoned lock only loses caching, entries are plain data
            Err(_) => {
                log::warn!("built-in type registry lock poisoned, {kind} not cached");
                created
            }
        }
    }

    /// Registered entry for a built-in, if any schema has used it
    pub fn get(kind: PrimitiveKind) -> Option<Arc<PrimitiveType>> {
        let map = entries().read().ok()?;
        map.get(&kind).cloned()
    }

    /// Registered entry by name (case-insensitive)
    pub fn lookup(name: &str) -> Option<Arc<PrimitiveType>> {
        Self::get(name.parse().ok()?)
    }

    /// Kinds registered so far, in EXPRESS order
    pub fn registered() -> Vec<PrimitiveKind> {
        PrimitiveKind::ALL
            .into_iter()
            .filter(|kind| Self::get(*kind).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_returns_singleton() {
        let a = PrimitiveRegistry::register(PrimitiveKind::Binary);
        let b = PrimitiveRegistry::register(PrimitiveKind::Binary);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "BINARY");
    }

    #[test]
    fn test_lookup_by_name() {
        PrimitiveRegistry::register(PrimitiveKind::Logical);
        let found = PrimitiveRegistry::lookup("logical");
        assert_eq!(found.map(|p| p.kind), Some(PrimitiveKind::Logical));
        assert!(PrimitiveRegistry::lookup("IfcLabel").is_none());
        assert!(PrimitiveRegistry::registered().contains(&PrimitiveKind::Logical));
    }

    #[test]
    fn test_register_from_threads() {
        use std::thread;

        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| PrimitiveRegistry::register(PrimitiveKind::Number)))
            .collect();
        let entries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(entries.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
