// In: src/schema/registry.rs

//! The pcid -> schema lookup shared by every operation that reads bytes.
//!
//! Lookups take a read lock and clone an `Arc`; registration takes the write
//! lock and swaps in a new `Arc`. A snapshot handed out earlier is never
//! mutated, so a caller decoding with it keeps a consistent layout.

use hashbrown::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::Schema;
use crate::error::{PatchError, Result};

/// Concurrent registry of schemas keyed by pcid.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<u32, Arc<Schema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` under its pcid, replacing any previous entry.
    /// Returns the snapshot now held by the registry.
    pub fn register(&self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        // Entries are whole `Arc`s, so a writer that panicked cannot leave a
        // half-built schema behind and the lock can be recovered.
        let mut guard = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(schema.pcid(), Arc::clone(&schema));
        schema
    }

    /// Returns the current snapshot for `pcid`.
    pub fn resolve(&self, pcid: u32) -> Result<Arc<Schema>> {
        let guard = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&pcid)
            .cloned()
            .ok_or(PatchError::UnknownSchema(pcid))
    }

    /// Drops the entry for `pcid`. Returns whether one existed.
    pub fn invalidate(&self, pcid: u32) -> bool {
        let mut guard = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(&pcid).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered pcids in ascending order.
    pub fn pcids(&self) -> Vec<u32> {
        let guard = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut pcids: Vec<u32> = guard.keys().copied().collect();
        pcids.sort_unstable();
        pcids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Dimension;
    use crate::types::{Endian, Interpretation};
    use std::thread;

    fn schema(pcid: u32, scale: f64) -> Schema {
        Schema::new(
            pcid,
            0,
            Endian::Little,
            vec![Dimension::new("X", 0, Interpretation::Int32).with_scale(scale)],
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        registry.register(schema(3, 1.0));
        registry.register(schema(1, 1.0));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.pcids(), vec![1, 3]);
        assert_eq!(registry.resolve(3).unwrap().pcid(), 3);
        assert!(matches!(
            registry.resolve(9),
            Err(PatchError::UnknownSchema(9))
        ));
    }

    #[test]
    fn test_reregistration_keeps_old_snapshots() {
        let registry = SchemaRegistry::new();
        let old = registry.register(schema(1, 0.01));
        registry.register(schema(1, 0.001));

        assert_eq!(old.dimension(0).unwrap().scale, 0.01);
        assert_eq!(registry.resolve(1).unwrap().dimension(0).unwrap().scale, 0.001);
    }

    #[test]
    fn test_invalidate() {
        let registry = SchemaRegistry::new();
        registry.register(schema(5, 1.0));
        assert!(registry.invalidate(5));
        assert!(!registry.invalidate(5));
        assert!(registry.resolve(5).is_err());
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(SchemaRegistry::new());
        registry.register(schema(1, 1.0));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.register(schema(100 + i, 1.0));
                    (0..100).all(|_| registry.resolve(1).is_ok())
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(registry.len(), 5);
    }
}
