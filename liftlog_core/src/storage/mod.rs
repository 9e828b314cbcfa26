//! Pluggable key/value persistence.
//!
//! Every component persists through the [`Store`] capability trait; concrete
//! providers are chosen at construction time and never by runtime type
//! inspection. Keys are opaque strings to the store, but consumers follow
//! the `entityType/ownerId/entityId` namespace convention via
//! [`entity_key`] so multiple profiles never collide in one store.
//!
//! Operations may suspend but must resolve or fail per invocation; there is
//! no built-in timeout, retry or cancellation. A provider without a
//! capability fails deterministically with `NotImplemented` instead of
//! silently doing nothing.

mod file;
mod memory;
mod remote;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;

use crate::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Asynchronous key/value storage contract.
///
/// Mutations to a single key are linearized by the provider (last write
/// wins); callers never observe a torn write.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the value at `key`, or `None` when absent
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write `value` at `key`, replacing any previous value
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete the value at `key`; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every key in the store
    async fn clear(&self) -> Result<()>;

    /// All keys currently present, in no guaranteed order
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Build a namespaced storage key: `entityType/ownerId/entityId`
pub fn entity_key(entity: &str, owner: &str, id: &str) -> String {
    format!("{entity}/{owner}/{id}")
}

/// Key prefix covering every entity of one type owned by one profile
pub fn owner_prefix(entity: &str, owner: &str) -> String {
    format!("{entity}/{owner}/")
}

/// Fetch and deserialize a typed value
pub async fn load_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and store a typed value
pub async fn save_json<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<()> {
    store.set(key, serde_json::to_value(value)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_namespacing() {
        assert_eq!(
            entity_key("routine", "ana", "push_pull"),
            "routine/ana/push_pull"
        );
        assert_eq!(owner_prefix("sessionlog", "ana"), "sessionlog/ana/");

        // Two owners never share a prefix
        let a = owner_prefix("routine", "ana");
        let b = owner_prefix("routine", "ben");
        assert!(!entity_key("routine", "ana", "x").starts_with(&b));
        assert!(entity_key("routine", "ana", "x").starts_with(&a));
    }

    #[tokio::test]
    async fn test_typed_round_trip_helpers() {
        let store = MemoryStore::new();

        let routine = crate::types::Routine::new("r1", "Test", chrono::Utc::now());
        save_json(&store, "routine/ana/r1", &routine).await.unwrap();

        let loaded: crate::types::Routine = load_json(&store, "routine/ana/r1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, "r1");
        assert_eq!(loaded.name, "Test");

        let absent: Option<crate::types::Routine> =
            load_json(&store, "routine/ana/missing").await.unwrap();
        assert!(absent.is_none());
    }
}
