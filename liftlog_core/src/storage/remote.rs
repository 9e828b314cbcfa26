//! Remote-sync storage provider.
//!
//! The sync backend is not implemented yet. The provider still exists so the
//! rest of the system can be wired against the contract today: every
//! operation fails with `NotImplemented`, which callers use to detect the
//! missing capability and fall back to a local provider or surface a
//! "feature unavailable" state. It must never silently no-op.

use super::Store;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Placeholder for the future remote sync provider
#[derive(Clone, Debug)]
pub struct RemoteStore {
    endpoint: String,
}

impl RemoteStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// The configured sync endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(Error::NotImplemented("RemoteStore::get"))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<()> {
        Err(Error::NotImplemented("RemoteStore::set"))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(Error::NotImplemented("RemoteStore::remove"))
    }

    async fn clear(&self) -> Result<()> {
        Err(Error::NotImplemented("RemoteStore::clear"))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Err(Error::NotImplemented("RemoteStore::keys"))
    }
}
