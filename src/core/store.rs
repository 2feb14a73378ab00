//! Repository-scoped state, kept inside the repository's own object store.
//!
//! The state is a JSON blob referenced by [`DATA_REF`].

use crate::core::hash::Hash;
use crate::core::object::Type;
use crate::core::repository::{GitError, Repository};
use crate::utils::cancel::CancelToken;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATA_REF: &str = "refs/spice/data";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("repository not initialized: run 'gs repo init'")]
    NotInitialized,
    #[error(transparent)]
    Git(#[from] GitError),
    #[error("corrupt repository state: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    pub trunk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

impl RepoState {
    pub async fn load(repo: &Repository, cancel: &CancelToken) -> Result<Self, StoreError> {
        let hash = repo
            .peel_ref(cancel, DATA_REF)
            .await?
            .ok_or(StoreError::NotInitialized)?;
        let data = repo.read_object_bytes(cancel, Type::Blob, &hash).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Write the state and point [`DATA_REF`] at it.
    pub async fn save(&self, repo: &Repository, cancel: &CancelToken) -> Result<Hash, StoreError> {
        let data = serde_json::to_vec_pretty(self)?;
        let hash = repo
            .write_object(cancel, Type::Blob, &mut data.as_slice())
            .await?;
        repo.set_ref(cancel, DATA_REF, &hash).await?;
        Ok(hash)
    }
}
