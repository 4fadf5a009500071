use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::donation::draft::ImageFile;

struct PreviewBlob {
    owner: String,
    media_type: String,
    bytes: Bytes,
}

/// Temporary image blobs served back to the user who selected them.
///
/// Blobs are only reachable through a [`PreviewHandle`]; dropping the handle
/// releases the blob. A std mutex is used so release can happen in `Drop`.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    blobs: Arc<Mutex<HashMap<String, PreviewBlob>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` for `owner` and return the handle that keeps it alive.
    pub fn acquire(&self, owner: &str, image: &ImageFile) -> PreviewHandle {
        let id = uuid::Uuid::now_v7().to_string();
        self.lock().insert(
            id.clone(),
            PreviewBlob {
                owner: owner.to_string(),
                media_type: image.media_type.clone(),
                bytes: image.bytes.clone(),
            },
        );
        tracing::debug!("Preview {} acquired ({} bytes)", id, image.bytes.len());
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Media type and bytes of a live preview, if `owner` holds it.
    pub fn get(&self, id: &str, owner: &str) -> Option<(String, Bytes)> {
        self.lock()
            .get(id)
            .filter(|blob| blob.owner == owner)
            .map(|blob| (blob.media_type.clone(), blob.bytes.clone()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, id: &str) {
        if self.lock().remove(id).is_some() {
            tracing::debug!("Preview {} released", id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PreviewBlob>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped ownership of one preview blob.
pub struct PreviewHandle {
    id: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> String {
        format!("/donate-food/preview/{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(&self.id);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle").field("id", &self.id).finish()
    }
}
