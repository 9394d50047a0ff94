use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::media::StoredObject, errors::BlobError};

/// Path-addressed object storage holding scores and media.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Writes `body` at `pathname`, replacing any existing object.
    async fn put(&self, pathname: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, BlobError>;

    /// Writes `body` only when nothing exists at `pathname`; `None` means the name is taken.
    async fn put_if_absent(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<StoredObject>, BlobError>;

    async fn head(&self, pathname: &str) -> Result<Option<StoredObject>, BlobError>;

    /// Every object whose pathname starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError>;

    async fn fetch(&self, object: &StoredObject) -> Result<Vec<u8>, BlobError>;

    async fn check_connection(&self) -> Result<(), BlobError>;
}

pub type SharedBlobStore = Arc<dyn BlobStore>;

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    async fn put(&self, pathname: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, BlobError> {
        (**self).put(pathname, body, content_type).await
    }

    async fn put_if_absent(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<StoredObject>, BlobError> {
        (**self).put_if_absent(pathname, body, content_type).await
    }

    async fn head(&self, pathname: &str) -> Result<Option<StoredObject>, BlobError> {
        (**self).head(pathname).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError> {
        (**self).list(prefix).await
    }

    async fn fetch(&self, object: &StoredObject) -> Result<Vec<u8>, BlobError> {
        (**self).fetch(object).await
    }

    async fn check_connection(&self) -> Result<(), BlobError> {
        (**self).check_connection().await
    }
}
