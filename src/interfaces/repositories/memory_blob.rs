use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry as MapEntry, DashMap};

use crate::{entities::media::StoredObject, errors::BlobError, repositories::blob_store::BlobStore};

struct Entry {
    object: StoredObject,
    body: Vec<u8>,
}

/// Process-local store used in development and tests.
///
/// Objects are served back through `/blob/{pathname}`, so `public_base_url` should point
/// at that route of this server.
pub struct MemoryBlobRepo {
    public_base_url: String,
    objects: DashMap<String, Entry>,
}

impl MemoryBlobRepo {
    pub fn new(public_base_url: &str) -> Self {
        MemoryBlobRepo {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            objects: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn describe(&self, pathname: &str, body: &[u8], content_type: &str) -> StoredObject {
        StoredObject {
            pathname: pathname.to_string(),
            url: format!("{}/{}", self.public_base_url, pathname),
            content_type: Some(content_type.to_string()),
            size: body.len() as u64,
            uploaded_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, pathname: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, BlobError> {
        let object = self.describe(pathname, &body, content_type);
        self.objects.insert(pathname.to_string(), Entry { object: object.clone(), body });
        Ok(object)
    }

    async fn put_if_absent(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<StoredObject>, BlobError> {
        match self.objects.entry(pathname.to_string()) {
            MapEntry::Occupied(_) => Ok(None),
            MapEntry::Vacant(slot) => {
                let object = self.describe(pathname, &body, content_type);
                slot.insert(Entry { object: object.clone(), body });
                Ok(Some(object))
            }
        }
    }

    async fn head(&self, pathname: &str) -> Result<Option<StoredObject>, BlobError> {
        Ok(self.objects.get(pathname).map(|e| e.object.clone()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError> {
        let mut objects: Vec<StoredObject> = self
            .objects
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.object.clone())
            .collect();
        objects.sort_by(|a, b| a.pathname.cmp(&b.pathname));
        Ok(objects)
    }

    async fn fetch(&self, object: &StoredObject) -> Result<Vec<u8>, BlobError> {
        self.objects
            .get(&object.pathname)
            .map(|e| e.body.clone())
            .ok_or_else(|| BlobError::NotFound(format!("No object at {}", object.pathname)))
    }

    async fn check_connection(&self) -> Result<(), BlobError> {
        Ok(())
    }
}
