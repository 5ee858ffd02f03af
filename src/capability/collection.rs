// SPDX-License-Identifier: MIT

//! In-memory document collection for version records

use super::{CollectionExport, DocumentStore, VersionMetadata};
use crate::error::CapabilityError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    document: String,
    metadata: VersionMetadata,
}

/// Append-only collection; clones share the same documents
#[derive(Clone, Default)]
pub struct InMemoryCollection {
    name: String,
    documents: Arc<RwLock<Vec<StoredDocument>>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryCollection {
    async fn put(
        &self,
        id: &str,
        document: &str,
        metadata: VersionMetadata,
    ) -> Result<(), CapabilityError> {
        let mut documents = self.documents.write().await;
        if documents.iter().any(|d| d.id == id) {
            return Err(CapabilityError::DuplicateId(id.to_string()));
        }

        documents.push(StoredDocument {
            id: id.to_string(),
            document: document.to_string(),
            metadata,
        });
        log::debug!("Added {} to collection {}", id, self.name);
        Ok(())
    }

    async fn contains(&self, id: &str) -> Result<bool, CapabilityError> {
        Ok(self.documents.read().await.iter().any(|d| d.id == id))
    }

    async fn export_all(&self) -> Result<CollectionExport, CapabilityError> {
        let documents = self.documents.read().await;
        let mut export = CollectionExport::default();
        for doc in documents.iter() {
            export.ids.push(doc.id.clone());
            export.documents.push(doc.document.clone());
            export.metadatas.push(doc.metadata.clone());
        }
        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metadata(id: &str, score: f64) -> VersionMetadata {
        VersionMetadata {
            version_id: id.to_string(),
            reward_score: score,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_and_export_in_order() {
        let collection = InMemoryCollection::new("book_versions");
        collection.put("v_1", "first", metadata("v_1", 0.1)).await.unwrap();
        collection.put("v_2", "second", metadata("v_2", 0.2)).await.unwrap();

        let export = collection.export_all().await.unwrap();
        assert_eq!(export.ids, vec!["v_1", "v_2"]);
        assert_eq!(export.documents, vec!["first", "second"]);
        assert_eq!(export.metadatas[1].reward_score, 0.2);
        assert_eq!(collection.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let collection = InMemoryCollection::new("book_versions");
        collection.put("v_1", "first", metadata("v_1", 0.1)).await.unwrap();

        let err = collection
            .put("v_1", "overwrite", metadata("v_1", 0.9))
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::DuplicateId(id) if id == "v_1"));

        let export = collection.export_all().await.unwrap();
        assert_eq!(export.documents, vec!["first"]);
    }

    #[tokio::test]
    async fn test_empty_export() {
        let collection = InMemoryCollection::new("book_versions");
        assert!(collection.is_empty().await);
        assert!(collection.export_all().await.unwrap().is_empty());
        assert!(!collection.contains("v_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_clone_shares_documents() {
        let collection = InMemoryCollection::new("book_versions");
        let cloned = collection.clone();
        cloned.put("v_1", "doc", metadata("v_1", 0.5)).await.unwrap();
        assert!(collection.contains("v_1").await.unwrap());
    }
}
