use std::ffi::OsString;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::models::KnowledgeEntry;
use crate::core::error::{RecommendError, Result};


/// Read side of the knowledge base as seen by the recommendation core.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {

    async fn entries(&self) -> Result<Vec<KnowledgeEntry>>;


    async fn entries_in_category(&self, main_category: &str) -> Result<Vec<KnowledgeEntry>>;
}


/// Write side used by ingestion only. Entries are keyed by their example question.
#[async_trait]
pub trait KnowledgeSink: EmbeddingStore {
    /// Attaches (or replaces) the embedding of every entry with this question.
    /// Returns how many entries were updated.
    async fn attach_embedding(&self, example_question: &str, embedding: String) -> Result<usize>;


    async fn insert(&self, entry: KnowledgeEntry) -> Result<()>;
}


/// Process-local knowledge base, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBase {
    entries: RwLock<Vec<KnowledgeEntry>>,
    save_lock: tokio::sync::Mutex<()>,
}

impl InMemoryKnowledgeBase {

    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self> {
        for entry in &entries {
            entry.validate()?;
        }
        Ok(Self {
            entries: RwLock::new(entries),
            save_lock: tokio::sync::Mutex::new(()),
        })
    }


    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RecommendError::Store(format!("reading {}: {e}", path.display())))?;
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(&raw)
            .map_err(|e| RecommendError::Store(format!("parsing {}: {e}", path.display())))?;

        info!("Loaded {} knowledge entries from {}", entries.len(), path.display());
        Self::new(entries)
    }


    /// Writes a sibling `.tmp` file and renames it over `path`, so readers never
    /// see a partial file. Concurrent saves are serialized.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _saving = self.save_lock.lock().await;

        let raw = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| RecommendError::Store(e.to_string()))?;

        let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, raw)
            .await
            .map_err(|e| RecommendError::Store(format!("writing {}: {e}", tmp_path.display())))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| RecommendError::Store(format!("replacing {}: {e}", path.display())))?;

        debug!("Saved knowledge base to {}", path.display());
        Ok(())
    }


    pub fn snapshot(&self) -> Vec<KnowledgeEntry> {
        self.entries.read().clone()
    }


    pub fn len(&self) -> usize {
        self.entries.read().len()
    }


    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl EmbeddingStore for InMemoryKnowledgeBase {
    async fn entries(&self) -> Result<Vec<KnowledgeEntry>> {
        Ok(self.snapshot())
    }

    /// Matches on trimmed names, the same form [`CategoryVocabulary`] offers the classifier.
    ///
    /// [`CategoryVocabulary`]: super::models::CategoryVocabulary
    async fn entries_in_category(&self, main_category: &str) -> Result<Vec<KnowledgeEntry>> {
        let main_category = main_category.trim();
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.main_category.trim() == main_category)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl KnowledgeSink for InMemoryKnowledgeBase {
    async fn attach_embedding(&self, example_question: &str, embedding: String) -> Result<usize> {
        let mut entries = self.entries.write();
        let mut updated = 0;
        for entry in entries.iter_mut().filter(|e| e.example_question == example_question) {
            entry.embedding = Some(embedding.clone());
            updated += 1;
        }
        Ok(updated)
    }

    async fn insert(&self, entry: KnowledgeEntry) -> Result<()> {
        entry.validate()?;
        self.entries.write().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryKnowledgeBase {
        InMemoryKnowledgeBase::new(vec![
            KnowledgeEntry::new("Карты", "Как перевыпустить карту?", "Через приложение."),
            KnowledgeEntry::new("Вклады", "Как открыть вклад?", "В отделении или онлайн."),
            KnowledgeEntry::new("Карты", "Где мой кэшбэк?", "Начисляется в конце месяца."),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_filter_by_category() {
        let store = sample();
        let cards = store.entries_in_category("Карты").await.unwrap();
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|e| e.main_category == "Карты"));
        assert!(store.entries_in_category("Ипотека").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_ignores_padding_around_category() {
        let store = InMemoryKnowledgeBase::new(vec![
            KnowledgeEntry::new("Карты ", "Как перевыпустить карту?", "Через приложение."),
            KnowledgeEntry::new("\tВклады", "Как открыть вклад?", "В отделении или онлайн."),
        ])
        .unwrap();
        assert_eq!(store.entries_in_category("Карты").await.unwrap().len(), 1);
        assert_eq!(store.entries_in_category("Вклады").await.unwrap().len(), 1);
        assert_eq!(store.entries_in_category(" Карты").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_attach_embedding_by_question() {
        let store = sample();
        let updated = store
            .attach_embedding("Как открыть вклад?", "[1.0,0.0]".to_string())
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let deposits = store.entries_in_category("Вклады").await.unwrap();
        assert_eq!(deposits[0].decode_embedding().unwrap(), Some(vec![1.0, 0.0]));
        assert_eq!(store.attach_embedding("нет такого", "[1.0]".to_string()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_validates() {
        let store = sample();
        assert!(store.insert(KnowledgeEntry::new("", "q", "a")).await.is_err());
        store.insert(KnowledgeEntry::new("Кредиты", "q", "a")).await.unwrap();
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");

        sample().save_json(&path).await.unwrap();
        let reloaded = InMemoryKnowledgeBase::load_json(&path).await.unwrap();
        assert_eq!(reloaded.snapshot(), sample().snapshot());
    }

    #[tokio::test]
    async fn test_concurrent_saves_leave_a_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");
        let store = sample();
        sample().save_json(&path).await.unwrap();

        store.insert(KnowledgeEntry::new("Кредиты", "Как погасить кредит?", "В приложении.")).await.unwrap();
        let (first, second) = tokio::join!(store.save_json(&path), store.save_json(&path));
        first.unwrap();
        second.unwrap();

        let reloaded = InMemoryKnowledgeBase::load_json(&path).await.unwrap();
        assert_eq!(reloaded.snapshot(), store.snapshot());
        assert!(!dir.path().join("faq.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_store_error() {
        let err = InMemoryKnowledgeBase::load_json("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, RecommendError::Store(_)));
    }
}
