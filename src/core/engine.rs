use crate::config::EngineConfig;
use crate::core::scorer::Scorer;
use crate::core::types::{AuthorId, AuthorStats, ClassificationResult, Message, WordVector};
use crate::core::vectorizer::Vectorizer;
use crate::error::BayesResult;
use crate::learning::{ModelUpdater, DEFAULT_BATCH_SIZE};
use crate::store::{FileStore, VocabularyStore};
use crate::tokenizer::{MecabTokenizer, Tokenizer};

// The engine is the context object for one request or batch: it owns the store
// handle and the tokenizer, and releases both when dropped.
pub struct BayesEngine<S = FileStore, T = MecabTokenizer> {
    store: S,
    vectorizer: Vectorizer<T>,
    updater: ModelUpdater,
    batch_size: usize,
}

impl BayesEngine<FileStore, MecabTokenizer> {
    /// Opens the file store and MeCab adapter described by `config`.
    pub fn open(config: &EngineConfig) -> BayesResult<Self> {
        config.validate()?;
        let store = FileStore::open(&config.store_path)?;
        Ok(Self::new(store, config.tokenizer()).with_batch_size(config.learning.batch_size))
    }
}

impl<S: VocabularyStore, T: Tokenizer> BayesEngine<S, T> {
    pub fn new(store: S, tokenizer: T) -> Self {
        Self {
            store,
            vectorizer: Vectorizer::new(tokenizer),
            updater: ModelUpdater::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Messages learned per author by [`learn_pending`](Self::learn_pending) and
    /// [`learn_all`](Self::learn_all). Clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scorer(&self) -> Scorer<'_, S, T> {
        Scorer::new(&self.store, &self.vectorizer)
    }

    pub fn vectorize(&self, text: &str) -> WordVector {
        self.vectorizer.vectorize(text)
    }

    pub fn register_author(&self, author_id: &str) -> BayesResult<bool> {
        let created = self.store.register_author(author_id)?;
        if created {
            tracing::info!("Registered author {}", author_id);
        }
        Ok(created)
    }

    /// Stores a message for later learning. `false` when the id is already known.
    pub fn add_message(&self, message: Message) -> BayesResult<bool> {
        let id = message.id;
        let added = self.store.add_message(message)?;
        if !added {
            tracing::debug!("Message {} already stored, skipped", id);
        }
        Ok(added)
    }

    /// Stores a batch of messages with one store write. Returns how many were new.
    pub fn add_messages(&self, messages: Vec<Message>) -> BayesResult<usize> {
        let count = messages.len();
        let added = self.store.add_messages(messages)?;
        if added < count {
            tracing::debug!("{} of {} message(s) already stored, skipped", count - added, count);
        }
        Ok(added)
    }

    pub fn learn(&self, author_id: &str, max_messages: usize) -> BayesResult<usize> {
        Ok(self
            .updater
            .learn(&self.store, &self.vectorizer, author_id, max_messages)?)
    }

    /// [`learn`](Self::learn) with the configured batch size.
    pub fn learn_pending(&self, author_id: &str) -> BayesResult<usize> {
        self.learn(author_id, self.batch_size)
    }

    /// [`learn_all_with`](Self::learn_all_with) the configured batch size.
    pub fn learn_all(&self) -> BayesResult<Vec<(AuthorId, usize)>> {
        self.learn_all_with(self.batch_size)
    }

    /// Learns up to `max_messages` pending messages of every known author.
    pub fn learn_all_with(&self, max_messages: usize) -> BayesResult<Vec<(AuthorId, usize)>> {
        Ok(self
            .updater
            .learn_all(&self.store, &self.vectorizer, max_messages)?)
    }

    pub fn rank<A: AsRef<str>>(&self, text: &str, author_ids: &[A]) -> BayesResult<Vec<ClassificationResult>> {
        Ok(self.scorer().rank(text, author_ids)?)
    }

    pub fn rank_all(&self, text: &str) -> BayesResult<Vec<ClassificationResult>> {
        Ok(self.scorer().rank_all(text)?)
    }

    pub fn authors(&self) -> BayesResult<Vec<AuthorStats>> {
        Ok(self.store.list_authors()?)
    }
}
