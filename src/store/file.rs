// src/store/file.rs
use super::{StoreError, StoreResult, StoreState, VocabularyStore};
use crate::core::types::{AuthorModel, AuthorStats, Message, MessageId, WordVector};
use crate::persistence::{load_snapshot, save_snapshot};
use fd_lock::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

/// Modification time and length of the snapshot a cached state was read from.
type Stamp = (SystemTime, u64);

#[derive(Debug, Default)]
struct Cached {
    state: StoreState,
    stamp: Option<Stamp>,
}

/// Store kept in a single snapshot file, shareable between processes.
///
/// Every write holds an exclusive lock on `<path>.lock`, reloads the snapshot,
/// applies the change and persists it before releasing the lock, so handles in
/// other processes never overwrite each other. Reads use a shared lock and
/// reload only when the snapshot changed since it was last seen.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    cached: Mutex<Cached>,
}

impl FileStore {
    /// Opens the snapshot at `path`, or starts empty if the file does not exist yet.
    /// A corrupt or incompatible snapshot is an error, never silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        let store = Self {
            path,
            lock_path: lock_path.into(),
            cached: Mutex::new(Cached::default()),
        };
        {
            let cached = store.read()?;
            match cached.stamp {
                Some(_) => tracing::debug!("Loaded store snapshot from {}", store.path.display()),
                None => tracing::debug!(
                    "No store snapshot at {}, starting empty",
                    store.path.display()
                ),
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Cached>> {
        self.cached.lock().map_err(|_| StoreError::Poisoned)
    }

    fn lock_file(&self) -> StoreResult<RwLock<File>> {
        if let Some(parent) = self.lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        Ok(RwLock::new(file))
    }

    fn stamp(&self) -> StoreResult<Option<Stamp>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some((meta.modified()?, meta.len()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> StoreResult<StoreState> {
        match load_snapshot(&self.path) {
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(StoreState::default()),
            other => other,
        }
    }

    /// The cached state, reloaded first if the snapshot changed on disk.
    fn read(&self) -> StoreResult<MutexGuard<'_, Cached>> {
        let mut cached = self.lock()?;
        if cached.stamp.is_none() && !self.path.exists() {
            return Ok(cached);
        }
        let lock_file = self.lock_file()?;
        let _shared = lock_file.read()?;
        let stamp = self.stamp()?;
        if stamp != cached.stamp {
            cached.state = self.load()?;
            cached.stamp = stamp;
        }
        Ok(cached)
    }

    /// Applies `apply` to the current snapshot under the exclusive lock and
    /// persists it when `changed` says so. On error nothing is written.
    fn commit<R>(
        &self,
        apply: impl FnOnce(&mut StoreState) -> StoreResult<R>,
        changed: impl FnOnce(&R) -> bool,
    ) -> StoreResult<R> {
        let mut cached = self.lock()?;
        let mut lock_file = self.lock_file()?;
        let _exclusive = lock_file.write()?;

        let mut state = self.load()?;
        let result = apply(&mut state)?;
        if changed(&result) {
            save_snapshot(&state, &self.path)?;
        }
        cached.stamp = self.stamp()?;
        cached.state = state;
        Ok(result)
    }
}

impl VocabularyStore for FileStore {
    fn register_author(&self, author_id: &str) -> StoreResult<bool> {
        self.commit(|state| Ok(state.register_author(author_id)), |added| *added)
    }

    fn add_message(&self, message: Message) -> StoreResult<bool> {
        self.commit(|state| Ok(state.add_message(message)), |added| *added)
    }

    fn add_messages(&self, messages: Vec<Message>) -> StoreResult<usize> {
        self.commit(
            |state| {
                Ok(messages
                    .into_iter()
                    .map(|message| state.add_message(message))
                    .filter(|added| *added)
                    .count())
            },
            |added| *added > 0,
        )
    }

    fn get_pending_messages(&self, author_id: &str, limit: usize) -> StoreResult<Vec<Message>> {
        Ok(self.read()?.state.pending(author_id, limit))
    }

    fn mark_incorporated(&self, message_ids: &[MessageId]) -> StoreResult<()> {
        self.commit(|state| state.mark_incorporated(message_ids), |_| true)
    }

    fn merge_vocabulary(&self, author_id: &str, vector: &WordVector) -> StoreResult<()> {
        self.commit(|state| state.merge_vocabulary(author_id, vector), |_| true)
    }

    fn incorporate(
        &self,
        author_id: &str,
        vector: &WordVector,
        message_ids: &[MessageId],
    ) -> StoreResult<()> {
        self.commit(
            |state| state.incorporate(author_id, vector, message_ids),
            |_| true,
        )
    }

    fn get_model(&self, author_id: &str) -> StoreResult<Option<AuthorModel>> {
        Ok(self.read()?.state.model(author_id))
    }

    fn get_global_message_total(&self) -> StoreResult<u64> {
        Ok(self.read()?.state.global_total())
    }

    fn list_authors(&self) -> StoreResult<Vec<AuthorStats>> {
        Ok(self.read()?.state.list_stats())
    }

    fn author_stats(&self, author_id: &str) -> StoreResult<Option<AuthorStats>> {
        Ok(self.read()?.state.stats(author_id))
    }
}
