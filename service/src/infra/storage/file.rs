//! JSON file [`Storage`] implementation.

use std::{collections::BTreeMap, io, path::PathBuf, sync::Arc};

use common::operations::{By, Delete, Insert, Select};
use tokio::{fs, sync::Mutex};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::infra::Storage;
use crate::infra::storage::{self, Key};

/// [`Storage`] keeping all slots in a single JSON object file.
///
/// A missing file is an empty [`Storage`]. Writing into a file with malformed
/// contents discards them.
#[derive(Clone, Debug)]
pub struct File {
    /// Path to the file.
    path: PathBuf,

    /// Lock serializing read-modify-write cycles of this process.
    lock: Arc<Mutex<()>>,
}

impl File {
    /// Creates a new [`File`] storage at the provided `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::default(),
        }
    }

    /// Reads all the slots stored in the file.
    async fn load(&self) -> Result<BTreeMap<String, String>, Traced<storage::Error>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(tracerr::from_and_wrap!(=> storage::Error)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(tracerr::new!(storage::Error::from(e))),
        }
    }

    /// Reads all the slots stored in the file for modifying them, discarding
    /// malformed contents.
    ///
    /// The returned flag indicates whether the contents were discarded, so
    /// the file must be rewritten.
    async fn load_for_write(
        &self,
    ) -> Result<(BTreeMap<String, String>, bool), Traced<storage::Error>> {
        match self.load().await {
            Ok(slots) => Ok((slots, false)),
            Err(e) if matches!(e.as_ref(), storage::Error::Json(_)) => {
                log::warn!(
                    "discarding malformed contents of `{}`: {e}",
                    self.path.display(),
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e).map_err(tracerr::wrap!()),
        }
    }

    /// Writes the provided `slots` into the file, replacing its contents.
    ///
    /// The contents are written into a sibling temporary file first and then
    /// renamed over the file, so it is never left half-written.
    async fn save(
        &self,
        slots: &BTreeMap<String, String>,
    ) -> Result<(), Traced<storage::Error>> {
        let contents = serde_json::to_string_pretty(slots)
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl storage::Storage<Select<By<Option<String>, Key>>> for File {
    type Ok = Option<String>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<String>, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let _guard = self.lock.lock().await;
        let mut slots = self.load().await.map_err(tracerr::wrap!())?;
        Ok(slots.remove(by.inner().as_ref()))
    }
}

impl storage::Storage<Insert<(Key, String)>> for File {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert((key, value)): Insert<(Key, String)>,
    ) -> Result<Self::Ok, Self::Err> {
        let _guard = self.lock.lock().await;
        let (mut slots, _) =
            self.load_for_write().await.map_err(tracerr::wrap!())?;
        drop(slots.insert(key.to_string(), value));
        self.save(&slots).await.map_err(tracerr::wrap!())
    }
}

impl storage::Storage<Delete<Key>> for File {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(key): Delete<Key>,
    ) -> Result<Self::Ok, Self::Err> {
        let _guard = self.lock.lock().await;
        let (mut slots, discarded) =
            self.load_for_write().await.map_err(tracerr::wrap!())?;
        if slots.remove(key.as_ref()).is_none() && !discarded {
            return Ok(());
        }
        self.save(&slots).await.map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Select};

    use crate::infra::storage::{Error, Key, Storage as _};

    use super::File;

    async fn get(storage: &File, key: &str) -> Option<String> {
        storage
            .execute(Select(By::<Option<String>, _>::new(Key::from(key))))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = File::new(dir.path().join("nested/session.json"));

        assert_eq!(get(&storage, "user").await, None);
        storage.execute(Delete(Key::from("user"))).await.unwrap();
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        File::new(&path)
            .execute(Insert((Key::from("user"), "{}".to_owned())))
            .await
            .unwrap();
        File::new(&path)
            .execute(Insert((Key::from("theme"), "dark".to_owned())))
            .await
            .unwrap();

        let reopened = File::new(&path);
        assert_eq!(get(&reopened, "user").await.as_deref(), Some("{}"));
        assert_eq!(get(&reopened, "theme").await.as_deref(), Some("dark"));

        reopened.execute(Delete(Key::from("user"))).await.unwrap();
        assert_eq!(get(&File::new(&path), "user").await, None);
        assert_eq!(
            get(&File::new(&path), "theme").await.as_deref(),
            Some("dark"),
        );
    }

    #[tokio::test]
    async fn reports_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = File::new(&path)
            .execute(Select(By::<Option<String>, _>::new(Key::from("user"))))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), Error::Json(_)));
    }

    #[tokio::test]
    async fn discards_corrupted_file_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{truncated").unwrap();

        File::new(&path).execute(Delete(Key::from("user"))).await.unwrap();
        assert_eq!(get(&File::new(&path), "user").await, None);

        std::fs::write(&path, "{truncated").unwrap();
        File::new(&path)
            .execute(Insert((Key::from("user"), "{}".to_owned())))
            .await
            .unwrap();
        assert_eq!(get(&File::new(&path), "user").await.as_deref(), Some("{}"));
        assert!(!dir.path().join("session.json.tmp").exists());
    }
}
