use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// A whole-map JSON document on disk, keyed by identity.
///
/// Loading never fails: a missing file is created empty, a blank file reads
/// as empty, and unreadable or malformed content is logged and treated as
/// empty so a corrupt file can never block startup.
#[derive(Debug, Clone)]
pub struct JsonStore<M> {
    path: PathBuf,
    _map: PhantomData<fn() -> M>,
}

impl<M> JsonStore<M>
where
    M: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _map: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, falling back to an empty map.
    pub fn load(&self) -> M {
        if !self.path.exists() {
            match create_empty(&self.path) {
                Ok(()) => tracing::warn!("{} did not exist, created empty store", self.path.display()),
                Err(err) => tracing::error!("could not create {}: {err}", self.path.display()),
            }
            return M::default();
        }
        match self.try_load() {
            Ok(map) => map,
            Err(err) => {
                tracing::error!("failed to load {}, using empty store: {err}", self.path.display());
                M::default()
            }
        }
    }

    fn try_load(&self) -> Result<M, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(M::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the whole document. Failures are logged and returned; callers
    /// keep their in-memory state either way.
    pub fn save(&self, map: &M) -> Result<(), StoreError> {
        let result = self.try_save(map);
        if let Err(err) = &result {
            tracing::error!("failed to write {}: {err}", self.path.display());
        }
        result
    }

    fn try_save(&self, map: &M) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, map)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

fn create_empty(path: &Path) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    File::create(path)?;
    Ok(())
}
