use std::fs;
use std::path::{Path, PathBuf};

use bincode::{deserialize, serialize};
use log::info;

use crate::error::{PressLightError, Result};
use crate::network::NetworkParameters;

/// Directory layout for saved parameters: `<root>/model/<episode>_<rank>.bin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointStore {
    root: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        CheckpointStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_dir(&self) -> PathBuf {
        self.root.join("model")
    }

    pub fn path(&self, episode: usize, rank: usize) -> PathBuf {
        self.model_dir().join(format!("{}_{}.bin", episode, rank))
    }

    pub fn exists(&self, episode: usize, rank: usize) -> bool {
        self.path(episode, rank).is_file()
    }

    /// Serialize the parameter dictionary, creating `model/` if needed.
    pub fn save(
        &self,
        parameters: &NetworkParameters,
        episode: usize,
        rank: usize,
    ) -> Result<PathBuf> {
        fs::create_dir_all(self.model_dir())?;
        let path = self.path(episode, rank);
        let serialized = serialize(parameters)?;
        fs::write(&path, serialized)?;
        info!("saved checkpoint {}", path.display());
        Ok(path)
    }

    pub fn load(&self, episode: usize, rank: usize) -> Result<NetworkParameters> {
        let path = self.path(episode, rank);
        if !path.is_file() {
            return Err(PressLightError::CheckpointNotFound { path });
        }
        let data = fs::read(&path)?;
        let parameters: NetworkParameters = deserialize(&data)?;
        info!("loaded checkpoint {}", path.display());
        Ok(parameters)
    }
}
