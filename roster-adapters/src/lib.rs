//! Concrete collaborators for the roster sync engine.

pub mod directory;
pub mod error;
pub mod photos;
pub mod store;

use std::path::Path;

use roster_core::{DirectorySource, SyncConfig};
use roster_sync::{AgentDirectory, Engine};

pub use directory::{DirectoryRow, FileDirectory, HttpDirectory};
pub use error::AdapterError;
pub use photos::HttpPhotoUploader;
pub use store::{entry_id_for, JsonRosterStore};

/// The collaborators a config describes, owned in one place so an [`Engine`]
/// can borrow them.
pub struct Collaborators {
    pub directory: Box<dyn AgentDirectory>,
    pub store: JsonRosterStore,
    pub photos: HttpPhotoUploader,
}

impl Collaborators {
    /// Build the collaborators for `config`, resolving default paths under
    /// `home`. Relative file directory paths are taken as-is.
    pub fn from_config(config: &SyncConfig, home: &Path) -> Self {
        let directory: Box<dyn AgentDirectory> = match &config.directory {
            DirectorySource::File { path } => Box::new(FileDirectory::new(path.clone())),
            DirectorySource::Http { url, api_key } => {
                Box::new(HttpDirectory::new(url.clone(), api_key.clone()))
            }
        };
        Self {
            directory,
            store: JsonRosterStore::new(config.roster_path_at(home)),
            photos: HttpPhotoUploader::new(config.assets_dir_at(home)),
        }
    }

    pub fn engine(&self) -> Engine<'_> {
        Engine::new(
            self.directory.as_ref(),
            &self.store,
            &self.store,
            &self.photos,
        )
    }
}
