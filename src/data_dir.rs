use std::path::{Path, PathBuf};

use crate::{
    config::APP_CONFIG_FILE,
    error::{Error, Result},
};

/// Root directory for persistent state: the configuration file and
/// the index database live here.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Locate the state directory. An explicit `--data-dir` value
    /// wins, then the `DOCSYNC_DATA_DIR` environment variable, and
    /// finally the XDG data home (`~/.local/share/docsync/`). The
    /// directory is created on first use.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(dir) = std::env::var("DOCSYNC_DATA_DIR") {
            PathBuf::from(dir)
        } else {
            xdg::BaseDirectories::with_prefix("docsync")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(APP_CONFIG_FILE)
    }

    pub fn index_db(&self) -> PathBuf {
        self.root.join("index.redb")
    }
}
