use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{Error, Res, types::Token};

/// Flat file holding the last OAuth token as JSON.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached token.
    ///
    /// Fails with [`Error::TokenNotFound`] if the file does not exist and with
    /// [`Error::Deserialize`] if it does not hold a token.
    pub async fn read(&self) -> Res<Token> {
        read(&self.path).await
    }

    /// Writes `token`, replacing whatever the file held before.
    pub async fn write(&self, token: &Token) -> Res<()> {
        write(&self.path, token).await
    }
}

pub async fn read(path: &Path) -> Res<Token> {
    let content = match async_fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::TokenNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    serde_json::from_slice(&content).map_err(Error::Deserialize)
}

/// Writes `token` to `path`. On unix the file is only readable by its owner.
pub async fn write(path: &Path, token: &Token) -> Res<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        async_fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec(token).map_err(Error::Serialize)?;
    #[cfg(unix)]
    restrict_permissions(path).await?;
    async_fs::write(path, json).await?;
    Ok(())
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Res<()> {
    use async_fs::unix::OpenOptionsExt;
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    async_fs::OpenOptions::new()
        .write(true)
        .create(true)
        .mode(0o600)
        .open(path)
        .await?;
    // a file left by an older run keeps its mode on open
    async_fs::set_permissions(path, Permissions::from_mode(0o600)).await?;
    Ok(())
}
