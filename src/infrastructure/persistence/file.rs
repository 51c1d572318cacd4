#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Credential;
use crate::domain::models::CredentialPersistence;

/// Keeps the token pair as a JSON document on disk.
pub struct FileCredentials {
    pub file_path: PathBuf,
}

impl Default for FileCredentials {
    fn default() -> FileCredentials {
        return FileCredentials::new(PathBuf::from(Config::get(ConfigKey::CredentialsFile)));
    }
}

impl FileCredentials {
    pub fn new(file_path: PathBuf) -> FileCredentials {
        return FileCredentials { file_path };
    }
}

impl CredentialPersistence for FileCredentials {
    fn load(&self) -> Result<Option<Credential>> {
        let contents = match fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        let credential: Credential = serde_json::from_str(&contents)?;
        return Ok(Some(credential));
    }

    fn store(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so readers never observe half a token pair.
        let tmp_path = self.file_path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(credential)?)?;
        fs::rename(&tmp_path, &self.file_path)?;

        return Ok(());
    }

    fn clear(&self) -> Result<()> {
        if !self.file_path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.file_path)?;
        return Ok(());
    }
}
