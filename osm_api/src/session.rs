//! Durable session state. The editing credentials and the open changeset id
//! survive restarts, so a user can keep committing into one changeset across
//! runs without reopening it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::changeset::{Credentials, EditSession};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionStore {
    pub api_url: String,
    pub credentials: Credentials,
    pub changeset_id: Option<i64>,
    pub comment: String,
}

impl SessionStore {
    pub fn load(path: &str) -> Result<SessionStore> {
        let raw = fs_err::read_to_string(path)?;
        serde_json::from_str(&raw).with_context(|| format!("parsing session file {}", path))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs_err::write(path, raw)?;
        Ok(())
    }

    pub fn into_session(self) -> EditSession {
        match self.changeset_id {
            Some(id) => EditSession::resume(&self.api_url, self.credentials, id, &self.comment),
            None => EditSession::new(&self.api_url, self.credentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_json() {
        let store = SessionStore {
            api_url: "https://api.example.com/api/0.6".to_string(),
            credentials: Credentials {
                username: "tester".to_string(),
                password: "hunter2".to_string(),
            },
            changeset_id: Some(42),
            comment: "add entrances".to_string(),
        };
        let raw = serde_json::to_string(&store).unwrap();
        let back: SessionStore = serde_json::from_str(&raw).unwrap();
        assert_eq!(Some(42), back.changeset_id);
        assert_eq!("tester", back.credentials.username);

        let session = back.into_session();
        assert_eq!(42, session.changeset().unwrap().id);
    }
}
