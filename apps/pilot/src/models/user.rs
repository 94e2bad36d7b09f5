use serde::{Deserialize, Serialize};
use tracing::info;

use crate::progress::store::{KeyValueStore, StoreError};

pub const USER_KEY: &str = "user";
pub const GUEST_NAME: &str = "Guest";

/// The single implicit local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: GUEST_NAME.to_string(),
        }
    }
}

/// Reads the stored profile. Absent or unreadable entries yield the guest profile
/// without writing anything back.
pub fn load_user(store: &dyn KeyValueStore) -> Result<UserProfile, StoreError> {
    let Some(raw) = store.get(USER_KEY)? else {
        return Ok(UserProfile::default());
    };
    Ok(serde_json::from_str::<UserProfile>(&raw)
        .ok()
        .filter(|p| !p.name.trim().is_empty())
        .unwrap_or_default())
}

pub fn save_user(store: &dyn KeyValueStore, profile: &UserProfile) -> Result<(), StoreError> {
    let raw = serde_json::to_string(profile).map_err(|source| StoreError::Serialization {
        key: USER_KEY.to_string(),
        source,
    })?;
    store.set(USER_KEY, &raw)?;
    info!("Signed in as {}", profile.name);
    Ok(())
}

pub fn sign_out(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.delete(USER_KEY)?;
    info!("Signed out");
    Ok(())
}
