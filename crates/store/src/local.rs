//! Durable client-side storage.
//!
//! Snapshots are plain JSON documents, one file per well-known key, under a
//! single root directory. Reads fail soft: a missing or unparseable
//! snapshot degrades to "absent" with a log line, never an error, so a
//! corrupt file can only ever cost state, not break the app. Writes do
//! report failures; callers decide whether a failed persist matters.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use shopfront_core::{Cart, CustomerId, Session, UserProfile};

/// Well-known snapshot keys. Each maps to `{root}/{key}.json`.
const CART_KEY: &str = "cart";
const AUTH_TOKEN_KEY: &str = "auth_token";
const USER_PROFILE_KEY: &str = "user_profile";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store root or a snapshot file could not be written.
    #[error("failed to access local store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A snapshot could not be encoded for persistence.
    #[error("failed to encode snapshot '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed store for the storefront's persisted client state: the cart
/// snapshot plus the session identity (token and profile).
///
/// Writes are full-snapshot, last-writer-wins; there is no merging and no
/// history.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Resolve the default store root: `{os data dir}/shopfront`, falling
    /// back to `~/.local/share/shopfront` when the platform dir is
    /// unavailable.
    pub fn default_root() -> Option<PathBuf> {
        dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut home| {
                    home.push(".local");
                    home.push("share");
                    home
                })
            })
            .map(|mut base| {
                base.push("shopfront");
                base
            })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Read and decode the snapshot for `key`.
    ///
    /// Absent files are silently `None`; unreadable or malformed ones are
    /// logged and treated as absent.
    fn read_key<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let path = self.key_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read local snapshot; treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "malformed local snapshot; treating as absent");
                None
            }
        }
    }

    /// Encode and overwrite the snapshot for `key`.
    fn write_key<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let payload =
            serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode { key, source })?;
        let path = self.key_path(key);
        fs::write(&path, payload).map_err(|source| StoreError::Io { path, source })?;
        Ok(())
    }

    /// Delete the snapshot for `key`; deleting an absent snapshot is fine.
    fn remove_key(&self, key: &'static str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Load the persisted cart for `owner`.
    ///
    /// Absent, malformed, or differently-owned snapshots all degrade to an
    /// empty cart; loads never fail.
    pub fn load_cart(&self, owner: CustomerId) -> Cart {
        match self.read_key::<Cart>(CART_KEY) {
            Some(cart) if cart.owner() == owner => cart,
            Some(cart) => {
                tracing::warn!(
                    stored = %cart.owner(),
                    requested = %owner,
                    "cart snapshot belongs to a different owner; starting empty"
                );
                Cart::empty(owner)
            }
            None => Cart::empty(owner),
        }
    }

    /// Persist the full cart snapshot.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        self.write_key(CART_KEY, cart)
    }

    /// Persist an empty cart for `owner`.
    pub fn clear_cart(&self, owner: CustomerId) -> Result<(), StoreError> {
        self.write_key(CART_KEY, &Cart::empty(owner))
    }

    /// Load the stored session, if both halves (token and profile) are
    /// present. A partial snapshot is logged and treated as signed out.
    pub fn load_session(&self) -> Option<Session> {
        let token = self.read_key::<String>(AUTH_TOKEN_KEY);
        let profile = self.read_key::<UserProfile>(USER_PROFILE_KEY);
        match (token, profile) {
            (Some(token), Some(profile)) => Some(Session { token, profile }),
            (None, None) => None,
            (token, profile) => {
                tracing::warn!(
                    has_token = token.is_some(),
                    has_profile = profile.is_some(),
                    "partial session snapshot; treating as signed out"
                );
                None
            }
        }
    }

    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        self.write_key(AUTH_TOKEN_KEY, &session.token)?;
        self.write_key(USER_PROFILE_KEY, &session.profile)
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        self.remove_key(AUTH_TOKEN_KEY)?;
        self.remove_key(USER_PROFILE_KEY)
    }
}
