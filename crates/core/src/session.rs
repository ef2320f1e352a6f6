//! Session identity: who the storefront is acting for.

use serde::{Deserialize, Serialize};

use crate::ids::CustomerId;

/// Denormalized profile captured from the customer service at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: CustomerId,
    pub username: String,
}

/// An authenticated session: the bearer token plus the profile it was
/// issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub profile: UserProfile,
}

impl Session {
    /// The customer every cart and order call is issued for.
    pub fn owner(&self) -> CustomerId {
        self.profile.id
    }
}
