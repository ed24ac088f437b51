//! Persistence seam for registrants.
//!
//! Backends enforce uniqueness themselves: a conflicting insert fails with
//! [`StoreError::Conflict`] even if an earlier lookup found nothing.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::NewRegistrant;
use crate::models::registrant::Registrant;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Which fields must be unique across registrants. Email is always unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniquenessScope {
    #[default]
    Email,
    EmailAndPhone,
}

impl UniquenessScope {
    pub fn from_unique_phone(unique_phone: bool) -> Self {
        if unique_phone {
            Self::EmailAndPhone
        } else {
            Self::Email
        }
    }

    pub fn includes_phone(self) -> bool {
        matches!(self, Self::EmailAndPhone)
    }
}

/// Fields that collided with an existing registrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictFields {
    pub email: bool,
    pub phone: bool,
}

impl ConflictFields {
    pub const EMAIL: Self = Self { email: true, phone: false };
    pub const PHONE: Self = Self { email: false, phone: true };

    pub fn any(self) -> bool {
        self.email || self.phone
    }

    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(2);
        if self.email {
            names.push("email");
        }
        if self.phone {
            names.push("phone");
        }
        names
    }
}

impl fmt::Display for ConflictFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("registrant already exists: {0}")]
    Conflict(ConflictFields),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RegistrantStore: Send + Sync {
    /// Look up by normalized (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Registrant>, StoreError>;

    /// Persist a validated registrant, assigning its id and creation time.
    async fn insert(
        &self,
        registrant: &NewRegistrant,
        scope: UniquenessScope,
    ) -> Result<Registrant, StoreError>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
