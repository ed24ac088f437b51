use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{ConflictFields, RegistrantStore, StoreError, UniquenessScope};
use crate::domain::NewRegistrant;
use crate::models::registrant::Registrant;

/// Process-local store. The uniqueness test and the insert share one lock,
/// so concurrent duplicates cannot both get in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Registrant>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn all(&self) -> Vec<Registrant> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl RegistrantStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        let email = email.to_lowercase();
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|r| r.email == email).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Registrant>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|r| r.phone == phone).cloned())
    }

    async fn insert(
        &self,
        registrant: &NewRegistrant,
        scope: UniquenessScope,
    ) -> Result<Registrant, StoreError> {
        let mut rows = self.rows.lock().await;

        let email = registrant.email.as_ref();
        let phone = registrant.phone.as_ref();
        let conflict = ConflictFields {
            email: rows.iter().any(|r| r.email == email),
            phone: scope.includes_phone() && rows.iter().any(|r| r.phone == phone),
        };
        if conflict.any() {
            return Err(StoreError::Conflict(conflict));
        }

        let id = rows.last().map_or(1, |r| r.id + 1);
        let row = Registrant {
            id,
            first_name: registrant.first_name.to_string(),
            last_name: registrant.last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
