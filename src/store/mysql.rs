use async_trait::async_trait;
use sqlx::MySqlPool;

use super::{ConflictFields, RegistrantStore, StoreError, UniquenessScope};
use crate::domain::NewRegistrant;
use crate::models::registrant::Registrant;

const PHONE_KEY_INDEX: &str = "uq_registrants_phone_key";

/// MySQL-backed store; schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Registrant, StoreError> {
        let row = sqlx::query_as::<_, Registrant>(
            r#"
            SELECT id, first_name, last_name, email, phone, created_at
            FROM registrants
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// MySQL names only the first unique key an insert violated. With both
    /// keys enforced, look the other one up so a double collision reports both.
    async fn complete_conflict(
        &self,
        reported: ConflictFields,
        registrant: &NewRegistrant,
        scope: UniquenessScope,
    ) -> ConflictFields {
        if !scope.includes_phone() {
            return reported;
        }
        let email = reported.email
            || matches!(self.find_by_email(registrant.email.as_ref()).await, Ok(Some(_)));
        let phone = reported.phone
            || matches!(self.find_by_phone(registrant.phone.as_ref()).await, Ok(Some(_)));
        ConflictFields { email, phone }
    }
}

/// Translate a duplicate-key failure into the fields that collided.
fn conflict_from(err: &sqlx::Error) -> Option<ConflictFields> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let message = db_err.message();
    // MySQL reports ER_DUP_ENTRY as "Duplicate entry '..' for key '..'"
    if !db_err.is_unique_violation() && !message.to_lowercase().contains("duplicate entry") {
        return None;
    }
    if message.contains(PHONE_KEY_INDEX) {
        Some(ConflictFields::PHONE)
    } else {
        Some(ConflictFields::EMAIL)
    }
}

#[async_trait]
impl RegistrantStore for MySqlStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        let row = sqlx::query_as::<_, Registrant>(
            r#"
            SELECT id, first_name, last_name, email, phone, created_at
            FROM registrants
            WHERE email = ?
            "#,
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Registrant>, StoreError> {
        let row = sqlx::query_as::<_, Registrant>(
            r#"
            SELECT id, first_name, last_name, email, phone, created_at
            FROM registrants
            WHERE phone = ?
            LIMIT 1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(
        &self,
        registrant: &NewRegistrant,
        scope: UniquenessScope,
    ) -> Result<Registrant, StoreError> {
        let phone_key = scope.includes_phone().then(|| registrant.phone.as_ref());

        let result = sqlx::query(
            r#"
            INSERT INTO registrants (first_name, last_name, email, phone, phone_key)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(registrant.first_name.as_ref())
        .bind(registrant.last_name.as_ref())
        .bind(registrant.email.as_ref())
        .bind(registrant.phone.as_ref())
        .bind(phone_key)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id() as i64,
            Err(e) => {
                if let Some(reported) = conflict_from(&e) {
                    let fields = self.complete_conflict(reported, registrant, scope).await;
                    return Err(StoreError::Conflict(fields));
                }
                return Err(StoreError::Database(e));
            }
        };

        self.fetch_by_id(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
