use std::sync::Arc;

use crate::domain::NewRegistrant;
use crate::error::ApiError;
use crate::models::registrant::Registrant;
use crate::schemas::RegisterSchema;
use crate::store::{ConflictFields, RegistrantStore, StoreError, UniquenessScope};

/// Validates, de-duplicates and stores waitlist registrations.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrantStore>,
    scope: UniquenessScope,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RegistrantStore>, scope: UniquenessScope) -> Self {
        Self { store, scope }
    }

    pub fn scope(&self) -> UniquenessScope {
        self.scope
    }

    pub async fn register(&self, payload: RegisterSchema) -> Result<Registrant, ApiError> {
        // Validation runs before the store is touched.
        let registrant = NewRegistrant::parse(payload).inspect_err(|e| {
            tracing::debug!(code = e.code(), "registration rejected by validation");
        })?;

        let existing = self.existing_conflicts(&registrant).await.map_err(server_error)?;
        if let Some(err) = ApiError::conflict(existing) {
            tracing::warn!(conflict = %existing, "registration rejected: already registered");
            return Err(err);
        }

        // The insert is the authoritative duplicate check; a concurrent
        // registration may have landed since the lookup above.
        let created = self
            .store
            .insert(&registrant, self.scope)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(fields) => {
                    tracing::warn!(conflict = %fields, "registration lost insert race");
                    ApiError::from(StoreError::Conflict(fields))
                }
                other => server_error(other),
            })?;

        tracing::info!(id = created.id, "registrant created");
        Ok(created)
    }

    async fn existing_conflicts(
        &self,
        registrant: &NewRegistrant,
    ) -> Result<ConflictFields, StoreError> {
        let email = self
            .store
            .find_by_email(registrant.email.as_ref())
            .await?
            .is_some();
        let phone = if self.scope.includes_phone() {
            self.store
                .find_by_phone(registrant.phone.as_ref())
                .await?
                .is_some()
        } else {
            false
        };
        Ok(ConflictFields { email, phone })
    }
}

fn server_error(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "registration store failure");
    ApiError::Server(err)
}
