//! Record store over `PostgREST`.

use async_trait::async_trait;
use linha_verde_core::{Vehicle, VehicleFields, VehicleId, VehiclePatch};
use reqwest::Method;
use tracing::{debug, instrument};

use super::SupabaseClient;
use crate::backend::RecordStore;
use crate::error::BackendError;
use crate::types::{AccessToken, SortOrder};

impl SupabaseClient {
    fn table_path(&self) -> String {
        format!("rest/v1/{}", self.inner.vehicles_table)
    }

    /// `PostgREST` equality filter on the primary key.
    fn id_filter(id: &VehicleId) -> String {
        format!("eq.{}", id.as_str())
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    #[instrument(skip(self))]
    async fn list(&self, order: SortOrder) -> Result<Vec<Vehicle>, BackendError> {
        let request = self
            .request(Method::GET, &self.table_path(), None)
            .query(&[("select", "*"), ("order", order.as_query())]);

        let vehicles: Vec<Vehicle> = Self::send_json(request).await?;
        debug!(count = vehicles.len(), "Listed vehicles");
        Ok(vehicles)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get(&self, id: &VehicleId) -> Result<Option<Vehicle>, BackendError> {
        let request = self
            .request(Method::GET, &self.table_path(), None)
            .query(&[("select", "*".to_string()), ("id", Self::id_filter(id))]);

        let rows: Vec<Vehicle> = Self::send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, token, fields), fields(name = %fields.name))]
    async fn insert(
        &self,
        token: &AccessToken,
        fields: &VehicleFields,
    ) -> Result<Vehicle, BackendError> {
        let request = self
            .request(Method::POST, &self.table_path(), Some(token))
            .header("Prefer", "return=representation")
            .json(&[fields]);

        let rows: Vec<Vehicle> = Self::send_json(request).await?;
        let vehicle = rows.into_iter().next().ok_or_else(|| {
            BackendError::service(500, "Insert returned no row")
        })?;
        debug!(id = %vehicle.id, "Inserted vehicle");
        Ok(vehicle)
    }

    #[instrument(skip(self, token, patch), fields(id = %id, images = patch.touches_images()))]
    async fn update(
        &self,
        token: &AccessToken,
        id: &VehicleId,
        patch: &VehiclePatch,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::PATCH, &self.table_path(), Some(token))
            .query(&[("id", Self::id_filter(id))])
            .header("Prefer", "return=representation")
            .json(patch);

        // An update filtered to zero rows (missing id, or hidden by row-level
        // security) still answers 200 with an empty array.
        let rows: Vec<serde_json::Value> = Self::send_json(request).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn delete(&self, token: &AccessToken, id: &VehicleId) -> Result<(), BackendError> {
        let request = self
            .request(Method::DELETE, &self.table_path(), Some(token))
            .query(&[("id", Self::id_filter(id))])
            .header("Prefer", "return=representation");

        let rows: Vec<serde_json::Value> = Self::send_json(request).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
