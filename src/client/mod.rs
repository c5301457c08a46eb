//! Client for the collaborator persistence API.
//!
//! The trait is the seam the services depend on; tests substitute a
//! scriptable in-memory implementation. [`HttpCollaborator`] is the
//! production reqwest-backed client.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::config::AppConfig;
use crate::dto::{
    DocumentUpload, RawDocument, ShipmentListFilter, ShipmentRecord, UpdateShipmentRequest,
};
use crate::errors::ServiceError;
use crate::models::DriverProfile;

/// Operations the core needs from the persistence collaborator. Only the
/// contract relied upon is modelled; the collaborator may do more.
#[async_trait]
pub trait CollaboratorApi: Send + Sync {
    /// `GET /shipments` — summaries; items/documents may be absent or empty
    /// even when they exist.
    async fn list_shipments(
        &self,
        filter: &ShipmentListFilter,
    ) -> Result<Vec<ShipmentRecord>, ServiceError>;

    /// `GET /shipment/{id}` — one shipment with sub-collections, subject to
    /// the read-after-write race the reconciliation engine compensates for.
    async fn get_shipment(&self, id: i64) -> Result<ShipmentRecord, ServiceError>;

    /// `PUT /shipment/{id}` — full-record update; only scalar fields of the
    /// response are authoritative.
    async fn update_shipment(
        &self,
        id: i64,
        request: &UpdateShipmentRequest,
    ) -> Result<ShipmentRecord, ServiceError>;

    /// `POST /shipment/{id}/document` — single-file upload.
    async fn upload_document(
        &self,
        shipment_id: i64,
        upload: DocumentUpload,
    ) -> Result<RawDocument, ServiceError>;

    /// `DELETE /shipment/document/{id}`.
    async fn delete_document(&self, document_id: i64) -> Result<(), ServiceError>;

    /// `DELETE /shipment/{id}` — admin-only destroy.
    async fn delete_shipment(&self, id: i64) -> Result<(), ServiceError>;

    /// `GET /users?role=driver`.
    async fn list_drivers(&self) -> Result<Vec<DriverProfile>, ServiceError>;
}

/// reqwest-backed collaborator client.
#[derive(Clone)]
pub struct HttpCollaborator {
    client: Client,
    base_url: Url,
}

impl HttpCollaborator {
    /// Build a client with the configured base URL and timeout.
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to construct HTTP client: {e}")))?;
        Self::with_client(config, client)
    }

    /// Build from an existing client (useful for testing).
    pub fn with_client(config: &AppConfig, client: Client) -> Result<Self, ServiceError> {
        let base_url = Url::parse(config.collaborator_base_url.trim_end_matches('/'))
            .map_err(|e| ServiceError::Validation(format!("invalid collaborator base URL: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Map a non-2xx response onto the error taxonomy. A 401/403 means the
    /// collaborator itself refused the mutation; that is a permission
    /// failure, not a generic one, even if the local guard allowed it.
    async fn check(response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ServiceError::NotFound(body_or(status, body))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ServiceError::PermissionDenied(body_or(status, body)))
            }
            s if s.is_server_error() => Err(ServiceError::ExternalService(body_or(status, body))),
            _ => {
                warn!(status = %status, "unexpected collaborator response");
                Err(ServiceError::ExternalService(body_or(status, body)))
            }
        }
    }
}

fn body_or(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        format!("collaborator returned {status}")
    } else {
        body
    }
}

#[async_trait]
impl CollaboratorApi for HttpCollaborator {
    async fn list_shipments(
        &self,
        filter: &ShipmentListFilter,
    ) -> Result<Vec<ShipmentRecord>, ServiceError> {
        let response = self
            .client
            .get(self.url("/shipments"))
            .query(filter)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_shipment(&self, id: i64) -> Result<ShipmentRecord, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("/shipment/{id}")))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update_shipment(
        &self,
        id: i64,
        request: &UpdateShipmentRequest,
    ) -> Result<ShipmentRecord, ServiceError> {
        let response = self
            .client
            .put(self.url(&format!("/shipment/{id}")))
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn upload_document(
        &self,
        shipment_id: i64,
        upload: DocumentUpload,
    ) -> Result<RawDocument, ServiceError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| ServiceError::Validation(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(&format!("/shipment/{shipment_id}/document")))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_document(&self, document_id: i64) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(self.url(&format!("/shipment/document/{document_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_shipment(&self, id: i64) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(self.url(&format!("/shipment/{id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_drivers(&self) -> Result<Vec<DriverProfile>, ServiceError> {
        let response = self
            .client
            .get(self.url("/users"))
            .query(&[("role", "driver")])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
