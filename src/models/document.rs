use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for an attached document. While an upload is in flight (or
/// when the collaborator omits the id from its response) the document
/// carries a locally-generated temporary id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Server(i64),
    Temp(Uuid),
}

impl DocumentId {
    pub fn temp() -> Self {
        Self::Temp(Uuid::new_v4())
    }

    pub fn server_id(self) -> Option<i64> {
        match self {
            Self::Server(id) => Some(id),
            Self::Temp(_) => None,
        }
    }
}

/// An attached file reference (e.g. proof-of-delivery) belonging to exactly
/// one shipment. Append-only from the client's perspective except explicit
/// delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    /// Opaque content reference: a URL or storage path, never interpreted
    /// by this core.
    pub content_ref: String,
    pub shipment_id: i64,
}
