use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// SEO metadata for one public path, unique per tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeoEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
