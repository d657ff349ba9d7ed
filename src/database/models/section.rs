use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A named content region on a page. The actual content lives per-locale on
/// `SectionTranslation`; `kind` records which embedded array the content is
/// expected to carry (reviews, cards, videos) when one is known.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Section {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub page_id: Uuid,
    pub name: String,
    pub kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SectionTranslation {
    pub id: Uuid,
    pub section_id: Uuid,
    pub locale: String,
    pub content: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
