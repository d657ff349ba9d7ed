//! Stale-reference cleanup for denormalized section content.
//!
//! Section content embeds copies of referenced entities (testimonials,
//! product cards, videos) instead of joining them at read time, so deleting
//! an entity leaves dead copies behind in every section/locale it was pasted
//! into. This sweep removes them. It is idempotent, non-authoritative (the
//! entity's own deletion has already committed) and strictly best-effort:
//! failures are reported and logged, never propagated.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{ContentEntry, ContentKind, DeletedEntity, SectionContent};

/// Outcome of one sweep across all section translations.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Translation documents inspected.
    pub scanned: usize,
    /// Translation documents whose array shrank and were written back.
    pub updated: usize,
    /// Total entries removed across all documents.
    pub removed_entries: usize,
    /// Per-section failures; the sweep continues past each one.
    pub failures: Vec<CleanupFailure>,
}

#[derive(Debug)]
pub struct CleanupFailure {
    pub section_id: Option<Uuid>,
    pub detail: String,
}

impl CleanupReport {
    fn record_failure(&mut self, section_id: Option<Uuid>, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::warn!(section_id = ?section_id, "content cleanup failure: {}", detail);
        self.failures.push(CleanupFailure { section_id, detail });
    }
}

/// Decide whether a content entry references the deleted entity.
///
/// Precedence, first match wins:
/// 1. identity (`id`, else `tempId`) against the entity id, tolerating
///    string/number drift; an identity field, when present, is decisive
///    either way and no fallback runs;
/// 2. image URL (`image`, else `imageUrl`) against the entity's stored
///    image URL, exact or filename-suffix containment in either direction;
/// 3. human name (`name`, else `clientName`), trimmed, case-insensitive.
///
/// The fallbacks trade false-negative risk for safety: removing an
/// unrelated entry is worse than letting a stale copy survive.
pub fn entry_matches(entry: &Value, target: &DeletedEntity) -> bool {
    let Some(parsed) = ContentEntry::parse(entry) else {
        return false;
    };

    if let Some(identity) = parsed.identity() {
        return id_matches(identity, &target.id);
    }

    if let (Some(url), Some(target_url)) = (parsed.image_str(), target.image_url.as_deref()) {
        if urls_match(url, target_url) {
            return true;
        }
    }

    if let (Some(name), Some(target_name)) = (parsed.name_str(), target.name.as_deref()) {
        return name.trim().to_lowercase() == target_name.trim().to_lowercase();
    }

    false
}

/// Compare a stored identity value against the entity id using both string
/// and numeric equality, so `5`, `"5"` and `5.0` all line up.
fn id_matches(stored: &Value, entity_id: &str) -> bool {
    let stored_str = match stored {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return false,
    };

    if stored_str == entity_id {
        return true;
    }

    match (stored_str.parse::<f64>(), entity_id.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Exact equality, or filename-suffix containment in either direction, so a
/// CDN rewrite of the path prefix still matches on the trailing filename.
fn urls_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    let file_a = filename(a);
    let file_b = filename(b);
    if file_a.is_empty() || file_b.is_empty() {
        return false;
    }

    a.ends_with(file_b) || b.ends_with(file_a)
}

fn filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or("")
}

/// Remove matching entries from one content document in place.
///
/// Returns the number of entries removed; opaque documents (missing or
/// malformed kind array) are skipped and return 0.
pub fn scrub_content(content: &mut Value, kind: ContentKind, target: &DeletedEntity) -> usize {
    let classified = SectionContent::classify(content.take(), kind);

    match classified {
        SectionContent::Typed { kind, mut entries, rest } => {
            let before = entries.len();
            entries.retain(|entry| !entry_matches(entry, target));
            let removed = before - entries.len();
            *content = SectionContent::Typed { kind, entries, rest }.into_value();
            removed
        }
        SectionContent::Opaque(original) => {
            *content = original;
            0
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TranslationRow {
    id: Uuid,
    section_id: Uuid,
    content: Value,
}

/// Sweep every section translation of a tenant and remove references to the
/// deleted entity.
///
/// Only documents whose array actually shrank are written back. Updates for
/// the translations of one section share a transaction so a section's locale
/// set stays internally consistent; sections are committed independently, so
/// a crash mid-sweep leaves some sections cleaned and others not. Rerunning
/// converges to the same fixed point.
pub async fn scrub_deleted_entity(
    pool: &PgPool,
    tenant_id: Uuid,
    kind: ContentKind,
    target: &DeletedEntity,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    let rows: Vec<TranslationRow> = match sqlx::query_as(
        r#"
        SELECT st.id, st.section_id, st.content
        FROM section_translations st
        JOIN sections s ON s.id = st.section_id
        WHERE s.tenant_id = $1
        ORDER BY st.section_id
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            report.record_failure(None, format!("failed to load section translations: {e}"));
            return report;
        }
    };

    report.scanned = rows.len();

    // Group the changed documents by section; one transaction per section.
    let mut pending: Vec<(Uuid, Vec<(Uuid, Value, usize)>)> = Vec::new();
    for row in rows {
        let mut content = row.content;
        let removed = scrub_content(&mut content, kind, target);
        if removed == 0 {
            continue;
        }

        match pending.last_mut() {
            Some((section_id, changes)) if *section_id == row.section_id => {
                changes.push((row.id, content, removed));
            }
            _ => pending.push((row.section_id, vec![(row.id, content, removed)])),
        }
    }

    for (section_id, changes) in pending {
        match apply_section_changes(pool, section_id, &changes).await {
            Ok(()) => {
                report.updated += changes.len();
                report.removed_entries += changes.iter().map(|(_, _, n)| n).sum::<usize>();
            }
            Err(e) => {
                report.record_failure(Some(section_id), e.to_string());
            }
        }
    }

    tracing::debug!(
        kind = %kind,
        entity_id = %target.id,
        scanned = report.scanned,
        updated = report.updated,
        removed = report.removed_entries,
        failures = report.failures.len(),
        "content cleanup sweep finished"
    );

    report
}

async fn apply_section_changes(
    pool: &PgPool,
    section_id: Uuid,
    changes: &[(Uuid, Value, usize)],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for (translation_id, content, _) in changes {
        sqlx::query(
            "UPDATE section_translations SET content = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(content)
        .bind(translation_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(%section_id, translations = changes.len(), "scrubbed section translations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reviews_doc() -> Value {
        json!({
            "heading": "What clients say",
            "reviews": [
                {"id": 5, "name": "Alice"},
                {"id": 7, "name": "Bob"},
            ]
        })
    }

    #[test]
    fn identity_match_removes_entry() {
        let mut doc = reviews_doc();
        let removed = scrub_content(&mut doc, ContentKind::Reviews, &DeletedEntity::new("5"));
        assert_eq!(removed, 1);
        assert_eq!(doc["reviews"], json!([{"id": 7, "name": "Bob"}]));
        assert_eq!(doc["heading"], "What clients say");
    }

    #[test]
    fn unmatched_id_leaves_document_unchanged() {
        let mut doc = reviews_doc();
        let original = doc.clone();
        let removed = scrub_content(&mut doc, ContentKind::Reviews, &DeletedEntity::new("99"));
        assert_eq!(removed, 0);
        assert_eq!(doc, original);
    }

    #[test]
    fn identity_tolerates_string_number_drift() {
        let target = DeletedEntity::new("5");
        assert!(entry_matches(&json!({"id": "5"}), &target));
        assert!(entry_matches(&json!({"id": 5}), &target));
        assert!(entry_matches(&json!({"id": 5.0}), &target));
        assert!(!entry_matches(&json!({"id": 50}), &target));
    }

    #[test]
    fn temp_id_is_used_when_id_is_absent() {
        let target = DeletedEntity::new("tmp-3");
        assert!(entry_matches(&json!({"tempId": "tmp-3"}), &target));
    }

    #[test]
    fn identity_mismatch_is_decisive_even_when_fallbacks_would_match() {
        // The entry has an id that differs; the matching image and name must
        // not be consulted.
        let target = DeletedEntity::new("5")
            .with_image("https://cdn/x/photo123.jpg")
            .with_name("Alice");
        let entry = json!({
            "id": 6,
            "image": "https://cdn/x/photo123.jpg",
            "name": "Alice",
        });
        assert!(!entry_matches(&entry, &target));
    }

    #[test]
    fn asset_match_accepts_shared_filename_suffix() {
        let target = DeletedEntity::new("5").with_image("https://other/photo123.jpg");
        assert!(entry_matches(&json!({"image": "https://cdn/x/photo123.jpg"}), &target));
        assert!(entry_matches(&json!({"imageUrl": "https://other/photo123.jpg"}), &target));
        assert!(!entry_matches(&json!({"image": "https://cdn/x/photo999.jpg"}), &target));
    }

    #[test]
    fn name_match_is_trimmed_and_case_insensitive() {
        let target = DeletedEntity::new("5").with_name("alice");
        assert!(entry_matches(&json!({"name": "  Alice "}), &target));
        assert!(entry_matches(&json!({"clientName": "ALICE"}), &target));
        assert!(!entry_matches(&json!({"name": "Alicia"}), &target));
    }

    #[test]
    fn name_fallback_runs_when_image_present_but_unmatched() {
        let target = DeletedEntity::new("5")
            .with_image("https://cdn/a.jpg")
            .with_name("Alice");
        let entry = json!({"image": "https://cdn/other.jpg", "name": "alice"});
        assert!(entry_matches(&entry, &target));
    }

    #[test]
    fn entry_without_usable_fields_is_retained() {
        let target = DeletedEntity::new("5").with_name("Alice");
        assert!(!entry_matches(&json!({"quote": "great service"}), &target));
        assert!(!entry_matches(&json!("not an object"), &target));
    }

    #[test]
    fn opaque_documents_are_skipped() {
        let mut doc = json!({"cards": [{"id": 5}]});
        let removed = scrub_content(&mut doc, ContentKind::Reviews, &DeletedEntity::new("5"));
        assert_eq!(removed, 0);
        assert_eq!(doc, json!({"cards": [{"id": 5}]}));
    }

    #[test]
    fn scrub_is_idempotent() {
        let mut doc = reviews_doc();
        let target = DeletedEntity::new("5");
        assert_eq!(scrub_content(&mut doc, ContentKind::Reviews, &target), 1);
        let after_first = doc.clone();
        assert_eq!(scrub_content(&mut doc, ContentKind::Reviews, &target), 0);
        assert_eq!(doc, after_first);
    }

    #[test]
    fn videos_kind_filters_its_own_array() {
        let mut doc = json!({
            "videos": [
                {"id": "v1", "name": "Intro"},
                {"id": "v2", "name": "Tour"},
            ],
            "reviews": [{"id": "v1"}]
        });
        let removed = scrub_content(&mut doc, ContentKind::Videos, &DeletedEntity::new("v1"));
        assert_eq!(removed, 1);
        // Sibling arrays belonging to other kinds are untouched
        assert_eq!(doc["reviews"], json!([{"id": "v1"}]));
        assert_eq!(doc["videos"], json!([{"id": "v2", "name": "Tour"}]));
    }
}
