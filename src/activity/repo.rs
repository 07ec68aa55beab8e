use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Actions worth auditing. The table is append-only: nothing in this module
/// (or anywhere else) updates or deletes rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Deleted,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub resource: String,
    pub resource_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Append one audit entry for a blog mutation.
pub async fn record(
    db: &PgPool,
    user_id: Uuid,
    action: Action,
    resource_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO activity (user_id, action, resource, resource_id)
        VALUES ($1, $2, 'blog', $3)
        "#,
    )
    .bind(user_id)
    .bind(action.as_str())
    .bind(resource_id)
    .execute(db)
    .await?;
    Ok(())
}

/// The caller's own trail, newest first, bounded.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ActivityRecord>> {
    let rows = sqlx::query_as::<_, ActivityRecord>(
        r#"
        SELECT id, user_id, action, resource, resource_id, created_at
        FROM activity
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 100
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_maps_to_audit_strings() {
        assert_eq!(Action::Created.as_str(), "created");
        assert_eq!(Action::Deleted.as_str(), "deleted");
        assert_eq!(serde_json::to_value(Action::Created).unwrap(), "created");
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let rec = ActivityRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            action: "created".into(),
            resource: "blog".into(),
            resource_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("resourceId").is_some());
        assert_eq!(json["resource"], "blog");
    }
}
