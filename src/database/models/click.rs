use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recent-clicks analytics row (click joined with its product name). Click
/// rows are append-only and never read back individually, so this is the
/// only shape they surface in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClickSummary {
    pub id: Uuid,
    pub product_name: String,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
}
