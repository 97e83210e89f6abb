use crate::database::Database;
use crate::errors::MessagingResult;
use crate::models::{SendRecord, SendStatus};
use sqlx::Row;

impl Database {
    /// Append a send attempt to the audit log. Records are never updated.
    pub async fn insert_send_record(&self, record: &SendRecord) -> MessagingResult<()> {
        sqlx::query(
            "INSERT INTO send_records (id, number, template_name, payload, status,
                 provider_response, error_message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.number)
        .bind(record.template_name.as_deref())
        .bind(&record.payload)
        .bind(record.status.as_str())
        .bind(record.provider_response.as_deref())
        .bind(record.error_message.as_deref())
        .bind(&record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_send_records(&self, limit: i64) -> MessagingResult<Vec<SendRecord>> {
        let rows = sqlx::query(
            "SELECT id, number, template_name, payload, status, provider_response,
                 error_message, created_at
             FROM send_records
             ORDER BY created_at DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            // Handle Option<String> columns: the Any driver reports NULL as
            // a type mismatch, so nullable columns read through `.ok()`.
            records.push(SendRecord {
                id: row.try_get("id")?,
                number: row.try_get("number")?,
                template_name: row.try_get("template_name").ok(),
                payload: row.try_get("payload")?,
                status: SendStatus::from(row.try_get::<String, _>("status")?),
                provider_response: row.try_get("provider_response").ok(),
                error_message: row.try_get("error_message").ok(),
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(records)
    }

    pub async fn count_send_records(&self) -> MessagingResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM send_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
