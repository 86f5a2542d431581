//! PostgreSQL consultation store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::store::{ConsultationStore, DbError};
use crate::models::{
    ChatMessage, ClientId, Consultation, ConsultationId, ConsultationStatus, NewConsultation,
    NewMessage, SenderRole, UserId,
};

const CONSULTATION_COLUMNS: &str =
    "id, client_id, mentor_id, status, topic, scheduled_at, updated_at";

/// Store backed by a sqlx `PgPool`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: ConsultationId) -> Result<bool, DbError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM consultations WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.0)
    }
}

fn consultation_from_row(row: &PgRow) -> Result<Consultation, DbError> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ConsultationStatus>()
        .map_err(|_| DbError::Decode {
            field: "status",
            value: status,
        })?;

    Ok(Consultation {
        id: ConsultationId::from_uuid(row.try_get("id")?),
        client_id: ClientId::from_uuid(row.try_get("client_id")?),
        mentor_id: UserId::from_uuid(row.try_get("mentor_id")?),
        status,
        topic: row.try_get("topic")?,
        scheduled_at: row.try_get::<Option<DateTime<Utc>>, _>("scheduled_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<ChatMessage, DbError> {
    let role: String = row.try_get("sender_role")?;
    let sender_role = role.parse::<SenderRole>().map_err(|_| DbError::Decode {
        field: "sender_role",
        value: role,
    })?;

    Ok(ChatMessage {
        id: row.try_get::<Uuid, _>("id")?,
        consultation_id: ConsultationId::from_uuid(row.try_get("consultation_id")?),
        sender_id: UserId::from_uuid(row.try_get("sender_id")?),
        sender_role,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ConsultationStore for PgStore {
    async fn create_consultation(&self, new: NewConsultation) -> Result<Consultation, DbError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO consultations (client_id, mentor_id, topic, scheduled_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(new.client_id.as_uuid())
        .bind(new.mentor_id.as_uuid())
        .bind(&new.topic)
        .bind(new.scheduled_at)
        .fetch_one(&self.pool)
        .await?;

        consultation_from_row(&row)
    }

    async fn consultation(&self, id: ConsultationId) -> Result<Consultation, DbError> {
        let row = sqlx::query(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::consultation_not_found(id))?;

        consultation_from_row(&row)
    }

    async fn history(&self, id: ConsultationId) -> Result<Vec<ChatMessage>, DbError> {
        if !self.exists(id).await? {
            return Err(DbError::consultation_not_found(id));
        }

        let rows = sqlx::query(
            r#"
            SELECT id, consultation_id, sender_id, sender_role, body, created_at
            FROM consultation_messages
            WHERE consultation_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(message_from_row).collect()
    }

    async fn append_message(
        &self,
        id: ConsultationId,
        message: NewMessage,
    ) -> Result<ChatMessage, DbError> {
        if !self.exists(id).await? {
            return Err(DbError::consultation_not_found(id));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO consultation_messages (consultation_id, sender_id, sender_role, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, consultation_id, sender_id, sender_role, body, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(message.sender_role.as_str())
        .bind(message.body.as_str())
        .fetch_one(&self.pool)
        .await?;

        message_from_row(&row)
    }

    async fn update_status(
        &self,
        id: ConsultationId,
        status: ConsultationStatus,
    ) -> Result<Consultation, DbError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE consultations
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::consultation_not_found(id))?;

        consultation_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};
    use crate::models::MessageBody;

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url, 2).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        PgStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn message_history_is_ordered() {
        let store = store().await;
        let new = NewConsultation::new(ClientId::new(), UserId::new(), "Resume review", None)
            .unwrap();
        let consultation = store.create_consultation(new).await.unwrap();

        for body in ["first", "second"] {
            store
                .append_message(
                    consultation.id,
                    NewMessage {
                        sender_id: consultation.mentor_id,
                        sender_role: SenderRole::Mentor,
                        body: MessageBody::new(body).unwrap(),
                    },
                )
                .await
                .unwrap();
        }

        let history = store.history(consultation.id).await.unwrap();
        let bodies: Vec<_> = history.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_consultation_is_not_found() {
        let store = store().await;
        let err = store.history(ConsultationId::new()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
