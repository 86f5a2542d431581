//! Schema for the tables the push layer reads and writes

use sqlx::PgPool;

/// Create consultation tables if they do not exist
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running consultation migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS consultations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id UUID NOT NULL,
            mentor_id UUID NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'accepted', 'rejected', 'completed', 'cancelled')),
            topic TEXT NOT NULL,
            scheduled_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS consultation_messages (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            consultation_id UUID NOT NULL REFERENCES consultations(id) ON DELETE CASCADE,
            sender_id UUID NOT NULL,
            sender_role TEXT NOT NULL CHECK (sender_role IN ('client', 'mentor')),
            body TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_consultation_messages_consultation
            ON consultation_messages (consultation_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_consultations_client
            ON consultations (client_id)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Consultation migrations complete");
    Ok(())
}
