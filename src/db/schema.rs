// db/schema.rs
use sqlx::{Pool, Postgres};

const CREATE_STATEMENTS: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS user_kyc (
        id SERIAL PRIMARY KEY,
        wallet_address VARCHAR(56) NOT NULL,
        full_name VARCHAR(150) NOT NULL,
        document_id VARCHAR(80) NOT NULL,
        id_photo_ref VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_user_kyc_wallet UNIQUE (wallet_address),
        CONSTRAINT uq_user_kyc_document UNIQUE (document_id)
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS ix_user_kyc_created_at ON user_kyc (created_at)"#,
];

/// Creates the KYC table and its indexes if they are missing. Safe to run on every start.
pub async fn create_tables(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("user_kyc schema is ready");
    Ok(())
}
