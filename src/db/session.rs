// db/session.rs
use sqlx::{PgConnection, Pool, Postgres, Transaction};

/// One unit of work against the database.
///
/// Everything run through [`DbSession::conn`] lands in a single transaction.
/// [`DbSession::commit`] makes it durable; dropping the session without
/// committing (an early `?` return, a panic, a validation failure halfway
/// through) rolls it back and hands the connection back to the pool.
pub struct DbSession {
    tx: Transaction<'static, Postgres>,
}

impl DbSession {
    pub async fn begin(pool: &Pool<Postgres>) -> Result<Self, sqlx::Error> {
        let tx = pool.begin().await?;
        Ok(DbSession { tx })
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await?;
        tracing::debug!("db session committed");
        Ok(())
    }
}
