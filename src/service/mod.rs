use sqlx::{Pool, Postgres, Transaction, pool::PoolConnection};

use crate::model::apperror::{ApplicationError, ErrorType};

pub mod regions;
pub mod reports;
pub mod sales;

/**
 * Returns the connection pool or an error if the service was created without one.
 */
fn get_connection_pool(connection_pool: &Option<Pool<Postgres>>) -> Result<&Pool<Postgres>, ApplicationError> {
    connection_pool.as_ref().ok_or_else(|| ApplicationError::new(ErrorType::DatabaseError, "No database connection available".to_string()))
}

/**
 * Acquires a connection from the pool. The connection goes back to the pool when dropped.
 */
async fn acquire_connection(connection_pool: &Option<Pool<Postgres>>) -> Result<PoolConnection<Postgres>, ApplicationError> {
    let connection_pool = get_connection_pool(connection_pool)?;
    connection_pool.acquire().await.map_err(|err| {
        tracing::error!("Failed to acquire connection: {err}");
        ApplicationError::new(ErrorType::DatabaseError, "Failed to acquire database connection".to_string())
    })
}

/**
 * Begins a transaction. A transaction dropped without commit is rolled back.
 */
async fn begin_transaction(connection_pool: &Option<Pool<Postgres>>) -> Result<Transaction<'static, Postgres>, ApplicationError> {
    let connection_pool = get_connection_pool(connection_pool)?;
    connection_pool.begin().await.map_err(|err| {
        tracing::error!("Failed to begin transaction: {err}");
        ApplicationError::new(ErrorType::DatabaseError, "Failed to begin transaction".to_string())
    })
}

/**
 * Commits the transaction when the operation succeeded and rolls it back otherwise.
 *
 * # Arguments
 * `transaction`: The transaction the operation ran within.
 * `result`: The result of the operation.
 *
 * # Returns
 * The result of the operation, or an error if commit or rollback failed.
 */
async fn finish_transaction<T>(transaction: Transaction<'static, Postgres>, result: Result<T, ApplicationError>) -> Result<T, ApplicationError> {
    match result {
        Ok(value) => {
            transaction.commit().await.map_err(|err| {
                tracing::error!("Failed to commit transaction: {err}");
                ApplicationError::new(ErrorType::DatabaseError, "Failed to commit transaction".to_string())
            })?;
            Ok(value)
        }
        Err(err) => {
            transaction.rollback().await.map_err(|err| {
                tracing::error!("Failed to rollback transaction: {err}");
                ApplicationError::new(ErrorType::DatabaseError, "Failed to rollback transaction".to_string())
            })?;
            Err(err)
        }
    }
}
