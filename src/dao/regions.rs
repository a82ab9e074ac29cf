use sqlx::PgConnection;
use tracing::{Instrument, instrument};

use crate::{
    dao::handle_database_error,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{RegionAddUpdateInputType, RegionDetailType},
    },
};

/**
 * Database response type for querying regions.
 */
pub type QueryRegionDbResp = (i64, String);

/**
 * SQL query to retrieve all regions.
 */
const QUERY_REGIONS_LIST: &str = "SELECT region_id, region_name FROM regions ORDER BY region_id";

/**
 * SQL query to retrieve a single region.
 */
const QUERY_REGION: &str = "SELECT region_id, region_name FROM regions WHERE region_id = $1";

/**
 * SQL query to check that a region exists.
 */
const QUERY_REGION_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM regions WHERE region_id = $1)";

/**
 * SQL query to add a new region.
 */
const ADD_REGION: &str = "INSERT INTO regions (region_name) VALUES ($1) RETURNING region_id";

/**
 * SQL query to update a region.
 */
const UPDATE_REGION: &str = "UPDATE regions SET region_name = $1 WHERE region_id = $2";

/**
 * SQL query to delete a region. Sales data referencing the region is left untouched.
 */
const DELETE_REGION: &str = "DELETE FROM regions WHERE region_id = $1";

impl From<QueryRegionDbResp> for RegionDetailType {
    fn from(row: QueryRegionDbResp) -> Self {
        RegionDetailType::new(row.0, row.1)
    }
}

/**
 * DAO for region database operations.
 */
#[derive(Default)]
pub struct RegionsDao {}

impl RegionsDao {
    pub fn new() -> Self {
        RegionsDao {}
    }

    /**
     * Retrieves all regions.
     *
     * # Arguments
     * `connection`: The database connection.
     *
     * # Returns
     * A Result containing the regions ordered by id or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_region_list(&self, connection: &mut PgConnection) -> Result<Vec<RegionDetailType>, ApplicationError> {
        let span = tracing::Span::current();
        let results: Vec<QueryRegionDbResp> = sqlx::query_as(QUERY_REGIONS_LIST)
            .fetch_all(connection)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        Ok(results.into_iter().map(RegionDetailType::from).collect())
    }

    /**
     * Retrieves a single region.
     *
     * # Arguments
     * `connection`: The database connection.
     * `region_id`: The ID of the region.
     *
     * # Returns
     * A Result containing the region or a `NotFound` error.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_region(&self, connection: &mut PgConnection, region_id: i64) -> Result<RegionDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<QueryRegionDbResp> = sqlx::query_as(QUERY_REGION)
            .bind(region_id)
            .fetch_optional(connection)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        match result {
            Some(row) => Ok(RegionDetailType::from(row)),
            None => {
                tracing::debug!("Region with ID {} not found", region_id);
                Err(ApplicationError::new(ErrorType::NotFound, "Region not found".to_string()))
            }
        }
    }

    /**
     * Checks whether a region exists.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn region_exists(&self, connection: &mut PgConnection, region_id: i64) -> Result<bool, ApplicationError> {
        let span = tracing::Span::current();
        let exists: (bool,) = sqlx::query_as(QUERY_REGION_EXISTS)
            .bind(region_id)
            .fetch_one(connection)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        Ok(exists.0)
    }

    /**
     * Adds a new region to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `region_add_input`: The input containing the name of the region.
     *
     * # Returns
     * A result containing the generated region id.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_region(&self, transaction: &mut PgConnection, region_add_input: RegionAddUpdateInputType) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let region_id: (i64,) = sqlx::query_as(ADD_REGION)
            .bind(region_add_input.region_name)
            .fetch_one(transaction)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        Ok(region_id.0)
    }

    /**
     * Updates the name of a region.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `region_id`: The ID of the region to be updated.
     * `region_update_input`: The input containing the new name.
     *
     * # Returns
     * A result indicating success or failure of the operation.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn update_region(&self, transaction: &mut PgConnection, region_id: i64, region_update_input: RegionAddUpdateInputType) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(UPDATE_REGION)
            .bind(region_update_input.region_name)
            .bind(region_id)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Region with ID {} not found for update", region_id);
            return Err(ApplicationError::new(ErrorType::NotFound, "Region not found".to_string()));
        }
        Ok(())
    }

    /**
     * Deletes a region from the database by its ID.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `region_id`: The ID of the region to be deleted.
     *
     * # Returns
     * A result indicating success or failure of the operation.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn delete_region(&self, transaction: &mut PgConnection, region_id: i64) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(DELETE_REGION)
            .bind(region_id)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Region with ID {} not found for deletion", region_id);
            return Err(ApplicationError::new(ErrorType::NotFound, "Region not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use sqlx::PgPool;

    fn region_input(name: &str) -> RegionAddUpdateInputType {
        RegionAddUpdateInputType { region_name: name.to_string() }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_add_then_list_region(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let region_id = regions_dao.add_region(&mut connection, region_input("North")).await.unwrap();
        let regions = regions_dao.get_region_list(&mut connection).await.unwrap();
        assert!(regions.contains(&RegionDetailType::new(region_id, "North".to_string())));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_add_region_with_empty_name(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let region_id = regions_dao.add_region(&mut connection, region_input("")).await.unwrap();
        let region = regions_dao.get_region(&mut connection, region_id).await.unwrap();
        assert_eq!(region.region_name, "");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_then_get_region(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let region_id = regions_dao.add_region(&mut connection, region_input("North")).await.unwrap();
        regions_dao.update_region(&mut connection, region_id, region_input("South")).await.unwrap();
        let region = regions_dao.get_region(&mut connection, region_id).await.unwrap();
        assert_eq!(region.region_name, "South");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_missing_region(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let result = regions_dao.get_region(&mut connection, 4711).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::NotFound);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_missing_region(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut transaction = pool.begin().await.unwrap();
        let result = regions_dao.update_region(&mut transaction, 4711, region_input("Nowhere")).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::NotFound);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_region_name_too_long(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let result = regions_dao.add_region(&mut connection, region_input(&"x".repeat(300))).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::Validation);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_region(pool: PgPool) {
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let region_id = regions_dao.add_region(&mut connection, region_input("North")).await.unwrap();
        regions_dao.delete_region(&mut connection, region_id).await.unwrap();
        let regions = regions_dao.get_region_list(&mut connection).await.unwrap();
        assert!(regions.iter().all(|region| region.region_id != region_id));
        assert!(!regions_dao.region_exists(&mut connection, region_id).await.unwrap());
        let result = regions_dao.delete_region(&mut connection, region_id).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::NotFound);
    }
}
