use sqlx::{Pool, Postgres};
use tracing::instrument;

use crate::{
    dao::regions::RegionsDao,
    model::{
        apperror::ApplicationError,
        models::{RegionAddUpdateInputType, RegionDetailType},
    },
    service::{acquire_connection, begin_transaction, finish_transaction},
};

/**
 * Represents the service for managing regions.
 */
pub struct RegionsService {
    /**
     * The DAO for region operations.
     */
    regions_dao: RegionsDao,
    /**
     * Optional connection pool for database operations. Optional for test purposes until we have a better way to mock the database.
     */
    connection_pool: Option<Pool<Postgres>>,
}

impl RegionsService {
    /**
     * Creates a new instance of `RegionsService`.
     *
     * # Arguments
     * `regions_dao`: The DAO for region operations.
     * `connection_pool`: Optional connection pool for database operations.
     */
    pub fn new(regions_dao: RegionsDao, connection_pool: Option<Pool<Postgres>>) -> Self {
        RegionsService { regions_dao, connection_pool }
    }

    /**
     * Retrieves all regions.
     */
    #[instrument(skip(self))]
    pub async fn get_region_list(&self) -> Result<Vec<RegionDetailType>, ApplicationError> {
        let mut connection = acquire_connection(&self.connection_pool).await?;
        self.regions_dao.get_region_list(&mut connection).await
    }

    /**
     * Retrieves a region by its ID.
     */
    #[instrument(skip(self))]
    pub async fn get_region(&self, region_id: i64) -> Result<RegionDetailType, ApplicationError> {
        let mut connection = acquire_connection(&self.connection_pool).await?;
        self.regions_dao.get_region(&mut connection, region_id).await
    }

    /**
     * Adds a new region.
     *
     * # Arguments
     * `region_add_input`: The name of the region.
     *
     * # Returns
     * A Result containing the id of the new region or an `ApplicationError`.
     */
    #[instrument(skip(self))]
    pub async fn add_region(&self, region_add_input: RegionAddUpdateInputType) -> Result<i64, ApplicationError> {
        let mut transaction = begin_transaction(&self.connection_pool).await?;
        let result = self.regions_dao.add_region(&mut transaction, region_add_input).await;
        finish_transaction(transaction, result).await
    }

    /**
     * Updates the name of a region.
     */
    #[instrument(skip(self))]
    pub async fn update_region(&self, region_id: i64, region_update_input: RegionAddUpdateInputType) -> Result<(), ApplicationError> {
        let mut transaction = begin_transaction(&self.connection_pool).await?;
        let result = self.regions_dao.update_region(&mut transaction, region_id, region_update_input).await;
        finish_transaction(transaction, result).await
    }

    /**
     * Deletes a region. Sales data referencing it is not touched.
     */
    #[instrument(skip(self))]
    pub async fn delete_region(&self, region_id: i64) -> Result<(), ApplicationError> {
        let mut transaction = begin_transaction(&self.connection_pool).await?;
        let result = self.regions_dao.delete_region(&mut transaction, region_id).await;
        finish_transaction(transaction, result).await
    }
}
