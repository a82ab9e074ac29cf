use sqlx::{PgConnection, Pool, Postgres};
use tracing::instrument;

use crate::{
    dao::{regions::RegionsDao, sales::SalesDao},
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{SalesDataAddUpdateInputType, SalesDataDetailType},
    },
    service::{acquire_connection, begin_transaction, finish_transaction},
};

/**
 * Represents the service for managing sales data.
 */
pub struct SalesService {
    /**
     * The DAO for sales data operations.
     */
    sales_dao: SalesDao,
    /**
     * The DAO used to check the referenced region.
     */
    regions_dao: RegionsDao,
    /**
     * Optional connection pool for database operations. Optional for test purposes until we have a better way to mock the database.
     */
    connection_pool: Option<Pool<Postgres>>,
}

impl SalesService {
    /**
     * Creates a new instance of `SalesService`.
     *
     * # Arguments
     * `sales_dao`: The DAO for sales data operations.
     * `regions_dao`: The DAO for region operations.
     * `connection_pool`: Optional connection pool for database operations.
     */
    pub fn new(sales_dao: SalesDao, regions_dao: RegionsDao, connection_pool: Option<Pool<Postgres>>) -> Self {
        SalesService { sales_dao, regions_dao, connection_pool }
    }

    /**
     * Retrieves all sales data, including rows whose region has been deleted.
     */
    #[instrument(skip(self))]
    pub async fn get_sales_data_list(&self) -> Result<Vec<SalesDataDetailType>, ApplicationError> {
        let mut connection = acquire_connection(&self.connection_pool).await?;
        self.sales_dao.get_sales_data_list(&mut connection).await
    }

    /**
     * Retrieves sales data by its ID.
     */
    #[instrument(skip(self))]
    pub async fn get_sales_data(&self, sales_data_id: i64) -> Result<SalesDataDetailType, ApplicationError> {
        let mut connection = acquire_connection(&self.connection_pool).await?;
        self.sales_dao.get_sales_data(&mut connection, sales_data_id).await
    }

    /**
     * Adds sales data.
     *
     * # Arguments
     * `sales_data_add_input`: The validated sales data.
     *
     * # Returns
     * A Result containing the id of the new sales data or an `ApplicationError`.
     */
    #[instrument(skip(self))]
    pub async fn add_sales_data(&self, sales_data_add_input: SalesDataAddUpdateInputType) -> Result<i64, ApplicationError> {
        let mut transaction = begin_transaction(&self.connection_pool).await?;
        let result = match self.check_region(&mut transaction, sales_data_add_input.region).await {
            Ok(()) => self.sales_dao.add_sales_data(&mut transaction, sales_data_add_input).await,
            Err(err) => Err(err),
        };
        finish_transaction(transaction, result).await
    }

    /**
     * Updates sales data.
     *
     * # Arguments
     * `sales_data_id`: The ID of the sales data to be updated.
     * `sales_data_update_input`: The validated sales data.
     */
    #[instrument(skip(self))]
    pub async fn update_sales_data(&self, sales_data_id: i64, sales_data_update_input: SalesDataAddUpdateInputType) -> Result<(), ApplicationError> {
        let mut transaction = begin_transaction(&self.connection_pool).await?;
        let result = match self.check_region(&mut transaction, sales_data_update_input.region).await {
            Ok(()) => self.sales_dao.update_sales_data(&mut transaction, sales_data_id, sales_data_update_input).await,
            Err(err) => Err(err),
        };
        finish_transaction(transaction, result).await
    }

    /**
     * Deletes sales data.
     */
    #[instrument(skip(self))]
    pub async fn delete_sales_data(&self, sales_data_id: i64) -> Result<(), ApplicationError> {
        let mut transaction = begin_transaction(&self.connection_pool).await?;
        let result = self.sales_dao.delete_sales_data(&mut transaction, sales_data_id).await;
        finish_transaction(transaction, result).await
    }

    /**
     * Rejects sales data referencing a region that does not exist.
     */
    async fn check_region(&self, connection: &mut PgConnection, region_id: i64) -> Result<(), ApplicationError> {
        if self.regions_dao.region_exists(connection, region_id).await? {
            Ok(())
        } else {
            tracing::debug!("Region with ID {} does not exist", region_id);
            Err(ApplicationError::new(ErrorType::Validation, "Region does not exist".to_string()))
        }
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use crate::model::models::RegionAddUpdateInputType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_add_sales_data_with_unknown_region(pool: PgPool) {
        let sales_service = SalesService::new(SalesDao::new(), RegionsDao::new(), Some(pool));
        let input = SalesDataAddUpdateInputType { monthly_amount: Decimal::new(100, 0), date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), region: 4711 };
        let result = sales_service.add_sales_data(input).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::Validation);
        assert!(sales_service.get_sales_data_list().await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_sales_data_lifecycle(pool: PgPool) {
        let mut connection = pool.acquire().await.unwrap();
        let region_id = RegionsDao::new().add_region(&mut connection, RegionAddUpdateInputType { region_name: "North".to_string() }).await.unwrap();
        drop(connection);

        let sales_service = SalesService::new(SalesDao::new(), RegionsDao::new(), Some(pool));
        let input = SalesDataAddUpdateInputType { monthly_amount: Decimal::new(100, 0), date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), region: region_id };
        let sales_data_id = sales_service.add_sales_data(input.clone()).await.unwrap();
        sales_service.update_sales_data(sales_data_id, SalesDataAddUpdateInputType { monthly_amount: Decimal::new(250, 1), ..input }).await.unwrap();
        assert_eq!(sales_service.get_sales_data(sales_data_id).await.unwrap().monthly_amount, Decimal::new(250, 1));

        sales_service.delete_sales_data(sales_data_id).await.unwrap();
        assert_eq!(sales_service.get_sales_data(sales_data_id).await.unwrap_err().error_type, ErrorType::NotFound);
    }
}
