use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{Instrument, instrument};

use crate::{
    dao::handle_database_error,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{STORED_DATE_FORMAT, SalesDataAddUpdateInputType, SalesDataDetailType, SalesReportRowType},
    },
};

/**
 * Database response type for querying sales data.
 */
pub type QuerySalesDataDbResp = (i64, Decimal, String, i64, Option<String>);

/**
 * Database response type for querying the report source rows.
 */
pub type QuerySalesReportDbResp = (i64, Decimal, String, String);

/**
 * SQL query to retrieve all sales data. Rows whose region is gone are kept.
 */
const QUERY_SALES_DATA_LIST: &str = "SELECT sd.sales_data_id, sd.monthly_amount, sd.date, sd.region, r.region_name
                                     FROM sales_data sd LEFT JOIN regions r ON sd.region = r.region_id
                                     ORDER BY sd.sales_data_id";

/**
 * SQL query to retrieve a single sales data row.
 */
const QUERY_SALES_DATA: &str = "SELECT sd.sales_data_id, sd.monthly_amount, sd.date, sd.region, r.region_name
                                FROM sales_data sd LEFT JOIN regions r ON sd.region = r.region_id
                                WHERE sd.sales_data_id = $1";

/**
 * SQL query to retrieve the sales data joined with the region name.
 */
const QUERY_SALES_REPORT: &str = "SELECT sd.sales_data_id, sd.monthly_amount, sd.date, r.region_name
                                  FROM sales_data sd JOIN regions r ON sd.region = r.region_id
                                  ORDER BY sd.sales_data_id";

/**
 * SQL query to add sales data.
 */
const ADD_SALES_DATA: &str = "INSERT INTO sales_data (monthly_amount, date, region) VALUES ($1, $2, $3) RETURNING sales_data_id";

/**
 * SQL query to update sales data.
 */
const UPDATE_SALES_DATA: &str = "UPDATE sales_data SET monthly_amount = $1, date = $2, region = $3 WHERE sales_data_id = $4";

/**
 * SQL query to delete sales data.
 */
const DELETE_SALES_DATA: &str = "DELETE FROM sales_data WHERE sales_data_id = $1";

impl From<QuerySalesDataDbResp> for SalesDataDetailType {
    fn from(row: QuerySalesDataDbResp) -> Self {
        SalesDataDetailType::new(row.0, row.1, row.2, row.3, row.4)
    }
}

impl From<QuerySalesReportDbResp> for SalesReportRowType {
    fn from(row: QuerySalesReportDbResp) -> Self {
        SalesReportRowType::new(row.0, row.1, row.2, row.3)
    }
}

/**
 * DAO for sales data database operations.
 */
#[derive(Default)]
pub struct SalesDao {}

impl SalesDao {
    pub fn new() -> Self {
        SalesDao {}
    }

    /**
     * Retrieves all sales data.
     *
     * # Arguments
     * `connection`: The database connection.
     *
     * # Returns
     * A Result containing the sales data ordered by id or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_sales_data_list(&self, connection: &mut PgConnection) -> Result<Vec<SalesDataDetailType>, ApplicationError> {
        let span = tracing::Span::current();
        let results: Vec<QuerySalesDataDbResp> = sqlx::query_as(QUERY_SALES_DATA_LIST)
            .fetch_all(connection)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        Ok(results.into_iter().map(SalesDataDetailType::from).collect())
    }

    /**
     * Retrieves a single sales data row.
     *
     * # Arguments
     * `connection`: The database connection.
     * `sales_data_id`: The ID of the sales data.
     *
     * # Returns
     * A Result containing the sales data or a `NotFound` error.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_sales_data(&self, connection: &mut PgConnection, sales_data_id: i64) -> Result<SalesDataDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<QuerySalesDataDbResp> = sqlx::query_as(QUERY_SALES_DATA)
            .bind(sales_data_id)
            .fetch_optional(connection)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        match result {
            Some(row) => Ok(SalesDataDetailType::from(row)),
            None => {
                tracing::debug!("Sales data with ID {} not found", sales_data_id);
                Err(ApplicationError::new(ErrorType::NotFound, "Sales data not found".to_string()))
            }
        }
    }

    /**
     * Retrieves the sales data joined with region names. Sales data without an existing region is excluded.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_sales_report_rows(&self, connection: &mut PgConnection) -> Result<Vec<SalesReportRowType>, ApplicationError> {
        let span = tracing::Span::current();
        let results: Vec<QuerySalesReportDbResp> = sqlx::query_as(QUERY_SALES_REPORT)
            .fetch_all(connection)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        Ok(results.into_iter().map(SalesReportRowType::from).collect())
    }

    /**
     * Adds sales data to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `sales_data_add_input`: The validated sales data.
     *
     * # Returns
     * A result containing the generated sales data id.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_sales_data(&self, transaction: &mut PgConnection, sales_data_add_input: SalesDataAddUpdateInputType) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let sales_data_id: (i64,) = sqlx::query_as(ADD_SALES_DATA)
            .bind(sales_data_add_input.monthly_amount)
            .bind(sales_data_add_input.date.format(STORED_DATE_FORMAT).to_string())
            .bind(sales_data_add_input.region)
            .fetch_one(transaction)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        Ok(sales_data_id.0)
    }

    /**
     * Updates existing sales data.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `sales_data_id`: The ID of the sales data to be updated.
     * `sales_data_update_input`: The validated sales data.
     *
     * # Returns
     * A result indicating success or failure of the operation.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn update_sales_data(&self, transaction: &mut PgConnection, sales_data_id: i64, sales_data_update_input: SalesDataAddUpdateInputType) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(UPDATE_SALES_DATA)
            .bind(sales_data_update_input.monthly_amount)
            .bind(sales_data_update_input.date.format(STORED_DATE_FORMAT).to_string())
            .bind(sales_data_update_input.region)
            .bind(sales_data_id)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Sales data with ID {} not found for update", sales_data_id);
            return Err(ApplicationError::new(ErrorType::NotFound, "Sales data not found".to_string()));
        }
        Ok(())
    }

    /**
     * Deletes sales data by its ID.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn delete_sales_data(&self, transaction: &mut PgConnection, sales_data_id: i64) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(DELETE_SALES_DATA)
            .bind(sales_data_id)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| handle_database_error(&err))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Sales data with ID {} not found for deletion", sales_data_id);
            return Err(ApplicationError::new(ErrorType::NotFound, "Sales data not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use crate::{dao::regions::RegionsDao, model::models::RegionAddUpdateInputType};
    use chrono::NaiveDate;
    use sqlx::PgPool;

    fn sales_input(amount: i64, year: i32, month: u32, day: u32, region: i64) -> SalesDataAddUpdateInputType {
        SalesDataAddUpdateInputType { monthly_amount: Decimal::new(amount, 0), date: NaiveDate::from_ymd_opt(year, month, day).unwrap(), region }
    }

    async fn add_region(connection: &mut PgConnection, name: &str) -> i64 {
        RegionsDao::new().add_region(connection, RegionAddUpdateInputType { region_name: name.to_string() }).await.unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_add_update_then_get_sales_data(pool: PgPool) {
        let sales_dao = SalesDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let region_id = add_region(&mut connection, "North").await;
        let sales_data_id = sales_dao.add_sales_data(&mut connection, sales_input(100, 2024, 1, 15, region_id)).await.unwrap();
        let sales_data = sales_dao.get_sales_data(&mut connection, sales_data_id).await.unwrap();
        assert_eq!(sales_data, SalesDataDetailType::new(sales_data_id, Decimal::new(100, 0), "2024-01-15".to_string(), region_id, Some("North".to_string())));

        sales_dao.update_sales_data(&mut connection, sales_data_id, sales_input(75, 2024, 2, 1, region_id)).await.unwrap();
        let sales_data = sales_dao.get_sales_data(&mut connection, sales_data_id).await.unwrap();
        assert_eq!(sales_data.monthly_amount, Decimal::new(75, 0));
        assert_eq!(sales_data.date, "2024-02-01");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_region_orphans_sales_data(pool: PgPool) {
        let sales_dao = SalesDao::new();
        let regions_dao = RegionsDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let region_id = add_region(&mut connection, "North").await;
        let sales_data_id = sales_dao.add_sales_data(&mut connection, sales_input(100, 2024, 1, 15, region_id)).await.unwrap();
        regions_dao.delete_region(&mut connection, region_id).await.unwrap();

        let sales_data_list = sales_dao.get_sales_data_list(&mut connection).await.unwrap();
        assert_eq!(sales_data_list, vec![SalesDataDetailType::new(sales_data_id, Decimal::new(100, 0), "2024-01-15".to_string(), region_id, None)]);
        let report_rows = sales_dao.get_sales_report_rows(&mut connection).await.unwrap();
        assert!(report_rows.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_report_rows_carry_region_name(pool: PgPool) {
        let sales_dao = SalesDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let north = add_region(&mut connection, "North").await;
        let south = add_region(&mut connection, "South").await;
        sales_dao.add_sales_data(&mut connection, sales_input(100, 2024, 1, 15, north)).await.unwrap();
        sales_dao.add_sales_data(&mut connection, sales_input(50, 2024, 2, 10, south)).await.unwrap();
        let report_rows = sales_dao.get_sales_report_rows(&mut connection).await.unwrap();
        let names: Vec<&str> = report_rows.iter().map(|row| row.region_name.as_str()).collect();
        assert_eq!(names, vec!["North", "South"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_sales_data(pool: PgPool) {
        let sales_dao = SalesDao::new();
        let mut connection = pool.acquire().await.unwrap();
        assert_eq!(sales_dao.get_sales_data(&mut connection, 4711).await.unwrap_err().error_type, ErrorType::NotFound);
        assert_eq!(sales_dao.update_sales_data(&mut connection, 4711, sales_input(1, 2024, 1, 1, 1)).await.unwrap_err().error_type, ErrorType::NotFound);
        assert_eq!(sales_dao.delete_sales_data(&mut connection, 4711).await.unwrap_err().error_type, ErrorType::NotFound);
    }
}
