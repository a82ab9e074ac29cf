use sqlx::{Pool, Postgres};

use crate::{
    dao::{regions::RegionsDao, sales::SalesDao},
    service::{regions::RegionsService, reports::ReportsService, sales::SalesService},
};

/**
* Represents the application state shared across the Actix web application.
*/
pub struct AppState {
    /**
     * The service handling region operations.
     */
    pub regions_service: RegionsService,
    /**
     * The service handling sales data operations.
     */
    pub sales_service: SalesService,
    /**
     * The service building reports and charts.
     */
    pub reports_service: ReportsService,
}

impl AppState {
    /**
     * Creates a new instance of `AppState`.
     *
     * # Arguments
     * `regions_service`: The service handling region operations.
     * `sales_service`: The service handling sales data operations.
     * `reports_service`: The service building reports and charts.
     */
    pub fn new(regions_service: RegionsService, sales_service: SalesService, reports_service: ReportsService) -> Self {
        AppState { regions_service, sales_service, reports_service }
    }

    /**
     * Wires all services against the given connection pool. `None` leaves every database operation failing, which
     * is what the endpoint tests run against.
     */
    pub fn with_connection_pool(connection_pool: Option<Pool<Postgres>>) -> Self {
        AppState::new(
            RegionsService::new(RegionsDao::new(), connection_pool.clone()),
            SalesService::new(SalesDao::new(), RegionsDao::new(), connection_pool.clone()),
            ReportsService::new(SalesDao::new(), connection_pool),
        )
    }
}
