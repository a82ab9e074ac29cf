use actix_web::{HttpRequest, HttpResponse, get, http::StatusCode, web};
use tracing::{Instrument, instrument};

use crate::{
    api::{
        middleware::get_trace_id,
        state::AppState,
        views::{ReportsTemplate, VisualizationTemplate, plain_text, render},
    },
    model::{apperror::ApplicationError, models::ReportOutcome},
};

pub const REPORTS_NO_DATA_MESSAGE: &str = "No data available for reports. Please add sales data and try again.";
pub const VISUALIZATION_NO_DATA_MESSAGE: &str = "No data available for visualization. Please add sales data and try again.";

/**
 * Totals per region and per month, plus the top region.
 */
#[instrument(skip(http_request, app_state), fields(service = "salesReport", trace_id = get_trace_id(&http_request)))]
#[get("/reports")]
pub async fn sales_report(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    match app_state.reports_service.get_sales_report().instrument(span).await? {
        ReportOutcome::NoData => Ok(plain_text(StatusCode::OK, REPORTS_NO_DATA_MESSAGE)),
        ReportOutcome::Ready(report) => render(&ReportsTemplate { report }),
    }
}

/**
 * Bar chart of the total sales per region.
 */
#[instrument(skip(http_request, app_state), fields(service = "salesVisualization", trace_id = get_trace_id(&http_request)))]
#[get("/visualization")]
pub async fn sales_visualization(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    match app_state.reports_service.get_sales_chart().instrument(span).await? {
        ReportOutcome::NoData => Ok(plain_text(StatusCode::OK, VISUALIZATION_NO_DATA_MESSAGE)),
        ReportOutcome::Ready(chart) => {
            tracing::debug!("Rendering chart with {} bars", chart.bars.len());
            render(&VisualizationTemplate { chart })
        }
    }
}
