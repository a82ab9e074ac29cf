use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use askama::Template;
use serde::Deserialize;

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{RegionAddUpdateInputType, RegionDetailType, SalesChartOutputType, SalesDataAddUpdateInputType, SalesDataDetailType, SalesReportOutputType, parse_monthly_amount, parse_sales_date},
};

/***************** Form models *********************/

/**
 * Form posted when adding or editing a region.
 */
#[derive(Debug, Deserialize)]
pub struct RegionForm {
    pub region_name: String,
}

impl From<RegionForm> for RegionAddUpdateInputType {
    fn from(form: RegionForm) -> Self {
        RegionAddUpdateInputType { region_name: form.region_name }
    }
}

/**
 * Form posted when adding or editing sales data. All fields arrive as entered.
 */
#[derive(Debug, Deserialize)]
pub struct SalesDataForm {
    pub monthly_amount: String,
    pub date: String,
    pub region: String,
}

/**
 * Validates the posted sales data before anything is written.
 */
impl TryFrom<SalesDataForm> for SalesDataAddUpdateInputType {
    type Error = ApplicationError;

    fn try_from(form: SalesDataForm) -> Result<Self, Self::Error> {
        let Some(monthly_amount) = parse_monthly_amount(&form.monthly_amount) else {
            return Err(ApplicationError::new(ErrorType::Validation, "Monthly amount must be a number".to_string()));
        };
        let Some(date) = parse_sales_date(&form.date) else {
            return Err(ApplicationError::new(ErrorType::Validation, "Date must be a valid date (YYYY-MM-DD)".to_string()));
        };
        let region = form.region.trim().parse::<i64>().map_err(|_err| ApplicationError::new(ErrorType::Validation, "Region does not exist".to_string()))?;
        Ok(SalesDataAddUpdateInputType { monthly_amount, date, region })
    }
}

/***************** Page templates *********************/

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {}

#[derive(Template)]
#[template(path = "regions.html")]
pub struct RegionsTemplate {
    pub regions: Vec<RegionDetailType>,
    pub notice: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "add_region.html")]
pub struct AddRegionTemplate {}

#[derive(Template)]
#[template(path = "edit_region.html")]
pub struct EditRegionTemplate {
    pub region: RegionDetailType,
}

/**
 * Sales list. Edit and delete controls are generated per row from `sales_data_id`.
 */
#[derive(Template)]
#[template(path = "sales_data.html")]
pub struct SalesDataTemplate {
    pub sales_data: Vec<SalesDataDetailType>,
    pub notice: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "add_sales_data.html")]
pub struct AddSalesDataTemplate {
    pub regions: Vec<RegionDetailType>,
}

#[derive(Template)]
#[template(path = "edit_sales_data.html")]
pub struct EditSalesDataTemplate {
    pub sales_data: SalesDataDetailType,
    pub regions: Vec<RegionDetailType>,
}

#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub report: SalesReportOutputType,
}

/**
 * Visualization page. `chart.chart_html` is produced by the chart renderer and is inserted unescaped.
 */
#[derive(Template)]
#[template(path = "visualization.html")]
pub struct VisualizationTemplate {
    pub chart: SalesChartOutputType,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

/**
 * Renders a template into a 200 html response.
 */
pub fn render<T: Template>(template: &T) -> Result<HttpResponse, ApplicationError> {
    let body = template.render().map_err(|err| {
        tracing::error!("Failed to render template: {err}");
        ApplicationError::new(ErrorType::Rendering, "Failed to render page".to_string())
    })?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(body))
}

/**
 * Builds a plain text response, used for the terminal report answers.
 */
pub fn plain_text(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).content_type(ContentType::plaintext()).body(message.to_string())
}

/***************** Error models *********************/

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        get_statuscode(&self.error_type)
    }

    /**
     * Generates an error response for the application error. Report and chart failures answer in plain text,
     * the rest with an error page.
     */
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        tracing::debug!("Responding with error code {} and status {}", get_error_code(&self.error_type), status);
        match self.error_type {
            ErrorType::Aggregation | ErrorType::Rendering => plain_text(status, &self.message),
            _ => {
                let page = ErrorTemplate { status: status.as_u16(), message: self.message.clone() };
                match page.render() {
                    Ok(body) => HttpResponse::build(status).content_type(ContentType::html()).body(body),
                    Err(err) => {
                        tracing::error!("Failed to render error page: {err}");
                        plain_text(status, &self.message)
                    }
                }
            }
        }
    }
}

/**
* Maps application errors to HTTP status codes.
*
* # Arguments
* `application_error`: The type of error that occurred.
*
* # Returns
* The corresponding HTTP status code.
*/
fn get_statuscode(application_error: &ErrorType) -> StatusCode {
    match application_error {
        ErrorType::NotFound => StatusCode::NOT_FOUND,
        ErrorType::Validation => StatusCode::BAD_REQUEST,
        ErrorType::Initialization | ErrorType::DatabaseError | ErrorType::Aggregation | ErrorType::Rendering => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/**
 * Maps application errors to error codes. The code is logged, never shown.
 *
 * # Arguments
 * `application_error`: The type of error that occurred.
 *
 * # Returns
 * The corresponding error code.
 */
fn get_error_code(application_error: &ErrorType) -> u16 {
    match application_error {
        ErrorType::Initialization => 1001,
        ErrorType::DatabaseError => 1003,
        ErrorType::NotFound => 1004,
        ErrorType::Validation => 1005,
        ErrorType::Aggregation => 1006,
        ErrorType::Rendering => 1007,
    }
}
