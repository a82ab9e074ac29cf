use actix_web::{HttpResponse, get, http::header};

use crate::{
    api::views::{AboutTemplate, IndexTemplate, render},
    model::apperror::ApplicationError,
};

pub const REGIONS_LIST_PATH: &str = "/regions/regions";
pub const SALES_LIST_PATH: &str = "/sales/show_sales";
pub const REPORTS_PATH: &str = "/sales/reports";
pub const VISUALIZATION_PATH: &str = "/sales/visualization";

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found().insert_header((header::LOCATION, location)).finish()
}

#[get("/")]
pub async fn index() -> Result<HttpResponse, ApplicationError> {
    render(&IndexTemplate {})
}

#[get("/about")]
pub async fn about() -> Result<HttpResponse, ApplicationError> {
    render(&AboutTemplate {})
}

#[get("/sales")]
pub async fn sales() -> HttpResponse {
    redirect(SALES_LIST_PATH)
}

#[get("/reports")]
pub async fn reports() -> HttpResponse {
    redirect(REPORTS_PATH)
}

#[get("/visualization")]
pub async fn visualization() -> HttpResponse {
    redirect(VISUALIZATION_PATH)
}

#[get("/regions")]
pub async fn regions() -> HttpResponse {
    redirect(REGIONS_LIST_PATH)
}
