use actix_web::{
    HttpRequest, HttpResponse, get, post,
    web::{self, Path},
};
use tracing::{Instrument, instrument};

use crate::{
    api::{
        middleware::get_trace_id,
        navigation::{REGIONS_LIST_PATH, SALES_LIST_PATH},
        notice::{Notice, clear_notice, pending_notice, redirect_with_notice},
        state::AppState,
        views::{AddRegionTemplate, AddSalesDataTemplate, EditRegionTemplate, EditSalesDataTemplate, RegionForm, RegionsTemplate, SalesDataForm, SalesDataTemplate, render},
    },
    model::{
        apperror::ApplicationError,
        models::{RegionAddUpdateInputType, SalesDataAddUpdateInputType},
    },
};

/***************** Regions *********************/

/**
 * Lists all regions.
 */
#[instrument(skip(http_request, app_state), fields(service = "listRegions", trace_id = get_trace_id(&http_request)))]
#[get("/regions")]
pub async fn regions_list(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let regions = app_state.regions_service.get_region_list().instrument(span).await?;
    let notice = pending_notice(&http_request).map(Notice::message);
    let mut response = render(&RegionsTemplate { regions, notice })?;
    clear_notice(&http_request, &mut response);
    Ok(response)
}

/**
 * Form for adding a region.
 */
#[get("/add_region")]
pub async fn region_add_form() -> Result<HttpResponse, ApplicationError> {
    render(&AddRegionTemplate {})
}

/**
 * Adds a region. The name is taken as entered.
 */
#[instrument(skip(http_request, app_state), fields(service = "addRegion", trace_id = get_trace_id(&http_request)))]
#[post("/add_region")]
pub async fn region_add(http_request: HttpRequest, form: web::Form<RegionForm>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let region_add_input = RegionAddUpdateInputType::from(form.into_inner());
    let region_id = app_state.regions_service.add_region(region_add_input).instrument(span).await?;
    tracing::info!("Added region {}", region_id);
    Ok(redirect_with_notice(REGIONS_LIST_PATH, Notice::RegionAdded))
}

/**
 * Form for editing a region, filled with its current name.
 */
#[instrument(skip(http_request, app_state), fields(service = "getRegion", trace_id = get_trace_id(&http_request)))]
#[get("/edit_region/{region_id}")]
pub async fn region_edit_form(path: Path<i64>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let region = app_state.regions_service.get_region(path.into_inner()).instrument(span).await?;
    render(&EditRegionTemplate { region })
}

/**
 * Updates the name of a region.
 */
#[instrument(skip(http_request, app_state), fields(service = "updateRegion", trace_id = get_trace_id(&http_request)))]
#[post("/edit_region/{region_id}")]
pub async fn region_update(path: Path<i64>, http_request: HttpRequest, form: web::Form<RegionForm>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let region_update_input = RegionAddUpdateInputType::from(form.into_inner());
    app_state.regions_service.update_region(path.into_inner(), region_update_input).instrument(span).await?;
    Ok(redirect_with_notice(REGIONS_LIST_PATH, Notice::RegionUpdated))
}

/**
 * Deletes a region. Its sales data stays.
 */
#[instrument(skip(http_request, app_state), fields(service = "deleteRegion", trace_id = get_trace_id(&http_request)))]
#[post("/delete_region/{region_id}")]
pub async fn region_delete(path: Path<i64>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    app_state.regions_service.delete_region(path.into_inner()).instrument(span).await?;
    Ok(redirect_with_notice(REGIONS_LIST_PATH, Notice::RegionDeleted))
}

/***************** Sales data *********************/

/**
 * Lists all sales data with edit and delete controls per row.
 */
#[instrument(skip(http_request, app_state), fields(service = "listSalesData", trace_id = get_trace_id(&http_request)))]
#[get("/show_sales")]
pub async fn sales_data_list(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let sales_data = app_state.sales_service.get_sales_data_list().instrument(span).await?;
    let notice = pending_notice(&http_request).map(Notice::message);
    let mut response = render(&SalesDataTemplate { sales_data, notice })?;
    clear_notice(&http_request, &mut response);
    Ok(response)
}

/**
 * Form for adding sales data.
 */
#[instrument(skip(http_request, app_state), fields(service = "addSalesDataForm", trace_id = get_trace_id(&http_request)))]
#[get("/add_sales_data")]
pub async fn sales_data_add_form(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let regions = app_state.regions_service.get_region_list().instrument(span).await?;
    render(&AddSalesDataTemplate { regions })
}

/**
 * Adds sales data. Amount, date and region are validated first.
 */
#[instrument(skip(http_request, app_state), fields(service = "addSalesData", trace_id = get_trace_id(&http_request)))]
#[post("/add_sales_data")]
pub async fn sales_data_add(http_request: HttpRequest, form: web::Form<SalesDataForm>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let sales_data_add_input = SalesDataAddUpdateInputType::try_from(form.into_inner())?;
    let sales_data_id = app_state.sales_service.add_sales_data(sales_data_add_input).instrument(span).await?;
    tracing::info!("Added sales data {}", sales_data_id);
    Ok(redirect_with_notice(SALES_LIST_PATH, Notice::SalesDataAdded))
}

/**
 * Form for editing sales data.
 */
#[instrument(skip(http_request, app_state), fields(service = "getSalesData", trace_id = get_trace_id(&http_request)))]
#[get("/edit_sales_data/{sales_data_id}")]
pub async fn sales_data_edit_form(path: Path<i64>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let sales_data = app_state.sales_service.get_sales_data(path.into_inner()).instrument(span.clone()).await?;
    let regions = app_state.regions_service.get_region_list().instrument(span).await?;
    render(&EditSalesDataTemplate { sales_data, regions })
}

/**
 * Updates sales data.
 */
#[instrument(skip(http_request, app_state), fields(service = "updateSalesData", trace_id = get_trace_id(&http_request)))]
#[post("/edit_sales_data/{sales_data_id}")]
pub async fn sales_data_update(path: Path<i64>, http_request: HttpRequest, form: web::Form<SalesDataForm>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let sales_data_update_input = SalesDataAddUpdateInputType::try_from(form.into_inner())?;
    app_state.sales_service.update_sales_data(path.into_inner(), sales_data_update_input).instrument(span).await?;
    Ok(redirect_with_notice(SALES_LIST_PATH, Notice::SalesDataUpdated))
}

/**
 * Deletes sales data.
 */
#[instrument(skip(http_request, app_state), fields(service = "deleteSalesData", trace_id = get_trace_id(&http_request)))]
#[post("/delete_sales_data/{sales_data_id}")]
pub async fn sales_data_delete(path: Path<i64>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    app_state.sales_service.delete_sales_data(path.into_inner()).instrument(span).await?;
    Ok(redirect_with_notice(SALES_LIST_PATH, Notice::SalesDataDeleted))
}
