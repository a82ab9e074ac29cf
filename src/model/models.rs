use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/**
 * Formats accepted for a plain sales date.
 */
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

/**
 * Formats accepted for a sales date carrying a time of day. The time is discarded.
 */
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/**
 * Decimal places stored for an amount.
 */
const AMOUNT_SCALE: u32 = 2;

/**
 * Upper bound (exclusive) of an amount's absolute value, 12 integer digits.
 */
const MAX_AMOUNT_EXCLUSIVE: i64 = 1_000_000_000_000;

/**
 * Format used when a sales date is stored.
 */
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/**
 * Format of the month bucket used in the monthly trend.
 */
pub const MONTH_FORMAT: &str = "%Y-%m";

/***************** Regions *********************/

/**
 * A named sales territory.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDetailType {
    pub region_id: i64,
    pub region_name: String,
}

impl RegionDetailType {
    pub fn new(region_id: i64, region_name: String) -> Self {
        RegionDetailType { region_id, region_name }
    }
}

/**
 * Input for adding or updating a region. The name is taken as-is.
 */
#[derive(Debug, Clone)]
pub struct RegionAddUpdateInputType {
    pub region_name: String,
}

/***************** Sales data *********************/

/**
 * A monthly sales figure as shown in the sales list.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataDetailType {
    pub sales_data_id: i64,
    pub monthly_amount: Decimal,
    pub date: String,
    pub region: i64,
    /**
     * Name of the referenced region. `None` when the region has been deleted.
     */
    pub region_name: Option<String>,
}

impl SalesDataDetailType {
    pub fn new(sales_data_id: i64, monthly_amount: Decimal, date: String, region: i64, region_name: Option<String>) -> Self {
        SalesDataDetailType { sales_data_id, monthly_amount, date, region, region_name }
    }
}

/**
 * Validated input for adding or updating sales data.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataAddUpdateInputType {
    pub monthly_amount: Decimal,
    pub date: NaiveDate,
    pub region: i64,
}

/***************** Reports *********************/

/**
 * A sales record joined with the display name of its region.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReportRowType {
    pub sales_data_id: i64,
    pub monthly_amount: Decimal,
    pub date: String,
    pub region_name: String,
}

impl SalesReportRowType {
    pub fn new(sales_data_id: i64, monthly_amount: Decimal, date: String, region_name: String) -> Self {
        SalesReportRowType { sales_data_id, monthly_amount, date, region_name }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionTotalType {
    pub region_name: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotalType {
    /**
     * Month bucket formatted as `YYYY-MM`.
     */
    pub month: String,
    pub total_amount: f64,
}

/**
 * Aggregated sales report.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReportOutputType {
    /**
     * Totals per region, ordered by region name.
     */
    pub total_sales_by_region: Vec<RegionTotalType>,
    /**
     * Totals per calendar month, ordered by month.
     */
    pub monthly_sales_trend: Vec<MonthlyTotalType>,
    /**
     * Region with the highest total. Ties go to the lexically smallest name.
     */
    pub top_region: String,
}

/**
 * Bar chart of the total sales per region.
 */
#[derive(Debug, Clone)]
pub struct SalesChartOutputType {
    /**
     * One entry per bar, ordered by region name.
     */
    pub bars: Vec<RegionTotalType>,
    /**
     * Self-contained html fragment with the rendered chart.
     */
    pub chart_html: String,
}

/**
 * Outcome of a report. An empty data set is a terminal answer and not an error.
 */
#[derive(Debug, Clone)]
pub enum ReportOutcome<T> {
    NoData,
    Ready(T),
}

/***************** Parsing *********************/

/**
 * Parses a sales date using the accepted date formats.
 *
 * # Arguments
 * `value`: The date as entered by the user or stored in the database.
 *
 * # Returns
 * The parsed date or `None` if no format matches.
 */
pub fn parse_sales_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| DATE_TIME_FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(value, format).ok().map(|date_time| date_time.date())))
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|date_time| date_time.date_naive()))
}

/**
 * Parses a monthly amount. The amount is rounded to cents and must fit the stored `NUMERIC(14,2)`.
 *
 * # Arguments
 * `value`: The amount as entered by the user.
 *
 * # Returns
 * The parsed amount or `None` if the value is not a number or out of range.
 */
pub fn parse_monthly_amount(value: &str) -> Option<Decimal> {
    let amount = Decimal::from_str(value.trim()).ok()?.round_dp(AMOUNT_SCALE);
    (amount.abs() < Decimal::from(MAX_AMOUNT_EXCLUSIVE)).then_some(amount)
}
