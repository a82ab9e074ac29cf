use chrono::NaiveDate;
use plotly::{Bar, Layout, Plot, common::Title, layout::Axis};
use polars::prelude::{AnyValue, DataFrame, IntoLazy, NamedFrom, PolarsResult, Series, SortMultipleOptions, col};
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Pool, Postgres};
use tracing::instrument;

use crate::{
    dao::sales::SalesDao,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{MONTH_FORMAT, MonthlyTotalType, RegionTotalType, ReportOutcome, SalesChartOutputType, SalesReportOutputType, SalesReportRowType, parse_sales_date},
    },
    service::acquire_connection,
};

pub const REPORT_ERROR_MESSAGE: &str = "Error: Unable to process data for reports. Please check your database and query.";
pub const CHART_ERROR_MESSAGE: &str = "Error generating visualization. Please check your data.";

const REGION_COLUMN: &str = "region";
const MONTH_COLUMN: &str = "month";
const AMOUNT_COLUMN: &str = "monthly_amount";
const TOTAL_COLUMN: &str = "total_amount";

const CHART_DIV_ID: &str = "total-sales-by-region";
const CHART_TITLE: &str = "Total Sales by Region";

/**
 * Read-only reporting over the sales data.
 *
 * Aggregation runs on a polars data frame holding one row per sales record. Amounts enter the frame as nullable
 * floats; a null amount does not contribute to a sum and a group without a single amount is dropped.
 */
pub struct ReportsService {
    /**
     * The DAO providing the report source rows.
     */
    sales_dao: SalesDao,
    /**
     * Optional connection pool for database operations. Optional for test purposes until we have a better way to mock the database.
     */
    connection_pool: Option<Pool<Postgres>>,
}

impl ReportsService {
    pub fn new(sales_dao: SalesDao, connection_pool: Option<Pool<Postgres>>) -> Self {
        ReportsService { sales_dao, connection_pool }
    }

    /**
     * Builds the sales report: totals per region, totals per month and the top region.
     *
     * # Returns
     * `ReportOutcome::NoData` when no sales data with a valid date exists, otherwise the report.
     */
    #[instrument(skip(self))]
    pub async fn get_sales_report(&self) -> Result<ReportOutcome<SalesReportOutputType>, ApplicationError> {
        let rows = self.get_report_rows().await?;
        Self::build_sales_report(&rows)
    }

    /**
     * Builds the bar chart of the total sales per region.
     *
     * # Returns
     * `ReportOutcome::NoData` when there is nothing to chart, otherwise the chart.
     */
    #[instrument(skip(self))]
    pub async fn get_sales_chart(&self) -> Result<ReportOutcome<SalesChartOutputType>, ApplicationError> {
        let rows = self.get_report_rows().await?;
        Self::build_sales_chart(&rows)
    }

    async fn get_report_rows(&self) -> Result<Vec<SalesReportRowType>, ApplicationError> {
        let mut connection = acquire_connection(&self.connection_pool).await?;
        let rows = self.sales_dao.get_sales_report_rows(&mut connection).await?;
        tracing::debug!("Loaded {} report rows", rows.len());
        Ok(rows)
    }

    /**
     * Aggregates report rows. Rows with an unparseable date are left out.
     *
     * # Arguments
     * `rows`: Sales data joined with region names.
     *
     * # Returns
     * The report, `ReportOutcome::NoData`, or an `Aggregation` error carrying a generic message.
     */
    pub fn build_sales_report(rows: &[SalesReportRowType]) -> Result<ReportOutcome<SalesReportOutputType>, ApplicationError> {
        let dated_rows: Vec<(&SalesReportRowType, NaiveDate)> = rows
            .iter()
            .filter_map(|row| match parse_sales_date(&row.date) {
                Some(date) => Some((row, date)),
                None => {
                    tracing::debug!("Skipping sales data {} with unparseable date {:?}", row.sales_data_id, row.date);
                    None
                }
            })
            .collect();
        if dated_rows.is_empty() {
            return Ok(ReportOutcome::NoData);
        }
        let aggregated = Self::aggregate_sales_report(&dated_rows).map_err(|err| {
            tracing::error!("Failed to aggregate sales report: {err}");
            ApplicationError::new(ErrorType::Aggregation, REPORT_ERROR_MESSAGE.to_string())
        })?;
        let (total_sales_by_region, monthly_sales_trend) = aggregated;
        let Some(top_region) = top_region(&total_sales_by_region) else {
            return Ok(ReportOutcome::NoData);
        };
        let top_region = top_region.region_name.clone();
        Ok(ReportOutcome::Ready(SalesReportOutputType { total_sales_by_region, monthly_sales_trend, top_region }))
    }

    /**
     * Aggregates report rows into one bar per region and renders the chart.
     *
     * # Arguments
     * `rows`: Sales data joined with region names.
     *
     * # Returns
     * The chart, `ReportOutcome::NoData`, or a `Rendering` error carrying a generic message.
     */
    pub fn build_sales_chart(rows: &[SalesReportRowType]) -> Result<ReportOutcome<SalesChartOutputType>, ApplicationError> {
        if rows.is_empty() {
            return Ok(ReportOutcome::NoData);
        }
        let regions: Vec<String> = rows.iter().map(|row| row.region_name.clone()).collect();
        let amounts: Vec<Option<f64>> = rows.iter().map(amount_as_f64).collect();
        Self::build_chart_from_amounts(regions, amounts)
    }

    /**
     * Sums the amounts per region and renders one bar per region. A region whose amounts are all null gets no bar.
     */
    fn build_chart_from_amounts(regions: Vec<String>, amounts: Vec<Option<f64>>) -> Result<ReportOutcome<SalesChartOutputType>, ApplicationError> {
        let bars = Self::aggregate_region_totals(regions, amounts).map_err(|err| {
            tracing::error!("Failed to aggregate sales for visualization: {err}");
            ApplicationError::new(ErrorType::Rendering, CHART_ERROR_MESSAGE.to_string())
        })?;
        if bars.is_empty() {
            tracing::debug!("No region has a numeric total, nothing to chart");
            return Ok(ReportOutcome::NoData);
        }
        let chart_html = render_bar_chart(&bars);
        Ok(ReportOutcome::Ready(SalesChartOutputType { bars, chart_html }))
    }

    fn aggregate_sales_report(dated_rows: &[(&SalesReportRowType, NaiveDate)]) -> PolarsResult<(Vec<RegionTotalType>, Vec<MonthlyTotalType>)> {
        let regions: Vec<String> = dated_rows.iter().map(|(row, _)| row.region_name.clone()).collect();
        let months: Vec<String> = dated_rows.iter().map(|(_, date)| date.format(MONTH_FORMAT).to_string()).collect();
        let amounts: Vec<Option<f64>> = dated_rows.iter().map(|(row, _)| amount_as_f64(row)).collect();
        let frame = DataFrame::new(vec![
            Series::new(REGION_COLUMN.into(), regions).into(),
            Series::new(MONTH_COLUMN.into(), months).into(),
            Series::new(AMOUNT_COLUMN.into(), amounts).into(),
        ])?;
        let total_sales_by_region = totals_by(&frame, REGION_COLUMN)?
            .into_iter()
            .map(|(region_name, total_amount)| RegionTotalType { region_name, total_amount })
            .collect();
        let monthly_sales_trend = totals_by(&frame, MONTH_COLUMN)?.into_iter().map(|(month, total_amount)| MonthlyTotalType { month, total_amount }).collect();
        Ok((total_sales_by_region, monthly_sales_trend))
    }

    fn aggregate_region_totals(regions: Vec<String>, amounts: Vec<Option<f64>>) -> PolarsResult<Vec<RegionTotalType>> {
        let frame = DataFrame::new(vec![Series::new(REGION_COLUMN.into(), regions).into(), Series::new(AMOUNT_COLUMN.into(), amounts).into()])?;
        Ok(totals_by(&frame, REGION_COLUMN)?
            .into_iter()
            .map(|(region_name, total_amount)| RegionTotalType { region_name, total_amount })
            .collect())
    }
}

/**
 * Coerces the amount of a row to a float. `None` when the amount has no finite float representation.
 */
fn amount_as_f64(row: &SalesReportRowType) -> Option<f64> {
    let amount = row.monthly_amount.to_f64().filter(|amount| amount.is_finite());
    if amount.is_none() {
        tracing::debug!("Sales data {} has an amount that is not numeric: {}", row.sales_data_id, row.monthly_amount);
    }
    amount
}

/**
 * Sums the amount column grouped by `key`. Null amounts are filtered out before grouping, so a group without any
 * amount does not appear.
 *
 * # Arguments
 * `frame`: Frame holding the `key` column and the amount column.
 * `key`: Name of the column to group by.
 *
 * # Returns
 * Pairs of group key and total, ordered by key.
 */
fn totals_by(frame: &DataFrame, key: &str) -> PolarsResult<Vec<(String, f64)>> {
    let totals = frame
        .clone()
        .lazy()
        .filter(col(AMOUNT_COLUMN).is_not_null())
        .group_by([col(key)])
        .agg([col(AMOUNT_COLUMN).sum().alias(TOTAL_COLUMN)])
        .sort_by_exprs([col(key)], SortMultipleOptions::default())
        .collect()?;
    let keys = totals.column(key)?;
    let amounts = totals.column(TOTAL_COLUMN)?;
    (0..totals.height())
        .map(|index| {
            let key = match keys.get(index)? {
                AnyValue::String(value) => value.to_string(),
                AnyValue::StringOwned(value) => value.to_string(),
                other => other.to_string(),
            };
            let amount = amounts.get(index)?.try_extract::<f64>()?;
            Ok((key, amount))
        })
        .collect()
}

/**
 * Picks the region with the highest total. `totals` is ordered by region name, so on a tie the first,
 * lexically smallest, region is kept.
 */
fn top_region(totals: &[RegionTotalType]) -> Option<&RegionTotalType> {
    totals.iter().fold(None, |top, candidate| match top {
        Some(current) if current.total_amount >= candidate.total_amount => Some(current),
        _ => Some(candidate),
    })
}

fn render_bar_chart(bars: &[RegionTotalType]) -> String {
    let region_names: Vec<String> = bars.iter().map(|bar| bar.region_name.clone()).collect();
    let totals: Vec<f64> = bars.iter().map(|bar| bar.total_amount).collect();
    let mut plot = Plot::new();
    plot.add_trace(Bar::new(region_names, totals).name("Total Sales"));
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(CHART_TITLE))
            .x_axis(Axis::new().title(Title::with_text("Region")))
            .y_axis(Axis::new().title(Title::with_text("Total Sales"))),
    );
    plot.to_inline_html(Some(CHART_DIV_ID))
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::*;

    fn row(sales_data_id: i64, amount: i64, date: &str, region_name: &str) -> SalesReportRowType {
        SalesReportRowType::new(sales_data_id, Decimal::new(amount, 0), date.to_string(), region_name.to_string())
    }

    fn region_total(region_name: &str, total_amount: f64) -> RegionTotalType {
        RegionTotalType { region_name: region_name.to_string(), total_amount }
    }

    fn month_total(month: &str, total_amount: f64) -> MonthlyTotalType {
        MonthlyTotalType { month: month.to_string(), total_amount }
    }

    fn ready<T>(outcome: ReportOutcome<T>) -> T {
        match outcome {
            ReportOutcome::Ready(value) => value,
            ReportOutcome::NoData => panic!("expected a report"),
        }
    }

    #[test]
    fn test_report_totals_for_single_region() {
        let rows = vec![row(1, 100, "2024-01-15", "R1"), row(2, 50, "2024-02-10", "R1")];
        let report = ready(ReportsService::build_sales_report(&rows).unwrap());
        assert_eq!(report.total_sales_by_region, vec![region_total("R1", 150.0)]);
        assert_eq!(report.monthly_sales_trend, vec![month_total("2024-01", 100.0), month_total("2024-02", 50.0)]);
        assert_eq!(report.top_region, "R1");
    }

    #[test]
    fn test_report_groups_regions_and_months() {
        let rows = vec![
            row(1, 100, "2024-03-01", "South"),
            row(2, 40, "2024-01-20", "North"),
            row(3, 70, "2024-01-05", "South"),
            row(4, 10, "2024-03-31", "North"),
        ];
        let report = ready(ReportsService::build_sales_report(&rows).unwrap());
        assert_eq!(report.total_sales_by_region, vec![region_total("North", 50.0), region_total("South", 170.0)]);
        assert_eq!(report.monthly_sales_trend, vec![month_total("2024-01", 110.0), month_total("2024-03", 110.0)]);
        assert_eq!(report.top_region, "South");
    }

    #[test]
    fn test_report_skips_unparseable_dates() {
        let rows = vec![row(1, 100, "2024-01-15", "R1"), row(2, 999, "someday", "R2"), row(3, 50, "2024/02/10", "R1")];
        let report = ready(ReportsService::build_sales_report(&rows).unwrap());
        assert_eq!(report.total_sales_by_region, vec![region_total("R1", 150.0)]);
        assert_eq!(report.monthly_sales_trend.len(), 2);
    }

    #[test]
    fn test_report_without_rows_has_no_data() {
        assert!(matches!(ReportsService::build_sales_report(&[]), Ok(ReportOutcome::NoData)));
    }

    #[test]
    fn test_report_with_only_unparseable_dates_has_no_data() {
        let rows = vec![row(1, 100, "not a date", "R1"), row(2, 50, "", "R2")];
        assert!(matches!(ReportsService::build_sales_report(&rows), Ok(ReportOutcome::NoData)));
    }

    #[test]
    fn test_top_region_tie_goes_to_smallest_name() {
        let rows = vec![row(1, 100, "2024-01-15", "West"), row(2, 100, "2024-01-16", "East"), row(3, 20, "2024-01-17", "North")];
        let report = ready(ReportsService::build_sales_report(&rows).unwrap());
        assert_eq!(report.top_region, "East");
    }

    #[test]
    fn test_top_region_of_empty_totals() {
        assert!(top_region(&[]).is_none());
    }

    #[test]
    fn test_report_keeps_decimal_amounts() {
        let rows = vec![
            SalesReportRowType::new(1, Decimal::new(1050, 2), "2024-01-15".to_string(), "R1".to_string()),
            SalesReportRowType::new(2, Decimal::new(-250, 2), "2024-01-20".to_string(), "R1".to_string()),
        ];
        let report = ready(ReportsService::build_sales_report(&rows).unwrap());
        assert_eq!(report.total_sales_by_region, vec![region_total("R1", 8.0)]);
    }

    #[test]
    fn test_chart_for_single_region_has_one_bar() {
        let rows = vec![row(1, 100, "2024-01-15", "R1"), row(2, 50, "not a date", "R1")];
        let chart = ready(ReportsService::build_sales_chart(&rows).unwrap());
        assert_eq!(chart.bars, vec![region_total("R1", 150.0)]);
        assert!(chart.chart_html.contains(CHART_DIV_ID));
        assert!(chart.chart_html.contains(CHART_TITLE));
        assert!(chart.chart_html.contains("R1"));
    }

    #[test]
    fn test_chart_bars_ordered_by_region() {
        let rows = vec![row(1, 5, "2024-01-15", "South"), row(2, 7, "2024-01-15", "North"), row(3, 1, "2024-01-15", "South")];
        let chart = ready(ReportsService::build_sales_chart(&rows).unwrap());
        assert_eq!(chart.bars, vec![region_total("North", 7.0), region_total("South", 6.0)]);
    }

    #[test]
    fn test_chart_with_only_null_amounts_has_no_data() {
        let regions = vec!["North".to_string(), "South".to_string()];
        assert!(matches!(ReportsService::build_chart_from_amounts(regions, vec![None, None]), Ok(ReportOutcome::NoData)));
    }

    #[test]
    fn test_chart_ignores_null_amounts() {
        let regions = vec!["North".to_string(), "North".to_string(), "South".to_string(), "West".to_string()];
        let amounts = vec![Some(10.0), None, Some(4.5), None];
        let chart = ready(ReportsService::build_chart_from_amounts(regions, amounts).unwrap());
        assert_eq!(chart.bars, vec![region_total("North", 10.0), region_total("South", 4.5)]);
    }

    #[test]
    fn test_totals_by_month_skips_null_amounts() {
        let frame = DataFrame::new(vec![
            Series::new(MONTH_COLUMN.into(), vec!["2024-02", "2024-01", "2024-01", "2024-03"]).into(),
            Series::new(AMOUNT_COLUMN.into(), vec![Some(5.0), Some(1.5), None, None]).into(),
        ])
        .unwrap();
        let totals = totals_by(&frame, MONTH_COLUMN).unwrap();
        assert_eq!(totals, vec![("2024-01".to_string(), 1.5), ("2024-02".to_string(), 5.0)]);
    }

    #[test]
    fn test_chart_without_rows_has_no_data() {
        assert!(matches!(ReportsService::build_sales_chart(&[]), Ok(ReportOutcome::NoData)));
    }
}
