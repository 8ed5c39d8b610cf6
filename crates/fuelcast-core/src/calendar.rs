//! Calendar labelling of forecast steps and per-year aggregation.

use crate::error::{ForecastError, Result};
use crate::forecast::{ForecastPoint, FORECAST_DECIMALS};
use crate::metrics::round_to;
use chrono::{Datelike, Months, NaiveDate};

/// A forecast step tagged with its calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DatedForecastPoint {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    pub predicted: f64,
    pub lower95: f64,
    pub upper95: f64,
}

impl DatedForecastPoint {
    /// `YYYY-MM` label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Aggregate of the forecast steps falling in one calendar year.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct YearlySummary {
    pub year: i32,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub low95: f64,
    pub high95: f64,
    pub month_count: usize,
}

/// Tag step `i` with the month `i + 1` months after `last_observed`.
///
/// Only the year and month of `last_observed` matter.
pub fn label_forecast(
    points: &[ForecastPoint],
    last_observed: NaiveDate,
) -> Result<Vec<DatedForecastPoint>> {
    let anchor = last_observed.with_day(1).ok_or_else(|| {
        ForecastError::InvalidInput(format!("cannot anchor {last_observed} to month start"))
    })?;

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let date = u32::try_from(i + 1)
                .ok()
                .and_then(|m| anchor.checked_add_months(Months::new(m)))
                .ok_or_else(|| {
                    ForecastError::InvalidInput(format!(
                        "forecast step {i} overflows the calendar"
                    ))
                })?;
            Ok(DatedForecastPoint {
                year: date.year(),
                month: date.month(),
                predicted: p.predicted,
                lower95: p.lower95,
                upper95: p.upper95,
            })
        })
        .collect()
}

/// One summary row per calendar year, in order of first appearance.
pub fn yearly_summary(points: &[DatedForecastPoint]) -> Vec<YearlySummary> {
    let mut groups: Vec<(i32, Vec<&DatedForecastPoint>)> = Vec::new();
    for p in points {
        match groups.iter_mut().find(|(year, _)| *year == p.year) {
            Some((_, members)) => members.push(p),
            None => groups.push((p.year, vec![p])),
        }
    }

    groups
        .into_iter()
        .map(|(year, members)| {
            let count = members.len();
            let mut sum = 0.0;
            let mut min_price = f64::INFINITY;
            let mut max_price = f64::NEG_INFINITY;
            let mut low95 = f64::INFINITY;
            let mut high95 = f64::NEG_INFINITY;
            for p in &members {
                sum += p.predicted;
                min_price = min_price.min(p.predicted);
                max_price = max_price.max(p.predicted);
                low95 = low95.min(p.lower95);
                high95 = high95.max(p.upper95);
            }
            YearlySummary {
                year,
                avg_price: round_to(sum / count as f64, FORECAST_DECIMALS),
                min_price: round_to(min_price, FORECAST_DECIMALS),
                max_price: round_to(max_price, FORECAST_DECIMALS),
                low95: round_to(low95, FORECAST_DECIMALS),
                high95: round_to(high95, FORECAST_DECIMALS),
                month_count: count,
            }
        })
        .collect()
}
