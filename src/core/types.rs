use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid {field}: {reason}")]
pub struct InvalidInputError {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidInputError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Typed projection input. Callers build this from whatever surface collects
/// the numbers; the core never sees form field names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionPlan {
    pub monthly_amount: f64,
    pub years: u32,
    pub annual_return_percent: f64,
    pub step_up_percent: Option<f64>,
}

impl ContributionPlan {
    pub fn level(monthly_amount: f64, years: u32, annual_return_percent: f64) -> Self {
        Self {
            monthly_amount,
            years,
            annual_return_percent,
            step_up_percent: None,
        }
    }

    pub fn step_up(
        monthly_amount: f64,
        years: u32,
        annual_return_percent: f64,
        step_up_percent: f64,
    ) -> Self {
        Self {
            monthly_amount,
            years,
            annual_return_percent,
            step_up_percent: Some(step_up_percent),
        }
    }

    pub fn schedule(&self) -> Schedule {
        match self.step_up_percent {
            Some(pct) if pct > 0.0 => Schedule::StepUp,
            _ => Schedule::Level,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Schedule {
    Level,
    StepUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub year: u32,
    pub monthly_contribution: f64,
    pub cumulative_contributed: f64,
    pub cumulative_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub schedule: Schedule,
    pub maturity_value: f64,
    pub total_contributed: f64,
    pub total_gains: f64,
    pub yearly_series: Vec<YearPoint>,
}

impl ProjectionResult {
    pub(crate) fn from_series(schedule: Schedule, yearly_series: Vec<YearPoint>) -> Self {
        let (total_contributed, maturity_value) = yearly_series
            .last()
            .map(|p| (p.cumulative_contributed, p.cumulative_value))
            .unwrap_or((0.0, 0.0));
        Self {
            schedule,
            maturity_value,
            total_contributed,
            total_gains: maturity_value - total_contributed,
            yearly_series,
        }
    }
}
