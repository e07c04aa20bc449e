use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    ContributionPlan, GoalSolveConfig, GoalSolveResult, InvalidInputError, MAX_PLAN_YEARS,
    ProjectionResult, Schedule, project, solve_required_monthly_amount, solve_years_to_target, validate_plan,
};

mod chart;
mod error;
mod format;

pub use chart::{ChartData, ChartSeries};
pub use error::ApiError;
pub use format::{format_compact_inr, format_inr, format_percentage};

pub const DEFAULT_PORT: u16 = 8080;

/// A numeric form field as the browser may send it: a JSON number, or the
/// raw text of an input element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly_amount: Option<FieldValue>,
    years: Option<FieldValue>,
    annual_return_percent: Option<FieldValue>,
    step_up_percent: Option<FieldValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    target_amount: Option<FieldValue>,
    annual_return_percent: Option<FieldValue>,
    step_up_percent: Option<FieldValue>,
    years: Option<FieldValue>,
    monthly_amount: Option<FieldValue>,
    max_years: Option<FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GoalRequest {
    RequiredMonthlyAmount {
        target_amount: f64,
        years: u32,
        annual_return_percent: f64,
        step_up_percent: Option<f64>,
    },
    YearsToTarget {
        target_amount: f64,
        monthly_amount: f64,
        annual_return_percent: f64,
        step_up_percent: Option<f64>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "sipcalc",
    about = "SIP projection calculator (level and annual step-up monthly contributions)"
)]
struct Cli {
    #[arg(long, help = "Monthly contribution (initial amount for step-up plans)")]
    monthly_amount: f64,
    #[arg(long, help = "Contribution horizon in whole years")]
    years: u32,
    #[arg(long, help = "Expected annual return in percent, e.g. 12")]
    annual_return: f64,
    #[arg(
        long,
        help = "Yearly increase of the monthly contribution in percent, e.g. 10"
    )]
    step_up: Option<f64>,
    #[arg(
        long,
        help = "Target corpus; also solves the monthly amount needed to reach it"
    )]
    target: Option<f64>,
    #[arg(long, default_value_t = false, help = "Print the JSON API response body")]
    json: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanSummary {
    monthly_amount: f64,
    years: u32,
    annual_return_percent: f64,
    step_up_percent: Option<f64>,
}

impl From<&ContributionPlan> for PlanSummary {
    fn from(plan: &ContributionPlan) -> Self {
        Self {
            monthly_amount: plan.monthly_amount,
            years: plan.years,
            annual_return_percent: plan.annual_return_percent,
            step_up_percent: plan.step_up_percent,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    plan: PlanSummary,
    #[serde(flatten)]
    projection: ProjectionResult,
    chart: ChartData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalResponse {
    #[serde(flatten)]
    result: GoalSolveResult,
    chart: Option<ChartData>,
}

#[derive(Debug, Serialize)]
struct CliJsonOutput {
    projection: ProjectionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal: Option<GoalResponse>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn optional_number(
    value: Option<FieldValue>,
    field: &'static str,
) -> Result<Option<f64>, InvalidInputError> {
    match value {
        None => Ok(None),
        Some(FieldValue::Number(v)) => Ok(Some(v)),
        Some(FieldValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| InvalidInputError::new(field, format!("must be a number, got {text:?}")))
        }
    }
}

fn required_number(
    value: Option<FieldValue>,
    field: &'static str,
) -> Result<f64, InvalidInputError> {
    optional_number(value, field)?.ok_or_else(|| InvalidInputError::new(field, "is required"))
}

fn whole_years(value: f64, field: &'static str) -> Result<u32, InvalidInputError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(InvalidInputError::new(field, "must be a whole number of years"));
    }
    if value <= 0.0 {
        return Err(InvalidInputError::new(field, "must be > 0"));
    }
    if value > f64::from(MAX_PLAN_YEARS) {
        return Err(InvalidInputError::new(
            field,
            format!("must be <= {MAX_PLAN_YEARS}"),
        ));
    }
    Ok(value as u32)
}

fn plan_from_payload(payload: SipPayload) -> Result<ContributionPlan, InvalidInputError> {
    let monthly_amount = required_number(payload.monthly_amount, "monthlyAmount")?;
    let years = whole_years(required_number(payload.years, "years")?, "years")?;
    let annual_return_percent =
        required_number(payload.annual_return_percent, "annualReturnPercent")?;
    let step_up_percent = optional_number(payload.step_up_percent, "stepUpPercent")?;

    let plan = ContributionPlan {
        monthly_amount,
        years,
        annual_return_percent,
        step_up_percent,
    };
    validate_plan(&plan)?;
    Ok(plan)
}

fn goal_from_payload(
    payload: GoalPayload,
) -> Result<(GoalRequest, GoalSolveConfig), InvalidInputError> {
    let target_amount = required_number(payload.target_amount, "targetAmount")?;
    let annual_return_percent =
        required_number(payload.annual_return_percent, "annualReturnPercent")?;
    let step_up_percent = optional_number(payload.step_up_percent, "stepUpPercent")?;
    let years = optional_number(payload.years, "years")?;
    let monthly_amount = optional_number(payload.monthly_amount, "monthlyAmount")?;

    let mut config = GoalSolveConfig::default();
    if let Some(max_years) = optional_number(payload.max_years, "maxYears")? {
        config.max_years = whole_years(max_years, "maxYears")?;
    }

    let request = match (years, monthly_amount) {
        (Some(years), None) => GoalRequest::RequiredMonthlyAmount {
            target_amount,
            years: whole_years(years, "years")?,
            annual_return_percent,
            step_up_percent,
        },
        (None, Some(monthly_amount)) => GoalRequest::YearsToTarget {
            target_amount,
            monthly_amount,
            annual_return_percent,
            step_up_percent,
        },
        (Some(_), Some(_)) => {
            return Err(InvalidInputError::new(
                "years",
                "provide either years or monthlyAmount, not both",
            ));
        }
        (None, None) => {
            return Err(InvalidInputError::new(
                "years",
                "years or monthlyAmount is required",
            ));
        }
    };
    Ok((request, config))
}

fn solve_goal_request(
    request: GoalRequest,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, InvalidInputError> {
    match request {
        GoalRequest::RequiredMonthlyAmount {
            target_amount,
            years,
            annual_return_percent,
            step_up_percent,
        } => solve_required_monthly_amount(
            target_amount,
            years,
            annual_return_percent,
            step_up_percent,
            config,
        ),
        GoalRequest::YearsToTarget {
            target_amount,
            monthly_amount,
            annual_return_percent,
            step_up_percent,
        } => solve_years_to_target(
            target_amount,
            monthly_amount,
            annual_return_percent,
            step_up_percent,
            config,
        ),
    }
}

fn build_projection_response(plan: &ContributionPlan) -> Result<ProjectionResponse, ApiError> {
    let projection = project(plan)?;
    let chart = ChartData::from(&projection);
    Ok(ProjectionResponse {
        plan: plan.into(),
        projection,
        chart,
    })
}

fn build_goal_response(result: GoalSolveResult) -> GoalResponse {
    let chart = result.projection.as_ref().map(ChartData::from);
    GoalResponse { result, chart }
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/sip", get(sip_get_handler).post(sip_post_handler))
        .route(
            "/api/sip/goal",
            get(goal_get_handler).post(goal_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "SIP projection API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn sip_get_handler(payload: Result<Query<SipPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => sip_handler_impl(payload),
        Err(rejection) => ApiError::MalformedPayload(rejection.body_text()).into_response(),
    }
}

async fn sip_post_handler(payload: Result<Json<SipPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => sip_handler_impl(payload),
        Err(rejection) => ApiError::MalformedPayload(rejection.body_text()).into_response(),
    }
}

async fn goal_get_handler(payload: Result<Query<GoalPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => goal_handler_impl(payload),
        Err(rejection) => ApiError::MalformedPayload(rejection.body_text()).into_response(),
    }
}

async fn goal_post_handler(payload: Result<Json<GoalPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => goal_handler_impl(payload),
        Err(rejection) => ApiError::MalformedPayload(rejection.body_text()).into_response(),
    }
}

fn sip_handler_impl(payload: SipPayload) -> Response {
    tracing::debug!(?payload, "projection request");
    let response = plan_from_payload(payload)
        .map_err(ApiError::from)
        .and_then(|plan| build_projection_response(&plan));
    match response {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => err.into_response(),
    }
}

fn goal_handler_impl(payload: GoalPayload) -> Response {
    tracing::debug!(?payload, "goal request");
    let response = goal_from_payload(payload)
        .and_then(|(request, config)| solve_goal_request(request, config));
    match response {
        Ok(result) => json_response(StatusCode::OK, build_goal_response(result)),
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Parses CLI flags from the process arguments and renders the projection.
pub fn run_cli() -> Result<String, ApiError> {
    render_cli(&Cli::parse())
}

fn plan_from_cli(cli: &Cli) -> Result<ContributionPlan, InvalidInputError> {
    let plan = ContributionPlan {
        monthly_amount: cli.monthly_amount,
        years: cli.years,
        annual_return_percent: cli.annual_return,
        step_up_percent: cli.step_up,
    };
    validate_plan(&plan)?;
    Ok(plan)
}

fn render_cli(cli: &Cli) -> Result<String, ApiError> {
    let plan = plan_from_cli(cli)?;
    tracing::debug!(?plan, "projecting from command line");

    let goal = match cli.target {
        Some(target) => Some(solve_required_monthly_amount(
            target,
            plan.years,
            plan.annual_return_percent,
            plan.step_up_percent,
            GoalSolveConfig::default(),
        )?),
        None => None,
    };

    if cli.json {
        let output = CliJsonOutput {
            projection: build_projection_response(&plan)?,
            goal: goal.map(build_goal_response),
        };
        let mut json = serde_json::to_string_pretty(&output)?;
        json.push('\n');
        return Ok(json);
    }

    let projection = project(&plan)?;
    let mut out = render_projection_table(&plan, &projection);
    if let Some(goal) = goal {
        if let Some(amount) = goal.solved_value {
            let label = match plan.schedule() {
                Schedule::Level => "Required monthly amount",
                Schedule::StepUp => "Required initial monthly amount",
            };
            let _ = writeln!(
                out,
                "{label} for {}: {}",
                format_inr(goal.target_amount),
                format_inr(amount)
            );
        }
    }
    Ok(out)
}

fn render_projection_table(plan: &ContributionPlan, result: &ProjectionResult) -> String {
    let mut out = String::new();
    let schedule = match result.schedule {
        Schedule::Level => "level".to_string(),
        Schedule::StepUp => format!(
            "step-up {}",
            format_percentage(plan.step_up_percent.unwrap_or(0.0))
        ),
    };
    let _ = writeln!(
        out,
        "SIP projection: {} over {} years at {} ({schedule})",
        format_inr(plan.monthly_amount),
        plan.years,
        format_percentage(plan.annual_return_percent),
    );
    let _ = writeln!(
        out,
        "{:>4}  {:>14}  {:>16}  {:>16}",
        "Year", "Monthly", "Contributed", "Value"
    );
    for point in &result.yearly_series {
        let _ = writeln!(
            out,
            "{:>4}  {:>14}  {:>16}  {:>16}",
            point.year,
            format_inr(point.monthly_contribution),
            format_inr(point.cumulative_contributed),
            format_inr(point.cumulative_value),
        );
    }
    let _ = writeln!(
        out,
        "Total contributed: {} ({})",
        format_inr(result.total_contributed),
        format_compact_inr(result.total_contributed)
    );
    let _ = writeln!(
        out,
        "Maturity value:    {} ({})",
        format_inr(result.maturity_value),
        format_compact_inr(result.maturity_value)
    );
    let _ = writeln!(
        out,
        "Total gains:       {} ({})",
        format_inr(result.total_gains),
        format_compact_inr(result.total_gains)
    );
    out
}

#[cfg(test)]
fn sip_payload_from_json(json: &str) -> Result<SipPayload, String> {
    serde_json::from_str::<SipPayload>(json).map_err(|e| format!("Invalid API JSON payload: {e}"))
}
