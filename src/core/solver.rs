use serde::Serialize;

use super::engine::{
    MAX_PLAN_YEARS, MONTHS_PER_YEAR, annuity_due_value, monthly_rate, project, validate_plan,
};
use super::types::{ContributionPlan, InvalidInputError, ProjectionResult, Schedule};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    RequiredMonthlyAmount,
    YearsToTarget,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub tolerance: f64,
    pub max_iterations: u32,
    pub max_years: u32,
}

impl Default for GoalSolveConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iterations: 100,
            max_years: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub maturity_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub target_amount: f64,
    pub solved_value: Option<f64>,
    pub projection: Option<ProjectionResult>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Smallest monthly amount (the initial one, for step-up plans) whose
/// projection over `years` reaches `target_amount`.
pub fn solve_required_monthly_amount(
    target_amount: f64,
    years: u32,
    annual_return_percent: f64,
    step_up_percent: Option<f64>,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, InvalidInputError> {
    validate_target(target_amount)?;
    validate_config(config)?;
    let base_plan = ContributionPlan {
        monthly_amount: 1.0,
        years,
        annual_return_percent,
        step_up_percent,
    };
    validate_plan(&base_plan)?;

    let mut iterations = Vec::new();
    let solved;
    let converged;
    let message;

    match base_plan.schedule() {
        Schedule::Level => {
            let months = u64::from(years) * u64::from(MONTHS_PER_YEAR);
            let per_unit = annuity_due_value(1.0, monthly_rate(annual_return_percent), months);
            solved = target_amount / per_unit;
            converged = true;
            message = "Solved required monthly amount.".to_string();
        }
        Schedule::StepUp => {
            // Any positive amount is a valid plan and paying the whole target
            // every month always overshoots, so the bracket holds the answer.
            let mut lo = 0.0;
            let mut hi = target_amount;
            let mut done = false;
            let mut it = 0;
            while it < config.max_iterations {
                it += 1;
                let mid = (lo + hi) * 0.5;
                let maturity_value = maturity_for(&base_plan, mid)?;
                iterations.push(GoalSolveIteration {
                    iteration: it,
                    lower_bound: lo,
                    upper_bound: hi,
                    candidate_value: mid,
                    maturity_value,
                });

                if maturity_value >= target_amount {
                    hi = mid;
                } else {
                    lo = mid;
                }

                if (hi - lo).abs() <= config.tolerance {
                    done = true;
                    break;
                }
            }
            solved = hi;
            converged = done;
            message = if converged {
                "Solved required initial monthly amount.".to_string()
            } else {
                "Reached max iterations before tolerance was met; returning best estimate."
                    .to_string()
            };
        }
    }

    let projection = project(&ContributionPlan {
        monthly_amount: solved,
        ..base_plan
    })?;

    Ok(GoalSolveResult {
        goal_type: GoalType::RequiredMonthlyAmount,
        target_amount,
        solved_value: Some(solved),
        projection: Some(projection),
        iterations,
        converged,
        feasible: true,
        message,
    })
}

/// Fewest whole years of contributions after which the projected value
/// reaches `target_amount`, searching up to `config.max_years`.
pub fn solve_years_to_target(
    target_amount: f64,
    monthly_amount: f64,
    annual_return_percent: f64,
    step_up_percent: Option<f64>,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, InvalidInputError> {
    validate_target(target_amount)?;
    validate_config(config)?;
    let longest = ContributionPlan {
        monthly_amount,
        years: config.max_years,
        annual_return_percent,
        step_up_percent,
    };

    // A plan's series reports value as of each year, which is exactly the
    // maturity of the same plan cut short at that year.
    let horizon = project(&longest)?;
    let reached = horizon
        .yearly_series
        .iter()
        .find(|point| point.cumulative_value >= target_amount)
        .map(|point| point.year);

    let Some(years) = reached else {
        return Ok(GoalSolveResult {
            goal_type: GoalType::YearsToTarget,
            target_amount,
            solved_value: None,
            projection: None,
            iterations: Vec::new(),
            converged: false,
            feasible: false,
            message: format!(
                "Target is not reached within {} years.",
                config.max_years
            ),
        });
    };

    let projection = project(&ContributionPlan { years, ..longest })?;
    Ok(GoalSolveResult {
        goal_type: GoalType::YearsToTarget,
        target_amount,
        solved_value: Some(f64::from(years)),
        projection: Some(projection),
        iterations: Vec::new(),
        converged: true,
        feasible: true,
        message: format!("Target is reached after {years} years."),
    })
}

fn maturity_for(plan: &ContributionPlan, monthly_amount: f64) -> Result<f64, InvalidInputError> {
    project(&ContributionPlan {
        monthly_amount,
        ..*plan
    })
    .map(|result| result.maturity_value)
}

fn validate_target(target_amount: f64) -> Result<(), InvalidInputError> {
    if !target_amount.is_finite() {
        return Err(InvalidInputError::new(
            "targetAmount",
            "must be a finite number",
        ));
    }
    if target_amount <= 0.0 {
        return Err(InvalidInputError::new("targetAmount", "must be > 0"));
    }
    Ok(())
}

fn validate_config(config: GoalSolveConfig) -> Result<(), InvalidInputError> {
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(InvalidInputError::new("tolerance", "must be > 0"));
    }
    if config.max_iterations == 0 {
        return Err(InvalidInputError::new("maxIterations", "must be > 0"));
    }
    if config.max_years == 0 {
        return Err(InvalidInputError::new("maxYears", "must be > 0"));
    }
    if config.max_years > MAX_PLAN_YEARS {
        return Err(InvalidInputError::new(
            "maxYears",
            format!("must be <= {MAX_PLAN_YEARS}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn level_required_amount_inverts_projection() {
        let result = solve_required_monthly_amount(
            2_323_390.763_519,
            10,
            12.0,
            None,
            GoalSolveConfig::default(),
        )
        .expect("must solve");

        assert_eq!(result.goal_type, GoalType::RequiredMonthlyAmount);
        assert!(result.feasible);
        assert!(result.converged);
        assert!(result.iterations.is_empty());
        assert_close(result.solved_value.expect("value expected"), 10_000.0, 1e-3);

        let projection = result.projection.expect("projection expected");
        assert_close(projection.maturity_value, 2_323_390.763_519, 1e-3);
    }

    #[test]
    fn level_required_amount_with_zero_return_divides_evenly() {
        let result =
            solve_required_monthly_amount(120_000.0, 5, 0.0, None, GoalSolveConfig::default())
                .expect("must solve");
        assert_close(result.solved_value.expect("value expected"), 2_000.0, 1e-9);
    }

    #[test]
    fn step_up_required_amount_bisects_to_smallest_amount() {
        let target = 476_409.93;
        let config = GoalSolveConfig::default();
        let result = solve_required_monthly_amount(target, 3, 12.0, Some(10.0), config)
            .expect("must solve");

        assert!(result.feasible);
        assert!(result.converged);
        assert!(!result.iterations.is_empty());
        let solved = result.solved_value.expect("value expected");
        assert_close(solved, 10_000.0, 0.05);

        let projection = result.projection.expect("projection expected");
        assert_eq!(projection.schedule, Schedule::StepUp);
        assert!(projection.maturity_value >= target);

        let below = maturity_for(
            &ContributionPlan::step_up(1.0, 3, 12.0, 10.0),
            solved - 2.0 * config.tolerance,
        )
        .expect("valid plan");
        assert!(below < target);
    }

    #[test]
    fn step_up_solver_reports_unconverged_when_iterations_run_out() {
        let config = GoalSolveConfig {
            max_iterations: 3,
            ..GoalSolveConfig::default()
        };
        let result = solve_required_monthly_amount(1_000_000.0, 10, 10.0, Some(5.0), config)
            .expect("must return result");
        assert!(result.feasible);
        assert!(!result.converged);
        assert_eq!(result.iterations.len(), 3);
        let projection = result.projection.expect("projection expected");
        assert!(projection.maturity_value >= 1_000_000.0);
    }

    #[test]
    fn years_to_target_finds_first_year_reaching_target() {
        let result = solve_years_to_target(
            2_000_000.0,
            10_000.0,
            12.0,
            None,
            GoalSolveConfig::default(),
        )
        .expect("must solve");

        assert_eq!(result.goal_type, GoalType::YearsToTarget);
        assert_eq!(result.solved_value, Some(10.0));
        let projection = result.projection.expect("projection expected");
        assert_eq!(projection.yearly_series.len(), 10);
        assert!(projection.maturity_value >= 2_000_000.0);

        let nine_years = project(&ContributionPlan::level(10_000.0, 9, 12.0)).expect("valid plan");
        assert!(nine_years.maturity_value < 2_000_000.0);
    }

    #[test]
    fn years_to_target_reports_infeasible_past_max_years() {
        let config = GoalSolveConfig {
            max_years: 5,
            ..GoalSolveConfig::default()
        };
        let result = solve_years_to_target(1e9, 1_000.0, 8.0, Some(5.0), config)
            .expect("must return result");
        assert!(!result.feasible);
        assert!(result.solved_value.is_none());
        assert!(result.projection.is_none());
        assert!(result.message.contains("5 years"));
    }

    #[test]
    fn solver_rejects_invalid_inputs_by_field() {
        let config = GoalSolveConfig::default();
        let err = solve_required_monthly_amount(0.0, 10, 12.0, None, config)
            .expect_err("zero target");
        assert_eq!(err.field, "targetAmount");

        let err = solve_required_monthly_amount(1_000.0, 0, 12.0, None, config)
            .expect_err("zero years");
        assert_eq!(err.field, "years");

        let err = solve_years_to_target(1_000.0, 0.0, 12.0, None, config)
            .expect_err("zero monthly amount");
        assert_eq!(err.field, "monthlyAmount");

        let err = solve_years_to_target(
            1_000.0,
            100.0,
            12.0,
            None,
            GoalSolveConfig {
                max_years: 0,
                ..config
            },
        )
        .expect_err("zero max years");
        assert_eq!(err.field, "maxYears");

        let err = solve_years_to_target(
            1_000.0,
            100.0,
            12.0,
            None,
            GoalSolveConfig {
                max_years: MAX_PLAN_YEARS + 1,
                ..config
            },
        )
        .expect_err("max years beyond cap");
        assert_eq!(err.field, "maxYears");
    }
}
