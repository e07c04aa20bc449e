use super::types::{ContributionPlan, InvalidInputError, ProjectionResult, Schedule, YearPoint};

pub const MONTHS_PER_YEAR: u32 = 12;
/// Longest horizon a plan may project over.
pub const MAX_PLAN_YEARS: u32 = 100;

/// Validates `plan` and projects it with the schedule it asks for: step-up when
/// a positive step-up percentage is present, level otherwise.
pub fn project(plan: &ContributionPlan) -> Result<ProjectionResult, InvalidInputError> {
    validate_plan(plan)?;
    Ok(match plan.schedule() {
        Schedule::Level => level_projection(plan),
        Schedule::StepUp => step_up_projection(plan),
    })
}

pub fn project_level_contribution(
    monthly_amount: f64,
    years: u32,
    annual_return_percent: f64,
) -> Result<ProjectionResult, InvalidInputError> {
    let plan = ContributionPlan::level(monthly_amount, years, annual_return_percent);
    validate_plan(&plan)?;
    Ok(level_projection(&plan))
}

/// Year one pays `initial_monthly_amount` exactly as given. Each later year
/// steps up from the previous year's amount and rounds to a whole currency
/// unit, never dropping below the previous year's amount.
pub fn project_step_up_contribution(
    initial_monthly_amount: f64,
    years: u32,
    annual_return_percent: f64,
    step_up_percent: f64,
) -> Result<ProjectionResult, InvalidInputError> {
    let plan = ContributionPlan::step_up(
        initial_monthly_amount,
        years,
        annual_return_percent,
        step_up_percent,
    );
    validate_plan(&plan)?;
    Ok(step_up_projection(&plan))
}

pub fn validate_plan(plan: &ContributionPlan) -> Result<(), InvalidInputError> {
    if !plan.monthly_amount.is_finite() {
        return Err(InvalidInputError::new(
            "monthlyAmount",
            "must be a finite number",
        ));
    }
    if plan.monthly_amount <= 0.0 {
        return Err(InvalidInputError::new("monthlyAmount", "must be > 0"));
    }

    if plan.years == 0 {
        return Err(InvalidInputError::new("years", "must be > 0"));
    }
    if plan.years > MAX_PLAN_YEARS {
        return Err(InvalidInputError::new(
            "years",
            format!("must be <= {MAX_PLAN_YEARS}"),
        ));
    }

    if !plan.annual_return_percent.is_finite() {
        return Err(InvalidInputError::new(
            "annualReturnPercent",
            "must be a finite number",
        ));
    }
    if plan.annual_return_percent < 0.0 {
        return Err(InvalidInputError::new("annualReturnPercent", "must be >= 0"));
    }

    if let Some(step_up) = plan.step_up_percent {
        if !step_up.is_finite() {
            return Err(InvalidInputError::new(
                "stepUpPercent",
                "must be a finite number",
            ));
        }
        if step_up < 0.0 {
            return Err(InvalidInputError::new("stepUpPercent", "must be >= 0"));
        }
    }

    Ok(())
}

pub(crate) fn monthly_rate(annual_return_percent: f64) -> f64 {
    annual_return_percent / 100.0 / MONTHS_PER_YEAR as f64
}

/// Future value of `months` equal payments made at the start of each month.
pub(crate) fn annuity_due_value(amount: f64, rate: f64, months: u64) -> f64 {
    if rate == 0.0 {
        return amount * months as f64;
    }
    amount * (((1.0 + rate).powf(months as f64) - 1.0) / rate) * (1.0 + rate)
}

fn level_projection(plan: &ContributionPlan) -> ProjectionResult {
    let rate = monthly_rate(plan.annual_return_percent);
    let series = (1..=plan.years)
        .map(|year| {
            let months = u64::from(year) * u64::from(MONTHS_PER_YEAR);
            YearPoint {
                year,
                monthly_contribution: plan.monthly_amount,
                cumulative_contributed: plan.monthly_amount * months as f64,
                cumulative_value: annuity_due_value(plan.monthly_amount, rate, months),
            }
        })
        .collect();
    ProjectionResult::from_series(Schedule::Level, series)
}

/// Monthly amount paid in each year of the plan. Year one pays the initial
/// amount as given; every later year steps up from the previous year's amount
/// and is rounded to a whole currency unit, so rounding carries forward.
/// Rounding never takes an amount below the previous year's, which keeps
/// sub-unit amounts from rounding down to nothing.
pub(crate) fn yearly_amounts(plan: &ContributionPlan) -> Vec<f64> {
    let growth = 1.0 + plan.step_up_percent.unwrap_or(0.0) / 100.0;
    let mut amounts = Vec::with_capacity(plan.years as usize);
    let mut current = plan.monthly_amount;
    for year in 1..=plan.years {
        if year > 1 && growth != 1.0 {
            current = (current * growth).round().max(current);
        }
        amounts.push(current);
    }
    amounts
}

fn step_up_projection(plan: &ContributionPlan) -> ProjectionResult {
    let rate = monthly_rate(plan.annual_return_percent);
    let months = u64::from(MONTHS_PER_YEAR);
    let year_growth = (1.0 + rate).powf(months as f64);

    let mut series = Vec::with_capacity(plan.years as usize);
    let mut contributed = 0.0;
    let mut value = 0.0;
    for (year, amount) in (1..=plan.years).zip(yearly_amounts(plan)) {
        // Earlier blocks keep compounding; this year's twelve payments are
        // valued at the end of the year they were made in.
        value = value * year_growth + annuity_due_value(amount, rate, months);
        contributed += amount * months as f64;
        series.push(YearPoint {
            year,
            monthly_contribution: amount,
            cumulative_contributed: contributed,
            cumulative_value: value,
        });
    }
    ProjectionResult::from_series(Schedule::StepUp, series)
}
