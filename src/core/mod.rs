mod engine;
mod solver;
mod types;

pub use engine::{
    MAX_PLAN_YEARS, MONTHS_PER_YEAR, project, project_level_contribution,
    project_step_up_contribution, validate_plan,
};
pub use solver::{
    GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, solve_required_monthly_amount,
    solve_years_to_target,
};
pub use types::{ContributionPlan, InvalidInputError, ProjectionResult, Schedule, YearPoint};
