mod compare;
mod estimator;
mod freshness;
mod policy;
mod resolver;
mod sanitize;
mod summary;
mod types;

pub use compare::ComparisonSelection;
pub use estimator::{estimate, estimate_with_policy};
pub use freshness::{FetchGuard, RequestFingerprint};
pub use policy::CostPolicy;
pub use resolver::{
    resolve_food, resolve_food_with_policy, resolve_housing, resolve_housing_with_policy,
    resolve_transit, resolve_transit_with_policy, resolve_tuition,
};
pub use sanitize::scenario_from_value;
pub use summary::{ScenarioEstimate, build_summary, format_currency};
pub use types::{
    BudgetBreakdown, BudgetScenario, DEFAULT_MISC_PERCENT, Housing, LocationCostRecord,
    MAX_ROOMMATES, MIN_ROOMMATES, MealPlan, ProgramPricing, Residency, SavedScenario, Transit,
};
