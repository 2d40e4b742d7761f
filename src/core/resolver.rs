use super::policy::CostPolicy;
use super::types::{
    BudgetScenario, Housing, LocationCostRecord, MealPlan, ProgramPricing, Residency, Transit,
};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Missing, NaN and infinite values are all "absent".
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn positive(value: Option<f64>) -> Option<f64> {
    present(value).filter(|v| *v > 0.0)
}

fn cost_field(
    cost: Option<&LocationCostRecord>,
    field: impl Fn(&LocationCostRecord) -> Option<f64>,
) -> Option<f64> {
    present(cost.and_then(field))
}

fn annualize(monthly: f64) -> f64 {
    monthly * MONTHS_PER_YEAR
}

pub fn resolve_tuition(pricing: &ProgramPricing, residency: Residency) -> f64 {
    let by_residency = match residency {
        Residency::InState => pricing.in_state_tuition,
        Residency::OutOfState => pricing.out_state_tuition,
    };
    present(by_residency)
        .or_else(|| present(pricing.net_price))
        .unwrap_or(0.0)
}

pub fn resolve_housing(
    pricing: &ProgramPricing,
    scenario: &BudgetScenario,
    cost: Option<&LocationCostRecord>,
) -> f64 {
    resolve_housing_with_policy(&CostPolicy::DEFAULT, pricing, scenario, cost)
}

pub fn resolve_housing_with_policy(
    policy: &CostPolicy,
    pricing: &ProgramPricing,
    scenario: &BudgetScenario,
    cost: Option<&LocationCostRecord>,
) -> f64 {
    let rent_small = || {
        annualize(
            cost_field(cost, |c| c.rent_small).unwrap_or(policy.default_rent_small_monthly),
        )
    };

    match scenario.housing {
        Housing::OnCampus => positive(pricing.academic_year_cost)
            .or_else(|| positive(pricing.program_year_cost))
            .map(|attendance| attendance * policy.on_campus_housing_share)
            .unwrap_or_else(rent_small),
        Housing::OffSingle => rent_small(),
        Housing::OffShared => {
            let rent_large =
                cost_field(cost, |c| c.rent_large).unwrap_or(policy.default_rent_large_monthly);
            annualize(rent_large) / f64::from(scenario.roommates.max(1))
        }
    }
}

pub fn resolve_food(scenario: &BudgetScenario, cost: Option<&LocationCostRecord>) -> f64 {
    resolve_food_with_policy(&CostPolicy::DEFAULT, scenario, cost)
}

pub fn resolve_food_with_policy(
    policy: &CostPolicy,
    scenario: &BudgetScenario,
    cost: Option<&LocationCostRecord>,
) -> f64 {
    match scenario.meal_plan {
        MealPlan::Campus => policy.campus_meal_plan_annual,
        MealPlan::Restaurants => {
            let meal = cost_field(cost, |c| c.meal_cost).unwrap_or(policy.default_meal_cost);
            annualize(meal * policy.restaurant_meals_per_month)
        }
        MealPlan::SelfCook => {
            let index = cost_field(cost, |c| c.groceries_index)
                .unwrap_or(policy.groceries_reference_index);
            let scale = if policy.groceries_reference_index > 0.0 {
                index / policy.groceries_reference_index
            } else {
                1.0
            };
            annualize(scale * policy.groceries_baseline_monthly)
        }
    }
}

pub fn resolve_transit(scenario: &BudgetScenario, cost: Option<&LocationCostRecord>) -> f64 {
    resolve_transit_with_policy(&CostPolicy::DEFAULT, scenario, cost)
}

pub fn resolve_transit_with_policy(
    policy: &CostPolicy,
    scenario: &BudgetScenario,
    cost: Option<&LocationCostRecord>,
) -> f64 {
    match scenario.transit {
        Transit::Public => annualize(
            cost_field(cost, |c| c.transit_monthly).unwrap_or(policy.default_transit_monthly),
        ),
        Transit::Car => policy.car_annual(),
    }
}
