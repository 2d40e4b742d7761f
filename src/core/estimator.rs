use super::policy::CostPolicy;
use super::resolver::{
    resolve_food_with_policy, resolve_housing_with_policy, resolve_transit_with_policy,
    resolve_tuition,
};
use super::types::{BudgetBreakdown, BudgetScenario, LocationCostRecord, ProgramPricing};

pub fn estimate(
    pricing: &ProgramPricing,
    scenario: &BudgetScenario,
    cost: Option<&LocationCostRecord>,
) -> BudgetBreakdown {
    estimate_with_policy(&CostPolicy::DEFAULT, pricing, scenario, cost)
}

pub fn estimate_with_policy(
    policy: &CostPolicy,
    pricing: &ProgramPricing,
    scenario: &BudgetScenario,
    cost: Option<&LocationCostRecord>,
) -> BudgetBreakdown {
    let scenario = scenario.sanitized();

    let tuition = resolve_tuition(pricing, scenario.residency);
    let housing = resolve_housing_with_policy(policy, pricing, &scenario, cost);
    let food = resolve_food_with_policy(policy, &scenario, cost);
    let transit = resolve_transit_with_policy(policy, &scenario, cost);

    let subtotal = tuition + housing + food + transit;
    let misc = subtotal * scenario.misc_percent;
    let total_annual = subtotal + misc;

    BudgetBreakdown {
        tuition,
        housing,
        food,
        transit,
        misc,
        total_annual,
        total_monthly: total_annual / 12.0,
    }
}
