use serde::{Deserialize, Serialize};

/// Heuristic figures used whenever a pricing or cost-of-living field is
/// missing. These are policy choices with no cited source, not measured
/// averages; `Default` holds the figures the estimator ships with.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostPolicy {
    /// Share of total cost of attendance treated as room and board.
    pub on_campus_housing_share: f64,
    pub default_rent_small_monthly: f64,
    pub default_rent_large_monthly: f64,
    pub campus_meal_plan_annual: f64,
    pub default_meal_cost: f64,
    pub restaurant_meals_per_month: f64,
    pub groceries_baseline_monthly: f64,
    /// Groceries index at which the baseline applies unscaled.
    pub groceries_reference_index: f64,
    pub default_transit_monthly: f64,
    pub car_insurance_annual: f64,
    pub car_fuel_annual: f64,
    pub car_maintenance_annual: f64,
}

impl CostPolicy {
    pub const DEFAULT: CostPolicy = CostPolicy {
        on_campus_housing_share: 0.4,
        default_rent_small_monthly: 1_600.0,
        default_rent_large_monthly: 3_000.0,
        campus_meal_plan_annual: 4_500.0,
        default_meal_cost: 18.0,
        restaurant_meals_per_month: 30.0,
        groceries_baseline_monthly: 400.0,
        groceries_reference_index: 60.0,
        default_transit_monthly: 100.0,
        car_insurance_annual: 1_200.0,
        car_fuel_annual: 1_800.0,
        car_maintenance_annual: 800.0,
    };

    pub fn car_annual(&self) -> f64 {
        self.car_insurance_annual + self.car_fuel_annual + self.car_maintenance_annual
    }
}

impl Default for CostPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
