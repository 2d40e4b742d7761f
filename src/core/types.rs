use serde::{Deserialize, Serialize};

pub const MIN_ROOMMATES: u32 = 1;
pub const MAX_ROOMMATES: u32 = 6;
pub const DEFAULT_MISC_PERCENT: f64 = 0.10;
pub const DEFAULT_ROOMMATES: u32 = 2;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Residency {
    #[default]
    #[serde(alias = "inState", alias = "in-state")]
    InState,
    #[serde(alias = "outOfState", alias = "out-of-state")]
    OutOfState,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Housing {
    #[serde(alias = "onCampus", alias = "on-campus")]
    OnCampus,
    #[serde(alias = "offSingle", alias = "off-single")]
    OffSingle,
    #[default]
    #[serde(alias = "offShared", alias = "off-shared")]
    OffShared,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealPlan {
    Campus,
    #[default]
    #[serde(alias = "selfCook", alias = "self-cook")]
    SelfCook,
    Restaurants,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transit {
    #[default]
    Public,
    Car,
}

/// Tuition and cost-of-attendance figures for one program, as delivered by
/// the data service. Every numeric field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgramPricing {
    #[serde(alias = "program_id")]
    pub program_id: Option<i64>,
    #[serde(alias = "program_title")]
    pub program_title: Option<String>,
    #[serde(alias = "school_name")]
    pub school_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "net_price", alias = "avg_net_price")]
    pub net_price: Option<f64>,
    #[serde(alias = "in_state_tuition")]
    pub in_state_tuition: Option<f64>,
    #[serde(alias = "out_state_tuition")]
    pub out_state_tuition: Option<f64>,
    #[serde(alias = "academic_year_cost")]
    pub academic_year_cost: Option<f64>,
    #[serde(alias = "program_year_cost")]
    pub program_year_cost: Option<f64>,
}

/// Cost-of-living figures for the program's city. Not every city has one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationCostRecord {
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "rent_small")]
    pub rent_small: Option<f64>,
    #[serde(alias = "rent_large")]
    pub rent_large: Option<f64>,
    #[serde(alias = "meal_cost")]
    pub meal_cost: Option<f64>,
    #[serde(alias = "transit_monthly")]
    pub transit_monthly: Option<f64>,
    #[serde(alias = "cost_index")]
    pub cost_index: Option<f64>,
    #[serde(alias = "cost_plus_rent_index")]
    pub cost_plus_rent_index: Option<f64>,
    #[serde(alias = "rent_index")]
    pub rent_index: Option<f64>,
    #[serde(alias = "groceries_index")]
    pub groceries_index: Option<f64>,
    #[serde(alias = "restaurant_index")]
    pub restaurant_index: Option<f64>,
    pub source: Option<String>,
    #[serde(alias = "last_updated")]
    pub last_updated: Option<String>,
}

impl LocationCostRecord {
    /// True when `source` names scraped or curated data rather than a
    /// synthesized stand-in. A record without a source tag is not trusted.
    pub fn is_authoritative(&self) -> bool {
        let Some(source) = self.source.as_deref() else {
            return false;
        };
        let tag = source.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return false;
        }
        !["fallback", "synthetic", "estimate", "state_average"]
            .iter()
            .any(|marker| tag.contains(marker))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetScenario {
    pub residency: Residency,
    pub housing: Housing,
    pub roommates: u32,
    pub meal_plan: MealPlan,
    pub transit: Transit,
    pub misc_percent: f64,
}

impl Default for BudgetScenario {
    fn default() -> Self {
        Self {
            residency: Residency::InState,
            housing: Housing::OffShared,
            roommates: DEFAULT_ROOMMATES,
            meal_plan: MealPlan::SelfCook,
            transit: Transit::Public,
            misc_percent: DEFAULT_MISC_PERCENT,
        }
    }
}

impl BudgetScenario {
    /// Builds a scenario with `roommates` clamped into range and an invalid
    /// `misc_percent` replaced by the default.
    pub fn new(
        residency: Residency,
        housing: Housing,
        roommates: i64,
        meal_plan: MealPlan,
        transit: Transit,
        misc_percent: f64,
    ) -> Self {
        Self {
            residency,
            housing,
            roommates: clamp_roommates(roommates),
            meal_plan,
            transit,
            misc_percent: normalize_misc_percent(Some(misc_percent)),
        }
    }

    /// Re-applies the construction rules to a scenario that may have been
    /// mutated field by field.
    pub fn sanitized(self) -> Self {
        Self::new(
            self.residency,
            self.housing,
            i64::from(self.roommates),
            self.meal_plan,
            self.transit,
            self.misc_percent,
        )
    }
}

pub fn clamp_roommates(value: i64) -> u32 {
    value.clamp(i64::from(MIN_ROOMMATES), i64::from(MAX_ROOMMATES)) as u32
}

pub fn normalize_misc_percent(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => DEFAULT_MISC_PERCENT,
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub tuition: f64,
    pub housing: f64,
    pub food: f64,
    pub transit: f64,
    pub misc: f64,
    pub total_annual: f64,
    pub total_monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SavedScenario {
    pub id: String,
    pub name: String,
    pub scenario: BudgetScenario,
}
