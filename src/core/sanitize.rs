//! Lenient reading of scenario payloads that did not come from this crate's
//! own serializer: persisted entries written by older builds, hand-edited
//! files, and request bodies. Every field is read on its own; a bad field
//! falls back to its default instead of rejecting the whole scenario.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    BudgetScenario, DEFAULT_ROOMMATES, Housing, MealPlan, Residency, Transit, clamp_roommates,
    normalize_misc_percent,
};

/// Reads a scenario from arbitrary JSON. Non-objects yield the default
/// scenario; fields are clamped or defaulted individually.
pub fn scenario_from_value(value: &Value) -> BudgetScenario {
    let defaults = BudgetScenario::default();
    let Some(fields) = value.as_object() else {
        return defaults;
    };

    let field = |camel: &str, snake: &str| fields.get(camel).or_else(|| fields.get(snake));

    BudgetScenario {
        residency: enum_field::<Residency>(field("residency", "residency"))
            .unwrap_or(defaults.residency),
        housing: enum_field::<Housing>(field("housing", "housing")).unwrap_or(defaults.housing),
        roommates: integer_field(field("roommates", "roommates"))
            .map(clamp_roommates)
            .unwrap_or(DEFAULT_ROOMMATES),
        meal_plan: enum_field::<MealPlan>(field("mealPlan", "meal_plan"))
            .unwrap_or(defaults.meal_plan),
        transit: enum_field::<Transit>(field("transit", "transit")).unwrap_or(defaults.transit),
        misc_percent: normalize_misc_percent(number_field(field("miscPercent", "misc_percent"))),
    }
}

fn enum_field<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    let text = value?.as_str()?.trim();
    serde_json::from_value(Value::String(text.to_string())).ok()
}

fn number_field(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn integer_field(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    number_field(Some(value)).map(|v| v.round() as i64)
}
