use super::types::{
    BudgetBreakdown, BudgetScenario, Housing, MealPlan, ProgramPricing, Residency, Transit,
};

const HEADER: &str = "Cost of Living & Education Estimate";
const PLACEHOLDER: &str = "--";

/// A named scenario together with its estimate, rendered as the second
/// block of a summary.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEstimate<'a> {
    pub name: &'a str,
    pub scenario: &'a BudgetScenario,
    pub breakdown: &'a BudgetBreakdown,
}

/// Renders the working scenario (and the comparator, when one is selected)
/// as plain text lines suitable for the clipboard or a print dialog.
pub fn build_summary(
    program: &ProgramPricing,
    primary_scenario: &BudgetScenario,
    primary_breakdown: &BudgetBreakdown,
    comparator: Option<ScenarioEstimate<'_>>,
) -> String {
    let mut lines = vec![
        HEADER.to_string(),
        format!("Program: {}", display_or_dash(program.program_title.as_deref())),
        format!("School: {}", display_or_dash(program.school_name.as_deref())),
        format!(
            "Location: {}",
            location_label(program.city.as_deref(), program.state.as_deref())
        ),
        String::new(),
    ];

    push_block(&mut lines, "Current scenario", primary_scenario, primary_breakdown);

    if let Some(other) = comparator {
        lines.push(String::new());
        let name = display_or_dash(Some(other.name));
        push_block(
            &mut lines,
            &format!("Comparison: {name}"),
            other.scenario,
            other.breakdown,
        );
    }

    lines.join("\n")
}

fn push_block(
    lines: &mut Vec<String>,
    title: &str,
    scenario: &BudgetScenario,
    breakdown: &BudgetBreakdown,
) {
    lines.push(title.to_string());
    lines.push(format!("Scenario: {}", describe_scenario(scenario)));
    for (label, amount) in [
        ("Tuition", breakdown.tuition),
        ("Housing", breakdown.housing),
        ("Food", breakdown.food),
        ("Transit", breakdown.transit),
        ("Misc", breakdown.misc),
        ("Total per year", breakdown.total_annual),
        ("Total per month", breakdown.total_monthly),
    ] {
        lines.push(format!("{label}: {}", format_currency(amount)));
    }
}

fn display_or_dash(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => PLACEHOLDER,
    }
}

fn location_label(city: Option<&str>, state: Option<&str>) -> String {
    let parts = [city, state]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    if parts.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        parts.join(", ")
    }
}

fn describe_scenario(scenario: &BudgetScenario) -> String {
    let residency = match scenario.residency {
        Residency::InState => "In-state",
        Residency::OutOfState => "Out-of-state",
    };
    let housing = match scenario.housing {
        Housing::OnCampus => "on-campus housing".to_string(),
        Housing::OffSingle => "off-campus, living alone".to_string(),
        Housing::OffShared => format!(
            "off-campus, rent split {} ways",
            scenario.roommates.max(1)
        ),
    };
    let meals = match scenario.meal_plan {
        MealPlan::Campus => "campus meal plan",
        MealPlan::SelfCook => "cooking at home",
        MealPlan::Restaurants => "eating out",
    };
    let transit = match scenario.transit {
        Transit::Public => "public transit",
        Transit::Car => "car",
    };
    format!(
        "{residency}; {housing}; {meals}; {transit}; misc {}",
        format_percent(scenario.misc_percent)
    )
}

/// Whole dollars with thousands separators, e.g. `$37,136` or `-$1,200`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn format_percent(fraction: f64) -> String {
    let percent = fraction * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{percent:.0}%")
    } else {
        format!("{percent:.1}%")
    }
}
