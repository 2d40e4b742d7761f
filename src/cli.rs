use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::AppState;
use crate::core::{
    BudgetScenario, CostPolicy, Housing, LocationCostRecord, MealPlan, ProgramPricing, Residency,
    ScenarioEstimate, Transit, build_summary, estimate_with_policy,
};
use crate::store::{FileStorage, ScenarioStore};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliResidency {
    InState,
    OutOfState,
}

impl From<CliResidency> for Residency {
    fn from(value: CliResidency) -> Self {
        match value {
            CliResidency::InState => Residency::InState,
            CliResidency::OutOfState => Residency::OutOfState,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliHousing {
    OnCampus,
    OffSingle,
    OffShared,
}

impl From<CliHousing> for Housing {
    fn from(value: CliHousing) -> Self {
        match value {
            CliHousing::OnCampus => Housing::OnCampus,
            CliHousing::OffSingle => Housing::OffSingle,
            CliHousing::OffShared => Housing::OffShared,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMealPlan {
    Campus,
    SelfCook,
    Restaurants,
}

impl From<CliMealPlan> for MealPlan {
    fn from(value: CliMealPlan) -> Self {
        match value {
            CliMealPlan::Campus => MealPlan::Campus,
            CliMealPlan::SelfCook => MealPlan::SelfCook,
            CliMealPlan::Restaurants => MealPlan::Restaurants,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTransit {
    Public,
    Car,
}

impl From<CliTransit> for Transit {
    fn from(value: CliTransit) -> Self {
        match value {
            CliTransit::Public => Transit::Public,
            CliTransit::Car => Transit::Car,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "campus-budget",
    about = "Cost of living + cost of education estimator with saved, comparable scenarios"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve(ServeArgs),
    /// Estimate one program under a scenario and print the summary
    Estimate(EstimateArgs),
    /// List, save, show or delete saved scenarios
    Scenarios(ScenariosArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        global = true,
        default_value = "saved_budget_scenarios.json",
        help = "JSON file holding saved scenarios"
    )]
    store: PathBuf,
    #[arg(
        long,
        global = true,
        help = "JSON file overriding the fallback cost heuristics (camelCase keys)"
    )]
    policy: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    #[arg(long, value_enum, default_value_t = CliResidency::InState)]
    residency: CliResidency,
    #[arg(long, value_enum, default_value_t = CliHousing::OffShared)]
    housing: CliHousing,
    #[arg(
        long,
        default_value_t = 2,
        allow_negative_numbers = true,
        help = "People splitting the rent; clamped to 1..=6"
    )]
    roommates: i64,
    #[arg(long, value_enum, default_value_t = CliMealPlan::SelfCook)]
    meal_plan: CliMealPlan,
    #[arg(long, value_enum, default_value_t = CliTransit::Public)]
    transit: CliTransit,
    #[arg(
        long,
        default_value_t = 10.0,
        allow_negative_numbers = true,
        help = "Miscellaneous allowance in percent of the subtotal"
    )]
    misc_percent: f64,
}

impl ScenarioArgs {
    fn to_scenario(&self) -> BudgetScenario {
        BudgetScenario::new(
            self.residency.into(),
            self.housing.into(),
            self.roommates,
            self.meal_plan.into(),
            self.transit.into(),
            self.misc_percent / 100.0,
        )
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    config: ConfigArgs,
}

impl ServeArgs {
    pub fn into_state(self) -> Result<(u16, AppState), String> {
        let policy = load_policy(self.config.policy.as_deref())?;
        let storage = Box::new(FileStorage::new(self.config.store));
        Ok((self.port, AppState::new(storage, policy)))
    }
}

#[derive(Args, Debug)]
pub struct EstimateArgs {
    #[arg(long, help = "JSON file with the program's pricing record")]
    program: PathBuf,
    #[arg(long, help = "JSON file with the city's cost-of-living record")]
    cost: Option<PathBuf>,
    #[arg(long, help = "Use a saved scenario instead of the scenario flags")]
    saved: Option<String>,
    #[arg(
        long,
        conflicts_with = "json",
        help = "Saved scenario id to show side by side"
    )]
    compare: Option<String>,
    #[arg(long, help = "Print the breakdown as JSON instead of the text summary")]
    json: bool,
    #[command(flatten)]
    scenario: ScenarioArgs,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct ScenariosArgs {
    #[command(subcommand)]
    action: ScenarioAction,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum ScenarioAction {
    /// Print saved scenarios as `id<TAB>name`
    List,
    /// Print one saved scenario as JSON
    Show { id: String },
    /// Save the scenario described by the flags
    Save {
        #[arg(long, default_value = "")]
        name: String,
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Delete a saved scenario
    Delete { id: String },
}

pub fn run_estimate(args: EstimateArgs) -> Result<String, String> {
    let policy = load_policy(args.config.policy.as_deref())?;
    let program: ProgramPricing = read_json(&args.program)?;
    let cost: Option<LocationCostRecord> = args.cost.as_deref().map(read_json).transpose()?;

    let mut store = ScenarioStore::open(FileStorage::new(&args.config.store));
    let scenario = match args.saved.as_deref() {
        Some(id) => store
            .load_into_working_scenario(id)
            .ok_or_else(|| format!("--saved: unknown scenario '{id}'"))?,
        None => args.scenario.to_scenario(),
    };
    let breakdown = estimate_with_policy(&policy, &program, &scenario, cost.as_ref());

    if args.json {
        let mut out = serde_json::to_string_pretty(&breakdown)
            .map_err(|e| format!("Could not encode breakdown: {e}"))?;
        out.push('\n');
        return Ok(out);
    }

    if let Some(id) = args.compare.as_deref() {
        if store.set_comparator(Some(id)).is_none() {
            return Err(format!("--compare: unknown scenario '{id}'"));
        }
    }
    let comparison = store.comparison(&policy, &program, cost.as_ref());

    let mut out = build_summary(
        &program,
        &scenario,
        &breakdown,
        comparison
            .as_ref()
            .map(|(saved, other)| ScenarioEstimate {
                name: &saved.name,
                scenario: &saved.scenario,
                breakdown: other,
            }),
    );
    out.push('\n');
    Ok(out)
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<String, String> {
    let mut store = ScenarioStore::open(FileStorage::new(&args.config.store));

    match args.action {
        ScenarioAction::List => Ok(store
            .scenarios()
            .iter()
            .map(|saved| format!("{}\t{}\n", saved.id, saved.name))
            .collect()),
        ScenarioAction::Show { id } => {
            let saved = store
                .get(&id)
                .ok_or_else(|| format!("unknown scenario '{id}'"))?;
            let mut out = serde_json::to_string_pretty(&saved)
                .map_err(|e| format!("Could not encode scenario: {e}"))?;
            out.push('\n');
            Ok(out)
        }
        ScenarioAction::Save { name, scenario } => {
            let saved = store
                .save(&name, &scenario.to_scenario())
                .map_err(|e| e.to_string())?;
            Ok(format!("{}\t{}\n", saved.id, saved.name))
        }
        ScenarioAction::Delete { id } => {
            if store.delete(&id).map_err(|e| e.to_string())? {
                Ok(format!("deleted {id}\n"))
            } else {
                Err(format!("unknown scenario '{id}'"))
            }
        }
    }
}

fn load_policy(path: Option<&Path>) -> Result<CostPolicy, String> {
    path.map_or_else(|| Ok(CostPolicy::default()), read_json)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Could not read {}: {e}", path.display()))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid JSON in {}: {e}", path.display()))
}
