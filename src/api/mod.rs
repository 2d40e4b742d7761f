use axum::{
    Router,
    extract::{Json, Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::core::{
    BudgetBreakdown, BudgetScenario, CostPolicy, LocationCostRecord, ProgramPricing,
    SavedScenario, ScenarioEstimate, build_summary, estimate_with_policy, scenario_from_value,
};
use crate::store::{ScenarioStorage, ScenarioStore, StoreError};

pub type DynStorage = Box<dyn ScenarioStorage + Send>;

pub struct AppState {
    store: Mutex<ScenarioStore<DynStorage>>,
    policy: CostPolicy,
}

impl AppState {
    pub fn new(storage: DynStorage, policy: CostPolicy) -> Self {
        Self {
            store: Mutex::new(ScenarioStore::open(storage)),
            policy,
        }
    }

    fn store(&self) -> MutexGuard<'_, ScenarioStore<DynStorage>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EstimatePayload {
    program: ProgramPricing,
    scenario: Value,
    #[serde(alias = "cost", alias = "cost_record")]
    cost_record: Option<LocationCostRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SavePayload {
    name: String,
    scenario: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComparatorPayload {
    id: Option<String>,
}

#[derive(Debug)]
struct EstimateRequest {
    program: ProgramPricing,
    scenario: BudgetScenario,
    cost_record: Option<LocationCostRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonResponse {
    id: String,
    name: String,
    scenario: BudgetScenario,
    breakdown: BudgetBreakdown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateResponse {
    scenario: BudgetScenario,
    breakdown: BudgetBreakdown,
    cost_source: Option<String>,
    authoritative_cost_data: bool,
    comparison: Option<ComparisonResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioListResponse {
    scenarios: Vec<SavedScenario>,
    comparator_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparatorResponse {
    comparator_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/estimate", post(estimate_handler))
        .route("/api/summary", post(summary_handler))
        .route(
            "/api/scenarios",
            get(list_scenarios_handler).post(save_scenario_handler),
        )
        .route(
            "/api/scenarios/:id",
            get(load_scenario_handler).delete(delete_scenario_handler),
        )
        .route("/api/comparator", post(comparator_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "campus budget API listening");
    println!("Campus budget API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/scenarios");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn estimate_handler(
    State(state): State<SharedState>,
    payload: Result<Json<EstimatePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    let request = estimate_request_from_payload(payload);
    json_response(StatusCode::OK, build_estimate_response(&state, &request))
}

async fn summary_handler(
    State(state): State<SharedState>,
    payload: Result<Json<EstimatePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    let request = estimate_request_from_payload(payload);
    let text = render_summary(&state, &request);
    with_cache_control(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

async fn list_scenarios_handler(State(state): State<SharedState>) -> Response {
    let store = state.store();
    json_response(
        StatusCode::OK,
        ScenarioListResponse {
            scenarios: store.scenarios(),
            comparator_id: store.comparator_id().map(str::to_string),
        },
    )
}

async fn save_scenario_handler(
    State(state): State<SharedState>,
    payload: Result<Json<SavePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    let scenario = scenario_from_value(&payload.scenario);
    match state.store().save(&payload.name, &scenario) {
        Ok(saved) => json_response(StatusCode::CREATED, saved),
        Err(err) => store_error_response(&err),
    }
}

async fn load_scenario_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    match state.store().load_into_working_scenario(&id) {
        Some(scenario) => json_response(StatusCode::OK, scenario),
        None => error_response(StatusCode::NOT_FOUND, &format!("Unknown scenario '{id}'")),
    }
}

async fn delete_scenario_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    match state.store().delete(&id) {
        Ok(true) => with_cache_control(StatusCode::NO_CONTENT),
        Ok(false) => error_response(StatusCode::NOT_FOUND, &format!("Unknown scenario '{id}'")),
        Err(err) => store_error_response(&err),
    }
}

async fn comparator_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ComparatorPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    let comparator_id = state.store().set_comparator(payload.id.as_deref());
    json_response(StatusCode::OK, ComparatorResponse { comparator_id })
}

fn estimate_request_from_payload(payload: EstimatePayload) -> EstimateRequest {
    EstimateRequest {
        program: payload.program,
        scenario: scenario_from_value(&payload.scenario),
        cost_record: payload.cost_record,
    }
}

fn build_estimate_response(state: &AppState, request: &EstimateRequest) -> EstimateResponse {
    let cost = request.cost_record.as_ref();
    let breakdown = estimate_with_policy(&state.policy, &request.program, &request.scenario, cost);
    let comparison = state
        .store()
        .comparison(&state.policy, &request.program, cost)
        .map(|(saved, breakdown)| ComparisonResponse {
            id: saved.id,
            name: saved.name,
            scenario: saved.scenario,
            breakdown,
        });

    EstimateResponse {
        scenario: request.scenario,
        breakdown,
        cost_source: cost.and_then(|c| c.source.clone()),
        authoritative_cost_data: cost.is_some_and(LocationCostRecord::is_authoritative),
        comparison,
    }
}

fn render_summary(state: &AppState, request: &EstimateRequest) -> String {
    let cost = request.cost_record.as_ref();
    let breakdown = estimate_with_policy(&state.policy, &request.program, &request.scenario, cost);
    let comparison = state
        .store()
        .comparison(&state.policy, &request.program, cost);

    build_summary(
        &request.program,
        &request.scenario,
        &breakdown,
        comparison
            .as_ref()
            .map(|(saved, other)| ScenarioEstimate {
                name: &saved.name,
                scenario: &saved.scenario,
                breakdown: other,
            }),
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
}

fn store_error_response(err: &StoreError) -> Response {
    error!(error = %err, "saved scenario write failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Housing, Residency};
    use crate::store::MemoryStorage;
    use axum::body::{Body, to_bytes};
    use axum::extract::FromRequest;
    use axum::http::Request;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_state() -> AppState {
        AppState::new(
            Box::new(MemoryStorage::with_contents("[]")),
            CostPolicy::default(),
        )
    }

    fn estimate_payload_from_json(json: &str) -> EstimatePayload {
        serde_json::from_str(json).expect("payload should parse")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    const END_TO_END_JSON: &str = r#"{
      "program": {
        "programTitle": "Nursing",
        "schoolName": "Harbor College",
        "city": "Portland",
        "state": "OR",
        "inStateTuition": 10000,
        "outStateTuition": 25000,
        "netPrice": 9000
      },
      "scenario": {
        "residency": "in_state",
        "housing": "off_single",
        "mealPlan": "self_cook",
        "transit": "public",
        "miscPercent": 0.1
      },
      "costRecord": {
        "rentSmall": 1500,
        "mealCost": 15,
        "transitMonthly": 80,
        "rentLarge": null,
        "source": "numbeo"
      }
    }"#;

    #[test]
    fn estimate_payload_parses_web_keys() {
        let request = estimate_request_from_payload(estimate_payload_from_json(END_TO_END_JSON));
        assert_eq!(request.scenario.residency, Residency::InState);
        assert_eq!(request.scenario.housing, Housing::OffSingle);
        assert_eq!(request.program.in_state_tuition, Some(10_000.0));
        let cost = request.cost_record.expect("cost record present");
        assert_eq!(cost.rent_small, Some(1_500.0));
        assert_eq!(cost.rent_large, None);
    }

    #[test]
    fn estimate_payload_accepts_missing_sections() {
        let request = estimate_request_from_payload(estimate_payload_from_json("{}"));
        assert_eq!(request.program, ProgramPricing::default());
        assert_eq!(request.scenario, BudgetScenario::default());
        assert!(request.cost_record.is_none());

        let aliased = estimate_payload_from_json(r#"{"cost": {"rentSmall": 900}}"#);
        assert_eq!(
            aliased.cost_record.and_then(|c| c.rent_small),
            Some(900.0)
        );
    }

    #[test]
    fn estimate_response_matches_worked_example() {
        let state = sample_state();
        let request = estimate_request_from_payload(estimate_payload_from_json(END_TO_END_JSON));
        let response = build_estimate_response(&state, &request);

        assert_approx(response.breakdown.total_annual, 37_136.0);
        assert_eq!(response.cost_source.as_deref(), Some("numbeo"));
        assert!(response.authoritative_cost_data);
        assert!(response.comparison.is_none());

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json["breakdown"]["totalMonthly"].is_number());
        assert_eq!(json["scenario"]["housing"], "off_single");
    }

    #[test]
    fn estimate_response_includes_selected_comparator() {
        let state = sample_state();
        let saved = state
            .store()
            .save("Shared", &BudgetScenario::default())
            .expect("save");
        state.store().set_comparator(Some(&saved.id));

        let request = estimate_request_from_payload(estimate_payload_from_json(END_TO_END_JSON));
        let response = build_estimate_response(&state, &request);
        let comparison = response.comparison.expect("comparison present");
        assert_eq!(comparison.id, saved.id);
        assert_eq!(comparison.name, "Shared");
        assert_approx(comparison.breakdown.housing, 36_000.0 / 2.0);
    }

    #[test]
    fn summary_text_contains_both_blocks() {
        let state = sample_state();
        let saved = state
            .store()
            .save("Roommates", &BudgetScenario::default())
            .expect("save");
        state.store().set_comparator(Some(&saved.id));

        let request = estimate_request_from_payload(estimate_payload_from_json(END_TO_END_JSON));
        let text = render_summary(&state, &request);
        assert!(text.starts_with("Cost of Living & Education Estimate\n"));
        assert!(text.contains("School: Harbor College"));
        assert!(text.contains("Total per year: $37,136"));
        assert!(text.contains("Comparison: Roommates"));
    }

    #[tokio::test]
    async fn save_then_list_then_delete_round_trip() {
        let state = Arc::new(sample_state());

        let response = save_scenario_handler(
            State(state.clone()),
            Ok(Json(SavePayload {
                name: "  ".to_string(),
                scenario: serde_json::json!({"roommates": 20}),
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let saved: SavedScenario =
            serde_json::from_str(&body_text(response).await).expect("saved scenario json");
        assert_eq!(saved.name, "Custom Scenario");
        assert_eq!(saved.scenario.roommates, 6);

        let listed = list_scenarios_handler(State(state.clone())).await;
        let listed: Value = serde_json::from_str(&body_text(listed).await).expect("list json");
        assert_eq!(listed["scenarios"].as_array().map(Vec::len), Some(1));
        assert!(listed["comparatorId"].is_null());

        let loaded = load_scenario_handler(State(state.clone()), Path(saved.id.clone())).await;
        assert_eq!(loaded.status(), StatusCode::OK);

        let deleted = delete_scenario_handler(State(state.clone()), Path(saved.id.clone())).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = delete_scenario_handler(State(state.clone()), Path(saved.id.clone())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let missing = load_scenario_handler(State(state), Path(saved.id)).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn comparator_endpoint_toggles() {
        let state = Arc::new(sample_state());
        let saved = state
            .store()
            .save("A", &BudgetScenario::default())
            .expect("save");

        let payload = || ComparatorPayload {
            id: Some(saved.id.clone()),
        };
        let on = comparator_handler(State(state.clone()), Ok(Json(payload()))).await;
        let on: Value = serde_json::from_str(&body_text(on).await).expect("json");
        assert_eq!(on["comparatorId"], Value::String(saved.id.clone()));

        let off = comparator_handler(State(state.clone()), Ok(Json(payload()))).await;
        let off: Value = serde_json::from_str(&body_text(off).await).expect("json");
        assert!(off["comparatorId"].is_null());
    }

    #[tokio::test]
    async fn summary_endpoint_returns_plain_text() {
        let state = Arc::new(sample_state());
        let response = summary_handler(
            State(state),
            Ok(Json(estimate_payload_from_json(END_TO_END_JSON))),
        )
        .await;
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/plain; charset=utf-8")
        );
        let text = body_text(response).await;
        assert!(text.contains("Location: Portland, OR"));
    }

    async fn extract_json<T: serde::de::DeserializeOwned>(
        body: &str,
    ) -> Result<Json<T>, JsonRejection> {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build");
        Result::<Json<T>, JsonRejection>::from_request(request, &())
            .await
            .expect("result extractor is infallible")
    }

    #[tokio::test]
    async fn malformed_body_returns_json_error_without_caching() {
        let state = Arc::new(sample_state());
        let payload = extract_json::<EstimatePayload>(
            r#"{"program": {"inStateTuition": "ten thousand"}, "scenario": {}}"#,
        )
        .await;
        assert!(payload.is_err());

        let response = estimate_handler(State(state.clone()), payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body: Value = serde_json::from_str(&body_text(response).await).expect("json error");
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));

        let payload = extract_json::<SavePayload>("not json").await;
        let response = save_scenario_handler(State(state.clone()), payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store().scenarios().is_empty());
    }
}
