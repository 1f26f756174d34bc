//! HTTP server for the fulfillment workflow API.
//!
//! Handlers stay thin: resolve the acting user from the `x-user-id`
//! header, parse the request body, call the orchestrator and map its
//! errors onto the API envelope. Financial redaction is applied to every
//! order payload on the way out.

use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Json},
	routing::{delete, get, post},
	Router,
};
use fulfillment_access::FinancialRedactor;
use fulfillment_config::ApiConfig;
use fulfillment_core::WorkflowOrchestrator;
use fulfillment_storage::{StoreError, UserDirectory};
use fulfillment_types::{
	ApiError, DesignStatus, ManufacturingStatus, ManufacturingUpdateRequest, OrderStatus,
	TransitionRequest, UserAccount,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Workflow orchestrator handling every mutation.
	pub orchestrator: Arc<WorkflowOrchestrator>,
	/// Directory used to resolve the acting user.
	pub users: Arc<dyn UserDirectory>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders/{id}", get(handle_get_order))
				.route("/orders/{id}/status", post(handle_order_status))
				.route("/manufacturing/{id}", get(handle_get_manufacturing))
				.route(
					"/manufacturing/{id}/status",
					post(handle_manufacturing_status),
				)
				.route(
					"/manufacturing/{id}/updates",
					post(handle_manufacturing_update),
				)
				.route("/design-jobs/{id}/status", post(handle_design_job_status))
				.route("/users/{id}", delete(handle_delete_user)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	orchestrator: Arc<WorkflowOrchestrator>,
	users: Arc<dyn UserDirectory>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState {
		orchestrator,
		users,
	});

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Fulfillment API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Resolves the acting user from the `x-user-id` header.
///
/// Missing or malformed ids are the caller's fault (400); a well-formed
/// id that matches no account is denied (403), never reported as missing.
async fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Result<UserAccount, ApiError> {
	let raw = headers
		.get("x-user-id")
		.and_then(|value| value.to_str().ok())
		.ok_or_else(|| ApiError::BadRequest {
			error_type: "MISSING_ACTOR".to_string(),
			message: "x-user-id header is required".to_string(),
		})?;
	let id: Uuid = raw.parse().map_err(|_| ApiError::BadRequest {
		error_type: "INVALID_ACTOR".to_string(),
		message: format!("x-user-id is not a valid id: {}", raw),
	})?;
	match state.users.get_user(id).await {
		Ok(user) => Ok(user),
		Err(StoreError::NotFound) => Err(ApiError::Forbidden {
			message: "unknown user".to_string(),
		}),
		Err(err) => Err(ApiError::InternalServerError {
			message: err.to_string(),
		}),
	}
}

fn bad_status(kind: &str, value: &str) -> ApiError {
	ApiError::BadRequest {
		error_type: "INVALID_STATUS".to_string(),
		message: format!("unknown {} status: {}", kind, value),
	}
}

/// Handles GET /api/orders/{id} requests.
///
/// Returns the order with its line items embedded, redacted per the
/// caller's role.
async fn handle_get_order(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	let (order, items) = state.orchestrator.load_order(&actor, id).await?;

	let mut payload = serde_json::to_value(&order).map_err(|e| ApiError::InternalServerError {
		message: e.to_string(),
	})?;
	payload["lineItems"] =
		serde_json::to_value(&items).map_err(|e| ApiError::InternalServerError {
			message: e.to_string(),
		})?;
	FinancialRedactor::redact_for_role(actor.role, &mut payload);

	Ok(Json(payload))
}

/// Handles POST /api/orders/{id}/status requests.
async fn handle_order_status(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	let requested: OrderStatus = request
		.status
		.parse()
		.map_err(|_| bad_status("order", &request.status))?;

	let outcome = state
		.orchestrator
		.transition_order(id, requested, &actor)
		.await?;
	Ok(Json(json!({
		"order": outcome.entity,
		"warnings": outcome.warnings,
	})))
}

/// Handles GET /api/manufacturing/{id} requests.
async fn handle_get_manufacturing(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	let (record, updates) = state.orchestrator.load_manufacturing(&actor, id).await?;
	Ok(Json(json!({
		"record": record,
		"updates": updates,
	})))
}

/// Handles POST /api/manufacturing/{id}/status requests.
async fn handle_manufacturing_status(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	let requested: ManufacturingStatus = request
		.status
		.parse()
		.map_err(|_| bad_status("manufacturing", &request.status))?;

	let outcome = state
		.orchestrator
		.transition_manufacturing(id, requested, &actor)
		.await?;
	Ok(Json(json!({
		"record": outcome.entity,
		"warnings": outcome.warnings,
	})))
}

/// Handles POST /api/manufacturing/{id}/updates requests.
async fn handle_manufacturing_update(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<ManufacturingUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	let status: ManufacturingStatus = request
		.status
		.parse()
		.map_err(|_| bad_status("manufacturing", &request.status))?;

	let update = state
		.orchestrator
		.record_manufacturing_update(id, status, request.notes, &actor, request.manufacturer_id)
		.await?;
	Ok((StatusCode::CREATED, Json(update)))
}

/// Handles POST /api/design-jobs/{id}/status requests.
async fn handle_design_job_status(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	let requested: DesignStatus = request
		.status
		.parse()
		.map_err(|_| bad_status("design job", &request.status))?;

	let outcome = state
		.orchestrator
		.transition_design_job(id, requested, &actor)
		.await?;
	Ok(Json(json!({
		"designJob": outcome.entity,
		"warnings": outcome.warnings,
	})))
}

/// Handles DELETE /api/users/{id} requests.
async fn handle_delete_user(
	Path(id): Path<Uuid>,
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
	let actor = resolve_actor(&state, &headers).await?;
	state.orchestrator.remove_user(&actor, id).await?;
	Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::Request;
	use chrono::Utc;
	use fulfillment_access::PermissionGate;
	use fulfillment_core::WorkflowSettings;
	use fulfillment_storage::implementations::memory::MemoryStore;
	use fulfillment_storage::EntityStore;
	use fulfillment_types::{Order, OrderLineItem, OrderPriority, Role};
	use http_body_util::BodyExt;
	use tower::ServiceExt;

	struct TestApp {
		store: Arc<MemoryStore>,
		router: Router,
		admin: UserAccount,
	}

	async fn test_app() -> TestApp {
		let store = Arc::new(MemoryStore::new());
		let gate = PermissionGate::new(store.clone());
		let orchestrator = Arc::new(WorkflowOrchestrator::new(
			store.clone(),
			store.clone(),
			store.clone(),
			gate,
			WorkflowSettings::default(),
		));
		let admin = UserAccount::new(Uuid::new_v4(), "root", Role::Admin);
		store.add_user(admin.clone()).await;
		let router = router(AppState {
			orchestrator,
			users: store.clone(),
		});
		TestApp {
			store,
			router,
			admin,
		}
	}

	async fn seed_order_with_item(store: &MemoryStore, status: OrderStatus) -> Order {
		let now = Utc::now();
		let order = store
			.create_order(Order {
				id: Uuid::new_v4(),
				org_id: Uuid::new_v4(),
				salesperson_id: Uuid::new_v4(),
				status,
				priority: OrderPriority::Normal,
				rush: false,
				created_at: now,
				updated_at: now,
			})
			.await
			.unwrap();
		store
			.create_line_item(OrderLineItem {
				id: Uuid::new_v4(),
				order_id: order.id,
				description: "tour tee".to_string(),
				unit_price: "15.00".parse().unwrap(),
				sizes: [("M".to_string(), 10)].into_iter().collect(),
			})
			.await
			.unwrap();
		order
	}

	async fn body_json(response: axum::response::Response) -> Value {
		let bytes = response.into_body().collect().await.unwrap().to_bytes();
		serde_json::from_slice(&bytes).unwrap()
	}

	fn get(uri: &str, actor: &str) -> Request<Body> {
		Request::builder()
			.uri(uri)
			.header("x-user-id", actor)
			.body(Body::empty())
			.unwrap()
	}

	fn post_json(uri: &str, actor: &str, body: Value) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header("x-user-id", actor)
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	#[tokio::test]
	async fn missing_actor_header_is_a_bad_request() {
		let app = test_app().await;
		let response = app
			.router
			.oneshot(
				Request::builder()
					.uri(format!("/api/orders/{}", Uuid::new_v4()))
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn unknown_actor_is_forbidden_not_missing() {
		let app = test_app().await;
		let order = seed_order_with_item(&app.store, OrderStatus::Draft).await;
		let response = app
			.router
			.oneshot(get(
				&format!("/api/orders/{}", order.id),
				&Uuid::new_v4().to_string(),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::FORBIDDEN);
	}

	#[tokio::test]
	async fn manufacturer_sees_orders_without_prices() {
		let app = test_app().await;
		let order = seed_order_with_item(&app.store, OrderStatus::InProduction).await;
		let mfg = UserAccount::new(Uuid::new_v4(), "mfg", Role::Manufacturer);
		app.store.add_user(mfg.clone()).await;

		let response = app
			.router
			.clone()
			.oneshot(get(
				&format!("/api/orders/{}", order.id),
				&mfg.id.to_string(),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert!(body["lineItems"][0].get("unitPrice").is_none());
		assert_eq!(body["lineItems"][0]["description"], "tour tee");

		// The admin view keeps the prices.
		let response = app
			.router
			.oneshot(get(
				&format!("/api/orders/{}", order.id),
				&app.admin.id.to_string(),
			))
			.await
			.unwrap();
		let body = body_json(response).await;
		assert_eq!(body["lineItems"][0]["unitPrice"], "15.00");
	}

	#[tokio::test]
	async fn order_status_endpoint_round_trips() {
		let app = test_app().await;
		let order = seed_order_with_item(&app.store, OrderStatus::Draft).await;

		let response = app
			.router
			.clone()
			.oneshot(post_json(
				&format!("/api/orders/{}/status", order.id),
				&app.admin.id.to_string(),
				json!({ "status": "quote" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["order"]["status"], "quote");
		assert_eq!(body["warnings"], json!([]));

		// Graph-illegal request surfaces as 422 with both endpoints.
		let response = app
			.router
			.oneshot(post_json(
				&format!("/api/orders/{}/status", order.id),
				&app.admin.id.to_string(),
				json!({ "status": "shipped" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
		let body = body_json(response).await;
		assert_eq!(body["error"], "INVALID_TRANSITION");
		assert_eq!(body["details"]["from"], "quote");
	}

	#[tokio::test]
	async fn unknown_status_names_are_rejected_up_front() {
		let app = test_app().await;
		let order = seed_order_with_item(&app.store, OrderStatus::Draft).await;

		let response = app
			.router
			.oneshot(post_json(
				&format!("/api/orders/{}/status", order.id),
				&app.admin.id.to_string(),
				json!({ "status": "warp_speed" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		let body = body_json(response).await;
		assert_eq!(body["error"], "INVALID_STATUS");
	}

	#[tokio::test]
	async fn user_deletion_maps_conflicts() {
		let app = test_app().await;
		let response = app
			.router
			.oneshot(
				Request::builder()
					.method("DELETE")
					.uri(format!("/api/users/{}", app.admin.id))
					.header("x-user-id", app.admin.id.to_string())
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CONFLICT);
	}
}
