//! Fake Backend
//!
//! An in-process axum server that speaks the backend's REST API closely
//! enough for adapter and dashboard tests: cookie sessions, the three invoice
//! families, accounts and reports. Records are stored as raw JSON so tests
//! see exactly what went over the wire.
//!
//! ```rust,ignore
//! let backend = FakeBackend::spawn().await;
//! let client = ApiClient::new(HttpConfig::new(backend.base_url()))?;
//! client.login("admin", UserFixtures::PASSWORD).await?;
//! ```

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self as axum_middleware, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Form, Json, Router,
};
use core_kernel::{UserId, Vnd};
use domain_access::{permission, PermissionSet, Role, User};
use domain_invoice::{InvoiceFamily, InvoiceRecord};
use domain_report::{CommissionRow, DueInvoice, SummaryRow};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::fixtures::{UserFixtures, REFERENCE_TIME};

pub const SESSION_COOKIE: &str = "access_token";
pub const XLSX_BYTES: &[u8] = b"PK\x03\x04fake-xlsx";

/// One request as seen by the fake backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

impl RecordedRequest {
    /// Query pairs in the order they were sent
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .unwrap_or_default()
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (p.to_string(), String::new()),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password: String,
    permissions: PermissionSet,
}

#[derive(Debug, Default)]
struct Store {
    records: HashMap<InvoiceFamily, Vec<Value>>,
    next_id: i64,
    users: Vec<StoredUser>,
    sessions: HashMap<String, UserId>,
    bulk_rejection: Option<(StatusCode, Value)>,
    requests: Vec<RecordedRequest>,
    summary: Vec<SummaryRow>,
    commission: Vec<CommissionRow>,
    due: Vec<DueInvoice>,
}

impl Store {
    fn seeded() -> Self {
        let mut store = Store {
            next_id: 1000,
            ..Default::default()
        };
        for user in [UserFixtures::admin(), UserFixtures::viewer()] {
            store.insert_user(user, UserFixtures::PASSWORD);
        }
        store
    }

    fn insert_user(&mut self, user: User, password: &str) {
        let permissions = PermissionSet::for_roles(&user.role().into_iter().collect::<Vec<_>>());
        self.users.retain(|u| u.user.id != user.id);
        self.users.push(StoredUser {
            user,
            password: password.to_string(),
            permissions,
        });
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_mut(&mut self, id: i64) -> Option<&mut StoredUser> {
        self.users.iter_mut().find(|u| u.user.id.value() == id)
    }

    fn family(&mut self, family: InvoiceFamily) -> &mut Vec<Value> {
        self.records.entry(family).or_default()
    }
}

type Shared = Arc<Mutex<Store>>;

/// Handle to a running fake backend; cheap to clone
#[derive(Clone)]
pub struct FakeBackend {
    store: Shared,
    addr: SocketAddr,
}

impl FakeBackend {
    /// Starts the server on an ephemeral local port
    pub async fn spawn() -> Self {
        let store: Shared = Arc::new(Mutex::new(Store::seeded()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");
        let app = create_router(store.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        debug!(%addr, "Fake backend listening");
        Self { store, addr }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stores records as persisted rows, assigning ids to new ones
    pub async fn seed_records<R: InvoiceRecord>(&self, records: Vec<R>) -> Vec<i64> {
        let mut store = self.store.lock().await;
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let mut value = serde_json::to_value(&record).expect("Record does not serialize");
            let id = match value.get("id").and_then(Value::as_i64).filter(|id| *id > 0) {
                Some(id) => id,
                None => store.allocate_id(),
            };
            value["id"] = json!(id);
            store.family(R::FAMILY).push(value);
            ids.push(id);
        }
        ids
    }

    /// Raw stored rows of a family, in storage order
    pub async fn records(&self, family: InvoiceFamily) -> Vec<Value> {
        self.store.lock().await.records.get(&family).cloned().unwrap_or_default()
    }

    pub async fn seed_user(&self, user: User, password: &str) {
        self.store.lock().await.insert_user(user, password);
    }

    pub async fn permissions_of(&self, id: i64) -> Option<PermissionSet> {
        self.store.lock().await.user_mut(id).map(|u| u.permissions.clone())
    }

    /// Drops every session; the next protected call answers 401
    pub async fn expire_session(&self) {
        self.store.lock().await.sessions.clear();
    }

    /// The next bulk upsert, of any family, answers with this status and body
    pub async fn reject_next_bulk(&self, status: StatusCode, body: Value) {
        self.store.lock().await.bulk_rejection = Some((status, body));
    }

    pub async fn set_summary(&self, rows: Vec<SummaryRow>) {
        self.store.lock().await.summary = rows;
    }

    pub async fn set_commission(&self, rows: Vec<CommissionRow>) {
        self.store.lock().await.commission = rows;
    }

    pub async fn set_due(&self, rows: Vec<DueInvoice>) {
        self.store.lock().await.due = rows;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.store.lock().await.requests.clone()
    }

    /// The most recent request to `path`
    pub async fn last_request_to(&self, path: &str) -> Option<RecordedRequest> {
        self.requests().await.into_iter().rev().find(|r| r.path == path)
    }
}

// ============================================================================
// Router
// ============================================================================

#[derive(Clone)]
struct FamilyState {
    store: Shared,
    family: InvoiceFamily,
}

fn family_routes(store: Shared, family: InvoiceFamily, base: &str, list: &str, stats: &str, bulk: &str) -> Router {
    let router = if base == list {
        Router::new().route(base, post(create_record).get(list_records))
    } else {
        Router::new()
            .route(base, post(create_record))
            .route(list, get(list_records))
    };
    router
        .route(stats, get(family_stats))
        .route(bulk, post(bulk_upsert))
        .route(&format!("{}/export-excel", base), get(export))
        .route(&format!("{}/batch/:batch_id", base), delete(delete_batch))
        .route(&format!("{}/:id", base), put(update_record).delete(delete_record))
        .with_state(FamilyState { store, family })
}

fn create_router(store: Shared) -> Router {
    let public_routes = Router::new()
        .route("/token", post(login))
        .route("/auth/logout", post(logout))
        .with_state(store.clone());

    let user_routes = Router::new()
        .route("/user/me", get(me))
        .route("/user/", get(list_users))
        .route("/user/create_user", post(create_user))
        .route("/user/permissions", get(list_permissions))
        .route("/user/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/user/:id/permissions", get(user_permissions))
        .route("/user/:id/add_permission", post(add_permission))
        .route("/user/:id/remove_permission", post(remove_permission))
        .route("/report/summary", get(summary))
        .route("/report/commission-by-sender", get(commission))
        .route("/report/den-han-ket-toan", get(due))
        .with_state(store.clone());

    let protected_routes = Router::new()
        .merge(family_routes(
            store.clone(),
            InvoiceFamily::Card,
            "/hoa-don",
            "/hoa-don/",
            "/hoa-don/stats-hoadon",
            "/hoa-don/batch-update",
        ))
        .merge(family_routes(
            store.clone(),
            InvoiceFamily::Momo,
            "/hoa-don/momo",
            "/hoa-don/momo/",
            "/hoa-don/stats-hoa-don-dien",
            "/hoa-don/batch-momo",
        ))
        .merge(family_routes(
            store.clone(),
            InvoiceFamily::Offset,
            "/hoa-don/doi-ung",
            "/hoa-don/doi-ung",
            "/hoa-don/stats-doi-ung",
            "/hoa-don/doi-ung/batch-update",
        ))
        .merge(user_routes)
        .layer(axum_middleware::from_fn_with_state(store.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(store, record_request))
}

// ============================================================================
// Middleware
// ============================================================================

async fn record_request(State(store): State<Shared>, request: Request<Body>, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
    };
    store.lock().await.requests.push(recorded);
    next.run(request).await
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("access_token="))
        .map(str::to_string)
}

async fn require_session(State(store): State<Shared>, mut request: Request<Body>, next: Next) -> Response {
    let user_id = match session_token(request.headers()) {
        Some(token) => store.lock().await.sessions.get(&token).copied(),
        None => None,
    };
    match user_id {
        Some(id) => {
            request.extensions_mut().insert(id);
            next.run(request).await
        }
        None => detail(StatusCode::UNAUTHORIZED, "Not authenticated"),
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

// ============================================================================
// Session
// ============================================================================

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(store): State<Shared>, Form(form): Form<LoginForm>) -> Response {
    let mut store = store.lock().await;
    let Some(user) = store
        .users
        .iter()
        .find(|u| u.user.username == form.username && u.password == form.password && u.user.is_active)
        .map(|u| u.user.id)
    else {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    };
    let token = format!("tok-{}", user.value());
    store.sessions.insert(token.clone(), user);
    (
        [(header::SET_COOKIE, format!("{}={}; HttpOnly; Path=/", SESSION_COOKIE, token))],
        Json(json!({ "access_token": token, "token_type": "bearer" })),
    )
        .into_response()
}

async fn logout(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        store.lock().await.sessions.remove(&token);
    }
    (
        [(header::SET_COOKIE, format!("{}=; Max-Age=0; Path=/", SESSION_COOKIE))],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

// ============================================================================
// Invoices
// ============================================================================

/// Wire names of the gross amount, fee and customer name of a family
fn money_keys(family: InvoiceFamily) -> (&'static str, &'static str, &'static str) {
    match family {
        InvoiceFamily::Card => ("tong_so_tien", "tien_phi", "ten_khach"),
        InvoiceFamily::Momo => ("so_tien", "phi_cong_ty_thu", "ten_khach_hang"),
        InvoiceFamily::Offset => ("so_tien", "tong_phi", "ten_khach_hang"),
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn amount_of(value: Option<&Value>) -> i64 {
    Vnd::parse_lenient(&text_of(value)).amount()
}

fn record_id(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}

/// Substring filtering on every query key the fake knows about
fn matches(record: &Value, query: &HashMap<String, String>) -> bool {
    query
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "page" | "page_size" | "from_date" | "to_date" | "search"))
        .all(|(k, v)| text_of(record.get(k)).to_lowercase().contains(&v.to_lowercase()))
}

fn page_of(query: &HashMap<String, String>) -> (usize, usize) {
    let page = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1usize).max(1);
    let size = query.get("page_size").and_then(|p| p.parse().ok()).unwrap_or(10usize).max(1);
    ((page - 1) * size, size)
}

/// Groups rows by `batch_id`, keeping first-appearance order
fn grouped(rows: Vec<Value>) -> Vec<(String, Vec<Value>)> {
    let mut batches: Vec<(String, Vec<Value>)> = Vec::new();
    for row in rows {
        let batch_id = text_of(row.get("batch_id"));
        match batches.iter_mut().find(|(id, _)| *id == batch_id) {
            Some((_, records)) => records.push(row),
            None => batches.push((batch_id, vec![row])),
        }
    }
    batches
}

async fn list_records(State(state): State<FamilyState>, Query(query): Query<HashMap<String, String>>) -> Response {
    let store = state.store.lock().await;
    let rows: Vec<Value> = store
        .records
        .get(&state.family)
        .map(|rows| rows.iter().filter(|r| matches(r, &query)).cloned().collect())
        .unwrap_or_default();
    let (offset, size) = page_of(&query);

    if state.family.is_grouped_by_backend() {
        let batches = grouped(rows);
        let total = batches.len();
        let data: Vec<Value> = batches
            .into_iter()
            .skip(offset)
            .take(size)
            .map(|(batch_id, records)| json!({ "batch_id": batch_id, "records": records }))
            .collect();
        Json(json!({ "total": total, "data": data })).into_response()
    } else {
        let total = rows.len();
        let data: Vec<Value> = rows.into_iter().skip(offset).take(size).collect();
        Json(json!({ "total": total, "data": data })).into_response()
    }
}

async fn family_stats(State(state): State<FamilyState>, Query(query): Query<HashMap<String, String>>) -> Response {
    let store = state.store.lock().await;
    let (gross, fee, _) = money_keys(state.family);
    let rows: Vec<Value> = store
        .records
        .get(&state.family)
        .map(|rows| rows.iter().filter(|r| matches(r, &query)).cloned().collect())
        .unwrap_or_default();
    let total_amount: i64 = rows.iter().map(|r| amount_of(r.get(gross))).sum();
    let total_fee: i64 = rows.iter().map(|r| amount_of(r.get(fee))).sum();
    let records = rows.len();
    let batches = grouped(rows).len();
    Json(json!({
        "totalRecords": records,
        "totalBatches": batches,
        "totalAmount": total_amount,
        "totalFee": total_fee,
    }))
    .into_response()
}

fn missing_field(field: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [{ "loc": ["body", field], "msg": "Field required", "type": "missing" }]
        })),
    )
        .into_response()
}

async fn create_record(State(state): State<FamilyState>, Json(mut record): Json<Value>) -> Response {
    let (_, _, name) = money_keys(state.family);
    if text_of(record.get(name)).trim().is_empty() {
        return missing_field(name);
    }
    let mut store = state.store.lock().await;
    let id = store.allocate_id();
    record["id"] = json!(id);
    store.family(state.family).push(record.clone());
    Json(record).into_response()
}

fn merge_into(target: &mut Value, changes: Value) {
    if let (Some(target), Value::Object(changes)) = (target.as_object_mut(), changes) {
        for (key, value) in changes {
            if key != "id" {
                target.insert(key, value);
            }
        }
    }
}

async fn update_record(
    State(state): State<FamilyState>,
    Path(id): Path<i64>,
    Json(changes): Json<Value>,
) -> Response {
    let mut store = state.store.lock().await;
    match store.family(state.family).iter_mut().find(|r| record_id(r) == Some(id)) {
        Some(record) => {
            merge_into(record, changes);
            Json(record.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Không tìm thấy hóa đơn"),
    }
}

async fn delete_record(State(state): State<FamilyState>, Path(id): Path<i64>) -> Response {
    let mut store = state.store.lock().await;
    let rows = store.family(state.family);
    let before = rows.len();
    rows.retain(|r| record_id(r) != Some(id));
    if rows.len() == before {
        return detail(StatusCode::NOT_FOUND, "Không tìm thấy hóa đơn");
    }
    Json(json!({ "message": "Đã xóa hóa đơn" })).into_response()
}

async fn delete_batch(State(state): State<FamilyState>, Path(batch_id): Path<String>) -> Response {
    let mut store = state.store.lock().await;
    let rows = store.family(state.family);
    let before = rows.len();
    rows.retain(|r| text_of(r.get("batch_id")) != batch_id);
    if rows.len() == before {
        return detail(StatusCode::NOT_FOUND, "Không tìm thấy batch");
    }
    Json(json!({ "deleted": before - rows.len() })).into_response()
}

#[derive(Deserialize)]
struct BulkBody {
    records: Vec<Value>,
    #[serde(default)]
    removed_ids: Vec<i64>,
}

async fn bulk_upsert(State(state): State<FamilyState>, Json(body): Json<BulkBody>) -> Response {
    let mut store = state.store.lock().await;
    if let Some((status, rejection)) = store.bulk_rejection.take() {
        return (status, Json(rejection)).into_response();
    }

    let known: Vec<i64> = store.family(state.family).iter().filter_map(record_id).collect();
    let unknown: Vec<Value> = body
        .records
        .iter()
        .enumerate()
        .filter_map(|(index, r)| match record_id(r) {
            Some(id) if id > 0 && !known.contains(&id) => {
                Some(json!({ "index": index, "error": format!("Không tìm thấy hóa đơn id {}", id) }))
            }
            _ => None,
        })
        .collect();
    if !unknown.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(Value::Array(unknown))).into_response();
    }

    store
        .family(state.family)
        .retain(|r| record_id(r).map_or(true, |id| !body.removed_ids.contains(&id)));

    let mut saved = Vec::with_capacity(body.records.len());
    for mut record in body.records {
        match record_id(&record).filter(|id| *id > 0) {
            Some(id) => {
                let rows = store.family(state.family);
                if let Some(existing) = rows.iter_mut().find(|r| record_id(r) == Some(id)) {
                    merge_into(existing, record);
                    saved.push(existing.clone());
                }
            }
            None => {
                let id = store.allocate_id();
                record["id"] = json!(id);
                store.family(state.family).push(record.clone());
                saved.push(record);
            }
        }
    }
    Json(Value::Array(saved)).into_response()
}

async fn export(State(state): State<FamilyState>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", state.family.export_filename());
    (
        [
            (header::CONTENT_TYPE, domain_invoice::ports::XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        XLSX_BYTES,
    )
        .into_response()
}

// ============================================================================
// Accounts
// ============================================================================

async fn me(State(store): State<Shared>, request: Request<Body>) -> Response {
    let Some(id) = request.extensions().get::<UserId>().copied() else {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    };
    let mut store = store.lock().await;
    match store.user_mut(id.value()) {
        Some(stored) => Json(json!({
            "id": stored.user.id,
            "username": stored.user.username,
            "email": stored.user.email,
            "role": stored.user.role,
            "roles": stored.user.role.iter().collect::<Vec<_>>(),
            "permissions": stored.permissions,
            "is_active": stored.user.is_active,
        }))
        .into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn list_users(State(store): State<Shared>) -> Response {
    let store = store.lock().await;
    let users: Vec<&User> = store.users.iter().map(|u| &u.user).collect();
    Json(users).into_response()
}

async fn get_user(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    match store.lock().await.user_mut(id) {
        Some(stored) => Json(stored.user.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

#[derive(Deserialize)]
struct CreateUserBody {
    username: String,
    email: String,
    password: String,
    role: Role,
}

async fn create_user(State(store): State<Shared>, Json(body): Json<CreateUserBody>) -> Response {
    let mut store = store.lock().await;
    if store.users.iter().any(|u| u.user.username == body.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    let id = store.users.iter().map(|u| u.user.id.value()).max().unwrap_or(0) + 1;
    let user = User {
        id: UserId::new(id),
        username: body.username,
        email: body.email,
        role: Some(body.role.as_str().to_string()),
        is_active: true,
        created_at: Some(*REFERENCE_TIME),
        updated_at: Some(*REFERENCE_TIME),
    };
    store.insert_user(user.clone(), &body.password);
    Json(user).into_response()
}

async fn update_user(State(store): State<Shared>, Path(id): Path<i64>, Json(changes): Json<Map<String, Value>>) -> Response {
    let mut store = store.lock().await;
    let Some(stored) = store.user_mut(id) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(username) = changes.get("username").and_then(Value::as_str) {
        stored.user.username = username.to_string();
    }
    if let Some(email) = changes.get("email").and_then(Value::as_str) {
        stored.user.email = email.to_string();
    }
    if let Some(password) = changes.get("password").and_then(Value::as_str) {
        stored.password = password.to_string();
    }
    if let Some(role) = changes.get("role").and_then(Value::as_str) {
        stored.user.role = Some(role.to_string());
    }
    if let Some(active) = changes.get("is_active").and_then(Value::as_bool) {
        stored.user.is_active = active;
    }
    Json(stored.user.clone()).into_response()
}

async fn delete_user(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut store = store.lock().await;
    let before = store.users.len();
    store.users.retain(|u| u.user.id.value() != id);
    if store.users.len() == before {
        return detail(StatusCode::NOT_FOUND, "User not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn user_permissions(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    match store.lock().await.user_mut(id) {
        Some(stored) => Json(stored.permissions.iter().collect::<Vec<_>>()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

#[derive(Deserialize)]
struct PermissionBody {
    permission_name: String,
}

async fn add_permission(State(store): State<Shared>, Path(id): Path<i64>, Json(body): Json<PermissionBody>) -> Response {
    if !permission::ALL.contains(&body.permission_name.as_str()) {
        return detail(StatusCode::BAD_REQUEST, "Unknown permission");
    }
    match store.lock().await.user_mut(id) {
        Some(stored) => {
            stored.permissions.grant(body.permission_name);
            Json(json!({ "message": "Permission added" })).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn remove_permission(
    State(store): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<PermissionBody>,
) -> Response {
    match store.lock().await.user_mut(id) {
        Some(stored) => {
            stored.permissions.revoke(&body.permission_name);
            Json(json!({ "message": "Permission removed" })).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn list_permissions() -> Response {
    let listed: Vec<Value> = permission::ALL
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i + 1, "name": name, "description": null }))
        .collect();
    Json(listed).into_response()
}

// ============================================================================
// Reports
// ============================================================================

fn in_range(day: &str, query: &HashMap<String, String>) -> bool {
    let day = day.get(..10).unwrap_or(day);
    query.get("from").map_or(true, |f| day >= f.as_str()) && query.get("to").map_or(true, |t| day <= t.as_str())
}

async fn summary(State(store): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Response {
    let store = store.lock().await;
    let rows: Vec<&SummaryRow> = store.summary.iter().filter(|r| in_range(&r.period, &query)).collect();
    Json(rows).into_response()
}

async fn commission(State(store): State<Shared>) -> Response {
    Json(store.lock().await.commission.clone()).into_response()
}

async fn due(State(store): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Response {
    let store = store.lock().await;
    let rows: Vec<&DueInvoice> = store
        .due
        .iter()
        .filter(|d| in_range(&d.start.format("%Y-%m-%d").to_string(), &query))
        .collect();
    Json(rows).into_response()
}
