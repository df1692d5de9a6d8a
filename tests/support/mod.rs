//! In-process stand-in for the cbx.life backend.
//!
//! Serves the same paths and shapes as the real service from memory, on an
//! ephemeral port. Amounts follow the backend's convention: written in
//! dollars, stored and listed in cents. Every request bumps a counter so
//! tests can assert that no request was made.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::{Form, Path, Query, RawQuery, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get, patch, post};
use cbx_life::{ApiClient, ClientConfig, MemoryTokenStore, SessionStore, TokenStore};
use serde::Deserialize;
use serde_json::{Value, json};

pub const PASSWORD: &str = "hunter22";

type Reply = Result<Response, Response>;

#[derive(Clone, Default)]
struct Backend {
    db: Arc<Mutex<Db>>,
    hits: Arc<AtomicUsize>,
    identity_body: Arc<Mutex<Option<Value>>>,
}

impl Backend {
    fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap()
    }
}

#[derive(Default)]
struct Db {
    next_id: i64,
    users: Vec<User>,
    expenses: Vec<Value>,
    applications: Vec<Value>,
    profiles: HashMap<i64, Value>,
    supply: Vec<Value>,
    surveys: Vec<Value>,
    responses: Vec<Value>,
}

impl Db {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<i64, Response> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| token.strip_prefix("token-"))
            .and_then(|id| id.parse::<i64>().ok())
            .filter(|id| self.user(*id).is_some())
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

#[derive(Clone)]
struct User {
    id: i64,
    email: String,
    phone: Option<String>,
    full_name: String,
    password: String,
}

impl User {
    fn identity(&self) -> Value {
        json!({ "email": self.email, "phone": self.phone, "full_name": self.full_name })
    }

    fn record(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "phone": self.phone,
            "full_name": self.full_name,
            "is_active": true,
        })
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn ok(value: Value) -> Reply {
    Ok(Json(value).into_response())
}

fn owned_by(record: &Value, user_id: i64) -> bool {
    record["user_id"].as_i64() == Some(user_id)
}

// =============================================================================
// HARNESS
// =============================================================================

pub struct MockBackend {
    pub base_url: String,
    backend: Backend,
}

impl MockBackend {
    pub async fn start() -> Self {
        let backend = Backend::default();
        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), backend }
    }

    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.backend.hits.load(Ordering::SeqCst)
    }

    /// Answer every `GET /auth/me` with `body` and 200, whatever the token.
    pub fn serve_identity(&self, body: Value) {
        *self.backend.identity_body.lock().unwrap() = Some(body);
    }

    /// Create a user directly and return a valid token for them.
    pub fn seed_user(&self, email: &str, full_name: &str) -> String {
        let mut db = self.backend.db();
        let id = db.id();
        db.users.push(User {
            id,
            email: email.to_owned(),
            phone: None,
            full_name: full_name.to_owned(),
            password: PASSWORD.to_owned(),
        });
        format!("token-{id}")
    }

    pub fn client(&self, tokens: Arc<MemoryTokenStore>) -> ApiClient {
        let store: Arc<dyn TokenStore> = tokens;
        ApiClient::new(&ClientConfig::new(&self.base_url), store)
    }

    /// Session over a fresh in-memory token store.
    pub fn session(&self) -> (SessionStore, Arc<MemoryTokenStore>) {
        let tokens = Arc::new(MemoryTokenStore::new());
        (SessionStore::new(self.client(tokens.clone())), tokens)
    }

    /// Session already holding `token`, not yet restored.
    pub fn session_with_token(&self, token: &str) -> (SessionStore, Arc<MemoryTokenStore>) {
        let tokens = Arc::new(MemoryTokenStore::with_token(token));
        (SessionStore::new(self.client(tokens.clone())), tokens)
    }
}

async fn count(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me).patch(update_me))
        .route("/portal/stats", get(portal_stats))
        .route("/accounting/categories", get(categories))
        .route("/accounting/expenses", get(list_expenses).post(create_expense))
        .route("/accounting/expenses/{id}", patch(update_expense).delete(delete_expense))
        .route("/accounting/summary", get(summary))
        .route("/career/applications", get(list_applications).post(create_application))
        .route("/career/applications/{id}", patch(update_application_status))
        .route("/career/profile", get(career_profile).put(save_career_profile))
        .route("/supply/items", get(list_supply).post(create_supply))
        .route("/supply/items/{id}", patch(update_supply_status).delete(delete_supply))
        .route("/surveys/", get(list_surveys).post(create_survey))
        .route("/surveys/{id}", get(get_survey))
        .route("/surveys/{id}/responses", post(submit_response))
        .route("/errors/detail", get(error_detail))
        .route("/errors/validation", get(error_validation))
        .route("/errors/plain", get(error_plain))
        .route("/errors/empty", get(error_empty))
        .route("/echo/auth", get(echo_auth))
        .route("/echo/headers", any(echo_headers))
        .layer(middleware::from_fn_with_state(backend.clone(), count))
        .with_state(backend)
}

// =============================================================================
// AUTH
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    full_name: String,
    phone: Option<String>,
}

async fn register(State(backend): State<Backend>, Json(body): Json<RegisterBody>) -> Reply {
    let mut db = backend.db();
    if db.users.iter().any(|u| u.email == body.email) {
        return Err(detail(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let id = db.id();
    let user = User {
        id,
        email: body.email,
        phone: body.phone,
        full_name: body.full_name,
        password: body.password,
    };
    let record = user.record();
    db.users.push(user);
    ok(record)
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(backend): State<Backend>, Form(form): Form<LoginForm>) -> Reply {
    let db = backend.db();
    let user = db
        .users
        .iter()
        .find(|u| u.email == form.username || u.phone.as_deref() == Some(form.username.as_str()))
        .filter(|u| u.password == form.password)
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Incorrect username or password"))?;
    ok(json!({ "access_token": format!("token-{}", user.id), "token_type": "bearer" }))
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    if let Some(body) = backend.identity_body.lock().unwrap().clone() {
        return ok(body);
    }
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    ok(db.user(user_id).map(User::identity).unwrap_or_default())
}

#[derive(Deserialize)]
struct ProfileBody {
    full_name: Option<String>,
    phone: Option<String>,
}

async fn update_me(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<ProfileBody>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let user = db.users.iter_mut().find(|u| u.id == user_id).unwrap();
    if let Some(full_name) = body.full_name {
        user.full_name = full_name;
    }
    user.phone = body.phone;
    ok(user.record())
}

// =============================================================================
// PORTAL
// =============================================================================

async fn portal_stats(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    let name = db.user(user_id).map(|u| u.full_name.clone()).unwrap_or_default();
    let to_buy = db
        .supply
        .iter()
        .filter(|i| owned_by(i, user_id) && i["status"] == "TO_BUY")
        .count();
    ok(json!({
        "greeting": format!("Welcome back, {name}"),
        "modules": [
            { "id": "accounting", "name": "Accounting", "status": "active", "notifications": 0 },
            { "id": "career", "name": "Career", "status": "active", "notifications": 0 },
            { "id": "supply", "name": "Supply", "status": "active", "notifications": to_buy },
            { "id": "survey", "name": "Survey", "status": "active", "notifications": 0 },
        ],
    }))
}

// =============================================================================
// ACCOUNTING
// =============================================================================

async fn categories(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    backend.db().authorize(&headers)?;
    ok(json!([
        { "id": 1, "name": "Food", "icon": "food" },
        { "id": 2, "name": "Salary", "icon": "money" },
    ]))
}

async fn list_expenses(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    let mine: Vec<Value> = db.expenses.iter().filter(|e| owned_by(e, user_id)).cloned().collect();
    ok(Value::Array(mine))
}

fn expense_fields(target: &mut Value, body: &Value) {
    for key in ["description", "date", "is_income", "category_id"] {
        if let Some(value) = body.get(key) {
            target[key] = value.clone();
        }
    }
    if let Some(dollars) = body.get("amount").and_then(Value::as_f64) {
        target["amount"] = json!((dollars * 100.0).round());
    }
}

async fn create_expense(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let id = db.id();
    let mut expense = json!({ "id": id, "user_id": user_id, "created_at": "2026-01-01T00:00:00" });
    expense_fields(&mut expense, &body);
    db.expenses.push(expense.clone());
    ok(expense)
}

async fn update_expense(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let expense = db
        .expenses
        .iter_mut()
        .find(|e| e["id"] == id && owned_by(e, user_id))
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Expense not found"))?;
    expense_fields(expense, &body);
    ok(expense.clone())
}

async fn delete_expense(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let before = db.expenses.len();
    db.expenses.retain(|e| !(e["id"] == id && owned_by(e, user_id)));
    if db.expenses.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Expense not found"));
    }
    ok(json!({ "ok": true }))
}

async fn summary(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    let (mut income, mut expense) = (0.0, 0.0);
    for entry in db.expenses.iter().filter(|e| owned_by(e, user_id)) {
        let cents = entry["amount"].as_f64().unwrap_or_default();
        if entry["is_income"].as_bool().unwrap_or_default() {
            income += cents;
        } else {
            expense += cents;
        }
    }
    ok(json!({
        "income": income / 100.0,
        "expense": expense / 100.0,
        "balance": (income - expense) / 100.0,
    }))
}

// =============================================================================
// CAREER
// =============================================================================

#[derive(Deserialize)]
struct StatusQuery {
    status: String,
}

async fn list_applications(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    let mine: Vec<Value> = db.applications.iter().filter(|a| owned_by(a, user_id)).cloned().collect();
    ok(Value::Array(mine))
}

async fn create_application(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let id = db.id();
    let mut application = body;
    application["id"] = json!(id);
    application["user_id"] = json!(user_id);
    application["application_date"] = json!("2026-01-01");
    db.applications.push(application.clone());
    ok(application)
}

async fn update_application_status(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let application = db
        .applications
        .iter_mut()
        .find(|a| a["id"] == id && owned_by(a, user_id))
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Application not found"))?;
    application["status"] = json!(query.status);
    ok(application.clone())
}

async fn career_profile(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let profile = db
        .profiles
        .entry(user_id)
        .or_insert_with(|| json!({ "id": user_id, "headline": null, "skills": [], "experience": [], "education": [] }));
    ok(profile.clone())
}

async fn save_career_profile(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let mut profile = body;
    profile["id"] = json!(user_id);
    db.profiles.insert(user_id, profile.clone());
    ok(profile)
}

// =============================================================================
// SUPPLY
// =============================================================================

async fn list_supply(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    let mine: Vec<Value> = db.supply.iter().filter(|i| owned_by(i, user_id)).cloned().collect();
    ok(Value::Array(mine))
}

async fn create_supply(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let id = db.id();
    let mut item = body;
    item["id"] = json!(id);
    item["user_id"] = json!(user_id);
    db.supply.push(item.clone());
    ok(item)
}

async fn update_supply_status(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let item = db
        .supply
        .iter_mut()
        .find(|i| i["id"] == id && owned_by(i, user_id))
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Item not found"))?;
    item["status"] = json!(query.status);
    ok(item.clone())
}

async fn delete_supply(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let before = db.supply.len();
    db.supply.retain(|i| !(i["id"] == id && owned_by(i, user_id)));
    if db.supply.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Item not found"));
    }
    ok(json!({ "ok": true }))
}

// =============================================================================
// SURVEY
// =============================================================================

async fn list_surveys(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let db = backend.db();
    let user_id = db.authorize(&headers)?;
    let mine: Vec<Value> = db
        .surveys
        .iter()
        .filter(|s| s["owner_id"].as_i64() == Some(user_id))
        .cloned()
        .collect();
    ok(Value::Array(mine))
}

async fn create_survey(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    let user_id = db.authorize(&headers)?;
    let id = db.id();
    let mut survey = body;
    survey["id"] = json!(id);
    survey["owner_id"] = json!(user_id);
    survey["is_active"] = json!(true);
    db.surveys.push(survey.clone());
    ok(survey)
}

async fn get_survey(State(backend): State<Backend>, Path(id): Path<i64>) -> Reply {
    let db = backend.db();
    db.surveys
        .iter()
        .find(|s| s["id"] == id)
        .cloned()
        .map(|s| Json(s).into_response())
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Survey not found"))
}

async fn submit_response(State(backend): State<Backend>, Path(id): Path<i64>, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    if !db.surveys.iter().any(|s| s["id"] == id) {
        return Err(detail(StatusCode::NOT_FOUND, "Survey not found"));
    }
    let response_id = db.id();
    let response = json!({ "id": response_id, "survey_id": id, "answers": body["answers"] });
    db.responses.push(response.clone());
    ok(response)
}

// =============================================================================
// FAILURE FIXTURES
// =============================================================================

async fn error_detail() -> Response {
    detail(StatusCode::BAD_REQUEST, "X")
}

async fn error_validation() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{ "msg": "field required" }, { "msg": "value is not a valid email" }] })),
    )
        .into_response()
}

async fn error_plain() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn error_empty() -> Response {
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    Json(json!({ "authorization": authorization }))
}

async fn echo_headers(method: Method, RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    Json(json!({ "method": method.as_str(), "query": query, "content_type": content_type }))
}
