#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use job_platform_client::{
    config::{Config, StatusUpdateErrors},
    models::{Application, ApplicationStatus, Job, Role, User},
    session::SessionStore,
    AppState,
};
use serde_json::{json, Value as JsonValue};

/// A request as seen by the mock backend, path relative to `/api`.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl Recorded {
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }
}

struct Account {
    role: Role,
    user: User,
    password: String,
}

#[derive(Default)]
struct MockState {
    accounts: Vec<Account>,
    tokens: HashMap<String, (Role, i64)>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    next_id: i64,
    failures: HashMap<String, (StatusCode, String)>,
    delays: HashMap<String, Duration>,
    requests: Vec<Recorded>,
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process stand-in for the job board backend.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn add_user(&self, role: Role, name: &str, email: &str, password: &str) -> User {
        let mut state = self.lock();
        let user = User {
            id: state.next_id(),
            name: name.to_string(),
            email: email.to_string(),
            ..User::default()
        };
        state.accounts.push(Account {
            role,
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    pub fn add_job(&self, posted_by: i64, title: &str, company: &str, location: &str) -> Job {
        let mut state = self.lock();
        let job = Job {
            id: state.next_id(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            description: format!("{} at {}", title, company),
            posted_by: Some(posted_by),
        };
        state.jobs.push(job.clone());
        job
    }

    pub fn add_application(
        &self,
        job_id: i64,
        candidate_id: i64,
        status: ApplicationStatus,
    ) -> Application {
        let mut state = self.lock();
        let app = Application {
            id: state.next_id(),
            job_id,
            candidate_id,
            status,
        };
        state.applications.push(app.clone());
        app
    }

    /// The next request to `path` fails with `status` and `body`.
    pub fn fail_next(&self, path: &str, status: u16, body: &str) {
        self.lock().failures.insert(
            path.to_string(),
            (StatusCode::from_u16(status).unwrap(), body.to_string()),
        );
    }

    /// The next request to `path` is held for `delay` before being handled.
    pub fn delay_next(&self, path: &str, delay: Duration) {
        self.lock().delays.insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.lock().jobs.clone()
    }

    pub fn applications(&self) -> Vec<Application> {
        self.lock().applications.clone()
    }

    pub fn token_for(role: Role, user_id: i64) -> String {
        format!("{}-token-{}", role, user_id)
    }

    /// Serves the backend on an ephemeral port and returns its `/api` base URL.
    pub async fn spawn(&self) -> String {
        let app = router(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });
        format!("http://{}/api", addr)
    }
}

fn router(backend: MockBackend) -> Router {
    let mut router = Router::new();
    for role in Role::ALL {
        router = router
            .route(
                &format!("/api/{}/auth/login", role),
                post(move |state: State<MockBackend>, body: Json<JsonValue>| {
                    login(state, role, body)
                }),
            )
            .route(
                &format!("/api/{}/auth/register", role),
                post(move |state: State<MockBackend>, body: Json<JsonValue>| {
                    register(state, role, body)
                }),
            )
            .route(
                &format!("/api/{}/auth/profile", role),
                get(move |state: State<MockBackend>, headers: HeaderMap| {
                    get_profile(state, role, headers)
                })
                .put(
                    move |state: State<MockBackend>, headers: HeaderMap, body: Json<JsonValue>| {
                        update_profile(state, role, headers, body)
                    },
                ),
            )
            .route(
                &format!("/api/{}/jobs/all", role),
                get(
                    move |state: State<MockBackend>,
                          headers: HeaderMap,
                          query: Query<HashMap<String, String>>| {
                        list_jobs(state, role, headers, query)
                    },
                ),
            );
    }

    router
        .route("/api/hr/jobs/my", get(my_jobs))
        .route("/api/hr/jobs/add", post(add_job))
        .route("/api/apply", post(apply))
        .route("/api/candidate/applications", get(candidate_applications))
        .route("/api/hr/applications/:job_id", get(job_applications))
        .route("/api/hr/applications/:id/status", post(set_status))
        .route("/api/no-content", get(|| async { StatusCode::NO_CONTENT }))
        .layer(middleware::from_fn_with_state(backend.clone(), record_and_inject))
        .with_state(backend)
}

async fn record_and_inject(State(backend): State<MockBackend>, req: Request, next: Next) -> Response {
    let path = req
        .uri()
        .path()
        .trim_start_matches("/api")
        .to_string();
    let (failure, delay) = {
        let mut state = backend.lock();
        state.requests.push(Recorded {
            method: req.method().to_string(),
            path: path.clone(),
            query: req.uri().query().map(str::to_string),
            headers: req.headers().clone(),
        });
        (state.failures.remove(&path), state.delays.remove(&path))
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = failure {
        return (status, body).into_response();
    }
    next.run(req).await
}

fn text(status: StatusCode, body: &str) -> Response {
    (status, body.to_string()).into_response()
}

fn authed(backend: &MockBackend, headers: &HeaderMap, role: Role) -> Result<i64, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| text(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    match backend.lock().tokens.get(token) {
        Some((token_role, id)) if *token_role == role => Ok(*id),
        _ => Err(text(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

fn str_field(body: &JsonValue, key: &str) -> Option<String> {
    body.get(key)
        .and_then(JsonValue::as_str)
        .map(|s| s.trim().to_string())
}

async fn login(State(backend): State<MockBackend>, role: Role, Json(body): Json<JsonValue>) -> Response {
    let email = str_field(&body, "email").unwrap_or_default();
    let password = str_field(&body, "password").unwrap_or_default();
    let mut state = backend.lock();
    let Some(user) = state
        .accounts
        .iter()
        .find(|a| a.role == role && a.user.email == email && a.password == password)
        .map(|a| a.user.clone())
    else {
        return text(StatusCode::BAD_REQUEST, "Invalid credentials");
    };
    let token = MockBackend::token_for(role, user.id);
    state.tokens.insert(token.clone(), (role, user.id));
    Json(json!({ "token": token, "user": user })).into_response()
}

async fn register(State(backend): State<MockBackend>, role: Role, Json(body): Json<JsonValue>) -> Response {
    let email = str_field(&body, "email").unwrap_or_default();
    let mut state = backend.lock();
    if state
        .accounts
        .iter()
        .any(|a| a.role == role && a.user.email == email)
    {
        return text(StatusCode::CONFLICT, "Email already registered");
    }
    let user = User {
        id: state.next_id(),
        name: str_field(&body, "name").unwrap_or_default(),
        email,
        phone: str_field(&body, "phone"),
        resume: str_field(&body, "resume"),
    };
    state.accounts.push(Account {
        role,
        user: user.clone(),
        password: str_field(&body, "password").unwrap_or_default(),
    });
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn get_profile(State(backend): State<MockBackend>, role: Role, headers: HeaderMap) -> Response {
    let id = match authed(&backend, &headers, role) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let state = backend.lock();
    match state.accounts.iter().find(|a| a.user.id == id) {
        Some(account) => Json(account.user.clone()).into_response(),
        None => text(StatusCode::NOT_FOUND, "User not found"),
    }
}

/// Trims every submitted field, so the stored profile can differ from what
/// the client sent.
async fn update_profile(
    State(backend): State<MockBackend>,
    role: Role,
    headers: HeaderMap,
    Json(body): Json<JsonValue>,
) -> Response {
    let id = match authed(&backend, &headers, role) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut state = backend.lock();
    let Some(account) = state.accounts.iter_mut().find(|a| a.user.id == id) else {
        return text(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(name) = str_field(&body, "name") {
        account.user.name = name;
    }
    if let Some(email) = str_field(&body, "email") {
        account.user.email = email;
    }
    if let Some(phone) = str_field(&body, "phone") {
        account.user.phone = Some(phone);
    }
    if let Some(resume) = str_field(&body, "resume") {
        account.user.resume = Some(resume);
    }
    Json(account.user.clone()).into_response()
}

async fn list_jobs(
    State(backend): State<MockBackend>,
    role: Role,
    headers: HeaderMap,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authed(&backend, &headers, role) {
        return resp;
    }
    let matches = |value: &str, key: &str| {
        filters
            .get(key)
            .filter(|f| !f.is_empty())
            .map_or(true, |f| value.to_lowercase().contains(&f.to_lowercase()))
    };
    let jobs: Vec<Job> = backend
        .lock()
        .jobs
        .iter()
        .filter(|j| {
            matches(&j.title, "title") && matches(&j.company, "company") && matches(&j.location, "location")
        })
        .cloned()
        .collect();
    Json(jobs).into_response()
}

async fn my_jobs(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let id = match authed(&backend, &headers, Role::Hr) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let jobs: Vec<Job> = backend
        .lock()
        .jobs
        .iter()
        .filter(|j| j.posted_by == Some(id))
        .cloned()
        .collect();
    Json(jobs).into_response()
}

async fn add_job(State(backend): State<MockBackend>, headers: HeaderMap, Json(body): Json<JsonValue>) -> Response {
    if let Err(resp) = authed(&backend, &headers, Role::Hr) {
        return resp;
    }
    let mut state = backend.lock();
    let job = Job {
        id: state.next_id(),
        title: str_field(&body, "title").unwrap_or_default(),
        company: str_field(&body, "company").unwrap_or_default(),
        location: str_field(&body, "location").unwrap_or_default(),
        description: str_field(&body, "description").unwrap_or_default(),
        posted_by: body.get("postedBy").and_then(JsonValue::as_i64),
    };
    state.jobs.push(job.clone());
    Json(job).into_response()
}

async fn apply(State(backend): State<MockBackend>, headers: HeaderMap, Json(body): Json<JsonValue>) -> Response {
    let candidate_id = match authed(&backend, &headers, Role::Candidate) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Some(job_id) = body.get("jobId").and_then(JsonValue::as_i64) else {
        return text(StatusCode::BAD_REQUEST, "jobId is required");
    };
    let mut state = backend.lock();
    if !state.jobs.iter().any(|j| j.id == job_id) {
        return text(StatusCode::NOT_FOUND, "Job not found");
    }
    if state
        .applications
        .iter()
        .any(|a| a.job_id == job_id && a.candidate_id == candidate_id)
    {
        return text(StatusCode::BAD_REQUEST, "Already applied");
    }
    let app = Application {
        id: state.next_id(),
        job_id,
        candidate_id,
        status: ApplicationStatus::Pending,
    };
    state.applications.push(app.clone());
    Json(app).into_response()
}

async fn candidate_applications(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let id = match authed(&backend, &headers, Role::Candidate) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let apps: Vec<Application> = backend
        .lock()
        .applications
        .iter()
        .filter(|a| a.candidate_id == id)
        .cloned()
        .collect();
    Json(apps).into_response()
}

async fn job_applications(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Response {
    if let Err(resp) = authed(&backend, &headers, Role::Hr) {
        return resp;
    }
    let apps: Vec<Application> = backend
        .lock()
        .applications
        .iter()
        .filter(|a| a.job_id == job_id)
        .cloned()
        .collect();
    Json(apps).into_response()
}

async fn set_status(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authed(&backend, &headers, Role::Hr) {
        return resp;
    }
    let Some(status) = query
        .get("status")
        .and_then(|s| s.parse::<ApplicationStatus>().ok())
    else {
        return text(StatusCode::BAD_REQUEST, "Invalid status");
    };
    let mut state = backend.lock();
    match state.applications.iter_mut().find(|a| a.id == id) {
        Some(app) => {
            app.status = status;
            Json(app.clone()).into_response()
        }
        None => text(StatusCode::NOT_FOUND, "Application not found"),
    }
}

pub fn app_state(base_url: &str) -> AppState {
    AppState::new(Config::with_base_url(base_url), SessionStore::in_memory())
        .expect("app state")
}

pub fn app_state_with(base_url: &str, status_update_errors: StatusUpdateErrors) -> AppState {
    let config = Config {
        status_update_errors,
        ..Config::with_base_url(base_url)
    };
    AppState::new(config, SessionStore::in_memory()).expect("app state")
}

/// Spawns `backend` and signs `email` in as `role` through the real login call.
pub async fn signed_in(backend: &MockBackend, role: Role, email: &str, password: &str) -> AppState {
    let base_url = backend.spawn().await;
    let state = app_state(&base_url);
    state
        .auth_service
        .login(role, email, password)
        .await
        .expect("login");
    state
}
