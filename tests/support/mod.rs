//! In-process stand-in for the employee-management backend.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServerHandle, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Next, from_fn};
use actix_web::{App, Error, HttpMessage, HttpResponse, HttpServer, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use hrm_admin::{AdminConsole, Config};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
const SECRET: &str = "test-secret";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn issue_token(user_id: &str, username: &str, ttl_secs: i64) -> String {
    let claims = Claims {
        user_id: user_id.to_string(),
        sub: username.to_string(),
        exp: (now() as i64 + ttl_secs).max(0) as usize,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn verify_token(token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

/// Everything the fake backend knows and remembers.
pub struct BackendState {
    users: Mutex<HashMap<String, (String, String)>>,
    employees: Mutex<BTreeMap<String, Value>>,
    salaries: Mutex<HashMap<(String, String), Value>>,
    hits: Mutex<HashMap<String, usize>>,
    failures: Mutex<HashMap<String, usize>>,
    auth_headers: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, Value)>>,
    list_delay: Mutex<Duration>,
}

impl BackendState {
    fn new() -> Self {
        let mut users = HashMap::new();
        users.insert(
            ADMIN_USER.to_string(),
            ("1".to_string(), ADMIN_PASSWORD.to_string()),
        );

        let mut employees = BTreeMap::new();
        employees.insert("10001".to_string(), sample_employee("10001", "Garcia", "Manuel III", 90000));
        employees.insert("10002".to_string(), sample_employee("10002", "Lim", "Antonio", 60000));

        let mut salaries = HashMap::new();
        salaries.insert(
            ("10001".to_string(), "2024-06".to_string()),
            json!({
                "employeeNumber": "10001",
                "yearMonth": "2024-06",
                "monthlyWorkedHours": 168.25,
                "grossMonthlySalary": 90133.18,
                "monthlySssDeduction": 1125.00,
                "monthlyPhilhealthDeduction": 1350.00,
                "monthlyPagibigDeduction": 100.00,
                "monthlyWithholdingTax": 17656.47,
                "totalDeductions": 20231.47,
                "netMonthlySalary": 69901.71
            }),
        );

        Self {
            users: Mutex::new(users),
            employees: Mutex::new(employees),
            salaries: Mutex::new(salaries),
            hits: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            auth_headers: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            list_delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Number of requests seen for e.g. `"GET /api/protected/employees"`.
    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    /// Answer the next `count` requests for `key` with a 500.
    pub fn fail_next(&self, key: &str, count: usize) {
        self.failures.lock().unwrap().insert(key.to_string(), count);
    }

    /// Make the employee list answer late, after it has read the data.
    pub fn delay_list(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    pub fn auth_headers(&self) -> Vec<String> {
        self.auth_headers.lock().unwrap().clone()
    }

    /// JSON bodies received, keyed like [`BackendState::hits`].
    pub fn bodies(&self, key: &str) -> Vec<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn employee(&self, number: &str) -> Option<Value> {
        self.employees.lock().unwrap().get(number).cloned()
    }

    fn take_failure(&self, key: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(key) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

pub fn sample_employee(number: &str, last: &str, first: &str, salary: i64) -> Value {
    json!({
        "employeeNumber": number,
        "lastName": last,
        "firstName": first,
        "birthday": "10/11/1983",
        "address": "Valero Carpark Building Valero Street 1227, Makati City",
        "phoneNumber": "966-860-270",
        "sssNumber": "44-4506057-3",
        "philhealthNumber": "820126853951",
        "tinNumber": "442-605-657-000",
        "pagibigNumber": "691295330870",
        "status": "Regular",
        "position": "Chief Executive Officer",
        "immediateSupervisor": null,
        "basicSalary": salary,
        "riceSubsidy": 1500,
        "phoneAllowance": 2000,
        "clothingAllowance": 1000,
        "grossSemiMonthlyRate": salary / 2,
        "hourlyRate": 535.71
    })
}

type State = web::Data<BackendState>;

fn message(text: impl Into<String>) -> Value {
    json!({ "message": text.into() })
}

// -------------------- Middleware --------------------

async fn record_request(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let key = format!("{} {}", req.method(), req.path());
    if let Some(state) = req.app_data::<State>() {
        *state.hits.lock().unwrap().entry(key.clone()).or_default() += 1;
        if state.take_failure(&key) {
            let resp = HttpResponse::InternalServerError().finish();
            return Ok(req.into_response(resp));
        }
    }
    next.call(req).await.map(ServiceResponse::map_into_boxed_body)
}

async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    if let (Some(state), Some(h)) = (req.app_data::<State>(), &header) {
        state.auth_headers.lock().unwrap().push(h.clone());
    }

    let token = match header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t.to_string(),
        None => {
            let resp = HttpResponse::Unauthorized().json(message("Missing or invalid token"));
            return Ok(req.into_response(resp));
        }
    };

    match verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.call(req).await
        }
        Err(e) => {
            let resp = HttpResponse::Unauthorized().json(message(format!("Invalid or expired token: {}", e)));
            Ok(req.into_response(resp))
        }
    }
}

// -------------------- Handlers --------------------

#[derive(Deserialize)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

/// Accepts JSON or a url-encoded form.
async fn login(
    state: State,
    body: web::Either<web::Json<Credentials>, web::Form<Credentials>>,
) -> HttpResponse {
    let body = match body {
        web::Either::Left(web::Json(c)) => c,
        web::Either::Right(web::Form(c)) => c,
    };
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return HttpResponse::BadRequest().json(message("Username and password are required"));
    };
    let users = state.users.lock().unwrap();
    match users.get(&username) {
        Some((id, stored)) if *stored == password => HttpResponse::Ok().json(json!({
            "id": id,
            "username": username,
            "token": issue_token(id, &username, 3600),
            "message": "Login successful"
        })),
        _ => HttpResponse::Unauthorized().json(json!({
            "id": null,
            "username": username,
            "token": null,
            "message": "Invalid username or password"
        })),
    }
}

async fn register(state: State, body: web::Json<Credentials>) -> HttpResponse {
    let (Some(username), Some(password)) = (body.username.clone(), body.password.clone()) else {
        return HttpResponse::BadRequest()
            .json(message("Username and password are required for registration"));
    };
    let mut users = state.users.lock().unwrap();
    if users.contains_key(&username) {
        return HttpResponse::Conflict().json(json!({
            "id": null, "username": username, "token": null,
            "message": "Username already exists."
        }));
    }
    let id = (users.len() + 1).to_string();
    users.insert(username.clone(), (id.clone(), password));
    HttpResponse::Created().json(json!({
        "id": id,
        "username": username,
        "token": issue_token(&id, &username, 3600),
        "message": "User registered successfully"
    }))
}

async fn list_employees(state: State) -> HttpResponse {
    let summaries: Vec<Value> = state
        .employees
        .lock()
        .unwrap()
        .values()
        .map(|e| {
            json!({
                "employeeNumber": e["employeeNumber"],
                "firstName": e["firstName"],
                "lastName": e["lastName"],
                "sssNumber": e["sssNumber"],
                "philhealthNumber": e["philhealthNumber"],
                "tinNumber": e["tinNumber"],
                "pagibigNumber": e["pagibigNumber"],
            })
        })
        .collect();

    let delay = *state.list_delay.lock().unwrap();
    if !delay.is_zero() {
        actix_web::rt::time::sleep(delay).await;
    }
    HttpResponse::Ok().json(summaries)
}

async fn get_employee(state: State, path: web::Path<String>) -> HttpResponse {
    let number = path.into_inner();
    match state.employees.lock().unwrap().get(&number) {
        Some(e) => HttpResponse::Ok().json(e),
        None => HttpResponse::NotFound()
            .json(message(format!("Employee with number {} not found.", number))),
    }
}

async fn create_employee(state: State, body: web::Json<Value>) -> HttpResponse {
    let body = body.into_inner();
    state
        .bodies
        .lock()
        .unwrap()
        .push(("POST /api/protected/employees".to_string(), body.clone()));

    let number = body["employeeNumber"].as_str().unwrap_or("").to_string();
    if number.is_empty() {
        return HttpResponse::BadRequest()
            .json(message("Employee number is required to create a new employee."));
    }
    let mut employees = state.employees.lock().unwrap();
    if employees.contains_key(&number) {
        return HttpResponse::BadRequest()
            .json(message(format!("Employee with number {} already exists.", number)));
    }
    employees.insert(number, body.clone());
    HttpResponse::Created().json(body)
}

async fn update_employee(state: State, path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    let number = path.into_inner();
    let body = body.into_inner();
    state
        .bodies
        .lock()
        .unwrap()
        .push((format!("PATCH /api/protected/employees/{}", number), body.clone()));

    let mut employees = state.employees.lock().unwrap();
    let Some(existing) = employees.get_mut(&number) else {
        return HttpResponse::NotFound()
            .json(message(format!("Employee with number {} not found for update.", number)));
    };
    if let (Some(target), Some(changes)) = (existing.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    HttpResponse::Ok().json(existing.clone())
}

async fn delete_employee(state: State, path: web::Path<String>) -> HttpResponse {
    let number = path.into_inner();
    match state.employees.lock().unwrap().remove(&number) {
        Some(_) => HttpResponse::NoContent().finish(),
        None => HttpResponse::NotFound()
            .json(message(format!("Employee with number {} not found for deletion.", number))),
    }
}

async fn monthly_cutoffs() -> HttpResponse {
    HttpResponse::Ok().json(json!([
        {"yearMonth": "2024-06", "startDate": "Jun 1", "endDate": "Jun 30"},
        {"yearMonth": "2024-07", "startDate": "Jul 1", "endDate": "Jul 31"}
    ]))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalaryQuery {
    year_month: Option<String>,
}

async fn monthly_salary(state: State, path: web::Path<String>, query: web::Query<SalaryQuery>) -> HttpResponse {
    let number = path.into_inner();
    let Some(year_month) = query.into_inner().year_month.filter(|s| !s.is_empty()) else {
        return HttpResponse::BadRequest().json(message("Missing 'yearMonth' query parameter."));
    };
    if !state.employees.lock().unwrap().contains_key(&number) {
        return HttpResponse::NotFound()
            .json(message(format!("Employee with number {} not found.", number)));
    }
    match state.salaries.lock().unwrap().get(&(number.clone(), year_month.clone())) {
        Some(s) => HttpResponse::Ok().json(s),
        // no attendance recorded for that month
        None => HttpResponse::Ok().json(json!({
            "employeeNumber": number,
            "yearMonth": year_month,
            "monthlyWorkedHours": null
        })),
    }
}

fn configure(cfg: &mut web::ServiceConfig) {
    // Public
    cfg.service(web::resource("/api/login").route(web::post().to(login)));

    // Protected
    cfg.service(
        web::resource("/api/register")
            .wrap(from_fn(auth_middleware))
            .route(web::post().to(register)),
    );
    cfg.service(
        web::scope("/api/protected")
            .wrap(from_fn(auth_middleware))
            .service(
                web::resource("/employees")
                    .route(web::get().to(list_employees))
                    .route(web::post().to(create_employee)),
            )
            .service(
                web::resource("/employees/{employee_number}")
                    .route(web::get().to(get_employee))
                    .route(web::patch().to(update_employee))
                    .route(web::delete().to(delete_employee)),
            )
            .service(
                web::resource("/employees/{employee_number}/salary")
                    .route(web::get().to(monthly_salary)),
            )
            .service(web::resource("/monthly-cutoffs").route(web::get().to(monthly_cutoffs))),
    );
}

pub struct MockBackend {
    pub base_url: String,
    pub state: State,
    handle: ServerHandle,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = web::Data::new(BackendState::new());
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .wrap(from_fn(record_request))
                .configure(configure)
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .unwrap()
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            handle,
        }
    }

    pub fn config(&self, dir: &Path) -> Config {
        let mut config = Config::new(self.base_url.clone());
        config.session_file = dir.join("session.json");
        config.request_timeout = Duration::from_secs(10);
        config
    }

    pub fn console(&self, dir: &Path) -> AdminConsole {
        AdminConsole::new(&self.config(dir)).unwrap()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
