//! User-facing flows: each action fetches or mutates through the query client
//! and says where to go next and what to tell the user.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    auth::session::SessionStore,
    config::Config,
    error::{ApiError, ConfigError},
    http::ApiClient,
    model::{
        employee::{EmployeeNumber, EmployeeUpdate, NewEmployee},
        payroll::YearMonth,
        user::Session,
    },
    utils::query_cache::QueryClient,
    view::{
        Notice, Route,
        employee::{EmployeeDetailView, EmployeeForm, EmployeeListView},
        salary::{CutoffOption, SalaryView, cutoff_options, default_year_month},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Blank,
    EmployeeList(EmployeeListView),
    EmployeeDetail(EmployeeDetailView),
    Cutoffs(Vec<CutoffOption>),
    Salary(SalaryView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub route: Route,
    pub notice: Option<Notice>,
    pub screen: Screen,
}

impl Outcome {
    fn go(route: Route) -> Self {
        Self {
            route,
            notice: None,
            screen: Screen::Blank,
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    fn with_screen(mut self, screen: Screen) -> Self {
        self.screen = screen;
        self
    }
}

#[derive(Clone)]
pub struct AdminConsole {
    query: QueryClient,
    currency: String,
}

impl AdminConsole {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let session = Arc::new(SessionStore::open(&config.session_file));
        let api = Arc::new(ApiClient::new(config, session)?);
        Ok(Self::from_parts(
            QueryClient::new(api, config.employee_stale),
            config.currency_symbol.clone(),
        ))
    }

    pub fn from_parts(query: QueryClient, currency: impl Into<String>) -> Self {
        Self {
            query,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn query(&self) -> &QueryClient {
        &self.query
    }

    pub fn session(&self) -> Option<Session> {
        self.query.api().session().current()
    }

    fn username(&self) -> Option<String> {
        self.session().map(|s| s.username)
    }

    // -------------------- Auth --------------------

    pub async fn login(&self, username: &str, password: &str) -> Outcome {
        match self.query.api().login(username, password).await {
            Ok(session) => {
                self.query.clear();
                Outcome::go(Route::Employees)
                    .with_notice(Notice::success(format!("Welcome, {}! Login successful", session.username)))
            }
            Err(e) => Outcome::go(Route::Login).with_notice(Notice::error(e.to_string())),
        }
    }

    pub fn logout(&self) -> Outcome {
        if let Err(e) = self.query.api().logout() {
            let path = self.query.api().session().path().display().to_string();
            warn!(error = %e, %path, "Failed to remove session file");
        }
        self.query.clear();
        Outcome::go(Route::Login).with_notice(Notice::info("Logged out"))
    }

    pub async fn register(&self, username: &str, password: &str) -> Outcome {
        match self.query.api().register(username, password).await {
            Ok(_) => Outcome::go(Route::Register).with_notice(Notice::success(format!(
                "User {} registered successfully",
                username.trim()
            ))),
            Err(e) => self.failed(e, Route::Register),
        }
    }

    // -------------------- Employees --------------------

    pub async fn employees(&self) -> Outcome {
        match self.query.employee_partial_details().await {
            Ok(Some(list)) => Outcome::go(Route::Employees)
                .with_screen(Screen::EmployeeList(EmployeeListView::new(&list))),
            Ok(None) => self.login_required(),
            Err(e) => self.failed(e, Route::Employees),
        }
    }

    pub async fn employee_detail(&self, employee_number: &EmployeeNumber) -> Outcome {
        let route = Route::EmployeeDetail(employee_number.clone());
        match self.query.employee(employee_number).await {
            Ok(Some(employee)) => Outcome::go(route).with_screen(Screen::EmployeeDetail(
                EmployeeDetailView::new(&employee, self.username().as_deref(), &self.currency),
            )),
            Ok(None) if employee_number.is_empty() => Outcome::go(Route::Employees)
                .with_notice(Notice::error("Employee number is required")),
            Ok(None) => self.login_required(),
            Err(e) => self.failed(e, route),
        }
    }

    /// The edit form prefilled from the backend record. A failed fetch comes
    /// back as the outcome to show instead.
    pub async fn edit_form(&self, employee_number: &EmployeeNumber) -> Result<EmployeeForm, Outcome> {
        match self.query.employee(employee_number).await {
            Ok(Some(employee)) => Ok(EmployeeForm::from_employee(&employee)),
            Ok(None) if employee_number.is_empty() => Err(Outcome::go(Route::Employees)
                .with_notice(Notice::error("Employee number is required"))),
            Ok(None) => Err(self.login_required()),
            Err(e) => Err(self.failed(e, Route::EmployeeDetail(employee_number.clone()))),
        }
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> Outcome {
        match self.query.create_employee(employee).await {
            Ok(created) => {
                let number = created.employee_number.clone();
                info!(employee_number = %number, "Employee created");
                Outcome::go(Route::EmployeeDetail(number.clone()))
                    .with_notice(Notice::success(format!("Employee {} created successfully!", number)))
                    .with_screen(Screen::EmployeeDetail(EmployeeDetailView::new(
                        &created,
                        self.username().as_deref(),
                        &self.currency,
                    )))
            }
            Err(e) => self.failed(e, Route::Employees),
        }
    }

    /// Saves, then shows the record as refetched from the backend.
    pub async fn update_employee(&self, employee_number: &EmployeeNumber, update: &EmployeeUpdate) -> Outcome {
        let route = Route::EmployeeDetail(employee_number.clone());
        if let Err(e) = self.query.update_employee(employee_number, update).await {
            return self.failed(e, route);
        }
        let outcome = self.employee_detail(employee_number).await;
        match outcome.notice {
            Some(_) => outcome,
            None => outcome.with_notice(Notice::success("Employee updated successfully!")),
        }
    }

    pub async fn delete_employee(&self, employee_number: &EmployeeNumber) -> Outcome {
        match self.query.delete_employee(employee_number).await {
            Ok(message) => {
                info!(%message, "Delete acknowledged");
                Outcome::go(Route::Employees).with_notice(Notice::success("Employee deleted successfully!"))
            }
            Err(e) => self.failed(e, Route::EmployeeDetail(employee_number.clone())),
        }
    }

    // -------------------- Salary --------------------

    pub async fn cutoffs(&self) -> Outcome {
        match self.query.monthly_cutoffs(true).await {
            Ok(Some(cutoffs)) => Outcome::go(Route::Employees)
                .with_screen(Screen::Cutoffs(cutoff_options(&cutoffs))),
            Ok(None) => self.login_required(),
            Err(e) => self.failed(e, Route::Employees),
        }
    }

    /// Without a month the latest cutoff is used.
    pub async fn salary(&self, employee_number: &EmployeeNumber, year_month: Option<YearMonth>) -> Outcome {
        let route = Route::EmployeeDetail(employee_number.clone());

        let year_month = match year_month {
            Some(ym) => ym,
            None => match self.query.monthly_cutoffs(true).await {
                Ok(Some(cutoffs)) => match default_year_month(&cutoffs) {
                    Some(ym) => ym,
                    None => {
                        return Outcome::go(route)
                            .with_notice(Notice::info("No payroll months available"));
                    }
                },
                Ok(None) => return self.login_required(),
                Err(e) => return self.failed(e, route),
            },
        };

        match self
            .query
            .employee_monthly_salary(employee_number, Some(year_month), true)
            .await
        {
            Ok(Some(salary)) => Outcome::go(route)
                .with_screen(Screen::Salary(SalaryView::new(year_month, &salary, &self.currency))),
            Ok(None) => self.login_required(),
            Err(e) => self.failed(e, route),
        }
    }

    // -------------------- Failures --------------------

    fn login_required(&self) -> Outcome {
        Outcome::go(Route::Login).with_notice(Notice::info("Please log in to continue"))
    }

    fn failed(&self, error: ApiError, stay: Route) -> Outcome {
        warn!(status = ?error.status(), error = %error, route = %stay, "Action failed");
        match error {
            ApiError::SessionExpired => {
                self.query.clear();
                Outcome::go(Route::Login).with_notice(Notice::error(error.to_string()))
            }
            ApiError::NotAuthenticated => self.login_required(),
            other => Outcome::go(stay).with_notice(Notice::error(other.to_string())),
        }
    }
}
