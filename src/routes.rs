use reqwest::Method;

use crate::model::{employee::EmployeeNumber, payroll::YearMonth};

/// Every backend endpoint the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    ListEmployees,
    GetEmployee(EmployeeNumber),
    CreateEmployee,
    UpdateEmployee(EmployeeNumber),
    DeleteEmployee(EmployeeNumber),
    MonthlyCutoffs,
    MonthlySalary(EmployeeNumber, YearMonth),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Login | Endpoint::Register | Endpoint::CreateEmployee => Method::POST,
            Endpoint::UpdateEmployee(_) => Method::PATCH,
            Endpoint::DeleteEmployee(_) => Method::DELETE,
            Endpoint::ListEmployees
            | Endpoint::GetEmployee(_)
            | Endpoint::MonthlyCutoffs
            | Endpoint::MonthlySalary(..) => Method::GET,
        }
    }

    /// Everything except login carries the bearer token.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Endpoint::Login)
    }

    /// Path segments below the base URL, unencoded.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Login => vec!["api", "login"],
            Endpoint::Register => vec!["api", "register"],
            Endpoint::ListEmployees | Endpoint::CreateEmployee => {
                vec!["api", "protected", "employees"]
            }
            Endpoint::GetEmployee(n) | Endpoint::UpdateEmployee(n) | Endpoint::DeleteEmployee(n) => {
                vec!["api", "protected", "employees", n.as_str()]
            }
            Endpoint::MonthlyCutoffs => vec!["api", "protected", "monthly-cutoffs"],
            Endpoint::MonthlySalary(n, _) => {
                vec!["api", "protected", "employees", n.as_str(), "salary"]
            }
        }
    }

    pub fn query(&self) -> Option<(&'static str, String)> {
        match self {
            Endpoint::MonthlySalary(_, ym) => Some(("yearMonth", ym.to_string())),
            _ => None,
        }
    }
}

// LOGIN
//  └─ POST /api/login -> token, kept in the session file

// API REQUEST
//  └─ Authorization: Bearer token

// 401
//  └─ session cleared, back to login
