//! What each screen displays, without any layout.

pub mod employee;
pub mod salary;

use derive_more::Display;

use crate::model::employee::EmployeeNumber;

/// Where the user ends up after an action.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Route {
    #[display(fmt = "/login")]
    Login,
    #[display(fmt = "/")]
    Home,
    #[display(fmt = "/register")]
    Register,
    #[display(fmt = "/employees")]
    Employees,
    #[display(fmt = "/employees/{}", _0)]
    EmployeeDetail(EmployeeNumber),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// Transient, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// A labelled value as shown on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: &'static str,
    pub value: String,
}

impl Row {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<Row>,
}

impl Section {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}
