use chrono::NaiveDate;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ApiError;

/// Unique employee identifier as the backend spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[serde(transparent)]
pub struct EmployeeNumber(String);

impl EmployeeNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Trimmed on the way in, so route and cache keys never carry padding.
impl<'de> Deserialize<'de> for EmployeeNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        String::deserialize(d).map(Self::new)
    }
}

impl From<&str> for EmployeeNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Full employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_number: EmployeeNumber,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub sss_number: Option<String>,
    #[serde(default)]
    pub philhealth_number: Option<String>,
    #[serde(default)]
    pub tin_number: Option<String>,
    #[serde(default)]
    pub pagibig_number: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub immediate_supervisor: Option<String>,

    #[serde(default)]
    pub basic_salary: Option<Decimal>,
    #[serde(default)]
    pub rice_subsidy: Option<Decimal>,
    #[serde(default)]
    pub phone_allowance: Option<Decimal>,
    #[serde(default)]
    pub clothing_allowance: Option<Decimal>,
    #[serde(default)]
    pub gross_semi_monthly_rate: Option<Decimal>,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// Partial details used by the list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub employee_number: EmployeeNumber,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub sss_number: Option<String>,
    #[serde(default)]
    pub philhealth_number: Option<String>,
    #[serde(default)]
    pub tin_number: Option<String>,
    #[serde(default)]
    pub pagibig_number: Option<String>,
}

impl EmployeeSummary {
    pub fn full_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body of a create request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_number: String,
    pub last_name: String,
    pub first_name: String,
    pub birthday: String,
    pub address: String,
    pub phone_number: String,
    pub sss_number: String,
    pub philhealth_number: String,
    pub tin_number: String,
    pub pagibig_number: String,
    pub status: String,
    pub position: String,
    #[serde(default, serialize_with = "blank_as_null")]
    pub immediate_supervisor: Option<String>,
    pub basic_salary: Decimal,
    pub rice_subsidy: Decimal,
    pub phone_allowance: Decimal,
    pub clothing_allowance: Decimal,
    pub gross_semi_monthly_rate: Decimal,
    pub hourly_rate: Decimal,
}

fn blank_as_null<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => s.serialize_some(v),
        _ => s.serialize_none(),
    }
}

impl NewEmployee {
    /// Checks every rule and reports all violations at once.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        // checked as sent: surrounding spaces are not digits
        let number = &self.employee_number;
        if number.trim().is_empty() {
            errors.push("Employee Number is required".to_string());
        } else if !number.chars().all(|c| c.is_ascii_digit()) {
            errors.push("Employee Number must be numeric".to_string());
        }

        let required = [
            (&self.last_name, "Last Name"),
            (&self.first_name, "First Name"),
            (&self.address, "Address"),
            (&self.phone_number, "Phone Number"),
            (&self.sss_number, "SSS Number"),
            (&self.philhealth_number, "PhilHealth Number"),
            (&self.tin_number, "TIN Number"),
            (&self.pagibig_number, "Pag-IBIG Number"),
            (&self.status, "Status"),
            (&self.position, "Position"),
        ];
        for (value, label) in required {
            if value.trim().is_empty() {
                errors.push(format!("{} is required", label));
            }
        }

        let birthday = self.birthday.trim();
        if birthday.is_empty() {
            errors.push("Birthday is required".to_string());
        } else if !is_us_date(birthday) {
            errors.push(
                "Birthday must be in MM/DD/YYYY format (e.g., 01/23/1990)".to_string(),
            );
        }

        if self.basic_salary <= Decimal::ZERO {
            errors.push("Basic Salary must be positive".to_string());
        }
        let non_negative = [
            (self.rice_subsidy, "Rice Subsidy"),
            (self.phone_allowance, "Phone Allowance"),
            (self.clothing_allowance, "Clothing Allowance"),
            (self.gross_semi_monthly_rate, "Gross Semi-monthly Rate"),
            (self.hourly_rate, "Hourly Rate"),
        ];
        for (value, label) in non_negative {
            if value.is_sign_negative() && !value.is_zero() {
                errors.push(format!("{} cannot be negative", label));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn is_us_date(value: &str) -> bool {
    let shaped = value.len() == 10
        && value.char_indices().all(|(i, c)| match i {
            2 | 5 => c == '/',
            _ => c.is_ascii_digit(),
        });
    shaped && NaiveDate::parse_from_str(value, "%m/%d/%Y").is_ok()
}

/// A PATCH field: left out, explicitly null, or set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(v) => s.serialize_some(v),
            _ => s.serialize_none(),
        }
    }
}

/// Partial update body. Absent fields are not sent at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub last_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub first_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub birthday: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub address: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub phone_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub sss_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub philhealth_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub tin_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub pagibig_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub status: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub position: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub immediate_supervisor: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub basic_salary: Patch<Decimal>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub rice_subsidy: Patch<Decimal>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub phone_allowance: Patch<Decimal>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub clothing_allowance: Patch<Decimal>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub gross_semi_monthly_rate: Patch<Decimal>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub hourly_rate: Patch<Decimal>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self == &EmployeeUpdate::default()
    }
}
