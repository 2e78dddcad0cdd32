use std::str::FromStr;

use rust_decimal::Decimal;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::{
    error::ApiError,
    model::employee::{Employee, EmployeeNumber, EmployeeSummary, EmployeeUpdate, Patch},
    utils::format::{display_text, format_currency, format_currency_text},
    view::{Row, Section},
};

// -------------------- List --------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeListRow {
    pub employee_number: EmployeeNumber,
    pub name: String,
    pub sss_number: String,
    pub philhealth_number: String,
    pub tin_number: String,
    pub pagibig_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeListView {
    pub rows: Vec<EmployeeListRow>,
}

impl EmployeeListView {
    pub fn new(employees: &[EmployeeSummary]) -> Self {
        let rows = employees
            .iter()
            .map(|e| EmployeeListRow {
                employee_number: e.employee_number.clone(),
                name: display_text(Some(e.full_name().as_str())),
                sss_number: display_text(e.sss_number.as_deref()),
                philhealth_number: display_text(e.philhealth_number.as_deref()),
                tin_number: display_text(e.tin_number.as_deref()),
                pagibig_number: display_text(e.pagibig_number.as_deref()),
            })
            .collect();
        Self { rows }
    }

    pub fn contains(&self, employee_number: &EmployeeNumber) -> bool {
        self.rows.iter().any(|r| &r.employee_number == employee_number)
    }
}

// -------------------- Detail --------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDetailView {
    pub employee_number: EmployeeNumber,
    pub name: String,
    /// The logged-in user is looking at their own record
    pub is_current_user: bool,
    pub sections: Vec<Section>,
}

impl EmployeeDetailView {
    pub fn new(employee: &Employee, username: Option<&str>, currency: &str) -> Self {
        let text = |v: &Option<String>| display_text(v.as_deref());
        let money = |v: Option<Decimal>| format_currency(v, currency);

        let sections = vec![
            Section {
                title: "Personal Information",
                rows: vec![
                    Row::new("Birthday", text(&employee.birthday)),
                    Row::new("Address", text(&employee.address)),
                    Row::new("Phone Number", text(&employee.phone_number)),
                ],
            },
            Section {
                title: "Government IDs",
                rows: vec![
                    Row::new("SSS Number", text(&employee.sss_number)),
                    Row::new("PhilHealth Number", text(&employee.philhealth_number)),
                    Row::new("TIN Number", text(&employee.tin_number)),
                    Row::new("Pag-IBIG Number", text(&employee.pagibig_number)),
                ],
            },
            Section {
                title: "Employment Details",
                rows: vec![
                    Row::new("Status", text(&employee.status)),
                    Row::new("Position", text(&employee.position)),
                    Row::new("Immediate Supervisor", text(&employee.immediate_supervisor)),
                ],
            },
            Section {
                title: "Compensation",
                rows: vec![
                    Row::new("Basic Salary", money(employee.basic_salary)),
                    Row::new("Rice Subsidy", money(employee.rice_subsidy)),
                    Row::new("Phone Allowance", money(employee.phone_allowance)),
                    Row::new("Clothing Allowance", money(employee.clothing_allowance)),
                    Row::new("Hourly Rate", money(employee.hourly_rate)),
                    Row::new("Gross Semi-monthly Rate", money(employee.gross_semi_monthly_rate)),
                ],
            },
        ];

        Self {
            employee_number: employee.employee_number.clone(),
            name: display_text(Some(employee.full_name().as_str())),
            is_current_user: username
                .is_some_and(|u| u == format!("user-{}", employee.employee_number)),
            sections,
        }
    }

    /// First row with this label across all sections.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.sections.iter().find_map(|s| s.value(label))
    }
}

// -------------------- Edit form --------------------

/// Editable field names, spelled as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum EmployeeField {
    LastName,
    FirstName,
    Birthday,
    Address,
    PhoneNumber,
    SssNumber,
    PhilhealthNumber,
    TinNumber,
    PagibigNumber,
    Status,
    Position,
    ImmediateSupervisor,
    BasicSalary,
    RiceSubsidy,
    PhoneAllowance,
    ClothingAllowance,
    GrossSemiMonthlyRate,
    HourlyRate,
}

impl EmployeeField {
    pub fn is_amount(&self) -> bool {
        matches!(
            self,
            EmployeeField::BasicSalary
                | EmployeeField::RiceSubsidy
                | EmployeeField::PhoneAllowance
                | EmployeeField::ClothingAllowance
                | EmployeeField::GrossSemiMonthlyRate
                | EmployeeField::HourlyRate
        )
    }
}

/// The edit form: every field as the string the user sees and types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeForm {
    values: Vec<(EmployeeField, String)>,
    touched: Vec<EmployeeField>,
}

impl EmployeeForm {
    /// Prefilled from a fetched record. Missing amounts show as "0".
    pub fn from_employee(employee: &Employee) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let amount = |v: Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_else(|| "0".into());

        let values = EmployeeField::iter()
            .map(|field| {
                let value = match field {
                    EmployeeField::LastName => text(&employee.last_name),
                    EmployeeField::FirstName => text(&employee.first_name),
                    EmployeeField::Birthday => text(&employee.birthday),
                    EmployeeField::Address => text(&employee.address),
                    EmployeeField::PhoneNumber => text(&employee.phone_number),
                    EmployeeField::SssNumber => text(&employee.sss_number),
                    EmployeeField::PhilhealthNumber => text(&employee.philhealth_number),
                    EmployeeField::TinNumber => text(&employee.tin_number),
                    EmployeeField::PagibigNumber => text(&employee.pagibig_number),
                    EmployeeField::Status => text(&employee.status),
                    EmployeeField::Position => text(&employee.position),
                    EmployeeField::ImmediateSupervisor => text(&employee.immediate_supervisor),
                    EmployeeField::BasicSalary => amount(employee.basic_salary),
                    EmployeeField::RiceSubsidy => amount(employee.rice_subsidy),
                    EmployeeField::PhoneAllowance => amount(employee.phone_allowance),
                    EmployeeField::ClothingAllowance => amount(employee.clothing_allowance),
                    EmployeeField::GrossSemiMonthlyRate => amount(employee.gross_semi_monthly_rate),
                    EmployeeField::HourlyRate => amount(employee.hourly_rate),
                };
                (field, value)
            })
            .collect();

        Self {
            values,
            touched: Vec::new(),
        }
    }

    /// An empty form where only explicitly set fields will be sent.
    pub fn blank() -> Self {
        Self {
            values: EmployeeField::iter().map(|f| (f, String::new())).collect(),
            touched: Vec::new(),
        }
    }

    pub fn get(&self, field: EmployeeField) -> &str {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Amount fields only accept a partial decimal (`-?\d*\.?\d*`); anything
    /// else is ignored, as a numeric input would.
    pub fn set(&mut self, field: EmployeeField, value: impl Into<String>) -> bool {
        let value = value.into();
        if field.is_amount() && !is_partial_number(&value) {
            return false;
        }
        if let Some(slot) = self.values.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = value;
        }
        if !self.touched.contains(&field) {
            self.touched.push(field);
        }
        true
    }

    /// Parse `field=value` as typed on the command line.
    pub fn set_pair(&mut self, pair: &str) -> Result<(), ApiError> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ApiError::Validation(vec![format!("expected field=value, got {:?}", pair)]))?;
        let field = EmployeeField::from_str(name.trim())
            .map_err(|_| ApiError::Validation(vec![format!("unknown field {:?}", name.trim())]))?;
        if self.set(field, value) {
            Ok(())
        } else {
            Err(ApiError::Validation(vec![format!(
                "{} must be a number",
                field.as_ref()
            )]))
        }
    }

    /// Changed fields as they will be shown once saved.
    pub fn preview(&self, currency: &str) -> Vec<(EmployeeField, String)> {
        self.touched
            .iter()
            .map(|&field| {
                let raw = self.get(field);
                let shown = if field.is_amount() {
                    format_currency_text(raw, currency)
                } else {
                    display_text(Some(raw))
                };
                (field, shown)
            })
            .collect()
    }

    /// Every field, with empty amounts as null and blank text as null.
    pub fn to_update(&self) -> Result<EmployeeUpdate, ApiError> {
        self.build(EmployeeField::iter().collect())
    }

    /// Only the fields changed through [`EmployeeForm::set`].
    pub fn to_partial_update(&self) -> Result<EmployeeUpdate, ApiError> {
        self.build(self.touched.clone())
    }

    fn build(&self, fields: Vec<EmployeeField>) -> Result<EmployeeUpdate, ApiError> {
        let mut update = EmployeeUpdate::default();
        let mut errors = Vec::new();

        for field in fields {
            let raw = self.get(field);
            if field.is_amount() {
                let patch = if raw.trim().is_empty() {
                    Patch::Null
                } else {
                    match Decimal::from_str(raw.trim()) {
                        Ok(d) => Patch::Value(d),
                        Err(_) => {
                            errors.push(format!("{} must be a number", field.as_ref()));
                            continue;
                        }
                    }
                };
                set_amount(&mut update, field, patch);
            } else {
                let patch = if raw.trim().is_empty() {
                    Patch::Null
                } else {
                    Patch::Value(raw.to_string())
                };
                set_text(&mut update, field, patch);
            }
        }

        if errors.is_empty() {
            Ok(update)
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn is_partial_number(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut seen_dot = false;
    digits.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_dot => {
            seen_dot = true;
            true
        }
        _ => false,
    })
}

fn set_amount(update: &mut EmployeeUpdate, field: EmployeeField, patch: Patch<Decimal>) {
    match field {
        EmployeeField::BasicSalary => update.basic_salary = patch,
        EmployeeField::RiceSubsidy => update.rice_subsidy = patch,
        EmployeeField::PhoneAllowance => update.phone_allowance = patch,
        EmployeeField::ClothingAllowance => update.clothing_allowance = patch,
        EmployeeField::GrossSemiMonthlyRate => update.gross_semi_monthly_rate = patch,
        EmployeeField::HourlyRate => update.hourly_rate = patch,
        _ => {}
    }
}

fn set_text(update: &mut EmployeeUpdate, field: EmployeeField, patch: Patch<String>) {
    match field {
        EmployeeField::LastName => update.last_name = patch,
        EmployeeField::FirstName => update.first_name = patch,
        EmployeeField::Birthday => update.birthday = patch,
        EmployeeField::Address => update.address = patch,
        EmployeeField::PhoneNumber => update.phone_number = patch,
        EmployeeField::SssNumber => update.sss_number = patch,
        EmployeeField::PhilhealthNumber => update.philhealth_number = patch,
        EmployeeField::TinNumber => update.tin_number = patch,
        EmployeeField::PagibigNumber => update.pagibig_number = patch,
        EmployeeField::Status => update.status = patch,
        EmployeeField::Position => update.position = patch,
        EmployeeField::ImmediateSupervisor => update.immediate_supervisor = patch,
        _ => {}
    }
}
