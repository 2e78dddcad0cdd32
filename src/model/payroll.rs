use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::employee::EmployeeNumber;

/// Payroll month key, `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || format!("invalid year-month {:?}, expected YYYY-MM", s);
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A payroll month the backend can calculate salary for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCutoff {
    pub year_month: YearMonth,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Server-side monthly salary calculation. Any field may be missing when the
/// month has no attendance data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryCalculation {
    #[serde(default)]
    pub employee_number: Option<EmployeeNumber>,
    #[serde(default)]
    pub year_month: Option<String>,
    #[serde(default)]
    pub monthly_worked_hours: Option<f64>,
    #[serde(default)]
    pub gross_monthly_salary: Option<Decimal>,
    #[serde(default)]
    pub monthly_sss_deduction: Option<Decimal>,
    #[serde(default)]
    pub monthly_philhealth_deduction: Option<Decimal>,
    #[serde(default)]
    pub monthly_pagibig_deduction: Option<Decimal>,
    #[serde(default)]
    pub monthly_withholding_tax: Option<Decimal>,
    #[serde(default)]
    pub total_deductions: Option<Decimal>,
    #[serde(default)]
    pub net_monthly_salary: Option<Decimal>,
}
