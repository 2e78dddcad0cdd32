use crate::{
    model::payroll::{MonthlyCutoff, SalaryCalculation, YearMonth},
    utils::format::{display_text, format_currency, format_hours},
    view::{Row, Section},
};

/// Rendered salary calculation. Every derived field falls back to `N/A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryView {
    pub year_month: YearMonth,
    pub worked_hours: Row,
    pub gross: Row,
    pub deductions: Section,
    pub total_deductions: Row,
    pub net: Row,
}

impl SalaryView {
    pub fn new(year_month: YearMonth, salary: &SalaryCalculation, currency: &str) -> Self {
        let money = |v| format_currency(v, currency);
        Self {
            year_month,
            worked_hours: Row::new("Monthly Worked Hours", format_hours(salary.monthly_worked_hours)),
            gross: Row::new("Gross Monthly Salary", money(salary.gross_monthly_salary)),
            deductions: Section {
                title: "Deductions",
                rows: vec![
                    Row::new("SSS", money(salary.monthly_sss_deduction)),
                    Row::new("PhilHealth", money(salary.monthly_philhealth_deduction)),
                    Row::new("Pag-IBIG", money(salary.monthly_pagibig_deduction)),
                    Row::new("Withholding Tax", money(salary.monthly_withholding_tax)),
                ],
            },
            total_deductions: Row::new("Total Deductions", money(salary.total_deductions)),
            net: Row::new("Net Monthly Salary", money(salary.net_monthly_salary)),
        }
    }

    /// All derived rows in display order.
    pub fn rows(&self) -> Vec<&Row> {
        let mut rows = vec![&self.worked_hours, &self.gross];
        rows.extend(self.deductions.rows.iter());
        rows.push(&self.total_deductions);
        rows.push(&self.net);
        rows
    }
}

/// One selectable payroll month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffOption {
    pub year_month: YearMonth,
    pub label: String,
}

pub fn cutoff_options(cutoffs: &[MonthlyCutoff]) -> Vec<CutoffOption> {
    let mut sorted: Vec<&MonthlyCutoff> = cutoffs.iter().collect();
    sorted.sort_by_key(|c| c.year_month);
    sorted
        .into_iter()
        .map(|c| CutoffOption {
            year_month: c.year_month,
            label: format!(
                "{} ({} - {})",
                c.year_month,
                display_text(c.start_date.as_deref()),
                display_text(c.end_date.as_deref())
            ),
        })
        .collect()
}

/// The month preselected when the salary panel opens: the latest cutoff.
pub fn default_year_month(cutoffs: &[MonthlyCutoff]) -> Option<YearMonth> {
    cutoffs.iter().map(|c| c.year_month).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn empty_calculation_is_all_not_available() {
        let view = SalaryView::new(ym("2024-06"), &SalaryCalculation::default(), "₱");
        assert_eq!(view.rows().len(), 8);
        assert!(view.rows().iter().all(|r| r.value == "N/A"));
    }

    #[test]
    fn populated_calculation() {
        let salary = SalaryCalculation {
            monthly_worked_hours: Some(160.5),
            gross_monthly_salary: Some(Decimal::new(4780125, 2)),
            monthly_sss_deduction: Some(Decimal::from(1125)),
            net_monthly_salary: Some(Decimal::new(4260000, 2)),
            ..Default::default()
        };
        let view = SalaryView::new(ym("2024-06"), &salary, "₱");
        assert_eq!(view.worked_hours.value, "160.50 hours");
        assert_eq!(view.gross.value, "₱47,801.25");
        assert_eq!(view.deductions.value("SSS"), Some("₱1,125.00"));
        assert_eq!(view.deductions.value("Withholding Tax"), Some("N/A"));
        assert_eq!(view.net.value, "₱42,600.00");
    }

    #[test]
    fn latest_cutoff_is_default() {
        let cutoffs: Vec<MonthlyCutoff> = serde_json::from_value(json!([
            {"yearMonth": "2024-06", "startDate": "Jun 1", "endDate": "Jun 30"},
            {"yearMonth": "2024-12", "startDate": "Dec 1", "endDate": "Dec 31"},
            {"yearMonth": "2024-09", "startDate": "Sep 1"}
        ]))
        .unwrap();
        assert_eq!(default_year_month(&cutoffs), Some(ym("2024-12")));
        assert_eq!(default_year_month(&[]), None);

        let options = cutoff_options(&cutoffs);
        assert_eq!(options[0].label, "2024-06 (Jun 1 - Jun 30)");
        assert_eq!(options[1].label, "2024-09 (Sep 1 - N/A)");
        assert_eq!(options[2].year_month, ym("2024-12"));
    }
}
