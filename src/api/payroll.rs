use tracing::debug;

use crate::{
    error::{ApiResult, Operation},
    http::ApiClient,
    model::{
        employee::EmployeeNumber,
        payroll::{MonthlyCutoff, SalaryCalculation, YearMonth},
    },
    routes::Endpoint,
};

impl ApiClient {
    /// GET /api/protected/monthly-cutoffs
    pub async fn monthly_cutoffs(&self) -> ApiResult<Vec<MonthlyCutoff>> {
        self.get(Endpoint::MonthlyCutoffs, Operation::MonthlyCutoffs)
            .await
    }

    /// GET /api/protected/employees/{employee_number}/salary?yearMonth=YYYY-MM
    pub async fn monthly_salary(
        &self,
        employee_number: &EmployeeNumber,
        year_month: YearMonth,
    ) -> ApiResult<SalaryCalculation> {
        debug!(%employee_number, %year_month, "Requesting salary calculation");
        self.get(
            Endpoint::MonthlySalary(employee_number.clone(), year_month),
            Operation::MonthlySalary,
        )
        .await
    }
}
