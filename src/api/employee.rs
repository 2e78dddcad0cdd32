use tracing::{debug, error, info};

use crate::{
    error::{ApiError, ApiResult, Operation},
    http::{ApiClient, Body},
    model::employee::{Employee, EmployeeNumber, EmployeeSummary, EmployeeUpdate, NewEmployee},
    models::MessageResponse,
    routes::Endpoint,
};

impl ApiClient {
    /// GET /api/protected/employees
    pub async fn list_employees(&self) -> ApiResult<Vec<EmployeeSummary>> {
        let employees: Vec<EmployeeSummary> = self
            .get(Endpoint::ListEmployees, Operation::ListEmployees)
            .await?;
        debug!(count = employees.len(), "Fetched employee summaries");
        Ok(employees)
    }

    /// GET /api/protected/employees/{employee_number}
    pub async fn get_employee(&self, employee_number: &EmployeeNumber) -> ApiResult<Employee> {
        self.get(
            Endpoint::GetEmployee(employee_number.clone()),
            Operation::GetEmployee,
        )
        .await
    }

    /// POST /api/protected/employees
    pub async fn create_employee(&self, employee: &NewEmployee) -> ApiResult<Employee> {
        employee.validate()?;

        let body = Body::json(employee, &Operation::CreateEmployee)?;
        let reply = self
            .send(&Endpoint::CreateEmployee, Operation::CreateEmployee, body)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create employee"))?;

        info!(employee_number = %employee.employee_number, "Employee created");
        reply.decode(Operation::CreateEmployee)
    }

    /// PATCH /api/protected/employees/{employee_number}
    pub async fn update_employee(
        &self,
        employee_number: &EmployeeNumber,
        update: &EmployeeUpdate,
    ) -> ApiResult<Employee> {
        let operation = Operation::UpdateEmployee(employee_number.to_string());
        if update.is_empty() {
            return Err(ApiError::Validation(vec![
                "No fields provided for update".to_string(),
            ]));
        }

        let body = Body::json(update, &operation)?;
        let reply = self
            .send(
                &Endpoint::UpdateEmployee(employee_number.clone()),
                operation.clone(),
                body,
            )
            .await
            .inspect_err(|e| error!(error = %e, %employee_number, "Failed to update employee"))?;

        info!(%employee_number, "Employee updated");
        reply.decode(operation)
    }

    /// DELETE /api/protected/employees/{employee_number}
    ///
    /// Returns the message to show. 204 carries no body, so one is made up.
    pub async fn delete_employee(&self, employee_number: &EmployeeNumber) -> ApiResult<String> {
        let operation = Operation::DeleteEmployee(employee_number.to_string());
        let reply = self
            .send(
                &Endpoint::DeleteEmployee(employee_number.clone()),
                operation,
                Body::Empty,
            )
            .await
            .inspect_err(|e| error!(error = %e, %employee_number, "Failed to delete employee"))?;

        info!(%employee_number, "Employee deleted");
        let fallback = format!("Employee {} deleted successfully.", employee_number);
        if reply.is_empty() {
            return Ok(fallback);
        }
        Ok(serde_json::from_str::<MessageResponse>(&reply.text)
            .ok()
            .and_then(MessageResponse::text)
            .unwrap_or(fallback))
    }
}
