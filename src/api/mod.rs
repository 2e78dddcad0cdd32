pub mod employee;
pub mod payroll;
