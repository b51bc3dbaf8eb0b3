//! Input normalisation.
//!
//! Every "missing number means zero" rule lives here, so the arithmetic in the
//! rest of this module can assume fully populated inputs.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AuditWarning, Employee};

/// Warning code emitted when a negative pay field is replaced by zero.
pub const NEGATIVE_RATE_CLAMPED: &str = "NEGATIVE_RATE_CLAMPED";

/// An employee's pay parameters with every field populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayProfile {
    /// The employee this profile belongs to.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// Salary for a complete month.
    pub full_month_salary: Decimal,
    /// Dearness allowance per worked day.
    pub dearness_allowance: Decimal,
    /// Rate per car kilometre.
    pub car_rate_per_km: Decimal,
    /// Rate per bike kilometre.
    pub bike_rate_per_km: Decimal,
}

/// The outcome of normalising one employee.
#[derive(Debug, Clone)]
pub struct NormalizedEmployee {
    /// The populated pay profile.
    pub profile: PayProfile,
    /// Corrections applied while populating it.
    pub warnings: Vec<AuditWarning>,
}

/// Turns a raw employee record into a [`PayProfile`].
///
/// Absent fields become zero silently. Negative fields become zero with a
/// `NEGATIVE_RATE_CLAMPED` warning, because pay rates cannot be negative.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::normalize_employee;
/// use payroll_engine::models::Employee;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Asha Rao".to_string(),
///     full_month_salary: Some(Decimal::new(30000, 0)),
///     dearness_allowance: None,
///     car_rate_per_km: None,
///     bike_rate_per_km: Some(Decimal::new(4, 0)),
///     field_officer_id: None,
/// };
///
/// let normalized = normalize_employee(&employee);
/// assert_eq!(normalized.profile.car_rate_per_km, Decimal::ZERO);
/// assert_eq!(normalized.profile.bike_rate_per_km, Decimal::new(4, 0));
/// assert!(normalized.warnings.is_empty());
/// ```
pub fn normalize_employee(employee: &Employee) -> NormalizedEmployee {
    let mut warnings = Vec::new();

    let mut field = |name: &str, value: Option<Decimal>| -> Decimal {
        let value = value.unwrap_or(Decimal::ZERO);
        if value.is_sign_negative() && !value.is_zero() {
            warn!(
                employee_id = %employee.id,
                field = name,
                value = %value,
                "Negative pay field replaced by zero"
            );
            warnings.push(AuditWarning {
                code: NEGATIVE_RATE_CLAMPED.to_string(),
                message: format!(
                    "Employee '{}' has negative {} ({}); using 0",
                    employee.id, name, value
                ),
                severity: "medium".to_string(),
            });
            return Decimal::ZERO;
        }
        value
    };

    let full_month_salary = field("fullMonthSalary", employee.full_month_salary);
    let dearness_allowance = field("dearnessAllowance", employee.dearness_allowance);
    let car_rate_per_km = field("carRatePerKm", employee.car_rate_per_km);
    let bike_rate_per_km = field("bikeRatePerKm", employee.bike_rate_per_km);

    NormalizedEmployee {
        profile: PayProfile {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            full_month_salary,
            dearness_allowance,
            car_rate_per_km,
            bike_rate_per_km,
        },
        warnings,
    }
}
