use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use derive_more::Display;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    http::ApiClient,
    model::{
        employee::{Employee, EmployeeNumber, EmployeeSummary, EmployeeUpdate, NewEmployee},
        payroll::{MonthlyCutoff, SalaryCalculation, YearMonth},
    },
};

/// Reads get this many extra attempts. Writes get none.
pub const READ_RETRIES: usize = 1;

const MAX_CACHED_DETAILS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum QueryKey {
    #[display(fmt = "employees/partialDetails")]
    PartialDetails,
    #[display(fmt = "employees/detail/{}", _0)]
    Detail(EmployeeNumber),
    #[display(fmt = "monthlyCutoffs")]
    MonthlyCutoffs,
    #[display(fmt = "monthlySalary/{}/{}", _0, _1)]
    MonthlySalary(EmployeeNumber, YearMonth),
}

impl QueryKey {
    /// How long a fetched value stays fresh. `None` means forever.
    pub fn stale_time(&self, employee_stale: Duration) -> Option<Duration> {
        match self {
            QueryKey::PartialDetails | QueryKey::Detail(_) => Some(employee_stale),
            QueryKey::MonthlyCutoffs => None,
            QueryKey::MonthlySalary(..) => Some(Duration::ZERO),
        }
    }
}

/// Cached, deduplicated, gated reads plus invalidating writes.
///
/// A query is disabled (returns `Ok(None)` without touching the network) while
/// no token is stored.
///
/// Employee entries are keyed by a generation that every write bumps. A read
/// still in flight when a write lands stores its result under the retired
/// generation, where no later read looks.
#[derive(Clone)]
pub struct QueryClient {
    api: Arc<ApiClient>,
    generation: Arc<AtomicU64>,
    partial_details: Cache<u64, Arc<Vec<EmployeeSummary>>>,
    details: Cache<(u64, EmployeeNumber), Arc<Employee>>,
    cutoffs: Cache<(), Arc<Vec<MonthlyCutoff>>>,
}

impl QueryClient {
    pub fn new(api: Arc<ApiClient>, employee_stale: Duration) -> Self {
        let any_employee = EmployeeNumber::new("");
        Self {
            api,
            generation: Arc::new(AtomicU64::new(0)),
            partial_details: build_cache(&QueryKey::PartialDetails, employee_stale, 16),
            details: build_cache(
                &QueryKey::Detail(any_employee),
                employee_stale,
                MAX_CACHED_DETAILS,
            ),
            cutoffs: build_cache(&QueryKey::MonthlyCutoffs, employee_stale, 1),
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    fn has_token(&self) -> bool {
        self.api.session().is_authenticated()
    }

    // -------------------- Reads --------------------

    pub async fn employee_partial_details(&self) -> ApiResult<Option<Arc<Vec<EmployeeSummary>>>> {
        if !self.has_token() {
            return Ok(None);
        }
        let key = QueryKey::PartialDetails;
        let api = self.api.clone();
        let result = self
            .partial_details
            .try_get_with(self.current_generation(), async move {
                debug!(%key, "Cache miss");
                with_retry(|| api.list_employees()).await.map(Arc::new)
            })
            .await
            .map(Some)
            .map_err(Arc::unwrap_or_clone);
        self.observe(result)
    }

    pub async fn employee(&self, employee_number: &EmployeeNumber) -> ApiResult<Option<Arc<Employee>>> {
        if !self.has_token() || employee_number.is_empty() {
            return Ok(None);
        }
        let key = QueryKey::Detail(employee_number.clone());
        let api = self.api.clone();
        let number = employee_number.clone();
        let result = self
            .details
            .try_get_with((self.current_generation(), employee_number.clone()), async move {
                debug!(%key, "Cache miss");
                with_retry(|| api.get_employee(&number)).await.map(Arc::new)
            })
            .await
            .map(Some)
            .map_err(Arc::unwrap_or_clone);
        self.observe(result)
    }

    /// `enabled` is the caller's own gate, e.g. the salary panel being open.
    pub async fn monthly_cutoffs(&self, enabled: bool) -> ApiResult<Option<Arc<Vec<MonthlyCutoff>>>> {
        if !enabled || !self.has_token() {
            return Ok(None);
        }
        let key = QueryKey::MonthlyCutoffs;
        let api = self.api.clone();
        let result = self
            .cutoffs
            .try_get_with((), async move {
                debug!(%key, "Cache miss");
                with_retry(|| api.monthly_cutoffs()).await.map(Arc::new)
            })
            .await
            .map(Some)
            .map_err(Arc::unwrap_or_clone);
        self.observe(result)
    }

    /// Always stale: every call goes to the backend and nothing is kept.
    pub async fn employee_monthly_salary(
        &self,
        employee_number: &EmployeeNumber,
        year_month: Option<YearMonth>,
        enabled: bool,
    ) -> ApiResult<Option<SalaryCalculation>> {
        let Some(year_month) = year_month else {
            return Ok(None);
        };
        if !enabled || !self.has_token() || employee_number.is_empty() {
            return Ok(None);
        }
        debug!(key = %QueryKey::MonthlySalary(employee_number.clone(), year_month), "Fetching");
        let result = with_retry(|| self.api.monthly_salary(employee_number, year_month))
            .await
            .map(Some);
        self.observe(result)
    }

    // -------------------- Writes --------------------

    pub async fn create_employee(&self, employee: &NewEmployee) -> ApiResult<Employee> {
        let result = self.api.create_employee(employee).await;
        if result.is_ok() {
            self.retire_employee_entries();
        }
        self.observe(result)
    }

    pub async fn update_employee(
        &self,
        employee_number: &EmployeeNumber,
        update: &EmployeeUpdate,
    ) -> ApiResult<Employee> {
        let result = self.api.update_employee(employee_number, update).await;
        if result.is_ok() {
            self.retire_employee_entries();
        }
        self.observe(result)
    }

    pub async fn delete_employee(&self, employee_number: &EmployeeNumber) -> ApiResult<String> {
        let result = self.api.delete_employee(employee_number).await;
        if result.is_ok() {
            self.retire_employee_entries();
        }
        self.observe(result)
    }

    /// Forget everything, e.g. on logout.
    pub fn clear(&self) {
        self.retire_employee_entries();
        self.cutoffs.invalidate_all();
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Moves employee reads to a fresh generation and drops what was cached.
    fn retire_employee_entries(&self) {
        let retired = self.generation.fetch_add(1, Ordering::SeqCst);
        debug!(retired, "Employee queries invalidated");
        self.partial_details.invalidate_all();
        self.details.invalidate_all();
    }

    fn observe<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ApiError::SessionExpired) = &result {
            self.clear();
        }
        result
    }
}

fn build_cache<K, V>(key: &QueryKey, employee_stale: Duration, capacity: u64) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let builder = Cache::builder().max_capacity(capacity);
    match key.stale_time(employee_stale) {
        Some(ttl) => builder.time_to_live(ttl).build(),
        None => builder.build(),
    }
}

async fn with_retry<T, F, Fut>(mut fetch: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempt = 0;
    loop {
        match fetch().await {
            Err(e) if e.is_retryable() && attempt < READ_RETRIES => {
                attempt += 1;
                warn!(error = %e, attempt, "Read failed, retrying");
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn key_names_and_staleness() {
        let five_min = Duration::from_secs(300);
        let n = EmployeeNumber::new("10001");
        let ym: YearMonth = "2024-06".parse().unwrap();

        assert_eq!(QueryKey::PartialDetails.to_string(), "employees/partialDetails");
        assert_eq!(QueryKey::Detail(n.clone()).to_string(), "employees/detail/10001");
        assert_eq!(
            QueryKey::MonthlySalary(n.clone(), ym).to_string(),
            "monthlySalary/10001/2024-06"
        );
        assert_eq!(QueryKey::Detail(n.clone()).stale_time(five_min), Some(five_min));
        assert_eq!(QueryKey::MonthlyCutoffs.stale_time(five_min), None);
        assert_eq!(
            QueryKey::MonthlySalary(n, ym).stale_time(five_min),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn caches_follow_key_staleness() {
        let five_min = Duration::from_secs(300);
        let list: Cache<u64, u8> = build_cache(&QueryKey::PartialDetails, five_min, 16);
        assert_eq!(list.policy().time_to_live(), Some(five_min));
        let cutoffs: Cache<(), u8> = build_cache(&QueryKey::MonthlyCutoffs, five_min, 1);
        assert_eq!(cutoffs.policy().time_to_live(), None);
    }

    #[tokio::test]
    async fn retries_a_failed_read_once() {
        let calls = AtomicUsize::new(0);
        let result: ApiResult<()> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::request(Operation::ListEmployees, Some(500), None))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1 + READ_RETRIES);
    }

    #[tokio::test]
    async fn does_not_retry_session_expiry() {
        let calls = AtomicUsize::new(0);
        let result: ApiResult<()> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::SessionExpired)
        })
        .await;
        assert_eq!(result, Err(ApiError::SessionExpired));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_attempt_can_succeed() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(|| async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ApiError::request(Operation::GetEmployee, None, None))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result, Ok(7));
    }
}
