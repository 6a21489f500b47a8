//! Header names, problem type URIs, and paging bounds.

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_LAST_EVENT_ID: &str = "last-event-id";
pub(crate) const SSE_KEEP_ALIVE_SECS: u64 = 20;

pub(crate) const PROBLEM_INTERNAL: &str = "https://healthtrack.dev/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://healthtrack.dev/problems/bad-request";
pub(crate) const PROBLEM_VALIDATION: &str = "https://healthtrack.dev/problems/validation";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://healthtrack.dev/problems/not-found";
pub(crate) const PROBLEM_NO_DATA: &str = "https://healthtrack.dev/problems/no-data";
pub(crate) const PROBLEM_CONFLICT: &str = "https://healthtrack.dev/problems/conflict";
pub(crate) const PROBLEM_SERVICE_UNAVAILABLE: &str =
    "https://healthtrack.dev/problems/service-unavailable";

pub(crate) const DEFAULT_CHECKS_LIMIT: i64 = 50;
pub(crate) const MAX_CHECKS_LIMIT: i64 = 500;

pub(crate) const EVENT_KIND_WHITELIST: &[&str] = &[
    "service_added",
    "service_removed",
    "check_completed",
    "status_changed",
    "alert_raised",
    "health_changed",
];
