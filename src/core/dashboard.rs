//! Educator dashboard data
//!
//! The three calls are issued together. Only the class list is required;
//! student count and stats may fail individually and the dashboard still
//! renders with what came back.

use crate::core::api::{
    ClassScope, ClassesApi, ClientError, EducatorDashboardStats, HttpTransport, LiveClass,
    LiveClassFilters,
};
use crate::core::async_op::optional;

/// Upcoming classes shown on the dashboard
pub const DASHBOARD_UPCOMING_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct EducatorDashboard {
    pub upcoming_classes: Vec<LiveClass>,
    /// Total across all pages, not just the ones shown
    pub total_classes: u64,
    pub student_count: Option<u64>,
    pub stats: Option<EducatorDashboardStats>,
}

impl EducatorDashboard {
    /// Student count for display, `0` when unknown
    pub fn student_count_or_zero(&self) -> u64 {
        self.student_count.unwrap_or(0)
    }
}

/// Fetch everything the educator dashboard shows
pub async fn load_educator_dashboard<T: HttpTransport>(
    api: &ClassesApi<T>,
) -> Result<EducatorDashboard, ClientError> {
    let filters = LiveClassFilters::scope(ClassScope::Upcoming);

    let (classes, student_count, stats) = futures::join!(
        api.get_my_classes(&filters, 0, DASHBOARD_UPCOMING_LIMIT),
        optional(api.get_student_count()),
        optional(api.get_educator_stats()),
    );
    let classes = classes?;

    tracing::debug!(
        upcoming = classes.content.len(),
        has_count = student_count.is_some(),
        has_stats = stats.is_some(),
        "educator dashboard loaded"
    );

    Ok(EducatorDashboard {
        total_classes: classes.total_elements,
        upcoming_classes: classes.content,
        student_count,
        stats,
    })
}
