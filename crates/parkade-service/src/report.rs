//! Dashboard summaries and the projection audit.

use chrono::NaiveDate;
use parkade_core::caller::Caller;
use parkade_core::error::ParkadeResult;
use parkade_core::models::report::{AdminSummary, ProjectionMismatch, UserSummary};
use parkade_core::repository::ReportRepository;
use tracing::warn;
use uuid::Uuid;

pub struct ReportService<P: ReportRepository> {
    reports: P,
}

impl<P: ReportRepository> ReportService<P> {
    pub fn new(reports: P) -> Self {
        Self { reports }
    }

    pub async fn admin_summary(&self, caller: &Caller, today: NaiveDate) -> ParkadeResult<AdminSummary> {
        caller.require_admin()?;
        self.reports.admin_summary(today).await
    }

    pub async fn user_summary(
        &self,
        caller: &Caller,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ParkadeResult<UserSummary> {
        caller.require_self_or_admin(user_id)?;
        self.reports.user_summary(user_id, today).await
    }

    pub async fn audit_projections(&self, caller: &Caller) -> ParkadeResult<Vec<ProjectionMismatch>> {
        caller.require_admin()?;
        let mismatches = self.reports.audit_projections().await?;
        if !mismatches.is_empty() {
            warn!(count = mismatches.len(), "Cached spot or vehicle state disagrees with reservations");
        }
        Ok(mismatches)
    }
}
