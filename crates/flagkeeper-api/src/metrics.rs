//! Prometheus metrics for Flagkeeper
//!
//! - `flagkeeper_project_health_rating` (gauge) - Last computed rating by project
//! - `flagkeeper_potentially_stale_toggles` (gauge) - Potentially stale toggles by project
//! - `flagkeeper_archive_operations_total` (counter) - Archive lifecycle operations
//! - `flagkeeper_health_reports_total` (counter) - Health reports served by result

use flagkeeper_core::HealthCounts;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// Metrics registered on a dedicated registry
#[derive(Clone)]
pub struct FlagkeeperMetrics {
    registry: Registry,
    health_rating: GaugeVec,
    potentially_stale: GaugeVec,
    archive_operations: CounterVec,
    health_reports: CounterVec,
}

impl FlagkeeperMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let health_rating = GaugeVec::new(
            Opts::new("project_health_rating", "Last computed project health rating (0-100)")
                .namespace("flagkeeper"),
            &["project"],
        )?;

        let potentially_stale = GaugeVec::new(
            Opts::new(
                "potentially_stale_toggles",
                "Toggles older than their type's expected lifetime",
            )
            .namespace("flagkeeper"),
            &["project"],
        )?;

        let archive_operations = CounterVec::new(
            Opts::new("archive_operations_total", "Archive lifecycle operations")
                .namespace("flagkeeper"),
            &["operation", "result"],
        )?;

        let health_reports = CounterVec::new(
            Opts::new("health_reports_total", "Project health reports served")
                .namespace("flagkeeper"),
            &["result"],
        )?;

        registry.register(Box::new(health_rating.clone()))?;
        registry.register(Box::new(potentially_stale.clone()))?;
        registry.register(Box::new(archive_operations.clone()))?;
        registry.register(Box::new(health_reports.clone()))?;

        Ok(Self {
            registry,
            health_rating,
            potentially_stale,
            archive_operations,
            health_reports,
        })
    }

    pub fn observe_project_health(&self, project: &str, counts: &HealthCounts) {
        self.health_rating
            .with_label_values(&[project])
            .set(f64::from(counts.health));
        self.potentially_stale
            .with_label_values(&[project])
            .set(counts.potentially_stale_count as f64);
    }

    pub fn record_archive_operation(&self, operation: &str, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.archive_operations
            .with_label_values(&[operation, result])
            .inc();
    }

    pub fn record_health_report(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.health_reports.with_label_values(&[result]).inc();
    }

    /// Render every metric in the Prometheus text exposition format
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_values() {
        let metrics = FlagkeeperMetrics::new().unwrap();
        metrics.observe_project_health(
            "web",
            &HealthCounts {
                total_count: 4,
                active_count: 3,
                stale_count: 1,
                potentially_stale_count: 1,
                health: 50,
            },
        );
        metrics.record_archive_operation("revive", false);
        metrics.record_health_report(true);

        let text = metrics.render().unwrap();
        assert!(text.contains("flagkeeper_project_health_rating{project=\"web\"} 50"));
        assert!(text.contains("flagkeeper_potentially_stale_toggles{project=\"web\"} 1"));
        assert!(text.contains(
            "flagkeeper_archive_operations_total{operation=\"revive\",result=\"failure\"} 1"
        ));
        assert!(text.contains("flagkeeper_health_reports_total{result=\"success\"} 1"));
    }

    #[test]
    fn test_separate_instances_do_not_collide() {
        assert!(FlagkeeperMetrics::new().is_ok());
        assert!(FlagkeeperMetrics::new().is_ok());
    }
}
