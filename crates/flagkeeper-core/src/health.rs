//! Project health rating
//!
//! Pure functions over toggle summaries. A toggle is *potentially stale* when
//! it is not marked stale and its age has reached the expected lifetime of its
//! type. The rating starts at 100 and loses the percentage of stale and
//! potentially stale toggles.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::{Result, ToggleError};
use crate::model::{HealthCounts, ToggleSummary};

pub const MILLISECONDS_PER_DAY: i64 = 86_400_000;

/// Lowercase type name to lifetime in days; `None` means never stale.
pub type LifetimeMap = HashMap<String, Option<u32>>;

/// Number of toggles explicitly marked stale
pub fn stale_count(features: &[ToggleSummary]) -> usize {
    features.iter().filter(|f| f.stale).count()
}

/// Number of toggles not marked stale
pub fn active_count(features: &[ToggleSummary]) -> usize {
    features.iter().filter(|f| !f.stale).count()
}

/// Count non-stale toggles in `features` whose age has reached their type's lifetime.
///
/// The caller picks the subset. Types missing from `lifetimes` are an error.
pub fn potentially_stale_count(
    features: &[ToggleSummary],
    lifetimes: &LifetimeMap,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut count = 0;
    for feature in features.iter().filter(|f| !f.stale) {
        if is_potentially_stale(feature, lifetimes, now)? {
            count += 1;
        }
    }
    Ok(count)
}

fn is_potentially_stale(
    feature: &ToggleSummary,
    lifetimes: &LifetimeMap,
    now: DateTime<Utc>,
) -> Result<bool> {
    let type_name = feature.feature_type.to_lowercase();
    let lifetime = lifetimes.get(&type_name).ok_or_else(|| {
        tracing::warn!(feature_type = %type_name, "No lifetime configured for feature type");
        ToggleError::UnknownFeatureType(type_name.clone())
    })?;

    Ok(match lifetime {
        Some(days) => {
            let age_ms = (now - feature.created_at).num_milliseconds();
            age_ms >= i64::from(*days) * MILLISECONDS_PER_DAY
        }
        None => false,
    })
}

/// Rating in percent: 100 minus the stale and potentially stale shares.
///
/// Shares are 0 when there are no toggles. Rounds half up; not clamped.
pub fn health_rating(total: usize, stale: usize, potentially_stale: usize) -> i32 {
    let share = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    };

    let rating = 100.0 - share(stale) - share(potentially_stale);
    (rating + 0.5).floor() as i32
}

/// Compute every count plus the rating for one feature set.
///
/// Potentially stale toggles are counted over the active subset only, so
/// `potentially_stale_count <= active_count` always holds.
pub fn summarize(
    features: &[ToggleSummary],
    lifetimes: &LifetimeMap,
    now: DateTime<Utc>,
) -> Result<HealthCounts> {
    let active: Vec<ToggleSummary> = features.iter().filter(|f| !f.stale).cloned().collect();
    let stale = features.len() - active.len();
    let potentially_stale = potentially_stale_count(&active, lifetimes, now)?;

    Ok(HealthCounts {
        total_count: features.len(),
        active_count: active.len(),
        stale_count: stale,
        potentially_stale_count: potentially_stale,
        health: health_rating(features.len(), stale, potentially_stale),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn lifetimes() -> LifetimeMap {
        let mut map = LifetimeMap::new();
        map.insert("release".to_string(), Some(30));
        map.insert("operational".to_string(), Some(7));
        map.insert("kill-switch".to_string(), None);
        map
    }

    fn toggle(days_old: i64, stale: bool, feature_type: &str, now: DateTime<Utc>) -> ToggleSummary {
        ToggleSummary {
            created_at: now - Duration::days(days_old),
            stale,
            feature_type: feature_type.to_string(),
        }
    }

    #[test]
    fn test_old_toggle_is_potentially_stale() {
        let now = Utc::now();
        let features = vec![toggle(100, false, "release", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 1);
    }

    #[test]
    fn test_young_toggle_is_not_potentially_stale() {
        let now = Utc::now();
        let features = vec![toggle(10, false, "release", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 0);
    }

    #[test]
    fn test_lifetime_boundary_is_inclusive() {
        let now = Utc::now();
        let features = vec![toggle(30, false, "release", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 1);
    }

    #[test]
    fn test_stale_toggles_are_not_potentially_stale() {
        let now = Utc::now();
        let features = vec![toggle(100, true, "release", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 0);
    }

    #[test]
    fn test_permanent_type_never_potentially_stale() {
        let now = Utc::now();
        let features = vec![toggle(3650, false, "kill-switch", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 0);
    }

    #[test]
    fn test_type_lookup_ignores_case() {
        let now = Utc::now();
        let features = vec![toggle(8, false, "Operational", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 1);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let now = Utc::now();
        let features = vec![toggle(1, false, "rollout", now)];
        let err = potentially_stale_count(&features, &lifetimes(), now).unwrap_err();
        assert_eq!(err, ToggleError::UnknownFeatureType("rollout".to_string()));
    }

    #[test]
    fn test_unknown_type_on_stale_toggle_is_ignored() {
        let now = Utc::now();
        let features = vec![toggle(1, true, "rollout", now)];
        assert_eq!(potentially_stale_count(&features, &lifetimes(), now).unwrap(), 0);
    }

    #[test]
    fn test_health_rating_empty_project() {
        assert_eq!(health_rating(0, 0, 0), 100);
    }

    #[test]
    fn test_health_rating_rounding() {
        // 100 - 33.33 - 0 = 66.67
        assert_eq!(health_rating(3, 1, 0), 67);
        // 100 - 12.5 - 0 = 87.5, half rounds up
        assert_eq!(health_rating(8, 1, 0), 88);
        assert_eq!(health_rating(4, 1, 1), 50);
        assert_eq!(health_rating(4, 4, 0), 0);
    }

    #[test]
    fn test_summarize_mixed_project() {
        let now = Utc::now();
        let features = vec![
            toggle(100, false, "release", now),
            toggle(5, false, "release", now),
            toggle(50, true, "release", now),
            toggle(9, false, "operational", now),
        ];

        let counts = summarize(&features, &lifetimes(), now).unwrap();
        assert_eq!(counts.total_count, 4);
        assert_eq!(counts.active_count, 3);
        assert_eq!(counts.stale_count, 1);
        assert_eq!(counts.potentially_stale_count, 2);
        assert_eq!(counts.health, 25);
    }

    fn summary_strategy() -> impl Strategy<Value = ToggleSummary> {
        let now = Utc::now();
        (0i64..400, any::<bool>(), prop::sample::select(vec!["release", "operational", "kill-switch"]))
            .prop_map(move |(days, stale, t)| toggle(days, stale, t, now))
    }

    proptest! {
        #[test]
        fn prop_rating_matches_formula(t in 1usize..10_000, s_frac in 0usize..10_000, p_frac in 0usize..10_000) {
            let s = s_frac % (t + 1);
            let p = p_frac % (t + 1);
            let ratio = |n: usize| n as f64 / t as f64 * 100.0;
            let expected = (100.0 - ratio(s) - ratio(p) + 0.5).floor() as i32;
            prop_assert_eq!(health_rating(t, s, p), expected);
        }

        #[test]
        fn prop_stale_and_active_partition(features in prop::collection::vec(summary_strategy(), 0..64)) {
            prop_assert_eq!(stale_count(&features) + active_count(&features), features.len());
        }

        #[test]
        fn prop_summarized_rating_in_range(features in prop::collection::vec(summary_strategy(), 0..64)) {
            let counts = summarize(&features, &lifetimes(), Utc::now()).unwrap();
            prop_assert_eq!(counts.active_count + counts.stale_count, counts.total_count);
            prop_assert!(counts.potentially_stale_count <= counts.active_count);
            prop_assert!((0..=100).contains(&counts.health));
        }
    }
}
