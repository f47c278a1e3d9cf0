//! Expiration date policy for link shares.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use cumulus_core::config::SharingConfig;
use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;

/// Truncate a timestamp to midnight of the same day.
pub fn midnight(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Validate a requested expiration against the sharing policy.
///
/// The date is normalised to midnight. Today and earlier are rejected.
/// When expiration is enforced the date may be at most
/// `expire_after_n_days` ahead; when a default is configured a missing
/// date becomes today plus that many days.
pub fn validate_expiration(
    requested: Option<DateTime<Utc>>,
    policy: &SharingConfig,
    now: DateTime<Utc>,
) -> AppResult<Option<DateTime<Utc>>> {
    let today = midnight(now);
    let horizon = today + Duration::days(policy.expire_after_n_days);
    let expiration = requested.map(midnight);

    if let Some(date) = expiration {
        if date <= today {
            return Err(AppError::validation("Expiration date is in the past"));
        }
        if policy.enforce_expire_date && date > horizon {
            return Err(AppError::validation(format!(
                "Cannot set expiration date more than {} days in the future",
                policy.expire_after_n_days
            )));
        }
    }

    if expiration.is_none() && policy.default_expire_date {
        return Ok(Some(horizon));
    }
    Ok(expiration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_past_and_today_rejected() {
        let policy = SharingConfig::default();
        for days in [-1, 0] {
            let err = validate_expiration(Some(now() + Duration::days(days)), &policy, now())
                .unwrap_err();
            assert_eq!(err.message, "Expiration date is in the past");
        }
    }

    #[test]
    fn test_normalised_to_midnight() {
        let policy = SharingConfig::default();
        let date = validate_expiration(Some(now() + Duration::days(2)), &policy, now())
            .unwrap()
            .unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_enforced_horizon() {
        let policy = SharingConfig {
            enforce_expire_date: true,
            expire_after_n_days: 3,
            ..SharingConfig::default()
        };
        let err = validate_expiration(Some(now() + Duration::days(4)), &policy, now()).unwrap_err();
        assert_eq!(err.message, "Cannot set expiration date more than 3 days in the future");
        assert!(validate_expiration(Some(now() + Duration::days(3)), &policy, now()).is_ok());
    }

    #[test]
    fn test_default_expiration() {
        let policy = SharingConfig {
            default_expire_date: true,
            expire_after_n_days: 3,
            ..SharingConfig::default()
        };
        let date = validate_expiration(None, &policy, now()).unwrap();
        assert_eq!(date, Some(Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap()));
        assert_eq!(validate_expiration(None, &SharingConfig::default(), now()).unwrap(), None);
    }
}
