//! Form validation shared by the team, user and key routes.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::models::{Member, TeamPayload, UserPayload};

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(s|m|h|d|mo)$").expect("duration pattern is valid"));

/// Message returned for malformed budget durations.
pub const INVALID_DURATION_MESSAGE: &str =
    r#"Invalid budget duration format. Use formats like "30s", "30m", "30h", "30d", or "1mo"."#;

/// Whether `duration` is a budget duration such as `30s`, `12h`, `30d` or `1mo`.
pub fn is_valid_duration(duration: &str) -> bool {
    DURATION_RE.is_match(duration)
}

/// Reject a present but malformed budget duration. Empty counts as absent.
pub fn validate_budget_duration(duration: Option<&str>) -> Result<(), AppError> {
    match duration {
        Some(d) if !d.is_empty() && !is_valid_duration(d) => {
            Err(AppError::Validation(INVALID_DURATION_MESSAGE.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn validate_team(team: &TeamPayload) -> Result<(), AppError> {
    if team
        .team_alias
        .as_deref()
        .map_or(true, |alias| alias.trim().is_empty())
    {
        return Err(AppError::Validation("Team name is required".to_string()));
    }
    validate_budget_duration(team.budget_duration.as_deref())?;
    if let Some(members) = &team.members_with_roles {
        validate_members(members)?;
    }
    Ok(())
}

pub fn validate_user(user: &UserPayload) -> Result<(), AppError> {
    if user
        .user_email
        .as_deref()
        .map_or(true, |email| email.trim().is_empty())
    {
        return Err(AppError::Validation("User email is required".to_string()));
    }
    validate_budget_duration(user.budget_duration.as_deref())
}

/// Member lists must name each user once, by a non-empty id.
pub fn validate_members(members: &[Member]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for member in members {
        if member.user_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Every team member needs a user_id".to_string(),
            ));
        }
        if !seen.insert(member.user_id.as_str()) {
            return Err(AppError::Validation(format!(
                "User {} is listed more than once",
                member.user_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;

    #[test]
    fn test_valid_durations() {
        for d in ["30d", "1mo", "0s", "30s", "30m", "12h", "007d"] {
            assert!(is_valid_duration(d), "{} should be valid", d);
        }
    }

    #[test]
    fn test_invalid_durations() {
        for d in ["", "30 d", "d30", "30D", "-5d", "1.5h", " 30d", "30d ", "30", "30w", "1mon"] {
            assert!(!is_valid_duration(d), "{:?} should be invalid", d);
        }
    }

    #[test]
    fn test_team_requires_alias() {
        let team = TeamPayload::default();
        assert!(matches!(validate_team(&team), Err(AppError::Validation(_))));

        let team = TeamPayload {
            team_alias: Some("research".into()),
            ..Default::default()
        };
        assert!(validate_team(&team).is_ok());
    }

    #[test]
    fn test_team_rejects_bad_duration() {
        let team = TeamPayload {
            team_alias: Some("research".into()),
            budget_duration: Some("30 days".into()),
            ..Default::default()
        };
        let err = validate_team(&team).unwrap_err();
        assert_eq!(err.message(), INVALID_DURATION_MESSAGE);
    }

    #[test]
    fn test_empty_duration_is_absent() {
        assert!(validate_budget_duration(Some("")).is_ok());
        assert!(validate_budget_duration(None).is_ok());
    }

    #[test]
    fn test_user_requires_email() {
        let user = UserPayload::default();
        assert!(validate_user(&user).is_err());

        let user = UserPayload {
            user_email: Some("ada@example.com".into()),
            budget_duration: Some("1mo".into()),
            ..Default::default()
        };
        assert!(validate_user(&user).is_ok());
    }

    #[test]
    fn test_duplicate_members_rejected() {
        let members = vec![
            Member::new("u1", MemberRole::Admin),
            Member::new("u1", MemberRole::User),
        ];
        assert!(validate_members(&members).is_err());

        let members = vec![Member::new(" ", MemberRole::User)];
        assert!(validate_members(&members).is_err());
    }
}
