//! User domain entity
//!
//! A registered member of the service. Users move between `Active` and
//! `Dormant` through login and the dormant sweep; `Deleted` is terminal.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;

/// Storage-assigned identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Dormant,
    Deleted,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "ACTIVE"),
            UserStatus::Dormant => write!(f, "DORMANT"),
            UserStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(UserStatus::Active),
            "DORMANT" => Ok(UserStatus::Dormant),
            "DELETED" => Ok(UserStatus::Deleted),
            _ => Err(format!("Unknown user status: {}", s)),
        }
    }
}

/// A user of the service
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Option<UserId>,
    username: String,
    email: String,
    status: UserStatus,
    last_login_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new, not yet persisted user
    ///
    /// New users start `Active` with `last_login_at` set to now. Identity and
    /// audit timestamps stay empty until the first save.
    pub fn new(username: &str, email: &str) -> Result<Self, DomainError> {
        validate_username(username)?;
        validate_email(email)?;

        Ok(Self {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            status: UserStatus::Active,
            last_login_at: Some(Utc::now()),
            created_at: None,
            updated_at: None,
        })
    }

    /// Rebuild a user from storage without validation
    pub fn reconstitute(
        id: UserId,
        username: String,
        email: String,
        status: UserStatus,
        last_login_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            username,
            email,
            status,
            last_login_at,
            created_at: Some(created_at),
            updated_at,
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn change_username(&mut self, username: &str) -> Result<(), DomainError> {
        validate_username(username)?;
        self.username = username.to_string();
        self.touch();
        Ok(())
    }

    pub fn change_email(&mut self, email: &str) -> Result<(), DomainError> {
        validate_email(email)?;
        self.email = email.to_string();
        self.touch();
        Ok(())
    }

    /// Replace username and email together; neither changes unless both are valid
    pub fn update_profile(&mut self, username: &str, email: &str) -> Result<(), DomainError> {
        validate_username(username)?;
        validate_email(email)?;

        self.username = username.to_string();
        self.email = email.to_string();
        self.touch();
        Ok(())
    }

    /// Record a login. A dormant user becomes active again; a deleted user
    /// keeps its status.
    pub fn login(&mut self) {
        self.last_login_at = Some(Utc::now());
        if self.status == UserStatus::Dormant {
            self.status = UserStatus::Active;
            self.touch();
        }
    }

    pub fn switch_to_dormant(&mut self) {
        if self.status == UserStatus::Active {
            self.status = UserStatus::Dormant;
            self.touch();
        }
    }

    pub fn withdraw(&mut self) {
        if self.status != UserStatus::Deleted {
            self.status = UserStatus::Deleted;
            self.touch();
        }
    }

    /// Whether the dormant sweep should pick this user up
    pub fn is_dormant_candidate(&self, threshold: DateTime<Utc>) -> bool {
        self.status == UserStatus::Active
            && self.last_login_at.is_some_and(|at| at < threshold)
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::invalid("username", "Username cannot be empty"));
    }
    let len = username.chars().count();
    if len < USERNAME_MIN_CHARS {
        return Err(DomainError::invalid(
            "username",
            format!("Username must be at least {} characters", USERNAME_MIN_CHARS),
        ));
    }
    if len > USERNAME_MAX_CHARS {
        return Err(DomainError::invalid(
            "username",
            format!("Username cannot exceed {} characters", USERNAME_MAX_CHARS),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.trim().is_empty() {
        return Err(DomainError::invalid("email", "Email cannot be empty"));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(DomainError::invalid("email", "Invalid email format"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn field_of(err: DomainError) -> &'static str {
        match err {
            DomainError::InvalidArgument { field, .. } => field,
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    fn stored_user(status: UserStatus, last_login_at: Option<DateTime<Utc>>) -> User {
        let created = Utc::now() - Duration::days(400);
        User::reconstitute(
            UserId(7),
            "stored".to_string(),
            "stored@example.com".to_string(),
            status,
            last_login_at,
            created,
            Some(created),
        )
    }

    #[test]
    fn new_user_is_active_and_unpersisted() {
        let user = User::new("alice", "alice@example.com").unwrap();

        assert_eq!(user.id(), None);
        assert_eq!(user.status(), UserStatus::Active);
        assert!(user.last_login_at().is_some());
        assert_eq!(user.created_at(), None);
        assert_eq!(user.updated_at(), None);
    }

    #[test]
    fn valid_usernames_and_emails_are_accepted() {
        let longest = "a".repeat(USERNAME_MAX_CHARS);
        let usernames = ["abc", "alice", longest.as_str(), "한국어이름"];
        let emails = [
            "a@b.co",
            "first.last+tag@mail.example.org",
            "under_score-dash@sub.domain.io",
        ];

        for username in usernames {
            for email in emails {
                assert!(
                    User::new(username, email).is_ok(),
                    "{} / {} should be valid",
                    username,
                    email
                );
            }
        }
    }

    #[test]
    fn invalid_username_names_the_field() {
        let too_long = "a".repeat(USERNAME_MAX_CHARS + 1);
        for username in ["", "   ", "ab", too_long.as_str()] {
            let err = User::new(username, "ok@example.com").unwrap_err();
            assert_eq!(field_of(err), "username", "input {:?}", username);
        }
    }

    #[test]
    fn invalid_email_names_the_field() {
        for email in ["", " ", "plain", "no-at.example.com", "a@b", "a@b.c", "a b@c.com"] {
            let err = User::new("alice", email).unwrap_err();
            assert_eq!(field_of(err), "email", "input {:?}", email);
        }
    }

    #[test]
    fn update_profile_is_all_or_nothing() {
        let mut user = stored_user(UserStatus::Active, Some(Utc::now()));
        let before = user.clone();

        let err = user.update_profile("new-name", "broken").unwrap_err();

        assert_eq!(field_of(err), "email");
        assert_eq!(user, before);
    }

    #[test]
    fn update_profile_changes_both_fields_and_stamps() {
        let mut user = stored_user(UserStatus::Active, Some(Utc::now()));
        let before = user.updated_at();

        user.update_profile("renamed", "renamed@example.com").unwrap();

        assert_eq!(user.username(), "renamed");
        assert_eq!(user.email(), "renamed@example.com");
        assert!(user.updated_at() > before);
    }

    #[test]
    fn rejected_change_username_keeps_state() {
        let mut user = stored_user(UserStatus::Active, Some(Utc::now()));
        let before = user.clone();

        assert!(user.change_username("x").is_err());
        assert_eq!(user, before);

        user.change_email("fresh@example.com").unwrap();
        assert_eq!(user.email(), "fresh@example.com");
    }

    #[test]
    fn login_reactivates_dormant_user() {
        let mut user = stored_user(UserStatus::Dormant, Some(Utc::now() - Duration::days(500)));

        user.login();

        assert_eq!(user.status(), UserStatus::Active);
        assert!(user.last_login_at().unwrap() > Utc::now() - Duration::minutes(1));
    }

    #[test]
    fn deleted_is_terminal() {
        let mut user = stored_user(UserStatus::Deleted, None);
        let before = user.clone();

        user.switch_to_dormant();
        user.withdraw();
        assert_eq!(user, before);

        user.login();
        assert_eq!(user.status(), UserStatus::Deleted);
        assert_eq!(user.updated_at(), before.updated_at());
    }

    #[test]
    fn login_on_deleted_user_still_records_the_time() {
        let mut user = stored_user(UserStatus::Deleted, None);

        user.login();

        assert!(user.last_login_at().is_some());
    }

    #[test]
    fn login_on_active_user_does_not_stamp_updated_at() {
        let mut user = stored_user(UserStatus::Active, None);
        let before = user.updated_at();

        user.login();

        assert_eq!(user.updated_at(), before);
        assert!(user.last_login_at().is_some());
    }

    #[test]
    fn switch_to_dormant_only_from_active() {
        let mut active = stored_user(UserStatus::Active, None);
        active.switch_to_dormant();
        assert_eq!(active.status(), UserStatus::Dormant);

        let mut dormant = stored_user(UserStatus::Dormant, None);
        let before = dormant.clone();
        dormant.switch_to_dormant();
        assert_eq!(dormant, before);
    }

    #[test]
    fn withdraw_is_idempotent() {
        let mut user = stored_user(UserStatus::Active, None);
        user.withdraw();
        let first = user.clone();
        user.withdraw();

        assert_eq!(user.status(), UserStatus::Deleted);
        assert_eq!(user, first);
    }

    #[test]
    fn dormant_candidate_requires_active_and_old_login() {
        let threshold = Utc::now() - Duration::days(365);

        assert!(stored_user(UserStatus::Active, Some(threshold - Duration::days(1)))
            .is_dormant_candidate(threshold));
        assert!(!stored_user(UserStatus::Active, Some(Utc::now()))
            .is_dormant_candidate(threshold));
        assert!(!stored_user(UserStatus::Dormant, Some(threshold - Duration::days(1)))
            .is_dormant_candidate(threshold));
        assert!(!stored_user(UserStatus::Active, None).is_dormant_candidate(threshold));
    }

    #[test]
    fn status_display_and_parse() {
        assert_eq!(UserStatus::Dormant.to_string(), "DORMANT");
        assert_eq!("active".parse::<UserStatus>().unwrap(), UserStatus::Active);
        assert_eq!("DELETED".parse::<UserStatus>().unwrap(), UserStatus::Deleted);
        assert!("gone".parse::<UserStatus>().is_err());
    }
}
