// Authentication data models

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::{error::AuthError, provider::Document};

/// What kind of participant a user is in a safety relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Can monitor others
    Monitor,
    /// Being monitored
    Protected,
    /// Both monitor and protected
    Both,
}

impl UserRole {
    /// Strict parse of a role name, case-insensitive and ignoring surrounding whitespace
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        match input.trim().to_ascii_uppercase().as_str() {
            "MONITOR" => Ok(UserRole::Monitor),
            "PROTECTED" => Ok(UserRole::Protected),
            "BOTH" => Ok(UserRole::Both),
            _ => Err(AuthError::InvalidRole(input.to_string())),
        }
    }

    /// Stored tag, as written to profile documents
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Monitor => "MONITOR",
            UserRole::Protected => "PROTECTED",
            UserRole::Both => "BOTH",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Monitor => "Monitor",
            UserRole::Protected => "Protected",
            UserRole::Both => "Monitor & Protected",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::parse(s)
    }
}

/// User profile as persisted in the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: UserRole,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build the profile for a freshly created identity
    ///
    /// `created_at` is truncated to the millisecond precision documents store.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            role,
            profile_image_url: None,
            is_email_verified: false,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Field-map representation written to the document store
    pub fn to_document(&self) -> Result<Document, AuthError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(AuthError::ProfileCorrupted(format!(
                "user encoded as non-object: {}",
                other
            ))),
            Err(e) => Err(AuthError::ProfileCorrupted(e.to_string())),
        }
    }

    pub fn from_document(document: Document) -> Result<Self, AuthError> {
        serde_json::from_value(serde_json::Value::Object(document))
            .map_err(|e| AuthError::ProfileCorrupted(e.to_string()))
    }

    /// Up to two upper-case initials for an avatar placeholder
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .take(2)
            .filter_map(|part| part.chars().next())
            .collect();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_user() -> User {
        User {
            id: "uid-1".to_string(),
            name: "Ann Lee".to_string(),
            email: "a@b.com".to_string(),
            phone: "+351 900 000 000".to_string(),
            role: UserRole::Monitor,
            profile_image_url: None,
            is_email_verified: true,
            created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_parse_accepts_any_case() {
        assert_eq!(UserRole::parse("monitor").unwrap(), UserRole::Monitor);
        assert_eq!(UserRole::parse("Protected").unwrap(), UserRole::Protected);
        assert_eq!(UserRole::parse(" BOTH ").unwrap(), UserRole::Both);
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let result = UserRole::parse("guardian");
        assert_eq!(result, Err(AuthError::InvalidRole("guardian".to_string())));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(UserRole::parse("").is_err());
        assert!("  ".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(UserRole::Monitor.display_name(), "Monitor");
        assert_eq!(UserRole::Both.display_name(), "Monitor & Protected");
    }

    #[test]
    fn test_document_uses_stored_field_names() {
        let doc = sample_user().to_document().unwrap();
        assert_eq!(doc.get("role"), Some(&json!("MONITOR")));
        assert_eq!(doc.get("isEmailVerified"), Some(&json!(true)));
        assert_eq!(doc.get("createdAt"), Some(&json!(1_700_000_000_000i64)));
        assert_eq!(doc.get("profileImageUrl"), Some(&json!(null)));
    }

    #[test]
    fn test_from_document_fills_optional_defaults() {
        let doc = json!({
            "id": "uid-2",
            "name": "Bo",
            "email": "bo@example.com",
            "role": "PROTECTED",
            "createdAt": 1_700_000_000_000i64
        });
        let serde_json::Value::Object(map) = doc else { unreachable!() };

        let user = User::from_document(map).unwrap();
        assert_eq!(user.phone, "");
        assert_eq!(user.role, UserRole::Protected);
        assert!(!user.is_email_verified);
        assert!(user.profile_image_url.is_none());
    }

    #[test]
    fn test_from_document_rejects_missing_role() {
        let doc = json!({ "id": "uid-3", "name": "Cy", "email": "cy@example.com" });
        let serde_json::Value::Object(map) = doc else { unreachable!() };

        assert!(matches!(User::from_document(map), Err(AuthError::ProfileCorrupted(_))));
    }

    #[test]
    fn test_initials() {
        assert_eq!(sample_user().initials(), "AL");

        let mut user = sample_user();
        user.name = "madonna".to_string();
        assert_eq!(user.initials(), "M");

        user.name = "   ".to_string();
        assert_eq!(user.initials(), "U");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn role_strategy() -> impl Strategy<Value = UserRole> {
        prop_oneof![
            Just(UserRole::Monitor),
            Just(UserRole::Protected),
            Just(UserRole::Both),
        ]
    }

    /// Any casing of a stored tag parses back to the same role
    #[test]
    fn prop_parse_is_case_insensitive() {
        proptest!(|(role in role_strategy(), mask in proptest::collection::vec(any::<bool>(), 9))| {
            let mixed: String = role
                .as_str()
                .chars()
                .zip(mask.iter().cycle())
                .map(|(c, upper)| if *upper { c } else { c.to_ascii_lowercase() })
                .collect();
            prop_assert_eq!(UserRole::parse(&mixed).unwrap(), role);
        });
    }

    /// Strings that are not role names never default to a role
    #[test]
    fn prop_unknown_strings_are_rejected() {
        proptest!(|(input in "[a-z]{1,12}")| {
            let known = ["monitor", "protected", "both"];
            if !known.contains(&input.as_str()) {
                prop_assert!(UserRole::parse(&input).is_err());
            }
        });
    }
}
