use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::models::User;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for user signup
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "f_name is required (max 100 characters)"))]
    pub f_name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "l_name is required (max 100 characters)"))]
    pub l_name: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "email is required"),
        email(message = "email must be a valid email address")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(
        length(min = 1, max = 50, message = "username must be 1-50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "username must start with a letter or underscore and contain only letters, digits, '_', '.' or '-'"
        )
    )]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl SignupRequestDto {
    /// Trim every field except the password; emails compare case-insensitively
    pub fn normalized(self) -> Self {
        Self {
            f_name: self.f_name.trim().to_string(),
            l_name: self.l_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.f_name, self.l_name)
    }
}

/// Request DTO for user login
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl LoginRequestDto {
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequestDto {
        SignupRequestDto {
            f_name: " Priya ".to_string(),
            l_name: "Sharma".to_string(),
            email: " Priya@Example.COM ".to_string(),
            username: "priya_s".to_string(),
            password: " secret ".to_string(),
        }
    }

    #[test]
    fn test_signup_is_normalized() {
        let dto = signup().normalized();
        assert_eq!(dto.email, "priya@example.com");
        assert_eq!(dto.display_name(), "Priya Sharma");
        assert_eq!(dto.password, " secret ");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_signup_rejects_bad_email_and_username() {
        let mut dto = signup();
        dto.email = "not-an-email".to_string();
        dto.username = "9lives".to_string();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("username"));
    }

    #[test]
    fn test_missing_signup_fields_are_reported() {
        let dto: SignupRequestDto = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["f_name", "l_name", "username", "password"] {
            assert!(fields.contains_key(field), "{} should be reported", field);
        }
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let user = User {
            id: 1,
            email: "a@b.co".to_string(),
            username: "ab".to_string(),
            name: "A B".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserResponseDto::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ab");
    }
}
