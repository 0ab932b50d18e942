//! Request/response types for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identity::CollegeSummary;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub name: String,
    #[serde(rename = "collegeId")]
    pub college_id: String,
}

/// Public student profile returned by the sign-in/sign-up endpoints.
/// The session credential itself travels only in the cookie.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StudentProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<CollegeSummary>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub student: StudentProfile,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccountTypeResponse {
    pub success: bool,
    #[serde(rename = "accountType")]
    pub account_type: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn signup_request_uses_wire_field_names() -> Result<()> {
        let json = serde_json::json!({
            "email": "alice@example.com",
            "password": "Password1!",
            "confirmPassword": "Password1!",
            "name": "Alice",
            "collegeId": "college-1",
        });
        let request: SignupRequest = serde_json::from_value(json)?;
        assert_eq!(request.confirm_password, "Password1!");
        assert_eq!(request.college_id, "college-1");
        Ok(())
    }

    #[test]
    fn student_profile_omits_missing_college() -> Result<()> {
        let profile = StudentProfile {
            id: "student_1".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            college: None,
        };
        let value = serde_json::to_value(&profile)?;
        assert!(value.get("college").is_none());
        Ok(())
    }

    #[test]
    fn account_type_response_round_trips() -> Result<()> {
        let response = AccountTypeResponse {
            success: true,
            account_type: "STUDENT".to_string(),
            user_id: "student_1".to_string(),
            email: "alice@example.com".to_string(),
        };
        let value = serde_json::to_value(&response)?;
        let account_type = value
            .get("accountType")
            .and_then(serde_json::Value::as_str)
            .context("missing accountType")?;
        assert_eq!(account_type, "STUDENT");
        let decoded: AccountTypeResponse = serde_json::from_value(value)?;
        assert_eq!(decoded.user_id, "student_1");
        Ok(())
    }
}
