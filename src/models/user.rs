use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub email: String,
    pub password: String,
    pub role: Role,

    #[serde(rename = "resetToken", default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,

    #[serde(
        rename = "resetTokenExpiration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reset_token_expiration: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub email: String,
    #[serde(rename = "OTP")]
    pub otp: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn reset_password_request_reads_uppercase_otp_key() {
        let req: ResetPasswordRequest = serde_json::from_str(
            r#"{"email":"s@x.com","OTP":"123456","newPassword":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.otp, "123456");
        assert_eq!(req.new_password, "secret1");
    }

    #[test]
    fn reset_fields_keep_camel_case_document_keys() {
        let user = User {
            _id: None,
            email: "t@x.com".into(),
            password: "$2b$10$hash".into(),
            role: Role::Teacher,
            reset_token: Some("tok".into()),
            reset_token_expiration: Some(DateTime::now()),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("resetToken").is_some());
        assert!(value.get("resetTokenExpiration").is_some());
        assert!(value.get("reset_token").is_none());
    }

    #[test]
    fn user_deserializes_without_reset_fields() {
        let user: User = serde_json::from_str(
            r#"{"email":"t@x.com","password":"$2b$10$hash","role":"teacher"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert!(user.reset_token.is_none());
        assert!(user.reset_token_expiration.is_none());
    }
}
