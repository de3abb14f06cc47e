use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;

use crate::errors::{AppError, Result};
use crate::models::user::{Claims, Role};
use crate::state::AppState;

const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Roles permitted per operation, checked once after identity resolution.
pub mod policy {
    use crate::models::user::Role;

    pub const UPLOAD_MARKS: &[Role] = &[Role::Teacher];
    pub const READ_MARKS: &[Role] = &[Role::Teacher, Role::Student];
}

impl Claims {
    pub fn new(user_id: ObjectId, email: String, role: Role) -> Self {
        Claims {
            user_id: user_id.to_hex(),
            email,
            role,
            exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
        }
    }

    pub fn authorize(&self, permitted: &[Role]) -> Result<()> {
        if permitted.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::TokenGeneration)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

/// Bearer-token middleware: verifies the token and attaches the decoded
/// claims to request extensions for downstream authorization checks.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated)?;

    let claims = decode_token(token, &state.jwt_secret)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn teacher_claims() -> Claims {
        Claims::new(ObjectId::new(), "t@x.com".to_string(), Role::Teacher)
    }

    #[test]
    fn token_round_trips_identity_and_role() {
        let claims = teacher_claims();
        let token = issue_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.user_id, claims.user_id);
        assert_eq!(decoded.email, "t@x.com");
        assert_eq!(decoded.role, Role::Teacher);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&teacher_claims(), "other-secret").unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: ObjectId::new().to_hex(),
            email: "t@x.com".to_string(),
            role: Role::Teacher,
            exp: (Utc::now().timestamp() - 120) as usize,
        };
        let token = issue_token(&claims, SECRET).unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            decode_token("not.a.token", SECRET),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn upload_policy_admits_teachers_only() {
        let teacher = teacher_claims();
        assert!(teacher.authorize(policy::UPLOAD_MARKS).is_ok());

        let student = Claims::new(ObjectId::new(), "s@x.com".to_string(), Role::Student);
        assert!(matches!(
            student.authorize(policy::UPLOAD_MARKS),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn read_policy_admits_both_roles() {
        let teacher = teacher_claims();
        let student = Claims::new(ObjectId::new(), "s@x.com".to_string(), Role::Student);
        assert!(teacher.authorize(policy::READ_MARKS).is_ok());
        assert!(student.authorize(policy::READ_MARKS).is_ok());
    }
}
