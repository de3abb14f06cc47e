use axum::{extract::State, response::Json, Extension};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use validator::Validate;

use crate::database::connection::USERS_COLLECTION;
use crate::errors::{AppError, Result};
use crate::middleware::auth::issue_token;
use crate::models::user::{
    Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    ResetPasswordRequest, UpdatePasswordRequest, User,
};
use crate::services::otp_store::OtpStore;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let users: Collection<User> = state.db.collection(USERS_COLLECTION);

    // Unknown email and wrong password produce the same error so the
    // response does not reveal which factor failed.
    let user = users
        .find_one(doc! { "email": &payload.email })
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = verify(&payload.password, &user.password)
        .map_err(|_| AppError::InvalidCredentials)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let user_id = user._id.ok_or(AppError::InvalidCredentials)?;
    let claims = Claims::new(user_id, user.email.clone(), user.role);
    let token = issue_token(&claims, &state.jwt_secret)?;

    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let users: Collection<User> = state.db.collection(USERS_COLLECTION);

    let user_id = ObjectId::parse_str(&claims.user_id).map_err(|_| AppError::InvalidToken)?;
    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or(AppError::UserNotFound)?;

    let valid = verify(&payload.current_password, &user.password)
        .map_err(|_| AppError::InvalidCredentials)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let hashed = hash(&payload.new_password, DEFAULT_COST).map_err(|_| AppError::PasswordHash)?;
    users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "password": hashed } },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let users: Collection<User> = state.db.collection(USERS_COLLECTION);

    let user = users
        .find_one(doc! { "email": &payload.email })
        .await?
        .ok_or(AppError::UserNotFound)?;

    let code = OtpStore::generate_code();
    // Stored before dispatch: a failed send surfaces as an error while the
    // code stays usable until it expires.
    state.otp_store.issue(&user.email, code, Utc::now());

    state.mailer.send_otp(&user.email, code).await?;

    tracing::info!("password reset OTP issued for {}", user.email);

    Ok(Json(MessageResponse {
        message: "OTP sent to your email.".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let code: u32 = payload
        .otp
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidOrExpiredOtp)?;

    if !state.otp_store.verify(&payload.email, code, Utc::now()) {
        return Err(AppError::InvalidOrExpiredOtp);
    }

    let hashed = hash(&payload.new_password, DEFAULT_COST).map_err(|_| AppError::PasswordHash)?;

    let users: Collection<User> = state.db.collection(USERS_COLLECTION);
    let result = users
        .update_one(
            doc! { "email": &payload.email },
            doc! { "$set": { "password": hashed } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::UserNotFound);
    }

    // Consumed only after the write lands, so a storage failure leaves
    // the code usable for a retry.
    state.otp_store.consume(&payload.email);

    Ok(Json(MessageResponse {
        message: "Password reset successfully.".to_string(),
    }))
}
