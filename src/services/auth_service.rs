use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest};
use crate::{
    audit,
    db::DbPool,
    error::{AppError, AppResult},
    middleware::auth::USER_ROLE,
    models::User,
    response::{ApiResponse, Meta},
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn validate_registration(payload: &RegisterRequest) -> AppResult<()> {
    if !payload.email.contains('@') {
        return Err(AppError::Validation("email is invalid".into()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Creates the login identity and its customer profile together.
pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    validate_registration(&payload)?;
    let RegisterRequest {
        email,
        password,
        first_name,
        last_name,
    } = payload;

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let mut tx = pool.begin().await?;

    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(USER_ROLE)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO customers (id, user_id) VALUES ($1, $2)")
        .bind(Uuid::new_v4())
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    audit::record(
        pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub fn issue_token(user_id: Uuid, role: &str) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<UserRow> = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    let user = user.ok_or_else(|| AppError::BadRequest("Invalid email or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(user.id, &user.role)?;

    audit::record(
        pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }
    }

    #[test]
    fn registration_checks_email_and_password() {
        assert!(validate_registration(&request("ada@example.com", "secret1")).is_ok());
        assert!(validate_registration(&request("ada.example.com", "secret1")).is_err());
        assert!(validate_registration(&request("ada@example.com", "abc")).is_err());
    }

    #[test]
    fn hashed_passwords_verify() {
        let hash = hash_password("secret1").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"secret1", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
