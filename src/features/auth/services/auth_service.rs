use sqlx::SqlitePool;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, SignupRequestDto};
use crate::features::auth::models::{CreateUser, User};
use crate::shared::time;

const DUPLICATE_USER: &str = "User with this email or username already exists";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Service for authentication operations (signup, login)
pub struct AuthService {
    pool: SqlitePool,
    bcrypt_cost: u32,
    /// Verified against when the email is unknown, so both failures cost the same
    dummy_hash: String,
}

impl AuthService {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Result<Self> {
        let dummy_hash = bcrypt::hash("civicsync-unknown-account", config.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Failed to prepare password hasher: {}", e)))?;

        Ok(Self {
            pool,
            bcrypt_cost: config.bcrypt_cost,
            dummy_hash,
        })
    }

    /// Register a new user
    pub async fn signup(&self, dto: SignupRequestDto) -> Result<User> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? OR username = ?)",
        )
        .bind(&dto.email)
        .bind(&dto.username)
        .fetch_one(&self.pool)
        .await?;

        if taken {
            return Err(AppError::Conflict(DUPLICATE_USER.to_string()));
        }

        let data = CreateUser {
            name: dto.display_name(),
            password_hash: hash_password(dto.password, self.bcrypt_cost).await?,
            email: dto.email,
            username: dto.username,
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, name, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, email, username, name, password_hash, created_at
            "#,
        )
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.name)
        .bind(&data.password_hash)
        .bind(time::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent signup for the same email or username
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(DUPLICATE_USER.to_string())
            }
            e => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Created user: {} ({})", user.id, user.username);

        Ok(user)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, name, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await?;

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password_valid = verify_password(dto.password, hash).await?;

        match user {
            Some(user) if password_valid => {
                tracing::info!("User {} logged in", user.id);
                Ok(user)
            }
            _ => {
                tracing::debug!("Rejected login attempt");
                Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }
}

/// bcrypt is CPU bound, so it runs on the blocking pool
async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
