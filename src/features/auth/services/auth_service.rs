use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto};
use crate::modules::store::{UserRecord, UserStore};
use crate::shared::constants::{ROLE_ADMIN, ROLE_USER};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Hashed once and verified against when the username is unknown
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-for-unknown-users";

/// Service for credential checks against the user store
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hash_cost: u32,
    placeholder_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self::with_cost(users, bcrypt::DEFAULT_COST)
    }

    /// Use a specific bcrypt cost for newly hashed passwords
    pub fn with_cost(users: Arc<dyn UserStore>, hash_cost: u32) -> Self {
        Self {
            users,
            hash_cost,
            placeholder_hash: OnceCell::new(),
        }
    }

    /// Hash the placeholder password up front so the first unknown-user
    /// login costs the same as any other
    pub async fn warm_up(&self) -> Result<()> {
        self.placeholder_hash().await.map(|_| ())
    }

    async fn placeholder_hash(&self) -> Result<String> {
        self.placeholder_hash
            .get_or_try_init(|| hash_password(PLACEHOLDER_PASSWORD.to_string(), self.hash_cost))
            .await
            .cloned()
    }

    /// Check credentials and report the user's role.
    ///
    /// Unknown usernames and wrong passwords fail identically, and both run
    /// a bcrypt verification.
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        tracing::info!("Login attempt: username={}", dto.username);

        let user = self.users.find_by_username(&dto.username).await?;
        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.placeholder_hash().await?,
        };
        let verified = verify_password(dto.password, hash).await?;

        let Some(user) = user.filter(|_| verified) else {
            tracing::warn!("Login rejected: username={}", dto.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        Ok(LoginResponseDto {
            role: role_for(&user).to_string(),
            username: user.username,
        })
    }

    /// Create or update a user with a freshly hashed password
    pub async fn upsert_user(&self, username: &str, password: &str, admin: bool) -> Result<()> {
        let hash = hash_password(password.to_string(), self.hash_cost).await?;
        let user = self.users.upsert(username, &hash, admin).await?;
        tracing::info!(
            "User provisioned: username={}, role={}",
            user.username,
            role_for(&user)
        );
        Ok(())
    }
}

fn role_for(user: &UserRecord) -> &'static str {
    if user.admin {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

    match verified {
        Ok(valid) => Ok(valid),
        Err(e) => {
            // A corrupt stored hash must not let anyone in
            tracing::error!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}
