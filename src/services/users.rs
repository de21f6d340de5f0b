//! Authentication and user account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Duration;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{RegisterRequest, UserClaims},
        NewUser, User, UserProfile,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user and return a session token
    pub async fn register(&self, request: RegisterRequest) -> AppResult<String> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let email = request.email.trim().to_string();
        if self.repository.users.email_exists(&email).await? {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let is_admin = self.is_admin_referral(request.referal.as_deref());
        let new_user = NewUser {
            firstname: request.firstname,
            lastname: request.lastname,
            email,
            password_hash: self.hash_password(&request.password)?,
            referal: request.referal,
            is_admin,
        };

        let user = self.repository.users.create(&new_user).await?;
        tracing::info!(user_id = user.id, is_admin = user.is_admin, "User registered");

        self.create_token_for_user(&user)
    }

    /// Authenticate user by email and return a session token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<String> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        self.create_token_for_user(&user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Public profile with the books currently borrowed
    pub async fn get_profile(&self, id: i32) -> AppResult<UserProfile> {
        let user = self.repository.users.get_by_id(id).await?;
        let borrowed_books = self.repository.borrowings.active_for_user(id).await?;

        Ok(UserProfile {
            firstname: user.firstname,
            lastname: user.lastname,
            borrowed_books,
        })
    }

    /// Load the caller and make sure the admin flag is set
    pub async fn require_admin(&self, claims: &UserClaims) -> AppResult<User> {
        let user = match self.repository.users.get_by_id(claims.user_id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication("User not found".to_string()))
            }
            Err(e) => return Err(e),
        };

        if !user.is_admin {
            return Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ));
        }
        Ok(user)
    }

    /// Delete the caller's own account after returning every borrowed book
    pub async fn delete_account(
        &self,
        caller: &UserClaims,
        user_id: i32,
        password: &str,
    ) -> AppResult<u64> {
        caller.require_self(user_id, "delete account")?;

        let user = self.repository.users.get_by_id(user_id).await?;
        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid password".to_string()));
        }

        self.repository.users.delete_with_returns(user_id).await
    }

    fn is_admin_referral(&self, referal: Option<&str>) -> bool {
        let secret = self.config.admin_referral_code.as_str();
        !secret.is_empty() && referal.map(str::trim) == Some(secret)
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let ttl = Duration::hours(self.config.jwt_expiration_hours as i64);
        UserClaims::new(user.id, ttl)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
