//! Profile service: sign-up, sign-in and session tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use civicpulse_common::{AppError, AppResult, IdGenerator};
use civicpulse_db::{entities::profile, repositories::ProfileRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

/// Input for creating an account.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 64))]
    pub username: String,
}

/// Input for signing in.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SigninInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// A signed-in user and their bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

impl Session {
    fn new(token: String, profile: &profile::Model) -> Self {
        Self {
            token,
            user_id: profile.id.clone(),
            username: profile.username.clone(),
        }
    }
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self {
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account and sign it in.
    pub async fn signup(&self, input: SignupInput) -> AppResult<Session> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.profile_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let token = self.id_gen.generate_token();
        let model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            username: Set(input.username.trim().to_string()),
            avatar_url: Set(None),
            password_hash: Set(hash_password(&input.password)?),
            token: Set(Some(token.clone())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let profile = self.profile_repo.create(model).await?;
        tracing::info!(user_id = %profile.id, "Profile created");

        Ok(Session::new(token, &profile))
    }

    /// Check credentials and issue a fresh token.
    pub async fn signin(&self, input: SigninInput) -> AppResult<Session> {
        input.validate()?;

        let profile = self
            .profile_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &profile.password_hash)? {
            tracing::debug!(user_id = %profile.id, "Sign-in rejected");
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let mut active: profile::ActiveModel = profile.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let profile = self.profile_repo.update(active).await?;

        tracing::info!(user_id = %profile.id, "Signed in");
        Ok(Session::new(token, &profile))
    }

    /// Invalidate the user's token.
    pub async fn signout(&self, user_id: &str) -> AppResult<()> {
        let profile = self.profile_repo.get_by_id(user_id).await?;
        let mut active: profile::ActiveModel = profile.into();
        active.token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.profile_repo.update(active).await?;
        Ok(())
    }

    /// Resolve a bearer token to its profile.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<profile::Model> {
        self.profile_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a profile by ID.
    pub async fn get(&self, id: &str) -> AppResult<profile::Model> {
        self.profile_repo.get_by_id(id).await
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
