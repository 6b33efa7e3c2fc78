//! Authentication service: registration, login, token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginUser, RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new reader account
    pub async fn register(&self, payload: &RegisterUser) -> AppResult<User> {
        if self.repository.users.email_exists(&payload.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let hash = hash_password(&payload.password)?;
        self.repository
            .users
            .create(&payload.name, &payload.email, &hash, Role::Reader)
            .await
    }

    /// Verify credentials and issue a JWT
    pub async fn login(&self, payload: &LoginUser) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(&payload.email)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".to_string()))?;

        if !verify_password(&payload.password, &user.password_hash) {
            return Err(AppError::Unauthenticated("Invalid email or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            iat: now,
            exp: now + (self.config.jwt_expiration_hours as i64) * 3600,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        Ok((token, user))
    }

    /// Current user for the given claims
    pub async fn current_user(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
