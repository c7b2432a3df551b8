use crate::error::{Error, Result};
use crate::services::user_service::UserService;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::jwt::{issue_token, verify_token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Created { token: String },
    LoggedIn { token: String },
}

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: UserService, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    /// Unknown usernames are registered on first login.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let Some(user) = self.users.find_by_username(username).await? else {
            let hash = hash_password(password)
                .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
            self.users.create_with_password(username, &hash).await?;
            return Ok(LoginOutcome::Created {
                token: self.issue(username)?,
            });
        };

        match user.password_hash.as_deref() {
            Some(stored) => {
                let valid = verify_password(password, stored)
                    .map_err(|e| Error::Internal(format!("Stored password hash is invalid: {}", e)))?;
                if !valid {
                    tracing::warn!(username, "Rejected login with wrong password");
                    return Err(Error::Unauthorized("Invalid credentials".to_string()));
                }
            }
            None => {
                let hash = hash_password(password)
                    .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
                if !self.users.adopt_password(username, &hash).await? {
                    return Err(Error::Unauthorized("Invalid credentials".to_string()));
                }
                tracing::info!(username, "Password set on existing profile");
            }
        }

        self.users.touch_last_active(username).await?;
        Ok(LoginOutcome::LoggedIn {
            token: self.issue(username)?,
        })
    }

    /// Returns the username carried by a valid token.
    pub fn verify(&self, token: &str) -> Result<String> {
        let claims = verify_token(token, &self.jwt_secret)
            .map_err(|_| Error::Unauthorized("Invalid token".to_string()))?;
        Ok(claims.sub)
    }

    fn issue(&self, username: &str) -> Result<String> {
        Ok(issue_token(username, &self.jwt_secret)?)
    }
}
