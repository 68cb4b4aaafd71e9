use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        jwt::{generate_token, verify_token},
        password,
    },
    config::Config,
    error::{AppError, Result},
    model::{
        role::Role,
        user::{NewUser, User, UserPatch, UserResponse},
    },
    models::{LoginReqDto, SignUpReq},
    store::UserStore,
    utils::email_registry::EmailRegistry,
    validator::validate_credentials,
};

/// Verified caller identity, decoded once from the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: u64,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    emails: EmailRegistry,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, config: Arc<Config>) -> Self {
        Self {
            users,
            emails: EmailRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn issue_credential(&self, user: &User) -> Result<String> {
        generate_token(
            user.id,
            user.role,
            &self.config.jwt_secret,
            self.config.token_ttl,
        )
    }

    pub fn resolve_identity(&self, credential: &str) -> Result<Identity> {
        let claims = verify_token(credential, &self.config.jwt_secret)?;

        Ok(Identity {
            user_id: claims.user_id,
            role: claims.role,
        })
    }

    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        password::verify_password(plain, hash)
    }

    /// Seed the email registry from the users already in the store.
    pub async fn warmup(&self, users: &[User]) {
        self.emails
            .warmup(users.iter().map(|u| u.email.as_str()))
            .await;
    }

    /// filter (fast negative) → cache (fast positive) → store
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        if !self.emails.might_exist(email) {
            return Ok(true);
        }

        if self.emails.is_taken(email).await {
            return Ok(false);
        }

        match self.users.get_user_by_email(email).await {
            Ok(_) => {
                self.emails.mark_taken(email).await;
                Ok(false)
            }
            Err(AppError::NotFound(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    #[instrument(name = "auth_sign_up", skip(self, req), fields(email = %req.email))]
    pub async fn sign_up(&self, req: SignUpReq) -> Result<UserResponse> {
        let email = req.email.trim().to_lowercase();
        validate_credentials(&email, &req.password)?;

        if !self.is_email_available(&email).await? {
            info!("Sign-up rejected: email already in use");
            return Err(AppError::Conflict("email is already in use".to_string()));
        }

        let role = if self.config.is_admin_email(&email) {
            Role::Admin
        } else {
            Role::Employee
        };

        let user = self
            .users
            .create_user(NewUser {
                email,
                password: password::hash_password(&req.password)?,
                department: req.department.trim().to_string(),
                name: req.name.trim().to_string(),
                role,
            })
            .await?;

        self.emails.mark_taken(&user.email).await;
        info!(user_id = user.id, role = %user.role, "User signed up");

        Ok(user.into())
    }

    #[instrument(name = "auth_login", skip(self, req), fields(email = %req.email))]
    pub async fn log_in(&self, req: LoginReqDto) -> Result<String> {
        let email = req.email.trim().to_lowercase();
        validate_credentials(&email, &req.password)?;

        let user = match self.users.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                info!("Invalid credentials: user not found");
                return Err(invalid_credentials());
            }
            Err(e) => return Err(e),
        };

        debug!(user_id = user.id, "Verifying password");
        if !self.verify_password(&req.password, &user.password) {
            info!(user_id = user.id, "Invalid credentials: password mismatch");
            return Err(invalid_credentials());
        }

        info!(user_id = user.id, "Login successful");
        self.issue_credential(&user)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_account(&self, user_id: u64, patch: UserPatch) -> Result<UserResponse> {
        if patch.is_empty() {
            return Err(AppError::BadRequest("no fields provided for update".to_string()));
        }

        let user = self.users.update_user(user_id, patch).await?;
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: u64) -> Result<()> {
        let user = self.users.get_user_by_id(user_id).await?;
        self.users.delete_user(user_id).await?;
        self.emails.forget(&user.email).await;

        warn!(user_id, "Account deleted with all its attendance records");
        Ok(())
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid credentials".to_string())
}
