use crate::api::ApiError;
use crate::error::ClientError;
use crate::model::{AuthResponse, ForgotPassword, NewUser, ResetPassword, SignIn, User};
use crate::validation;

use super::ClientContext;

/// Sign-in, registration and session hydration.
#[derive(Clone)]
pub struct AuthService {
    ctx: ClientContext,
}

impl AuthService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    pub async fn sign_in(&self, credentials: &SignIn) -> Result<User, ClientError> {
        let result = self.try_sign_in(credentials).await;
        self.ctx.settle_confirmed("Sign in", "Signed in", result)
    }

    async fn try_sign_in(&self, credentials: &SignIn) -> Result<User, ClientError> {
        validation::sign_in(credentials)?;
        let auth = self.ctx.api.sign_in(credentials).await?;
        self.establish(auth).await
    }

    pub async fn register(&self, user: &NewUser) -> Result<User, ClientError> {
        let result = self.try_register(user).await;
        self.ctx
            .settle_confirmed("Registration", "Account created", result)
    }

    async fn try_register(&self, user: &NewUser) -> Result<User, ClientError> {
        validation::registration(user)?;
        let auth = self.ctx.api.register(user).await?;
        self.establish(auth).await
    }

    /// Request a reset link for `email`. Works without a session.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        let result = self.try_forgot_password(email).await;
        self.ctx
            .settle_confirmed("Password reset request", "Reset link sent", result)
    }

    async fn try_forgot_password(&self, email: &str) -> Result<(), ClientError> {
        validation::forgot_password(email)?;
        let request = ForgotPassword {
            email: email.trim().to_string(),
        };
        self.ctx.api.forgot_password(&request).await?;
        Ok(())
    }

    /// Set a new password from a reset link. The user still has to sign in
    /// afterwards.
    pub async fn reset_password(&self, reset: &ResetPassword) -> Result<(), ClientError> {
        let result = self.try_reset_password(reset).await;
        self.ctx
            .settle_confirmed("Password reset", "Password reset", result)
    }

    async fn try_reset_password(&self, reset: &ResetPassword) -> Result<(), ClientError> {
        validation::reset_password(reset)?;
        self.ctx.api.reset_password(reset).await?;
        tracing::info!("Password reset");
        Ok(())
    }

    /// Store the tokens from an auth response and resolve the user.
    async fn establish(&self, auth: AuthResponse) -> Result<User, ClientError> {
        let (access_token, refresh_token) = match (auth.access_token, auth.refresh_token) {
            (Some(access), Some(refresh)) if auth.is_success => (access, refresh),
            _ => {
                return Err(ApiError::Application {
                    message: auth.message,
                    errors: Vec::new(),
                }
                .into())
            }
        };
        self.ctx.session.set_tokens(access_token, refresh_token)?;

        let user = match auth.user {
            Some(user) => user,
            None => self.ctx.api.current_user().await?,
        };
        self.ctx.session.set_user(user.id.clone());
        self.ctx.store.upsert(user.clone());
        tracing::info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Resolve the persisted session to a user.
    ///
    /// Without a token this is `Ok(None)`. When the token no longer works
    /// the credentials are cleared and the result is also `Ok(None)`.
    pub async fn check_auth(&self) -> Result<Option<User>, ClientError> {
        if !self.ctx.session.is_authenticated() {
            return Ok(None);
        }

        match self.ctx.api.current_user().await {
            Ok(user) => {
                self.ctx.session.set_user(user.id.clone());
                self.ctx.store.upsert(user.clone());
                Ok(Some(user))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Stored session rejected, clearing credentials");
                self.ctx.session.clear();
                Ok(None)
            }
        }
    }

    /// Forget the session and everything cached for it.
    pub fn sign_out(&self) {
        self.ctx.session.clear();
        self.ctx.store.reset();
        self.ctx.notices.success("Signed out");
    }

    /// The signed-in user's cached record.
    pub fn current_user(&self) -> Option<User> {
        self.ctx
            .session
            .user_id()
            .and_then(|id| self.ctx.store.user(&id))
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.session.is_authenticated()
    }
}
