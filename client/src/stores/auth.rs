//! Session store

use std::sync::Arc;

use shared::{TokenStore, User, UserCreate};
use validator::Validate;

use crate::api::AuthApi;
use crate::error::{ClientError, ClientResult};

/// Current user and session flags
pub struct AuthStore {
    tokens: Arc<dyn TokenStore>,
    user: Option<User>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
    is_initialized: bool,
}

impl AuthStore {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            tokens,
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
            is_initialized: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Restore the session flag from the persisted token
    pub fn initialize(&mut self) {
        self.is_authenticated = self.tokens.load().is_some();
        self.is_initialized = true;
        tracing::debug!(authenticated = self.is_authenticated, "Session initialized");
    }

    /// Sign in and persist the issued bearer token
    pub async fn login(&mut self, api: &dyn AuthApi, email: &str, password: &str) -> ClientResult<()> {
        self.is_loading = true;
        self.error = None;

        let result = match api.login(email.trim(), password).await {
            Ok(token) => self.tokens.store(&token.access_token).map_err(ClientError::from),
            Err(e) => Err(e),
        };

        self.is_loading = false;
        match result {
            Ok(()) => {
                self.is_authenticated = true;
                tracing::info!("Signed in");
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message("Login failed"));
                self.is_authenticated = false;
                Err(e)
            }
        }
    }

    /// Create an account. Does not sign in.
    pub async fn register(&mut self, api: &dyn AuthApi, form: UserCreate) -> ClientResult<User> {
        self.error = None;
        if let Err(errors) = form.validate() {
            let err = ClientError::from(errors);
            self.error = Some(err.user_message("Registration failed"));
            return Err(err);
        }

        self.is_loading = true;
        let result = api.register(&form).await;
        self.is_loading = false;

        result.map_err(|e| {
            self.error = Some(e.user_message("Registration failed"));
            e
        })
    }

    /// Forget the token and the user
    pub fn logout(&mut self) -> ClientResult<()> {
        let cleared = self.tokens.clear();
        self.user = None;
        self.is_authenticated = false;
        self.is_initialized = true;
        tracing::info!("Signed out");
        cleared.map_err(ClientError::from)
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.is_authenticated = user.is_some();
        self.user = user;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
