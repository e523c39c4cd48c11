//! Account endpoints

use serde::Serialize;
use shared::{TokenResponse, User, UserCreate};

use super::ApiGateway;
use crate::error::ClientResult;

/// OAuth2 password-flow form expected by `POST /users/login`
#[derive(Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

impl ApiGateway {
    /// Register a new account
    pub async fn register(&self, user: &UserCreate) -> ClientResult<User> {
        self.post_json("/users/", user).await
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        let form = LoginForm {
            username: email,
            password,
        };
        self.post_form("/users/login", &form).await
    }
}
