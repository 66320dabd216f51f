// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ValidatedConfig;
use crate::iam::types::User;

#[derive(Debug)]
pub enum JwtError {
    TokenCreationError(String),
    TokenVerificationError(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenCreationError(msg) => write!(f, "Token creation error: {}", msg),
            JwtError::TokenVerificationError(msg) => {
                write!(f, "Token verification error: {}", msg)
            }
        }
    }
}

impl std::error::Error for JwtError {}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub groups: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

pub struct JwtService {
    secret: String,
    issuer: String,
    audience: String,
    expiration_hours: u64,
    cookie_name: String,
    is_localhost: bool,
}

impl JwtService {
    pub fn new(config: &ValidatedConfig) -> Self {
        let jwt_config = &config.users.jwt;
        let is_localhost = matches!(config.server.host.as_str(), "127.0.0.1" | "localhost");

        JwtService {
            secret: jwt_config.secret.clone(),
            issuer: jwt_config.issuer.clone(),
            audience: jwt_config.audience.clone(),
            expiration_hours: jwt_config.expiration_hours,
            cookie_name: jwt_config.cookie_name.clone(),
            is_localhost,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Create a JWT token for a user
    pub fn create_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.expiration_hours as i64);

        let claims = Claims {
            sub: user.email.clone(),
            name: user.name.clone(),
            groups: user.roles.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreationError(e.to_string()))
    }

    /// Verify a JWT token and return claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerificationError(e.to_string()))?;

        Ok(token_data.claims)
    }

    /// Create a secure HTTP-only cookie carrying the token
    pub fn create_auth_cookie<'a>(&self, token: &str) -> actix_web::cookie::Cookie<'a> {
        let builder =
            actix_web::cookie::Cookie::build(self.cookie_name.clone(), token.to_string())
                .path("/")
                .http_only(true)
                .same_site(actix_web::cookie::SameSite::Lax);

        if self.is_localhost {
            // Allow plain HTTP on localhost deployments.
            builder.secure(false).finish()
        } else {
            builder.secure(true).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::test_config;

    fn test_user() -> User {
        User {
            email: "admin@example.com".to_string(),
            name: "Admin User".to_string(),
            roles: vec!["admin".to_string()],
        }
    }

    #[test]
    fn test_create_and_verify_token() {
        let service = JwtService::new(&test_config());
        let token = service.create_token(&test_user()).unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.groups, vec!["admin".to_string()]);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let service = JwtService::new(&test_config());
        let token = service.create_token(&test_user()).unwrap();
        let tampered = format!("{}x", token);
        assert!(service.verify_token(&tampered).is_err());
    }

    #[test]
    fn test_verify_rejects_foreign_secret() {
        let service = JwtService::new(&test_config());
        let mut other_config = test_config();
        other_config.users.jwt.secret = "other-secret".to_string();
        let other_service = JwtService::new(&other_config);

        let token = other_service.create_token(&test_user()).unwrap();
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_auth_cookie_shape() {
        let service = JwtService::new(&test_config());
        let cookie = service.create_auth_cookie("token-value");
        assert_eq!(cookie.name(), "confedit_auth");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
