// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web::Data;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc; // Services are per-thread

use super::jwt::{Claims, JwtService};
use super::types::{User, UserDirectory};

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn user_info(&self) -> Option<User>;
    fn jwt_claims(&self) -> Option<Claims>;
    fn jwt_id(&self) -> Option<String>;
    fn has_role(&self, role: &str) -> bool;
    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn user_info(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn jwt_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }

    fn jwt_id(&self) -> Option<String> {
        self.jwt_claims().map(|claims| claims.jti)
    }

    fn has_role(&self, role: &str) -> bool {
        self.user_info()
            .map(|info| info.roles.iter().any(|r| r == role))
            .unwrap_or(false)
    }

    fn is_authenticated(&self) -> bool {
        self.user_info().is_some()
    }
}

// JWT Authentication Middleware: verifies the auth cookie and attaches the
// claims plus the directory user to the request.
pub struct JwtAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let jwt_service = req.app_data::<Data<JwtService>>().cloned();
        let directory = req.app_data::<Data<UserDirectory>>().cloned();
        let service = self.service.clone();

        Box::pin(async move {
            if let (Some(jwt_service), Some(directory)) = (jwt_service, directory) {
                if let Some(cookie) = req.cookie(jwt_service.cookie_name()) {
                    match jwt_service.verify_token(cookie.value()) {
                        Ok(claims) => {
                            // The directory is authoritative for the user still
                            // existing and for the current role set.
                            if let Some(user) = directory.get(&claims.sub) {
                                req.extensions_mut().insert(claims.clone());
                                req.extensions_mut().insert(user.clone());
                            } else {
                                log::warn!(
                                    "Valid token for unknown user '{}'; ignoring session",
                                    claims.sub
                                );
                            }
                        }
                        Err(err) => {
                            log::debug!("Rejected auth cookie: {}", err);
                        }
                    }
                }
            }

            service.call(req).await
        })
    }
}
