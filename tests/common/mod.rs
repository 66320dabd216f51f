// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use confedit::admin;
use confedit::app_state::AppState;
use confedit::config::ValidatedConfig;
use confedit::iam::{JwtAuthMiddlewareFactory, JwtService, User, UserDirectory};
use confedit::public;
use confedit::registry::RegistrarFn;
use confedit::util::FormTokenStore;
use confedit::util::test_config::TestConfigBuilder;
use confedit::util::test_fixtures::TestFixtureRoot;
use std::fs;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const VIEWER_EMAIL: &str = "viewer@example.com";

pub const SEED_SECTION_CONFIG: &str = "{\"greeting\": \"hello\"}";
pub const SEED_NOTES: &str = "plain notes\n";

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub directory: Arc<UserDirectory>,
    pub jwt_service: Arc<JwtService>,
    pub form_tokens: Arc<FormTokenStore>,
}

pub struct AuthSession {
    pub user: User,
    pub jwt_id: String,
    pub cookie: actix_web::cookie::Cookie<'static>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub directory: Arc<UserDirectory>,
    pub jwt_service: Arc<JwtService>,
    pub form_tokens: Arc<FormTokenStore>,
    pub admin_path: String,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_registry(
            TestConfigBuilder::new()
                .with_registered_file("sections", "section-config.json", "Section config")
                .with_registered_file("notes", "notes.txt", "Notes"),
            default_registrars(),
        )
    }

    /// Harness without any registered files, for the empty-registry state.
    pub fn without_files() -> Self {
        Self::with_registry(TestConfigBuilder::new(), Vec::new())
    }

    pub fn with_registry(builder: TestConfigBuilder, registrars: Vec<RegistrarFn>) -> Self {
        let fixture = TestFixtureRoot::new_unique("editor-test-suite").expect("fixture root");
        fixture.init_theme_layout().expect("fixture layout");

        let config = Arc::new(builder.build());
        let runtime_paths = fixture.runtime_paths().expect("runtime paths");
        seed_theme_files(&fixture);

        let app_state = Arc::new(AppState::new(&config, runtime_paths, &registrars));
        let directory = Arc::new(UserDirectory::from_users(vec![
            User {
                email: ADMIN_EMAIL.to_string(),
                name: "Admin User".to_string(),
                roles: vec!["admin".to_string()],
            },
            User {
                email: VIEWER_EMAIL.to_string(),
                name: "Viewer User".to_string(),
                roles: vec!["editor".to_string()],
            },
        ]));
        let jwt_service = Arc::new(JwtService::new(&config));
        let form_tokens = Arc::new(FormTokenStore::new());

        Self {
            fixture,
            config,
            app_state,
            directory,
            jwt_service,
            form_tokens,
        }
    }

    pub fn admin_auth(&self) -> AuthSession {
        self.auth_for(ADMIN_EMAIL)
    }

    pub fn viewer_auth(&self) -> AuthSession {
        self.auth_for(VIEWER_EMAIL)
    }

    fn auth_for(&self, email: &str) -> AuthSession {
        let user = self.directory.get(email).expect("known test user").clone();
        let token = self.jwt_service.create_token(&user).expect("jwt token");
        let claims = self.jwt_service.verify_token(&token).expect("jwt claims");
        let cookie = self.jwt_service.create_auth_cookie(&token).into_owned();

        AuthSession {
            user,
            jwt_id: claims.jti,
            cookie,
        }
    }

    /// Mint the form token a rendered page would carry for this session/scope.
    pub fn form_token(&self, session: &AuthSession, scope: &str) -> String {
        self.form_tokens.issue(&session.jwt_id, scope)
    }

    pub fn theme_file_path(&self, name: &str) -> std::path::PathBuf {
        self.fixture.active_theme_dir().join(name)
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
            directory: self.directory.clone(),
            jwt_service: self.jwt_service.clone(),
            form_tokens: self.form_tokens.clone(),
            admin_path: self.config.admin.path.clone(),
        }
    }
}

fn default_registrars() -> Vec<RegistrarFn> {
    // One hook-contributed entry, plus one whose target escapes the theme
    // directory to exercise the fail-closed containment check.
    vec![Box::new(|registry: &mut confedit::registry::FileRegistry| {
        registry.register(
            "hooked",
            "hooked.txt",
            "Hook-contributed file",
            Some("added by a registrar hook".to_string()),
        );
        registry.register("outside", "../../outside.json", "Escaping entry", None);
    })]
}

fn seed_theme_files(fixture: &TestFixtureRoot) {
    let theme_dir = fixture.active_theme_dir();
    fs::write(theme_dir.join("section-config.json"), SEED_SECTION_CONFIG)
        .expect("seed section config");
    fs::write(theme_dir.join("notes.txt"), SEED_NOTES).expect("seed notes");
    fs::write(theme_dir.join("hooked.txt"), "hooked content\n").expect("seed hooked file");
    // Target of the escaping registry entry, outside the theme sandbox.
    fs::write(fixture.path().join("outside.json"), "{\"secret\": true}")
        .expect("seed outside file");
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let admin_path = bundle.admin_path;
    let config_for_admin = bundle.config.clone();

    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .app_data(web::Data::from(bundle.directory))
        .app_data(web::Data::from(bundle.jwt_service))
        .app_data(web::Data::from(bundle.form_tokens))
        .wrap(JwtAuthMiddlewareFactory)
        .configure(move |cfg| admin::configure(cfg, &admin_path, &config_for_admin))
        .configure(public::configure)
}

pub fn add_auth_cookie(
    req: actix_web::test::TestRequest,
    session: &AuthSession,
) -> actix_web::test::TestRequest {
    req.cookie(session.cookie.clone())
}

pub async fn body_text(resp: ServiceResponse) -> String {
    let bytes = actix_web::test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
