// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use confedit::admin;
use confedit::app_state::AppState;
use confedit::config::{Config, ValidatedConfig};
use confedit::iam::{JwtAuthMiddlewareFactory, JwtService, UserDirectory};
use confedit::public;
use confedit::runtime_paths::RuntimePaths;
use confedit::util::FormTokenStore;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

struct ParsedArgs {
    runtime_root: PathBuf,
    show_help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    let mut runtime_root = PathBuf::from(".");
    let mut show_help = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-C" => {
                let value = args
                    .next()
                    .ok_or_else(|| "-C requires a directory argument".to_string())?;
                runtime_root = PathBuf::from(value);
            }
            "-h" | "--help" => show_help = true,
            other => return Err(format!("Unknown argument '{}'", other)),
        }
    }

    Ok(ParsedArgs {
        runtime_root,
        show_help,
    })
}

fn help_text() -> &'static str {
    "confedit - configuration file editor for the active theme directory\n\
     \n\
     Usage: confedit [-C <root>]\n\
     \n\
     Options:\n\
     \x20 -C <root>   Runtime directory containing config.yaml, users.yaml and themes/\n\
     \x20 -h, --help  Show this help\n"
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if parsed_args.show_help {
        print!("{}", help_text());
        return 0;
    }

    let validated_config = match Config::load_and_validate(&parsed_args.runtime_root) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Configuration error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    init_logger(&validated_config);

    let runtime_paths = match RuntimePaths::from_root(&parsed_args.runtime_root, &validated_config)
    {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("❌ Runtime layout error: {}", error);
            return 1;
        }
    };

    let directory = if runtime_paths.users_file.is_file() {
        match UserDirectory::load(&runtime_paths.users_file) {
            Ok(directory) => directory,
            Err(error) => {
                eprintln!("❌ {}", error);
                return 1;
            }
        }
    } else {
        log::warn!(
            "Users file '{}' not found; starting with an empty user directory",
            runtime_paths.users_file.display()
        );
        UserDirectory::default()
    };

    let validated_config = Arc::new(validated_config);
    let app_state = Arc::new(AppState::new(
        &validated_config,
        runtime_paths.clone(),
        &[],
    ));
    let directory = Arc::new(directory);
    let jwt_service = Arc::new(JwtService::new(&validated_config));
    let form_tokens = Arc::new(FormTokenStore::new());

    info!(
        "Starting {} on {}:{}",
        validated_config.app.name, validated_config.server.host, validated_config.server.port
    );
    info!(
        "Active theme directory: {}",
        runtime_paths.active_theme_dir.display()
    );
    info!(
        "{} registered configuration file(s)",
        app_state.registry.len()
    );

    let result = System::new().block_on(serve(
        validated_config,
        app_state,
        directory,
        jwt_service,
        form_tokens,
    ));

    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server error: {}", error);
            1
        }
    }
}

fn init_logger(config: &ValidatedConfig) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.clone());
    env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .init();
}

async fn serve(
    config: Arc<ValidatedConfig>,
    app_state: Arc<AppState>,
    directory: Arc<UserDirectory>,
    jwt_service: Arc<JwtService>,
    form_tokens: Arc<FormTokenStore>,
) -> std::io::Result<()> {
    let workers = config.server.workers.max(1);
    let bind_address = (config.server.host.clone(), config.server.port);

    let factory = {
        let config = config.clone();
        move || {
            let admin_path = config.admin.path.clone();
            let config_for_admin = config.clone();

            App::new()
                .app_data(web::Data::from(config.clone()))
                .app_data(web::Data::from(app_state.clone()))
                .app_data(web::Data::from(directory.clone()))
                .app_data(web::Data::from(jwt_service.clone()))
                .app_data(web::Data::from(form_tokens.clone()))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .wrap(JwtAuthMiddlewareFactory)
                .configure(move |cfg| admin::configure(cfg, &admin_path, &config_for_admin))
                .configure(public::configure)
        }
    };

    HttpServer::new(factory)
        .workers(workers)
        .bind(bind_address)?
        .run()
        .await
}
