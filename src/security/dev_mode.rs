// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{DevMode, ValidatedConfig};
use actix_web::HttpRequest;
use log::{debug, warn};
use std::net::IpAddr;

pub fn extract_client_ip(req: &HttpRequest, config: &ValidatedConfig) -> Option<IpAddr> {
    if config.security.use_forwarded_for {
        // Take the first IP from the comma-separated list (leftmost is the original client)
        if let Some(forwarded_for) = req.headers().get("x-forwarded-for") {
            if let Ok(header_value) = forwarded_for.to_str() {
                if let Some(first_ip) = header_value.split(',').next() {
                    if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                        return Some(ip);
                    }
                }
            }
        }

        if let Some(real_ip) = req.headers().get("x-real-ip") {
            if let Ok(header_value) = real_ip.to_str() {
                if let Ok(ip) = header_value.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    req.peer_addr().map(|addr| addr.ip())
}

/// Check if development mode allows bypassing access controls
pub fn is_dev_mode_bypass_allowed(req: &HttpRequest, config: &ValidatedConfig) -> bool {
    if !cfg!(debug_assertions) {
        return false;
    }

    match &config.dev_mode {
        Some(DevMode::Dangerous) => {
            warn!("🚨 DEV MODE: Dangerous mode active - bypassing ALL access controls");
            true
        }
        Some(DevMode::Localhost) => {
            if let Some(client_ip) = extract_client_ip(req, config) {
                let is_localhost = client_ip.is_loopback();
                if is_localhost {
                    debug!(
                        "🔧 DEV MODE: Localhost mode active - bypassing access controls for {}",
                        client_ip
                    );
                }
                is_localhost
            } else {
                false
            }
        }
        None => false, // Normal access controls
    }
}
