// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::HttpResponse;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

pub fn generate_csp_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn strict_csp(nonce: &str) -> String {
    format!(
        "default-src 'self'; img-src 'self' data:; style-src 'self' 'nonce-{}' https://cdn.jsdelivr.net; script-src 'self' 'nonce-{}'; object-src 'none'; frame-ancestors 'self'; base-uri 'self'; form-action 'self';",
        nonce, nonce
    )
}

/// Build an HTML page response carrying the strict CSP for the given nonce.
pub fn html_page_response(html: String, csp_nonce: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header(("Content-Security-Policy", strict_csp(csp_nonce)))
        .insert_header(("X-Content-Type-Options", "nosniff"))
        .insert_header(("Referrer-Policy", "same-origin"))
        .body(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_unique_and_url_safe() {
        let a = generate_csp_nonce();
        let b = generate_csp_nonce();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_page_response_carries_csp() {
        let nonce = generate_csp_nonce();
        let response = html_page_response("<html></html>".to_string(), &nonce);
        let csp = response
            .headers()
            .get("Content-Security-Policy")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains(&format!("'nonce-{}'", nonce)));
        assert!(csp.contains("frame-ancestors 'self'"));
    }
}
