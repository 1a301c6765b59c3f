//! The ssl_redirect.map lookup file consumed by the plain HTTP frontend.

use crate::config::models::Properties;

pub fn render(p: &Properties) -> String {
    let mut out = String::new();
    for domain in &p.https_redirect_domains {
        out.push_str(&format!("\n{domain}\ttrue\n"));
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
