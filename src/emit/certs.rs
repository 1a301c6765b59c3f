//! Certificate material: the certs.ttar archive with the SSL directory
//! contents, plus the small standalone PEM files.

use crate::config::models::{CrtListEntry, Properties};
use crate::core::SSL_DIR;

const TTAR_MARKER: &str = "==========================";

/// `\n{content}\n\n`, or empty when the property is unset. Used for the
/// standalone PEM files next to the config.
pub fn pem_file(content: Option<&str>) -> String {
    match content {
        Some(content) => format!("\n{content}\n\n"),
        None => String::new(),
    }
}

/// The certs.ttar archive: every certificate under `{SSL_DIR}` as one
/// 0600 entry, with the crt-list file last when `crt_list` is in use.
pub fn certs_ttar(p: &Properties) -> String {
    let mut out = String::new();

    match (&p.crt_list, &p.ssl_pem) {
        (Some(entries), _) => {
            for (i, entry) in entries.iter().enumerate() {
                if let Some(pem) = &entry.ssl_pem {
                    push_entry(&mut out, &format!("{SSL_DIR}/cert-{i}.pem"), &pem.pem_text());
                }
                if let Some(ca) = &entry.client_ca_file {
                    push_entry(&mut out, &format!("{SSL_DIR}/ca-file-{i}.pem"), ca);
                }
                if let Some(crl) = &entry.client_revocation_list {
                    push_entry(&mut out, &format!("{SSL_DIR}/crl-file-{i}.pem"), crl);
                }
            }
            out.push_str(&format!("{TTAR_MARKER} 0600 {SSL_DIR}/crt-list\n"));
            out.push_str(&crt_list_body(entries, p.ext_crt_list));
        }
        (None, Some(ssl_pem)) => {
            for (i, entry) in ssl_pem.0.iter().enumerate() {
                push_entry(&mut out, &format!("{SSL_DIR}/cert-{i}.pem"), &entry.pem_text());
            }
            if !out.is_empty() {
                out.push('\n');
            }
        }
        (None, None) => {}
    }

    out
}

fn push_entry(out: &mut String, path: &str, content: &str) {
    out.push_str(&format!("{TTAR_MARKER} 0600 {path}\n\n{content}\n\n"));
}

fn crt_list_body(entries: &[CrtListEntry], ext_crt_list: bool) -> String {
    let mut body = String::from("\n");
    for (i, entry) in entries.iter().enumerate() {
        body.push_str(&crt_list_line(entry, i));
        body.push('\n');
    }
    body.push('\n');
    if ext_crt_list {
        body.push_str("#OPTIONAL_EXT_CERTS\n\n");
    } else {
        body.push('\n');
    }
    body
}

/// One crt-list line: the cert path, bracketed bind options in a fixed
/// order, then any SNI filters.
fn crt_list_line(entry: &CrtListEntry, index: usize) -> String {
    let mut line = format!("{SSL_DIR}/cert-{index}.pem");

    let mut options: Vec<String> = Vec::new();
    if entry.client_ca_file.is_some() {
        options.push(format!("ca-file {SSL_DIR}/ca-file-{index}.pem"));
    }
    if entry.client_revocation_list.is_some() {
        options.push(format!("crl-file {SSL_DIR}/crl-file-{index}.pem"));
    }
    if let Some(verify) = &entry.verify {
        options.push(format!("verify {verify}"));
    }
    if let Some(version) = &entry.ssl_min_version {
        options.push(format!("ssl-min-ver {version}"));
    }
    if let Some(version) = &entry.ssl_max_version {
        options.push(format!("ssl-max-ver {version}"));
    }
    if let Some(ciphers) = &entry.ssl_ciphers {
        options.push(format!("ciphers {ciphers}"));
    }
    if let Some(suites) = &entry.ssl_ciphersuites {
        options.push(format!("ciphersuites {suites}"));
    }
    if !options.is_empty() {
        line.push_str(&format!(" [{}]", options.join(" ")));
    }

    if let Some(filters) = &entry.snifilter {
        for filter in filters {
            line.push(' ');
            line.push_str(filter);
        }
    }

    line
}
