//! CIDR list files. Each file keeps its historical header and footer
//! format, so rendered output stays diffable against older deploys.

use crate::config::models::{CidrList, Properties};

/// `# BEGIN`/`# END` framed list with the cleartext-array marker comment.
fn framed_list(source: &str, label: &str, list: &CidrList) -> String {
    if list.is_empty() && list.decoded.is_none() {
        return String::new();
    }
    let detected = if list.from_array {
        "# detected cidrs provided as array in cleartext format\n"
    } else {
        ""
    };
    format!(
        "# generated from {source}\n\n# BEGIN {label}\n{detected}{}\n# END {label}\n\n",
        list.body()
    )
}

pub fn whitelist(p: &Properties) -> String {
    framed_list("whitelist_cidrs.txt.erb", "whitelist cidrs", &p.cidr_whitelist)
}

pub fn blacklist(p: &Properties) -> String {
    framed_list("blacklist_cidrs.txt.erb", "blacklist cidrs", &p.cidr_blacklist)
}

pub fn exclude_from_blocking(p: &Properties) -> String {
    let list = match &p.connections_rate_limit {
        Some(limit) => &limit.cidrs_to_exclude,
        None => return String::new(),
    };
    framed_list(
        "cidrs_to_exclude_from_blocking.txt.erb",
        "cidrs to exclude from tcp rejection because of connection rate limiting",
        list,
    )
}

pub fn trusted_domain(p: &Properties) -> String {
    framed_list(
        "trusted_domain_cidrs.txt.erb",
        "trusted_domain cidrs",
        &p.trusted_domain_cidrs,
    )
}

/// Flat list consumed by the `expect-proxy` frontend rule. No
/// array marker, no blank line before the footer.
pub fn expect_proxy(p: &Properties) -> String {
    let list = if !p.expect_proxy_cidrs.is_empty() || p.expect_proxy_cidrs.decoded.is_some() {
        &p.expect_proxy_cidrs
    } else if !p.expect_proxy.is_empty() || p.expect_proxy.decoded.is_some() {
        &p.expect_proxy
    } else {
        return String::new();
    };
    format!(
        "# generated from expect_proxy_cidrs.txt.erb\n\n# BEGIN expect_proxy_cidrs\n{}# END expect_proxy_cidrs\n",
        list.body()
    )
}

/// Audit copy of `expect_proxy`, entries indented two spaces.
pub fn proxies(p: &Properties) -> String {
    let list = &p.expect_proxy;
    if list.is_empty() && list.decoded.is_none() {
        return String::new();
    }
    let detected = if list.from_array {
        "# detected cidrs provided as array in cleartext format\n"
    } else {
        ""
    };
    let mut body = String::new();
    for line in list.body().lines() {
        body.push_str("  ");
        body.push_str(line);
        body.push('\n');
    }
    format!(
        "# generated from proxies_cidrs.txt.erb\n\n# BEGIN proxies cidrs\n{detected}{body}# END proxies cidrs\n\n"
    )
}

/// Rendered even when empty; the wrapper script always mounts it.
pub fn blocklist_tcp(p: &Properties) -> String {
    format!(
        "# generated from blocklist_cidrs_tcp.txt.erb\n\n# This list contains CIDRs that are blocked immediately after TCP connection setup.\n{}\n",
        p.cidr_blocklist_tcp.body()
    )
}
