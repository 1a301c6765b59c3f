//! The BPM process descriptor.

use crate::config::models::Properties;

/// Render bpm.yml. Operator-supplied unrestricted volumes are emitted as
/// inline JSON so their key order survives round-tripping.
pub fn render(p: &Properties) -> String {
    let mut unrestricted: Vec<serde_json::Value> = Vec::new();
    if p.syslog_server.starts_with('/') {
        unrestricted.push(serde_json::json!({ "path": p.syslog_server }));
    }
    unrestricted.extend(p.additional_unrestricted_volumes.iter().cloned());
    let unrestricted_json =
        serde_json::to_string(&unrestricted).unwrap_or_else(|_| "[]".to_string());

    format!(
        "processes:\n\
         \x20 - name: haproxy\n\
         \x20   executable: /var/vcap/jobs/haproxy/bin/haproxy_wrapper\n\
         \x20   additional_volumes:\n\
         \x20     - path: /var/vcap/jobs/haproxy/config/cidrs\n\
         \x20       writable: true\n\
         \x20     - path: /var/vcap/jobs/haproxy/config/ssl\n\
         \x20       writable: true\n\
         \x20     - path: /var/vcap/sys/run/haproxy\n\
         \x20       writable: true\n\
         \n\
         \x20   unsafe:\n\
         \x20     unrestricted_volumes: {unrestricted_json}\n\
         \n\
         \x20   limits:\n\
         \x20     open_files: {max_open_files}\n\
         \x20   capabilities:\n\
         \x20     - NET_BIND_SERVICE\n",
        max_open_files = p.max_open_files,
    )
}
