//! Lifecycle scripts: the BOSH drain hook and the pre-start script.

use crate::config::models::Properties;
use crate::core::{LOG_DIR, RUN_DIR};

/// The drain script. When draining is disabled it only logs and exits;
/// otherwise it stops accepting new connections, waits out the drain
/// timeout and signals the wrapped process.
pub fn drain(p: &Properties) -> String {
    let mut script = String::from(
        "#!/bin/bash\n\
         \n\
         set -eu\n\
         \n\
         exec 3>&1\n\
         exec 1>> /var/vcap/sys/log/haproxy/drain.log\n\
         exec 2>> /var/vcap/sys/log/haproxy/drain.log\n\
         \n\
         log() {\n\
         \x20 echo \"$(date): $1\"\n\
         }\n\
         \n",
    );

    if !p.drain_enable {
        script.push_str(
            "log 'drain is disabled, exiting'\n\
             echo 0 >&3\n\
             exit 0\n",
        );
        return script;
    }

    script.push_str(&format!("drain_timeout={}\n\n", p.drain_timeout));

    if p.enable_health_check_http {
        script.push_str(&format!(
            "log 'disabling health check listeners'\n\
             echo 'disable frontend health_check_http_url' | socat stdio unix-connect:{RUN_DIR}/stats.sock\n"
        ));
        if !p.expect_proxy_cidrs.is_empty() {
            script.push_str(&format!(
                "echo 'disable frontend health_check_http_url_proxy_protocol' | socat stdio unix-connect:{RUN_DIR}/stats.sock\n"
            ));
        }
        script.push('\n');
    }

    script.push_str(&format!(
        "log \"waiting ${{drain_timeout}}s for connections to drain\"\n\
         sleep \"${{drain_timeout}}\"\n\
         \n\
         if [ -e {RUN_DIR}/pid ]; then\n\
         \x20 log 'signalling haproxy to stop'\n\
         \x20 kill -USR1 \"$(cat {RUN_DIR}/pid)\" || true\n\
         fi\n\
         \n\
         log 'drain complete'\n\
         echo 0 >&3\n\
         exit 0\n"
    ));

    script
}

/// The pre-start script: optional operator hook plus the pinned feature
/// version export consumed by the wrapper.
pub fn pre_start(p: &Properties) -> String {
    let mut script = String::from("#!/bin/bash\n\nset -eu\n\n");

    if let Some(version) = &p.haproxy_feature_version {
        script.push_str(&format!("HAPROXY_FEATURE_VERSION='{version}'\n"));
        script.push_str("export HAPROXY_FEATURE_VERSION\n\n");
    }

    if let Some(custom) = &p.pre_start_script {
        script.push_str("# ha_proxy.pre_start_script {{{\n");
        script.push_str(custom);
        if !custom.ends_with('\n') {
            script.push('\n');
        }
        script.push_str("# }}}\n\n");
    }

    script.push_str(&format!("mkdir -p {LOG_DIR}\nexit 0\n"));
    script
}
