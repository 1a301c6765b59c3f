use crate::config::models::{BackendSsl, DomainFronting, Properties};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Conflicting configuration: {message}")]
    Conflict { message: String },

    #[error(
        "Conflicting configuration. Please configure '{property}' either globally OR in 'crt_list' entries, but not both"
    )]
    CrtListOverlap { property: String },

    #[error("Unknown 'disable_domain_fronting' option: {value}. Known options: true, false or 'mtls_only'")]
    UnknownDomainFrontingOption { value: String },

    #[error("ha_proxy.syslog_server cannot be stdout or stderr when ha_proxy.nbproc > 1")]
    SyslogProcessCount,

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

impl ValidationError {
    fn conflict(message: &str) -> Self {
        ValidationError::Conflict {
            message: message.to_string(),
        }
    }
}

/// Property bag validator
pub struct PropertiesValidator;

impl PropertiesValidator {
    /// Validate the entire property bag
    pub fn validate(properties: &Properties) -> ValidationResult<()> {
        let mut errors = Vec::new();

        Self::validate_proxy_protocol(properties, &mut errors);
        Self::validate_client_cert(properties, &mut errors);
        Self::validate_backend_ssl(properties, &mut errors);
        Self::validate_drain(properties, &mut errors);
        Self::validate_hsts(properties, &mut errors);
        Self::validate_domain_fronting(properties, &mut errors);
        Self::validate_syslog(properties, &mut errors);
        Self::validate_crt_list(properties, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    fn validate_proxy_protocol(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if properties.accept_proxy && !properties.expect_proxy.is_empty() {
            errors.push(ValidationError::conflict(
                "accept_proxy and expect_proxy are mutually exclusive",
            ));
        }
    }

    fn validate_client_cert(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if !properties.client_cert {
            if properties.client_cert_ignore_err.is_some() {
                errors.push(ValidationError::conflict(
                    "must enable client_cert to use client_cert_ignore_err",
                ));
            }
            if properties.client_revocation_list.is_some() {
                errors.push(ValidationError::conflict(
                    "must enable client_cert to use client_revocation_list",
                ));
            }
        }
    }

    fn validate_backend_ssl(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if properties.backend_ssl_verifyhost.is_some()
            && properties.backend_ssl != BackendSsl::Verify
        {
            errors.push(ValidationError::conflict(
                "backend_ssl must be 'verify' to use backend_ssl_verifyhost",
            ));
        }

        for (_, routed) in &properties.routed_backend_servers {
            if routed.backend_verifyhost.is_some() && routed.backend_ssl != BackendSsl::Verify {
                errors.push(ValidationError::conflict(
                    "backend_ssl must be 'verify' to use backend_verifyhost in routed_backend_servers",
                ));
            }
        }

        for tcp in &properties.tcp {
            if tcp.backend_verifyhost.is_some() && tcp.backend_ssl != BackendSsl::Verify {
                errors.push(ValidationError::conflict(
                    "backend_ssl must be 'verify' to use backend_verifyhost in tcp backend configuration",
                ));
            }
        }
    }

    fn validate_drain(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if properties.drain_frontend_grace_time.is_some() && !properties.drain_enable {
            errors.push(ValidationError::conflict(
                "drain_enable must be true to use drain_frontend_grace_time",
            ));
        }
    }

    fn validate_hsts(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if !properties.hsts_enable {
            if properties.hsts_include_subdomains {
                errors.push(ValidationError::conflict(
                    "hsts_enable must be true to use hsts_include_subdomains",
                ));
            }
            if properties.hsts_preload {
                errors.push(ValidationError::conflict(
                    "hsts_enable must be true to enable hsts_preload",
                ));
            }
        }
    }

    fn validate_domain_fronting(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if let DomainFronting::Invalid(value) = &properties.disable_domain_fronting {
            errors.push(ValidationError::UnknownDomainFrontingOption {
                value: value.clone(),
            });
        }
    }

    fn validate_syslog(properties: &Properties, errors: &mut Vec<ValidationError>) {
        if properties.nbproc > 1
            && matches!(properties.syslog_server.as_str(), "stdout" | "stderr")
        {
            errors.push(ValidationError::SyslogProcessCount);
        }
    }

    fn validate_crt_list(properties: &Properties, errors: &mut Vec<ValidationError>) {
        let entries = match &properties.crt_list {
            Some(entries) => entries,
            None => return,
        };

        if properties.client_ca_file.is_some()
            && entries.iter().any(|e| e.client_ca_file.is_some())
        {
            errors.push(ValidationError::CrtListOverlap {
                property: "client_ca_file".to_string(),
            });
        }
        if properties.client_revocation_list.is_some()
            && entries.iter().any(|e| e.client_revocation_list.is_some())
        {
            errors.push(ValidationError::CrtListOverlap {
                property: "client_revocation_list".to_string(),
            });
        }
    }

    /// Format multiple validation errors into a single message
    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.is_empty() {
            return "No errors".to_string();
        }

        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}
