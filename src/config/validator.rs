//! Validation of the values a deploy is about to send to the host.
//!
//! Everything here runs before any connection is opened, so a rejected
//! deploy leaves no remote state behind.

use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::manifest::PORT_RANGE;

/// Deploy parameters after explicit arguments have been merged with the
/// manifest, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget<'a> {
    /// Resolved domain name.
    pub domain_name: Option<&'a str>,
    /// Resolved container image.
    pub image: Option<&'a str>,
    /// Resolved container port.
    pub container_port: u16,
}

/// Deploy parameters that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget<'a> {
    /// Domain name, trimmed.
    pub domain_name: &'a str,
    /// Container image, trimmed.
    pub image: &'a str,
    /// Container port inside [`PORT_RANGE`].
    pub container_port: u16,
    /// Non-fatal issues.
    pub warnings: Vec<String>,
}

/// Validator for deploy parameters.
#[derive(Debug, Default)]
pub struct DeployValidator;

impl DeployValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates resolved deploy parameters.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found, checking domain, image and
    /// port in that order.
    pub fn validate<'a>(&self, target: &DeployTarget<'a>) -> Result<ValidatedTarget<'a>> {
        let mut warnings = Vec::new();

        let checked = (
            Self::check_domain(target.domain_name),
            Self::check_image(target.image, &mut warnings),
            Self::check_port(target.container_port),
        );

        match checked {
            (Ok(domain_name), Ok(image), Ok(container_port)) => {
                for warning in &warnings {
                    debug!("Deploy validation warning: {warning}");
                }
                debug!("Deploy validation passed");
                Ok(ValidatedTarget {
                    domain_name,
                    image,
                    container_port,
                    warnings,
                })
            }
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => Err(e.into()),
        }
    }

    /// Checks an explicitly requested container port.
    ///
    /// # Errors
    ///
    /// Returns `PortOutOfRange` if the port is outside `[1024, 49151)`.
    pub fn check_port(port: u16) -> std::result::Result<u16, ValidationError> {
        if PORT_RANGE.contains(&port) {
            Ok(port)
        } else {
            Err(ValidationError::PortOutOfRange { port })
        }
    }

    /// Checks a service name before it is written into a new manifest.
    ///
    /// The name becomes part of a remote file name, so it must be non-empty
    /// and free of whitespace and path separators. Case and punctuation are
    /// otherwise left alone.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty or unusable as a file name.
    pub fn check_service_name(name: &str) -> std::result::Result<(), ValidationError> {
        if name.is_empty() {
            Err(ValidationError::missing("service_name"))
        } else if name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\')
        {
            Err(ValidationError::invalid(
                "service_name",
                format!("'{name}' must not contain whitespace or path separators"),
            ))
        } else {
            Ok(())
        }
    }

    fn check_domain(domain: Option<&str>) -> std::result::Result<&str, ValidationError> {
        match domain.map(str::trim) {
            None | Some("") => Err(ValidationError::missing("domain_name")),
            Some(d) if d.chars().any(char::is_whitespace) || d.contains('/') => Err(
                ValidationError::invalid("domain_name", format!("'{d}' is not a bare domain name")),
            ),
            Some(d) => Ok(d),
        }
    }

    fn check_image<'a>(
        image: Option<&'a str>,
        warnings: &mut Vec<String>,
    ) -> std::result::Result<&'a str, ValidationError> {
        match image.map(str::trim) {
            None | Some("") => Err(ValidationError::missing("image")),
            Some(i) if i.chars().any(char::is_whitespace) => Err(ValidationError::invalid(
                "image",
                format!("'{i}' contains whitespace"),
            )),
            Some(i) => {
                if i.ends_with(":latest") || !i.contains(':') {
                    warnings.push(format!(
                        "image: '{i}' is not pinned to a tag; redeploys may pull a different image"
                    ));
                }
                Ok(i)
            }
        }
    }
}

impl ValidatedTarget<'_> {
    /// Returns the number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}
