//! Share data model shared by the lifecycle manager and API implementations.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// File-sharing protocol exposed by a share.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShareProtocol {
    /// Network File System.
    Nfs,
    /// Common Internet File System (SMB).
    Cifs,
}

impl ShareProtocol {
    /// Returns the protocol name in the form the remote API expects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nfs => "NFS",
            Self::Cifs => "CIFS",
        }
    }
}

impl fmt::Display for ShareProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareProtocol {
    type Err = ShareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NFS" => Ok(Self::Nfs),
            "CIFS" => Ok(Self::Cifs),
            _ => Err(ShareError::UnsupportedProtocol(value.trim().to_owned())),
        }
    }
}

/// Status reported by the remote API for a share.
///
/// The manager never derives a status locally; every value comes from a
/// fresh read. Statuses the API may add later are preserved verbatim in
/// [`ShareStatus::Other`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ShareStatus {
    /// Provisioning has been accepted and is in progress.
    Creating,
    /// The share is ready to mount.
    Available,
    /// A resize is in progress.
    Extending,
    /// A resize failed.
    ExtendingError,
    /// A shrink is in progress.
    Shrinking,
    /// A shrink failed.
    ShrinkingError,
    /// Provisioning failed.
    Error,
    /// Deletion is in progress.
    Deleting,
    /// Deletion failed.
    ErrorDeleting,
    /// Any status this crate does not model explicitly.
    Other(String),
}

impl ShareStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Extending => "extending",
            Self::ExtendingError => "extending_error",
            Self::Shrinking => "shrinking",
            Self::ShrinkingError => "shrinking_error",
            Self::Error => "error",
            Self::Deleting => "deleting",
            Self::ErrorDeleting => "error_deleting",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Returns `true` when the remote side reports a failed transition.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Self::Error | Self::ExtendingError | Self::ShrinkingError | Self::ErrorDeleting
        )
    }
}

impl From<&str> for ShareStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "extending" => Self::Extending,
            "extending_error" => Self::ExtendingError,
            "shrinking" => Self::Shrinking,
            "shrinking_error" => Self::ShrinkingError,
            "error" => Self::Error,
            "deleting" => Self::Deleting,
            "error_deleting" => Self::ErrorDeleting,
            _ => Self::Other(value.trim().to_owned()),
        }
    }
}

impl From<String> for ShareStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative record of a share as last reported by the remote API.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Share {
    /// Opaque identifier assigned by the remote API. Never changes.
    pub id: String,
    /// Caller supplied label. Not guaranteed unique.
    pub name: String,
    /// Transport protocol of the share.
    pub protocol: ShareProtocol,
    /// Capacity in gibibytes.
    pub size_gib: u32,
    /// Current status.
    pub status: ShareStatus,
    /// Provenance tag written at creation time.
    pub description: Option<String>,
    /// Availability zone hosting the share.
    pub availability_zone: Option<String>,
    /// Owning project.
    pub project_id: Option<String>,
    /// First export location (mount path) once the share is available.
    pub export_location: Option<String>,
    /// Creation timestamp as reported by the API.
    pub created_at: Option<String>,
}

/// Desired shape of a new share.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShareSpec {
    /// Human readable label.
    pub name: String,
    /// Protocol to expose the share over.
    pub protocol: ShareProtocol,
    /// Requested capacity in gibibytes. Must be positive.
    pub size_gib: u32,
    /// Optional description. The manager substitutes its ownership tag when
    /// this is `None`.
    pub description: Option<String>,
}

impl ShareSpec {
    /// Starts a builder for a [`ShareSpec`].
    #[must_use]
    pub fn builder() -> ShareSpecBuilder {
        ShareSpecBuilder::new()
    }

    /// Validates the request shape before any remote call is made.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Validation`] when the size is zero.
    pub fn validate(&self) -> Result<(), ShareError> {
        if self.size_gib == 0 {
            return Err(ShareError::Validation(String::from(
                "size_gib must be a positive integer",
            )));
        }
        Ok(())
    }
}

/// Builder for [`ShareSpec`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShareSpecBuilder {
    name: String,
    protocol: Option<ShareProtocol>,
    size_gib: u32,
    description: Option<String>,
}

impl ShareSpecBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the share name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the protocol.
    #[must_use]
    pub const fn protocol(mut self, value: ShareProtocol) -> Self {
        self.protocol = Some(value);
        self
    }

    /// Sets the size in gibibytes.
    #[must_use]
    pub const fn size_gib(mut self, value: u32) -> Self {
        self.size_gib = value;
        self
    }

    /// Sets an explicit description.
    #[must_use]
    pub fn description(mut self, value: Option<String>) -> Self {
        self.description = value;
        self
    }

    /// Builds and validates the [`ShareSpec`], trimming the name.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Validation`] when the protocol is missing or the
    /// size is zero.
    pub fn build(self) -> Result<ShareSpec, ShareError> {
        let protocol = self
            .protocol
            .ok_or_else(|| ShareError::Validation(String::from("protocol is required")))?;
        let spec = ShareSpec {
            name: self.name.trim().to_owned(),
            protocol,
            size_gib: self.size_gib,
            description: self.description.map(|value| value.trim().to_owned()),
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Errors raised while shaping share requests locally.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ShareError {
    /// Raised when a request field is out of range or missing.
    #[error("{0}")]
    Validation(String),
    /// Raised when a protocol name is not one the remote API supports.
    #[error("unsupported share protocol '{0}' (expected NFS or CIFS)")]
    UnsupportedProtocol(String),
}
