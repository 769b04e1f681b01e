//! Wire representations of SFS share resources.

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, CreateShareRequest};
use crate::share::{Share, ShareProtocol, ShareStatus};

#[derive(Debug, Serialize)]
pub(super) struct CreateShareEnvelope<'a> {
    pub(super) share: CreateShareBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateShareBody<'a> {
    share_proto: &'static str,
    size: u32,
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    availability_zone: Option<&'a str>,
}

impl<'a> From<&'a CreateShareRequest> for CreateShareEnvelope<'a> {
    fn from(request: &'a CreateShareRequest) -> Self {
        Self {
            share: CreateShareBody {
                share_proto: request.protocol.as_str(),
                size: request.size_gib,
                name: request.name.as_str(),
                description: request.description.as_str(),
                availability_zone: request.availability_zone.as_deref(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ExtendEnvelope {
    #[serde(rename = "os-extend")]
    pub(super) extend: ExtendBody,
}

#[derive(Debug, Serialize)]
pub(super) struct ExtendBody {
    pub(super) new_size: u32,
}

impl ExtendEnvelope {
    pub(super) const fn new(new_size: u32) -> Self {
        Self {
            extend: ExtendBody { new_size },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ShareEnvelope {
    pub(super) share: WireShare,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShareListEnvelope {
    #[serde(default)]
    pub(super) shares: Vec<WireShare>,
}

/// Share as serialised by the SFS API. Only fields the manager reads are
/// declared; everything else is ignored.
#[derive(Debug, Deserialize)]
pub(super) struct WireShare {
    id: String,
    #[serde(default)]
    name: Option<String>,
    share_proto: String,
    size: u32,
    status: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    availability_zone: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    export_location: Option<String>,
    #[serde(default)]
    export_locations: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<WireShare> for Share {
    type Error = ApiError;

    fn try_from(wire: WireShare) -> Result<Self, Self::Error> {
        let protocol: ShareProtocol = wire.share_proto.parse().map_err(|err| ApiError::Decode {
            message: format!("share {}: {err}", wire.id),
        })?;
        let export_location = wire
            .export_location
            .filter(|location| !location.is_empty())
            .or_else(|| wire.export_locations.into_iter().next());
        Ok(Self {
            id: wire.id,
            name: wire.name.unwrap_or_default(),
            protocol,
            size_gib: wire.size,
            status: ShareStatus::from(wire.status),
            description: wire.description,
            availability_zone: wire.availability_zone,
            project_id: wire.project_id,
            export_location,
            created_at: wire.created_at,
        })
    }
}
