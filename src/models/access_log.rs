//! Access log models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::file_access;

/// Kind of access recorded for a shared file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Visit,
    Download,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visit => "visit",
            Self::Download => "download",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visit" => Some(Self::Visit),
            "download" => Some(Self::Download),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One access log row as returned by stats and admin log endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessLogView {
    pub access_type: String,
    pub ip_address: String,
    pub user_agent: String,
    pub country: String,
    pub city: String,
    pub access_time: DateTime<Utc>,
}

impl From<file_access::Model> for AccessLogView {
    fn from(m: file_access::Model) -> Self {
        Self {
            access_type: m.access_type,
            ip_address: m.ip_address,
            user_agent: m.user_agent,
            country: m.country,
            city: m.city,
            access_time: m.access_time,
        }
    }
}
