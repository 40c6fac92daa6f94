use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;
use crate::shared::constants::{COLLECTION_PENDING, COLLECTION_REVIEWED, COLLECTION_SAMPLE};

/// The closed set of location collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Collection {
    #[serde(rename = "sample_data")]
    Sample,
    #[serde(rename = "pending_data")]
    Pending,
    #[serde(rename = "reviewed_data")]
    Reviewed,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Sample, Collection::Pending, Collection::Reviewed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Sample => COLLECTION_SAMPLE,
            Collection::Pending => COLLECTION_PENDING,
            Collection::Reviewed => COLLECTION_REVIEWED,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown collection '{}'", s)))
    }
}
