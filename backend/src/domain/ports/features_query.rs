//! Driving port for reading infrastructure features.

use async_trait::async_trait;

use crate::domain::{AdminFilter, Error, Feature, FeatureKind};

/// Filters accepted when listing features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturesListRequest {
    /// Administrative scope, followed through the feature's road segment.
    pub scope: AdminFilter,
    /// Only features on this road segment.
    pub code_piste: Option<i32>,
}

/// Feature read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeaturesQuery: Send + Sync {
    /// Features of `kind` matching `request`, ordered by identifier.
    async fn list(&self, kind: FeatureKind, request: FeaturesListRequest)
    -> Result<Vec<Feature>, Error>;

    /// One feature.
    async fn get(&self, kind: FeatureKind, id: i32) -> Result<Feature, Error>;
}
