//! Driving port for recording infrastructure features.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Error, Feature, FeatureKind};

/// Feature write use-cases, generic over the subtype schema.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeaturesCommand: Send + Sync {
    /// Create a feature from raw coordinates and attributes.
    async fn create(&self, kind: FeatureKind, payload: Map<String, Value>)
    -> Result<Feature, Error>;

    /// Apply a partial update.
    async fn update(
        &self,
        kind: FeatureKind,
        id: i32,
        payload: Map<String, Value>,
    ) -> Result<Feature, Error>;

    /// Delete a feature.
    async fn delete(&self, kind: FeatureKind, id: i32) -> Result<(), Error>;
}
