//! Driving port for recording road segments.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Error, Piste};

/// Road segment write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PistesCommand: Send + Sync {
    /// Create a segment from a payload carrying `geom`, an optional `srid`
    /// and survey attributes. Returns the stored geometry.
    async fn create(&self, payload: Map<String, Value>) -> Result<Piste, Error>;

    /// Update survey attributes; geometry keys are ignored. Returns the
    /// display geometry.
    async fn update(&self, id: i32, payload: Map<String, Value>) -> Result<Piste, Error>;

    /// Delete a segment.
    async fn delete(&self, id: i32) -> Result<(), Error>;
}
