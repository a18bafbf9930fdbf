//! Shared validation helpers for inbound HTTP adapters.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};

use crate::domain::{AdminFilter, Error, FeatureKind, Presence};

/// Administrative scope query parameters shared by the survey listings.
///
/// ```text
/// GET /api/pistes?communes_rurales_id=3
/// GET /api/ponts?region_id=1&code_piste=12
/// ```
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeParams {
    /// Restrict to one commune.
    pub communes_rurales_id: Option<i32>,
    /// Restrict to communes of one prefecture.
    pub prefecture_id: Option<i32>,
    /// Restrict to communes of one region.
    pub region_id: Option<i32>,
}

impl From<ScopeParams> for AdminFilter {
    fn from(params: ScopeParams) -> Self {
        Self::default()
            .with_commune(params.communes_rurales_id)
            .with_prefecture(params.prefecture_id)
            .with_region(params.region_id)
    }
}

/// Deserialise a field so that an explicit `null` is told apart from an
/// absent key. Pair with `#[serde(default)]`.
pub(crate) fn presence<'de, D, T>(deserializer: D) -> Result<Presence<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolve a URL slug to a feature subtype; unknown slugs are a missing
/// collection rather than a bad request.
pub(crate) fn parse_feature_kind(slug: &str) -> Result<FeatureKind, Error> {
    slug.parse::<FeatureKind>().map_err(|err| {
        Error::not_found(err.to_string()).with_details(json!({
            "field": "subtype",
            "value": slug,
            "code": "unknown_subtype",
        }))
    })
}

/// Body of a write endpoint that takes a free-form survey record.
pub(crate) fn object_body(value: Value) -> Result<Map<String, Value>, Error> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_request("request body must be a JSON object")
            .with_details(json!({
                "field": "body",
                "code": "invalid_body",
                "found": json_type(&other),
            }))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
