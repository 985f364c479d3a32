use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DataError, DataList, Named};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gym {
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Gym {
    /// A gym known only by name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_position(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

impl Named for Gym {
    fn name(&self) -> &str {
        &self.name
    }
}

pub type GymList = DataList<Gym>;

impl DataList<Gym> {
    /// Parses a JSON document holding, among its top-level values, a list of
    /// objects with `name`, `latitude` and `longitude`. The first such list
    /// is used.
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        let data: Value =
            serde_json::from_str(raw).map_err(|e| DataError::InvalidJson(e.to_string()))?;

        let object = data
            .as_object()
            .ok_or_else(|| DataError::InvalidJson("expected an object".to_string()))?;

        let raw_gyms = object
            .values()
            .filter_map(Value::as_array)
            .find(|list| list.first().is_some_and(looks_like_gym))
            .ok_or_else(|| DataError::InvalidJson("list of gyms not found".to_string()))?;

        let gyms = raw_gyms
            .iter()
            .map(parse_gym)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(gyms))
    }
}

fn looks_like_gym(value: &Value) -> bool {
    value.as_object().is_some_and(|o| {
        o.contains_key("name") && o.contains_key("latitude") && o.contains_key("longitude")
    })
}

fn parse_gym(value: &Value) -> Result<Gym, DataError> {
    let invalid = || DataError::InvalidJson(format!("invalid gym entry: {}", value));

    let name = value.get("name").and_then(Value::as_str).ok_or_else(invalid)?;
    let latitude = value.get("latitude").and_then(Value::as_f64).ok_or_else(invalid)?;
    let longitude = value.get("longitude").and_then(Value::as_f64).ok_or_else(invalid)?;

    Ok(Gym::with_position(name, latitude, longitude))
}
