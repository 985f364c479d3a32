use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DataError, DataList, Named};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub name: String,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub is_there_shiny: bool,
}

impl Boss {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: None,
            is_there_shiny: false,
        }
    }

    pub fn with_level(name: &str, level: u8) -> Self {
        Self {
            level: Some(level),
            ..Self::new(name)
        }
    }
}

impl Named for Boss {
    fn name(&self) -> &str {
        &self.name
    }
}

pub type BossList = DataList<Boss>;

/// Object form of a boss entry; unknown keys make the list invalid.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BossEntry {
    name: String,
    level: Option<u8>,
    is_there_shiny: Option<bool>,
}

impl DataList<Boss> {
    /// Parses a boss list, trying JSON first and CSV second.
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        match parse_json(raw) {
            Ok(bosses) => return Ok(Self::new(bosses)),
            Err(e) => log::debug!("Bosses are not JSON: {}", e),
        }

        parse_csv(raw).map(Self::new)
    }
}

/// Accepts a list of names, an object mapping names to levels 1 to 5, or a
/// list of `{name, level?, is_there_shiny?}` objects.
fn parse_json(raw: &str) -> Result<Vec<Boss>, DataError> {
    let data: Value =
        serde_json::from_str(raw).map_err(|e| DataError::InvalidJson(e.to_string()))?;

    match &data {
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .map(Boss::new)
            .collect()),
        Value::Object(map) => map
            .iter()
            .map(|(name, level)| match level.as_u64() {
                Some(level @ 1..=5) => Ok(Boss::with_level(name, level as u8)),
                _ => Err(DataError::InvalidJson(format!(
                    "level of {} must be between 1 and 5",
                    name
                ))),
            })
            .collect(),
        Value::Array(_) => {
            let entries: Vec<BossEntry> = serde_json::from_value(data.clone())
                .map_err(|e| DataError::InvalidJson(e.to_string()))?;
            Ok(entries
                .into_iter()
                .map(|e| Boss {
                    name: e.name,
                    level: e.level,
                    is_there_shiny: e.is_there_shiny.unwrap_or(false),
                })
                .collect())
        }
        _ => Err(DataError::InvalidJson(
            "expected a list or an object of bosses".to_string(),
        )),
    }
}

/// Accepts a header row followed by rows of `name`, `name,level` or
/// `name,level,shiny`.
fn parse_csv(raw: &str) -> Result<Vec<Boss>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let columns = reader
        .headers()
        .map_err(|e| DataError::InvalidCsv(e.to_string()))?
        .len();

    if !(1..=3).contains(&columns) {
        return Err(DataError::InvalidCsv(format!(
            "expected 1 to 3 columns, found {}",
            columns
        )));
    }

    let mut bosses = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DataError::InvalidCsv(e.to_string()))?;
        let name = record.get(0).unwrap_or("");

        let mut boss = Boss::new(name);
        if let Some(level) = record.get(1) {
            boss.level = Some(parse_level(level)?);
        }
        if let Some(shiny) = record.get(2) {
            boss.is_there_shiny = parse_bool(shiny)
                .ok_or_else(|| DataError::InvalidCsv(format!("invalid shiny flag '{}'", shiny)))?;
        }

        bosses.push(boss);
    }

    Ok(bosses)
}

fn parse_level(text: &str) -> Result<u8, DataError> {
    match text.parse::<u8>() {
        Ok(level) if level <= 5 => Ok(level),
        _ => Err(DataError::InvalidCsv(format!("invalid level '{}'", text))),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}
