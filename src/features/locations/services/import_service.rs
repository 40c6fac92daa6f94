//! One-time seed import from the bootstrap CSV.
//!
//! The CSV comes from several sources with bilingual and synonymous headers.
//! Each canonical field takes the first non-empty value among its header
//! aliases, in the order listed in [`FIELD_SOURCES`].

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::core::error::{AppError, Result};
use crate::features::locations::models::location::{
    coordinate_value, parse_coordinate_lenient, KEY_LATITUDE, KEY_LONGITUDE,
};
use crate::modules::store::{Collection, DocumentStore, Fields};

/// Header aliases per canonical field, highest precedence first
pub const FIELD_SOURCES: [(&str, &[&str]); 16] = [
    ("parcel", &["parcel", "地號", "地段地號"]),
    ("designer", &["designer", "設計人", "建築師"]),
    ("constructionCompany", &["constructionCompany", "營造廠", "承造人"]),
    ("landUseZone", &["landUseZone", "使用分區", "土地使用分區"]),
    ("aboveGroundFloors", &["aboveGroundFloors", "地上層數", "地上樓層"]),
    ("undergroundFloors", &["undergroundFloors", "地下層數", "地下樓層"]),
    ("solarPower", &["solarPower", "太陽光電", "太陽能"]),
    ("universalBathroom", &["universalBathroom", "無障礙廁所", "通用浴廁"]),
    ("universalCommonRoom", &["universalCommonRoom", "通用交誼廳", "無障礙交誼廳"]),
    ("universalElevator", &["universalElevator", "無障礙電梯", "通用電梯"]),
    ("landscapeBalcony", &["landscapeBalcony", "景觀陽台", "景觀陽臺"]),
    ("rainwaterCollection", &["rainwaterCollection", "雨水回收", "雨水貯集"]),
    ("frontGreenEnergy", &["frontGreenEnergy", "前院綠能", "正面綠能"]),
    ("backGreenEnergy", &["backGreenEnergy", "後院綠能", "背面綠能"]),
    (KEY_LATITUDE, &["latitude", "緯度", "lat"]),
    (KEY_LONGITUDE, &["longitude", "經度", "lng", "lon"]),
];

/// What the startup import did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Seed collection already had this many documents
    AlreadySeeded(u64),
    /// No CSV at the configured path
    FileMissing,
    Imported(u64),
}

/// Seeds `sample_data` from the bootstrap CSV when the collection is empty
pub struct SeedImportService {
    store: Arc<dyn DocumentStore>,
    csv_path: PathBuf,
}

impl SeedImportService {
    pub fn new(store: Arc<dyn DocumentStore>, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            csv_path: csv_path.into(),
        }
    }

    /// Import the CSV unless the seed collection already has documents.
    ///
    /// Any malformed row aborts the whole import before anything is written.
    pub async fn import_if_empty(&self) -> Result<ImportOutcome> {
        let existing = self.store.count(Collection::Sample).await?;
        if existing > 0 {
            tracing::info!(
                "Seed collection {} already has {} documents, skipping import",
                Collection::Sample,
                existing
            );
            return Ok(ImportOutcome::AlreadySeeded(existing));
        }

        let Some(bytes) = read_optional(&self.csv_path).await? else {
            tracing::warn!(
                "Seed CSV not found at {}, skipping import",
                self.csv_path.display()
            );
            return Ok(ImportOutcome::FileMissing);
        };

        let records = normalize_csv(bytes.as_slice())?;
        let inserted = self.store.insert_many(Collection::Sample, records).await?;

        tracing::info!(
            "Imported {} seed locations from {}",
            inserted,
            self.csv_path.display()
        );
        Ok(ImportOutcome::Imported(inserted))
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Internal(format!(
            "Failed to read seed CSV {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Parse a headed CSV into canonical location records
pub fn normalize_csv<R: Read>(reader: R) -> Result<Vec<Fields>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Invalid CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row
            .map_err(|e| AppError::Validation(format!("Invalid CSV row {}: {}", index + 1, e)))?;
        let columns: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter())
            .collect();
        records.push(normalize_row(&columns));
    }

    Ok(records)
}

/// Build one canonical record from a header-to-value row
pub fn normalize_row(columns: &HashMap<&str, &str>) -> Fields {
    let mut fields = Fields::new();

    for (field, aliases) in FIELD_SOURCES {
        let value = first_non_empty(columns, aliases);
        if field == KEY_LATITUDE || field == KEY_LONGITUDE {
            let coordinate = parse_coordinate_lenient(value.unwrap_or_default());
            fields.insert(field.to_string(), coordinate_value(coordinate));
        } else {
            fields.insert(
                field.to_string(),
                Value::String(value.unwrap_or_default().to_string()),
            );
        }
    }

    fields
}

fn first_non_empty<'a>(columns: &HashMap<&str, &'a str>, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| columns.get(alias).copied())
        .find(|value| !value.is_empty())
}
