use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogError};
use crate::domain::outfit::{OutfitFields, OutfitRecord};

pub const REQUIRED_COLUMNS: [&str; 8] =
    ["weather", "min_temp", "max_temp", "gender", "activity", "season", "formality", "suggestion"];

#[derive(Debug, Deserialize, Serialize)]
struct CatalogRow {
    weather: String,
    min_temp: f64,
    max_temp: f64,
    gender: String,
    activity: String,
    season: String,
    formality: String,
    suggestion: String,
}

impl From<CatalogRow> for OutfitFields {
    fn from(row: CatalogRow) -> Self {
        Self {
            weather: row.weather,
            min_temp: row.min_temp,
            max_temp: row.max_temp,
            gender: row.gender,
            activity: row.activity,
            season: row.season,
            formality: row.formality,
            suggestion: row.suggestion,
        }
    }
}

impl From<&OutfitRecord> for CatalogRow {
    fn from(record: &OutfitRecord) -> Self {
        Self {
            weather: record.weather().to_owned(),
            min_temp: record.min_temp(),
            max_temp: record.max_temp(),
            gender: record.gender().to_string(),
            activity: record.activity().to_owned(),
            season: record.season().to_string(),
            formality: record.formality().to_owned(),
            suggestion: record.suggestion().to_owned(),
        }
    }
}

impl Catalog {
    /// Parses CSV with a header row. Cells are whitespace-trimmed, column order
    /// is free and unknown columns are ignored. The first bad row aborts the load.
    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers =
            reader.headers().map_err(|source| CatalogError::Malformed { line: 1, source })?.clone();
        check_columns(&headers)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|source| CatalogError::Malformed {
                line: source.position().map(|position| position.line()).unwrap_or_default(),
                source,
            })?;
            let line = row.position().map(|position| position.line()).unwrap_or_default();

            let parsed: CatalogRow = row
                .deserialize(Some(&headers))
                .map_err(|source| CatalogError::Malformed { line, source })?;
            let record = OutfitRecord::new(parsed.into())
                .map_err(|source| CatalogError::InvalidRow { line, source })?;
            records.push(record);
        }

        Ok(Self::new(records))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_reader(file)
    }

    pub fn write_csv(&self, writer: impl Write) -> Result<(), CatalogError> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        for record in &self.records {
            writer.serialize(CatalogRow::from(record)).map_err(CatalogError::Encode)?;
        }
        writer.flush().map_err(|source| CatalogError::Encode(source.into()))?;
        Ok(())
    }

    /// Writes the catalog as CSV, creating parent directories as needed.
    pub fn write_to_path(&self, path: &Path) -> Result<(), CatalogError> {
        let write_error =
            |source: std::io::Error| CatalogError::WriteFile { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let file = File::create(path).map_err(write_error)?;
        self.write_csv(file)
    }
}

fn check_columns(headers: &StringRecord) -> Result<(), CatalogError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(CatalogError::MissingColumn { column });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::outfit::Gender;
    use crate::domain::season::Season;
    use crate::errors::DomainError;

    const HEADER: &str = "weather,min_temp,max_temp,gender,activity,season,formality,suggestion\n";

    #[test]
    fn parses_rows_and_trims_cells() {
        let data = format!(
            "{HEADER}  Rain , 5 , 15 , unisex ,casual, autumn , smart casual ,  Raincoat and boots.  \n"
        );

        let catalog = Catalog::from_reader(data.as_bytes()).expect("catalog should parse");

        assert_eq!(catalog.len(), 1);
        let record = &catalog.records()[0];
        assert_eq!(record.weather(), "Rain");
        assert_eq!(record.min_temp(), 5.0);
        assert_eq!(record.gender(), Gender::Unisex);
        assert_eq!(record.season(), Season::Autumn);
        assert_eq!(record.formality(), "smart casual");
        assert_eq!(record.suggestion(), "Raincoat and boots.");
    }

    #[test]
    fn column_order_is_free_and_extra_columns_are_ignored() {
        let data = "suggestion,season,notes,weather,max_temp,min_temp,gender,activity,formality\n\
                    Gloves,winter,ignored,Snow,0,-10,female,casual,casual\n";

        let catalog = Catalog::from_reader(data.as_bytes()).expect("catalog should parse");

        assert_eq!(catalog.records()[0].suggestion(), "Gloves");
        assert_eq!(catalog.records()[0].min_temp(), -10.0);
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let data = "weather,max_temp,gender,activity,season,formality,suggestion\n";

        let error = Catalog::from_reader(data.as_bytes()).expect_err("min_temp is required");

        assert!(matches!(error, CatalogError::MissingColumn { column: "min_temp" }));
    }

    #[test]
    fn inverted_range_reports_line_number() {
        let data = format!(
            "{HEADER}Clear,10,20,unisex,travel,spring,casual,Jacket\nClear,30,20,unisex,travel,summer,casual,Shorts\n"
        );

        let error = Catalog::from_reader(data.as_bytes()).expect_err("row 3 is inverted");

        assert!(matches!(
            error,
            CatalogError::InvalidRow {
                line: 3,
                source: DomainError::InvalidTemperatureRange { .. }
            }
        ));
    }

    #[test]
    fn blank_temperature_is_malformed() {
        let data = format!("{HEADER}Clear,,20,unisex,travel,spring,casual,Jacket\n");

        let error = Catalog::from_reader(data.as_bytes()).expect_err("blank min_temp");

        assert!(matches!(error, CatalogError::Malformed { line: 2, .. }));
    }

    #[test]
    fn header_only_catalog_is_empty() {
        let catalog = Catalog::from_reader(HEADER.as_bytes()).expect("header-only parses");

        assert!(catalog.is_empty());
    }

    #[test]
    fn written_catalog_loads_back_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("data").join("outfits.csv");

        let sample = Catalog::sample().expect("sample seeds are valid");
        sample.write_to_path(&path).expect("sample should be written");
        let loaded = Catalog::from_path(&path).expect("written sample should load");

        assert_eq!(loaded, sample);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("absent.csv");

        let error = Catalog::from_path(&path).expect_err("file does not exist");

        assert!(matches!(error, CatalogError::ReadFile { ref path, .. } if path.ends_with("absent.csv")));
    }
}
