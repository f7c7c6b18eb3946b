use crate::dataset::AbmDataset;
use crate::definitions::AbmDefinitions;
use anyhow::anyhow;
use formatx::formatx;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

pub const BUILDING_PERIOD_KEY: &str = "building_period";
pub const BUILDING_STOCK_KEY: &str = "building_stock";
pub const BUILDING_STOCK_STATISTICS_KEY: &str = "building_stock_statistics";
pub const STRUCTURE_STATISTICS_KEY: &str = "structure_statistics";
pub const VENTILATION_AND_FENESTRATION_STATISTICS_KEY: &str =
    "ventilation_and_fenestration_statistics";
pub const BUILDING_SCOPE_KEY: &str = "building_scope";
pub const BUILDING_ARCHETYPE_KEY: &str = "building_archetype";

/// Keys of the data tables, in the order they are exported.
pub const DATA_KEYS: [&str; 5] = [
    BUILDING_PERIOD_KEY,
    BUILDING_STOCK_KEY,
    BUILDING_STOCK_STATISTICS_KEY,
    STRUCTURE_STATISTICS_KEY,
    VENTILATION_AND_FENESTRATION_STATISTICS_KEY,
];

/// Keys of the definition tables, in the order they are exported.
pub const DEFINITION_KEYS: [&str; 2] = [BUILDING_SCOPE_KEY, BUILDING_ARCHETYPE_KEY];

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    /// An output writing each table to a file in `directory_path`, named by substituting the
    /// table key into `file_template` (e.g. "{}.csv").
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key).map_err(|err| {
            anyhow!("Could not apply file template '{}': {err:?}", self.file_template)
        })?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Write rows as a CSV table with a header row under the given key.
pub fn write_table<T: Serialize>(output: &impl Output, key: &str, rows: &[T]) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }
    debug!(key, rows = rows.len(), "Writing table");
    let mut writer = csv::Writer::from_writer(output.writer_for_location_key(key)?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every data and definition table under its key.
pub fn export_tables(
    output: &impl Output,
    dataset: &AbmDataset,
    definitions: &AbmDefinitions,
) -> anyhow::Result<()> {
    write_table(output, BUILDING_PERIOD_KEY, dataset.building_periods())?;
    write_table(output, BUILDING_STOCK_KEY, dataset.building_stocks())?;
    write_table(
        output,
        BUILDING_STOCK_STATISTICS_KEY,
        dataset.building_stock_statistics(),
    )?;
    write_table(output, STRUCTURE_STATISTICS_KEY, dataset.structure_statistics())?;
    write_table(
        output,
        VENTILATION_AND_FENESTRATION_STATISTICS_KEY,
        dataset.ventilation_and_fenestration_statistics(),
    )?;
    write_table(output, BUILDING_SCOPE_KEY, &definitions.building_scopes)?;
    write_table(output, BUILDING_ARCHETYPE_KEY, &definitions.building_archetypes)?;
    info!("Exported data and definition tables");
    Ok(())
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DataSource {
    pub title: String,
    pub path: String,
}

/// Descriptive record of a package of exported tables.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DatapackageMetadata {
    pub name: String,
    pub title: String,
    pub license: String,
    pub sources: Vec<DataSource>,
    pub keywords: Vec<String>,
    pub resources: Vec<String>,
}

impl DatapackageMetadata {
    pub fn new(name: &str, title: &str, license: &str, resources: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            license: license.to_string(),
            sources: vec![],
            keywords: vec![],
            resources: resources.iter().map(|key| key.to_string()).collect(),
        }
    }

    pub fn with_source(mut self, title: &str, path: &str) -> Self {
        self.sources.push(DataSource {
            title: title.to_string(),
            path: path.to_string(),
        });
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords
            .extend(keywords.iter().map(|keyword| keyword.to_string()));
        self
    }
}

pub fn write_metadata(
    output: &impl Output,
    key: &str,
    metadata: &DatapackageMetadata,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }
    let mut writer = output.writer_for_location_key(key)?;
    serde_json::to_writer_pretty(&mut writer, metadata)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::MemoryOutput;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[derive(Serialize)]
    struct Row {
        location_id: &'static str,
        #[serde(rename = "HRU_efficiency")]
        hru_efficiency: f64,
    }

    #[rstest]
    fn should_write_table_with_header() {
        let output = MemoryOutput::default();
        write_table(
            &output,
            "ventilation",
            &[
                Row {
                    location_id: "SE",
                    hru_efficiency: 0.7,
                },
                Row {
                    location_id: "FI",
                    hru_efficiency: 0.,
                },
            ],
        )
        .unwrap();
        assert_eq!(
            output.contents("ventilation"),
            "location_id,HRU_efficiency\nSE,0.7\nFI,0.0\n"
        );
    }

    #[rstest]
    fn should_skip_writing_to_sink() {
        assert!(write_table(&SinkOutput, "anything", &[Row {
            location_id: "SE",
            hru_efficiency: 0.7,
        }])
        .is_ok());
    }

    #[rstest]
    fn should_write_metadata_as_json() {
        let output = MemoryOutput::default();
        let metadata = DatapackageMetadata::new(
            "ambience2abm-data",
            "Archetype building data",
            "CC-BY-4.0",
            &DATA_KEYS,
        )
        .with_source("Building stock database", "https://example.org/database")
        .with_keywords(&["archetype", "building stock"]);
        write_metadata(&output, "data", &metadata).unwrap();

        let written: DatapackageMetadata =
            serde_json::from_str(&output.contents("data")).unwrap();
        assert_eq!(written, metadata);
        assert_eq!(written.resources.len(), 5);
    }
}
