//! CSV partition files.

use super::{drop_store_id, session_context, RecordStore};
use crate::partition::Partition;
use crate::prelude::*;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 100_000,
        }
    }
}

/// A single CSV file read through DataFusion with schema inference.
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::sources::{session_context, CsvOptions, CsvSource};
///
/// # async fn example() -> drift_guard::prelude::Result<()> {
/// let ctx = session_context();
/// let train = CsvSource::new("Artifacts/ingested/train.csv")
///     .load(&ctx, "train")
///     .await?;
///
/// let options = CsvOptions {
///     delimiter: b'\t',
///     ..Default::default()
/// };
/// let test = CsvSource::with_options("Artifacts/ingested/test.tsv", options)
///     .load(&ctx, "test")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source with default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file into a named partition.
    ///
    /// A missing file, a file that is not valid UTF-8 CSV, or rows whose field
    /// count differs from the header all fail with an I/O error.
    #[instrument(skip(self, ctx), fields(path = %self.path.display()))]
    pub async fn load(&self, ctx: &SessionContext, name: &str) -> Result<Partition> {
        let batch = self
            .read_batch(ctx)
            .await
            .with_context(|| format!("failed to load partition '{name}'"))?;
        info!(
            partition = name,
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "Loaded partition"
        );
        Ok(Partition::new(name, batch))
    }

    async fn read_batch(&self, ctx: &SessionContext) -> Result<RecordBatch> {
        let display = self.path.display().to_string();
        if !self.path.is_file() {
            return Err(PipelineError::io(format!(
                "{display} does not exist or is not a file"
            )));
        }
        let path = self.path.to_str().ok_or_else(|| {
            PipelineError::configuration(format!("path {display} is not valid UTF-8"))
        })?;

        // DataFusion filters listed files by extension, so match the file's own.
        let extension = self
            .path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let read_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        let df = ctx
            .read_csv(path, read_options)
            .await
            .map_err(|e| PipelineError::io_with_source(format!("cannot read {display}"), e))?;
        let inferred = df.schema().inner().clone();
        let batches = df
            .collect()
            .await
            .map_err(|e| PipelineError::io_with_source(format!("cannot parse {display}"), e))?;

        let schema = batches.first().map(|b| b.schema()).unwrap_or(inferred);
        debug!(batches = batches.len(), "Concatenating CSV batches");
        Ok(concat_batches(&schema, &batches)?)
    }
}

#[async_trait]
impl RecordStore for CsvSource {
    async fn export_records(&self) -> Result<RecordBatch> {
        let ctx = session_context();
        let batch = self
            .read_batch(&ctx)
            .await
            .context("failed to export records from CSV store")?;
        Ok(drop_store_id(batch))
    }

    fn description(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

/// Writes a batch as CSV with a header row, creating parent directories.
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    {
        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(&mut out);
        writer.write(batch)?;
    }
    out.flush()
        .with_context(|| format!("cannot write {}", path.display()))?;
    debug!(path = %path.display(), rows = batch.num_rows(), "Wrote CSV");
    Ok(())
}
