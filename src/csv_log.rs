use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use fs9721::structs::reading::Reading;

const HEADER: [&str; 6] = ["time", "value", "unit", "display", "flags", "units"];

/// Returned when a row is written to a logger that was stopped.
#[derive(thiserror::Error, Debug)]
#[error("CSV logger for {0} is stopped")]
pub struct CsvLoggerStopped(pub PathBuf);

#[derive(Debug, Serialize)]
struct Row<'a> {
    time: String,
    value: String,
    unit: &'a str,
    display: &'a str,
    flags: String,
    units: String,
}

/// Appends one CSV row per reading.
pub struct CsvLogger {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    auto_reopen: bool,
    rows: usize,
}

impl CsvLogger {
    /// Opens `path` for appending, writing the header if the file is new or
    /// empty.
    pub fn open<P: AsRef<Path>>(path: P, auto_reopen: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = Self::open_writer(&path)?;
        log::info!("Logging readings to {}", path.display());

        Ok(Self {
            path,
            writer: Some(writer),
            auto_reopen,
            rows: 0,
        })
    }

    fn open_writer(path: &Path) -> Result<csv::Writer<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }

        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_logging(&self) -> bool {
        self.writer.is_some()
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Writes the row for a decoded reading.
    ///
    /// `value` is `L` for an overflow and empty when the display is not a
    /// number.
    pub fn log(&mut self, reading: &Reading) -> Result<()> {
        let value = match reading.value() {
            Ok(value) => value.to_string(),
            Err(_) if reading.is_overflow() => "L".to_string(),
            Err(_) => String::new(),
        };
        let display = reading.display();
        let unit = reading.unit_symbol();

        let row = Row {
            time: timestamp(),
            value,
            unit: &unit,
            display: &display,
            flags: join_names(reading.flags().iter().map(|f| f.name())),
            units: join_names(reading.units().iter().map(|u| u.name())),
        };
        self.write(&row)
    }

    /// Writes a row from a bare value and unit symbol.
    #[cfg(test)]
    pub fn log_value(&mut self, value: f64, unit: &str) -> Result<()> {
        let value = value.to_string();

        let row = Row {
            time: timestamp(),
            value: value.clone(),
            unit,
            display: &value,
            flags: String::new(),
            units: String::new(),
        };
        self.write(&row)
    }

    /// Flushes and closes the file. Further rows fail unless the logger
    /// reopens automatically.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            log::debug!(
                "Stopped logging to {} after {} rows",
                self.path.display(),
                self.rows
            );
        }
        Ok(())
    }

    fn write(&mut self, row: &Row<'_>) -> Result<()> {
        if self.writer.is_none() {
            if !self.auto_reopen {
                return Err(CsvLoggerStopped(self.path.clone()).into());
            }
            log::debug!("Reopening {}", self.path.display());
            self.writer = Some(Self::open_writer(&self.path)?);
        }

        let Some(writer) = self.writer.as_mut() else {
            return Err(CsvLoggerStopped(self.path.clone()).into());
        };
        writer.serialize(row)?;
        writer.flush()?;
        self.rows += 1;

        Ok(())
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Failed to close {}: {e}", self.path.display());
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" ")
}
