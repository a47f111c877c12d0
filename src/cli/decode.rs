use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::command::{Cli, DecodeArgs};
use crate::config::Config;
use crate::csv_log::CsvLogger;
use crate::input::{InputReader, parse_hex_line};
use fs9721::process::decode::Decoder;
use fs9721::utils::errors::DecodeError;

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let strict = cli.strict || config.strict;

    let mut decoder = Decoder::new(config.bit_order(args.bit_order));
    decoder.set_fail_level(config.fail_level(cli.strict));

    log::info!(
        "Decoding capture: {} (strict mode: {}, bit order: {:?})",
        args.input.display(),
        strict,
        decoder.bit_order()
    );

    let csv = match config.csv_path(args.csv.as_deref()) {
        Some(path) => Some(CsvLogger::open(path, args.auto_reopen || config.auto_reopen)?),
        None => None,
    };

    let pb = match multi {
        Some(multi) => {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(ProgressStyle::with_template(
                "{spinner:.green} {pos} readings\n{msg} | elapsed: {elapsed_precise}",
            )?);
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb.set_message("waiting for notifications");
            Some(pb)
        }
        None => None,
    };

    let mut session = DecodeSession::new(decoder, csv, strict);
    session.pb = pb;

    let mut input_reader = InputReader::new(&args.input)?;
    if input_reader.is_pipe() {
        log::debug!("Reading notifications from stdin");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    input_reader.process_lines(|number, line| {
        session.process_line(number, line, &mut out)?;
        Ok(true)
    })?;

    session.finish()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DecodeStats {
    notifications: usize,
    readings: usize,
    invalid_lines: usize,
}

struct DecodeSession {
    decoder: Decoder,
    csv: Option<CsvLogger>,
    strict: bool,
    stats: DecodeStats,
    pb: Option<ProgressBar>,
}

impl DecodeSession {
    fn new(decoder: Decoder, csv: Option<CsvLogger>, strict: bool) -> Self {
        Self {
            decoder,
            csv,
            strict,
            stats: DecodeStats::default(),
            pb: None,
        }
    }

    fn process_line<W: Write>(&mut self, number: usize, line: &str, out: &mut W) -> Result<()> {
        let octets = match parse_hex_line(line) {
            Ok(Some(octets)) => octets,
            Ok(None) => return Ok(()),
            Err(e) if self.strict => return Err(e.context(format!("Line {number}"))),
            Err(e) => {
                log::warn!("Line {number}: {e:#}, skipping");
                self.stats.invalid_lines += 1;
                return Ok(());
            }
        };
        self.stats.notifications += 1;

        let reading = match self.decoder.push_bytes(&octets) {
            Ok(Some(reading)) => reading,
            Ok(None) => return Ok(()),
            Err(DecodeError::Assemble(e)) if !self.strict => {
                log::debug!("Line {number}: {e}");
                return Ok(());
            }
            Err(e) => return Err(e).with_context(|| format!("Line {number}")),
        };
        self.stats.readings += 1;

        for anomaly in reading.anomalies() {
            log::debug!("Line {number}: {anomaly}");
        }

        match &self.pb {
            Some(pb) => {
                pb.suspend(|| writeln!(out, "{reading}"))?;
                pb.inc(1);
                pb.set_message(reading.to_string());
            }
            None => writeln!(out, "{reading}")?,
        }

        if let Some(csv) = self.csv.as_mut() {
            csv.log(&reading)?;
        }

        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }

        let pending = self.decoder.pending();
        if pending > 0 {
            match self.decoder.finish() {
                Err(e) if self.strict => bail!("Capture ends with a partial packet: {e}"),
                Err(e) => log::warn!("Capture ends with a partial packet: {e}"),
                Ok(_) => {}
            }
        }

        if let Some(csv) = self.csv.as_mut().filter(|csv| csv.is_logging()) {
            log::info!(
                "Wrote {} rows to {}",
                csv.rows_written(),
                csv.path().display()
            );
            csv.stop()?;
        }

        log::info!(
            "Processed {} notifications: {} readings, {} packets rejected, {} invalid lines",
            self.stats.notifications,
            self.stats.readings,
            self.decoder.packets_rejected(),
            self.stats.invalid_lines
        );

        Ok(())
    }
}
