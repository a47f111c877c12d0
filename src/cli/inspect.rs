use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use super::command::{Cli, InspectArgs};
use crate::config::Config;
use crate::input::parse_hex_line;
use fs9721::process::assemble::{Assembler, DataBuffer};
use fs9721::structs::fields::{BitOrder, FieldKind, FieldSpec, PACKET_LAYOUT, RawFields};
use fs9721::structs::reading::Reading;
use fs9721::structs::segment::decode_segment;

pub fn cmd_inspect(args: &InspectArgs, cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let bit_order = config.bit_order(args.bit_order);

    let data = assemble_chunks(&args.chunks)?;
    log::debug!("Inspecting {data} ({bit_order:?})");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_inspection(&data, bit_order, &mut out)
}

fn assemble_chunks(chunks: &[String]) -> Result<DataBuffer> {
    let mut assembler = Assembler::default();

    for (i, chunk) in chunks.iter().enumerate() {
        let Some(octets) = parse_hex_line(chunk).with_context(|| format!("Chunk {}", i + 1))?
        else {
            bail!("Chunk {} holds no octets", i + 1);
        };

        if let Some(data) = assembler
            .push_bytes(&octets)
            .with_context(|| format!("Chunk {}", i + 1))?
        {
            if i + 1 < chunks.len() {
                log::warn!("Packet completed by chunk {}, ignoring the rest", i + 1);
            }
            return Ok(data);
        }
    }

    Ok(assembler.finish()?)
}

fn field_label(spec: &FieldSpec) -> String {
    match spec.kind {
        FieldKind::Flag(flag) => flag.name().to_string(),
        FieldKind::Unit(unit) => unit.name().to_string(),
        FieldKind::Sign => "SIGN".to_string(),
        FieldKind::Segments(i) => format!("DIGIT{}", i + 1),
        FieldKind::DecimalPoint(i) => format!("DP{}", i + 1),
    }
}

fn join_names(names: Vec<&str>) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(" ")
    }
}

fn write_inspection<W: Write>(data: &DataBuffer, bit_order: BitOrder, out: &mut W) -> Result<()> {
    writeln!(out, "Data buffer: {data}")?;
    if bit_order == BitOrder::Reversed {
        let bytes = DataBuffer(bit_order.apply(data));
        writeln!(out, "Reversed:    {bytes}")?;
    }

    writeln!(out, "\nFields:")?;
    for spec in PACKET_LAYOUT.iter() {
        let value = RawFields::field_value(data, bit_order, spec)?;
        let range = if spec.width == 1 {
            format!("{}", spec.offset)
        } else {
            format!("{}-{}", spec.offset, spec.offset + spec.width - 1)
        };

        match spec.kind {
            FieldKind::Segments(_) => {
                let digit = decode_segment(value, false);
                writeln!(
                    out,
                    "  {range:>5}  {:<12} {value:#04X} ({})",
                    field_label(spec),
                    digit.as_char().unwrap_or(' ')
                )?;
            }
            _ => writeln!(out, "  {range:>5}  {:<12} {value}", field_label(spec))?,
        }
    }

    let reading = Reading::from_fields(RawFields::decode(data, bit_order)?);

    writeln!(out, "\nDisplay: {}", reading.display())?;
    writeln!(
        out,
        "Flags:   {}",
        join_names(reading.flags().iter().map(|f| f.name()).collect())
    )?;
    writeln!(
        out,
        "Units:   {}",
        join_names(reading.units().iter().map(|u| u.name()).collect())
    )?;
    writeln!(out, "Unit:    {}", reading.unit_symbol())?;
    match reading.value() {
        Ok(value) => writeln!(out, "Value:   {value}")?,
        Err(e) => writeln!(out, "Value:   - ({e})")?,
    }
    for anomaly in reading.anomalies() {
        writeln!(out, "Anomaly: {anomaly}")?;
    }

    Ok(())
}
