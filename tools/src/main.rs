use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bancho_tools::{
    build_packet, decode_packets, format_decode_pretty, inspect_packets, parse_field,
    parse_packet_id, InspectReport,
};
use binary::{WireType, WireValue};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;

#[derive(Parser)]
#[command(
    name = "bancho-tools",
    version,
    about = "Bancho packet inspection, decoding and building tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the packets in a capture.
    Inspect {
        /// Path to the capture bytes, or a directory of captures.
        packet_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected captures.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected captures (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode packet payloads into structured output.
    Decode {
        /// Path to the capture bytes.
        packet_file: PathBuf,
        /// Comma separated field types read from each payload, e.g. `i32,str`.
        #[arg(long, value_delimiter = ',')]
        fields: Vec<WireType>,
        /// Only decode packets with this id (number or name).
        #[arg(long, value_parser = parse_packet_id)]
        id: Option<u16>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Build a packet from typed fields.
    Encode {
        /// Packet id (number or name).
        #[arg(long, value_parser = parse_packet_id)]
        id: u16,
        /// Payload field as `type=value`; repeat in payload order.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<WireValue>,
        /// Write the packet here instead of printing it as hex.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            packet_path,
            glob,
            sort,
            limit,
        } => {
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read capture {}", entry.path.display()))?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&inspect_packets(&bytes));
                }
            } else {
                let bytes = fs::read(&packet_path)
                    .with_context(|| format!("read capture {}", packet_path.display()))?;
                print_inspect_report(&inspect_packets(&bytes));
            }
        }
        Command::Decode {
            packet_file,
            fields,
            id,
            format,
        } => {
            let bytes = fs::read(&packet_file)
                .with_context(|| format!("read capture {}", packet_file.display()))?;
            let output = decode_packets(&bytes, id, &fields)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Encode { id, fields, out } => {
            let bytes = build_packet(id, &fields);
            match out {
                Some(path) => {
                    fs::write(&path, &bytes)
                        .with_context(|| format!("write packet {}", path.display()))?;
                }
                None => println!("{}", to_hex(&bytes)),
            }
        }
    }
    Ok(())
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(PacketEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "{} packets in {} bytes",
        report.packets.len(),
        report.total_bytes
    );
    for packet in &report.packets {
        println!(
            "  @{:<6} {:>3} {:<32} {} bytes",
            packet.offset,
            packet.id,
            packet.name.unwrap_or("?"),
            packet.payload_len
        );
    }
    if report.trailing_bytes > 0 {
        println!("trailing: {} bytes", report.trailing_bytes);
    }
    if let Some(error) = &report.error {
        println!("error: {error}");
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
