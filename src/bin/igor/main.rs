//! IGOR CLI - Tool for dumping IGOR binary waves and packed experiments.

use std::env;
use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use igor::packed::{decode_packed, load_packed, DataFolder, FolderEntry, PackedExperiment, PackedOptions};
use igor::record::{Record, RecordKind};
use igor::wave::{decode_wave, load_wave, BinaryWave, WaveArray};
use igor::Result;

/// Verbosity level
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

/// Flags shared by all commands.
#[derive(Clone, Copy, Debug)]
struct Options {
    level: u8,
    json: bool,
    strict: bool,
    strict_records: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: LOG_INFO,
            json: false,
            strict: true,
            strict_records: false,
        }
    }
}

fn init_logging(level: u8) {
    let directive = match level {
        LOG_QUIET => "error",
        LOG_INFO => "info",
        LOG_DEBUG => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut opts = Options::default();
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => opts.level = LOG_DEBUG,
            "-vv" | "--trace" => opts.level = LOG_TRACE,
            "-q" | "--quiet" => opts.level = LOG_QUIET,
            "-j" | "--json" => opts.json = true,
            "--lenient" => opts.strict = false,
            "--strict-records" => opts.strict_records = true,
            "-V" | "--version" => {
                print_version();
                return;
            }
            _ => filtered_args.push(arg),
        }
    }
    init_logging(opts.level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let ok = match filtered_args[0] {
        // Binary wave dump
        "ibw" | "w" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: igor ibw <file.ibw>...");
                std::process::exit(1);
            }
            cmd_ibw(&filtered_args[1..], opts)
        }

        // Packed experiment dump
        "pxp" | "p" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: igor pxp <file.pxp>...");
                std::process::exit(1);
            }
            cmd_pxp(&filtered_args[1..], opts)
        }

        // Help
        "help" | "h" | "-h" | "--help" => {
            print_help();
            true
        }

        // Default: pick the command from the file extension
        first => match extension(first).as_deref() {
            Some("ibw") => cmd_ibw(&filtered_args, opts),
            Some("pxp") => cmd_pxp(&filtered_args, opts),
            _ => {
                eprintln!("Unknown command: {}", first);
                eprintln!();
                print_help();
                false
            }
        },
    };
    if !ok {
        std::process::exit(1);
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn print_version() {
    println!(
        "igor {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("IGOR_BUILD_DATE"),
        env!("IGOR_BUILD_TIME")
    );
}

fn print_help() {
    println!("igor - IGOR Pro file reader");
    println!();
    println!("USAGE:");
    println!("    igor [OPTIONS] <COMMAND> <FILE>...");
    println!();
    println!("COMMANDS:");
    println!("    w, ibw <file>...     Print binary wave samples as tab-separated text");
    println!("    p, pxp <file>...     List packed experiment records and the folder tree");
    println!("    h, help              Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output and wave headers");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only report errors");
    println!("    -j, --json           Print headers and metadata as JSON");
    println!("    --lenient            Warn instead of failing on non-zero padding or truncation");
    println!("    --strict-records     Fail on unknown packed experiment records");
    println!("    -V, --version        Show version and build date");
    println!();
    println!("EXAMPLES:");
    println!("    igor ibw mac-double.ibw               # Dump samples");
    println!("    igor -v ibw win-version5.ibw          # Samples and headers");
    println!("    igor --json ibw *.ibw                 # Headers of many waves as JSON");
    println!("    igor pxp polar-graphs-demo.pxp        # Records and folders");
    println!("    cat wave.ibw | igor ibw -             # Read from stdin");
    println!();
    println!("NOTES:");
    println!("    - Passing .ibw or .pxp files directly selects the command by extension");
    println!("    - RUST_LOG overrides the verbosity flags");
}

/// Read all of stdin for `-` arguments.
fn read_stdin() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    io::stdin().lock().read_to_end(&mut buf)?;
    Ok(buf)
}

fn open_wave(path: &str, strict: bool) -> Result<BinaryWave> {
    if path == "-" {
        decode_wave(io::Cursor::new(read_stdin()?), strict)
    } else {
        load_wave(path, strict)
    }
}

fn open_packed(path: &str, options: PackedOptions) -> Result<PackedExperiment> {
    if path == "-" {
        decode_packed(io::Cursor::new(read_stdin()?), options)
    } else {
        load_packed(path, options)
    }
}

// ============================================================================
// ibw
// ============================================================================

fn cmd_ibw(paths: &[&str], opts: Options) -> bool {
    info!("Reading {} wave file(s)", paths.len());
    // decode in parallel, report in argument order
    let results: Vec<(&str, Result<BinaryWave>)> = paths
        .par_iter()
        .map(|&p| (p, open_wave(p, opts.strict)))
        .collect();

    let mut ok = true;
    let many = results.len() > 1;
    for (path, result) in results {
        match result {
            Ok(wave) => {
                debug!("{}: version {} {}", path, wave.version, wave.byte_order);
                if opts.json {
                    println!("{}", serde_json::to_string_pretty(&wave.to_json()).unwrap_or_default());
                    continue;
                }
                if many {
                    println!("# {}", path);
                }
                print!("{}", format_samples(&wave.data));
                if opts.level >= LOG_DEBUG {
                    print_wave_headers(&wave);
                }
            }
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                ok = false;
            }
        }
    }
    ok
}

/// Samples one per line; matrices one row per line with tab-separated
/// columns.
fn format_samples(data: &WaveArray) -> String {
    let mut out = String::new();
    let values = &data.values;
    let sizes = data.shape.sizes();
    if sizes.len() == 2 {
        let (rows, cols) = (sizes[0], sizes[1]);
        for r in 0..rows {
            let line: Vec<String> = (0..cols)
                .filter_map(|c| data.offset(&[r, c]))
                .filter_map(|i| values.format_at(i))
                .collect();
            let _ = writeln!(out, "{}", line.join("\t"));
        }
    } else {
        for i in 0..data.len() {
            if let Some(s) = values.format_at(i) {
                let _ = writeln!(out, "{}", s);
            }
        }
    }
    out
}

fn print_wave_headers(wave: &BinaryWave) {
    println!();
    println!("Wave: {}", wave.name());
    println!("  Version:    {}", wave.version);
    println!("  Byte order: {}", wave.byte_order);
    match wave.numeric_type() {
        Some(t) => println!("  Type:       {}", t),
        None => println!("  Type:       {:#x} (unknown)", wave.type_code()),
    }
    println!("  Shape:      {}", wave.shape());
    if !wave.data_units().is_empty() {
        println!("  Units:      {}", wave.data_units());
    }
    if !wave.note().is_empty() {
        println!("  Note:       {}", wave.note());
    }
    if !wave.formula().is_empty() {
        println!("  Formula:    {}", wave.formula());
    }
    println!("  bin_header:");
    for (name, value) in wave.bin_header.iter() {
        println!("    {}: {}", name, value.to_json());
    }
    println!("  wave_header:");
    for (name, value) in wave.wave_header.iter() {
        println!("    {}: {}", name, value.to_json());
    }
}

// ============================================================================
// pxp
// ============================================================================

fn cmd_pxp(paths: &[&str], opts: Options) -> bool {
    info!("Reading {} packed experiment(s)", paths.len());
    let options = PackedOptions::default()
        .strict(opts.strict)
        .ignore_unknown(!opts.strict_records);
    let results: Vec<(&str, Result<PackedExperiment>)> = paths
        .par_iter()
        .map(|&p| (p, open_packed(p, options)))
        .collect();

    let mut ok = true;
    for (path, result) in results {
        match result {
            Ok(exp) => {
                if opts.json {
                    let records: Vec<serde_json::Value> = exp.records.iter().map(record_json).collect();
                    let doc = serde_json::json!({
                        "file": path,
                        "records": records,
                        "root": exp.root.to_json(),
                    });
                    println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
                    continue;
                }
                println!("Experiment: {}", path);
                println!("Records ({}):", exp.records.len());
                for (i, record) in exp.records.iter().enumerate() {
                    println!("  [{}] {}", i, describe_record(record));
                }
                println!();
                println!("Folders:");
                print_folder(&exp.root, 1);
            }
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                ok = false;
            }
        }
    }
    ok
}

fn describe_record(record: &Record) -> String {
    let mut s = format!("{} ({} bytes)", record.record_type(), record.data.len());
    if record.header.superceded {
        s.push_str(" superceded");
    }
    match &record.kind {
        RecordKind::Wave(w) => {
            let _ = write!(s, ": {} {}", w.name(), w.shape());
        }
        RecordKind::Variables(v) => {
            let _ = write!(
                s,
                ": {} sys, {} num, {} str",
                v.sys_vars.len(),
                v.user_vars.len(),
                v.user_strs.len()
            );
        }
        RecordKind::FolderStart(name) => {
            let _ = write!(s, ": {}", name);
        }
        _ => {}
    }
    s
}

fn record_json(record: &Record) -> serde_json::Value {
    let detail = match &record.kind {
        RecordKind::Wave(w) => w.to_json(),
        RecordKind::Variables(v) => v.to_json(),
        RecordKind::FolderStart(name) => serde_json::json!(name),
        RecordKind::Text(_) => serde_json::json!(record.text()),
        _ => serde_json::Value::Null,
    };
    serde_json::json!({
        "type": record.record_type().to_string(),
        "version": record.header.version,
        "superceded": record.header.superceded,
        "bytes": record.data.len(),
        "detail": detail,
    })
}

fn print_folder(folder: &DataFolder, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{}/", indent, folder.name);
    for entry in &folder.entries {
        match entry {
            FolderEntry::Folder(f) => print_folder(f, depth + 1),
            FolderEntry::Wave(w) => {
                let ty = w.numeric_type().map_or_else(|| "?".to_string(), |t| t.to_string());
                println!("{}  {} [{} {}]", indent, w.name(), ty, w.shape());
            }
            FolderEntry::Variables(v) => {
                for (name, value) in &v.user_vars {
                    match value {
                        Some(value) => println!("{}  {} = {}", indent, name, value),
                        None => println!("{}  {}", indent, name),
                    }
                }
                for (name, value) in &v.user_strs {
                    println!("{}  {} = {:?}", indent, name, value);
                }
                for dep in v.dependent_vars.iter().chain(&v.dependent_strs) {
                    println!("{}  {} := {}", indent, dep.name, dep.formula);
                }
            }
        }
    }
}
