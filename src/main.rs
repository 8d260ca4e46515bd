use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use clap::Parser;
use log::{debug, warn};

use dx7json::bank::{self, BankOutcome, BankReport};
use dx7json::parse_patch;

/// Convert DX7 sysex patch banks into per-patch JSON documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing .syx bank files
    #[arg(default_value = "sysex")]
    sysex_dir: PathBuf,

    /// Directory the per-patch JSON documents are written under
    #[arg(long, default_value = "patches")]
    out_dir: PathBuf,

    /// External dump tool invoked once per bank
    #[arg(long, default_value = "dx7dump")]
    dump_tool: PathBuf,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let banks = list_banks(&args.sysex_dir).unwrap_or_else(|e| {
        eprintln!(
            "Error listing banks in '{}': {}",
            args.sysex_dir.display(),
            e
        );
        std::process::exit(1);
    });

    if banks.is_empty() {
        eprintln!("No .syx bank files found in '{}'", args.sysex_dir.display());
        std::process::exit(1);
    }

    // Fire off every dump before collecting any, so the external tools run
    // concurrently; each completion is then handled on its own.
    let children: Vec<(PathBuf, io::Result<Child>)> = banks
        .into_iter()
        .map(|bank| {
            let child = Command::new(&args.dump_tool)
                .arg("-l")
                .arg(&bank)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn();
            (bank, child)
        })
        .collect();

    let mut reports = Vec::with_capacity(children.len());
    for (bank, child) in children {
        let stem = bank::bank_stem(&bank);
        let outcome = convert_bank(&args.out_dir, &stem, child);
        if let BankOutcome::DumpFailed(reason) = &outcome {
            warn!("bank {stem}: {reason}");
        }
        reports.push(BankReport {
            bank: stem,
            outcome,
        });
    }

    summarize(&reports);
}

/// Bank files in the input directory, sorted for deterministic runs.
fn list_banks(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut banks = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_syx = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("syx"));
        if is_syx {
            banks.push(path);
        }
    }
    banks.sort();
    Ok(banks)
}

/// Waits out one bank's dump process and writes a document per patch block.
/// Never fatal: every failure ends up in the returned outcome.
fn convert_bank(out_dir: &Path, stem: &str, child: io::Result<Child>) -> BankOutcome {
    let output = match child.and_then(|c| c.wait_with_output()) {
        Ok(output) => output,
        Err(e) => return BankOutcome::DumpFailed(format!("unable to run dump tool: {e}")),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return BankOutcome::DumpFailed(format!(
            "dump tool exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);

    let bank_dir = out_dir.join(stem);
    if let Err(e) = fs::create_dir_all(&bank_dir) {
        warn!("unable to create '{}': {e}", bank_dir.display());
    }

    let mut written = 0;
    let mut failed = 0;
    for block in bank::split_patch_blocks(&stdout) {
        let patch = parse_patch(&block);
        match bank::write_patch(&bank_dir, &patch) {
            Ok(path) => {
                debug!("wrote {}", path.display());
                written += 1;
            }
            Err(e) => {
                warn!("bank {stem}: {e}");
                failed += 1;
            }
        }
    }

    BankOutcome::Converted { written, failed }
}

fn summarize(reports: &[BankReport]) {
    let mut total = 0;
    let mut failed_banks = 0;

    for report in reports {
        match &report.outcome {
            BankOutcome::Converted { written, failed } => {
                total += written;
                if *failed > 0 {
                    println!("{}: {} patches, {} not written", report.bank, written, failed);
                } else {
                    println!("{}: {} patches", report.bank, written);
                }
            }
            BankOutcome::DumpFailed(reason) => {
                failed_banks += 1;
                println!("{}: failed ({reason})", report.bank);
            }
        }
    }

    println!(
        "{} patches written from {} banks, {} banks failed",
        total,
        reports.len(),
        failed_banks
    );
}
