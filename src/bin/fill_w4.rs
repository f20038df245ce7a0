//! Fill a W-4 offline
//!
//! Reads a blank form and a generate request (`{"userData":..,"calcResults":..}`)
//! from disk and writes the filled, flattened form.
//!
//! Usage:
//!   cargo run --release --bin fill_w4 -- --input fw4.pdf --data request.json --output W4.pdf
//!   cargo run --release --bin fill_w4 -- --input fw4.pdf --list-fields
//!   cargo run --release --bin fill_w4 -- --input fw4.pdf --data request.json --profile profile.json

use std::path::PathBuf;
use std::process;
use taxflow_w4::{fill_form, AcroForm, FormPopulator, FormProfile, GenerateRequest};

struct FillConfig {
    input: Option<PathBuf>,
    data: Option<PathBuf>,
    output: PathBuf,
    profile: Option<PathBuf>,
    list_fields: bool,
}

impl FillConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self {
            input: None,
            data: None,
            output: PathBuf::from("W4-2026-TaxFlow.pdf"),
            profile: None,
            list_fields: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--input" | "-i" => {
                    i += 1;
                    if i < args.len() {
                        config.input = Some(PathBuf::from(&args[i]));
                    }
                },
                "--data" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        config.data = Some(PathBuf::from(&args[i]));
                    }
                },
                "--output" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        config.output = PathBuf::from(&args[i]);
                    }
                },
                "--profile" => {
                    i += 1;
                    if i < args.len() {
                        config.profile = Some(PathBuf::from(&args[i]));
                    }
                },
                "--list-fields" => {
                    config.list_fields = true;
                },
                other => {
                    eprintln!("Warning: ignoring argument {}", other);
                },
            }
            i += 1;
        }

        config
    }
}

fn run(config: FillConfig) -> taxflow_w4::Result<()> {
    let input = match config.input {
        Some(input) => input,
        None => {
            eprintln!("Usage: fill_w4 --input <fw4.pdf> [--data <request.json>] [--output <out.pdf>] [--profile <profile.json>] [--list-fields]");
            process::exit(2);
        },
    };
    let blank = std::fs::read(&input)?;

    if config.list_fields {
        let form = AcroForm::load(&blank)?;
        for name in form.field_names() {
            let kind = form.field_kind(name).map(|k| k.as_str()).unwrap_or("?");
            println!("{:<8} {}", kind, name);
        }
        return Ok(());
    }

    let request: GenerateRequest = match config.data {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GenerateRequest::default(),
    };
    let populator = match config.profile {
        Some(path) => FormPopulator::new(FormProfile::load(path)?),
        None => FormPopulator::default(),
    };

    let filled = fill_form(&blank, &request.user_data, &request.calc_results, &populator)?;
    std::fs::write(&config.output, &filled.bytes)?;

    println!(
        "Wrote {} ({} bytes, {} fields filled)",
        config.output.display(),
        filled.bytes.len(),
        filled.report.applied
    );
    for skipped in &filled.report.skipped {
        println!("  skipped {}: {}", skipped.target_field, skipped.reason);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(FillConfig::from_args()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
