//! DLC kernel source generator binary.
//!
//! Parses a textual tile-IR file and prints the generated DLC C source.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use dlcgen::dlc::build_module;
use dlcgen::tir::TirModule;

#[derive(Parser)]
#[command(name = "dlcgen", about = "Lower tile IR to DLC C source")]
struct Args {
    /// Input tile-IR file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Write the generated source here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the emitted entry-point names instead of the source.
    #[arg(long)]
    list_kernels: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let ir_text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let module = TirModule::parse(&ir_text)?;
    let source = build_module(&module)?;

    if args.list_kernels {
        for name in &source.function_names {
            println!("{name}");
        }
        return Ok(());
    }

    match &args.output {
        Some(path) => fs::write(path, &source.code)?,
        None => print!("{}", source.code),
    }
    Ok(())
}
