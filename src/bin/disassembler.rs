/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use intel_8080_emu::opcode;

/// Prints the instructions of a raw 8080 program, one per line.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Program image, loaded at address 0
    file: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let input = match File::open(&args.file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{} {}: {}", "error:".red().bold(), args.file.display(), e);
            std::process::exit(1);
        }
    };

    let op_codes = opcode::OpCodes::new(io::BufReader::new(input));
    let mut count: u32 = 0;
    for op_code_result in op_codes {
        match op_code_result {
            Ok(op_code) => {
                println!("0x{:04x} - {}", count, op_code);
                count += op_code.size() as u32;
            }
            Err(e) => {
                println!("0x{:04x} - {}", count, format!("??? ({})", e).yellow());
                count += 1;
            }
        }
    }
}
