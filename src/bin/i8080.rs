/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use intel_8080_emu::driver::{Machine, MachineConfig, StopReason};
use intel_8080_emu::Result;

/// Runs a raw 8080 program image loaded at address 0.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Program image to run
    program: PathBuf,

    /// Bytes of working memory after the program (decimal or 0x-prefixed hexadecimal)
    #[arg(long, value_parser = parse_size, default_value = "0x2000")]
    ram: usize,

    /// Stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Keep running when the program counter leaves the program image
    #[arg(long)]
    no_stop_at_end: bool,

    /// Print the state after each instruction and wait for Enter (`q` quits)
    #[arg(short, long)]
    step: bool,

    /// Print the processor state at the end of the run
    #[arg(short, long)]
    dump: bool,
}

fn parse_size(value: &str) -> std::result::Result<usize, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid size `{}`: {}", value, e))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = MachineConfig {
        working_ram: args.ram,
        max_steps: args.max_steps,
        stop_at_program_end: !args.no_stop_at_end,
    };
    let mut machine = Machine::from_file(&args.program, config)?;

    let reason = if args.step {
        step_interactively(&mut machine)?
    } else {
        machine.run()?
    };

    println!(
        "{:>12} {} after {} steps",
        "Stopped".green(),
        reason,
        machine.steps()
    );
    if args.dump {
        println!("{}", machine.cpu());
    }
    Ok(())
}

fn step_interactively(machine: &mut Machine) -> Result<StopReason> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if let Some(reason) = machine.stop_reason() {
            return Ok(reason);
        }
        let address = machine.cpu().registers().pc;
        if let Some(op) = machine.step()? {
            println!("{:>12} ${:04x} - {}", "Executed".cyan(), address, op);
        }
        println!("{}", machine.cpu());
        print!("[Enter] next, [q] quit > ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(StopReason::Cancelled),
        };
        if line.trim() == "q" {
            return Ok(StopReason::Cancelled);
        }
    }
}
