use emu_lib::io::{Printer, StdoutPrinter, WriterPrinter};
use emu_lib::{Emulator, HaltReason};
use loader::parse_deck;

use std::fs::File;
use std::io::BufWriter;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use clap_stdin::FileOrStdin;
use log::info;

/// Multiprogramming batch machine
#[derive(Parser)]
#[command(about)]
struct Args {
    /// Job deck to run ("-" for stdin)
    input: FileOrStdin,

    /// File to write the line printer output to (stdout if omitted)
    #[arg(long, short)]
    output: Option<String>,

    /// Print the final memory contents to stderr.
    #[arg(long)]
    dump_memory: bool,
}


fn main() {
    env_logger::init();

    let args = Args::parse();
    let input = args.input.contents().unwrap_or_else(|e| {
        eprintln!("Failed to read job deck: {e}");
        exit(1);
    });
    let jobs = parse_deck(&input).unwrap_or_else(|e| {
        eprintln!("{e}");
        exit(1);
    });

    let printer: Arc<dyn Printer> = match &args.output {
        Some(path) => {
            let file = File::create(path).unwrap_or_else(|e| {
                eprintln!("Failed to open {path}: {e}");
                exit(1);
            });
            Arc::new(WriterPrinter::new(BufWriter::new(file)))
        }
        None => Arc::new(StdoutPrinter),
    };

    let mut emu = Emulator::with_printer(printer);
    info!("Loaded {} jobs", jobs.len());
    for job in jobs {
        if let Err(e) = emu.admit(job) {
            eprintln!("System error: {e}");
            exit(1);
        }
    }

    let report = emu.run();
    if args.dump_memory {
        eprint!("{}", emu.memory().dump());
    }
    match report.halt {
        HaltReason::Idle => eprintln!("System shutdown normally after {} cycles", report.cycles),
        HaltReason::CycleCeiling => {
            eprintln!("System halted: maximum time limit reached");
            emu.shutdown();
        }
    }
}
