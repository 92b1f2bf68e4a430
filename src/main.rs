
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Debug: {}\n\tOutfile: {}\n\tInfile: {}",
        verbosity_filter(args.occurrences_of("verbose")),
        args.is_present("print-debug"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap_or("None")
    );

    // INPUT is required, clap has already rejected a missing one.
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());

    // The whole file is read up front; the handle is closed before assembly.
    let source = match fs::read_to_string(&ipath) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(source) => source,
    };

    let out = match assembler::assemble(&source) {
        Err(err) => {
            error!("{}", err);
            error!("Stopped assembly of `{}` at line {}.", ipath.display(), err.line());
            std::process::exit(1);
        },
        Ok(out) => out,
    };

    if out.program.is_empty() {
        warn!("`{}` contains no instructions.", ipath.display());
    }

    if !out.symbols.is_empty() {
        info!("{} label(s) defined:", out.symbols.len());
        for (name, sym) in out.symbols.sorted() {
            info!("\t{} => {:#06x} (line {})", name, sym.address, sym.line);
        }
    }

    if args.is_present("print-debug") {
        let mut grid = Grid::new(GridOptions {
            filling:     Filling::Spaces(1),
            direction:   Direction::LeftToRight,
        });

        for (idx, (ins, word)) in out.program.iter().zip(out.words.iter()).enumerate() {
            grid.add(Cell::from(format!("0x{:04X}:", idx)));
            grid.add(Cell::from(format!("{}", ins)));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(word.clone()));
        }

        println!("{}", grid.fit_into_columns(4));
    }

    match args.value_of("output") {
        Some(filename) => {
            let opath = Path::new(filename);
            if let Err(err) = write_words(opath, &out.words) {
                error!("fatal: unable to write to output file `{}`: {}", opath.display(), err);
                std::process::exit(1);
            }
        },
        None => {
            for word in out.words.iter() {
                println!("{}", word);
            }
        },
    }
}

/// Writes one newline-terminated word per line.
fn write_words(opath: &Path, words: &[String]) -> std::io::Result<()> {
    let mut ofile = File::create(opath)?;
    for word in words {
        writeln!(ofile, "{}", word)?;
    }
    ofile.flush()
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input assembly (.asm) file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .long("output")
            .takes_value(true)
            .help("write machine code to an outfile instead of STDOUT"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the debug information alongside the assembly to STDOUT"))
        .get_matches()
}

fn verbosity_filter(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

// Logs go to STDERR so that machine code on STDOUT can be piped.
fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity_filter(verbosity))
        .chain(std::io::stderr())
        .apply().ok();
}
