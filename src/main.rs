//! hoa2pg binary crate.

use std::io::{self, Read, Write};

use clap::Parser;
use fs_err as fs;

use hoa2pg::options::{CliOptions, ConstructionOptions, TraceLevel};
use hoa2pg::{translate_with, Error};

fn main() {
    if let Err(error) = hoa2pg_main() {
        // discard result as we cannot further propagate a write error
        let _ = writeln!(io::stderr(), "Error: {}", error);
        std::process::exit(error.exit_code());
    }
}

/// Initialize the logging framework with the given trace level.
///
/// # Errors
///
/// Returns an error if the logging framework has already been initialized.
fn initialize_logging(level: TraceLevel) -> io::Result<()> {
    env_logger::builder()
        .filter(None, level.into())
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

/// Main function that parses the options, reads the input,
/// calls the construction procedure and writes the output.
///
/// # Errors
///
/// Returns an error if an I/O error occurred, e.g. from opening a file,
/// or if the input is not a suitable automaton.
fn hoa2pg_main() -> Result<(), Error> {
    let options = CliOptions::parse();
    initialize_logging(options.trace_level)?;

    let input = if let Some(input_file) = &options.input_file {
        fs::read_to_string(input_file)?
    } else {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        input
    };

    // the output file is only created once the game is complete
    let result = translate_with(&input, &ConstructionOptions::from(&options))?;

    if let Some(output_file) = &options.output_file {
        let file = fs::File::create(output_file)?;
        result.write(io::BufWriter::new(file))?;
    } else {
        result.write(io::BufWriter::new(io::stdout().lock()))?;
    }
    Ok(())
}
