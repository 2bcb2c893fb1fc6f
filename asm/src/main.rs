use std::{io, path::PathBuf, process::ExitCode};

use casm::{util, Assembler, Error, Severity};
use color_print::cprintln;
use tracing::Level;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.asm")]
    input: PathBuf,

    /// Output file
    #[clap(short, long, default_value = "main.bin")]
    output: PathBuf,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,

    /// Write the label table as JSON
    #[clap(short, long)]
    symbols: Option<PathBuf>,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[clap(short, long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    match main_real(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Ok(false) when the source has errors.
fn main_real(args: Args) -> Result<bool, Error> {
    println!("CASM 24-bit Assembler");

    println!("1. Read Files and Assemble");
    println!("  < {}", args.input.display());
    let assembly = Assembler::new().build_file(&args.input)?;
    assembly.diagnostics().dump();

    if args.dump {
        util::print_dump(&assembly);
    }

    let errors = assembly.diagnostics().count(Severity::Error);
    let warnings = assembly.diagnostics().count(Severity::Warning);
    if errors > 0 {
        cprintln!(
            "<red,bold>Build failed</>: {} error(s), {} warning(s)",
            errors,
            warnings
        );
        return Ok(false);
    }

    println!("2. Write Binary");
    println!("  > {}", args.output.display());
    let bytes = assembly.bytes();
    std::fs::write(&args.output, &bytes)
        .map_err(|err| Error::FileWrite(args.output.display().to_string(), err))?;
    tracing::info!(
        "{} bytes in {} block(s), entry 0x{:06X}",
        bytes.len(),
        assembly.block_count(),
        assembly.entry()
    );

    if let Some(path) = &args.symbols {
        println!("3. Write Symbols");
        println!("  > {}", path.display());
        let file = std::fs::File::create(path)
            .map_err(|err| Error::FileCreate(path.display().to_string(), err))?;
        serde_json::to_writer_pretty(file, assembly.labels())
            .map_err(|err| Error::FileWrite(path.display().to_string(), err.into()))?;
    }

    if warnings > 0 {
        cprintln!("<yellow,bold>Done</> with {} warning(s)", warnings);
    }
    Ok(true)
}
