use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::{Parser, ValueEnum};
use log::info;

use svgr::options::MAX_FLATTENING_DEPTH;
use svgr::replay::{replay, Backend, TextBackend};
use svgr::{Diagnostic, Document, Flattening, MoveRepeats, Options, SvgError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Segments,
    Instructions,
    Both,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Trace svg paths into polylines and drawing instructions", long_about = None)]
struct Cli {
    #[arg(value_name = "FILE")]
    filename: PathBuf,

    /// Document scale; a negative value -n scales by 1/n
    #[arg(short, long, default_value_t = 1.0, allow_hyphen_values = true)]
    scale: f64,

    /// Subdivision depth for curves
    #[arg(
        short,
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(0..=MAX_FLATTENING_DEPTH as i64)
    )]
    depth: u32,

    /// Flatten curves adaptively to this tolerance instead of by fixed depth
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Treat extra coordinate pairs after a move as line-tos
    #[arg(long)]
    implicit_lineto: bool,

    #[arg(short, long, value_enum, default_value_t = Output::Both)]
    output: Output,

    /// Trace on a producer thread
    #[arg(long)]
    threaded: bool,
}

impl Cli {
    fn options(&self) -> Options {
        let flattening = match self.tolerance {
            Some(tolerance) => Flattening::Adaptive {
                tolerance,
                max_depth: self.depth,
            },
            None => Flattening::Uniform { depth: self.depth },
        };
        let move_repeats = if self.implicit_lineto {
            MoveRepeats::LineTo
        } else {
            MoveRepeats::NewSubpath
        };

        Options {
            scale: self.scale,
            flattening,
            move_repeats,
            discard_segments: self.output == Output::Instructions,
        }
    }
}

fn io_error(source: io::Error) -> SvgError {
    SvgError::Io {
        source,
        msg: "writing output".to_string(),
    }
}

fn trace(document: &Document, options: &Options, output: Output) -> svgr::Result<Vec<Diagnostic>> {
    let stdout = io::stdout();
    let mut backend = TextBackend::new(stdout.lock());
    let mut streams = document.drawing(options);

    if output != Output::Segments {
        while let Some(instruction) = streams.next_instruction() {
            backend.process(&instruction)?;
        }
    }
    if output != Output::Instructions {
        while let Some(segment) = streams.next_segment() {
            backend.write_segment(&segment)?;
        }
    }

    backend.into_inner().flush().map_err(io_error)?;
    Ok(streams.take_diagnostics())
}

fn trace_threaded(document: Document, options: Options, output: Output) -> svgr::Result<Vec<Diagnostic>> {
    let mut handle = svgr::spawn(document, options);

    let collector = handle
        .take_segments()
        .map(|segments| thread::spawn(move || segments.iter().collect::<Vec<_>>()));

    let stdout = io::stdout();
    let mut backend = TextBackend::new(stdout.lock());
    // Drained even when not printed: joining drops the receiver and stops the
    // producer early.
    let instructions: Vec<_> = handle.instructions().collect();
    let diagnostics = handle.join();
    if output != Output::Segments {
        replay(&mut backend, &instructions)?;
    }

    if output != Output::Instructions {
        let segments = match collector {
            Some(collector) => collector.join().unwrap_or_default(),
            None => Vec::new(),
        };
        for segment in &segments {
            backend.write_segment(segment)?;
        }
    }

    backend.into_inner().flush().map_err(io_error)?;
    Ok(diagnostics)
}

fn run(cli: Cli) -> svgr::Result<()> {
    let options = cli.options();
    let mut document = Document::open(&cli.filename)?;
    info!("tracing {} with {:?}", cli.filename.display(), options);

    let mut diagnostics = document.take_diagnostics();
    let traced = if cli.threaded {
        trace_threaded(document, options, cli.output)?
    } else {
        trace(&document, &options, cli.output)?
    };
    diagnostics.extend(traced);

    if !diagnostics.is_empty() {
        eprintln!("{} problem(s) found, set RUST_LOG=warn for details", diagnostics.len());
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("svg-trace: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Output};
    use svgr::{Flattening, MoveRepeats};

    #[test]
    fn test_depth_range() {
        assert!(Cli::try_parse_from(["svg-trace", "-d", "40", "in.svg"]).is_err());
        let cli = Cli::try_parse_from(["svg-trace", "-d", "20", "in.svg"]).unwrap();
        assert_eq!(cli.options().flattening, Flattening::Uniform { depth: 20 });
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "svg-trace",
            "--scale",
            "-2",
            "--tolerance",
            "0.5",
            "--implicit-lineto",
            "--output",
            "instructions",
            "in.svg",
        ])
        .unwrap();
        let options = cli.options();
        assert_eq!(options.effective_scale(), 0.5);
        assert_eq!(
            options.flattening,
            Flattening::Adaptive {
                tolerance: 0.5,
                max_depth: 10
            }
        );
        assert_eq!(options.move_repeats, MoveRepeats::LineTo);
        assert!(options.discard_segments);
        assert_eq!(cli.output, Output::Instructions);
    }
}
