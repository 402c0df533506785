//! codetint - color the code in a text file and print it
//!
//! Reads a plain-text file as a document (one paragraph per line) or as a
//! slide deck, runs the highlighting engine on it and prints the result.

use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use codetint::memdoc::{MemDocument, MemPresentation};
use codetint::render::Renderer;
use codetint::{Config, Engine, Error, Result, StyleRegistry};

/// Parsed command line
struct Args {
    slides: bool,
    color: bool,
    list_modes: bool,
    file: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = Args {
        slides: false,
        color: io::stdout().is_terminal(),
        list_modes: false,
        file: None,
    };

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--slides" | "-s" => args.slides = true,
            "--no-color" => args.color = false,
            "--list-modes" => args.list_modes = true,
            s if s.starts_with('-') => return Err(Error::Message(format!("unknown option: {}", s))),
            _ => args.file = Some(PathBuf::from(arg)),
        }
    }
    Ok(Some(args))
}

fn run() -> Result<()> {
    init_tracing();

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let config = Config::load()?;
    debug!("configuration: {:?}", config);
    let registry = StyleRegistry::new(&config.theme()?)?;

    if args.list_modes {
        for mode in registry.modes() {
            println!("{}", mode);
        }
        return Ok(());
    }

    let path = args
        .file
        .ok_or_else(|| Error::Message("no input file (see --help)".to_string()))?;
    let text = fs::read_to_string(&path)?;
    let settings = config.settings();
    let engine = Engine::with_builtin_tokenizer(registry, settings);
    let mut renderer = Renderer::new(io::stdout().lock(), args.color);

    if args.slides {
        let mut pres = MemPresentation::from_text(&text, &settings.delimiters);
        engine.process_presentation(&mut pres)?;
        renderer.render_presentation(&pres)?;
    } else {
        let mut doc = MemDocument::from_lines(&text);
        engine.process_document(&mut doc)?;
        renderer.render_document(&doc)?;
    }

    Ok(())
}

fn print_usage() {
    println!("codetint {} - syntax coloring for code in documents and slides", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: codetint [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -s, --slides      Read FILE as slides: '---' lines separate slides,");
    println!("                    blank lines separate text boxes");
    println!("      --no-color    Print plain text");
    println!("      --list-modes  List the modes of the configured theme");
    println!("  -h, --help        Show this help message");
    println!("  -V, --version     Show version information");
    println!();
    println!("Code is marked with fences (```mode ... ```) or `inline spans`.");
    println!("Settings are read from ~/.codetint.conf; set RUST_LOG for diagnostics.");
}

fn print_version() {
    println!("codetint {}", env!("CARGO_PKG_VERSION"));
}
