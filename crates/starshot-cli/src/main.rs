//! Starshot CLI entry point.

mod config;

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use starshot_check::{Report, check_program};
use starshot_ir::grammar::{GrammarFormat, grammar};
use starshot_ir::{Definition, Program, parse};
use starshot_runtime_luajit::{compile, execute};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "starshot")]
#[command(about = "Starshot IR toolchain")]
struct Cli {
    /// Config file (defaults to ./starshot.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a program and print its definitions
    Parse {
        /// Input file (or - for stdin)
        file: String,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every checking pass
    Check {
        /// Input file (or - for stdin)
        file: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile a program to Lua
    Compile {
        /// Input file (or - for stdin)
        file: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Emit even when checking reports diagnostics
        #[arg(long)]
        allow_diagnostics: bool,
    },

    /// Execute one graph of a program
    Run {
        /// Input file (or - for stdin)
        file: String,

        /// Graph to call
        graph: String,

        /// Arguments, one JSON value each
        args: Vec<String>,

        /// Run even when checking reports diagnostics
        #[arg(long)]
        allow_diagnostics: bool,
    },

    /// Print the surface grammar
    Grammar {
        #[arg(long, default_value_t = GrammarFormat::Ebnf)]
        format: GrammarFormat,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(std::env::current_dir()?)?,
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_filter().parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse { file, json } => {
            let program = load(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                for line in summary(&program) {
                    println!("{line}");
                }
            }
        }

        Commands::Check { file, json } => {
            let program = load(&file)?;
            let report = check_program(&program);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (pass, message) in report.iter() {
                    println!("{pass}: {message}");
                }
            }
            if !report.is_clean() {
                std::process::exit(1);
            }
            if !json {
                println!("ok");
            }
        }

        Commands::Compile {
            file,
            out,
            allow_diagnostics,
        } => {
            let program = load(&file)?;
            gate(&check_program(&program), config.check.deny && !allow_diagnostics)?;
            let lua_code = compile(&program)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &lua_code)?;
                    info!(path = %path.display(), "wrote lua chunk");
                }
                None => print!("{lua_code}"),
            }
        }

        Commands::Run {
            file,
            graph,
            args,
            allow_diagnostics,
        } => {
            let program = load(&file)?;
            gate(&check_program(&program), config.check.deny && !allow_diagnostics)?;
            let args = args
                .iter()
                .map(|arg| serde_json::from_str(arg))
                .collect::<Result<Vec<serde_json::Value>, _>>()?;
            let result = execute(&program, &graph, &args)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Grammar { format } => {
            print!("{}", grammar(format));
        }
    }

    Ok(())
}

fn read_source(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

fn load(file: &str) -> Result<Program, Box<dyn std::error::Error>> {
    let source = read_source(file)?;
    parse(&source).map_err(|err| {
        let (line, col) = err.position();
        format!("{file}:{line}:{col}: {err}").into()
    })
}

/// Prints diagnostics and decides whether they stop the command.
fn gate(report: &Report, deny: bool) -> Result<(), Box<dyn std::error::Error>> {
    if report.is_clean() {
        return Ok(());
    }
    for (pass, message) in report.iter() {
        eprintln!("{pass}: {message}");
    }
    if deny {
        return Err(format!(
            "{} diagnostic(s); pass --allow-diagnostics to continue",
            report.len()
        )
        .into());
    }
    warn!(diagnostics = report.len(), "continuing despite diagnostics");
    Ok(())
}

fn summary(program: &Program) -> Vec<String> {
    program
        .definitions
        .iter()
        .map(|def| match def {
            Definition::Type(def) => format!("type {} = {}", def.name, def.type_expr),
            Definition::Graph(graph) => {
                let inputs: Vec<String> = graph
                    .inputs
                    .iter()
                    .map(|(name, ty)| format!("{name}: {ty}"))
                    .collect();
                let effects: Vec<&str> = graph.effects.iter().map(|e| e.name()).collect();
                format!(
                    "graph {}({}) -> {} [{}]",
                    graph.name,
                    inputs.join(", "),
                    graph.output,
                    effects.join(" ")
                )
            }
        })
        .collect()
}
