use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::EnvFilter;

use tabuladb::demo::load_demo_tables;
use tabuladb::frame::DataFrame;
use tabuladb::{QueryResultSet, Session};

const HISTORY_FILE: &str = ".tabula_history";

#[derive(Parser)]
#[command(author, version, about = "TabulaDB CLI - run SQL over in-memory tables")]
struct Cli {
    /// Register the demonstration tables (data, bird_sightings) before running
    #[arg(long)]
    demo: bool,

    /// How results are printed
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log filter, e.g. `debug` or `tabuladb=trace` (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive shell
    Shell,

    /// Execute a SQL statement directly
    Query {
        /// SQL statement to execute
        query: String,
    },

    /// Execute a file of `;`-separated SQL statements
    Script {
        /// Path to the SQL file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Bordered grid with a row count
    Table,
    /// Dataframe-style listing with a row index
    Frame,
    /// JSON array of row objects
    Json,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second initialisation only fails when a subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn render(result: &QueryResultSet, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => result.to_string_table(),
        OutputFormat::Frame => DataFrame::from_result_set(result)?.to_string(),
        OutputFormat::Json => DataFrame::from_result_set(result)?.to_json_pretty()?,
    })
}

fn run_shell(session: &mut Session, format: OutputFormat) -> Result<()> {
    println!("Welcome to TabulaDB. Type 'help' for assistance or 'exit' to quit.");

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    if let Err(err) = rl.load_history(HISTORY_FILE) {
        if !err.to_string().contains("No such file or directory") {
            eprintln!("Error loading history: {}", err);
        }
    }

    loop {
        match rl.readline("tabula> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let lower = line.to_lowercase();
                match lower.as_str() {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "tables" => {
                        for name in session.tables() {
                            println!("{}", name);
                        }
                    }
                    _ if lower.starts_with("explain ") => match session.explain(line.get("explain ".len()..).unwrap_or("")) {
                        Ok(plan) => println!("{}", plan),
                        Err(err) => eprintln!("Error: {}", err),
                    },
                    _ => match session.execute_result_set(line) {
                        Ok(result) => match render(&result, format) {
                            Ok(text) => println!("{}", text),
                            Err(err) => eprintln!("Error: {}", err),
                        },
                        Err(err) => eprintln!("Error: {}", err),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        eprintln!("Error saving history: {}", err);
    }
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  CREATE TABLE <name> (...)     - Create a new table");
    println!("  INSERT INTO <table> VALUES    - Insert rows into a table");
    println!("  SELECT ... FROM <table>       - Query tables");
    println!("  DROP TABLE [IF EXISTS] <name> - Remove a created table");
    println!();
    println!("Aggregation functions:");
    println!("  COUNT(*)                      - Count rows in a table or group");
    println!("  SUM(<column>)                 - Calculate sum of values in a column");
    println!("  AVG(<column>)                 - Calculate average of values in a column");
    println!("  MIN(<column>)                 - Find minimum value in a column");
    println!("  MAX(<column>)                 - Find maximum value in a column");
    println!();
    println!("Grouping and ordering:");
    println!("  GROUP BY <columns>            - Group results by columns");
    println!("  HAVING <condition>            - Filter groups based on aggregate values");
    println!("  ORDER BY <expr> [ASC|DESC]    - Sort results");
    println!("  LIMIT <n> [OFFSET <m>]        - Keep a window of the results");
    println!();
    println!("Other commands:");
    println!("  explain <select>              - Show the query plan");
    println!("  tables                        - List tables");
    println!("  help                          - Display this help message");
    println!("  exit                          - Exit the CLI");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut session = Session::new();
    if cli.demo {
        load_demo_tables(&mut session).context("Failed to load demo tables")?;
    }

    match &cli.command {
        Some(Commands::Shell) | None => run_shell(&mut session, cli.format)?,
        Some(Commands::Query { query }) => {
            let result = session.execute_result_set(query)?;
            println!("{}", render(&result, cli.format)?);
        }
        Some(Commands::Script { path }) => {
            let script = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            let result = session.execute_script_result_set(&script)?;
            println!("{}", render(&result, cli.format)?);
        }
    }

    Ok(())
}
