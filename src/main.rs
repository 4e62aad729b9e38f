use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tabledeck::{
    commands,
    models::{TableEvent, CONFIRMED_COLUMN},
    value_utils::value_display,
    AppState,
};

#[derive(Parser)]
#[command(name = "tabledeck")]
#[command(about = "Import tabular files into a local table, search, confirm, export")]
#[command(version)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".tabledeck",
        help = "Directory holding the persistent table"
    )]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Import a CSV or Excel file, replacing the current table")]
    Import {
        #[arg(help = "Path to a .csv, .xlsx, or .xls file")]
        file: PathBuf,
    },
    #[command(about = "List rows, optionally filtered by a search query")]
    Rows {
        #[arg(long, short, help = "Substring to match against every column")]
        search: Option<String>,
        #[arg(long, help = "Show at most this many rows")]
        limit: Option<usize>,
    },
    #[command(about = "Show one row in detail")]
    Show {
        #[arg(help = "Row identity as printed by `rows`")]
        id: u64,
    },
    #[command(about = "Mark a row as confirmed")]
    Confirm {
        #[arg(help = "Row identity as printed by `rows`")]
        id: u64,
    },
    #[command(about = "Remove all rows from the table")]
    Clear {
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Export the table to an xlsx workbook")]
    Export {
        #[arg(long, short, help = "Destination path (default: exported_data.xlsx)")]
        out: Option<PathBuf>,
    },
    #[command(about = "Show row and column statistics")]
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let state = AppState::new(&cli.data_dir).map_err(|err| err.to_string())?;
    state.store.subscribe(Box::new(|event| match event {
        TableEvent::Replaced { total_rows } => {
            println!("[debug] table replaced, {} rows", total_rows)
        }
        TableEvent::Updated { id } => println!("[debug] row {} updated", id),
        TableEvent::Cleared => println!("[debug] table cleared"),
    }));

    match cli.command {
        Commands::Import { file } => {
            let outcome = commands::import_file(&state, &file)?;
            println!(
                "imported {} rows across {} columns",
                outcome.rows_imported,
                outcome.columns.len()
            );
        }
        Commands::Rows { search, limit } => {
            let response = commands::query_rows(&state, search.as_deref(), limit)?;
            for record in &response.rows {
                let line = serde_json::to_string(record).map_err(|err| err.to_string())?;
                println!("{}", line);
            }
            println!(
                "{} of {} rows matched",
                response.matched_rows, response.total_rows
            );
        }
        Commands::Show { id } => {
            let record = commands::get_row(&state, id)?;
            for column in state.store.columns() {
                if column == CONFIRMED_COLUMN {
                    continue;
                }
                let value = record.data.get(&column);
                println!(
                    "{}: {}",
                    column,
                    value.map(value_display).unwrap_or_else(|| "-".to_string())
                );
            }
            println!(
                "confirmed: {}",
                if record.is_confirmed() { "yes" } else { "no" }
            );
        }
        Commands::Confirm { id } => {
            commands::confirm_row(&state, id)?;
            println!("row {} confirmed", id);
        }
        Commands::Clear { yes } => {
            if !yes && !ask_confirmation()? {
                println!("aborted");
                return Ok(());
            }
            commands::clear_table(&state)?;
            println!("table cleared");
        }
        Commands::Export { out } => {
            let destination = commands::export_table(&state, out.as_deref())?;
            println!("exported to {}", destination.display());
        }
        Commands::Stats => {
            let stats = commands::table_stats(&state)?;
            println!("total rows: {}", stats.total_rows);
            println!("confirmed rows: {}", stats.confirmed_rows);
            println!("columns: {}", stats.columns.join(", "));
            if let Some(meta) = stats.meta {
                println!("source: {}", meta.source_name);
                println!("imported at: {}", meta.imported_at);
            }
        }
    }
    Ok(())
}

fn ask_confirmation() -> Result<bool, String> {
    print!("Are you sure you want to remove the current data? [y/N] ");
    io::stdout().flush().map_err(|err| err.to_string())?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| err.to_string())?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
