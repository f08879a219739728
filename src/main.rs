use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use fontgate::{
    filters::{cli_to_filter, FontFilter, NormalizeWeightClass},
    load, read_all_tables, read_selected_tables,
    schema::resolve_table_key,
    server::{serve, ServeArgs, ServiceConfig},
    FontgateError,
};

/// Read and edit font metadata tables, locally or over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway
    Serve(ServeArgs),

    /// Print the tables of a font as JSON
    Dump {
        /// Font file to read
        font: PathBuf,

        /// Comma-separated tables to print (default: every table)
        #[arg(short, long, value_delimiter = ',')]
        tables: Vec<String>,

        /// Print compact rather than indented JSON
        #[arg(long)]
        compact: bool,
    },

    /// Apply field updates to a font and write the result
    Update {
        /// Font file to read
        input: PathBuf,

        /// Where to write the updated font
        output: PathBuf,

        /// A single field update, as `table.field=value`
        #[arg(short, long = "set", value_name = "TABLE.FIELD=VALUE")]
        set: Vec<String>,

        /// Field updates as a JSON object, as sent in `newData`
        #[arg(short, long, value_name = "JSON")]
        updates: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.into())
        .init();
    if let Err(e) = run(args.command) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), FontgateError> {
    match command {
        Command::Serve(serve_args) => {
            let config = ServiceConfig::try_from(serve_args)?;
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(config))
        }
        Command::Dump {
            font,
            tables,
            compact,
        } => {
            let font = load(font)?;
            let dump = if tables.is_empty() {
                read_all_tables(&font)
            } else {
                let tags = tables
                    .iter()
                    .map(|name| {
                        resolve_table_key(name.trim()).ok_or_else(|| {
                            FontgateError::InvalidRequest(format!("'{}' is not a table name", name))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let dump = read_selected_tables(&font, &tags);
                if dump.is_empty() {
                    return Err(FontgateError::TableNotFound(tables.join(", ")));
                }
                dump
            };
            let json = if compact {
                serde_json::to_string(&dump)?
            } else {
                serde_json::to_string_pretty(&dump)?
            };
            println!("{}", json);
            Ok(())
        }
        Command::Update {
            input,
            output,
            set,
            updates,
        } => {
            let mut font = load(&input)?;
            let mut filters: Vec<Box<dyn FontFilter>> = vec![];
            if let Some(updates) = updates {
                filters.push(cli_to_filter("updates", &updates)?);
            }
            for arg in &set {
                filters.push(cli_to_filter("set", arg)?);
            }
            NormalizeWeightClass::ensure_os2(&mut font)?;
            for filter in &filters {
                filter.apply(&mut font)?;
            }
            NormalizeWeightClass::new().apply(&mut font)?;
            std::fs::write(&output, font.encode()?)?;
            log::info!("Saved {}", output.display());
            Ok(())
        }
    }
}
