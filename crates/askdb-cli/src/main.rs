//! askdb CLI — ask questions of a SQL database in natural language.
//!
//! Reuses the same workflow (askdb-core) and server bootstrap
//! (askdb-server) that back the HTTP API.

mod commands;

use clap::{Parser, Subcommand};

/// askdb — natural-language questions over a SQL database
#[derive(Parser)]
#[command(name = "askdb", version, about = "askdb — natural-language questions over a SQL database")]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, env = "ASKDB_CONFIG")]
    config: Option<String>,

    /// Path to the SQLite database file (overrides the config file)
    #[arg(long, env = "ASKDB_DB_PATH")]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the askdb HTTP backend server
    Server {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },

    /// Ask one question and print the response JSON
    Ask {
        /// The question, in plain language
        question: String,
        /// Earlier conversation turns (repeatable)
        #[arg(long)]
        history: Vec<String>,
    },

    /// Print the schema description the SQL generator sees
    Schema,

    /// Create and fill the demo `departments` / `employees` tables
    SeedDemo,
}

#[tokio::main]
async fn main() {
    // .env.local wins over .env; neither overrides the real environment
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askdb_core=warn,askdb_server=info,askdb_cli=info".into()),
        )
        .init();

    let result = match cli.command {
        Some(command) => match commands::load_config(cli.config.as_deref(), cli.db.as_deref()) {
            Ok(config) => match command {
                Commands::Server { host, port } => commands::server::run(host, port, config).await,
                Commands::Ask { question, history } => {
                    commands::ask::run(&config, &question, history).await
                }
                Commands::Schema => commands::schema::run(&config).await,
                Commands::SeedDemo => commands::seed::run(&config).await,
            },
            Err(e) => Err(e),
        },
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
