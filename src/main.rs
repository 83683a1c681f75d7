use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tabledb::{
    open_database, start_server, ServerConfig, SessionManager, StoreConfig, TableHandler, Verb,
};

#[derive(Parser, Debug)]
#[command(name = "tabledb", about = "Multi-tenant table store")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON-RPC API until Ctrl-C.
    Serve(StoreArgs),
    /// Run commands locally as a single user.
    Shell(StoreArgs),
}

#[derive(Args, Debug)]
struct StoreArgs {
    #[arg(long, env = "TABLEDB_HOST", default_value = "127.0.0.1")]
    host: String,
    #[arg(long, env = "TABLEDB_PORT", default_value_t = 8000)]
    port: u16,
    #[arg(long, env = "TABLEDB_THREADS", default_value_t = 3)]
    threads: usize,
    /// JSON snapshot file; the store is in-memory when omitted.
    #[arg(long, env = "TABLEDB_DATA_FILE")]
    data_file: Option<PathBuf>,
    /// Session lifetime in seconds.
    #[arg(long, env = "TABLEDB_SESSION_TTL", default_value_t = 3600)]
    session_ttl: u64,
    /// Check record arity and value types against the table schema.
    #[arg(long, env = "TABLEDB_STRICT_RECORDS")]
    strict_records: bool,
}

impl From<StoreArgs> for ServerConfig {
    fn from(args: StoreArgs) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            threads: args.threads,
            data_file: args.data_file,
            session_ttl: Duration::from_secs(args.session_ttl),
            store: StoreConfig {
                strict_records: args.strict_records,
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => serve(args.into()),
        Command::Shell(args) => shell(args.into()),
    }
}

fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let server = start_server(&config)?;

    // The HTTP server runs its own threads; this runtime only waits for Ctrl-C.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(tokio::signal::ctrl_c())?;

    tracing::info!("shutting down");
    server.close();
    Ok(())
}

fn shell(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(&config)?;
    let mut handler = TableHandler::new(Arc::new(Mutex::new(db)));
    if let Some(path) = &config.data_file {
        handler = handler.with_data_file(path);
    }

    let user_id = match handler.authenticate("local", "local") {
        Ok(user_id) => user_id,
        Err(_) => handler.sign_up("local", "local")?,
    };
    let mut sessions = SessionManager::new(config.session_ttl);
    let mut session = sessions.open(user_id);

    println!("Welcome to tabledb. Type 'exit' or 'quit' to leave.");
    loop {
        let mut input = String::new();
        print!("tabledb> ");
        std::io::stdout().flush()?;
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }
        if input.is_empty() {
            continue;
        }
        let (verb, body) = input.split_once(' ').unwrap_or((input, ""));
        session = sessions.refresh(session);
        match verb.parse::<Verb>() {
            Ok(verb) => println!("{}", handler.handle(verb, Some(&session), body).message),
            Err(message) => println!("{}", message),
        }
    }
    Ok(())
}
