use crate::config::ServerConfig;
use crate::database::Database;
use crate::error::StoreError;
use crate::handlers::{Response, TableHandler, Verb};
use crate::session::{unix_now, Session, SessionManager};
use jsonrpc_core::{Error, ErrorCode, IoHandler, Result};
use jsonrpc_derive::rpc;
use jsonrpc_http_server::ServerBuilder;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error as ThisError;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(ThisError, Debug)]
pub enum ServerError {
    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("failed to start server: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[rpc]
pub trait Rpc {
    #[rpc(name = "ping")]
    fn ping(&self) -> Result<String>;

    #[rpc(name = "sign_up")]
    fn sign_up(&self, username: String, password: String) -> Result<u64>;

    #[rpc(name = "sign_in")]
    fn sign_in(&self, username: String, password: String) -> Result<Session>;

    #[rpc(name = "sign_out")]
    fn sign_out(&self, session_id: Uuid) -> Result<bool>;

    /// Runs one table command on behalf of the session's user.
    #[rpc(name = "execute")]
    fn execute(&self, session_id: Uuid, verb: String, body: String) -> Result<Response>;

    #[rpc(name = "list_verbs")]
    fn list_verbs(&self) -> Result<Vec<String>>;
}

pub struct RpcServer {
    handler: TableHandler,
    sessions: Arc<Mutex<SessionManager>>,
}

fn rpc_error(message: impl ToString) -> Error {
    Error {
        code: ErrorCode::ServerError(1),
        message: message.to_string(),
        data: None,
    }
}

impl RpcServer {
    pub fn new(handler: TableHandler, sessions: SessionManager) -> Self {
        RpcServer {
            handler,
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }

    fn sessions(&self) -> Result<std::sync::MutexGuard<'_, SessionManager>> {
        self.sessions
            .lock()
            .map_err(|_| rpc_error("session registry unavailable"))
    }
}

impl Rpc for RpcServer {
    fn ping(&self) -> Result<String> {
        Ok("pong".to_string())
    }

    fn sign_up(&self, username: String, password: String) -> Result<u64> {
        self.handler
            .sign_up(&username, &password)
            .map_err(rpc_error)
    }

    fn sign_in(&self, username: String, password: String) -> Result<Session> {
        let user_id = self
            .handler
            .authenticate(&username, &password)
            .map_err(rpc_error)?;
        let mut sessions = self.sessions()?;
        sessions.sweep_expired(unix_now());
        Ok(sessions.open(user_id))
    }

    fn sign_out(&self, session_id: Uuid) -> Result<bool> {
        Ok(self.sessions()?.sign_out(session_id).is_ok())
    }

    fn execute(&self, session_id: Uuid, verb: String, body: String) -> Result<Response> {
        let verb = match verb.parse::<Verb>() {
            Ok(verb) => verb,
            Err(message) => return Ok(Response::error(message)),
        };
        // release the registry before touching the store
        let session = self.sessions()?.resolve(session_id);
        Ok(self.handler.handle(verb, session.as_ref(), &body))
    }

    fn list_verbs(&self) -> Result<Vec<String>> {
        Ok(Verb::ALL.iter().map(|v| v.as_str().to_string()).collect())
    }
}

/// Loads the configured snapshot, or starts empty when there is none yet.
pub fn open_database(config: &ServerConfig) -> std::result::Result<Database, StoreError> {
    let mut db = match &config.data_file {
        Some(path) if path.exists() => {
            let db = Database::load_from_file(path)?;
            info!(path = %path.display(), tables = db.table_count(), "loaded snapshot");
            db
        }
        _ => Database::new(),
    };
    db.set_config(config.store);
    Ok(db)
}

pub fn start_server(
    config: &ServerConfig,
) -> std::result::Result<jsonrpc_http_server::Server, ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let db = open_database(config)?;

    let mut handler = TableHandler::new(Arc::new(Mutex::new(db)));
    if let Some(path) = &config.data_file {
        handler = handler.with_data_file(path);
    }
    if config.store.strict_records {
        warn!("strict record validation enabled");
    }

    let rpc = RpcServer::new(handler, SessionManager::new(config.session_ttl));
    let mut io = IoHandler::new();
    io.extend_with(rpc.to_delegate());

    let server = ServerBuilder::new(io)
        .threads(config.threads)
        .start_http(&addr)?;

    info!(address = %server.address(), "RPC server running");
    Ok(server)
}
