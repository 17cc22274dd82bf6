//! WebSocket game server: one task per connection, plain HTTP status page on
//! `GET /`.

use super::protocol::{ClientMessage, PlayerView, ServerMessage};
use crate::core::action::Action;
use crate::core::game_state::PlayerRecord;
use crate::persistence::{PlayerStore, StoreError};
use crate::session::{Outbox, Saver, Session, SessionRegistry};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const STATUS_PAGE: &str = "<!doctype html><html><head><title>moondust</title></head>\
<body><h1>Server on</h1><p>Connect a client over WebSocket on this port.</p></body></html>";

/// One client connection and, once authenticated, its session.
pub struct Connection {
    session: Option<Arc<Session>>,
    outbox: Outbox,
}

impl Connection {
    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    /// Queues a message for the client. Returns false once the connection
    /// has gone away.
    fn reply(&self, message: ServerMessage) -> bool {
        self.outbox.send(message).is_ok()
    }
}

/// Shared state behind every connection task.
pub struct GameServer {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn PlayerStore>,
    saver: Saver,
}

impl GameServer {
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn PlayerStore>) -> Self {
        let saver = Saver::new(Arc::clone(&registry), Arc::clone(&store));
        Self {
            registry,
            store,
            saver,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn saver(&self) -> &Saver {
        &self.saver
    }

    /// Opens a connection; the receiver yields everything sent to the client.
    pub fn connect(&self) -> (Connection, mpsc::UnboundedReceiver<ServerMessage>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        (
            Connection {
                session: None,
                outbox,
            },
            rx,
        )
    }

    /// Handles one raw text frame from the client.
    pub async fn handle_text(&self, conn: &mut Connection, text: &str) {
        match ClientMessage::parse(text) {
            Ok(message) => self.handle_message(conn, message).await,
            Err(e) => {
                debug!(error = %e, "unparseable client message");
                conn.reply(ServerMessage::error(format!("invalid message: {e}")));
            }
        }
    }

    pub async fn handle_message(&self, conn: &mut Connection, message: ClientMessage) {
        match message {
            ClientMessage::Register { nickname } => self.register(conn, nickname).await,
            ClientMessage::Authenticate { token } => self.authenticate(conn, token).await,
            other => match other.action() {
                Ok(Some(action)) => self.act(conn, action).await,
                Ok(None) => {}
                Err(e) => {
                    conn.reply(ServerMessage::error(e.to_string()));
                }
            },
        }
    }

    async fn run_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PlayerStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    async fn register(&self, conn: &mut Connection, nickname: String) {
        if conn.session.is_some() {
            conn.reply(ServerMessage::error("already authenticated"));
            return;
        }

        let record = match self.run_store(move |store| store.create(&nickname)).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "registration failed");
                conn.reply(ServerMessage::error(format!("registration failed: {e}")));
                return;
            }
        };

        let token = record.token.clone();
        let nickname = record.nickname.clone();
        match self.registry.attach(record, conn.outbox.clone()).await {
            Some(session) => {
                info!(player = %session.player_id(), %nickname, "player registered");
                let state = session.view().await;
                conn.session = Some(session);
                conn.reply(ServerMessage::Registered { token, state });
            }
            None => {
                conn.reply(ServerMessage::error("player already connected"));
            }
        }
    }

    async fn authenticate(&self, conn: &mut Connection, token: String) {
        if conn.session.is_some() {
            conn.reply(ServerMessage::error("already authenticated"));
            return;
        }
        if token.is_empty() {
            conn.reply(ServerMessage::error("no token provided"));
            return;
        }

        let player_id = match self.load(conn, token.clone()).await {
            Some(record) => record.id,
            None => return,
        };

        // Reload under the player's lock so no departure save can land
        // between reading the store and attaching
        let _guard = self.registry.lock_player(player_id).await;
        let Some(record) = self.load(conn, token).await else {
            return;
        };

        let nickname = record.nickname.clone();
        match self.registry.attach(record, conn.outbox.clone()).await {
            Some(session) => {
                info!(player = %session.player_id(), %nickname, "player authenticated");
                let state: PlayerView = session.view().await;
                conn.session = Some(session);
                conn.reply(ServerMessage::Authenticated { state });
            }
            None => {
                conn.reply(ServerMessage::error("player already connected"));
            }
        }
    }

    /// Loads the player owning `token`, reporting failures to the client.
    async fn load(&self, conn: &Connection, token: String) -> Option<PlayerRecord> {
        match self.run_store(move |store| store.find_by_token(&token)).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                info!("authentication failed: unknown token");
                conn.reply(ServerMessage::error("authentication failed: invalid token"));
                None
            }
            Err(e) => {
                warn!(error = %e, "could not load player");
                conn.reply(ServerMessage::error("authentication failed: player data unavailable"));
                None
            }
        }
    }

    async fn act(&self, conn: &mut Connection, action: Action) {
        let Some(session) = conn.session.clone() else {
            conn.reply(ServerMessage::error("not authenticated"));
            return;
        };

        match session.apply(action).await {
            Ok(state) => {
                conn.reply(ServerMessage::GameState { state });
                if action.saves_immediately() {
                    self.saver.spawn_save_session(session);
                }
            }
            Err(e) => {
                debug!(player = %session.player_id(), action = action.name(), error = %e, "action rejected");
                conn.reply(ServerMessage::error(e.to_string()));
            }
        }
    }

    /// Detaches the connection's session and saves it one last time.
    pub async fn disconnect(&self, conn: Connection) {
        let Some(session) = conn.session else {
            debug!("unauthenticated client disconnected");
            return;
        };

        let Some(record) = self.registry.depart(session.id()).await else {
            return;
        };
        info!(player = %record.id, nickname = %record.nickname, "player disconnected");
        self.saver.save_departed(record.id).await;
    }
}

/// Accepts connections until the listener fails.
pub async fn serve(listener: TcpListener, server: Arc<GameServer>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("listening on ws://{addr}");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let server = Arc::clone(&server);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, server).await {
                        warn!(%addr, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "accept error");
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server: Arc<GameServer>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Plain HTTP requests get the status page instead of a websocket
    let mut peek_buf = [0u8; 512];
    let n = stream.peek(&mut peek_buf).await?;
    let request = String::from_utf8_lossy(&peek_buf[..n]);
    if request.starts_with("GET ") && !request.to_ascii_lowercase().contains("upgrade: websocket") {
        serve_status(stream).await?;
        return Ok(());
    }

    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    debug!(%addr, "websocket connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (mut conn, mut outbox_rx) = server.connect();

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "could not encode server message");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => server.handle_text(&mut conn, &text).await,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(%addr, error = %e, "websocket read error");
                break;
            }
            _ => {}
        }
    }

    server.disconnect(conn).await;
    send_task.abort();
    debug!(%addr, "websocket closed");

    Ok(())
}

async fn serve_status(mut stream: TcpStream) -> std::io::Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Consume the request so closing the socket does not reset it
    let mut request = [0u8; 1024];
    let _ = stream.read(&mut request).await?;

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        STATUS_PAGE.len(),
        STATUS_PAGE
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
