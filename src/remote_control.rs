//! Send remote control keys to the TV over its WebSocket remote control channel.
//!
//! Each key press is a short-lived session:
//!
//! 1. Connect to `ws://<ip>:8001/api/v2/channels/samsung.remote.control?name=<base64 app name>`.
//! 2. Wait for the TV's authorization frame (`ms.channel.connect`).
//! 3. Send the key as a JSON text frame.
//! 4. Wait for the TV to act on the key (closing too early drops the command).
//! 5. Send a normal-closure close frame and drop the connection.
//!
//! Any failure aborts the session and is reported as the [`TvError`] variant for that stage. The
//! connection is released on every exit path.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, info, warn};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::{Error, Message};

use crate::helpers::remote_control_url;
use crate::remote_payloads::{ChannelEvent, CHANNEL_CONNECT_EVENT, CHANNEL_UNAUTHORIZED_EVENT};
use crate::{ControllerSettings, RemoteKey, TvError};

/// Sends remote control commands to a TV.
#[async_trait]
pub trait RemoteCommander: Send + Sync {
    /// Send a single remote key to the TV.
    async fn send_key(&self, ip_address: &str, key: RemoteKey) -> Result<(), TvError>;

    /// Send the power key, which turns a running TV off.
    async fn send_power_off(&self, ip_address: &str) -> Result<(), TvError> {
        self.send_key(ip_address, RemoteKey::Power).await
    }
}

/// [`RemoteCommander`] which opens one WebSocket session per key.
#[derive(Debug, Clone)]
pub struct WebSocketRemote {
    port: u16,
    app_name: String,
    handshake_timeout: Duration,
    auth_timeout: Duration,
    settle_delay: Duration,
}

impl WebSocketRemote {
    pub fn new(settings: &ControllerSettings) -> Self {
        WebSocketRemote {
            port: settings.remote_port,
            app_name: settings.app_name.clone(),
            handshake_timeout: settings.handshake_timeout,
            auth_timeout: settings.auth_timeout,
            settle_delay: settings.command_settle_delay,
        }
    }
}

impl Default for WebSocketRemote {
    fn default() -> Self {
        WebSocketRemote::new(&ControllerSettings::default())
    }
}

#[async_trait]
impl RemoteCommander for WebSocketRemote {
    async fn send_key(&self, ip_address: &str, key: RemoteKey) -> Result<(), TvError> {
        let url = remote_control_url(ip_address, self.port, &self.app_name)?;

        info!("Attempting to connect to TV remote control at: {}", &url);

        let ws_stream = match timeout(self.handshake_timeout, connect_async(url.as_str())).await {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                return Err(match e {
                    Error::Io(e) => TvError::ConnectError(e.to_string()),
                    _ => TvError::ConnectError(format!("{e}")),
                });
            }
            Err(_) => return Err(TvError::ConnectError("Connection timeout".into())),
        };

        debug!("WebSocket handshake has been successfully completed");

        run_session(ws_stream, key, self.auth_timeout, self.settle_delay).await
    }
}

/// Run the authorize/command/settle/close sequence over an established WebSocket.
pub(crate) async fn run_session<S>(
    mut ws: S,
    key: RemoteKey,
    auth_timeout: Duration,
    settle_delay: Duration,
) -> Result<(), TvError>
where
    S: Stream<Item = Result<Message, Error>> + Sink<Message, Error = Error> + Unpin,
{
    match timeout(auth_timeout, wait_for_authorization(&mut ws)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(TvError::HandshakeError(
                "Timed out waiting for authorization frame".into(),
            ))
        }
    }

    let payload: String = key.into();
    debug!("Sending remote key {}: {}", key, &payload);

    ws.send(Message::Text(payload))
        .await
        .map_err(|e| TvError::CommandError(format!("{e}")))?;

    // The TV acts on the key asynchronously; closing right away can drop it.
    sleep(settle_delay).await;

    ws.send(Message::Close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    })))
    .await
    .map_err(|e| TvError::CloseError(format!("{e}")))?;

    info!("Remote key {} delivered and connection closed", key);

    Ok(())
}

/// Read the first data frame from the TV and treat it as the authorization result.
async fn wait_for_authorization<S>(ws: &mut S) -> Result<(), TvError>
where
    S: Stream<Item = Result<Message, Error>> + Unpin,
{
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return check_authorization(&text),
            Some(Ok(Message::Binary(data))) => {
                debug!("Received binary authorization frame ({} bytes)", data.len());
                return Ok(());
            }
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                debug!("Skipping control frame while waiting for authorization");
            }
            Some(Ok(Message::Close(frame))) => {
                return Err(TvError::HandshakeError(match frame {
                    Some(frame) => format!("TV closed connection: {} {}", frame.code, frame.reason),
                    None => "TV closed connection".into(),
                }));
            }
            Some(Ok(Message::Frame(_))) => {
                debug!("Skipping raw frame while waiting for authorization");
            }
            Some(Err(e)) => return Err(TvError::HandshakeError(format!("{e}"))),
            None => {
                return Err(TvError::HandshakeError(
                    "Connection ended before authorization frame".into(),
                ))
            }
        }
    }
}

fn check_authorization(text: &str) -> Result<(), TvError> {
    match serde_json::from_str::<ChannelEvent>(text) {
        Ok(event) if event.event == CHANNEL_UNAUTHORIZED_EVENT => {
            warn!("TV denied remote control access");
            Err(TvError::HandshakeError(
                "Remote control access denied by TV".into(),
            ))
        }
        Ok(event) if event.event == CHANNEL_CONNECT_EVENT => {
            debug!(
                "TV granted remote control access (client id: {})",
                event.client_id().unwrap_or("unknown")
            );
            Ok(())
        }
        Ok(event) => {
            warn!(
                "Unexpected TV channel event {}, continuing as authorized",
                event.event
            );
            Ok(())
        }
        Err(e) => {
            // Not fatal: the frame is only an acknowledgment
            debug!("Unrecognized authorization frame ({}): {:?}", e, text);
            Ok(())
        }
    }
}

// ================================================================================================
// Tests

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use std::time::Duration;

    use futures_util::{Sink, SinkExt, Stream, StreamExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::time::Instant;
    use tokio_tungstenite::{accept_async, accept_hdr_async};
    use tungstenite::handshake::server::{ErrorResponse, Request, Response};
    use tungstenite::protocol::frame::coding::CloseCode;
    use tungstenite::{Error, Message};

    use super::{run_session, RemoteCommander, WebSocketRemote};
    use crate::{ControllerSettingsBuilder, RemoteKey, TvError};

    const CONNECT_EVENT: &str =
        r#"{"data":{"clients":[],"id":"a1b2c3"},"event":"ms.channel.connect"}"#;
    const POWER_PAYLOAD: &str = r#"{"method":"ms.remote.control","params":{"Cmd":"Click","DataOfCmd":"KEY_POWER","Option":"false","TypeOfRemote":"SendRemoteKey"}}"#;

    const AUTH_TIMEOUT: Duration = Duration::from_secs(30);
    const SETTLE: Duration = Duration::from_millis(750);

    // --------------------------------------------------------------------------------------------
    // Scripted in-memory WebSocket

    /// In-memory stand-in for a WebSocket: yields scripted frames and records sent frames.
    struct ScriptedSocket {
        incoming: VecDeque<Result<Message, Error>>,
        sent: Vec<(Instant, Message)>,
        fail_send_at: Option<usize>,
    }

    impl ScriptedSocket {
        fn new(incoming: Vec<Result<Message, Error>>) -> Self {
            ScriptedSocket {
                incoming: incoming.into(),
                sent: Vec::new(),
                fail_send_at: None,
            }
        }

        fn failing_send_at(mut self, index: usize) -> Self {
            self.fail_send_at = Some(index);
            self
        }
    }

    impl Stream for ScriptedSocket {
        type Item = Result<Message, Error>;

        fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Poll::Ready(self.incoming.pop_front())
        }
    }

    impl Sink<Message> for ScriptedSocket {
        type Error = Error;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(mut self: Pin<&mut Self>, item: Message) -> Result<(), Error> {
            if self.fail_send_at == Some(self.sent.len()) {
                return Err(Error::ConnectionClosed);
            }

            self.sent.push((Instant::now(), item));
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn session_sends_command_then_closes_after_settle_delay() {
        let mut socket = ScriptedSocket::new(vec![Ok(Message::Text(CONNECT_EVENT.into()))]);

        run_session(&mut socket, RemoteKey::Power, AUTH_TIMEOUT, SETTLE)
            .await
            .unwrap();

        assert_eq!(socket.sent.len(), 2);

        let (command_at, command) = &socket.sent[0];
        assert_eq!(command, &Message::Text(POWER_PAYLOAD.into()));

        let (close_at, close) = &socket.sent[1];
        match close {
            Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Normal),
            other => panic!("expected close frame, got {other:?}"),
        }

        assert!(close_at.duration_since(*command_at) >= SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn session_skips_control_frames_before_authorization() {
        let mut socket = ScriptedSocket::new(vec![
            Ok(Message::Ping(vec![1, 2, 3])),
            Ok(Message::Pong(vec![])),
            Ok(Message::Text("not json".into())),
        ]);

        run_session(&mut socket, RemoteKey::Power, AUTH_TIMEOUT, SETTLE)
            .await
            .unwrap();

        assert_eq!(socket.sent[0].1, Message::Text(POWER_PAYLOAD.into()));
    }

    #[tokio::test(start_paused = true)]
    async fn session_accepts_unexpected_channel_event_as_authorization() {
        let mut socket = ScriptedSocket::new(vec![Ok(Message::Text(
            r#"{"event":"ms.channel.clientConnect","data":{}}"#.into(),
        ))]);

        run_session(&mut socket, RemoteKey::Power, AUTH_TIMEOUT, SETTLE)
            .await
            .unwrap();

        assert_eq!(socket.sent.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn session_handshake_errors() {
        let cases = vec![
            vec![],
            vec![Err(Error::ConnectionClosed)],
            vec![Ok(Message::Close(None))],
            vec![Ok(Message::Text(r#"{"event":"ms.channel.unauthorized"}"#.into()))],
        ];

        for incoming in cases {
            let mut socket = ScriptedSocket::new(incoming);

            assert!(matches!(
                run_session(&mut socket, RemoteKey::Power, AUTH_TIMEOUT, SETTLE).await,
                Err(TvError::HandshakeError(_))
            ));
            assert!(socket.sent.is_empty(), "nothing is sent after a failed handshake");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn session_command_error() {
        let mut socket = ScriptedSocket::new(vec![Ok(Message::Text(CONNECT_EVENT.into()))])
            .failing_send_at(0);

        assert!(matches!(
            run_session(&mut socket, RemoteKey::Power, AUTH_TIMEOUT, SETTLE).await,
            Err(TvError::CommandError(_))
        ));
        assert!(socket.sent.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn session_close_error() {
        let mut socket = ScriptedSocket::new(vec![Ok(Message::Text(CONNECT_EVENT.into()))])
            .failing_send_at(1);

        assert!(matches!(
            run_session(&mut socket, RemoteKey::Power, AUTH_TIMEOUT, SETTLE).await,
            Err(TvError::CloseError(_))
        ));

        // The command was delivered before the close failed
        assert_eq!(socket.sent.len(), 1);
        assert_eq!(socket.sent[0].1, Message::Text(POWER_PAYLOAD.into()));
    }

    // --------------------------------------------------------------------------------------------
    // Loopback WebSocket server

    fn remote_for_port(port: u16) -> WebSocketRemote {
        WebSocketRemote::new(&ControllerSettingsBuilder::new().with_remote_port(port).build())
    }

    #[tokio::test]
    async fn send_power_off_against_mock_tv() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (result_tx, result_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let request_uri = Arc::new(Mutex::new(String::new()));
            let request_uri_clone = Arc::clone(&request_uri);

            let callback =
                move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                    *request_uri_clone.lock().unwrap() = request.uri().to_string();
                    Ok(response)
                };

            let mut ws = accept_hdr_async(stream, callback).await.unwrap();

            ws.send(Message::Text(CONNECT_EVENT.into())).await.unwrap();

            let command = ws.next().await.unwrap().unwrap();
            let command_at = Instant::now();
            let close = ws.next().await.unwrap().unwrap();
            let close_at = Instant::now();

            let uri = request_uri.lock().unwrap().clone();
            let _ = result_tx.send((uri, command, close, close_at.duration_since(command_at)));
        });

        remote_for_port(port)
            .send_power_off("127.0.0.1")
            .await
            .unwrap();

        let (uri, command, close, settle) = result_rx.await.unwrap();

        assert_eq!(
            uri,
            "/api/v2/channels/samsung.remote.control?name=U2Ftc3VuZ1R2UmVtb3Rl"
        );
        assert_eq!(command, Message::Text(POWER_PAYLOAD.into()));
        match close {
            Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Normal),
            other => panic!("expected close frame, got {other:?}"),
        }
        assert!(settle >= Duration::from_millis(700), "{settle:?}");
    }

    #[tokio::test]
    async fn send_power_off_connect_error_when_nothing_listens() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        assert!(matches!(
            remote_for_port(port).send_power_off("127.0.0.1").await,
            Err(TvError::ConnectError(_))
        ));
    }

    #[tokio::test]
    async fn send_power_off_connect_error_on_handshake_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            // Accept TCP but never answer the HTTP upgrade
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let start = std::time::Instant::now();

        assert!(matches!(
            remote_for_port(port).send_power_off("127.0.0.1").await,
            Err(TvError::ConnectError(_))
        ));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn send_power_off_handshake_error_when_tv_hangs_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let _ = ws.close(None).await;
        });

        assert!(matches!(
            remote_for_port(port).send_power_off("127.0.0.1").await,
            Err(TvError::HandshakeError(_))
        ));
    }

    #[tokio::test]
    async fn send_power_off_invalid_host() {
        assert!(matches!(
            WebSocketRemote::default().send_power_off("").await,
            Err(TvError::InvalidAddress(_))
        ));
    }
}
