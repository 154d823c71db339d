use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use futures::StreamExt;
use hh_protocol::{ClientMessage, ErrorCode, ServerMessage, SpectatorClientMessage, WireCodec};
use log::{debug, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::oneshot;

use crate::intent::Intent;

/// The single table's HTTP/WebSocket front door: `/ws` for bots, `/spectate`
/// for spectators and operators. One `Server` per process — this workspace
/// hosts exactly one table (§1), so there is no room-id routing layer the
/// way the teacher's `Casino` needs for its many concurrent rooms.
pub struct Server;

impl Server {
    pub async fn run(intents: UnboundedSender<Intent>, bind_addr: String) -> std::io::Result<()> {
        let state = web::Data::new(intents);
        log::info!("starting table server on {bind_addr}");
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
                .app_data(state.clone())
                .route("/ws", web::get().to(bot_route))
                .route("/spectate", web::get().to(spectator_route))
        })
        .bind(bind_addr)?
        .run()
        .await
    }
}

async fn bot_route(
    intents: web::Data<UnboundedSender<Intent>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            actix_web::rt::spawn(bridge_bot(intents.get_ref().clone(), session, stream));
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn spectator_route(
    intents: web::Data<UnboundedSender<Intent>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            actix_web::rt::spawn(bridge_spectator(intents.get_ref().clone(), session, stream));
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Bridges one `/ws` connection to the session loop: the first frame must be
/// `hello`, everything after is an `action`. Mirrors the teacher's
/// `Casino::bridge` select-loop, but the hello handshake happens inline
/// rather than being pre-established by a `/start`/`/enter` split, since
/// this table has no lobby endpoint to seat a bot ahead of the socket.
async fn bridge_bot(intents: UnboundedSender<Intent>, mut session: actix_ws::Session, mut stream: actix_ws::MessageStream) {
    let seat = match await_bot_hello(&intents, &mut session, &mut stream).await {
        Some(seat) => seat,
        None => return,
    };

    loop {
        match stream.next().await {
            Some(Ok(actix_ws::Message::Text(text))) => match WireCodec::decode_client(&text) {
                Ok(ClientMessage::Action { hand_id, action, amount, .. }) => {
                    let _ = intents.send(Intent::BotAction { seat, hand_id, action, amount });
                }
                Ok(ClientMessage::Hello { .. }) => {
                    let _ = session
                        .text(ServerMessage::error(ErrorCode::BadSchema, "hello already completed").to_json())
                        .await;
                }
                Err(err) => {
                    let _ = session.text(ServerMessage::error(err.code(), err.message()).to_json()).await;
                }
            },
            Some(Ok(actix_ws::Message::Close(_))) | None => break,
            Some(Err(_)) => break,
            _ => continue,
        }
    }
    let _ = intents.send(Intent::BotDisconnect { seat });
    debug!("[ws] seat {seat} connection closed");
}

async fn await_bot_hello(
    intents: &UnboundedSender<Intent>,
    session: &mut actix_ws::Session,
    stream: &mut actix_ws::MessageStream,
) -> Option<usize> {
    let (outbox_tx, mut outbox_rx) = unbounded_channel::<ServerMessage>();
    loop {
        let text = match stream.next().await {
            Some(Ok(actix_ws::Message::Text(text))) => text,
            Some(Ok(actix_ws::Message::Close(_))) | None => return None,
            Some(Err(_)) => return None,
            _ => continue,
        };
        match WireCodec::decode_client(&text) {
            Ok(ClientMessage::Hello { team, join_code, .. }) => {
                let (reply_to, reply_rx) = oneshot::channel();
                let sent = intents.send(Intent::BotHello {
                    team,
                    join_code,
                    outbox: outbox_tx.clone(),
                    reply_to,
                });
                if sent.is_err() {
                    return None;
                }
                match reply_rx.await {
                    Ok(Ok(seat)) => {
                        actix_web::rt::spawn(forward_bot_outbox(outbox_rx, session.clone()));
                        return Some(seat);
                    }
                    Ok(Err(err)) => {
                        let code = match err {
                            hh_seats::RegistryError::TableFull => ErrorCode::TableFull,
                            hh_seats::RegistryError::JoinCodeMismatch => ErrorCode::TeamTaken,
                        };
                        let _ = session.text(ServerMessage::error(code, err.to_string()).to_json()).await;
                        return None;
                    }
                    Err(_) => return None,
                }
            }
            Ok(ClientMessage::Action { .. }) => {
                let _ = session
                    .text(ServerMessage::error(ErrorCode::BadSchema, "hello must be the first frame").to_json())
                    .await;
            }
            Err(err) => {
                let _ = session.text(ServerMessage::error(err.code(), err.message()).to_json()).await;
            }
        }
    }
}

async fn forward_bot_outbox(mut outbox: tokio::sync::mpsc::UnboundedReceiver<ServerMessage>, mut session: actix_ws::Session) {
    while let Some(message) = outbox.recv().await {
        if session.text(message.to_json()).await.is_err() {
            break;
        }
    }
}

/// Bridges one `/spectate` connection. The first frame must be `hello`;
/// after that, only operator connections are expected to send anything
/// further (`control` frames) — plain spectators are read-only.
async fn bridge_spectator(intents: UnboundedSender<Intent>, session: actix_ws::Session, mut stream: actix_ws::MessageStream) {
    let (outbox_tx, outbox_rx) = unbounded_channel::<hh_protocol::SpectatorServerMessage>();
    let role = loop {
        let text = match stream.next().await {
            Some(Ok(actix_ws::Message::Text(text))) => text,
            Some(Ok(actix_ws::Message::Close(_))) | None => return,
            Some(Err(_)) => return,
            _ => continue,
        };
        match WireCodec::decode_spectator(&text) {
            Ok(SpectatorClientMessage::Hello { role, mode, control: _, .. }) => {
                let sent = intents.send(Intent::SpectatorHello { role, mode, outbox: outbox_tx.clone() });
                if sent.is_err() {
                    return;
                }
                actix_web::rt::spawn(forward_spectator_outbox(outbox_rx, session.clone()));
                break role;
            }
            Ok(SpectatorClientMessage::Control { .. }) => {
                warn!("[spectate] control frame before hello, dropping");
            }
            Err(_) => warn!("[spectate] malformed hello frame, dropping"),
        }
    };

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(actix_ws::Message::Text(text)) => {
                if let Ok(SpectatorClientMessage::Control { command, seat, .. }) = WireCodec::decode_spectator(&text) {
                    let _ = intents.send(Intent::OperatorControl { command, seat, role });
                }
            }
            Ok(actix_ws::Message::Close(_)) => break,
            Err(_) => break,
            _ => continue,
        }
    }
    debug!("[spectate] connection closed");
}

async fn forward_spectator_outbox(
    mut outbox: tokio::sync::mpsc::UnboundedReceiver<hh_protocol::SpectatorServerMessage>,
    mut session: actix_ws::Session,
) {
    while let Some(message) = outbox.recv().await {
        if session.text(message.to_json()).await.is_err() {
            break;
        }
    }
}
