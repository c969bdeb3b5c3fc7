#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! The client binary is the one role with a human at the other end: it
//! reads interactive terminal commands (§6) and drives a session against
//! the coordinator and, transiently, whichever worker the coordinator
//! dispatches it to (§4.5).
//!
//! # Design
//!
//! - [`session::ClientSession`] owns the single connection to the
//!   coordinator and the session state machine; a worker connection is
//!   opened and closed per `DISTORT`/`RESUME` attempt and never held
//!   alongside it.
//! - [`repl`] is a tiny hand-rolled tokenizer for the five terminal verbs —
//!   not `clap`, since these are live stdin lines, not process argv.
//! - [`run`] is the one task that ever touches the coordinator connection:
//!   it multiplexes a heartbeat ticker against incoming command lines with
//!   `tokio::select!`, the same pattern [`distort_worker`]'s coordinator
//!   link uses for its own keepalive loop.
//! - Every command races a `Ctrl-C` listener against the in-flight I/O; on
//!   interrupt, the session's [`transport::CancellationToken`] is fired so
//!   the abandoned `send`/`recv` returns immediately instead of riding out
//!   its full deadline (spec.md:157).

mod error;
mod repl;
mod session;
mod state;
mod time;

pub use error::{ClientError, SessionError};
pub use session::ClientSession;
pub use state::{ClientState, StatusSnapshot};

use config::ClientConfig;
use frame::MediaClass;
use repl::Command;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use transport::{DEFAULT_TIMEOUT, HeartbeatClock};

/// Runs the interactive client REPL until the user exits.
pub async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let mut session = ClientSession::new(config, DEFAULT_TIMEOUT);
    let mut clock = HeartbeatClock::new(DEFAULT_TIMEOUT);
    let mut cancel = session.cancellation_handle();

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    tokio::task::spawn_blocking(move || read_lines(line_tx));

    println!("distort client ready. Commands: CONNECT, LOGOUT, LIST TEXT|MEDIA, DISTORT <file> <factor>, CHECK STATUS. Ctrl-C aborts an in-flight command.");

    loop {
        tokio::select! {
            _ = clock.tick(), if session.state() == ClientState::Connected => {
                match session.send_heartbeat().await {
                    Ok(()) => clock.note_traffic(),
                    Err(err) => warn!(error = %err, "heartbeat failed, treating coordinator as lost"),
                }
            }
            line = line_rx.recv() => {
                match line {
                    Some(line) => {
                        if cancel.is_cancelled() {
                            cancel = session.rearm_cancellation();
                        }
                        run_interruptibly(&mut session, &line, &cancel).await;
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}

/// Races `dispatch` against `Ctrl-C`; on interrupt, fires `cancel` so
/// whichever `send`/`recv` is in flight abandons immediately, then lets
/// `dispatch` unwind with the resulting [`transport::TransportError::Cancelled`]
/// (§6, spec.md:157).
async fn run_interruptibly(session: &mut ClientSession, line: &str, cancel: &transport::CancellationToken) {
    tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            println!("interrupted");
            info!("user interrupted the in-flight command");
        }
        () = dispatch(session, line) => {}
    }
}

async fn dispatch(session: &mut ClientSession, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let command = match repl::parse(line) {
        Ok(command) => command,
        Err(err) => {
            println!("error: {err}");
            return;
        }
    };

    let result = match command {
        Command::Connect => session.connect().await,
        Command::Logout => session.logout().await,
        Command::List(class) => match session.list(class) {
            Ok(names) => {
                print_listing(class, &names);
                Ok(())
            }
            Err(err) => Err(err),
        },
        Command::Distort { file, factor } => session.distort(&file, &factor).await,
        Command::CheckStatus => {
            println!("{}", session.status());
            Ok(())
        }
    };

    if let Err(err) = result {
        println!("error: {err}");
        info!(error = %err, "command failed");
    }
}

fn print_listing(class: MediaClass, names: &[String]) {
    if names.is_empty() {
        println!("no {class} files found");
        return;
    }
    for name in names {
        println!("{name}");
    }
}

fn read_lines(line_tx: mpsc::UnboundedSender<String>) {
    let mut editor = match rustyline::DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            error!(error = %err, "failed to start terminal input");
            return;
        }
    };
    loop {
        match editor.readline("distort> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                if line_tx.send(line).is_err() {
                    break;
                }
            }
            Err(_) => break, // EOF (Ctrl-D) or interrupt (Ctrl-C)
        }
    }
}

