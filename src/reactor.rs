//! The event loop: drives every registered transport concurrently and
//! feeds inbound packets through the repeater core.
//!
//! The reference's single-threaded callback reactor (register-read/
//! write/error/timer/close over a raw fd table) is re-architected here:
//! instead of a fd table and callback closures with their cyclic
//! back-pointers between protocol objects and their own registrations,
//! each transport is driven by its own task, indexed rather than
//! back-pointer-linked, and communicates with the routing core purely
//! through channels — the actor-per-connection style this crate's async
//! code uses elsewhere. Signal registrations do not apply to this core.
//! The reference's per-protocol timer registrations (Homebrew's ping/
//! pong, MMDVM's 1 s status poll) are unified into one `tick()` call per
//! transport per interval, driven by each transport's own task.

use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::DmrError;
use crate::packet::ParsedPacket;
use crate::repeater::RepeaterCore;
use crate::transport::Transport;

/// Interval on which every transport's [`Transport::tick`] fires,
/// matching the reference's 1 s modem status timer.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One transport's dedicated task: polls `recv()` and drains its send
/// queue concurrently, forwarding received packets to the shared
/// `inbox` tagged with this transport's index. Returns when the
/// transport tears itself down (I/O failure, auth failure, timeout);
/// this must not affect any other transport.
async fn drive(
    index: usize,
    mut transport: Box<dyn Transport>,
    mut outbox: mpsc::UnboundedReceiver<ParsedPacket>,
    inbox: mpsc::UnboundedSender<(usize, ParsedPacket)>,
) {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = transport.recv() => {
                match received {
                    Ok(Some(packet)) => {
                        if inbox.send((index, packet)).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("transport {} closed: {e}", transport.name());
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = transport.tick().await {
                    warn!("transport {} closed: {e}", transport.name());
                    return;
                }
            }
            outgoing = outbox.recv() => {
                match outgoing {
                    Some(packet) => {
                        if let Err(e) = transport.send(&packet).await {
                            warn!("transport {} send failed: {e}", transport.name());
                        }
                    }
                    None => return,
                }
            }
        }
    }
}

/// Runs `transports` under `core`'s routing policy until every transport
/// has torn itself down. A packet received on transport N is routed by
/// `core` and the resulting (destination, packet) pairs are dispatched
/// to those transports' send queues; the source transport is never a
/// destination (duplicate suppression happens inside [`RepeaterCore`]).
pub async fn run(transports: Vec<Box<dyn Transport>>, core: RepeaterCore) -> Result<(), DmrError> {
    let num_transports = transports.len();
    let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel::<(usize, ParsedPacket)>();

    let mut outboxes = Vec::with_capacity(num_transports);
    let mut tasks = JoinSet::new();

    for (index, transport) in transports.into_iter().enumerate() {
        let (tx, rx) = mpsc::unbounded_channel();
        outboxes.push(tx);
        tasks.spawn(drive(index, transport, rx, inbox_tx.clone()));
    }
    drop(inbox_tx);

    while let Some((source, packet)) = inbox_rx.recv().await {
        for (dest, rewritten) in core.route(source, num_transports, packet) {
            if outboxes[dest].send(rewritten).is_err() {
                info!("destination transport {dest} already gone, dropping packet");
            }
        }
    }

    while tasks.join_next().await.is_some() {}
    Ok(())
}
