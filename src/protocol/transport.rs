//! The narrow boundary between this core and whatever actually carries
//! protocol messages. The core only ever hands over serialized integer
//! tuples keyed by session, party and phase; delivery, retries and peer
//! addressing belong to the surrounding system.

use crate::protocol::Phase;

use std::collections::VecDeque;
use std::sync::mpsc;

/// One transmissible unit: a phase payload from one party in one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub session_id: String,
    pub party_id: String,
    pub phase: Phase,
    pub payload: Vec<Vec<u8>>,
}

/// Outbound half: fire-and-forget.
pub trait PayloadSink {
    fn send(&self, session_id: &str, party_id: &str, phase: Phase, payload: Vec<Vec<u8>>);
}

/// Inbound half: hands back the next available payload for a session and
/// phase, or `None` when nothing has arrived yet.
pub trait PayloadSource {
    fn receive(&mut self, session_id: &str, phase: Phase) -> Option<Envelope>;
}

/// In-process transport over an mpsc channel; useful for tests and for
/// wiring several local parties together.
pub struct ChannelSink {
    tx: mpsc::Sender<Envelope>,
}

pub struct ChannelSource {
    rx: mpsc::Receiver<Envelope>,
    pending: VecDeque<Envelope>,
}

pub fn channel() -> (ChannelSink, ChannelSource) {
    let (tx, rx) = mpsc::channel();
    (ChannelSink { tx }, ChannelSource { rx, pending: VecDeque::new() })
}

impl PayloadSink for ChannelSink {
    fn send(&self, session_id: &str, party_id: &str, phase: Phase, payload: Vec<Vec<u8>>) {
        // Fire-and-forget: a closed receiver is the receiver's concern.
        let _ = self.tx.send(Envelope {
            session_id: session_id.to_string(),
            party_id: party_id.to_string(),
            phase,
            payload,
        });
    }
}

impl PayloadSource for ChannelSource {
    fn receive(&mut self, session_id: &str, phase: Phase) -> Option<Envelope> {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|e| e.session_id == session_id && e.phase == phase)
        {
            return self.pending.remove(pos);
        }
        while let Ok(envelope) = self.rx.try_recv() {
            if envelope.session_id == session_id && envelope.phase == phase {
                return Some(envelope);
            }
            self.pending.push_back(envelope);
        }
        None
    }
}
