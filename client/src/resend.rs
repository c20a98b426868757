//! Vote resend tracking
//!
//! A vote is re-sent until the room snapshot shows it, the phase moves on,
//! or the attempts run out. The server rejects duplicate votes, so an extra
//! resend is harmless.

use shared::{Packet, Phase, PlayerId, Room};
use std::time::{Duration, Instant};

pub const RESEND_WINDOW: Duration = Duration::from_secs(2);
pub const MAX_RESENDS: u32 = 3;

#[derive(Debug, Clone)]
struct Pending {
    packet: Packet,
    phase: Phase,
    resends: u32,
    last_sent: Instant,
}

#[derive(Debug, Clone)]
pub struct ResendTracker {
    pending: Option<Pending>,
    window: Duration,
    max_resends: u32,
}

impl Default for ResendTracker {
    fn default() -> Self {
        Self::new(RESEND_WINDOW, MAX_RESENDS)
    }
}

impl ResendTracker {
    pub fn new(window: Duration, max_resends: u32) -> Self {
        Self {
            pending: None,
            window,
            max_resends,
        }
    }

    /// Starts tracking a vote that was just sent during `phase`.
    /// Anything other than a vote is ignored.
    pub fn track(&mut self, packet: &Packet, phase: Phase, now: Instant) {
        if matches!(packet, Packet::VotePlayer { .. } | Packet::VoteFinal { .. }) {
            self.pending = Some(Pending {
                packet: packet.clone(),
                phase,
                resends: 0,
                last_sent: now,
            });
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    fn confirmed(pending: &Pending, room: &Room, me: PlayerId) -> bool {
        if room.phase != pending.phase {
            return true;
        }
        match pending.packet {
            Packet::VotePlayer { .. } => room.current_vote_of(me).is_some(),
            Packet::VoteFinal { .. } => room.final_vote_of(me).is_some(),
            _ => true,
        }
    }

    /// The vote to send again, if one is due
    pub fn due(&mut self, room: Option<&Room>, me: PlayerId, now: Instant) -> Option<Packet> {
        let pending = self.pending.as_mut()?;

        let done = match room {
            Some(room) => Self::confirmed(pending, room, me),
            None => true,
        };
        if done || pending.resends >= self.max_resends {
            self.pending = None;
            return None;
        }

        if now.saturating_duration_since(pending.last_sent) < self.window {
            return None;
        }

        pending.resends += 1;
        pending.last_sent = now;
        Some(pending.packet.clone())
    }
}
