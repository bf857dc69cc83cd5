//! The roster store: the single source of truth for who is in the lobby.
//!
//! # Concurrency note
//!
//! `Lobby` is NOT thread-safe by itself. It is owned by the lobby task
//! (see [`spawn_lobby`](crate::spawn_lobby)), which applies commands one at
//! a time. That single owner is what makes every operation here atomic
//! with respect to concurrent connections.

use huddle_protocol::{Color, Participant, ParticipantId, Roster};

use crate::{LobbyConfig, LobbyError};

/// The lobby roster and its id allocator.
///
/// ```text
/// add_participant() ──→ [in roster, ready = false] ──→ remove_participant()
///                              │        ↑
///                              └────────┘
///                            toggle_ready()
/// ```
#[derive(Debug)]
pub struct Lobby {
    /// Participants in join order.
    roster: Vec<Participant>,

    /// Next id to hand out. Starts at 1 and only ever grows, so ids are
    /// never reused for the lifetime of the lobby.
    next_id: u64,

    config: LobbyConfig,
}

impl Lobby {
    /// Creates an empty lobby.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            roster: Vec::new(),
            next_id: 1,
            config,
        }
    }

    /// Registers a new participant and returns its freshly allocated id.
    ///
    /// The name is trimmed before it is stored. The participant is appended
    /// at the end of the roster with `ready = false`.
    ///
    /// # Errors
    /// - [`LobbyError::InvalidName`] — empty/whitespace-only or too long
    /// - [`LobbyError::LobbyFull`] — `max_participants` reached
    ///
    /// On error the roster is untouched and no id is consumed.
    pub fn add_participant(&mut self, name: &str) -> Result<ParticipantId, LobbyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LobbyError::InvalidName("name is empty".into()));
        }
        if name.chars().count() > self.config.max_name_len {
            return Err(LobbyError::InvalidName(format!(
                "name is longer than {} characters",
                self.config.max_name_len
            )));
        }
        if self.roster.len() >= self.config.max_participants {
            return Err(LobbyError::LobbyFull(self.config.max_participants));
        }

        let id = ParticipantId(self.next_id);
        self.next_id += 1;
        let color = self.pick_color(id);

        self.roster.push(Participant {
            id,
            name: name.to_string(),
            color,
            ready: false,
        });
        tracing::info!(
            participant_id = %id,
            %color,
            participants = self.roster.len(),
            "participant joined"
        );
        Ok(id)
    }

    /// Flips the participant's ready flag and returns the new value.
    ///
    /// # Errors
    /// Returns [`LobbyError::UnknownParticipant`] if the id isn't in the
    /// roster. Callers treat that as a benign no-op.
    pub fn toggle_ready(&mut self, id: ParticipantId) -> Result<bool, LobbyError> {
        let participant = self
            .roster
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LobbyError::UnknownParticipant(id))?;

        participant.ready = !participant.ready;
        tracing::debug!(participant_id = %id, ready = participant.ready, "ready toggled");
        Ok(participant.ready)
    }

    /// Removes a participant, returning it if it was present.
    ///
    /// Idempotent: removing an absent id returns `None` and changes
    /// nothing. Disconnect races can deliver the same removal twice.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Option<Participant> {
        let pos = self.roster.iter().position(|p| p.id == id)?;
        // `remove`, not `swap_remove`: the remaining join order must hold.
        let removed = self.roster.remove(pos);
        tracing::info!(
            participant_id = %id,
            participants = self.roster.len(),
            "participant left"
        );
        Some(removed)
    }

    /// Returns an owned copy of the roster as it is right now.
    pub fn snapshot(&self) -> Roster {
        self.roster.clone()
    }

    /// Looks up a participant by id.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == id)
    }

    /// Number of participants in the roster.
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Returns `true` if nobody is in the lobby.
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// First palette color nobody currently holds; once all are taken,
    /// cycle through the palette by join sequence.
    fn pick_color(&self, id: ParticipantId) -> Color {
        Color::PALETTE
            .into_iter()
            .find(|color| !self.roster.iter().any(|p| p.color == *color))
            .unwrap_or_else(|| {
                let idx = (id.0 - 1) as usize % Color::PALETTE.len();
                Color::PALETTE[idx]
            })
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(LobbyConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `Lobby`, named `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn lobby() -> Lobby {
        Lobby::default()
    }

    fn names(lobby: &Lobby) -> Vec<String> {
        lobby.snapshot().into_iter().map(|p| p.name).collect()
    }

    // =====================================================================
    // add_participant()
    // =====================================================================

    #[test]
    fn test_add_participant_appends_in_call_order() {
        let mut lobby = lobby();
        let a = lobby.add_participant("Alice").unwrap();
        let b = lobby.add_participant("Bob").unwrap();
        let c = lobby.add_participant("Carol").unwrap();

        assert_eq!(names(&lobby), ["Alice", "Bob", "Carol"]);
        // Sequential, no duplicates, no gaps.
        assert_eq!([a, b, c], [ParticipantId(1), ParticipantId(2), ParticipantId(3)]);
        assert!(lobby.snapshot().iter().all(|p| !p.ready));
    }

    #[test]
    fn test_add_participant_trims_name() {
        let mut lobby = lobby();
        let id = lobby.add_participant("  Alice \t").unwrap();
        assert_eq!(lobby.get(id).unwrap().name, "Alice");
    }

    #[test]
    fn test_add_participant_empty_name_rejected() {
        let mut lobby = lobby();
        for bad in ["", "   ", "\t\n"] {
            let result = lobby.add_participant(bad);
            assert!(
                matches!(result, Err(LobbyError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(lobby.is_empty());
    }

    #[test]
    fn test_add_participant_rejection_consumes_no_id() {
        let mut lobby = lobby();
        lobby.add_participant("").unwrap_err();
        assert_eq!(lobby.add_participant("Alice").unwrap(), ParticipantId(1));
    }

    #[test]
    fn test_add_participant_too_long_name_rejected() {
        let mut lobby = Lobby::new(LobbyConfig {
            max_name_len: 5,
            ..LobbyConfig::default()
        });
        assert!(lobby.add_participant("Alice").is_ok());
        assert!(matches!(
            lobby.add_participant("Alicia"),
            Err(LobbyError::InvalidName(_))
        ));
        // Length is counted in characters, not bytes.
        assert!(lobby.add_participant("Zoë").is_ok());
    }

    #[test]
    fn test_add_participant_full_lobby_rejected() {
        let mut lobby = Lobby::new(LobbyConfig {
            max_participants: 2,
            ..LobbyConfig::default()
        });
        lobby.add_participant("A").unwrap();
        lobby.add_participant("B").unwrap();

        assert_eq!(lobby.add_participant("C"), Err(LobbyError::LobbyFull(2)));
        assert_eq!(lobby.len(), 2);
    }

    #[test]
    fn test_add_participant_duplicate_names_allowed() {
        let mut lobby = lobby();
        let a = lobby.add_participant("Sam").unwrap();
        let b = lobby.add_participant("Sam").unwrap();
        assert_ne!(a, b);
        assert_eq!(lobby.len(), 2);
    }

    // =====================================================================
    // colors
    // =====================================================================

    #[test]
    fn test_colors_follow_palette_order() {
        let mut lobby = lobby();
        for name in ["A", "B", "C", "D"] {
            lobby.add_participant(name).unwrap();
        }
        let colors: Vec<Color> = lobby.snapshot().iter().map(|p| p.color).collect();
        assert_eq!(colors, Color::PALETTE);
    }

    #[test]
    fn test_colors_reuse_freed_color_first() {
        let mut lobby = lobby();
        let a = lobby.add_participant("A").unwrap(); // Red
        lobby.add_participant("B").unwrap(); // Blue
        lobby.remove_participant(a);

        let c = lobby.add_participant("C").unwrap();
        assert_eq!(lobby.get(c).unwrap().color, Color::Red);
    }

    #[test]
    fn test_colors_cycle_when_palette_exhausted() {
        let mut lobby = lobby();
        for name in ["A", "B", "C", "D"] {
            lobby.add_participant(name).unwrap();
        }
        let e = lobby.add_participant("E").unwrap(); // id 5
        let f = lobby.add_participant("F").unwrap(); // id 6
        assert_eq!(lobby.get(e).unwrap().color, Color::Red);
        assert_eq!(lobby.get(f).unwrap().color, Color::Blue);
    }

    // =====================================================================
    // toggle_ready()
    // =====================================================================

    #[test]
    fn test_toggle_ready_flips_only_target() {
        let mut lobby = lobby();
        let a = lobby.add_participant("Alice").unwrap();
        let b = lobby.add_participant("Bob").unwrap();

        assert_eq!(lobby.toggle_ready(a), Ok(true));
        assert!(lobby.get(a).unwrap().ready);
        assert!(!lobby.get(b).unwrap().ready);
    }

    #[test]
    fn test_toggle_ready_twice_restores_value() {
        let mut lobby = lobby();
        let a = lobby.add_participant("Alice").unwrap();
        let before = lobby.snapshot();

        lobby.toggle_ready(a).unwrap();
        lobby.toggle_ready(a).unwrap();

        assert_eq!(lobby.snapshot(), before);
    }

    #[test]
    fn test_toggle_ready_unknown_participant() {
        let mut lobby = lobby();
        assert_eq!(
            lobby.toggle_ready(ParticipantId(9)),
            Err(LobbyError::UnknownParticipant(ParticipantId(9)))
        );
    }

    // =====================================================================
    // remove_participant()
    // =====================================================================

    #[test]
    fn test_remove_participant_keeps_order_of_others() {
        let mut lobby = lobby();
        lobby.add_participant("A").unwrap();
        let b = lobby.add_participant("B").unwrap();
        lobby.add_participant("C").unwrap();
        lobby.add_participant("D").unwrap();

        let removed = lobby.remove_participant(b).expect("B was present");
        assert_eq!(removed.name, "B");
        assert_eq!(names(&lobby), ["A", "C", "D"]);
    }

    #[test]
    fn test_remove_participant_twice_is_noop() {
        let mut lobby = lobby();
        let a = lobby.add_participant("A").unwrap();
        lobby.add_participant("B").unwrap();

        assert!(lobby.remove_participant(a).is_some());
        assert!(lobby.remove_participant(a).is_none());
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_remove_participant_id_never_reused() {
        let mut lobby = lobby();
        let a = lobby.add_participant("A").unwrap();
        lobby.remove_participant(a);
        let b = lobby.add_participant("A").unwrap();
        assert_ne!(a, b);
    }

    // =====================================================================
    // snapshot()
    // =====================================================================

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut lobby = lobby();
        let a = lobby.add_participant("A").unwrap();
        let snap = lobby.snapshot();

        lobby.toggle_ready(a).unwrap();
        lobby.add_participant("B").unwrap();

        assert_eq!(snap.len(), 1);
        assert!(!snap[0].ready);
    }
}
