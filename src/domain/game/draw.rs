//! Number drawing and the published draw event.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aggregate::{Game, MAX_NUMBER, MIN_NUMBER};
use crate::domain::foundation::{GameId, Timestamp};

/// Picks a number from 1..=75 that is not yet in `drawn`.
///
/// Uniform rejection sampling: redraw until an unused value comes up.
/// Expected O(1) per call while the pool is mostly full; the worst case
/// degrades as the pool empties, which is acceptable for 75 values.
///
/// Returns `None` once the pool is exhausted.
pub fn draw_unused<R: Rng>(drawn: &[i16], rng: &mut R) -> Option<i16> {
    if drawn.len() >= (MAX_NUMBER - MIN_NUMBER + 1) as usize {
        return None;
    }
    loop {
        let candidate = rng.gen_range(MIN_NUMBER..=MAX_NUMBER);
        if !drawn.contains(&candidate) {
            return Some(candidate);
        }
    }
}

/// One draw, ready for publication to the socket sink.
///
/// The event name is derived from the game's slot, so it is the same for
/// every draw of one game and deterministic across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawAnnouncement {
    /// Game the draw belongs to.
    pub game_id: GameId,

    /// Channel event name, e.g. `Bingo_2024-05-20_14:30`.
    pub event_name: String,

    /// The drawn number.
    pub number: i16,

    /// 1-based position of this draw within the game.
    pub sequence: u32,

    /// When the draw happened.
    pub announced_at: Timestamp,
}

impl DrawAnnouncement {
    /// Builds the announcement for a draw that was just recorded on `game`.
    pub fn for_draw(game: &Game, number: i16, sequence: u32, announced_at: Timestamp) -> Self {
        Self {
            game_id: game.id(),
            event_name: game.event_name(),
            number,
            sequence,
            announced_at,
        }
    }

    /// The message body delivered to subscribers.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "number": self.number,
            "sequence": self.sequence,
            "timestamp": self.announced_at.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::GameState;
    use chrono::{TimeZone, Utc};

    fn slot() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 20, 14, 30, 0).unwrap())
    }

    #[test]
    fn draw_unused_avoids_drawn_values() {
        let mut rng = rand::thread_rng();
        // Everything but 42 is taken.
        let drawn: Vec<i16> = (1..=75).filter(|n| *n != 42).collect();
        for _ in 0..10 {
            assert_eq!(draw_unused(&drawn, &mut rng), Some(42));
        }
    }

    #[test]
    fn draw_unused_returns_none_when_exhausted() {
        let mut rng = rand::thread_rng();
        let drawn: Vec<i16> = (1..=75).collect();
        assert_eq!(draw_unused(&drawn, &mut rng), None);
    }

    #[test]
    fn draw_unused_stays_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let n = draw_unused(&[], &mut rng).unwrap();
            assert!((1..=75).contains(&n));
        }
    }

    #[test]
    fn announcement_carries_game_event_name() {
        let game = Game::reconstitute(
            GameId::from_i64(3),
            GameState::Running,
            slot(),
            vec![7, 12, 40],
            None,
            1,
            Timestamp::now(),
        );
        let announcement = DrawAnnouncement::for_draw(&game, 61, 4, Timestamp::now());

        assert_eq!(announcement.event_name, "Bingo_2024-05-20_14:30");
        assert_eq!(announcement.sequence, 4);
        assert_eq!(announcement.number, 61);
    }

    #[test]
    fn payload_exposes_number_sequence_and_timestamp() {
        let game = Game::reconstitute(
            GameId::from_i64(3),
            GameState::Running,
            slot(),
            vec![],
            None,
            1,
            Timestamp::now(),
        );
        let announcement = DrawAnnouncement::for_draw(&game, 5, 1, Timestamp::now());
        let payload = announcement.payload();

        assert_eq!(payload["number"], 5);
        assert_eq!(payload["sequence"], 1);
        assert!(payload["timestamp"].is_string());
    }
}
