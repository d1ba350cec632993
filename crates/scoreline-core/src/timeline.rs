// Chronological, team-attributed match events.

use serde::Serialize;

use crate::error::Result;
use crate::model::{MatchId, PlayerRef, Team};
use crate::store::QueryInterface;

/// Event type as stored in `match_events.event_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    YellowCard,
    RedCard,
    Substitution,
    NotableAction,
    /// Any type string the store uses that is not one of the above.
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "goal" => EventKind::Goal,
            "yellow_card" => EventKind::YellowCard,
            "red_card" => EventKind::RedCard,
            "substitution" => EventKind::Substitution,
            "notable_action" => EventKind::NotableAction,
            _ => EventKind::Other(raw.to_string()),
        }
    }

    /// Human label for the timeline.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Goal => "Goal",
            EventKind::YellowCard => "Yellow card",
            EventKind::RedCard => "Red card",
            EventKind::Substitution => "Substitution",
            EventKind::NotableAction | EventKind::Other(_) => "Other",
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, EventKind::YellowCard | EventKind::RedCard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub minute: u32,
    pub kind: EventKind,
    pub team: Team,
    pub player: PlayerRef,
    pub description: Option<String>,
}

impl TimelineEntry {
    /// e.g. `12' Goal - Saka (Arsenal): Header`
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}' {} - {} ({})",
            self.minute,
            self.kind.label(),
            self.player,
            self.team.name
        );
        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(": ");
            line.push_str(desc);
        }
        line
    }
}

/// Events of a match ordered by minute; events in the same minute keep store
/// order.
pub fn list_events<Q: QueryInterface>(store: &Q, match_id: MatchId) -> Result<Vec<TimelineEntry>> {
    let mut entries = store.select_map(
        "list_events",
        "SELECT e.minute, e.event_type, e.team_id, COALESCE(t.name, ''),
                e.player_id, p.name, e.description
         FROM match_events e
         LEFT JOIN teams t ON t.id = e.team_id
         LEFT JOIN players p ON p.id = e.player_id
         WHERE e.match_id = ?1
         ORDER BY e.minute, e.rowid",
        &[match_id.into()],
        |row| {
            let kind: String = row.get(1)?;
            Ok(TimelineEntry {
                minute: row.get(0)?,
                kind: EventKind::parse(&kind),
                team: Team {
                    id: row.get(2)?,
                    name: row.get(3)?,
                },
                player: PlayerRef::from_columns(row.get(4)?, row.get(5)?),
                description: row.get(6)?,
            })
        },
    )?;

    // Stable: keeps arrival order within a minute whatever the backend did.
    entries.sort_by_key(|entry| entry.minute);
    Ok(entries)
}
