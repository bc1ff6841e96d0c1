//! Perspective correction for matchup counters.
//!
//! Upstream matchup sources report the enemy side of a pairing from the
//! opponent's point of view: when querying hero A against opponent B, the
//! enemy counters are B's wins and losses against A. Downstream consumers
//! need A's own results, so the enemy side is flipped. The ally side is
//! already hero-centric and passes through untouched.

use std::collections::BTreeMap;

use crate::models::{EnemySide, MatchupRecord, MatchupSource, Perspective};

/// Flip an enemy side to the other hero's point of view.
pub fn transpose_enemy(enemy: &EnemySide) -> EnemySide {
    EnemySide {
        wins_against: enemy.losses_against,
        losses_against: enemy.wins_against,
        win_rate_against: 100.0 - enemy.win_rate_against,
    }
}

/// Flip the enemy side of a single matchup record.
pub fn transpose_record(record: &MatchupRecord) -> MatchupRecord {
    MatchupRecord {
        ally: record.ally,
        enemy: transpose_enemy(&record.enemy),
    }
}

/// Flip every opponent record of one hero.
pub fn transpose_matchups(
    matchups: &BTreeMap<String, MatchupRecord>,
) -> BTreeMap<String, MatchupRecord> {
    matchups
        .iter()
        .map(|(opponent, record)| (opponent.clone(), transpose_record(record)))
        .collect()
}

/// Convert an opponent-perspective source to entity perspective.
///
/// Sources already in entity perspective are returned unchanged, so a
/// file is never flipped twice. `transposed_at` is stamped with the
/// source's own capture time, keeping output stable for identical input.
pub fn transpose_source(source: MatchupSource) -> MatchupSource {
    if source.metadata.perspective == Perspective::Entity {
        return source;
    }

    let matchups = source
        .matchups
        .iter()
        .map(|(hero, opponents)| (hero.clone(), transpose_matchups(opponents)))
        .collect();

    let mut metadata = source.metadata;
    metadata.perspective = Perspective::Entity;
    metadata.transposed_at = metadata.fetched_at_utc();

    MatchupSource { metadata, matchups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AllySide, SourceMetadata};

    fn opponent_record() -> MatchupRecord {
        MatchupRecord {
            ally: AllySide {
                wins_with: 120,
                losses_with: 80,
                win_rate_as_ally: 60.0,
            },
            enemy: EnemySide {
                wins_against: 30,
                losses_against: 20,
                win_rate_against: 60.0,
            },
        }
    }

    #[test]
    fn test_transpose_enemy_swaps_counts_and_rate() {
        let ours = transpose_enemy(&opponent_record().enemy);

        assert_eq!(ours.wins_against, 20);
        assert_eq!(ours.losses_against, 30);
        assert!((ours.win_rate_against - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_transpose_defaults() {
        let ours = transpose_enemy(&EnemySide::default());
        assert_eq!(ours.wins_against, 0);
        assert_eq!(ours.losses_against, 0);
        assert_eq!(ours.win_rate_against, 50.0);
    }

    #[test]
    fn test_ally_passes_through() {
        let record = opponent_record();
        assert_eq!(transpose_record(&record).ally, record.ally);
    }

    #[test]
    fn test_transpose_is_involutive() {
        for (wins, losses, rate) in [(30, 20, 60.0), (0, 0, 50.0), (7, 193, 3.5), (1, 0, 99.99)] {
            let enemy = EnemySide {
                wins_against: wins,
                losses_against: losses,
                win_rate_against: rate,
            };
            let twice = transpose_enemy(&transpose_enemy(&enemy));
            assert_eq!(twice.wins_against, enemy.wins_against);
            assert_eq!(twice.losses_against, enemy.losses_against);
            assert!((twice.win_rate_against - enemy.win_rate_against).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transpose_source_marks_perspective() {
        let mut opponents = BTreeMap::new();
        opponents.insert("Alarak".to_string(), opponent_record());
        let mut matchups = BTreeMap::new();
        matchups.insert("Abathur".to_string(), opponents);

        let source = MatchupSource {
            metadata: SourceMetadata {
                perspective: Perspective::Opponent,
                fetched_at: Some("2025-03-01 12:30:00 UTC".to_string()),
                ..Default::default()
            },
            matchups,
        };

        let transposed = transpose_source(source.clone());
        assert_eq!(transposed.metadata.perspective, Perspective::Entity);
        assert_eq!(
            transposed.metadata.transposed_at,
            source.metadata.fetched_at_utc()
        );
        assert!(transposed.metadata.transposed_at.is_some());

        let enemy = transposed.matchups["Abathur"]["Alarak"].enemy;
        assert_eq!(enemy.wins_against, 20);
        assert_eq!(enemy.losses_against, 30);
    }

    #[test]
    fn test_transpose_source_is_repeatable() {
        let mut opponents = BTreeMap::new();
        opponents.insert("Alarak".to_string(), opponent_record());
        let mut matchups = BTreeMap::new();
        matchups.insert("Abathur".to_string(), opponents);

        let source = MatchupSource {
            metadata: SourceMetadata {
                perspective: Perspective::Opponent,
                ..Default::default()
            },
            matchups,
        };

        let first = transpose_source(source.clone());
        let second = transpose_source(source);
        assert_eq!(first, second);
        assert_eq!(first.metadata.transposed_at, None);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_entity_source_not_flipped_again() {
        let mut opponents = BTreeMap::new();
        opponents.insert("Alarak".to_string(), opponent_record());
        let mut matchups = BTreeMap::new();
        matchups.insert("Abathur".to_string(), opponents);

        let source = MatchupSource {
            metadata: SourceMetadata::default(),
            matchups,
        };

        let unchanged = transpose_source(source.clone());
        assert_eq!(unchanged, source);
    }
}
