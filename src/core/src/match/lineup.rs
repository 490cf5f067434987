use crate::club::{Club, Position, Trait};
use crate::r#match::events::{MatchEvent, MatchEventKind};
use crate::utils::GameRng;
use std::collections::HashMap;

const BASE_INJURY_RISK: f64 = 0.003;
const INJURY_PRONE_EXTRA: f64 = 0.010;

/// One side's personnel plan for a match: who started, who sat, who played
/// how long, and the injury/substitution timeline.
#[derive(Debug, Clone)]
pub struct SideLineup {
    pub lineup: Vec<u32>,
    pub bench: Vec<u32>,
    pub minutes: HashMap<u32, u8>,
    /// On-pitch interval per participant, `[from, to)` in match minutes.
    pub intervals: HashMap<u32, (u8, u8)>,
    pub events: Vec<MatchEvent>,
    pub final_xi: Vec<u32>,
}

impl SideLineup {
    pub fn on_pitch_at(&self, minute: u8) -> Vec<u32> {
        self.intervals
            .iter()
            .filter(|(_, (from, to))| *from <= minute && minute <= *to)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn participants(&self) -> Vec<u32> {
        self.minutes
            .iter()
            .filter(|(_, minutes)| **minutes > 0)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Starting XI and bench for a club.
///
/// The preferred lineup is honored in order (existing players only) up to
/// 11; a short list is filled from the rest of the roster by `skill_open`
/// descending. The bench is `bench_order` followed by the remaining roster,
/// order preserved, lineup excluded.
pub fn select_lineup(club: &Club) -> (Vec<u32>, Vec<u32>) {
    let mut lineup: Vec<u32> = Vec::with_capacity(11);

    for pid in &club.preferred_lineup {
        if lineup.len() == 11 {
            break;
        }
        if club.has_player(*pid) && !lineup.contains(pid) {
            lineup.push(*pid);
        }
    }

    if lineup.len() < 11 {
        let mut rest: Vec<&crate::club::Player> = club
            .players
            .iter()
            .filter(|p| !lineup.contains(&p.id))
            .collect();
        rest.sort_by(|a, b| b.skill_open.cmp(&a.skill_open).then(a.id.cmp(&b.id)));
        for player in rest {
            if lineup.len() == 11 {
                break;
            }
            lineup.push(player.id);
        }
    }

    let mut bench: Vec<u32> = Vec::new();
    for pid in &club.bench_order {
        if club.has_player(*pid) && !lineup.contains(pid) && !bench.contains(pid) {
            bench.push(*pid);
        }
    }
    for player in &club.players {
        if !lineup.contains(&player.id) && !bench.contains(&player.id) {
            bench.push(player.id);
        }
    }

    (lineup, bench)
}

/// Pre-match injury draw for the starters: base risk 0.003, +0.010 for
/// injury-prone players, minute in [10, 85].
pub fn roll_injuries(club: &Club, lineup: &[u32], rng: &mut GameRng) -> Vec<(u32, u8)> {
    let mut injuries = Vec::new();
    for pid in lineup {
        let Some(player) = club.player(*pid) else {
            continue;
        };
        let mut risk = BASE_INJURY_RISK;
        if player.has_trait(Trait::InjuryProne) {
            risk += INJURY_PRONE_EXTRA;
        }
        if rng.chance(risk) {
            injuries.push((*pid, rng.int(10, 85) as u8));
        }
    }
    injuries
}

#[derive(Debug)]
enum SubIntent {
    Injury { minute: u8, out: u32 },
    Planned { minute: u8, rule_index: usize },
}

impl SubIntent {
    fn minute(&self) -> u8 {
        match self {
            SubIntent::Injury { minute, .. } => *minute,
            SubIntent::Planned { minute, .. } => *minute,
        }
    }
}

/// Runs the substitution schedule for one side.
///
/// Injuries are handled first at their minute (matching on-injury rules by
/// player, then by position, else same-position bench, else any bench);
/// planned rules fire in minute order. At every executed swap all players
/// on the pitch are credited with the elapsed segment, and the remaining
/// segment up to 90 is credited at the end, so a full XI always accounts
/// for exactly 11 x 90 participant-minutes.
pub fn schedule_substitutions(
    club: &Club,
    lineup: Vec<u32>,
    bench: Vec<u32>,
    injuries: &[(u32, u8)],
) -> SideLineup {
    let position_of = |pid: u32| club.player(pid).map(|p| p.position);

    let mut events: Vec<MatchEvent> = Vec::new();
    let mut intents: Vec<SubIntent> = Vec::new();

    for (pid, minute) in injuries {
        events.push(MatchEvent::new(*minute, MatchEventKind::Injury, Some(*pid)));
        intents.push(SubIntent::Injury {
            minute: *minute,
            out: *pid,
        });
    }
    for (index, rule) in club.substitution_plan.iter().enumerate() {
        if rule.on_injury {
            continue;
        }
        intents.push(SubIntent::Planned {
            minute: rule.minute.clamp(1, 90),
            rule_index: index,
        });
    }
    intents.sort_by_key(|intent| intent.minute());

    let mut pitch: Vec<u32> = lineup.clone();
    let mut bench_left: Vec<u32> = bench.clone();
    let mut minutes: HashMap<u32, u8> = HashMap::new();
    let mut intervals: HashMap<u32, (u8, u8)> = HashMap::new();
    for pid in &pitch {
        minutes.insert(*pid, 0);
        intervals.insert(*pid, (0, 90));
    }

    let mut previous_minute: u8 = 0;

    let take_from_bench =
        |bench_left: &mut Vec<u32>, preferred: Option<u32>, position: Option<Position>| -> Option<u32> {
            if let Some(wanted) = preferred {
                if let Some(idx) = bench_left.iter().position(|pid| *pid == wanted) {
                    return Some(bench_left.remove(idx));
                }
            }
            if let Some(position) = position {
                if let Some(idx) = bench_left
                    .iter()
                    .position(|pid| club.player(*pid).map(|p| p.position) == Some(position))
                {
                    return Some(bench_left.remove(idx));
                }
            }
            if bench_left.is_empty() {
                None
            } else {
                Some(bench_left.remove(0))
            }
        };

    for intent in intents {
        let minute = intent.minute().clamp(1, 90);

        let (out_id, in_id) = match intent {
            SubIntent::Injury { out, .. } => {
                if !pitch.contains(&out) {
                    continue;
                }
                let out_position = position_of(out);

                // On-injury rules: exact player first, then position match.
                let rule_in = club
                    .substitution_plan
                    .iter()
                    .filter(|rule| rule.on_injury)
                    .find(|rule| rule.player_out == Some(out))
                    .or_else(|| {
                        club.substitution_plan
                            .iter()
                            .filter(|rule| rule.on_injury)
                            .find(|rule| rule.position.is_some() && rule.position == out_position)
                    })
                    .and_then(|rule| rule.player_in);

                match take_from_bench(&mut bench_left, rule_in, out_position) {
                    Some(in_id) => (out, in_id),
                    // Nobody left to bring on; the player soldiers on.
                    None => continue,
                }
            }
            SubIntent::Planned { rule_index, .. } => {
                let rule = &club.substitution_plan[rule_index];

                let out_id = rule
                    .player_out
                    .filter(|pid| pitch.contains(pid))
                    .or_else(|| {
                        rule.position.and_then(|position| {
                            pitch
                                .iter()
                                .copied()
                                .find(|pid| position_of(*pid) == Some(position))
                        })
                    })
                    .or_else(|| pitch.first().copied());
                let Some(out_id) = out_id else { continue };

                let position = rule.position.or_else(|| position_of(out_id));
                match take_from_bench(&mut bench_left, rule.player_in, position) {
                    Some(in_id) => (out_id, in_id),
                    None => continue,
                }
            }
        };

        let elapsed = minute.saturating_sub(previous_minute);
        for pid in &pitch {
            *minutes.entry(*pid).or_insert(0) += elapsed;
        }
        previous_minute = minute;

        pitch.retain(|pid| *pid != out_id);
        pitch.push(in_id);
        if let Some(interval) = intervals.get_mut(&out_id) {
            interval.1 = minute;
        }
        minutes.entry(in_id).or_insert(0);
        intervals.insert(in_id, (minute, 90));

        events.push(
            MatchEvent::new(minute, MatchEventKind::Substitution, Some(in_id))
                .with_assist(Some(out_id)),
        );
    }

    let tail = 90u8.saturating_sub(previous_minute);
    for pid in &pitch {
        *minutes.entry(*pid).or_insert(0) += tail;
    }

    events.sort_by_key(|event| event.minute);

    SideLineup {
        lineup,
        bench,
        minutes,
        intervals,
        events,
        final_xi: pitch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::{Player, SubstitutionRule};

    fn make_player(id: u32, position: Position, skill: u8) -> Player {
        Player {
            id,
            first_name: format!("P{id}"),
            last_name: "Test".into(),
            age: 24,
            position,
            number: (id % 98) as u8 + 1,
            skill_open: skill,
            skill_hidden: 50,
            form_now: 10,
            form_season: 10.0,
            traits: vec![],
            value_sek: 0,
        }
    }

    fn club_with_layout() -> Club {
        let mut club = Club::new("Bytes IF");
        let mut id = 1;
        for (position, count) in [
            (Position::GK, 2),
            (Position::DF, 5),
            (Position::MF, 5),
            (Position::FW, 4),
        ] {
            for _ in 0..count {
                club.players.push(make_player(id, position, 5 + (id % 3) as u8));
                id += 1;
            }
        }
        club
    }

    #[test]
    fn preferred_lineup_is_honored_then_filled_by_skill() {
        let mut club = club_with_layout();
        club.preferred_lineup = vec![3, 1, 8];
        let (lineup, bench) = select_lineup(&club);

        assert_eq!(lineup.len(), 11);
        assert_eq!(&lineup[..3], &[3, 1, 8]);
        assert_eq!(bench.len(), club.players.len() - 11);
        assert!(lineup.iter().all(|pid| !bench.contains(pid)));
    }

    #[test]
    fn missing_preferred_ids_are_skipped() {
        let mut club = club_with_layout();
        club.preferred_lineup = vec![999, 2];
        let (lineup, _) = select_lineup(&club);
        assert!(!lineup.contains(&999));
        assert_eq!(lineup[0], 2);
    }

    #[test]
    fn planned_substitution_splits_minutes() {
        let mut club = club_with_layout();
        let (lineup, bench) = select_lineup(&club);
        let out_id = lineup[4];
        let in_id = bench[0];
        club.substitution_plan = vec![SubstitutionRule::planned(60, in_id, out_id)];

        let side = schedule_substitutions(&club, lineup, bench, &[]);

        assert_eq!(side.minutes[&out_id], 60);
        assert_eq!(side.minutes[&in_id], 30);
        assert!(side.final_xi.contains(&in_id));
        assert!(!side.final_xi.contains(&out_id));
        assert!(side
            .events
            .iter()
            .any(|e| e.kind == MatchEventKind::Substitution && e.player_id == Some(in_id)));
    }

    #[test]
    fn full_xi_accounts_for_990_minutes() {
        let mut club = club_with_layout();
        let (lineup, bench) = select_lineup(&club);
        club.substitution_plan = vec![
            SubstitutionRule::planned(46, bench[0], lineup[10]),
            SubstitutionRule::planned(75, bench[1], lineup[9]),
        ];
        let injured = lineup[0];

        let side = schedule_substitutions(&club, lineup, bench, &[(injured, 20)]);

        let total: u32 = side.minutes.values().map(|m| *m as u32).sum();
        assert_eq!(total, 11 * 90);
        assert!(side.minutes.values().all(|m| *m <= 90));
    }

    #[test]
    fn injury_pulls_same_position_replacement() {
        let mut club = club_with_layout();
        // GK 1, four DF, four MF, two FW; defender 7 stays on the bench.
        club.preferred_lineup = vec![1, 3, 4, 5, 6, 8, 9, 10, 11, 13, 14];
        let (lineup, bench) = select_lineup(&club);
        assert!(bench.contains(&7));
        let injured = lineup[1];
        let injured_position = club.player(injured).unwrap().position;
        assert_eq!(injured_position, Position::DF);

        let side = schedule_substitutions(&club, lineup, bench, &[(injured, 30)]);

        let sub = side
            .events
            .iter()
            .find(|e| e.kind == MatchEventKind::Substitution)
            .expect("injury should force a substitution");
        let replacement = sub.player_id.unwrap();
        assert_eq!(club.player(replacement).unwrap().position, injured_position);
        assert_eq!(side.minutes[&injured], 30);
    }

    #[test]
    fn on_pitch_at_reflects_substitutions() {
        let mut club = club_with_layout();
        let (lineup, bench) = select_lineup(&club);
        let out_id = lineup[0];
        let in_id = bench[0];
        club.substitution_plan = vec![SubstitutionRule::planned(60, in_id, out_id)];

        let side = schedule_substitutions(&club, lineup, bench, &[]);

        assert!(side.on_pitch_at(30).contains(&out_id));
        assert!(!side.on_pitch_at(75).contains(&out_id));
        assert!(side.on_pitch_at(75).contains(&in_id));
    }
}
