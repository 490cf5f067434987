use crate::league::Division;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Running league-table row kept in `GameState::table_snapshot`, keyed by
/// club name. Rebuilt from the match log after every league result.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub mp: u32,
    pub w: u32,
    pub d: u32,
    pub losses: u32,
    pub gf: i32,
    pub ga: i32,
    pub pts: u32,
}

impl TableRow {
    pub fn gd(&self) -> i32 {
        self.gf - self.ga
    }

    pub fn apply(&mut self, scored: u32, conceded: u32) {
        self.mp += 1;
        self.gf += scored as i32;
        self.ga += conceded as i32;
        if scored > conceded {
            self.w += 1;
            self.pts += 3;
        } else if scored < conceded {
            self.losses += 1;
        } else {
            self.d += 1;
            self.pts += 1;
        }
    }
}

/// A division's clubs ranked as a final table: points, goal difference,
/// goals for, then name. Clubs without a snapshot row rank with zeros.
pub fn division_standings<'d>(
    division: &'d Division,
    snapshot: &HashMap<String, TableRow>,
) -> Vec<(&'d crate::club::Club, TableRow)> {
    let mut rows: Vec<(&crate::club::Club, TableRow)> = division
        .clubs
        .iter()
        .map(|club| {
            let row = snapshot.get(&club.name).copied().unwrap_or_default();
            (club, row)
        })
        .collect();

    rows.sort_by(|(a_club, a), (b_club, b)| {
        b.pts
            .cmp(&a.pts)
            .then_with(|| b.gd().cmp(&a.gd()))
            .then_with(|| b.gf.cmp(&a.gf))
            .then_with(|| a_club.name.cmp(&b_club.name))
    });
    rows
}

/// 1-based table position of `club_name` within its division, plus the
/// division size. Unknown clubs rank first of one.
pub fn club_table_position(
    divisions: &[Division],
    snapshot: &HashMap<String, TableRow>,
    club_name: &str,
) -> (usize, usize) {
    for division in divisions {
        if !division.clubs.iter().any(|c| c.name == club_name) {
            continue;
        }
        let standings = division_standings(division, snapshot);
        for (index, (club, _)) in standings.iter().enumerate() {
            if club.name == club_name {
                return (index + 1, standings.len());
            }
        }
    }
    (1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::Club;

    fn division_with(names: &[&str]) -> Division {
        let mut div = Division::new("Division 1", 1);
        for name in names {
            div.clubs.push(Club::new(*name));
        }
        div
    }

    fn row(pts: u32, gf: i32, ga: i32) -> TableRow {
        TableRow {
            mp: 10,
            w: pts / 3,
            d: pts % 3,
            losses: 0,
            gf,
            ga,
            pts,
        }
    }

    #[test]
    fn points_follow_three_one_zero() {
        let mut home = TableRow::default();
        let mut away = TableRow::default();
        home.apply(2, 1);
        away.apply(1, 2);
        assert_eq!((home.pts, away.pts), (3, 0));

        home.apply(1, 1);
        away.apply(1, 1);
        assert_eq!((home.pts, away.pts), (4, 1));
        assert_eq!(home.pts, 3 * home.w + home.d);
        assert_eq!(away.pts, 3 * away.w + away.d);
    }

    #[test]
    fn standings_order_by_points_gd_gf_then_name() {
        let div = division_with(&["Ceres", "Alfa", "Beta"]);
        let mut snapshot = HashMap::new();
        snapshot.insert("Ceres".to_string(), row(10, 12, 8));
        snapshot.insert("Alfa".to_string(), row(10, 14, 10));
        snapshot.insert("Beta".to_string(), row(12, 9, 9));

        let table = division_standings(&div, &snapshot);
        let order: Vec<&str> = table.iter().map(|(club, _)| club.name.as_str()).collect();
        // Beta on points; Alfa and Ceres tie on points and gd, Alfa has more gf.
        assert_eq!(order, vec!["Beta", "Alfa", "Ceres"]);
    }

    #[test]
    fn table_position_counts_from_one() {
        let div = division_with(&["Alfa", "Beta"]);
        let mut snapshot = HashMap::new();
        snapshot.insert("Beta".to_string(), row(6, 5, 1));
        let divisions = vec![div];
        assert_eq!(club_table_position(&divisions, &snapshot, "Beta"), (1, 2));
        assert_eq!(club_table_position(&divisions, &snapshot, "Alfa"), (2, 2));
        assert_eq!(club_table_position(&divisions, &snapshot, "Okänd"), (1, 1));
    }
}
