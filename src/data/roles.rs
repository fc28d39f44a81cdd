use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::model::{PlayerRecord, PlayerTable, POSITION};

/// Label given to players whose position has no catalog entry.
pub const UNKNOWN_ROLE: &str = "Unknown";

// ---------------------------------------------------------------------------
// RoleCatalog
// ---------------------------------------------------------------------------

/// Role-score fields applicable to one position, in tie-break order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoleGroup {
    pub position: String,
    pub roles: Vec<String>,
}

/// Position → applicable role-score fields.
///
/// Positions are matched by exact equality. The catalog is data, not code:
/// it changes between sheet releases and can be loaded from JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RoleCatalog {
    groups: Vec<RoleGroup>,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        const P: &str = " Percentile";
        let group = |position: &str, roles: &[&str]| RoleGroup {
            position: position.to_string(),
            roles: roles.iter().map(|r| format!("{r}{P}")).collect(),
        };
        Self::new(vec![
            group("Defender", &["Dominant Defender", "Ball Playing Defender"]),
            group("Fullback", &["Defensive Fullback", "Attacking Fullback"]),
            group(
                "Midfielder",
                &[
                    "Holding Midfielder",
                    "Ball Progressor",
                    "Number 10",
                    "Box Crasher",
                    "Half Space Creator",
                ],
            ),
            group(
                "Winger",
                &["Half Space Creator", "Inverted Winger", "Creative Winger"],
            ),
            group(
                "Striker",
                &["Advanced Striker", "Physical Striker", "Creative Striker"],
            ),
        ])
    }
}

impl RoleCatalog {
    pub fn new(groups: Vec<RoleGroup>) -> Self {
        Self { groups }
    }

    /// Load a catalog from a JSON file of `[{"position": .., "roles": [..]}, ..]`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading role catalog {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing role catalog {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: RoleCatalog = serde_json::from_str(text)?;
        Ok(catalog)
    }

    /// Applicable fields for a position (exact match).
    pub fn roles_for(&self, position: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|g| g.position == position)
            .map(|g| g.roles.as_slice())
    }

    /// Every field in the catalog once, in first-declared order.
    pub fn role_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for role in self.groups.iter().flat_map(|g| &g.roles) {
            if !fields.contains(&role.as_str()) {
                fields.push(role);
            }
        }
        fields
    }

    /// Catalog fields the table does not carry; they score 0 for everyone.
    pub fn missing_fields(&self, table: &PlayerTable) -> Vec<&str> {
        self.role_fields()
            .into_iter()
            .filter(|f| !table.has_column(f))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Best-scoring role of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestRole<'a> {
    /// Winning role-score field name.
    Role(&'a str),
    /// The player's position has no catalog entry.
    Unknown,
}

impl BestRole<'_> {
    pub fn label(&self) -> &str {
        match self {
            BestRole::Role(field) => field,
            BestRole::Unknown => UNKNOWN_ROLE,
        }
    }
}

impl fmt::Display for BestRole<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pick the highest-scoring applicable role for a player.
///
/// Ties go to the field declared first in the catalog. A field the record
/// does not carry scores 0.
pub fn classify<'a>(record: &PlayerRecord, catalog: &'a RoleCatalog) -> BestRole<'a> {
    let Some(roles) = record
        .get(POSITION)
        .and_then(|p| catalog.roles_for(&p.to_string()))
    else {
        return BestRole::Unknown;
    };

    let mut best: Option<(&'a str, f64)> = None;
    for field in roles {
        let score = record.number(field);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((field.as_str(), score)),
        }
    }
    best.map_or(BestRole::Unknown, |(field, _)| BestRole::Role(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{table, text};
    use crate::data::model::CellValue;

    fn catalog() -> RoleCatalog {
        RoleCatalog::new(vec![
            RoleGroup {
                position: "Defender".into(),
                roles: vec!["Dominant Defender".into(), "Ball Playing Defender".into()],
            },
            RoleGroup {
                position: "Winger".into(),
                roles: vec!["Inverted Winger".into(), "Creative Winger".into()],
            },
        ])
    }

    fn player(position: &str, scores: &[(&str, f64)]) -> PlayerRecord {
        let mut cols = vec![POSITION];
        let mut row = vec![text(position)];
        for (name, score) in scores {
            cols.push(*name);
            row.push(CellValue::Float(*score));
        }
        table(&cols, vec![row]).records.remove(0)
    }

    #[test]
    fn picks_highest_applicable_score() {
        let p = player(
            "Defender",
            &[("Dominant Defender", 80.0), ("Ball Playing Defender", 55.0)],
        );
        assert_eq!(classify(&p, &catalog()), BestRole::Role("Dominant Defender"));
    }

    #[test]
    fn ignores_fields_of_other_positions() {
        let p = player(
            "Defender",
            &[
                ("Dominant Defender", 10.0),
                ("Ball Playing Defender", 20.0),
                ("Creative Winger", 99.0),
            ],
        );
        assert_eq!(classify(&p, &catalog()).label(), "Ball Playing Defender");
    }

    #[test]
    fn ties_go_to_catalog_order() {
        let p = player(
            "Winger",
            &[("Creative Winger", 70.0), ("Inverted Winger", 70.0)],
        );
        assert_eq!(classify(&p, &catalog()), BestRole::Role("Inverted Winger"));
    }

    #[test]
    fn unknown_position_is_unknown() {
        let p = player("Goalkeeper", &[("Dominant Defender", 90.0)]);
        assert_eq!(classify(&p, &catalog()), BestRole::Unknown);
        assert_eq!(classify(&p, &catalog()).to_string(), UNKNOWN_ROLE);
    }

    #[test]
    fn position_match_is_exact() {
        let p = player("Defensive Defender", &[("Dominant Defender", 90.0)]);
        assert_eq!(classify(&p, &catalog()), BestRole::Unknown);
    }

    #[test]
    fn missing_field_scores_zero() {
        let p = player("Defender", &[("Ball Playing Defender", 5.0)]);
        assert_eq!(classify(&p, &catalog()), BestRole::Role("Ball Playing Defender"));

        let none = player("Defender", &[]);
        assert_eq!(classify(&none, &catalog()), BestRole::Role("Dominant Defender"));
    }

    #[test]
    fn winner_is_a_catalog_member_with_max_score() {
        let cat = RoleCatalog::default();
        let scores = [
            ("Holding Midfielder Percentile", 41.0),
            ("Ball Progressor Percentile", 88.0),
            ("Number 10 Percentile", 88.0),
            ("Box Crasher Percentile", 12.0),
            ("Half Space Creator Percentile", 60.0),
        ];
        let p = player("Midfielder", &scores);
        let best = classify(&p, &cat);
        let roles = cat.roles_for("Midfielder").unwrap();
        assert!(roles.iter().any(|r| r == best.label()));
        assert!(roles.iter().all(|r| p.number(best.label()) >= p.number(r)));
        assert_eq!(best.label(), "Ball Progressor Percentile");
    }

    #[test]
    fn role_fields_are_unique_in_declared_order() {
        let cat = RoleCatalog::default();
        let fields = cat.role_fields();
        assert_eq!(fields.len(), 14);
        assert_eq!(fields[0], "Dominant Defender Percentile");
        assert_eq!(fields[8], "Half Space Creator Percentile");
        assert_eq!(fields[9], "Inverted Winger Percentile");
    }

    #[test]
    fn catalog_loads_from_json() {
        let cat = RoleCatalog::from_json(
            r#"[{"position": "Striker", "roles": ["Advanced Striker Rank", "Target Man Rank"]}]"#,
        )
        .unwrap();
        assert_eq!(
            cat.roles_for("Striker"),
            Some(&["Advanced Striker Rank".to_string(), "Target Man Rank".to_string()][..])
        );
        assert!(cat.roles_for("Defender").is_none());
        assert!(RoleCatalog::from_json("{}").is_err());
    }

    #[test]
    fn reports_fields_missing_from_schema() {
        let t = table(&[POSITION, "Dominant Defender"], vec![]);
        assert_eq!(catalog().missing_fields(&t).len(), 3);
    }
}
