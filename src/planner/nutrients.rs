//! Nutrient bookkeeping: snapshots of logged food, the per-100 g reference database, daily
//! targets derived from the user profile, and the progress bar math used by every display.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    error::{Candidate, PlannerError},
    normalize::Meal,
};

pub const DEFAULT_BAR_WIDTH: usize = 10;
const FILLED_GLYPH: &str = "#";
const EMPTY_GLYPH: &str = "-";

/// Reference values per 100 g.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodInfo {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbon: f64,
}

/// A materialized food entry of a day record. Values are copied out of the database at logging
/// time and don't change if the database is edited later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbon: f64,
}

fn round_2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

pub fn validate_weight(weight_grams: f64) -> Result<f64, PlannerError> {
    if weight_grams.is_finite() && weight_grams > 0. {
        Ok(weight_grams)
    } else {
        Err(PlannerError::InvalidWeight(weight_grams))
    }
}

pub fn compute_food_record(
    name: &str,
    reference: &FoodInfo,
    weight_grams: f64,
) -> Result<FoodLogEntry, PlannerError> {
    let weight = validate_weight(weight_grams)?;
    let factor = weight / 100.;
    Ok(FoodLogEntry {
        name: name.to_string(),
        weight,
        protein: round_2(reference.protein * factor),
        fat: round_2(reference.fat * factor),
        carbon: round_2(reference.carbon * factor),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Protein,
    Fat,
    Carbon,
    Name,
}

impl SortMode {
    /// Only the first letter matters: p, f, c. Everything else sorts by name.
    pub fn from_arg(arg: &str) -> Self {
        match arg.to_lowercase().chars().next() {
            Some('p') => SortMode::Protein,
            Some('f') => SortMode::Fat,
            Some('c') => SortMode::Carbon,
            _ => SortMode::Name,
        }
    }

    /// Nutrient orderings are descending, names ascending.
    pub fn is_descending(&self) -> bool {
        !matches!(self, SortMode::Name)
    }
}

/// The outcome of looking a food up by exact name or by snippet.
#[derive(Debug, PartialEq)]
pub struct ResolvedFood<'a> {
    pub name: &'a str,
    pub info: &'a FoodInfo,
    /// True when the name was not an exact key and the only substring match was picked.
    pub auto_selected: bool,
}

/// Food reference database keyed by lower-case name. Order is the file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodDatabase {
    entries: IndexMap<String, FoodInfo>,
}

impl FoodDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FoodInfo)> {
        self.entries.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn get(&self, name: &str) -> Option<&FoodInfo> {
        self.entries.get(name)
    }

    /// Adds a new food. Names are stored lower-cased.
    pub fn add(&mut self, name: &str, info: FoodInfo) -> Result<(), PlannerError> {
        let key = name.to_lowercase();
        if self.entries.contains_key(&key) {
            return Err(PlannerError::FoodAlreadyExists(name.to_string()));
        }
        self.entries.insert(key, info);
        Ok(())
    }

    pub fn sort(&mut self, mode: SortMode) {
        let nutrient = |info: &FoodInfo| match mode {
            SortMode::Protein => info.protein,
            SortMode::Fat => info.fat,
            SortMode::Carbon => info.carbon,
            SortMode::Name => 0.,
        };
        self.entries.sort_by(|a_name, a, b_name, b| match mode {
            SortMode::Name => a_name.cmp(b_name),
            _ => nutrient(b).total_cmp(&nutrient(a)),
        });
    }

    /// Looks up an exact key first and falls back to substring search. Several substring hits
    /// are returned as candidates numbered from 1 for the caller to choose from.
    pub fn resolve(&self, query: &str) -> Result<ResolvedFood<'_>, PlannerError> {
        let key = query.to_lowercase();
        if let Some((name, info)) = self.entries.get_key_value(&key) {
            return Ok(ResolvedFood {
                name,
                info,
                auto_selected: false,
            });
        }

        let matches = search_food_database(self, &key);
        match matches.as_slice() {
            [] => Err(PlannerError::FoodNotFound(query.to_string())),
            [(position, _)] => {
                let (name, info) = self
                    .entries
                    .get_index(position - 1)
                    .ok_or_else(|| PlannerError::FoodNotFound(query.to_string()))?;
                Ok(ResolvedFood {
                    name,
                    info,
                    auto_selected: true,
                })
            }
            _ => Err(PlannerError::Ambiguous {
                query: query.to_string(),
                candidates: matches
                    .iter()
                    .enumerate()
                    .map(|(i, (_, name))| Candidate {
                        position: i + 1,
                        key: name.clone(),
                    })
                    .collect(),
            }),
        }
    }
}

impl FromIterator<(String, FoodInfo)> for FoodDatabase {
    fn from_iter<T: IntoIterator<Item = (String, FoodInfo)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Every database key containing `query` (expected lower-case), with its 1-based position in
/// the database.
pub fn search_food_database(db: &FoodDatabase, query: &str) -> Vec<(usize, String)> {
    db.entries
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| name.contains(query))
        .map(|(i, (name, _))| (i + 1, name.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub tall: f64,
    #[serde(default)]
    pub protein_factor: f64,
    #[serde(default)]
    pub fat_factor: f64,
    #[serde(default)]
    pub carbon_factor: f64,
    #[serde(default)]
    pub water_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTargets {
    pub protein: f64,
    pub fat: f64,
    pub carbon: f64,
    pub water: f64,
}

pub fn daily_targets(profile: &UserProfile) -> DailyTargets {
    DailyTargets {
        protein: profile.protein_factor * profile.weight,
        fat: profile.fat_factor * profile.weight,
        carbon: profile.carbon_factor * profile.weight,
        water: profile.water_factor * (profile.tall + profile.weight),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub protein: f64,
    pub fat: f64,
    pub carbon: f64,
}

impl NutrientTotals {
    pub fn of_entries<'a>(entries: impl IntoIterator<Item = &'a FoodLogEntry>) -> Self {
        entries
            .into_iter()
            .fold(Self::default(), |totals, entry| NutrientTotals {
                protein: totals.protein + entry.protein,
                fat: totals.fat + entry.fat,
                carbon: totals.carbon + entry.carbon,
            })
    }

    pub fn of_day(food: &BTreeMap<Meal, Vec<FoodLogEntry>>) -> Self {
        Self::of_entries(food.values().flatten())
    }
}

/// Fixed-width textual progress of `current` against `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    pub label: String,
    pub filled: usize,
    pub width: usize,
    pub percent: u32,
    pub current: f64,
    pub target: f64,
}

pub fn render_bar(current: f64, target: f64, width: usize, label: &str) -> ProgressBar {
    let ratio = if target > 0. {
        (current / target).clamp(0., 1.)
    } else {
        0.
    };
    ProgressBar {
        label: label.to_string(),
        filled: (ratio * width as f64).floor() as usize,
        width,
        percent: (ratio * 100.).floor() as u32,
        current,
        target,
    }
}

impl ProgressBar {
    pub fn bar(&self) -> String {
        FILLED_GLYPH.repeat(self.filled) + &EMPTY_GLYPH.repeat(self.width - self.filled)
    }

    /// The two display lines, `unit` is appended to the target value.
    pub fn lines(&self, unit: &str) -> [String; 2] {
        [
            format!("{:<8} |{}|", self.label, self.bar()),
            format!(
                "         {:>3}% ({:.1}/{:.1}{unit})",
                self.percent, self.current, self.target
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> FoodDatabase {
        serde_json::from_str(
            r#"{
                "egg": {"protein": 13, "fat": 11, "carbon": 1},
                "chicken breast": {"protein": 31, "fat": 3.6, "carbon": 0},
                "chicken thigh": {"protein": 26, "fat": 10.9, "carbon": 0},
                "rice": {"protein": 2.7, "fat": 0.3, "carbon": 28}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let db: FoodDatabase =
            serde_json::from_str(r#"{"egg": {"protein": 1}, "rice": {}, "egg": {"protein": 13}}"#)
                .unwrap();
        let names = db.iter().map(|v| v.0).collect::<Vec<_>>();
        assert_eq!(names, vec!["egg", "rice"]);
        assert_eq!(db.get("egg").map(|v| v.protein), Some(13.));
    }

    #[test]
    fn test_compute_food_record_factor_one() {
        let db = test_db();
        let entry = compute_food_record("egg", db.get("egg").unwrap(), 100.).unwrap();
        assert_eq!(
            entry,
            FoodLogEntry {
                name: "egg".into(),
                weight: 100.,
                protein: 13.,
                fat: 11.,
                carbon: 1.,
            }
        );
    }

    #[test]
    fn test_compute_food_record_rounds_to_two_places() {
        let info = FoodInfo {
            protein: 2.7,
            fat: 0.335,
            carbon: 28.,
        };
        let entry = compute_food_record("rice", &info, 150.).unwrap();
        assert_eq!(entry.protein, 4.05);
        assert_eq!(entry.fat, 0.5);
        assert_eq!(entry.carbon, 42.);
    }

    #[test]
    fn test_compute_food_record_rejects_bad_weight() {
        let info = FoodInfo::default();
        assert_eq!(
            compute_food_record("egg", &info, 0.),
            Err(PlannerError::InvalidWeight(0.))
        );
        assert!(compute_food_record("egg", &info, -3.).is_err());
        assert!(compute_food_record("egg", &info, f64::NAN).is_err());
    }

    #[test]
    fn test_search_keeps_database_order() {
        let db = test_db();
        assert_eq!(
            search_food_database(&db, "chicken"),
            vec![(2, "chicken breast".into()), (3, "chicken thigh".into())]
        );
        assert!(search_food_database(&db, "tofu").is_empty());
    }

    #[test]
    fn test_resolve_exact_auto_and_ambiguous() {
        let db = test_db();

        let exact = db.resolve("EGG").unwrap();
        assert_eq!(exact.name, "egg");
        assert!(!exact.auto_selected);

        let auto = db.resolve("thi").unwrap();
        assert_eq!(auto.name, "chicken thigh");
        assert!(auto.auto_selected);

        assert_eq!(
            db.resolve("chicken"),
            Err(PlannerError::Ambiguous {
                query: "chicken".into(),
                candidates: vec![
                    Candidate {
                        position: 1,
                        key: "chicken breast".into()
                    },
                    Candidate {
                        position: 2,
                        key: "chicken thigh".into()
                    },
                ],
            })
        );

        assert_eq!(
            db.resolve("tofu"),
            Err(PlannerError::FoodNotFound("tofu".into()))
        );
    }

    #[test]
    fn test_add_and_sort() -> Result<(), PlannerError> {
        let mut db = test_db();
        db.add(
            "Tofu",
            FoodInfo {
                protein: 8.,
                fat: 4.8,
                carbon: 1.9,
            },
        )?;
        assert!(db.get("tofu").is_some());
        assert_eq!(
            db.add("tofu", FoodInfo::default()),
            Err(PlannerError::FoodAlreadyExists("tofu".into()))
        );

        db.sort(SortMode::from_arg("protein"));
        let names = db.iter().map(|v| v.0).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["chicken breast", "chicken thigh", "egg", "tofu", "rice"]
        );

        db.sort(SortMode::from_arg("name"));
        let names = db.iter().map(|v| v.0).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["chicken breast", "chicken thigh", "egg", "rice", "tofu"]
        );

        let text = serde_json::to_string(&db).unwrap();
        let reloaded: FoodDatabase = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded.iter().last().map(|v| v.0), Some("tofu"));
        assert!(text.find("\"rice\"") < text.find("\"tofu\""));
        Ok(())
    }

    #[test]
    fn test_render_bar_half() {
        let bar = render_bar(5., 10., DEFAULT_BAR_WIDTH, "Protein");
        assert_eq!(bar.filled, 5);
        assert_eq!(bar.percent, 50);
        assert_eq!(bar.bar(), "#####-----");
        assert_eq!(
            bar.lines("g"),
            [
                "Protein  |#####-----|".to_string(),
                "          50% (5.0/10.0g)".to_string()
            ]
        );
    }

    #[test]
    fn test_render_bar_caps_and_zero_target() {
        let over = render_bar(30., 10., DEFAULT_BAR_WIDTH, "Fat");
        assert_eq!(over.filled, 10);
        assert_eq!(over.percent, 100);

        let zero = render_bar(5., 0., DEFAULT_BAR_WIDTH, "Water");
        assert_eq!(zero.filled, 0);
        assert_eq!(zero.percent, 0);
        assert_eq!(zero.bar(), "----------");
    }

    #[test]
    fn test_daily_targets() {
        let profile = UserProfile {
            weight: 70.,
            tall: 180.,
            protein_factor: 1.6,
            fat_factor: 1.,
            carbon_factor: 3.,
            water_factor: 10.,
        };
        let targets = daily_targets(&profile);
        assert!((targets.protein - 112.).abs() < 1e-9);
        assert_eq!(targets.fat, 70.);
        assert_eq!(targets.carbon, 210.);
        assert_eq!(targets.water, 2500.);
    }

    #[test]
    fn test_totals_over_meals() {
        let db = test_db();
        let mut food = BTreeMap::new();
        food.insert(
            Meal::Breakfast,
            vec![compute_food_record("egg", db.get("egg").unwrap(), 100.).unwrap()],
        );
        food.insert(
            Meal::Dinner,
            vec![compute_food_record("egg", db.get("egg").unwrap(), 50.).unwrap()],
        );
        let totals = NutrientTotals::of_day(&food);
        assert_eq!(totals.protein, 19.5);
        assert_eq!(totals.fat, 16.5);
        assert_eq!(totals.carbon, 1.5);
    }
}
