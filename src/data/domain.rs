//! Enriched character model
//!
//! A [`DomainCharacter`] is built on demand by layering an API
//! [`CharacterRecord`] over the partial data scraped from the wiki
//! ([`Enrichment`]). It is never cached itself.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::CharacterRecord;

/// Card rarity tier, ordered `N < R < SR < SSR < UR`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rarity {
    #[default]
    N,
    R,
    SR,
    SSR,
    UR,
}

impl Rarity {
    /// Maps a 1-5 star count to a tier; anything else is `N`
    pub fn from_stars(stars: u32) -> Self {
        match stars {
            2 => Rarity::R,
            3 => Rarity::SR,
            4 => Rarity::SSR,
            5 => Rarity::UR,
            _ => Rarity::N,
        }
    }

    /// Rough tier guess from the game id, used when the wiki has none
    pub fn from_game_id(game_id: u32) -> Self {
        match game_id {
            0..=1009 => Rarity::UR,
            1010..=1099 => Rarity::SSR,
            1100..=1999 => Rarity::SR,
            2000..=2999 => Rarity::R,
            _ => Rarity::N,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Aptitude letter grade, ordered `G < F < ... < A < S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    G,
    F,
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Grade {
    /// Parses a single letter grade, ignoring surrounding whitespace and case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "G" => Some(Grade::G),
            "F" => Some(Grade::F),
            "E" => Some(Grade::E),
            "D" => Some(Grade::D),
            "C" => Some(Grade::C),
            "B" => Some(Grade::B),
            "A" => Some(Grade::A),
            "S" => Some(Grade::S),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What an aptitude grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AptitudeCategory {
    Surface,
    Distance,
    Strategy,
}

/// The ten graded aptitudes, in wiki order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AptitudeKind {
    Turf,
    Dirt,
    Short,
    Mile,
    Medium,
    Long,
    Front,
    Pace,
    Late,
    End,
}

impl AptitudeKind {
    /// Same order as the wiki's `aptitude` array
    pub const ALL: [AptitudeKind; 10] = [
        AptitudeKind::Turf,
        AptitudeKind::Dirt,
        AptitudeKind::Short,
        AptitudeKind::Mile,
        AptitudeKind::Medium,
        AptitudeKind::Long,
        AptitudeKind::Front,
        AptitudeKind::Pace,
        AptitudeKind::Late,
        AptitudeKind::End,
    ];

    pub fn category(&self) -> AptitudeCategory {
        match self {
            AptitudeKind::Turf | AptitudeKind::Dirt => AptitudeCategory::Surface,
            AptitudeKind::Short | AptitudeKind::Mile | AptitudeKind::Medium | AptitudeKind::Long => {
                AptitudeCategory::Distance
            }
            _ => AptitudeCategory::Strategy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AptitudeKind::Turf => "Turf",
            AptitudeKind::Dirt => "Dirt",
            AptitudeKind::Short => "Short",
            AptitudeKind::Mile => "Mile",
            AptitudeKind::Medium => "Medium",
            AptitudeKind::Long => "Long",
            AptitudeKind::Front => "Front",
            AptitudeKind::Pace => "Pace",
            AptitudeKind::Late => "Late",
            AptitudeKind::End => "End",
        }
    }

    /// Finds the aptitude of `category` whose label appears in `text`
    pub fn from_label(category: AptitudeCategory, text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        Self::ALL.into_iter().find(|kind| {
            kind.category() == category && text.contains(&kind.label().to_lowercase())
        })
    }
}

/// One graded aptitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aptitude {
    pub kind: AptitudeKind,
    pub grade: Grade,
}

/// The five base attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub speed: u32,
    pub stamina: u32,
    pub power: u32,
    pub guts: u32,
    pub intelligence: u32,
}

impl Stats {
    pub fn new(speed: u32, stamina: u32, power: u32, guts: u32, intelligence: u32) -> Self {
        Self {
            speed,
            stamina,
            power,
            guts,
            intelligence,
        }
    }

    /// Sum of the five attributes, computed on every call
    ///
    /// Widened to `u64` so that any five scraped values sum without overflow.
    pub fn total(&self) -> u64 {
        [
            self.speed,
            self.stamina,
            self.power,
            self.guts,
            self.intelligence,
        ]
        .into_iter()
        .map(u64::from)
        .sum()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Spd:{} Sta:{} Pow:{} Gut:{} Int:{} (Total:{})",
            self.speed,
            self.stamina,
            self.power,
            self.guts,
            self.intelligence,
            self.total()
        )
    }
}

/// Stat-profile classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterType {
    Runner,
    Stamina,
    Power,
    Guts,
    Intelligence,
}

/// Base-stat template per type, in `[speed, stamina, power, guts, intelligence]` order
const STAT_TEMPLATES: [(CharacterType, [u32; 5]); 5] = [
    (CharacterType::Runner, [90, 70, 65, 75, 80]),
    (CharacterType::Stamina, [70, 90, 75, 85, 75]),
    (CharacterType::Power, [70, 90, 90, 85, 75]),
    (CharacterType::Guts, [70, 90, 75, 95, 75]),
    (CharacterType::Intelligence, [70, 90, 75, 85, 95]),
];

impl CharacterType {
    pub fn description(&self) -> &'static str {
        match self {
            CharacterType::Runner => "Speed",
            CharacterType::Stamina => "Stamina",
            CharacterType::Power => "Power",
            CharacterType::Guts => "Guts",
            CharacterType::Intelligence => "Intelligence",
        }
    }

    /// Starting stats for a character of this type
    pub fn base_stats(&self) -> Stats {
        let [speed, stamina, power, guts, intelligence] = STAT_TEMPLATES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, stats)| *stats)
            .unwrap_or_default();
        Stats::new(speed, stamina, power, guts, intelligence)
    }

    /// Parses one of the five filter labels; other labels are free text
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "speed" => Some(CharacterType::Runner),
            "stamina" => Some(CharacterType::Stamina),
            "power" => Some(CharacterType::Power),
            "guts" => Some(CharacterType::Guts),
            "intelligence" => Some(CharacterType::Intelligence),
            _ => None,
        }
    }

    /// Free-text keywords that suggest this type in a strengths blurb
    pub fn strength_keywords(&self) -> &'static [&'static str] {
        TYPE_KEYWORDS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, words)| *words)
            .unwrap_or_default()
    }

    /// Heuristic classification of a strengths blurb; `Guts` when nothing matches
    pub fn from_strengths(strengths: Option<&str>) -> Self {
        let Some(text) = strengths else {
            return CharacterType::Guts;
        };
        let text = text.to_lowercase();
        TYPE_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| text.contains(word)))
            .map(|(kind, _)| *kind)
            .unwrap_or(CharacterType::Guts)
    }
}

/// Strength keywords per type, shared by classification and the type filter.
/// Checked in order, so a blurb matching several types takes the first.
/// "intelligen" covers both "intelligent" and "intelligence".
const TYPE_KEYWORDS: [(CharacterType, &[&str]); 5] = [
    (CharacterType::Runner, &["speed", "fast", "sprint"]),
    (CharacterType::Stamina, &["stamina", "endurance"]),
    (CharacterType::Power, &["power", "strength"]),
    (CharacterType::Intelligence, &["intelligen", "smart"]),
    (CharacterType::Guts, &["guts", "brave"]),
];

/// Partial character data recovered from the wiki
///
/// Every field may be missing; an empty value means nothing was recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub rarity: Option<Rarity>,
    pub speed: Option<u32>,
    pub stamina: Option<u32>,
    pub power: Option<u32>,
    pub guts: Option<u32>,
    pub intelligence: Option<u32>,
    pub aptitudes: BTreeMap<AptitudeKind, Grade>,
    pub skills: Vec<String>,
    pub biography: Option<String>,
    pub relationships: Vec<String>,
}

impl Enrichment {
    /// Number of recovered fields, each stat and aptitude counting once
    pub fn field_count(&self) -> usize {
        let singles = [
            self.rarity.is_some(),
            self.speed.is_some(),
            self.stamina.is_some(),
            self.power.is_some(),
            self.guts.is_some(),
            self.intelligence.is_some(),
            !self.skills.is_empty(),
            self.biography.is_some(),
            !self.relationships.is_empty(),
        ];
        singles.iter().filter(|present| **present).count() + self.aptitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Stats when at least one attribute was recovered; the rest read as zero
    pub fn stats(&self) -> Option<Stats> {
        let parts = [
            self.speed,
            self.stamina,
            self.power,
            self.guts,
            self.intelligence,
        ];
        if parts.iter().all(Option::is_none) {
            return None;
        }
        let [speed, stamina, power, guts, intelligence] = parts.map(|v| v.unwrap_or(0));
        Some(Stats::new(speed, stamina, power, guts, intelligence))
    }

    pub fn set_stats(&mut self, stats: Stats) {
        self.speed = Some(stats.speed);
        self.stamina = Some(stats.stamina);
        self.power = Some(stats.power);
        self.guts = Some(stats.guts);
        self.intelligence = Some(stats.intelligence);
    }

    /// Copies every field `other` recovered that `self` is still missing
    pub fn fill_from(&mut self, other: Enrichment) {
        self.rarity = self.rarity.or(other.rarity);
        self.speed = self.speed.or(other.speed);
        self.stamina = self.stamina.or(other.stamina);
        self.power = self.power.or(other.power);
        self.guts = self.guts.or(other.guts);
        self.intelligence = self.intelligence.or(other.intelligence);
        for (kind, grade) in other.aptitudes {
            self.aptitudes.entry(kind).or_insert(grade);
        }
        if self.skills.is_empty() {
            self.skills = other.skills;
        }
        if self.biography.is_none() {
            self.biography = other.biography;
        }
        if self.relationships.is_empty() {
            self.relationships = other.relationships;
        }
    }
}

/// Normalized character: API profile plus wiki stats, aptitudes and skills
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainCharacter {
    pub id: u32,
    pub name: Option<String>,
    pub japanese_name: Option<String>,
    pub rarity: Rarity,
    pub character_type: Option<CharacterType>,
    pub stats: Stats,
    pub aptitudes: Vec<Aptitude>,
    pub skills: Vec<String>,
    pub biography: Option<String>,
    pub relationships: Vec<String>,

    pub profile: Option<String>,
    pub slogan: Option<String>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    pub height: u32,
    pub weight: Option<String>,
    pub bust: u32,
    pub waist: u32,
    pub hip: u32,
    pub shoe_size: Option<String>,
    pub birth_month: u32,
    pub birth_day: u32,
    pub residence: Option<String>,
    pub ears_fact: Option<String>,
    pub tail_fact: Option<String>,
    pub family_fact: Option<String>,
    pub color_main: Option<String>,
    pub color_sub: Option<String>,
    pub thumbnail_image_url: Option<String>,
    pub detail_image_url: Option<String>,
    pub sns_icon_url: Option<String>,
    pub category_label: Option<String>,
    pub grade: Option<String>,
}

impl DomainCharacter {
    /// Builds a character from the wiki data alone
    pub fn from_enrichment(enrichment: &Enrichment) -> Self {
        Self {
            rarity: enrichment.rarity.unwrap_or_default(),
            stats: enrichment.stats().unwrap_or_default(),
            aptitudes: enrichment
                .aptitudes
                .iter()
                .map(|(kind, grade)| Aptitude {
                    kind: *kind,
                    grade: *grade,
                })
                .collect(),
            skills: enrichment.skills.clone(),
            biography: enrichment.biography.clone(),
            relationships: enrichment.relationships.clone(),
            ..Self::default()
        }
    }

    /// Layers `record` over `enrichment`
    ///
    /// API fields (names, profile, physical attributes, lore, images) always win.
    /// Rarity and stats come from the wiki and fall back to heuristics on the
    /// record when the wiki had nothing; the type is read from the strengths blurb.
    pub fn merge(record: &CharacterRecord, enrichment: &Enrichment) -> Self {
        let mut character = Self::from_enrichment(enrichment);

        if enrichment.rarity.is_none() {
            character.rarity = Rarity::from_game_id(record.game_id);
        }
        let character_type = CharacterType::from_strengths(record.strengths.as_deref());
        character.character_type = Some(character_type);
        if enrichment.stats().is_none() {
            character.stats = character_type.base_stats();
        }

        character.id = record.game_id;
        character.name = record.name_english.clone();
        character.japanese_name = record.name_japanese.clone();
        character.profile = record.profile.clone();
        character.slogan = record.slogan.clone();
        character.strengths = record.strengths.clone();
        character.weaknesses = record.weaknesses.clone();
        character.height = record.height;
        character.weight = record.weight.clone();
        character.bust = record.bust;
        character.waist = record.waist;
        character.hip = record.hip;
        character.shoe_size = record.shoe_size.clone();
        character.birth_month = record.birth_month;
        character.birth_day = record.birth_day;
        character.residence = record.residence.clone();
        character.ears_fact = record.ears_fact.clone();
        character.tail_fact = record.tail_fact.clone();
        character.family_fact = record.family_fact.clone();
        character.color_main = record.color_main.clone();
        character.color_sub = record.color_sub.clone();
        character.thumbnail_image_url = record.thumbnail_image_url.clone();
        character.detail_image_url = record.detail_image_pc_url.clone();
        character.sns_icon_url = record.sns_icon_url.clone();
        character.category_label = record
            .category_label_en
            .clone()
            .or_else(|| record.category_label.clone());
        character.grade = record.grade.clone();

        character
    }

    /// Always the live sum of the five stats
    pub fn total_stats(&self) -> u64 {
        self.stats.total()
    }

    pub fn aptitude(&self, kind: AptitudeKind) -> Option<Grade> {
        self.aptitudes
            .iter()
            .find(|aptitude| aptitude.kind == kind)
            .map(|aptitude| aptitude.grade)
    }

    /// The better surface; ties go to turf
    pub fn primary_surface(&self) -> Option<AptitudeKind> {
        match (self.aptitude(AptitudeKind::Turf), self.aptitude(AptitudeKind::Dirt)) {
            (Some(turf), Some(dirt)) if dirt > turf => Some(AptitudeKind::Dirt),
            (Some(_), _) => Some(AptitudeKind::Turf),
            (None, Some(_)) => Some(AptitudeKind::Dirt),
            (None, None) => None,
        }
    }

    /// Comparator for "sort by rarity, highest first"
    pub fn cmp_by_rarity_desc(a: &Self, b: &Self) -> Ordering {
        b.rarity.cmp(&a.rarity)
    }
}

impl fmt::Display for DomainCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] - {} | Total: {}",
            self.name.as_deref().unwrap_or("Unknown"),
            self.rarity,
            self.character_type.map(|t| t.description()).unwrap_or("-"),
            self.total_stats()
        )?;
        if let Some(surface) = self.primary_surface() {
            write!(f, " | {}", surface.label())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_stats_is_sum_of_components() {
        let mut character = DomainCharacter {
            stats: Stats::new(90, 70, 65, 75, 80),
            ..DomainCharacter::default()
        };
        assert_eq!(character.total_stats(), 380);

        character.stats.speed = 100;
        assert_eq!(character.total_stats(), 390);

        character.stats.intelligence = 0;
        assert_eq!(character.total_stats(), 310);
    }

    #[test]
    fn test_total_of_maximal_stats_does_not_overflow() {
        let stats = Stats::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX, u32::MAX);

        assert_eq!(stats.total(), 5 * u64::from(u32::MAX));
        assert!(stats.to_string().ends_with("(Total:21474836475)"));
    }

    #[test]
    fn test_rarity_ordering() {
        assert!(Rarity::UR > Rarity::SSR);
        assert!(Rarity::SSR > Rarity::SR);
        assert!(Rarity::SR > Rarity::R);
        assert!(Rarity::R > Rarity::N);
    }

    #[test]
    fn test_sort_by_rarity_descending() {
        let rarities = [Rarity::R, Rarity::UR, Rarity::N, Rarity::SSR, Rarity::SR];
        let mut characters: Vec<DomainCharacter> = rarities
            .into_iter()
            .map(|rarity| DomainCharacter {
                rarity,
                ..DomainCharacter::default()
            })
            .collect();

        characters.sort_by(DomainCharacter::cmp_by_rarity_desc);

        let order: Vec<Rarity> = characters.iter().map(|c| c.rarity).collect();
        assert_eq!(
            order,
            vec![Rarity::UR, Rarity::SSR, Rarity::SR, Rarity::R, Rarity::N]
        );
    }

    #[test]
    fn test_rarity_from_stars() {
        assert_eq!(Rarity::from_stars(1), Rarity::N);
        assert_eq!(Rarity::from_stars(3), Rarity::SR);
        assert_eq!(Rarity::from_stars(5), Rarity::UR);
        assert_eq!(Rarity::from_stars(0), Rarity::N);
        assert_eq!(Rarity::from_stars(9), Rarity::N);
    }

    #[test]
    fn test_rarity_from_game_id() {
        assert_eq!(Rarity::from_game_id(1001), Rarity::UR);
        assert_eq!(Rarity::from_game_id(1052), Rarity::SSR);
        assert_eq!(Rarity::from_game_id(1500), Rarity::SR);
        assert_eq!(Rarity::from_game_id(2500), Rarity::R);
        assert_eq!(Rarity::from_game_id(9001), Rarity::N);
    }

    #[test]
    fn test_grade_parse_and_order() {
        assert_eq!(Grade::parse(" a "), Some(Grade::A));
        assert_eq!(Grade::parse("S"), Some(Grade::S));
        assert_eq!(Grade::parse("X"), None);
        assert!(Grade::S > Grade::A);
        assert!(Grade::F > Grade::G);
    }

    #[test]
    fn test_aptitude_kind_from_label() {
        assert_eq!(
            AptitudeKind::from_label(AptitudeCategory::Strategy, "Front Runner"),
            Some(AptitudeKind::Front)
        );
        assert_eq!(
            AptitudeKind::from_label(AptitudeCategory::Distance, "Medium"),
            Some(AptitudeKind::Medium)
        );
        assert_eq!(AptitudeKind::from_label(AptitudeCategory::Surface, "Mile"), None);
    }

    #[test]
    fn test_type_templates() {
        assert_eq!(CharacterType::Runner.base_stats(), Stats::new(90, 70, 65, 75, 80));
        assert_eq!(CharacterType::Power.base_stats().power, 90);
        assert_eq!(CharacterType::Guts.base_stats().guts, 95);
        assert_eq!(CharacterType::Intelligence.base_stats().intelligence, 95);
    }

    #[test]
    fn test_type_from_strengths() {
        let classify = |text: &str| CharacterType::from_strengths(Some(text));
        assert_eq!(classify("Very FAST starts"), CharacterType::Runner);
        assert_eq!(classify("endurance"), CharacterType::Stamina);
        assert_eq!(classify("Eating lots"), CharacterType::Guts);
        assert_eq!(CharacterType::from_strengths(None), CharacterType::Guts);
    }

    #[test]
    fn test_classification_agrees_with_type_keywords() {
        let classify = |text: &str| CharacterType::from_strengths(Some(text));
        assert_eq!(classify("Intelligent pacing"), CharacterType::Intelligence);
        assert_eq!(classify("Raw intelligence"), CharacterType::Intelligence);
        assert_eq!(classify("A late sprint"), CharacterType::Runner);

        for kind in [
            CharacterType::Runner,
            CharacterType::Stamina,
            CharacterType::Power,
            CharacterType::Guts,
            CharacterType::Intelligence,
        ] {
            for word in kind.strength_keywords() {
                assert_eq!(classify(word), kind, "keyword {word:?}");
            }
        }
    }

    #[test]
    fn test_type_labels_are_the_five_stats() {
        assert_eq!(CharacterType::from_label(" Speed "), Some(CharacterType::Runner));
        assert_eq!(
            CharacterType::from_label("intelligence"),
            Some(CharacterType::Intelligence)
        );
        assert_eq!(CharacterType::from_label("runner"), None);
        assert_eq!(CharacterType::from_label("wisdom"), None);
        assert_eq!(CharacterType::from_label("wit"), None);
    }

    #[test]
    fn test_merge_prefers_api_fields_and_keeps_wiki_stats() {
        let record = CharacterRecord {
            game_id: 1001,
            name_english: Some("Special Week".to_string()),
            profile: Some("From Hokkaido".to_string()),
            height: 158,
            strengths: Some("fast".to_string()),
            ..CharacterRecord::default()
        };
        let mut enrichment = Enrichment {
            rarity: Some(Rarity::SR),
            biography: Some("Wiki biography".to_string()),
            skills: vec!["Shooting Star".to_string()],
            ..Enrichment::default()
        };
        enrichment.set_stats(Stats::new(102, 87, 77, 96, 88));
        enrichment.aptitudes.insert(AptitudeKind::Turf, Grade::A);
        enrichment.aptitudes.insert(AptitudeKind::Dirt, Grade::G);

        let character = DomainCharacter::merge(&record, &enrichment);

        assert_eq!(character.id, 1001);
        assert_eq!(character.name.as_deref(), Some("Special Week"));
        assert_eq!(character.profile.as_deref(), Some("From Hokkaido"));
        assert_eq!(character.height, 158);
        assert_eq!(character.rarity, Rarity::SR);
        assert_eq!(character.stats, Stats::new(102, 87, 77, 96, 88));
        assert_eq!(character.total_stats(), 450);
        assert_eq!(character.skills, vec!["Shooting Star".to_string()]);
        assert_eq!(character.biography.as_deref(), Some("Wiki biography"));
        assert_eq!(character.primary_surface(), Some(AptitudeKind::Turf));
    }

    #[test]
    fn test_merge_without_wiki_data_uses_heuristics() {
        let record = CharacterRecord {
            game_id: 1050,
            strengths: Some("Has great stamina".to_string()),
            ..CharacterRecord::default()
        };

        let character = DomainCharacter::merge(&record, &Enrichment::default());

        assert_eq!(character.rarity, Rarity::SSR);
        assert_eq!(character.character_type, Some(CharacterType::Stamina));
        assert_eq!(character.stats, CharacterType::Stamina.base_stats());
        assert!(character.aptitudes.is_empty());
    }

    #[test]
    fn test_enrichment_field_count_and_fill() {
        let mut primary = Enrichment {
            rarity: Some(Rarity::UR),
            speed: Some(100),
            ..Enrichment::default()
        };
        assert_eq!(primary.field_count(), 2);

        let mut fallback = Enrichment {
            rarity: Some(Rarity::N),
            stamina: Some(80),
            skills: vec!["Corner Recovery".to_string()],
            ..Enrichment::default()
        };
        fallback.aptitudes.insert(AptitudeKind::Long, Grade::B);

        primary.fill_from(fallback);

        assert_eq!(primary.rarity, Some(Rarity::UR), "existing values are kept");
        assert_eq!(primary.stamina, Some(80));
        assert_eq!(primary.aptitudes.get(&AptitudeKind::Long), Some(&Grade::B));
        assert_eq!(primary.field_count(), 5);
        assert_eq!(primary.stats(), Some(Stats::new(100, 80, 0, 0, 0)));
        assert!(Enrichment::default().stats().is_none());
        assert!(Enrichment::default().is_empty());
    }

    #[test]
    fn test_primary_surface_prefers_strictly_better_dirt() {
        let mut character = DomainCharacter::default();
        assert_eq!(character.primary_surface(), None);

        character.aptitudes = vec![
            Aptitude { kind: AptitudeKind::Turf, grade: Grade::B },
            Aptitude { kind: AptitudeKind::Dirt, grade: Grade::B },
        ];
        assert_eq!(character.primary_surface(), Some(AptitudeKind::Turf));

        character.aptitudes[1].grade = Grade::A;
        assert_eq!(character.primary_surface(), Some(AptitudeKind::Dirt));
    }
}
