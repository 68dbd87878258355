//! Data models for the Umapyoi character API
//!
//! This module holds the raw response shapes returned by the API endpoints.
//! The enriched, normalized character lives in [`domain`].

pub mod domain;

pub use domain::{
    Aptitude, AptitudeCategory, AptitudeKind, CharacterType, DomainCharacter, Enrichment, Grade,
    Rarity, Stats,
};

use serde::{Deserialize, Serialize};

/// A character exactly as `GET /character/{id}` returns it
///
/// Every field is optional on the wire; missing numbers decode as zero and
/// missing strings as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRecord {
    /// Internal API id (e.g. 4737)
    #[serde(rename = "id")]
    pub api_id: u32,
    /// Game character id (e.g. 1001 for Special Week)
    pub game_id: u32,
    pub row_number: u32,

    #[serde(rename = "name_en")]
    pub name_english: Option<String>,
    #[serde(rename = "name_jp")]
    pub name_japanese: Option<String>,
    #[serde(rename = "name_en_internal")]
    pub name_internal: Option<String>,
    pub preferred_url: Option<String>,

    pub profile: Option<String>,
    pub slogan: Option<String>,
    pub grade: Option<String>,

    /// Height in centimeters
    pub height: u32,
    pub weight: Option<String>,
    #[serde(rename = "size_b")]
    pub bust: u32,
    #[serde(rename = "size_w")]
    pub waist: u32,
    #[serde(rename = "size_h")]
    pub hip: u32,
    pub shoe_size: Option<String>,

    pub category_label: Option<String>,
    pub category_label_en: Option<String>,
    pub category_value: Option<String>,

    pub birth_month: u32,
    pub birth_day: u32,

    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    pub ears_fact: Option<String>,
    pub tail_fact: Option<String>,
    pub family_fact: Option<String>,
    pub residence: Option<String>,

    pub color_main: Option<String>,
    pub color_sub: Option<String>,

    #[serde(rename = "thumb_img")]
    pub thumbnail_image_url: Option<String>,
    #[serde(rename = "detail_img_pc")]
    pub detail_image_pc_url: Option<String>,
    #[serde(rename = "detail_img_sp")]
    pub detail_image_sp_url: Option<String>,
    #[serde(rename = "sns_icon")]
    pub sns_icon_url: Option<String>,
    #[serde(rename = "sns_header")]
    pub sns_header_url: Option<String>,
    #[serde(rename = "voice")]
    pub voice_clip_url: Option<String>,
    #[serde(rename = "link")]
    pub official_link: Option<String>,

    #[serde(rename = "date_gmt")]
    pub date_created: Option<String>,
    #[serde(rename = "modified_gmt")]
    pub date_modified: Option<String>,
}

impl CharacterRecord {
    pub fn english_name(&self) -> &str {
        self.name_english.as_deref().unwrap_or("")
    }

    /// Birthday as "MM/DD", or "Unknown" when either part is missing
    pub fn formatted_birthday(&self) -> String {
        if self.birth_month > 0 && self.birth_day > 0 {
            format!("{:02}/{:02}", self.birth_month, self.birth_day)
        } else {
            "Unknown".to_string()
        }
    }

    /// Case-insensitive equality against the English or Japanese name
    pub fn matches_name_exactly(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return false;
        }
        [&self.name_english, &self.name_japanese]
            .into_iter()
            .flatten()
            .any(|name| name.trim().to_lowercase() == term)
    }

    /// Case-insensitive substring match on either name or the profile text
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return false;
        }
        [&self.name_english, &self.name_japanese, &self.profile]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&term))
    }

    /// One-line summary: name, height, birthday and grade
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) | Height: {}cm | Birthday: {} | Grade: {}",
            self.english_name(),
            self.name_japanese.as_deref().unwrap_or("-"),
            self.height,
            self.formatted_birthday(),
            self.grade.as_deref().unwrap_or("-"),
        )
    }
}

/// Artwork URLs from `GET /character/images/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterImages {
    pub icon: Option<String>,
    pub cover: Option<String>,
    pub illustration: Option<String>,
    pub full_body: Option<String>,
}

/// One entry from `GET /character/currentbirthdays`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBirthday {
    pub character_id: u32,
    pub month: u32,
    pub day: u32,
    pub birthday_date: Option<String>,
}

/// One entry from `GET /character/list`; only the consumed fields are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSummary {
    pub id: u32,
    pub name: String,
}
