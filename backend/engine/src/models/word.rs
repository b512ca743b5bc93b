use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vocabulary entry stored in the "words" collection.
///
/// Words are never deleted; retiring an entry flips `is_active` so that past
/// sessions keep resolving their word ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub text: String,
    pub meaning_primary: String,
    pub meaning_secondary: String,
    pub domain: Domain,
    pub period: Period,
    pub modern_equivalent: String,
    pub status: WordStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    // Usage statistics, updated after each completed session
    #[serde(default)]
    pub times_used: u32,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub wrong_count: u32,
    pub created_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    Volume,
    Time,
    Measurement,
    Nature,
    Culture,
    Food,
    Clothing,
    Architecture,
    Agriculture,
    Trade,
    Other,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Volume => "Volume",
            Domain::Time => "Time",
            Domain::Measurement => "Measurement",
            Domain::Nature => "Nature",
            Domain::Culture => "Culture",
            Domain::Food => "Food",
            Domain::Clothing => "Clothing",
            Domain::Architecture => "Architecture",
            Domain::Agriculture => "Agriculture",
            Domain::Trade => "Trade",
            Domain::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    PreClassical,
    Ancient,
    ClassicalMedieval,
    Modern,
    Contemporary,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::PreClassical => "Pre-Classical",
            Period::Ancient => "Ancient",
            Period::ClassicalMedieval => "Classical/Medieval",
            Period::Modern => "Modern",
            Period::Contemporary => "Contemporary",
        }
    }
}

/// How the word survives in the living language today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Traditional,
    Archaic,
    Obsolete,
    Rare,
    Historical,
}

impl WordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::Traditional => "traditional; still seen rurally",
            WordStatus::Archaic => "archaic",
            WordStatus::Obsolete => "obsolete",
            WordStatus::Rare => "rare",
            WordStatus::Historical => "historical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Catalog filter for sampling and lookups. Only active words ever match.
#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    pub difficulty: Option<Difficulty>,
    pub domain: Option<Domain>,
    pub period: Option<Period>,
    pub exclude_ids: Vec<String>,
}

impl WordFilter {
    pub fn matches(&self, word: &Word) -> bool {
        if !word.is_active {
            return false;
        }
        if self.difficulty.is_some_and(|d| word.difficulty != d) {
            return false;
        }
        if self.domain.is_some_and(|d| word.domain != d) {
            return false;
        }
        if self.period.is_some_and(|p| word.period != p) {
            return false;
        }
        !self.exclude_ids.iter().any(|id| *id == word.id)
    }
}

impl Word {
    /// Records one answered question referencing this word.
    pub fn update_usage_stats(&mut self, is_correct: bool) {
        self.times_used += 1;
        if is_correct {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
        }
    }

    /// Observed difficulty on a 0-100 scale: the nominal difficulty band
    /// shifted by up to +/-20 based on actual answer accuracy. A word that
    /// has never been used scores a flat 50.
    pub fn difficulty_score(&self) -> f64 {
        if self.times_used == 0 {
            return 50.0;
        }

        let accuracy = f64::from(self.correct_count) / f64::from(self.times_used);
        let base_score = match self.difficulty {
            Difficulty::Easy => 20.0,
            Difficulty::Medium => 50.0,
            Difficulty::Hard => 80.0,
        };

        let adjustment = (accuracy - 0.5) * 20.0;
        (base_score + adjustment).clamp(0.0, 100.0)
    }

    /// The four fixed hint strings shown during the hints game.
    pub fn hint_candidates(&self) -> [String; 4] {
        [
            format!("Domain: {}", self.domain.as_str()),
            format!("Period: {}", self.period.as_str()),
            format!("Modern equivalent: {}", self.modern_equivalent),
            format!("Status: {}", self.status.as_str()),
        ]
    }
}
