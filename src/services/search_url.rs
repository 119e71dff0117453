use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::registry::CharacterRegistry;

/// Default external search page
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://uma.pure-db.com/#/search";

pub const MAX_BLUE_FACTORS: usize = 4;
pub const MAX_RED_FACTORS: usize = 3;

#[derive(Debug, Error)]
pub enum SearchUrlError {
    #[error("Too many {kind} factors: {count} (at most {max})")]
    TooManyFactors {
        kind: &'static str,
        count: usize,
        max: usize,
    },

    #[error("Factor count must be between 1 and 9, got {0}")]
    InvalidFactorCount(u8),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stat factors ("blue")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlueFactor {
    Speed,
    Stamina,
    Power,
    Guts,
    Wisdom,
    Total,
}

impl BlueFactor {
    pub fn group_id(self) -> i32 {
        match self {
            BlueFactor::Speed => 1,
            BlueFactor::Stamina => 2,
            BlueFactor::Power => 3,
            BlueFactor::Guts => 4,
            BlueFactor::Wisdom => 5,
            BlueFactor::Total => -1,
        }
    }
}

/// Aptitude factors ("red")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFactor {
    Turf,
    Dirt,
    Sprint,
    Mile,
    Medium,
    Long,
    Runner,
    Leader,
    Betweener,
    Chaser,
}

impl RedFactor {
    pub fn group_id(self) -> i32 {
        match self {
            RedFactor::Turf => 11,
            RedFactor::Dirt => 12,
            RedFactor::Runner => 21,
            RedFactor::Leader => 22,
            RedFactor::Betweener => 23,
            RedFactor::Chaser => 24,
            RedFactor::Sprint => 31,
            RedFactor::Mile => 32,
            RedFactor::Medium => 33,
            RedFactor::Long => 34,
        }
    }
}

/// Where a factor may come from in search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    All,
    Representative,
    Inherited,
}

impl SearchType {
    pub fn code(self) -> u8 {
        match self {
            SearchType::All => 0,
            SearchType::Representative => 1,
            SearchType::Inherited => 2,
        }
    }
}

/// Requested factor with its minimum star count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorFilter<K> {
    pub kind: K,
    #[serde(default = "default_factor_num")]
    pub num: u8,
    #[serde(rename = "searchType", default)]
    pub search_type: SearchType,
}

fn default_factor_num() -> u8 {
    1
}

/// Knobs of the search link beyond the filter output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(rename = "g1WinCount", default)]
    pub g1_win_count: Option<u32>,
    #[serde(rename = "searchCount", default)]
    pub search_count: Option<u32>,
    #[serde(rename = "whiteTotal", default)]
    pub white_total: Option<u32>,
    #[serde(rename = "whiteType", default)]
    pub white_type: SearchType,
    #[serde(rename = "blueFactors", default)]
    pub blue_factors: Vec<FactorFilter<BlueFactor>>,
    #[serde(rename = "redFactors", default)]
    pub red_factors: Vec<FactorFilter<RedFactor>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorParam {
    pub group_id: i32,
    pub num: u8,
    pub search_type: u8,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportCard {
    pub id: i64,
    pub limit_break: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceFilter {
    pub win_count: u32,
    pub g1_win_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhiteFactorFilter {
    pub num: u32,
    pub search_type: u8,
}

/// Payload encoded into the `searchInfo` query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchInfo {
    pub partner_card_ids: Vec<i64>,
    pub exclude_type: u8,
    pub exclude_card_ids: Vec<i64>,
    pub support_card: SupportCard,
    pub blue_factors: Vec<FactorParam>,
    pub red_factors: Vec<FactorParam>,
    pub green_factors: Vec<FactorParam>,
    pub common_factors: Vec<FactorParam>,
    pub race_factors: Vec<FactorParam>,
    pub scenario_factors: Vec<FactorParam>,
    pub other_factors: Vec<FactorParam>,
    pub race: RaceFilter,
    pub white_factor: WhiteFactorFilter,
    pub search_count: u32,
}

/// Fallbacks for options a request leaves out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDefaults {
    pub g1_win_count: u32,
    pub search_count: u32,
    pub white_total: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            g1_win_count: 0,
            search_count: 100,
            white_total: 0,
        }
    }
}

/// Builds search links that carry the filter result to the search site
#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    base_url: String,
    defaults: SearchDefaults,
}

impl SearchUrlBuilder {
    pub fn new(base_url: impl Into<String>, defaults: SearchDefaults) -> Self {
        Self {
            base_url: base_url.into(),
            defaults,
        }
    }

    /// Build the payload; only deployed card ids are included
    pub fn search_info<S: AsRef<str>>(
        &self,
        whitelist: &[S],
        blacklist: &[S],
        registry: &CharacterRegistry,
        options: &SearchOptions,
    ) -> Result<SearchInfo, SearchUrlError> {
        let blue_factors = factor_params(
            "blue",
            MAX_BLUE_FACTORS,
            options.blue_factors.iter().map(|f| (f.kind.group_id(), f.num, f.search_type)),
        )?;
        let red_factors = factor_params(
            "red",
            MAX_RED_FACTORS,
            options.red_factors.iter().map(|f| (f.kind.group_id(), f.num, f.search_type)),
        )?;

        Ok(SearchInfo {
            partner_card_ids: registry.deployed_ids(whitelist),
            exclude_type: 0,
            exclude_card_ids: registry.deployed_ids(blacklist),
            support_card: SupportCard {
                id: 0,
                limit_break: 4,
            },
            blue_factors,
            red_factors,
            green_factors: Vec::new(),
            common_factors: Vec::new(),
            race_factors: Vec::new(),
            scenario_factors: Vec::new(),
            other_factors: Vec::new(),
            race: RaceFilter {
                win_count: 0,
                g1_win_count: options.g1_win_count.unwrap_or(self.defaults.g1_win_count),
            },
            white_factor: WhiteFactorFilter {
                num: options.white_total.unwrap_or(self.defaults.white_total),
                search_type: options.white_type.code(),
            },
            search_count: options.search_count.unwrap_or(self.defaults.search_count),
        })
    }

    pub fn build<S: AsRef<str>>(
        &self,
        whitelist: &[S],
        blacklist: &[S],
        registry: &CharacterRegistry,
        options: &SearchOptions,
    ) -> Result<String, SearchUrlError> {
        let info = self.search_info(whitelist, blacklist, registry, options)?;
        self.encode(&info)
    }

    pub fn encode(&self, info: &SearchInfo) -> Result<String, SearchUrlError> {
        let json = serde_json::to_string(info)?;
        Ok(format!(
            "{}?searchInfo={}",
            self.base_url,
            URL_SAFE.encode(json.as_bytes())
        ))
    }
}

impl Default for SearchUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BASE_URL, SearchDefaults::default())
    }
}

fn factor_params(
    kind: &'static str,
    max: usize,
    factors: impl ExactSizeIterator<Item = (i32, u8, SearchType)>,
) -> Result<Vec<FactorParam>, SearchUrlError> {
    if factors.len() > max {
        return Err(SearchUrlError::TooManyFactors {
            kind,
            count: factors.len(),
            max,
        });
    }
    factors
        .map(|(group_id, num, search_type)| {
            if !(1..=9).contains(&num) {
                return Err(SearchUrlError::InvalidFactorCount(num));
            }
            Ok(FactorParam {
                group_id,
                num,
                search_type: search_type.code(),
                enabled: true,
            })
        })
        .collect()
}
