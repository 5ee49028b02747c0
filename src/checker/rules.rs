use crate::MonitorError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// One canonical region name and the spellings that must not be used for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionNameEntry {
    pub canonical: String,
    pub variants: Vec<String>,
}

impl RegionNameEntry {
    pub fn new(canonical: &str, variants: &[&str]) -> Self {
        RegionNameEntry {
            canonical: canonical.to_string(),
            variants: variants.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Reference tables for the name and region checks.
///
/// Built once at start-up and handed to the checker; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub official_names: Vec<String>,
    #[serde(default)]
    pub regions: Vec<RegionNameEntry>,
}

impl Default for RuleBook {
    fn default() -> Self {
        RuleBook {
            official_names: vec![
                "Custodian of the Two Holy Mosques King Salman bin Abdulaziz Al Saud".to_string(),
                "His Royal Highness Prince Mohammed bin Salman bin Abdulaziz Al Saud, Crown Prince and Prime Minister".to_string(),
                "Minister of Foreign Affairs Prince Faisal bin Farhan bin Abdullah".to_string(),
                "Saudi Press Agency".to_string(),
            ],
            regions: vec![
                RegionNameEntry::new("Riyadh Region", &["Riyadh Province", "Riyadh province"]),
                RegionNameEntry::new("Makkah Region", &["Mecca Region", "Makkah Province", "Mecca Province"]),
                RegionNameEntry::new("Madinah Region", &["Medina Region", "Madinah Province", "Medina Province"]),
                RegionNameEntry::new("Eastern Province", &["Eastern Region", "Sharqiyah Region"]),
                RegionNameEntry::new("Asir Region", &["Aseer Province", "Asir Province"]),
                RegionNameEntry::new("AlUla", &["Al-Ula", "Al Ula"]),
            ],
        }
    }
}

impl RuleBook {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RuleBook, MonitorError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let rules: RuleBook = serde_json::from_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            names = rules.official_names.len(),
            regions = rules.regions.len(),
            "Loaded rule tables"
        );
        Ok(rules)
    }

    /// The tables in `path` when given, the built-in ones otherwise.
    pub fn load(path: Option<&Path>) -> Result<RuleBook, MonitorError> {
        match path {
            Some(p) => RuleBook::from_file(p),
            None => Ok(RuleBook::default()),
        }
    }
}
