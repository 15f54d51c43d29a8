use csv::StringRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Column holding the free-text full name (split-names).
    pub name_column: String,
    /// Column holding the campaign status keyword (filter).
    pub status_column: String,
    /// Accepted header spellings for the email column. Exports from different
    /// tools disagree on casing, so every alias is tried in order.
    pub email_columns: Vec<String>,
    /// Accepted header spellings for the LinkedIn URL column.
    pub linkedin_columns: Vec<String>,
    pub output_directory: Option<String>,
    /// Extra business-indicator substrings checked in addition to the
    /// built-in list when splitting names.
    pub extra_business_indicators: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_column: "Name".to_string(),
            status_column: "Lead Status".to_string(),
            email_columns: vec!["Email".to_string(), "email".to_string()],
            linkedin_columns: vec!["linkedIn".to_string(), "linkedinUrl".to_string()],
            output_directory: None,
            extra_business_indicators: vec![],
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// One side of a duplicate-email comparison: the fields worth showing a human
/// deciding which copy of the lead to keep.
#[derive(Debug, Clone)]
pub struct LeadSummary {
    pub name: String,
    pub campaign: String,
    pub status: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

/// Normalize an email or LinkedIn URL for set membership: trimmed, lowercased.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive header lookup. The first header may carry a UTF-8 BOM
/// when the export came from a Windows tool; it is ignored for matching.
pub fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| {
        header
            .trim_start_matches('\u{feff}')
            .trim()
            .eq_ignore_ascii_case(name)
    })
}

/// First alias from `names` that resolves to a column.
pub fn find_any_column(headers: &StringRecord, names: &[String]) -> Option<usize> {
    names.iter().find_map(|name| find_column(headers, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  Jane.Doe@Example.COM "), "jane.doe@example.com");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn find_column_ignores_case() {
        let h = headers(&["First Name", "EMAIL", "linkedIn"]);
        assert_eq!(find_column(&h, "email"), Some(1));
        assert_eq!(find_column(&h, "LinkedIn"), Some(2));
        assert_eq!(find_column(&h, "phone"), None);
    }

    #[test]
    fn find_column_ignores_bom_and_padding() {
        let h = headers(&["\u{feff}Email", " Name "]);
        assert_eq!(find_column(&h, "Email"), Some(0));
        assert_eq!(find_column(&h, "Name"), Some(1));
    }

    #[test]
    fn find_any_column_tries_aliases_in_order() {
        let config = Config::default();
        let h = headers(&["name", "linkedinUrl", "email"]);
        assert_eq!(find_any_column(&h, &config.email_columns), Some(2));
        assert_eq!(find_any_column(&h, &config.linkedin_columns), Some(1));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.extra_business_indicators = vec!["brokerage".to_string()];
        config.output_directory = Some("out".to_string());

        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(restored.name_column, "Name");
        assert_eq!(restored.email_columns, config.email_columns);
        assert_eq!(restored.extra_business_indicators, vec!["brokerage"]);
        assert_eq!(restored.output_directory.as_deref(), Some("out"));
    }
}
