use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings that mark a name field as a team/business rather than a person.
/// Matching is containment, not token equality: "compass" is meant to catch
/// brokerage variants like "Compass Real Estate" wherever they appear.
const BUSINESS_INDICATORS: &[&str] = &[
    "team", "group", "homes", "realty", "properties", "collective",
    "residential", "luxury", "real estate", "lifestyle", "logic",
    "compass", "haven", "horizon", "elevated", "cosmopolitan",
    "britannia", "steele", "sagebird", "sage", "torelli",
    "mandile lorimer", "awad realty", "avant residential",
    "hersey home", "highview", "linda takenaka", "linda wells",
    "tom hughes", "tommy pennington",
];

/// Two-token first names that must not be split across the first/last fields.
const COMPOUND_FIRST_NAMES: &[&str] = &[
    "mary ann", "jean", "lou", "jo", "sue", "lynn", "rose",
    "marie", "anne", "lee", "ray", "joe", "tom", "jim", "bob",
];

static SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(jr\.?|sr\.?|ii|iii|iv|md|phd|pa)$").unwrap());

/// Split a free-text full name into (first name, last name).
///
/// Business/team names come back whole in the first slot with an empty last
/// name. Trailing generational/professional suffixes (Jr., III, MD, ...) are
/// dropped before tokenizing. Total over all inputs; an empty or
/// whitespace-only string yields ("", "").
pub fn split_name(full_name: &str) -> (String, String) {
    split_name_with(full_name, &[])
}

/// Like [`split_name`], with additional business-indicator substrings from
/// configuration checked alongside the built-in list.
pub fn split_name_with(full_name: &str, extra_indicators: &[String]) -> (String, String) {
    let name = full_name.trim();
    let name_lower = name.to_lowercase();

    let is_business = BUSINESS_INDICATORS
        .iter()
        .any(|indicator| name_lower.contains(indicator))
        || extra_indicators
            .iter()
            .any(|indicator| name_lower.contains(&indicator.to_lowercase()));
    if is_business {
        return (name.to_string(), String::new());
    }

    let name = SUFFIX_RE.replace(name, "");
    let parts: Vec<&str> = name.split_whitespace().collect();

    match parts.len() {
        0 => (String::new(), String::new()),
        1 => (parts[0].to_string(), String::new()),
        2 => (parts[0].to_string(), parts[1].to_string()),
        _ => {
            let first_two = format!("{} {}", parts[0], parts[1]).to_lowercase();
            if COMPOUND_FIRST_NAMES.contains(&first_two.as_str()) {
                (format!("{} {}", parts[0], parts[1]), parts[2..].join(" "))
            } else {
                (parts[0].to_string(), parts[1..].join(" "))
            }
        }
    }
}
