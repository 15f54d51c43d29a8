use crate::models::{find_any_column, find_column, normalize_key, Config, LeadSummary};
use anyhow::{bail, Context, Result};
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DuplicateEntry {
    pub email: String,
    pub left: LeadSummary,
    pub right: LeadSummary,
}

#[derive(Debug, Clone)]
pub struct CompareReport {
    pub left_total: usize,
    pub right_total: usize,
    /// Sorted by email.
    pub duplicates: Vec<DuplicateEntry>,
}

#[derive(Debug, Clone)]
pub struct DedupeOutcome {
    pub reference_emails: usize,
    pub reference_links: usize,
    pub total: usize,
    pub removed: usize,
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub total: usize,
    pub opened: usize,
    pub responded: usize,
    pub sent_or_bounced: usize,
}

#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Find leads present in both files, matched on lowercased email.
pub fn compare_by_email(left: &Path, right: &Path, config: &Config) -> Result<CompareReport> {
    let (left_headers, left_rows) = read_records(left)?;
    let (right_headers, right_rows) = read_records(right)?;

    let left_email_col = require_email_column(&left_headers, left, config)?;
    let right_email_col = require_email_column(&right_headers, right, config)?;

    let left_by_email = index_by_email(&left_rows, left_email_col);
    let right_by_email = index_by_email(&right_rows, right_email_col);

    let mut shared: Vec<&String> = left_by_email
        .keys()
        .filter(|email| right_by_email.contains_key(*email))
        .collect();
    shared.sort();

    let duplicates = shared
        .into_iter()
        .map(|email| DuplicateEntry {
            email: email.clone(),
            left: summarize(&left_headers, left_by_email[email], config),
            right: summarize(&right_headers, right_by_email[email], config),
        })
        .collect();

    Ok(CompareReport {
        left_total: left_rows.len(),
        right_total: right_rows.len(),
        duplicates,
    })
}

/// Drop rows from `target` whose email or LinkedIn URL already appears in
/// `reference`, and write the survivors to `output`. `output` may be the
/// target itself; the target is fully read before the writer opens.
pub fn dedupe_against(
    reference: &Path,
    target: &Path,
    output: &Path,
    config: &Config,
) -> Result<DedupeOutcome> {
    let (ref_headers, ref_rows) = read_records(reference)?;
    let ref_email_col = find_any_column(&ref_headers, &config.email_columns);
    let ref_link_col = find_any_column(&ref_headers, &config.linkedin_columns);

    let known_emails = collect_keys(&ref_rows, ref_email_col);
    let known_links = collect_keys(&ref_rows, ref_link_col);

    let (target_headers, target_rows) = read_records(target)?;
    let email_col = find_any_column(&target_headers, &config.email_columns);
    let link_col = find_any_column(&target_headers, &config.linkedin_columns);

    let total = target_rows.len();
    let kept_rows: Vec<&StringRecord> = target_rows
        .iter()
        .filter(|row| {
            !matches_key(row, email_col, &known_emails)
                && !matches_key(row, link_col, &known_links)
        })
        .collect();
    let kept = kept_rows.len();

    let mut writer = open_writer(output)?;
    writer.write_record(&target_headers)?;
    for row in &kept_rows {
        writer.write_record(*row)?;
    }
    writer.flush()?;

    Ok(DedupeOutcome {
        reference_emails: known_emails.len(),
        reference_links: known_links.len(),
        total,
        removed: total - kept,
        kept,
    })
}

/// Partition a lead file by status keyword into three outputs under
/// `output_dir`: leads_opened.csv, leads_responded.csv,
/// leads_sent_or_bounced.csv. A row may land in more than one file; an
/// "opened" status never counts as merely sent or bounced.
pub fn filter_by_status(input: &Path, output_dir: &Path, config: &Config) -> Result<FilterOutcome> {
    let (headers, rows) = read_records(input)?;
    let status_col = match find_column(&headers, &config.status_column) {
        Some(col) => col,
        None => bail!(
            "No '{}' column found in {}",
            config.status_column,
            input.display()
        ),
    };

    let mut opened = Vec::new();
    let mut responded = Vec::new();
    let mut sent_or_bounced = Vec::new();

    for row in &rows {
        let status = row.get(status_col).unwrap_or("").to_lowercase();
        if status.contains("opened") {
            opened.push(row);
        }
        if status.contains("reply received") {
            responded.push(row);
        }
        if (status.contains("contacted") || status.contains("bounced"))
            && !status.contains("opened")
        {
            sent_or_bounced.push(row);
        }
    }

    write_partition(&output_dir.join("leads_opened.csv"), &headers, &opened)?;
    write_partition(&output_dir.join("leads_responded.csv"), &headers, &responded)?;
    write_partition(
        &output_dir.join("leads_sent_or_bounced.csv"),
        &headers,
        &sent_or_bounced,
    )?;

    Ok(FilterOutcome {
        total: rows.len(),
        opened: opened.len(),
        responded: responded.len(),
        sent_or_bounced: sent_or_bounced.len(),
    })
}

/// Replace the full-name column with First Name / Last Name columns, carrying
/// every other field through unchanged. Rows too short to contain the name
/// column are skipped, not fatal.
pub fn split_name_column(input: &Path, output: &Path, config: &Config) -> Result<SplitOutcome> {
    let (headers, rows) = read_records(input)?;
    let name_col = match find_column(&headers, &config.name_column) {
        Some(col) => col,
        None => bail!(
            "No '{}' column found in {}",
            config.name_column,
            input.display()
        ),
    };

    let mut writer = open_writer(output)?;

    let mut out_headers = vec!["First Name".to_string(), "Last Name".to_string()];
    out_headers.extend(
        headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != name_col)
            .map(|(_, h)| h.to_string()),
    );
    writer.write_record(&out_headers)?;

    let mut written = 0;
    let mut skipped = 0;
    for row in &rows {
        let full_name = match row.get(name_col) {
            Some(value) => value,
            None => {
                skipped += 1;
                continue;
            }
        };

        let (first, last) =
            crate::names::split_name_with(full_name, &config.extra_business_indicators);

        let mut out_row = vec![first, last];
        out_row.extend(
            row.iter()
                .enumerate()
                .filter(|(i, _)| *i != name_col)
                .map(|(_, field)| field.to_string()),
        );
        writer.write_record(&out_row)?;
        written += 1;
    }
    writer.flush()?;

    Ok(SplitOutcome {
        total: rows.len(),
        written,
        skipped,
    })
}

fn read_records(path: &Path) -> Result<(StringRecord, Vec<StringRecord>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let row = record.with_context(|| format!("Malformed CSV row in {}", path.display()))?;
        rows.push(row);
    }
    Ok((headers, rows))
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_partition(path: &Path, headers: &StringRecord, rows: &[&StringRecord]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(*row)?;
    }
    writer.flush()?;
    Ok(())
}

fn require_email_column(headers: &StringRecord, path: &Path, config: &Config) -> Result<usize> {
    match find_any_column(headers, &config.email_columns) {
        Some(col) => Ok(col),
        None => bail!("No email column found in {}", path.display()),
    }
}

/// Map normalized email -> first row carrying it.
fn index_by_email<'a>(
    rows: &'a [StringRecord],
    email_col: usize,
) -> HashMap<String, &'a StringRecord> {
    let mut by_email: HashMap<String, &StringRecord> = HashMap::new();
    for row in rows {
        let email = normalize_key(row.get(email_col).unwrap_or(""));
        if email.is_empty() {
            continue;
        }
        by_email.entry(email).or_insert(row);
    }
    by_email
}

fn collect_keys(rows: &[StringRecord], col: Option<usize>) -> HashSet<String> {
    let mut keys = HashSet::new();
    let Some(col) = col else {
        return keys;
    };
    for row in rows {
        let key = normalize_key(row.get(col).unwrap_or(""));
        if !key.is_empty() {
            keys.insert(key);
        }
    }
    keys
}

fn matches_key(row: &StringRecord, col: Option<usize>, known: &HashSet<String>) -> bool {
    let Some(col) = col else {
        return false;
    };
    let key = normalize_key(row.get(col).unwrap_or(""));
    !key.is_empty() && known.contains(&key)
}

fn summarize(headers: &StringRecord, row: &StringRecord, config: &Config) -> LeadSummary {
    let field = |name: &str| -> Option<String> {
        find_column(headers, name)
            .and_then(|col| row.get(col))
            .map(|value| value.to_string())
    };

    // Prefer already-split name columns; fall back to the raw name column.
    let name = match (field("First Name"), field("Last Name")) {
        (Some(first), Some(last)) => format!("{} {}", first, last).trim().to_string(),
        (Some(first), None) => first,
        _ => field(&config.name_column).unwrap_or_default(),
    };

    LeadSummary {
        name,
        campaign: field("Campaign Name").unwrap_or_default(),
        status: field(&config.status_column).unwrap_or_default(),
        company: field("companyName"),
        job_title: field("jobTitle"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn read_back(path: &Path) -> (StringRecord, Vec<StringRecord>) {
        read_records(path).unwrap()
    }

    #[test]
    fn compare_finds_case_insensitive_email_overlap() {
        let dir = TempDir::new().unwrap();
        let left = write_csv(
            &dir,
            "left.csv",
            "First Name,Last Name,Email,Campaign Name,Lead Status\n\
             Jane,Doe,jane@example.com,Spring,Contacted\n\
             Amy,Lee,amy@example.com,Spring,Bounced\n",
        );
        let right = write_csv(
            &dir,
            "right.csv",
            "First Name,Last Name,Email,Campaign Name,Lead Status,companyName,jobTitle\n\
             Jane,Doe,JANE@Example.com,Autumn,Reply received,Acme,CTO\n\
             Bob,Ray,bob@example.com,Autumn,Contacted,,\n",
        );

        let report = compare_by_email(&left, &right, &Config::default()).unwrap();

        assert_eq!(report.left_total, 2);
        assert_eq!(report.right_total, 2);
        assert_eq!(report.duplicates.len(), 1);

        let dup = &report.duplicates[0];
        assert_eq!(dup.email, "jane@example.com");
        assert_eq!(dup.left.name, "Jane Doe");
        assert_eq!(dup.left.campaign, "Spring");
        assert_eq!(dup.right.status, "Reply received");
        assert_eq!(dup.right.company.as_deref(), Some("Acme"));
        assert_eq!(dup.right.job_title.as_deref(), Some("CTO"));
        // The left file has no company column at all.
        assert!(dup.left.company.is_none());
    }

    #[test]
    fn compare_requires_an_email_column() {
        let dir = TempDir::new().unwrap();
        let left = write_csv(&dir, "left.csv", "Name,Phone\nJane Doe,555-0100\n");
        let right = write_csv(&dir, "right.csv", "Email\njane@example.com\n");

        let err = compare_by_email(&left, &right, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("No email column"));
    }

    #[test]
    fn dedupe_removes_on_email_or_linkedin_match() {
        let dir = TempDir::new().unwrap();
        let reference = write_csv(
            &dir,
            "leads.csv",
            "First Name,Email,linkedIn\n\
             Jane,jane@example.com,https://linkedin.com/in/janedoe\n\
             Amy,,https://linkedin.com/in/amylee\n",
        );
        let target = write_csv(
            &dir,
            "incoming.csv",
            "name,email,linkedinUrl\n\
             Jane Doe,Jane@Example.COM,https://linkedin.com/in/other\n\
             Amy Lee,amy@new.com,HTTPS://LINKEDIN.COM/IN/AMYLEE\n\
             Bob Ray,bob@example.com,\n\
             Sue Ellen,,\n",
        );
        let output = dir.path().join("incoming_clean.csv");

        let outcome =
            dedupe_against(&reference, &target, &output, &Config::default()).unwrap();

        assert_eq!(outcome.reference_emails, 1);
        assert_eq!(outcome.reference_links, 2);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.kept, 2);

        let (headers, rows) = read_back(&output);
        assert_eq!(headers, StringRecord::from(vec!["name", "email", "linkedinUrl"]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some("Bob Ray"));
        assert_eq!(rows[1].get(0), Some("Sue Ellen"));
    }

    #[test]
    fn dedupe_can_rewrite_the_target_in_place() {
        let dir = TempDir::new().unwrap();
        let reference = write_csv(&dir, "leads.csv", "Email\njane@example.com\n");
        let target = write_csv(
            &dir,
            "incoming.csv",
            "email\njane@example.com\nbob@example.com\n",
        );

        let outcome =
            dedupe_against(&reference, &target, &target, &Config::default()).unwrap();
        assert_eq!(outcome.removed, 1);

        let (_, rows) = read_back(&target);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some("bob@example.com"));
    }

    #[test]
    fn filter_partitions_by_status_keyword() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(
            &dir,
            "leads.csv",
            "Email,Lead Status\n\
             a@x.com,Contacted - opened\n\
             b@x.com,Reply received\n\
             c@x.com,Bounced\n\
             d@x.com,Contacted\n\
             e@x.com,Unsubscribed\n",
        );

        let outcome = filter_by_status(&input, dir.path(), &Config::default()).unwrap();

        assert_eq!(outcome.total, 5);
        assert_eq!(outcome.opened, 1);
        assert_eq!(outcome.responded, 1);
        // "Contacted - opened" must not count as merely sent.
        assert_eq!(outcome.sent_or_bounced, 2);

        let (_, opened) = read_back(&dir.path().join("leads_opened.csv"));
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].get(0), Some("a@x.com"));

        let (_, sent) = read_back(&dir.path().join("leads_sent_or_bounced.csv"));
        let emails: Vec<&str> = sent.iter().filter_map(|r| r.get(0)).collect();
        assert_eq!(emails, vec!["c@x.com", "d@x.com"]);
    }

    #[test]
    fn filter_requires_the_status_column() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(&dir, "leads.csv", "Email\na@x.com\n");

        let err = filter_by_status(&input, dir.path(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Lead Status"));
    }

    #[test]
    fn split_rewrites_header_and_passes_fields_through() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(
            &dir,
            "agents.csv",
            "Name,Phone,Email,Title,Location\n\
             Jane Doe Jr.,555-0100,jane@example.com,Agent,FL\n\
             The Smith Team,555-0101,team@example.com,Agents,FL\n\
             Mary Ann Burke,555-0102,maryann@example.com,Agent,FL\n",
        );
        let output = dir.path().join("agents_split.csv");

        let outcome = split_name_column(&input, &output, &Config::default()).unwrap();
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.written, 3);
        assert_eq!(outcome.skipped, 0);

        let (headers, rows) = read_back(&output);
        assert_eq!(
            headers,
            StringRecord::from(vec![
                "First Name",
                "Last Name",
                "Phone",
                "Email",
                "Title",
                "Location"
            ])
        );
        assert_eq!(rows[0].get(0), Some("Jane"));
        assert_eq!(rows[0].get(1), Some("Doe"));
        assert_eq!(rows[0].get(2), Some("555-0100"));
        assert_eq!(rows[1].get(0), Some("The Smith Team"));
        assert_eq!(rows[1].get(1), Some(""));
        assert_eq!(rows[2].get(0), Some("Mary Ann"));
        assert_eq!(rows[2].get(1), Some("Burke"));
    }

    #[test]
    fn split_skips_rows_missing_the_name_column() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(
            &dir,
            "agents.csv",
            "Phone,Name\n555-0100,Jane Doe\n555-0101\n",
        );
        let output = dir.path().join("agents_split.csv");

        let outcome = split_name_column(&input, &output, &Config::default()).unwrap();
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.skipped, 1);

        let (_, rows) = read_back(&output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some("Jane"));
        assert_eq!(rows[0].get(2), Some("555-0100"));
    }
}
