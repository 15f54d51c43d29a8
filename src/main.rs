mod cleaner;
mod models;
mod names;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use models::Config;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let matches = Command::new("lead-cleaner")
        .version("1.0")
        .about("Cleans, deduplicates, and reformats sales-lead CSV exports")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml")
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("compare")
                .about("Diff two lead files by email and report duplicates")
                .arg(Arg::new("left").value_name("FILE").required(true))
                .arg(Arg::new("right").value_name("FILE").required(true)),
        )
        .subcommand(
            Command::new("dedupe")
                .about("Remove rows from a target file already present in a reference file")
                .arg(
                    Arg::new("reference")
                        .value_name("REFERENCE")
                        .help("File whose emails/LinkedIn URLs are authoritative")
                        .required(true),
                )
                .arg(
                    Arg::new("target")
                        .value_name("TARGET")
                        .help("File to strip duplicates from")
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write the result (default: rewrite TARGET in place)"),
                ),
        )
        .subcommand(
            Command::new("filter")
                .about("Partition a lead file by status into opened/responded/sent-or-bounced")
                .arg(Arg::new("input").value_name("FILE").required(true))
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Directory for the three output files (default: next to input)"),
                ),
        )
        .subcommand(
            Command::new("split-names")
                .about("Split the full-name column into First Name / Last Name columns")
                .arg(Arg::new("input").value_name("FILE").required(true))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file (default: <input>_split.csv)"),
                ),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").unwrap();
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        Config::default()
    };

    match matches.subcommand() {
        Some(("compare", sub)) => run_compare(sub, &config),
        Some(("dedupe", sub)) => run_dedupe(sub, &config),
        Some(("filter", sub)) => run_filter(sub, &config),
        Some(("split-names", sub)) => run_split_names(sub, &config),
        _ => unreachable!(),
    }
}

fn run_compare(matches: &ArgMatches, config: &Config) -> Result<()> {
    let left = PathBuf::from(matches.get_one::<String>("left").unwrap());
    let right = PathBuf::from(matches.get_one::<String>("right").unwrap());

    let report = cleaner::compare_by_email(&left, &right, config)?;

    println!("{} contains: {} leads", left.display(), report.left_total);
    println!("{} contains: {} leads", right.display(), report.right_total);
    println!();
    println!("Number of duplicate emails found: {}", report.duplicates.len());

    if report.duplicates.is_empty() {
        println!("✅ No duplicate emails found between the two lists.");
        return Ok(());
    }

    println!();
    println!("Duplicate emails found:");
    for dup in &report.duplicates {
        println!("  - {}", dup.email);
    }

    println!();
    println!("Detailed comparison of duplicate entries:");
    println!("{}", "=".repeat(80));
    for dup in &report.duplicates {
        println!();
        println!("Email: {}", dup.email);
        println!("{}", "-".repeat(40));
        print_side(&format!("In {}:", left.display()), &dup.left);
        print_side(&format!("In {}:", right.display()), &dup.right);
    }

    Ok(())
}

fn print_side(heading: &str, lead: &models::LeadSummary) {
    println!("{}", heading);
    println!("  Name: {}", lead.name);
    println!("  Campaign: {}", lead.campaign);
    println!("  Status: {}", lead.status);
    if let Some(company) = &lead.company {
        println!("  Company: {}", if company.is_empty() { "N/A" } else { company });
    }
    if let Some(job_title) = &lead.job_title {
        println!("  Job Title: {}", if job_title.is_empty() { "N/A" } else { job_title });
    }
}

fn run_dedupe(matches: &ArgMatches, config: &Config) -> Result<()> {
    let reference = PathBuf::from(matches.get_one::<String>("reference").unwrap());
    let target = PathBuf::from(matches.get_one::<String>("target").unwrap());
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| target.clone());

    println!("📖 Reading {}...", reference.display());
    let outcome = cleaner::dedupe_against(&reference, &target, &output, config)?;

    println!(
        "Found {} emails and {} LinkedIn URLs in {}",
        outcome.reference_emails,
        outcome.reference_links,
        reference.display()
    );
    println!("Original records: {}", outcome.total);
    println!("Duplicates removed: {}", outcome.removed);
    println!("Remaining records: {}", outcome.kept);
    println!("✅ {} updated successfully!", output.display());

    Ok(())
}

fn run_filter(matches: &ArgMatches, config: &Config) -> Result<()> {
    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output_dir = resolve_output_dir(matches, config, &input);

    fs::create_dir_all(&output_dir)?;
    println!("📂 Output directory: {}", output_dir.display());

    let outcome = cleaner::filter_by_status(&input, &output_dir, config)?;

    println!("✅ Processing complete!");
    println!("Total leads: {}", outcome.total);
    println!("Leads who opened emails: {}", outcome.opened);
    println!("Leads who responded: {}", outcome.responded);
    println!("Leads sent to or bounced: {}", outcome.sent_or_bounced);

    Ok(())
}

fn resolve_output_dir(matches: &ArgMatches, config: &Config, input: &Path) -> PathBuf {
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = &config.output_directory {
        return PathBuf::from(dir);
    }
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_split_names(matches: &ArgMatches, config: &Config) -> Result<()> {
    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_split_output(&input));

    let outcome = cleaner::split_name_column(&input, &output, config)?;

    println!("✅ Processing complete! Output written to {}", output.display());
    println!(
        "Original '{}' column split into First Name and Last Name columns",
        config.name_column
    );
    println!("Rows written: {}", outcome.written);
    if outcome.skipped > 0 {
        println!("⚠️  Skipped {} rows missing the name column", outcome.skipped);
    }

    Ok(())
}

fn default_split_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}_split.csv", stem))
}
