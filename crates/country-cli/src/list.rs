//! # List CLI — Ordered country choices.
//!
//! ```bash
//! countries list
//! countries --locale en-AU list --first US,GB --auto-detect
//! countries list --only NZ,AU --first-break "---" --json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use country_core::parse_codes;
use country_list::{Choice, CountriesOptions};

use crate::CliContext;

/// `countries list` arguments.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Countries shown first, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub first: Vec<String>,

    /// Separator label after the first countries.
    #[arg(long, allow_hyphen_values = true)]
    pub first_break: Option<String>,

    /// Sort the first countries by name.
    #[arg(long)]
    pub first_sort: bool,

    /// Repeat the first countries in the alphabetical part.
    #[arg(long)]
    pub first_repeat: bool,

    /// Put the locale's own country first.
    #[arg(long)]
    pub auto_detect: bool,

    /// Restrict the list to these codes, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Print the list as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// The per-field options these flags describe. Flags left at their
    /// defaults leave the settings document in charge.
    pub fn options(&self) -> Result<CountriesOptions> {
        let mut options = CountriesOptions::new();
        if !self.first.is_empty() {
            options = options.with_first(parse_codes(&self.first).context("invalid --first")?);
        }
        if !self.only.is_empty() {
            options = options.with_only(parse_codes(&self.only).context("invalid --only")?);
        }
        if let Some(label) = &self.first_break {
            options = options.with_first_break(label.clone());
        }
        if self.first_sort {
            options = options.with_first_sort(true);
        }
        if self.first_repeat {
            options = options.with_first_repeat(true);
        }
        if self.auto_detect {
            options = options.with_first_auto_detect(true);
        }
        Ok(options)
    }
}

/// Execute `countries list`.
pub fn run_list(args: &ListArgs, ctx: &CliContext) -> Result<u8> {
    let countries = ctx.countries(args.options()?)?;
    let list = countries
        .choices(&ctx.locale)
        .with_context(|| format!("failed to resolve the country list for {}", ctx.locale))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(list.as_slice())?);
        return Ok(0);
    }
    for choice in list.iter() {
        match choice {
            Choice::Country { code, name } => println!("{code}\t{name}"),
            Choice::Separator { label } => println!("\t{label}"),
        }
    }
    tracing::info!(locale = %ctx.locale, choices = list.len(), "listed countries");
    Ok(0)
}
