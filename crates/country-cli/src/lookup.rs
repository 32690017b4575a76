//! # Lookup CLI — Single-country queries.
//!
//! Exit status is 0 when the lookup finds something and 1 otherwise, so
//! the commands compose in shell scripts:
//!
//! ```bash
//! countries valid NZ && echo ok
//! countries name 554
//! countries code "new zealand"
//! countries info NZL
//! ```

use anyhow::{Context, Result};
use clap::Args;
use country_list::CountriesOptions;
use serde::Serialize;

use crate::CliContext;

/// `countries name` arguments.
#[derive(Args, Debug)]
pub struct NameArgs {
    /// Alpha-2, alpha-3 or numeric code.
    pub code: String,
}

/// `countries code` arguments.
#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Country name in the selected locale or in English.
    pub name: String,

    /// Match case exactly.
    #[arg(long)]
    pub exact: bool,

    /// With no exact match, list every country whose name contains NAME.
    #[arg(long)]
    pub search: bool,
}

/// `countries valid` arguments.
#[derive(Args, Debug)]
pub struct ValidArgs {
    /// Code to check against the effective table.
    pub code: String,
}

/// `countries info` arguments.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Alpha-2, alpha-3 or numeric code.
    pub code: String,

    /// Include UN M.49 region codes.
    #[arg(long)]
    pub regions: bool,
}

pub fn run_name(args: &NameArgs, ctx: &CliContext) -> Result<u8> {
    let countries = ctx.countries(CountriesOptions::new())?;
    match countries.name(&args.code, &ctx.locale)? {
        Some(name) => {
            println!("{name}");
            Ok(0)
        }
        None => {
            eprintln!("unknown country code '{}'", args.code);
            Ok(1)
        }
    }
}

pub fn run_code(args: &CodeArgs, ctx: &CliContext) -> Result<u8> {
    let countries = ctx.countries(CountriesOptions::new())?;
    if let Some(code) = countries.by_name(&args.name, &ctx.locale, !args.exact)? {
        println!("{code}");
        return Ok(0);
    }
    if args.search {
        let found = countries.search(&args.name, &ctx.locale)?;
        for code in &found {
            let name = countries.name(code.as_str(), &ctx.locale)?.unwrap_or_default();
            println!("{code}\t{name}");
        }
        if !found.is_empty() {
            return Ok(0);
        }
    }
    eprintln!("no country named '{}'", args.name);
    Ok(1)
}

pub fn run_valid(args: &ValidArgs, ctx: &CliContext) -> Result<u8> {
    let countries = ctx.countries(CountriesOptions::new())?;
    let valid = countries.is_valid(&args.code)?;
    tracing::debug!(code = %args.code, valid, "checked country code");
    println!("{}", if valid { "valid" } else { "invalid" });
    Ok(if valid { 0 } else { 1 })
}

#[derive(Serialize)]
struct InfoOutput {
    #[serde(flatten)]
    info: country_list::CountryInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    regions: Option<Vec<u16>>,
}

pub fn run_info(args: &InfoArgs, ctx: &CliContext) -> Result<u8> {
    let countries = ctx.countries(CountriesOptions::new())?;
    let Some(country) = countries.country(&args.code)? else {
        eprintln!("unknown country code '{}'", args.code);
        return Ok(1);
    };
    let regions = if args.regions {
        Some(countries.parent_regions(country.code().as_str(), None)?)
    } else {
        None
    };
    let output = InfoOutput {
        info: country.info(&ctx.locale),
        regions,
    };
    let json = serde_json::to_string_pretty(&output).context("failed to serialize country info")?;
    println!("{json}");
    Ok(0)
}
