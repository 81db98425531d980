use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use rust_decimal::Decimal;
use tax_core::{EngineSettings, Regime, TaxBreakdown, TaxEngine, TaxRuleRegistry};
use tax_data::{RuleTableLoader, logging};
use tracing::{debug, info};

/// Inspect tax rule tables and run the engine against them.
///
/// An optional CSV file overlays slab tables on the built-in rules. Its
/// columns are:
/// - fiscal_year: calendar year the fiscal year starts in (e.g. 2026)
/// - regime: old or new
/// - lower: lower bound of the slab
/// - upper: upper bound of the slab (empty for the top slab)
/// - rate: marginal rate in percent (e.g. 5)
#[derive(Parser, Debug)]
#[command(name = "tax-rules")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file of slab tables to apply on top of the built-in rules
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML file with engine settings
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Fiscal year start year (defaults to the current fiscal year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Regime to use (defaults to the configured default regime)
    #[arg(short, long, value_parser = parse_regime)]
    regime: Option<Regime>,

    /// Compute the tax on this gross income
    #[arg(long)]
    gross: Option<Decimal>,

    /// Infer the gross income behind this net amount
    #[arg(long)]
    net: Option<Decimal>,

    /// Compare both regimes for the gross income
    #[arg(long, default_value_t = false)]
    compare: bool,

    /// Months of salary for professional tax (0 disables it)
    #[arg(long, default_value_t = 12)]
    salary_months: u32,

    /// Log filter directive (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

fn parse_regime(s: &str) -> Result<Regime, String> {
    Regime::parse(s).ok_or_else(|| format!("unknown regime '{s}' (expected 'old' or 'new')"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log.as_deref())?;

    let settings = match &args.settings {
        Some(path) => EngineSettings::from_path(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => EngineSettings::default(),
    };

    let mut registry = TaxRuleRegistry::builtin();
    if let Some(path) = &args.file {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = RuleTableLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        debug!(records = records.len(), "parsed slab records");
        let applied = RuleTableLoader::apply(&mut registry, &records)
            .with_context(|| format!("Failed to apply slab tables from: {}", path.display()))?;
        info!(applied, file = %path.display(), "slab tables loaded");
    }

    let engine = TaxEngine::new(registry, settings);
    let year = match args.year {
        Some(year) => year,
        None => engine
            .fiscal_year_of(Local::now().date_naive())
            .context("Failed to determine the current fiscal year")?
            .start_year(),
    };

    let regimes = engine.available_regimes(year);
    if regimes.is_empty() {
        bail!("No rule tables cover fiscal year {year}");
    }
    println!(
        "Fiscal year {year}: {}",
        regimes
            .iter()
            .map(Regime::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    for regime in &regimes {
        let config = engine.rules().get_config(year, *regime)?;
        println!();
        println!("{regime} regime");
        for slab in &config.slabs {
            match slab.upper {
                Some(upper) => println!("  {:>12} - {:>12}  {:>3}%", slab.lower, upper, slab.rate),
                None => println!("  {:>12} +{:>14}  {:>3}%", slab.lower, "", slab.rate),
            }
        }
        println!("  standard deduction {}", config.standard_deduction);
        println!(
            "  rebate up to {} on taxable income up to {}{}",
            config.rebate_cap,
            config.rebate_threshold,
            if config.rebate_marginal_relief {
                " (with marginal relief)"
            } else {
                ""
            }
        );
    }

    if let Some(gross) = args.gross {
        let breakdown = engine
            .tax(year, args.regime, gross, args.salary_months)
            .context("Failed to compute tax")?;
        println!();
        print_breakdown(&breakdown);

        if args.compare {
            let comparison = engine
                .compare(year, gross, None, args.salary_months)
                .context("Failed to compare regimes")?;
            println!();
            println!("New regime tax      {}", comparison.new_regime_tax);
            println!("Old regime tax      {}", comparison.old_regime_tax);
            println!(
                "Better regime       {} (saves {})",
                comparison.better_regime,
                comparison.savings()
            );
            match comparison.break_even_deduction {
                Some(deduction) => println!("Break-even deduction {deduction}"),
                None => println!("Break-even deduction beyond search cap"),
            }
        }
    } else if args.compare {
        bail!("--compare needs --gross");
    }

    if let Some(net) = args.net {
        let solution = engine
            .gross_from_net(year, args.regime, net, args.salary_months)
            .context("Failed to infer gross income")?;
        println!();
        println!(
            "Gross income for net {net}: {} ({} iterations, {})",
            solution.gross_income,
            solution.iterations,
            if solution.converged {
                "converged"
            } else {
                "not converged"
            }
        );
    }

    Ok(())
}

fn print_breakdown(breakdown: &TaxBreakdown) {
    println!("Gross income        {}", breakdown.gross_income);
    println!("Taxable income      {}", breakdown.taxable_income);
    for line in &breakdown.slab_lines {
        println!(
            "  at {:>3}%  {:>12} -> {}",
            line.slab.rate, line.taxable_in_slab, line.tax_amount
        );
    }
    println!("Base tax            {}", breakdown.base_tax);
    println!("Rebate 87A          {}", breakdown.rebate_87a);
    println!("Surcharge           {}", breakdown.surcharge);
    println!("Cess                {}", breakdown.cess);
    println!("Professional tax    {}", breakdown.professional_tax);
    println!(
        "Total tax           {} ({}% effective)",
        breakdown.total_tax,
        breakdown.effective_rate()
    );
}
