//! Headless queries over the same data files the GUI reads.
//!
//! Results are tab-separated on stdout so they pipe into other tools.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use gaokao_lens::config::{AppConfig, TOLERANCE_MAX};
use gaokao_lens::data::model::Dataset;
use gaokao_lens::data::store::DataStore;
use gaokao_lens::data::trend::{project, resolve, Resolution};
use gaokao_lens::state::{detail_view, group_detail_view, rank_view_exact, RankQuery, Rows};

#[derive(Parser, Debug)]
#[command(name = "gaokao-cli", version, about = "Query gaokao admission data")]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the CSV files.
    #[arg(long, env = "GAOKAO_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Groups or majors whose cut-off rank is close to a target rank.
    Rank(RankArgs),
    /// Per-major admission details of one university (exact name).
    Detail(DetailArgs),
    /// Score and rank history per group of one university (fuzzy name).
    Trend(TrendArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Track {
    /// General undergraduate batch.
    General,
    /// Comprehensive-assessment batch.
    Assessment,
}

#[derive(Args, Debug)]
struct RankArgs {
    #[arg(long, value_enum, default_value_t = Track::General)]
    track: Track,
    /// Year to search; defaults to the newest in the data.
    #[arg(long)]
    year: Option<u16>,
    /// Target rank.
    #[arg(long)]
    rank: u32,
    /// Allowed distance from the target rank.
    #[arg(long)]
    tolerance: Option<u32>,
}

#[derive(Args, Debug)]
struct DetailArgs {
    #[arg(long)]
    university: String,
    #[arg(long, value_enum, default_value_t = Track::Assessment)]
    track: Track,
    /// Group name (general track only); defaults to the first group.
    #[arg(long)]
    group: Option<String>,
}

#[derive(Args, Debug)]
struct TrendArgs {
    /// Full or partial university name, case-insensitive.
    #[arg(long)]
    university: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())
        .context("loading configuration")?
        .with_data_dir(cli.data_dir);
    let store = DataStore::new(&config);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Rank(args) => rank(&store, &config, args, &mut out),
        Commands::Detail(args) => detail(&store, &config, args, &mut out),
        Commands::Trend(args) => trend(&store, args, &mut out),
    }
}

fn tsv<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(out)
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn rank(store: &DataStore, config: &AppConfig, args: RankArgs, out: &mut impl Write) -> Result<()> {
    let mut query = RankQuery::new(config);
    query.year = args.year;
    query.target = args.rank;
    if let Some(t) = args.tolerance {
        query.tolerance = t.min(TOLERANCE_MAX);
    }

    match args.track {
        Track::General => {
            let ds = store.trend.get()?;
            let Some(view) = rank_view_exact(&ds, &query) else {
                bail!("{} has no year column values", ds.source.display());
            };
            let Rows::Found(matches) = view.rows else {
                writeln!(
                    out,
                    "no groups in {} with rank in {}..={}",
                    view.year, view.window.0, view.window.1
                )?;
                return Ok(());
            };
            let mut w = tsv(out);
            w.write_record(["year", "university", "group_code", "group_name", "score", "rank", "distance"])?;
            for m in matches {
                let r = m.row;
                w.write_record([
                    r.year.to_string(),
                    r.university.clone(),
                    r.group_code.clone(),
                    r.group_name.clone(),
                    r.score.to_string(),
                    r.rank.to_string(),
                    m.distance.to_string(),
                ])?;
            }
            w.flush()?;
        }
        Track::Assessment => {
            let ds = store.assessment.get()?;
            let Some(view) = rank_view_exact(&ds, &query) else {
                bail!("{} has no year column values", ds.source.display());
            };
            let Rows::Found(matches) = view.rows else {
                writeln!(
                    out,
                    "no majors in {} with rank in {}..={}",
                    view.year, view.window.0, view.window.1
                )?;
                return Ok(());
            };
            let mut w = tsv(out);
            w.write_record([
                "year", "university", "group_code", "group_name", "major", "lowest_score",
                "lowest_rank", "average_score", "average_rank", "distance",
            ])?;
            for m in matches {
                let r = m.row;
                w.write_record([
                    r.year.to_string(),
                    r.university.clone(),
                    r.group_code.clone(),
                    r.group_name.clone(),
                    r.major_name.clone(),
                    opt(r.lowest_score),
                    opt(r.lowest_rank),
                    opt(r.average_score),
                    opt(r.average_rank),
                    m.distance.to_string(),
                ])?;
            }
            w.flush()?;
        }
    }
    Ok(())
}

fn detail(
    store: &DataStore,
    config: &AppConfig,
    args: DetailArgs,
    out: &mut impl Write,
) -> Result<()> {
    match args.track {
        Track::Assessment => {
            let ds = store.assessment.get()?;
            let Rows::Found(rows) = detail_view(&ds, &args.university, None) else {
                writeln!(out, "no assessment data for '{}'", args.university)?;
                return Ok(());
            };
            let mut w = tsv(out);
            w.write_record([
                "group_name", "major", "enrollment", "highest_score", "lowest_score",
                "average_score", "lowest_rank", "average_rank",
            ])?;
            for r in rows {
                w.write_record([
                    r.group_name.clone(),
                    r.major_name.clone(),
                    opt(r.enrollment),
                    opt(r.highest_score),
                    opt(r.lowest_score),
                    opt(r.average_score),
                    opt(r.lowest_rank),
                    opt(r.average_rank),
                ])?;
            }
            w.flush()?;
        }
        Track::General => {
            let ds = store.detail.get()?;
            let view = group_detail_view(
                &ds,
                &args.university,
                &config.general_batch,
                args.group.as_deref(),
            );
            let Rows::Found(rows) = view.rows else {
                writeln!(
                    out,
                    "no {} data for '{}'",
                    config.general_batch, args.university
                )?;
                return Ok(());
            };
            log::info!("Groups: {}", view.groups.join(", "));
            let mut w = tsv(out);
            w.write_record([
                "group_name", "major", "enrollment", "highest_score", "lowest_score",
                "average_score", "lowest_rank", "average_rank",
            ])?;
            for r in rows {
                w.write_record([
                    r.group_name.clone(),
                    r.major_name.clone(),
                    opt(r.enrollment),
                    opt(r.highest_score),
                    opt(r.lowest_score),
                    opt(r.average_score),
                    opt(r.lowest_rank),
                    opt(r.average_rank),
                ])?;
            }
            w.flush()?;
        }
    }
    Ok(())
}

fn trend(store: &DataStore, args: TrendArgs, out: &mut impl Write) -> Result<()> {
    let ds = store.trend.get()?;
    let university = pick_university(&ds, &args.university)?;

    let series = project(&ds.rows, university);
    let mut w = tsv(out);
    w.write_record(["university", "group_name", "group_code", "year", "score", "rank"])?;
    for (group, points) in &series {
        for p in points {
            w.write_record([
                university.to_string(),
                group.clone(),
                p.group_code.clone(),
                p.year.to_string(),
                p.score.to_string(),
                p.rank.to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Unique match or an error listing the candidates.
fn pick_university<'a, T: gaokao_lens::data::model::Record>(
    ds: &'a Dataset<T>,
    term: &str,
) -> Result<&'a str> {
    match resolve(&ds.universities, term) {
        Resolution::Unique(u) => Ok(u),
        Resolution::NoMatch => bail!("no university matches '{term}'"),
        Resolution::Ambiguous(candidates) => bail!(
            "'{term}' matches {} universities, be more specific:\n  {}",
            candidates.len(),
            candidates.join("\n  ")
        ),
    }
}
