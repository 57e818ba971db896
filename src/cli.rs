use std::error::Error;
use std::io::Write;

use clap::{Parser, ValueEnum, error::ErrorKind};
use tracing::info;

use crate::config::{PipelineConfig, RunConfig, default_seed, env_token};
use crate::constants::pipeline::DEFAULT_SAMPLE_SIZE;
use crate::filter::FilterCriteria;
use crate::normalize::{is_canonical_sex, normalize_sex};
use crate::pipeline::run_pipeline;
use crate::projection::FieldSelection;
use crate::render::{OutputFormat, render};
use crate::source::open_corpus_source;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    Json,
    Csv,
    #[value(alias = "md")]
    Markdown,
}

impl From<OutputArg> for OutputFormat {
    fn from(value: OutputArg) -> Self {
        match value {
            OutputArg::Json => OutputFormat::Json,
            OutputArg::Csv => OutputFormat::Csv,
            OutputArg::Markdown => OutputFormat::Markdown,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fetch_personas",
    disable_help_subcommand = true,
    about = "Sample filtered personas from the Japanese synthetic persona corpus",
    long_about = "Stream persona records in a seeded order, keep those matching every given filter, and render up to --sample of them as JSON, CSV, or Markdown.",
    after_help = "The access token is resolved in order by --token, then the HF_TOKEN environment variable. Set RUST_LOG to see progress logs."
)]
struct FetchPersonasCli {
    #[arg(long, help = "Keep records whose occupation contains this text")]
    occupation: Option<String>,
    #[arg(long, help = "Keep records whose prefecture equals this value")]
    prefecture: Option<String>,
    #[arg(long, help = "Keep records whose region equals this value")]
    region: Option<String>,
    #[arg(long = "age-min", value_name = "AGE", help = "Minimum age (inclusive)")]
    age_min: Option<i64>,
    #[arg(long = "age-max", value_name = "AGE", help = "Maximum age (inclusive)")]
    age_max: Option<i64>,
    #[arg(
        long,
        value_parser = parse_sex_arg,
        help = "Sex filter: male, female, 男, or 女"
    )]
    sex: Option<String>,
    #[arg(long, help = "Keep records whose education level contains this text")]
    education: Option<String>,
    #[arg(
        long = "marital-status",
        help = "Keep records whose marital status contains this text"
    )]
    marital_status: Option<String>,
    #[arg(long, help = "Access token for the dataset host (overrides HF_TOKEN)")]
    token: Option<String>,
    #[arg(
        long,
        default_value_t = DEFAULT_SAMPLE_SIZE,
        value_parser = parse_positive_usize,
        help = "Maximum number of records to return"
    )]
    sample: usize,
    #[arg(
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    output: OutputArg,
    #[arg(
        long,
        value_name = "FIELD,FIELD,...",
        help = "Comma-separated fields to keep (default: all)"
    )]
    fields: Option<String>,
    #[arg(long, default_value_t = default_seed(), help = "Seed for the record order")]
    seed: u64,
    #[arg(long, help = "Indent JSON output")]
    pretty: bool,
}

impl FetchPersonasCli {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            occupation_substring: non_blank(&self.occupation),
            prefecture_exact: non_blank(&self.prefecture),
            region_exact: non_blank(&self.region),
            age_min: self.age_min,
            age_max: self.age_max,
            sex_exact: self.sex.clone(),
            education_substring: non_blank(&self.education),
            marital_status_substring: non_blank(&self.marital_status),
        }
    }

    fn into_run_config(self, env_value: Option<String>) -> Result<RunConfig, Box<dyn Error>> {
        let pipeline = PipelineConfig {
            criteria: self.criteria(),
            fields: self
                .fields
                .as_deref()
                .map(FieldSelection::parse)
                .unwrap_or_default(),
            sample_size: self.sample,
        };
        let config = RunConfig::build(
            pipeline,
            self.seed,
            self.output.into(),
            self.pretty,
            self.token,
            env_value,
        )?;
        Ok(config)
    }
}

/// Parse `fetch_personas` arguments into a validated [`RunConfig`].
///
/// `args` excludes the program name. `env_value` stands in for `HF_TOKEN`.
/// Returns `Ok(None)` when help or version output was printed.
pub fn parse_run_config<I>(
    args: I,
    env_value: Option<String>,
) -> Result<Option<RunConfig>, Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<FetchPersonasCli, _>(
        std::iter::once("fetch_personas".to_string()).chain(args),
    )?
    else {
        return Ok(None);
    };
    cli.into_run_config(env_value).map(Some)
}

/// Run the `fetch_personas` command end to end.
///
/// Progress goes to stderr and the rendered output to stdout.
pub fn run_fetch_personas<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let Some(config) = parse_run_config(args_iter, env_token())? else {
        return Ok(());
    };

    eprintln!(
        "データセットからペルソナを取得中... (最大 {} 件)",
        config.pipeline.sample_size
    );
    let mut source = open_corpus_source(config.token.clone(), config.seed)?;
    let result = run_pipeline(&mut source, &config.pipeline)?;
    eprintln!("取得完了: {} 件", result.records.len());
    info!(
        "[personas:cli] format={} pulled={} rejected={}",
        config.format, result.stats.pulled, result.stats.rejected
    );

    let rendered = render(&result.records, config.format, config.pretty)?;
    write_rendered(&mut std::io::stdout().lock(), &rendered)?;
    Ok(())
}

/// Print a runner error to stderr and return the process exit code.
///
/// Argument errors keep clap's own formatting and exit code.
pub fn report_error(err: &(dyn Error + 'static)) -> i32 {
    if let Some(usage) = err.downcast_ref::<clap::Error>() {
        let _ = usage.print();
        return usage.exit_code();
    }
    eprintln!("error: {err}");
    1
}

/// Write rendered output, ending it with a newline unless it is empty.
fn write_rendered<W: Write>(out: &mut W, rendered: &str) -> std::io::Result<()> {
    out.write_all(rendered.as_bytes())?;
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|text| !text.is_empty()).cloned()
}

fn parse_sex_arg(raw: &str) -> Result<String, String> {
    let normalized = normalize_sex(raw.trim());
    if is_canonical_sex(&normalized) {
        Ok(normalized)
    } else {
        Err(format!(
            "unsupported --sex value '{raw}' (expected male, female, 男, or 女)"
        ))
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --sample value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed == 0 {
        return Err("--sample must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
