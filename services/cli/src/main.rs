mod demo;
mod render;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use focus_engine::biomarkers::BloodReport;
use focus_engine::config::AppConfig;
use focus_engine::demographics::{Demographics, Sex};
use focus_engine::error::AppError;
use focus_engine::intake::{IntakeError, IntakeSubmission};
use focus_engine::rulesets::{AnswerValue, CrossFieldContext, IntakeField, ScoringContext};
use focus_engine::{scorer_from_config, telemetry, BiomarkerEvaluator};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "focus-engine",
    about = "Classify blood panels and score health intake answers into focus areas",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score the bundled sample intake (default command)
    Demo(OutputArgs),
    /// Classify a blood report against reference ranges
    Biomarkers(BiomarkerArgs),
    /// Score a full intake submission
    Score(ScoreArgs),
    /// Score a single answer for one intake field
    Answer(AnswerArgs),
    /// List the intake fields that have a ruleset
    Fields,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Csv,
}

#[derive(Args, Debug)]
struct BiomarkerArgs {
    /// Blood report file: a JSON object or a CSV with biomarker/value columns
    #[arg(long)]
    report: PathBuf,
    /// Input format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,
    #[arg(long)]
    age: Option<u32>,
    /// Biological sex (male/female)
    #[arg(long, value_parser = parse_sex)]
    sex: Option<Sex>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Intake submission JSON file
    #[arg(long)]
    intake: PathBuf,
    /// "Today" for temporal answers (defaults to SCORING_REFERENCE_DATE, then the local date)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Fold flagged blood markers into the focus-area totals
    #[arg(long)]
    fold_biomarkers: bool,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct AnswerArgs {
    /// Intake field label, e.g. CurrentStress or top_health_goals
    #[arg(long, value_parser = parse_field)]
    field: IntakeField,
    /// Raw answer text; numeric fields accept plain numbers
    #[arg(long)]
    answer: String,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long, value_parser = parse_sex)]
    sex: Option<Sex>,
    /// Optional cross-field context JSON file
    #[arg(long)]
    context: Option<PathBuf>,
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(?config.environment, matcher = ?config.scoring.matcher, "focus engine ready");

    match cli
        .command
        .unwrap_or_else(|| Command::Demo(OutputArgs::default()))
    {
        Command::Demo(output) => {
            let submission = IntakeSubmission::from_json_str(demo::SAMPLE_INTAKE)?;
            let report = scorer_from_config(&config.scoring).score(&submission)?;
            emit(&report, output.json, || render::intake_report(&report))
        }
        Command::Biomarkers(args) => run_biomarkers(args),
        Command::Score(args) => {
            if args.today.is_some() {
                config.scoring.reference_date = args.today;
            }
            config.scoring.fold_biomarkers |= args.fold_biomarkers;
            let submission = IntakeSubmission::from_json_str(&fs::read_to_string(&args.intake)?)?;
            let report = scorer_from_config(&config.scoring).score(&submission)?;
            emit(&report, args.output.json, || render::intake_report(&report))
        }
        Command::Answer(args) => {
            let context = match &args.context {
                Some(path) => serde_json::from_str::<CrossFieldContext>(&fs::read_to_string(path)?)
                    .map_err(IntakeError::from)?,
                None => CrossFieldContext::default(),
            };
            let mut ctx =
                ScoringContext::new(Demographics::new(args.age, args.sex)).with_cross(context);
            if let Some(date) = args.today.or(config.scoring.reference_date) {
                ctx = ctx.on(date);
            }
            let scorer = scorer_from_config(&config.scoring);
            let result = scorer
                .registry()
                .score(args.field, &answer_value(&args.answer), &ctx)
                .ok_or_else(|| IntakeError::UnknownField(args.field.to_string()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Fields => {
            for field in IntakeField::ALL {
                println!("{field}");
            }
            Ok(())
        }
    }
}

fn run_biomarkers(args: BiomarkerArgs) -> Result<(), AppError> {
    let format = args.format.unwrap_or_else(|| infer_format(&args.report));
    let report = match format {
        ReportFormat::Json => BloodReport::from_json_str(&fs::read_to_string(&args.report)?)?,
        ReportFormat::Csv => BloodReport::from_csv_reader(File::open(&args.report)?)?,
    };
    let evaluation =
        BiomarkerEvaluator::new().evaluate(&report, &Demographics::new(args.age, args.sex));
    info!(
        flagged = evaluation.summary.total_flagged,
        path = %args.report.display(),
        "blood report classified"
    );
    emit(&evaluation, args.output.json, || {
        render::biomarker_evaluation(&evaluation)
    })
}

fn emit<T: Serialize>(
    value: &T,
    json: bool,
    summary: impl FnOnce() -> String,
) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", summary());
    }
    Ok(())
}

fn infer_format(path: &Path) -> ReportFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => ReportFormat::Csv,
        _ => ReportFormat::Json,
    }
}

/// Plain numbers become numeric answers so scale questions score directly.
fn answer_value(raw: &str) -> AnswerValue {
    match raw.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => AnswerValue::Number(number),
        _ => AnswerValue::text(raw),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_sex(raw: &str) -> Result<Sex, String> {
    Sex::parse(raw).ok_or_else(|| format!("'{raw}' is not a recognised sex (male/female)"))
}

fn parse_field(raw: &str) -> Result<IntakeField, String> {
    IntakeField::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = IntakeField::ALL.iter().map(|field| field.label()).collect();
        format!("unknown intake field '{raw}' (expected one of {})", known.join(", "))
    })
}
