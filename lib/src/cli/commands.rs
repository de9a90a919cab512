//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::info;

use super::ScheduleArgs;
use crate::color::{mix_colors, Rgb};
use crate::config::{ConfigError, JobConfig};
use crate::process::ToolSwitcher;
use crate::report::UsageReport;
use crate::schedule::Schedule;
use crate::Result;

impl ScheduleArgs {
    /// The schedule given on the command line, if any.
    pub fn to_schedule(&self) -> Option<Schedule> {
        if let Some(counts) = self.pattern {
            return Some(Schedule::pattern(counts));
        }
        if self.sections.is_empty() {
            return None;
        }
        Some(Schedule::gradient(self.sections.clone()))
    }
}

/// Build a job from an optional job file and command-line overrides.
pub fn resolve_job(
    input: Option<&Path>,
    output: Option<&Path>,
    job: Option<&Path>,
    schedule: &ScheduleArgs,
) -> Result<JobConfig> {
    let mut config = match job {
        Some(path) => {
            info!("Loading job file: {}", path.display());
            Some(JobConfig::from_file(path)?)
        }
        None => None,
    };

    let schedule = schedule
        .to_schedule()
        .or_else(|| config.as_ref().map(|c| c.schedule.clone()))
        .ok_or_else(|| {
            ConfigError::Invalid("no schedule given; use --section, --pattern or --job".to_string())
        })?;

    let input: PathBuf = match (input, config.as_ref()) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(c)) => c.input.clone(),
        (None, None) => {
            return Err(ConfigError::Invalid("no input file given".to_string()).into());
        }
    };
    let output = output
        .map(Path::to_path_buf)
        .or_else(|| config.as_mut().and_then(|c| c.output.take()));

    let job = JobConfig {
        input,
        output,
        schedule,
    };
    job.validate()?;
    Ok(job)
}

/// Rewrite a G-code file and print the usage report.
pub fn process(
    input: Option<&Path>,
    output: Option<&Path>,
    job: Option<&Path>,
    save_job: Option<&Path>,
    schedule: &ScheduleArgs,
) -> Result<()> {
    let job = resolve_job(input, output, job, schedule)?;
    if let Some(path) = save_job {
        job.save_to_file(path)?;
        info!("Saved job file: {}", path.display());
    }
    let output = job.output_path();

    println!("Processing file: {}", job.input.display());
    println!("Output file: {}", output.display());
    println!("Using schedule: {}", describe_schedule(&job.schedule));

    let summary = ToolSwitcher::new().run_job(&job)?;

    println!();
    println!("Processing complete!");
    let report = summary.report();
    print!("{}", report);
    print_blend(&report)?;
    println!();
    println!(
        "{} lines rewritten, {} redundant parks, {} redundant pickups, {} redundant pre-heats skipped",
        summary.stats.lines_rewritten,
        summary.stats.parks_skipped,
        summary.stats.pickups_skipped,
        summary.stats.preheats_skipped
    );

    Ok(())
}

/// Print the tool sequence a schedule yields for a layer count.
pub fn preview(layers: usize, schedule: &ScheduleArgs) -> Result<()> {
    let schedule = schedule.to_schedule().ok_or_else(|| {
        ConfigError::Invalid("no schedule given; use --section or --pattern".to_string())
    })?;

    let sequence = schedule.tool_sequence(layers)?;
    println!("Using schedule: {}", describe_schedule(&schedule));
    let report = UsageReport::from_sequence(&sequence);
    print!("{}", report);
    print_blend(&report)?;

    let labels: Vec<&str> = sequence.iter().map(|t| t.label()).collect();
    println!();
    println!("Full sequence: {}", labels.join(" "));
    Ok(())
}

/// Mix colours given as `#rrggbb[:weight]`.
pub fn mix(colors: &[String]) -> Result<()> {
    let parsed = colors
        .iter()
        .map(|spec| parse_weighted_color(spec))
        .collect::<Result<Vec<_>>>()?;

    let mixed = mix_colors(&parsed)?;
    println!("Mixed colour: {} (R={} G={} B={})", mixed, mixed.r, mixed.g, mixed.b);
    println!("CMYK: {}", mixed.to_cmyk());
    Ok(())
}

fn print_blend(report: &UsageReport) -> Result<()> {
    if let Some(color) = report.blended_color()? {
        println!();
        println!("Blended colour: {} (CMYK: {})", color, color.to_cmyk());
    }
    Ok(())
}

fn parse_weighted_color(spec: &str) -> Result<(Rgb, f64)> {
    let (hex, weight) = match spec.split_once(':') {
        Some((hex, weight)) => {
            let weight = weight.trim().parse::<f64>().map_err(|_| {
                ConfigError::Invalid(format!("invalid colour weight '{}'", weight.trim()))
            })?;
            (hex, weight)
        }
        None => (spec, 1.0),
    };
    Ok((Rgb::from_hex(hex)?, weight))
}

fn describe_schedule(schedule: &Schedule) -> String {
    let weights = |w: &[f64]| {
        w.iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(":")
    };
    match schedule {
        Schedule::Gradient { sections } => {
            let parts: Vec<String> = sections.iter().map(|s| weights(s.weights())).collect();
            format!("gradient C:M:Y:W:BL [{}]", parts.join(", "))
        }
        Schedule::Pattern { counts } => format!("pattern C:M:Y:W:BL {}", weights(counts.weights())),
    }
}
