use anyhow::Context;
use clap::{Parser, Subcommand};
use generator::profile::{write_fixtures, GeneratorConfig};
use hypnocore::annotation::StageMapper;
use hypnocore::source::AnnotationSet;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Exports sleep recordings as waveform and stage-timeline JSON"
)]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long, global = true)]
    workflow: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resample and normalize one channel into the waveform artifact
    Waveform {
        /// Recording dump (JSON)
        recording: PathBuf,
        #[arg(long)]
        channel: Option<usize>,
        /// Output sample rate in Hz
        #[arg(long)]
        target_rate: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Map hypnogram labels into the stage timeline artifact
    Stages {
        /// Hypnogram annotations (JSON)
        hypnogram: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// List the distinct hypnogram labels and what each maps to
    Labels { hypnogram: PathBuf },
    /// Write a synthetic recording and hypnogram for trying the pipelines
    Synth {
        dir: PathBuf,
        #[arg(long, default_value_t = 300)]
        seconds: u32,
        #[arg(long, default_value_t = 100)]
        rate: u32,
        #[arg(long, default_value_t = 2)]
        channels: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };

    match args.command {
        Command::Waveform {
            recording,
            channel,
            target_rate,
            output,
            pretty,
        } => {
            if let Some(channel) = channel {
                config.channel = channel;
            }
            if let Some(rate) = target_rate {
                config.target_rate = rate;
            }
            if let Some(output) = output {
                config.waveform_output = output;
            }
            config.pretty |= pretty;

            let runner = Runner::new(config);
            let result = runner.run_waveform(&recording)?;
            println!(
                "Wrote {} with {} samples at {} Hz (channel {} '{}', {} samples at {} Hz in source)",
                runner.config().waveform_output.display(),
                result.artifact.values.len(),
                result.artifact.sample_rate,
                runner.config().channel,
                result.channel_name,
                result.source_samples,
                result.source_rate
            );
            println!(
                "Removed mean {:.6e}, scaled by peak {:.6e}",
                result.mean, result.peak
            );
        }
        Command::Stages {
            hypnogram,
            output,
            pretty,
        } => {
            if let Some(output) = output {
                config.stages_output = output;
            }
            config.pretty |= pretty;

            let runner = Runner::new(config);
            let timeline = runner.run_stages(&hypnogram)?;
            println!(
                "Wrote {} with {} segments",
                runner.config().stages_output.display(),
                timeline.segments.len()
            );
            println!("Total duration ~ {} seconds", timeline.total_duration_sec);
        }
        Command::Labels { hypnogram } => {
            let annotations = AnnotationSet::from_json_file(&hypnogram)
                .with_context(|| format!("loading hypnogram {}", hypnogram.display()))?;
            let mapper = StageMapper::default();
            println!("Number of annotations: {}", annotations.len());
            for label in annotations.unique_labels() {
                println!("{} -> {}", label, mapper.classify(label));
            }
        }
        Command::Synth {
            dir,
            seconds,
            rate,
            channels,
            seed,
        } => {
            let generator = GeneratorConfig {
                seconds,
                sample_rate: rate,
                channels,
                seed,
                ..Default::default()
            };
            let (recording, hypnogram) = write_fixtures(&generator, &dir)?;
            println!(
                "Wrote {} and {}",
                recording.display(),
                hypnogram.display()
            );
        }
    }

    Ok(())
}
