use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{AlignmentPolicy, PipelineConfig};
use crate::constants::images::TARGET_EDGE;
use crate::constants::layout::DEFAULT_ROOT;
use crate::constants::splits::{ALL_SPLITS, DEFAULT_CACHE_DIR};
use crate::metadata::MetadataEncoding;
use crate::pipeline::DatasetPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    Native,
    Literal,
}

impl From<EncodingArg> for MetadataEncoding {
    fn from(value: EncodingArg) -> Self {
        match value {
            EncodingArg::Native => MetadataEncoding::Native,
            EncodingArg::Literal => MetadataEncoding::Literal,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "prepare_dataset",
    disable_help_subcommand = true,
    about = "Build weather-report conversation datasets",
    long_about = "Extract report samples from one or more report roots, split them by month, persist each split as JSON, then decode frames and build chat conversations.",
    after_help = "Each root must contain text/, img_final/ and img_metadata/; img_air_pressure/ is optional."
)]
struct PrepareDatasetCli {
    #[arg(
        long = "root",
        value_name = "PATH",
        default_value = DEFAULT_ROOT,
        help = "Report root to scan, repeat as needed in source order"
    )]
    roots: Vec<PathBuf>,
    #[arg(
        long = "cache-dir",
        value_name = "PATH",
        default_value = DEFAULT_CACHE_DIR,
        help = "Directory for the persisted split JSON files"
    )]
    cache_dir: PathBuf,
    #[arg(
        long = "metadata-encoding",
        value_enum,
        default_value_t = EncodingArg::Native,
        help = "How image_metadata is stored in split files"
    )]
    metadata_encoding: EncodingArg,
    #[arg(
        long = "strict-alignment",
        help = "Drop samples whose metadata count differs from their satellite frame count"
    )]
    strict_alignment: bool,
    #[arg(
        long = "image-size",
        value_name = "PIXELS",
        default_value_t = TARGET_EDGE,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Edge length of the square decoded frames"
    )]
    image_size: u32,
    #[arg(
        long = "conversation-dir",
        value_name = "PATH",
        help = "Optional directory for <split>.jsonl conversation exports"
    )]
    conversation_dir: Option<PathBuf>,
}

impl PrepareDatasetCli {
    fn pipeline_config(&self) -> PipelineConfig {
        let alignment = if self.strict_alignment {
            AlignmentPolicy::Strict
        } else {
            AlignmentPolicy::Permissive
        };
        PipelineConfig::default()
            .with_roots(self.roots.iter().cloned())
            .with_cache_dir(self.cache_dir.clone())
            .with_metadata_encoding(self.metadata_encoding.into())
            .with_alignment(alignment)
            .with_image_edge(self.image_size)
    }
}

/// Run the dataset preparation CLI with arguments (program name excluded).
pub fn run_prepare_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<PrepareDatasetCli, _>(
        std::iter::once("prepare_dataset".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let pipeline = DatasetPipeline::new(cli.pipeline_config());
    let datasets = pipeline.run()?;
    if let Some(dir) = &cli.conversation_dir {
        datasets.export(dir)?;
    }

    let config = pipeline.config();
    println!("=== prepare_dataset ===");
    println!("roots: {}", config.roots.len());
    for root in &config.roots {
        println!("  {}", root.display());
    }
    println!("metadata encoding: {:?}", config.metadata_encoding);
    println!("alignment: {:?}", config.alignment);
    println!();
    println!("[SPLITS]");
    for label in ALL_SPLITS {
        println!(
            "  {:<10} conversations: {:>6}  file: {}",
            label.as_str(),
            datasets.get(label).len(),
            config.split_paths.path_for(label).display()
        );
    }
    if let Some(dir) = &cli.conversation_dir {
        println!();
        println!("conversations exported to {}", dir.display());
    }

    Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(args: &[&str]) -> PrepareDatasetCli {
        parse_cli::<PrepareDatasetCli, _>(
            std::iter::once("prepare_dataset").chain(args.iter().copied()),
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.roots, vec![PathBuf::from("data")]);
        assert_eq!(cli.cache_dir, PathBuf::from("train_cache"));
        assert_eq!(cli.metadata_encoding, EncodingArg::Native);
        assert!(!cli.strict_alignment);
        assert_eq!(cli.image_size, 256);
        assert!(cli.conversation_dir.is_none());
    }

    #[test]
    fn flags_flow_into_pipeline_config() {
        let cli = parse(&[
            "--root",
            "a",
            "--root",
            "b",
            "--cache-dir",
            "out",
            "--metadata-encoding",
            "literal",
            "--strict-alignment",
            "--image-size",
            "128",
        ]);
        let config = cli.pipeline_config();
        assert_eq!(config.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(
            config.split_paths.train,
            Path::new("out").join("train_conversation.json")
        );
        assert_eq!(config.metadata_encoding, MetadataEncoding::Literal);
        assert_eq!(config.alignment, AlignmentPolicy::Strict);
        assert_eq!(config.target_size, (128, 128));
    }

    #[test]
    fn help_is_not_an_error() {
        let parsed = parse_cli::<PrepareDatasetCli, _>(["prepare_dataset", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_cli::<PrepareDatasetCli, _>(["prepare_dataset", "--image-size", "0"]).is_err());
        assert!(
            parse_cli::<PrepareDatasetCli, _>(["prepare_dataset", "--metadata-encoding", "yaml"])
                .is_err()
        );
    }
}
