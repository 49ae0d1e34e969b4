use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate one or more subtitle files (.srt/.vtt)
    Translate {
        /// Input subtitle files
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Target languages (comma-separated, or "all")
        #[arg(short, long)]
        target_langs: String,

        /// Output directory for translated files (default: next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Translate every subtitle file in a directory
    Batch {
        /// Input directory containing subtitle files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Target languages (comma-separated, or "all")
        #[arg(short, long)]
        target_langs: String,

        /// Output directory for translated files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List selectable target languages
    Languages,

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "subtran.toml")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_accepts_multiple_inputs() {
        let args = Args::try_parse_from([
            "subtran", "translate", "-i", "a.srt", "b.vtt", "-t", "fr,de",
        ])
        .unwrap();

        match args.command {
            Commands::Translate { input, target_langs, output_dir } => {
                assert_eq!(input, vec![PathBuf::from("a.srt"), PathBuf::from("b.vtt")]);
                assert_eq!(target_langs, "fr,de");
                assert!(output_dir.is_none());
            }
            _ => panic!("expected translate command"),
        }
    }

    #[test]
    fn test_translate_requires_languages() {
        assert!(Args::try_parse_from(["subtran", "translate", "-i", "a.srt"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = Args::try_parse_from(["subtran", "-v", "-c", "custom.toml", "languages"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(args.command, Commands::Languages));
    }
}
