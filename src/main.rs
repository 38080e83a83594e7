// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use autoloop::config::{load_search_config, SearchConfig};
use autoloop::looper::{LoopRequest, Looper};
use autoloop::util::{duration_minutes_seconds, filename_display, frames_to_seconds};
use autoloop::validate::{has_wav_extension, parse_seconds};
use autoloop::wav;
use clap::{crate_version, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Finds loop points in a song and extends it by repeating the loop."
)]
struct Cli {
    /// The path to a YAML loop search config.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extends a WAV file by repeating its loop until it is at least the minimum length.
    Extend {
        /// The WAV file to extend.
        input: PathBuf,
        /// Where to write the extended WAV file.
        output: PathBuf,
        /// Approximate loop start, in seconds or as a duration (e.g. 90s). Given together with
        /// the loop end and minimum length, the loop search is skipped.
        start: Option<String>,
        /// Approximate loop end.
        end: Option<String>,
        /// The minimum length of the output.
        min_length: Option<String>,
        /// The minimum length of the output when searching for the loop automatically.
        #[arg(short = 'm', long = "min-length")]
        min_length_flag: Option<String>,
    },
    /// Searches a WAV file for loop points and prints them.
    Find {
        /// The WAV file to search.
        input: PathBuf,
    },
    /// Prints the header fields of a WAV file.
    Info {
        /// The WAV file to inspect.
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        println!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_search_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extend {
            input,
            output,
            start,
            end,
            min_length,
            min_length_flag,
        } => {
            check_wav_path(&input)?;
            check_wav_path(&output)?;
            let (request, min_length) =
                extend_request(&config, start, end, min_length, min_length_flag)?;

            let outcome = autoloop::process(&input, &output, request, min_length, &config)?;
            println!("Wrote {}:", filename_display(&output));
            println!(
                "- Loop start: {:.3}s (frame {})",
                frames_to_seconds(outcome.spec.start(), outcome.sample_rate),
                outcome.spec.start()
            );
            println!(
                "- Loop end: {:.3}s (frame {})",
                frames_to_seconds(outcome.spec.end(), outcome.sample_rate),
                outcome.spec.end()
            );
            println!("- Repeats: {}", outcome.repeat_count);
            println!("- Duration: {}", duration_minutes_seconds(outcome.duration()));
        }
        Commands::Find { input } => {
            check_wav_path(&input)?;
            let (track, _) = wav::read_track(&input)?;
            let params = config.resolve(track.sample_rate())?;
            let result = Looper::new(params).find(&track)?;

            println!("Loop points for {}:", filename_display(&input));
            println!(
                "- Start: {:.3}s (frame {})",
                frames_to_seconds(result.spec.start(), track.sample_rate()),
                result.spec.start()
            );
            println!(
                "- End: {:.3}s (frame {})",
                frames_to_seconds(result.spec.end(), track.sample_rate()),
                result.spec.end()
            );
            println!("- Score: {}", result.score);
        }
        Commands::Info { input } => {
            check_wav_path(&input)?;
            let info = wav::read_info(&input)?;
            println!("{}:", filename_display(&input));
            println!("{}", info);
        }
    }

    Ok(())
}

fn check_wav_path(path: &Path) -> Result<(), Box<dyn Error>> {
    if !has_wav_extension(path) {
        return Err(format!("{} is not a .wav file", path.display()).into());
    }
    Ok(())
}

/// Works out the loop request from the positional arguments. Loop points have to be given
/// together with a minimum length; without them the loop is searched for.
fn extend_request(
    config: &SearchConfig,
    start: Option<String>,
    end: Option<String>,
    min_length: Option<String>,
    min_length_flag: Option<String>,
) -> Result<(LoopRequest, Duration), Box<dyn Error>> {
    match (start, end, min_length) {
        (Some(start), Some(end), Some(min_length)) => {
            let start = parse_seconds(&start)?;
            let end = parse_seconds(&end)?;
            if start > end {
                return Err(format!(
                    "loop start ({:?}) is after loop end ({:?})",
                    start, end
                )
                .into());
            }
            Ok((LoopRequest::Manual { start, end }, parse_seconds(&min_length)?))
        }
        (None, None, None) => {
            let min_length = match min_length_flag {
                Some(min_length) => parse_seconds(&min_length)?,
                None => config.min_length()?,
            };
            Ok((LoopRequest::Auto, min_length))
        }
        _ => Err("loop start, loop end and minimum length must be given together".into()),
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn arg(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    #[test]
    fn test_extend_request_manual() {
        let (request, min_length) = extend_request(
            &SearchConfig::default(),
            arg("10"),
            arg("90s"),
            arg("5m"),
            arg("1s"),
        )
        .unwrap();
        assert_eq!(
            request,
            LoopRequest::Manual {
                start: Duration::from_secs(10),
                end: Duration::from_secs(90),
            }
        );
        assert_eq!(min_length, Duration::from_secs(300));
    }

    #[test]
    fn test_extend_request_partial_triple() {
        let config = SearchConfig::default();
        for (start, end, min_length) in [
            (arg("10"), None, None),
            (arg("10"), arg("20"), None),
            (None, arg("20"), arg("60")),
            (None, None, arg("60")),
        ] {
            assert!(extend_request(&config, start, end, min_length, None).is_err());
        }
    }

    #[test]
    fn test_extend_request_start_after_end() {
        let result = extend_request(
            &SearchConfig::default(),
            arg("20"),
            arg("10"),
            arg("60"),
            None,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("after loop end"));
    }

    #[test]
    fn test_extend_request_auto_min_length() {
        let config = SearchConfig::default();
        assert_eq!(
            extend_request(&config, None, None, None, arg("3m")).unwrap(),
            (LoopRequest::Auto, Duration::from_secs(180))
        );
        assert_eq!(
            extend_request(&config, None, None, None, None).unwrap(),
            (LoopRequest::Auto, Duration::from_secs(120))
        );

        let config = Config::builder()
            .add_source(File::from_str("min_length: 45s", FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<SearchConfig>()
            .unwrap();
        assert_eq!(
            extend_request(&config, None, None, None, None).unwrap(),
            (LoopRequest::Auto, Duration::from_secs(45))
        );
    }

    #[test]
    fn test_extend_request_bad_time() {
        let config = SearchConfig::default();
        assert!(extend_request(&config, arg("-3"), arg("10"), arg("60"), None).is_err());
        assert!(extend_request(&config, None, None, None, arg("abc")).is_err());
    }
}
