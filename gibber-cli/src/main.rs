mod cli;

use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use gibber_core::io::{save_dictionary, write_words};
use gibber_core::{Dictionary, GenerationConfig, GenerationContext, GibberError};

use crate::cli::{Cli, flag_value, parse_lenient, usage};

fn main() -> ExitCode {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(err) => {
			eprintln!("error: {}", err.kind());
			eprintln!("{}", usage());
			return ExitCode::SUCCESS;
		}
	};
	if cli.help {
		eprintln!("{}", usage());
		return ExitCode::SUCCESS;
	}

	init_logging(cli.verbose, cli.very_verbose);

	match run(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err:#}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool, very_verbose: bool) {
	use log::LevelFilter;

	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
	builder.format_timestamp_millis();
	let level = match (verbose, very_verbose) {
		(false, false) => None,
		(true, false) => Some(LevelFilter::Info),
		(false, true) => Some(LevelFilter::Debug),
		(true, true) => Some(LevelFilter::Trace),
	};
	if let Some(level) = level {
		builder.filter_level(level);
	}
	let _ = builder.try_init();
}

/// Logs a failed stage and carries on, unless the failure is fatal.
fn stage<T>(result: gibber_core::Result<T>) -> Result<Option<T>> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(err) if err.is_fatal() => Err(err.into()),
		Err(err) => {
			error!("{err}");
			Ok(None)
		}
	}
}

/// Builds the generation settings from `-n`, `-m` and `-c`, in that order.
///
/// The flag tells whether `-c` asked for a generation run.
fn config_from_flags(cli: &Cli) -> Result<(GenerationConfig, bool)> {
	let mut builder = GenerationConfig::builder();
	if let Some(raw) = flag_value(&cli.min_len, 'n') {
		builder = builder.lenient_min_len(parse_lenient(raw));
	}
	if let Some(raw) = flag_value(&cli.max_len, 'm') {
		builder = builder.lenient_max_len(parse_lenient(raw));
	}
	let count = flag_value(&cli.count, 'c');
	if let Some(raw) = count {
		builder = builder.lenient_target_count(parse_lenient(raw));
	}
	let config = builder.build().context("invalid generation settings")?;
	Ok((config, count.is_some()))
}

fn log_stats(name: &str, dictionary: &Dictionary) {
	info!(
		"{name} dictionary: {} words, {} pool bytes, longest chain {}",
		dictionary.len(),
		dictionary.pool_bytes(),
		dictionary.longest_chain()
	);
}

fn run(cli: &Cli) -> Result<()> {
	let (config, generate) = config_from_flags(cli)?;
	info!(
		"Word length {} to {}, target count {}",
		config.min_len, config.max_len, config.target_count
	);
	let mut ctx = GenerationContext::new(config);

	if let Some(path) = flag_value(&cli.restore_snapshot, 'r') {
		stage(ctx.load_snapshot(path))?;
	}
	if let Some(path) = flag_value(&cli.train, 't') {
		stage(ctx.train_from_path(path))?;
	}
	if let Some(path) = flag_value(&cli.exclude, 'x') {
		stage(ctx.exclude_from_path(path))?;
	}
	if let Some(path) = flag_value(&cli.save_snapshot, 's') {
		stage(ctx.save_snapshot(path))?;
	}
	if let Some(path) = flag_value(&cli.save_language, 'l') {
		if let Some(count) = stage(save_dictionary(ctx.training(), path))? {
			info!("Saved {count} language words to {}", path.display());
		}
	}
	if let Some(path) = flag_value(&cli.save_excluded, 'b') {
		if let Some(count) = stage(save_dictionary(ctx.exclusions(), path))? {
			info!("Saved {count} excluded words to {}", path.display());
		}
	}
	if generate {
		stage(ctx.generate())?;
	}

	log_stats("Language", ctx.training());
	log_stats("Excluded", ctx.exclusions());
	log_stats("Generated", ctx.output());

	match flag_value(&cli.output, 'f') {
		Some(path) => {
			if let Some(count) = stage(save_dictionary(ctx.output(), path))? {
				info!("Saved {count} generated words to {}", path.display());
			}
		}
		None => {
			let stdout = io::stdout();
			let written = write_words(BufWriter::new(stdout.lock()), ctx.output().iter());
			stage(written.map_err(|err| GibberError::io(err, None)))?;
		}
	}
	Ok(())
}
