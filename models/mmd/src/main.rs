use std::{
	io::{
		self,
		Write
	},
	path::PathBuf
};

use anyhow::Context;
use clap::{
	Parser,
	ValueEnum
};
use log::info;

use rgk_models_mmd::vmd::VMDMotion;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CsvSection {
	Bone,
	Morph,
}

/// Sorts the keyframes of an MMD motion file and writes it back out
#[derive(Parser)]
#[command(name = "vmdsort", version)]
struct Cli {
	/// VMD file to read
	input: PathBuf,
	/// Where to write the re-encoded motion
	#[arg(short, long, default_value = "output.vmd")]
	output: PathBuf,
	/// Keep keyframes in their stored order
	#[arg(long)]
	no_sort: bool,
	/// Also dump one section to stdout as CSV
	#[arg(long, value_enum)]
	csv: Option<CsvSection>,
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();

	info!("Open file: {}", cli.input.display());
	let mut motion = VMDMotion::open(&cli.input)
		.with_context(|| format!("failed to load {}", cli.input.display()))?;

	if !cli.no_sort {
		motion.sort_all();
	}

	let stdout = io::stdout();
	let mut out = stdout.lock();
	write!(out, "{}", motion)?;

	match cli.csv {
		Some(CsvSection::Bone) => motion.write_bone_csv(&mut out)?,
		Some(CsvSection::Morph) => motion.write_morph_csv(&mut out)?,
		None => (),
	}

	out.flush()?;

	motion.save(&cli.output)
		.with_context(|| format!("failed to write {}", cli.output.display()))?;
	info!("Wrote {}", cli.output.display());

	Ok(())
}
