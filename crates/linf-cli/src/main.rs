use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linf_core::pairs::{load_pairs, save_pairs, PairListOptions};
use linf_core::PairSet;
use linf_pipeline::{
    run_gain_offset, run_translation_structure, run_triangulation, GainOffsetInput, LinfConfig,
    TranslationStructureInput, TriangulationInput,
};
use log::info;
use serde::{de::DeserializeOwned, Serialize};

/// L-infinity multi-view geometry and photometric harmonization.
#[derive(Debug, Parser)]
#[command(author, version, about = "L-infinity solvers driven by linear programming")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Triangulate every point of a TriangulationInput JSON file.
    Triangulate(SolveArgs),
    /// Recover camera translations and points from a TranslationStructureInput JSON file.
    TranslationStructure(SolveArgs),
    /// Solve per-image gain/offset corrections from a GainOffsetInput JSON file.
    Harmonize(SolveArgs),
    /// Normalize an image pair list: one sorted `i j` record per unique pair.
    Pairs {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
        /// Skip self and duplicate pairs with a warning instead of failing.
        #[arg(long)]
        lenient: bool,
    },
}

#[derive(Debug, clap::Args)]
struct SolveArgs {
    /// Path to the JSON input.
    #[arg(long)]
    input: String,

    /// Optional path to a JSON LinfConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<String>,
}

fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn load_config(config_path: Option<&str>) -> Result<LinfConfig> {
    match config_path {
        Some(path) => load_json_file(Path::new(path)),
        None => Ok(LinfConfig::default()),
    }
}

fn solve_from_files<I, R>(
    args: &SolveArgs,
    run: impl FnOnce(&I, &LinfConfig) -> Result<R>,
) -> Result<String>
where
    I: DeserializeOwned,
    R: Serialize,
{
    let input: I = load_json_file(Path::new(&args.input))?;
    let config = load_config(args.config.as_deref())?;
    let report = run(&input, &config)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

fn normalize_pair_list(input: &str, output: &str, lenient: bool) -> Result<usize> {
    let opts = if lenient {
        PairListOptions::lenient()
    } else {
        PairListOptions::default()
    };
    let mut pairs = PairSet::new();
    load_pairs(input, &opts, &mut pairs)?;
    save_pairs(output, &pairs)?;
    info!("wrote {} pairs to {output}", pairs.len());
    Ok(pairs.len())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = match &args.command {
        Command::Triangulate(a) => {
            solve_from_files::<TriangulationInput, _>(a, run_triangulation)?
        }
        Command::TranslationStructure(a) => {
            solve_from_files::<TranslationStructureInput, _>(a, run_translation_structure)?
        }
        Command::Harmonize(a) => solve_from_files::<GainOffsetInput, _>(a, run_gain_offset)?,
        Command::Pairs {
            input,
            output,
            lenient,
        } => {
            normalize_pair_list(input, output, *lenient)?;
            return Ok(());
        }
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linf_core::synthetic::ring::{camera_ring, RingConfig};
    use linf_pipeline::TranslationStructureReport;
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::NamedTempFile;

    fn write_json<T: Serialize>(value: &T, path: &Path) {
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    fn path_str(file: &NamedTempFile) -> String {
        file.path().to_str().unwrap().to_string()
    }

    #[test]
    fn translation_structure_helper_smoke_test() {
        let data = camera_ring(&mut StdRng::seed_from_u64(12), 3, 5, &RingConfig::default())
            .unwrap();
        let input = TranslationStructureInput {
            intrinsics: None,
            rotations: data.rotations(),
            observations: data.observation_table(),
        };
        let input_file = NamedTempFile::new().unwrap();
        let config_file = NamedTempFile::new().unwrap();
        write_json(&input, input_file.path());
        fs::write(config_file.path(), r#"{"bisection": {"max_iterations": 25}}"#).unwrap();

        let args = SolveArgs {
            input: path_str(&input_file),
            config: Some(path_str(&config_file)),
        };
        let json =
            solve_from_files::<TranslationStructureInput, _>(&args, run_translation_structure)
                .expect("cli helper should succeed");
        let report: TranslationStructureReport = serde_json::from_str(&json).unwrap();
        assert!(
            report.max_reprojection_error < 1e-4,
            "reprojection error too high: {}",
            report.max_reprojection_error
        );
        assert!(report.bisection.iterations <= 25);
    }

    #[test]
    fn malformed_config_is_reported() {
        let config_file = NamedTempFile::new().unwrap();
        fs::write(config_file.path(), "{ not json").unwrap();
        let err = load_config(Some(&path_str(&config_file))).unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON"));
        assert_eq!(load_config(None).unwrap(), LinfConfig::default());
    }

    #[test]
    fn pair_list_is_normalized() {
        let input = NamedTempFile::new().unwrap();
        let output = NamedTempFile::new().unwrap();
        fs::write(input.path(), "4 1 2\n2\t\t7  5\n").unwrap();

        let count = normalize_pair_list(&path_str(&input), &path_str(&output), false).unwrap();
        assert_eq!(count, 4);
        assert_eq!(
            fs::read_to_string(output.path()).unwrap(),
            "1 4\n2 4\n2 5\n2 7\n"
        );
    }

    #[test]
    fn strict_pair_list_rejects_duplicates_but_lenient_accepts() {
        let input = NamedTempFile::new().unwrap();
        let output = NamedTempFile::new().unwrap();
        fs::write(input.path(), "0 1\n1 0\n3 3\n").unwrap();

        assert!(normalize_pair_list(&path_str(&input), &path_str(&output), false).is_err());
        let count = normalize_pair_list(&path_str(&input), &path_str(&output), true).unwrap();
        assert_eq!(count, 1);
    }
}
