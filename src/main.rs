use std::path::{Path, PathBuf};

use anyhow::Context;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mosaic::candidates::{CandidateSource, PointFile};
use mosaic::filter::FilterStrategy;
use mosaic::pipeline::{builtin_sources, collect_candidates, load_image};
use mosaic::render::render;
use mosaic::serialize::write_files;
use mosaic::{build_mesh, Config};

/// Turn an image into a low-poly mosaic of flat colored triangles.
#[derive(Debug, StructOpt)]
#[structopt(name = "lowpoly")]
pub struct Opt {
    /// Image to approximate.
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Where to write the JSON mesh, `<input>_data.json` by default.
    #[structopt(long, parse(from_os_str))]
    json: Option<PathBuf>,

    /// Where to write the flat text mesh, `<input>_data.txt` by default.
    #[structopt(long, parse(from_os_str))]
    txt: Option<PathBuf>,

    /// Also paint the mosaic into this image.
    #[structopt(long, parse(from_os_str))]
    render: Option<PathBuf>,

    /// Candidate points computed elsewhere, replacing the built-in proposers.
    #[structopt(long, parse(from_os_str))]
    points: Option<PathBuf>,

    /// JSON config file, the flags below override its values.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(long)]
    seed: Option<u64>,

    #[structopt(long)]
    min_point_distance: Option<f64>,

    #[structopt(long)]
    min_area_threshold: Option<f64>,

    #[structopt(long)]
    margin_x: Option<u32>,

    #[structopt(long)]
    margin_y: Option<u32>,

    /// Neighbor search of the point filter: scan, grid or quadtree.
    #[structopt(long)]
    filter: Option<FilterStrategy>,

    #[structopt(long)]
    top_points: Option<usize>,

    #[structopt(long)]
    middle_points: Option<usize>,

    #[structopt(long)]
    bottom_points: Option<usize>,

    /// 0 disables the gradient proposer.
    #[structopt(long)]
    gradient_cell: Option<u32>,

    #[structopt(long)]
    gradient_threshold: Option<f64>,

    /// Sample colors on a single thread.
    #[structopt(long)]
    sequential: bool,

    /// Used when RUST_LOG isn't set.
    #[structopt(long, default_value = "info")]
    log_level: String,
}

impl Opt {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("cannot read config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(v) = self.min_point_distance {
            config.min_point_distance = v;
        }
        if let Some(v) = self.min_area_threshold {
            config.min_area_threshold = v;
        }
        if let Some(v) = self.margin_x {
            config.margin_x = v;
        }
        if let Some(v) = self.margin_y {
            config.margin_y = v;
        }
        if let Some(v) = self.filter {
            config.filter = v;
        }
        if self.sequential {
            config.parallel = false;
        }

        let density = &mut config.density;
        if self.seed.is_some() {
            density.seed = self.seed;
        }
        if let Some(v) = self.top_points {
            density.top_points = v;
        }
        if let Some(v) = self.middle_points {
            density.middle_points = v;
        }
        if let Some(v) = self.bottom_points {
            density.bottom_points = v;
        }
        if let Some(v) = self.gradient_cell {
            density.gradient_cell = v;
        }
        if let Some(v) = self.gradient_threshold {
            density.gradient_threshold = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn default_output(input: &Path, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mosaic".to_string());

    input.with_file_name(format!("{}_data.{}", stem, ext))
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&opt.log_level)),
        )
        .with_target(false)
        .init();

    let config = opt.config()?;
    let image = load_image(&opt.input)?;

    let sources: Vec<Box<dyn CandidateSource>> = match &opt.points {
        Some(path) => vec![Box::new(PointFile { path: path.clone() })],
        None => builtin_sources(&config),
    };
    let candidates = collect_candidates(&image, &sources)?;

    let (mesh, stats) = build_mesh(&image, candidates, &config)?;

    let json = opt
        .json
        .clone()
        .unwrap_or_else(|| default_output(&opt.input, "json"));
    let txt = opt
        .txt
        .clone()
        .unwrap_or_else(|| default_output(&opt.input, "txt"));
    write_files(&mesh, &json, &txt)?;

    if let Some(path) = &opt.render {
        render(&mesh, image.width(), image.height())
            .save(path)
            .with_context(|| format!("cannot save render to {}", path.display()))?;
    }

    info!(?stats, "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("imgs/mountains.jpg"), "json"),
            PathBuf::from("imgs/mountains_data.json")
        );
        assert_eq!(
            default_output(Path::new("tiger.png"), "txt"),
            PathBuf::from("tiger_data.txt")
        );
    }

    #[test]
    fn test_flags_override_config() {
        let opt = Opt::from_iter(&[
            "lowpoly",
            "in.png",
            "--min-point-distance",
            "8",
            "--filter",
            "quadtree",
            "--seed",
            "3",
            "--sequential",
        ]);

        let config = opt.config().unwrap();
        assert_eq!(config.min_point_distance, 8.0);
        assert_eq!(config.filter, FilterStrategy::Quadtree);
        assert_eq!(config.density.seed, Some(3));
        assert!(!config.parallel);
        assert_eq!(config.min_area_threshold, 5.0);
    }

    #[test]
    fn test_invalid_flags_are_rejected() {
        let opt = Opt::from_iter(&["lowpoly", "in.png", "--min-area-threshold=-1"]);
        assert!(opt.config().is_err());
    }
}
