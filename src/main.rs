use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use iou_robustness::config::{self, ClassifierConfig, DatasetName, Device, ModelPaths, Variant};
use iou_robustness::{
    evaluate, evaluate_parallel, ClampBounds, DirectoryDataset, DistortionConfig, RtenClassifier,
};

#[derive(Parser)]
#[command(name = "iou-robustness")]
#[command(about = "Measure classifier accuracy on randomly shifted crops, bucketed by IoU")]
struct Cli {
    /// Classifier weights to evaluate
    #[arg(long, value_enum)]
    classifier: Variant,

    /// Dataset the classifier was trained on
    #[arg(long, value_enum)]
    dataset: DatasetName,

    /// Inference device
    #[arg(long, value_enum)]
    device: Device,

    /// Batch size hint for inference
    #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE)]
    batch: usize,

    /// Directory holding `<classifier>-cls-<dataset>.rten` and `.labels` files
    #[arg(long, value_name = "DIR", default_value = "models")]
    models_dir: PathBuf,

    /// Directory holding `<dataset>/val/<label>/*.png`
    #[arg(long, value_name = "DIR", default_value = "datasets")]
    datasets_dir: PathBuf,

    /// Evaluate this directory instead of the dataset's default location
    #[arg(long, value_name = "DIR")]
    dataset_root: Option<PathBuf>,

    /// Network input size
    #[arg(long, value_name = "WxH", default_value = "640x640", value_parser = config::parse_size)]
    resize: (u32, u32),

    /// Maximum shift as a fraction of the image width/height
    #[arg(long, default_value_t = iou_robustness::distortion::DEFAULT_STRENGTH)]
    strength: f64,

    /// Upper clamp for shifted crops
    #[arg(long, value_enum, default_value_t = ClampBounds::RegionExtent)]
    clamp: ClampBounds,

    /// Seed for the crop generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of images evaluated in parallel
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose && std::env::var_os("RUST_LOG").is_none() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        pretty_env_logger::init();
    }

    let distortion = DistortionConfig::new()
        .with_strength(args.strength)?
        .with_clamp(args.clamp);

    let paths = ModelPaths::resolve(&args.models_dir, args.classifier, args.dataset);
    let classifier = RtenClassifier::new(
        ClassifierConfig::new(paths)
            .with_device(args.device)
            .with_batch_size(args.batch)
            .with_resize(args.resize.0, args.resize.1),
    )?;

    let root = args
        .dataset_root
        .unwrap_or_else(|| args.dataset.default_root(&args.datasets_dir));
    if !root.is_dir() {
        anyhow::bail!("dataset directory not found: {}", root.display());
    }
    let dataset = DirectoryDataset::new(root);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Dataset {}, distortion {:?}, seed {}", dataset.root().display(), distortion, seed);

    let stats = if args.workers > 1 {
        evaluate_parallel(&dataset, &classifier, &distortion, args.workers, seed)?
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        evaluate(&dataset, &classifier, &distortion, &mut rng)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats.report())?);
    } else {
        println!("{}", stats);
        println!("\n{}", stats.summary());
    }

    Ok(())
}
