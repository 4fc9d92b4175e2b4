//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ndarray::{Array1, Array4};
use tracing::info;

use nowcast_common::geometry::{HISTORY, LEAD, PATCHES_PER_FRAME};
use nowcast_common::PatchGeometry;
use patch_dataset::{build_windows, io, split_by_frames, DatasetSplit, SplitFractions, WindowedDataset};

#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Directory holding the input files; outputs are written next to them
    #[arg(long, default_value = ".", env = "NOWCAST_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Per-frame patches, (frames × patches, C, H, W)
    #[arg(long, default_value = "X_patch_event.npy")]
    pub input_images: PathBuf,

    /// Per-frame patch labels, (frames × patches,)
    #[arg(long, default_value = "Y_patch_event.npy")]
    pub input_labels: PathBuf,

    #[arg(long, default_value = "X_patch_multiframe_t3.npy")]
    pub output_images: PathBuf,

    #[arg(long, default_value = "Y_patch_multiframe_t3.npy")]
    pub output_labels: PathBuf,

    /// Frames stacked into one sample
    #[arg(long, default_value_t = HISTORY)]
    pub history: usize,

    /// Frames between the newest input frame and the label
    #[arg(long, default_value_t = LEAD)]
    pub lead: usize,

    #[arg(long, default_value_t = PATCHES_PER_FRAME)]
    pub patches_per_frame: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[arg(long, default_value = ".", env = "NOWCAST_DATA_DIR")]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "X_patch_multiframe_t3.npy")]
    pub input_images: PathBuf,

    #[arg(long, default_value = "Y_patch_multiframe_t3.npy")]
    pub input_labels: PathBuf,

    /// Where the split files go (default: the data directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value_t = PATCHES_PER_FRAME)]
    pub patches_per_frame: usize,

    /// End of the training range as a fraction of frames
    #[arg(long, default_value_t = 0.70)]
    pub train_end: f64,

    /// End of the validation range as a fraction of frames
    #[arg(long, default_value_t = 0.85)]
    pub val_end: f64,
}

pub fn run_window(args: &WindowArgs) -> Result<WindowedDataset> {
    let images_path = args.data_dir.join(&args.input_images);
    let labels_path = args.data_dir.join(&args.input_labels);

    let images = io::load_images(&images_path)
        .with_context(|| format!("failed to load {}", images_path.display()))?;
    let labels = io::load_labels(&labels_path)
        .with_context(|| format!("failed to load {}", labels_path.display()))?;

    let (_, channels, height, width) = images.dim();
    let geometry = PatchGeometry {
        history: args.history,
        lead: args.lead,
        patches_per_frame: args.patches_per_frame,
        channels,
        height,
        width,
    };

    let dataset = build_windows(images.view(), labels.view(), &geometry)?;

    info!(
        samples = dataset.len(),
        frames = dataset.frames(),
        shape = ?dataset.images.shape(),
        event_ratio = ?dataset.event_ratio(),
        "Built windowed dataset"
    );

    save_pair(
        &args.data_dir.join(&args.output_images),
        &args.data_dir.join(&args.output_labels),
        &dataset.images,
        &dataset.labels,
    )?;
    Ok(dataset)
}

pub fn run_split(args: &SplitArgs) -> Result<DatasetSplit> {
    let images_path = args.data_dir.join(&args.input_images);
    let labels_path = args.data_dir.join(&args.input_labels);

    let images = io::load_images(&images_path)
        .with_context(|| format!("failed to load {}", images_path.display()))?;
    let labels = io::load_labels(&labels_path)
        .with_context(|| format!("failed to load {}", labels_path.display()))?;

    let dataset = WindowedDataset::from_parts(images, labels, args.patches_per_frame)?;
    let fractions = SplitFractions {
        train_end: args.train_end,
        val_end: args.val_end,
    };
    let split = split_by_frames(&dataset, fractions)?;

    let output_dir = args.output_dir.as_deref().unwrap_or(&args.data_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    for part in split.parts() {
        let (images_name, labels_name) = split_file_names(part.name);
        save_pair(
            &output_dir.join(images_name),
            &output_dir.join(labels_name),
            &part.images,
            &part.labels,
        )?;
    }
    Ok(split)
}

/// `X_multi_<split>.npy` / `Y_multi_<split>.npy`
pub fn split_file_names(split: &str) -> (String, String) {
    (format!("X_multi_{split}.npy"), format!("Y_multi_{split}.npy"))
}

fn save_pair(
    images_path: &Path,
    labels_path: &Path,
    images: &Array4<f32>,
    labels: &Array1<f32>,
) -> Result<()> {
    io::save_images(images_path, images)
        .with_context(|| format!("failed to write {}", images_path.display()))?;
    io::save_labels(labels_path, labels)
        .with_context(|| format!("failed to write {}", labels_path.display()))?;
    Ok(())
}
