//! Light-field scene assembly.
//!
//! A scene directory holds one PNG per camera of a regular grid plus
//! optional ground truth:
//!
//! ```text
//! scene/
//!   parameters.cfg          [extrinsics] num_cams_y / num_cams_x
//!   input_Cam000.png ...    rows * cols RGB views
//!   gt_depth_lowres.pfm     optional
//!   gt_disp_lowres.pfm      optional
//! ```
//!
//! The views are stacked into a `[rows, cols, H, W, 3]` tensor. The N-th
//! view in sort order sits at grid position `(N / cols, N % cols)`.

use bwds_core::{BuildConfig, BwdsError, Example, FeatureValue, Result, ViewOrder};
use bwds_formats::{FloatMap, ParameterFile};
use ndarray::{Array2, Array4, Array5};
use std::path::{Path, PathBuf};

use crate::image_io::load_rgb8_strict;

/// Scene parameter file name.
pub const PARAMETERS_FILE: &str = "parameters.cfg";

/// Depth ground truth file name.
pub const DEPTH_FILE: &str = "gt_depth_lowres.pfm";

/// Disparity ground truth file name.
pub const DISPARITY_FILE: &str = "gt_disp_lowres.pfm";

const VIEW_PREFIX: &str = "input_";
const VIEW_EXTENSION: &str = ".png";

/// Camera grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    /// Number of camera rows (`num_cams_y`).
    pub rows: usize,
    /// Number of camera columns (`num_cams_x`).
    pub cols: usize,
}

impl GridShape {
    /// Create a grid; both dimensions must be at least 1.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BwdsError::Config(format!(
                "camera grid must be at least 1x1, got {rows}x{cols}"
            )));
        }
        Ok(Self { rows, cols })
    }

    /// Read the grid from the `[extrinsics]` section of a parameter file.
    pub fn from_params(params: &ParameterFile) -> Result<Self> {
        let rows = params.get_int("extrinsics", "num_cams_y")?;
        let cols = params.get_int("extrinsics", "num_cams_x")?;
        let to_dim = |v: i64, key: &str| {
            usize::try_from(v)
                .map_err(|_| BwdsError::Config(format!("{key} must be positive, got {v}")))
        };
        Self::new(to_dim(rows, "num_cams_y")?, to_dim(cols, "num_cams_x")?)
    }

    /// Read the grid from `parameters.cfg` in a scene directory.
    pub fn read(scene_dir: impl AsRef<Path>) -> Result<Self> {
        let path = scene_dir.as_ref().join(PARAMETERS_FILE);
        if !path.is_file() {
            return Err(BwdsError::Config(format!(
                "{} does not exist",
                path.display()
            )));
        }
        Self::from_params(&ParameterFile::from_file(&path)?)
    }

    /// Number of views.
    #[must_use]
    pub fn num_views(&self) -> usize {
        self.rows * self.cols
    }

    /// Grid position of the n-th view.
    #[must_use]
    pub fn position(&self, n: usize) -> (usize, usize) {
        (n / self.cols, n % self.cols)
    }

    /// Index of grid position `(i, j)` in a flattened view batch.
    #[must_use]
    pub fn batch_index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }
}

/// Index of grid position `(i, j)` in the batch produced by [`lf_to_batch`].
#[must_use]
pub fn lf_batch_index(grid: GridShape, i: usize, j: usize) -> usize {
    grid.batch_index(i, j)
}

/// Flatten `[GH, GW, H, W, C]` into a `[GH * GW, H, W, C]` batch of views.
pub fn lf_to_batch<T: Clone>(lf: Array5<T>) -> Result<Array4<T>> {
    let (rows, cols, height, width, channels) = lf.dim();
    let lf = if lf.is_standard_layout() {
        lf
    } else {
        lf.as_standard_layout().into_owned()
    };
    Ok(lf.into_shape_with_order((rows * cols, height, width, channels))?)
}

/// List the view files of a scene in grid order.
pub fn list_views(scene_dir: impl AsRef<Path>, order: ViewOrder) -> Result<Vec<PathBuf>> {
    let mut views: Vec<(String, PathBuf)> = std::fs::read_dir(scene_dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            (name.starts_with(VIEW_PREFIX) && name.ends_with(VIEW_EXTENSION))
                .then(|| (name, entry.path()))
        })
        .collect();

    match order {
        ViewOrder::Lexicographic => views.sort_by(|a, b| a.0.cmp(&b.0)),
        ViewOrder::Numeric => views.sort_by(|a, b| {
            let key = |name: &str| (numeric_suffix(name).is_none(), numeric_suffix(name));
            key(&a.0).cmp(&key(&b.0)).then_with(|| a.0.cmp(&b.0))
        }),
    }
    Ok(views.into_iter().map(|(_, path)| path).collect())
}

/// Trailing integer of a view file stem (`input_Cam010.png` -> 10).
fn numeric_suffix(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(VIEW_EXTENSION).unwrap_or(name);
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[stem.len() - digits..].parse().ok()
}

/// Decode the views and stack them into a `[rows, cols, H, W, 3]` tensor.
pub fn assemble_views(views: &[PathBuf], grid: GridShape) -> Result<Array5<u8>> {
    if views.len() != grid.num_views() {
        return Err(BwdsError::Config(format!(
            "expected {} views for a {}x{} grid, found {}",
            grid.num_views(),
            grid.rows,
            grid.cols,
            views.len()
        )));
    }

    let mut data = Vec::new();
    let mut view_shape = None;
    for path in views {
        let view = load_rgb8_strict(path)?;
        match view_shape {
            None => {
                view_shape = Some(view.dim());
                data.reserve(view.len() * views.len());
            }
            Some(shape) if shape != view.dim() => {
                return Err(BwdsError::Config(format!(
                    "{} is {:?}, expected {:?} like the first view",
                    path.display(),
                    view.dim(),
                    shape
                )));
            }
            Some(_) => {}
        }
        data.extend(view.iter().copied());
    }

    let (height, width, _) = view_shape.unwrap_or((0, 0, 3));
    Ok(Array5::from_shape_vec(
        (grid.rows, grid.cols, height, width, 3),
        data,
    )?)
}

/// Read a single-channel ground-truth map, or a `size x size` zero map if
/// the file does not exist.
pub fn read_aux_map(path: impl AsRef<Path>, size: usize) -> Result<Array2<f32>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), size, "Ground-truth map missing, using zeros");
        return Ok(Array2::zeros((size, size)));
    }
    Ok(FloatMap::from_file(path)?.into_gray()?)
}

/// Options for loading light-field scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightFieldOptions {
    /// Ordering of view files.
    pub view_order: ViewOrder,
    /// Side length of the zero map used for missing ground truth.
    pub aux_map_size: usize,
}

impl Default for LightFieldOptions {
    fn default() -> Self {
        Self {
            view_order: ViewOrder::Lexicographic,
            aux_map_size: 512,
        }
    }
}

impl From<&BuildConfig> for LightFieldOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            view_order: config.view_order,
            aux_map_size: config.aux_map_size,
        }
    }
}

/// A fully loaded light-field scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LightFieldScene {
    /// Scene directory name.
    pub name: String,
    /// Camera grid.
    pub grid: GridShape,
    /// Views, `[rows, cols, H, W, 3]`.
    pub lf: Array5<u8>,
    /// Depth ground truth.
    pub depth: Array2<f32>,
    /// Disparity ground truth.
    pub disparity: Array2<f32>,
}

impl LightFieldScene {
    /// Load a scene directory.
    pub fn load(scene_dir: impl AsRef<Path>, options: &LightFieldOptions) -> Result<Self> {
        let scene_dir = scene_dir.as_ref();
        let name = scene_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let grid = GridShape::read(scene_dir)?;
        let views = list_views(scene_dir, options.view_order)?;
        let lf = assemble_views(&views, grid)?;
        let depth = read_aux_map(scene_dir.join(DEPTH_FILE), options.aux_map_size)?;
        let disparity = read_aux_map(scene_dir.join(DISPARITY_FILE), options.aux_map_size)?;

        tracing::debug!(
            scene = %name,
            rows = grid.rows,
            cols = grid.cols,
            shape = ?lf.shape(),
            "Assembled light field"
        );

        Ok(Self {
            name,
            grid,
            lf,
            depth,
            disparity,
        })
    }

    /// Convert into a record keyed by the scene name.
    #[must_use]
    pub fn into_example(self) -> Example {
        Example::new(
            self.name,
            [
                ("lf", FeatureValue::TensorU8(self.lf.into_dyn())),
                ("depth", FeatureValue::TensorF32(self.depth.into_dyn())),
                ("disparity", FeatureValue::TensorF32(self.disparity.into_dyn())),
            ],
        )
    }
}
