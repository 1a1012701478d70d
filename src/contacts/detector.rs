//! Blob detection on capacitance heatmaps.
//!
//! Three stages per frame:
//!
//! 1. Local maxima search above the activation threshold
//! 2. Flood-fill clustering of 8-connected cells above the deactivation
//!    threshold, with colliding floods merged through a union-find
//! 3. A weighted-moment Gaussian fit of every surviving cluster
//!
//! All scratch buffers are owned by the detector and reused across frames;
//! the hot path performs no per-frame allocation once the buffers have grown
//! to the heatmap size.

use crate::types::{Heatmap, Vec2};
use serde::Deserialize;

/// Fits with an eigenvalue below this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DetectorConfig {
    /// Heatmap value above which a cell may become a local maximum.
    #[serde(default = "default_activation")]
    pub activation_threshold: f32,

    /// Heatmap value above which a cell may join a cluster during the
    /// flood fill. Must be below the activation threshold.
    #[serde(default = "default_deactivation")]
    pub deactivation_threshold: f32,

    /// Clusters with fewer cells than this are discarded.
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Whether contacts built from the detected blobs are normalized to
    /// [0, 1] coordinates.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_activation() -> f32 {
    0.24
}

fn default_deactivation() -> f32 {
    0.20
}

fn default_min_cluster_size() -> usize {
    3
}

fn default_normalize() -> bool {
    true
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation(),
            deactivation_threshold: default_deactivation(),
            min_cluster_size: default_min_cluster_size(),
            normalize: default_normalize(),
        }
    }
}

/// Symmetric 2x2 covariance of a fitted blob.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Covariance2 {
    pub xx: f32,
    pub yy: f32,
    pub xy: f32,
}

/// One cluster fitted with a 2-D Gaussian ellipse, in heatmap cell units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    /// Subpixel center of the contact.
    pub mean: Vec2,

    /// Covariance of the weighted cell distribution.
    pub covariance: Covariance2,

    /// Major and minor axis length (sqrt of the eigenvalues).
    pub size: Vec2,

    /// Angle of the major axis, in [0, pi).
    pub orientation: f32,

    /// Peak heatmap value inside the cluster.
    pub value: f32,
}

/// Weighted moment accumulator for one cluster.
#[derive(Debug, Clone, Copy, Default)]
struct ClusterStats {
    weight: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    cells: usize,
    peak: f32,
}

#[derive(Debug)]
pub struct BlobDetector {
    config: DetectorConfig,

    // Scratch buffers, reused across frames.
    maximas: Vec<(usize, usize)>,
    labels: Vec<u32>,
    parent: Vec<u32>,
    stack: Vec<(usize, usize)>,
    stats: Vec<ClusterStats>,
}

impl BlobDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            maximas: Vec::with_capacity(64),
            labels: Vec::new(),
            parent: Vec::new(),
            stack: Vec::new(),
            stats: Vec::new(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Searches for contacts in a heatmap.
    ///
    /// The blobs are written to `blobs` in deterministic order (clusters are
    /// seeded in raster order of their maxima).
    pub fn detect(&mut self, heatmap: &Heatmap, blobs: &mut Vec<Blob>) {
        blobs.clear();

        if heatmap.is_empty() {
            return;
        }

        self.find_maximas(heatmap);
        self.span_clusters(heatmap);
        self.accumulate_moments(heatmap);
        self.fit(blobs);
    }

    /// Stage 1: local maxima above the activation threshold.
    ///
    /// Comparison kernel relative to the candidate cell:
    ///
    /// ```text
    ///   [< ] [< ] [< ]
    ///   [< ] [  ] [<=]
    ///   [<=] [<=] [<=]
    /// ```
    ///
    /// The cells preceding the candidate in raster order use strict
    /// comparison, the following cells allow equality, so a plateau of equal
    /// values contributes exactly one maximum. Missing neighbors at the
    /// borders are skipped.
    fn find_maximas(&mut self, heatmap: &Heatmap) {
        let width = heatmap.width();
        let height = heatmap.height();
        let threshold = self.config.activation_threshold;

        self.maximas.clear();

        for y in 0..height {
            for x in 0..width {
                let value = heatmap.at(x, y);

                if value <= threshold {
                    continue;
                }

                let can_up = y > 0;
                let can_down = y + 1 < height;
                let can_left = x > 0;
                let can_right = x + 1 < width;

                let mut max = true;

                if can_left {
                    max &= heatmap.at(x - 1, y) < value;
                }
                if can_right {
                    max &= heatmap.at(x + 1, y) <= value;
                }

                if can_up {
                    max &= heatmap.at(x, y - 1) < value;

                    if can_left {
                        max &= heatmap.at(x - 1, y - 1) < value;
                    }
                    if can_right {
                        max &= heatmap.at(x + 1, y - 1) < value;
                    }
                }

                if can_down {
                    max &= heatmap.at(x, y + 1) <= value;

                    if can_left {
                        max &= heatmap.at(x - 1, y + 1) <= value;
                    }
                    if can_right {
                        max &= heatmap.at(x + 1, y + 1) <= value;
                    }
                }

                if max {
                    self.maximas.push((x, y));
                }
            }
        }
    }

    /// Stage 2: flood fill from every maximum over 8-connected cells above
    /// the deactivation threshold.
    ///
    /// Labels are keyed by flat cell index; when two floods meet, their
    /// clusters are merged through the union-find parent array, so a cell
    /// belongs to at most one cluster per pass.
    fn span_clusters(&mut self, heatmap: &Heatmap) {
        let width = heatmap.width();
        let height = heatmap.height();
        let threshold = self.config.deactivation_threshold;

        self.labels.clear();
        self.labels.resize(width * height, 0);
        self.parent.clear();
        self.stack.clear();

        for i in 0..self.maximas.len() {
            let (mx, my) = self.maximas[i];

            if self.labels[my * width + mx] != 0 {
                // A previous flood already claimed this maximum.
                continue;
            }

            // Mint a new cluster label (1-based; 0 means unlabeled).
            self.parent.push(self.parent.len() as u32 + 1);
            let label = self.parent.len() as u32;

            self.labels[my * width + mx] = label;
            self.stack.push((mx, my));

            while let Some((x, y)) = self.stack.pop() {
                let x_lo = x.saturating_sub(1);
                let x_hi = (x + 1).min(width - 1);
                let y_lo = y.saturating_sub(1);
                let y_hi = (y + 1).min(height - 1);

                for ny in y_lo..=y_hi {
                    for nx in x_lo..=x_hi {
                        if nx == x && ny == y {
                            continue;
                        }

                        if heatmap.at(nx, ny) <= threshold {
                            continue;
                        }

                        let cell = ny * width + nx;
                        match self.labels[cell] {
                            0 => {
                                self.labels[cell] = label;
                                self.stack.push((nx, ny));
                            }
                            other => union(&mut self.parent, other, label),
                        }
                    }
                }
            }
        }
    }

    /// Stage 3a: one pass over the labeled cells, accumulating weighted
    /// moments per cluster root.
    fn accumulate_moments(&mut self, heatmap: &Heatmap) {
        let width = heatmap.width();

        self.stats.clear();
        self.stats
            .resize(self.parent.len(), ClusterStats::default());

        for (cell, &label) in self.labels.iter().enumerate() {
            if label == 0 {
                continue;
            }

            let root = find(&self.parent, label);
            let stats = &mut self.stats[(root - 1) as usize];

            let x = (cell % width) as f64;
            let y = (cell / width) as f64;
            let w = f64::from(heatmap.data()[cell]);

            stats.weight += w;
            stats.sum_x += w * x;
            stats.sum_y += w * y;
            stats.sum_xx += w * x * x;
            stats.sum_yy += w * y * y;
            stats.sum_xy += w * x * y;
            stats.cells += 1;
            stats.peak = stats.peak.max(heatmap.data()[cell]);
        }
    }

    /// Stage 3b: Gaussian fit per cluster. Degenerate fits (no weight,
    /// singular covariance) and undersized clusters are dropped.
    fn fit(&self, blobs: &mut Vec<Blob>) {
        for (i, stats) in self.stats.iter().enumerate() {
            // Only cluster roots carry accumulated cells.
            if self.parent[i] != i as u32 + 1 || stats.cells == 0 {
                continue;
            }

            if stats.cells < self.config.min_cluster_size {
                continue;
            }

            if let Some(blob) = fit_cluster(stats) {
                blobs.push(blob);
            }
        }
    }
}

/// Finds the root label of a cluster. Labels are 1-based.
fn find(parent: &[u32], mut label: u32) -> u32 {
    while parent[(label - 1) as usize] != label {
        label = parent[(label - 1) as usize];
    }
    label
}

/// Merges two clusters; the smaller root label wins, keeping the merge
/// deterministic.
fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);

    if ra == rb {
        return;
    }

    let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
    parent[(hi - 1) as usize] = lo;
}

/// Fits a 2-D Gaussian to the accumulated moments of one cluster.
fn fit_cluster(stats: &ClusterStats) -> Option<Blob> {
    let w = stats.weight;

    if w <= 0.0 {
        return None;
    }

    let mean_x = stats.sum_x / w;
    let mean_y = stats.sum_y / w;

    // Central second moments, normalized by the total weight.
    let cov_xx = stats.sum_xx / w - mean_x * mean_x;
    let cov_yy = stats.sum_yy / w - mean_y * mean_y;
    let cov_xy = stats.sum_xy / w - mean_x * mean_y;

    // Closed-form eigendecomposition of the symmetric 2x2 covariance.
    let mid = (cov_xx + cov_yy) / 2.0;
    let det = cov_xx * cov_yy - cov_xy * cov_xy;
    let root = (mid * mid - det).max(0.0).sqrt();

    let lambda1 = mid + root;
    let lambda2 = mid - root;

    if lambda2 <= SINGULAR_EPSILON {
        return None;
    }

    // Eigenvector of lambda1: (cov_xy, lambda1 - cov_xx). When the
    // off-diagonal vanishes the axes are already aligned; near-circular
    // fits default to zero rather than flipping on numeric noise.
    let orientation = if cov_xy.abs() < SINGULAR_EPSILON {
        if cov_yy > cov_xx + SINGULAR_EPSILON {
            std::f64::consts::FRAC_PI_2
        } else {
            0.0
        }
    } else {
        let mut angle = (lambda1 - cov_xx).atan2(cov_xy);
        if angle < 0.0 {
            angle += std::f64::consts::PI;
        }
        if angle >= std::f64::consts::PI {
            angle -= std::f64::consts::PI;
        }
        angle
    };

    Some(Blob {
        mean: Vec2::new(mean_x as f32, mean_y as f32),
        covariance: Covariance2 {
            xx: cov_xx as f32,
            yy: cov_yy as f32,
            xy: cov_xy as f32,
        },
        size: Vec2::new(lambda1.sqrt() as f32, lambda2.sqrt() as f32),
        orientation: orientation as f32,
        value: stats.peak,
    })
}
