// ============================================================
// Layer 3 — Convolution Kernels
// ============================================================
// A 3×3 weight matrix for a single-channel convolution, plus
// the presets used by the `filters` command.
//
//   vertical-edge     horizontal-edge    blur (÷9)
//   -1  0  1          -1 -1 -1           1 1 1
//   -1  0  1           0  0  0           1 1 1
//   -1  0  1           1  1  1           1 1 1
//
// Custom kernels are written as 9 comma-separated numbers,
// row by row: "0,-1,0,-1,5,-1,0,-1,0".

use std::{fmt, str::FromStr};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::domain::image::Image;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kernel(pub [[f32; 3]; 3]);

/// Named kernels available from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPreset {
    VerticalEdge,
    HorizontalEdge,
    Blur,
    Sharpen,
    Laplacian,
}

impl KernelPreset {
    pub fn kernel(self) -> Kernel {
        match self {
            KernelPreset::VerticalEdge => Kernel([
                [-1.0, 0.0, 1.0],
                [-1.0, 0.0, 1.0],
                [-1.0, 0.0, 1.0],
            ]),
            KernelPreset::HorizontalEdge => Kernel([
                [-1.0, -1.0, -1.0],
                [ 0.0,  0.0,  0.0],
                [ 1.0,  1.0,  1.0],
            ]),
            KernelPreset::Blur => Kernel([[1.0 / 9.0; 3]; 3]),
            KernelPreset::Sharpen => Kernel([
                [ 0.0, -1.0,  0.0],
                [-1.0,  5.0, -1.0],
                [ 0.0, -1.0,  0.0],
            ]),
            KernelPreset::Laplacian => Kernel([
                [0.0,  1.0, 0.0],
                [1.0, -4.0, 1.0],
                [0.0,  1.0, 0.0],
            ]),
        }
    }

    /// Human-readable title used on the rendered figure.
    pub fn title(self) -> &'static str {
        match self {
            KernelPreset::VerticalEdge   => "Vertical edge filter",
            KernelPreset::HorizontalEdge => "Horizontal edge filter",
            KernelPreset::Blur           => "Blur filter",
            KernelPreset::Sharpen        => "Sharpen filter",
            KernelPreset::Laplacian      => "Laplacian filter",
        }
    }
}

impl Kernel {
    /// The identity kernel: a single 1 in the centre.
    pub fn identity() -> Self {
        let mut k = [[0.0; 3]; 3];
        k[1][1] = 1.0;
        Self(k)
    }

    /// Row-major flat copy of the 9 weights.
    pub fn flat(&self) -> [f32; 9] {
        let mut out = [0.0; 9];
        for (i, v) in self.0.iter().flatten().enumerate() {
            out[i] = *v;
        }
        out
    }

    /// The kernel drawn as a 3×3 image.
    pub fn to_image(&self) -> Image {
        Image::from_rows(&self.0)
    }
}

impl FromStr for Kernel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f32>()
                    .with_context(|| format!("'{}' is not a number", v.trim()))
            })
            .collect::<anyhow::Result<Vec<f32>>>()?;

        if values.len() != 9 {
            bail!("a 3x3 kernel needs 9 values, got {}", values.len());
        }

        let mut k = [[0.0; 3]; 3];
        for (i, v) in values.into_iter().enumerate() {
            k[i / 3][i % 3] = v;
        }
        Ok(Kernel(k))
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .0
            .iter()
            .map(|r| format!("[{}, {}, {}]", r[0], r[1], r[2]))
            .collect();
        write!(f, "[{}]", rows.join(", "))
    }
}
