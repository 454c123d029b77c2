// ============================================================
// Layer 5 — Convolution Preview
// ============================================================
// Builds a single-channel 3×3 Conv2d whose weights are set to a
// given kernel (bias disabled), and runs it over plain images.
// The output is 2 pixels narrower and shorter than the input
// (no padding, stride 1).

use anyhow::{anyhow, ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    module::Param,
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
};

use crate::domain::{image::Image, kernel::Kernel};

/// A 1-in / 1-out 3×3 convolution carrying `kernel` as its weights.
pub fn kernel_conv<B: Backend>(kernel: &Kernel, device: &B::Device) -> Conv2d<B> {
    let mut conv = Conv2dConfig::new([1, 1], [3, 3])
        .with_bias(false)
        .init(device);

    let weight = Tensor::<B, 1>::from_floats(kernel.flat().as_slice(), device).reshape([1, 1, 3, 3]);
    conv.weight = Param::from_tensor(weight);
    conv
}

/// Convolve every image with `kernel`. All images must share one size.
/// Labels carry over to the filtered images.
pub fn apply_kernel<B: Backend>(kernel: &Kernel, images: &[Image], device: &B::Device) -> Result<Vec<Image>> {
    let Some(first) = images.first() else {
        return Ok(Vec::new());
    };
    let (width, height) = (first.width, first.height);
    ensure!(width >= 3 && height >= 3, "images must be at least 3x3, got {width}x{height}");
    ensure!(
        images.iter().all(|im| im.width == width && im.height == height),
        "all images must be {width}x{height}"
    );

    let flat: Vec<f32> = images.iter().flat_map(|im| im.pixels.iter().copied()).collect();
    let input = Tensor::<B, 1>::from_floats(flat.as_slice(), device)
        .reshape([images.len(), 1, height, width]);

    let output = kernel_conv::<B>(kernel, device).forward(input);
    let [n, _, out_h, out_w] = output.dims();

    let values = output
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("cannot read convolution output: {e:?}"))?;

    Ok((0..n)
        .map(|i| {
            let start  = i * out_h * out_w;
            let pixels = values[start..start + out_h * out_w].to_vec();
            let mut im = Image::new(out_w, out_h, pixels);
            im.label   = images[i].label;
            im
        })
        .collect())
}

/// `apply_kernel` on the ndarray CPU backend.
pub fn filter_images(kernel: &Kernel, images: &[Image]) -> Result<Vec<Image>> {
    apply_kernel::<NdArray>(kernel, images, &NdArrayDevice::Cpu)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kernel::KernelPreset;

    type TestBackend = NdArray;

    /// 4×4 image with value = column index
    fn ramp() -> Image {
        Image::new(4, 4, (0..16).map(|i| (i % 4) as f32).collect()).with_label(3)
    }

    #[test]
    fn test_identity_kernel_crops_border() {
        let out = apply_kernel::<TestBackend>(&Kernel::identity(), &[ramp()], &Default::default()).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!((out[0].width, out[0].height), (2, 2));
        assert_eq!(out[0].pixels, vec![1.0, 2.0, 1.0, 2.0]);
        assert_eq!(out[0].label, Some(3));
    }

    #[test]
    fn test_vertical_edge_responds_to_horizontal_gradient() {
        let k   = KernelPreset::VerticalEdge.kernel();
        let out = apply_kernel::<TestBackend>(&k, &[ramp()], &Default::default()).unwrap();

        // each 3×3 window: rows of (c-1, c, c+1) → 3 * ((c+1) - (c-1)) = 6
        for v in &out[0].pixels {
            assert!((v - 6.0).abs() < 1e-5, "got {v}");
        }
    }

    #[test]
    fn test_horizontal_edge_ignores_horizontal_gradient() {
        let k   = KernelPreset::HorizontalEdge.kernel();
        let out = apply_kernel::<TestBackend>(&k, &[ramp()], &Default::default()).unwrap();
        assert!(out[0].pixels.iter().all(|v| v.abs() < 1e-5));
    }

    #[test]
    fn test_mismatched_sizes_are_rejected() {
        let small = Image::new(3, 3, vec![0.0; 9]);
        let res   = apply_kernel::<TestBackend>(&Kernel::identity(), &[ramp(), small], &Default::default());
        assert!(res.is_err());
    }

    #[test]
    fn test_filter_images_matches_generic_path() {
        let k = KernelPreset::Blur.kernel();
        let a = filter_images(&k, &[ramp()]).unwrap();
        let b = apply_kernel::<TestBackend>(&k, &[ramp()], &Default::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_images_gives_no_output() {
        let out = apply_kernel::<TestBackend>(&Kernel::identity(), &[], &Default::default()).unwrap();
        assert!(out.is_empty());
    }
}
