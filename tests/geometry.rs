//! Stride alignment, resampling and normalisation.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use cv_disparity_label::{
    normalize::Normalization,
    padding::{align, PaddingSpec, STRIDE},
    resize::{resize_linear, scale_image},
    Error
};
use ndarray::{Array2, Array3, Array4};

// -----------------------------------------------------------------------------------------------
// PADDING
// -----------------------------------------------------------------------------------------------

#[test]
fn align_rounds_up_to_stride() {
    assert_eq!(align(240), 256);
    assert_eq!(align(320), 320);
    assert_eq!(align(1), 64);
    assert_eq!(align(65), 128);
}

#[test]
fn padding_spec_for_scaled_kitti_frame() {
    let spec = PaddingSpec::for_size(240, 320);

    assert_eq!(spec.max_h, 256);
    assert_eq!(spec.max_w, 320);
    assert_eq!(spec.top_pad, 16);
    assert_eq!(spec.left_pad, 0);
    assert_eq!(spec.max_h % STRIDE, 0);
    assert_eq!(spec.max_w % STRIDE, 0);
}

#[test]
fn pad_places_content_bottom_left() -> Result<(), Box<dyn std::error::Error>> {
    let tensor = Array4::from_elem((1, 3, 50, 70), 1.0f32);
    let spec = PaddingSpec::for_size(50, 70);
    let padded = spec.pad(&tensor)?;

    assert_eq!(padded.shape(), &[1, 3, 64, 128]);
    // Padding rows above the content
    assert_eq!(padded[[0, 0, 13, 0]], 0.0);
    assert_eq!(padded[[0, 0, 14, 0]], 1.0);
    // Padding columns right of the content
    assert_eq!(padded[[0, 2, 63, 69]], 1.0);
    assert_eq!(padded[[0, 2, 63, 70]], 0.0);
    assert_eq!(padded.sum(), 3.0 * 50.0 * 70.0);

    Ok(())
}

#[test]
fn crop_undoes_pad() -> Result<(), Box<dyn std::error::Error>> {
    let field = Array2::from_shape_fn((37, 91), |(y, x)| (y * 1000 + x) as f32);
    let tensor = field.clone().into_shape((1, 1, 37, 91))?;

    let spec = PaddingSpec::for_size(37, 91);
    let padded = spec.pad(&tensor)?;
    let cropped = spec.crop(padded.slice(ndarray::s![0, 0, .., ..]))?;

    assert_eq!(cropped.dim(), (37, 91));
    assert_eq!(cropped, field);

    Ok(())
}

#[test]
fn crop_rejects_unexpected_shape() {
    let spec = PaddingSpec::for_size(240, 320);
    let field = Array2::<f32>::zeros((240, 320));

    assert!(matches!(spec.crop(field.view()), Err(Error::Model(_))));
}

// -----------------------------------------------------------------------------------------------
// RESAMPLING
// -----------------------------------------------------------------------------------------------

#[test]
fn scale_image_rounds_dimensions() -> Result<(), Box<dyn std::error::Error>> {
    let image = Array3::<f32>::zeros((480, 640, 3));
    assert_eq!(scale_image(image.view(), 0.5)?.dim(), (240, 320, 3));

    let image = Array3::<f32>::zeros((375, 1242, 3));
    assert_eq!(scale_image(image.view(), 0.5)?.dim(), (188, 621, 3));

    Ok(())
}

#[test]
fn scale_image_drops_extra_channels() -> Result<(), Box<dyn std::error::Error>> {
    let image = Array3::from_elem((8, 8, 4), 3.0f32);
    let scaled = scale_image(image.view(), 2.0)?;

    assert_eq!(scaled.dim(), (16, 16, 3));
    assert!(scaled.iter().all(|v| (v - 3.0).abs() < 1e-4));

    Ok(())
}

#[test]
fn scale_image_requires_three_channels() {
    let image = Array3::<f32>::zeros((8, 8, 1));

    assert!(matches!(scale_image(image.view(), 0.5), Err(Error::InvalidInput(_))));
}

#[test]
fn scale_image_at_unit_factor_is_identity() -> Result<(), Box<dyn std::error::Error>> {
    let image = Array3::from_shape_fn((9, 13, 3), |(y, x, c)| (y * 31 + x * 7 + c) as f32);

    assert_eq!(scale_image(image.view(), 1.0)?, image);

    Ok(())
}

#[test]
fn cubic_upscale_does_not_clamp() -> Result<(), Box<dyn std::error::Error>> {
    // A sharp edge overshoots on both sides with a cubic kernel
    let image = Array3::from_shape_fn((4, 16, 3), |(_, x, _)| if x < 8 { 0.0 } else { 255.0 });
    let scaled = scale_image(image.view(), 1.5)?;

    assert!(scaled.iter().any(|&v| v < 0.0));
    assert!(scaled.iter().any(|&v| v > 255.0));

    Ok(())
}

#[test]
fn linear_resize_interpolates_between_samples() -> Result<(), Box<dyn std::error::Error>> {
    let field = Array2::from_shape_vec((1, 2), vec![0.0f32, 4.0])?;
    let resized = resize_linear(field.view(), 1, 4)?;

    // Half-pixel centres: samples at -0.25, 0.25, 0.75, 1.25
    assert_eq!(resized.into_raw_vec(), vec![0.0, 1.0, 3.0, 4.0]);

    Ok(())
}

#[test]
fn linear_resize_keeps_aligned_samples_clean() -> Result<(), Box<dyn std::error::Error>> {
    let mut field = Array2::from_elem((4, 4), 2.0f32);
    field[[1, 1]] = f32::INFINITY;

    let resized = resize_linear(field.view(), 4, 4)?;

    assert_eq!(resized[[1, 1]], f32::INFINITY);
    assert_eq!(resized.iter().filter(|v| v.is_finite()).count(), 15);

    Ok(())
}

// -----------------------------------------------------------------------------------------------
// NORMALISATION
// -----------------------------------------------------------------------------------------------

#[test]
fn normalise_is_channel_first() -> Result<(), Box<dyn std::error::Error>> {
    let norm = Normalization::imagenet();
    let image = Array3::from_shape_fn((2, 3, 3), |(_, _, c)| c as f32 * 100.0);
    let tensor = norm.apply(image.view())?;

    assert_eq!(tensor.shape(), &[1, 3, 2, 3]);
    for c in 0..3 {
        let expected = (c as f32 * 100.0 / 255.0 - norm.mean[c]) / norm.std[c];
        assert!((tensor[[0, c, 1, 2]] - expected).abs() < 1e-4);
    }

    Ok(())
}

#[test]
fn normalise_maps_intensities_into_unit_range() -> Result<(), Box<dyn std::error::Error>> {
    let norm = Normalization::imagenet();
    let white = Array3::from_elem((1, 1, 3), 255.0f32);
    let black = Array3::zeros((1, 1, 3));

    let white = norm.apply(white.view())?;
    let black = norm.apply(black.view())?;

    for c in 0..3 {
        assert!((white[[0, c, 0, 0]] - (1.0 - norm.mean[c]) / norm.std[c]).abs() < 1e-4);
        assert!((black[[0, c, 0, 0]] + norm.mean[c] / norm.std[c]).abs() < 1e-4);
    }
    // Red channel of a white pixel
    assert!((white[[0, 0, 0, 0]] - 2.2489).abs() < 1e-3);

    Ok(())
}
