//! Mapping raw predictions back onto the original image.

use cv_disparity_label::{
    padding::PaddingSpec,
    postprocess::{mask_invalid, postprocess, INVALID},
    prelude::*
};
use ndarray::Array2;

fn field(height: usize, width: usize, value: f32) -> PredictedField {
    PredictedField {
        disparity: Array2::from_elem((height, width), value),
        entropy: Array2::from_elem((height, width), 0.5)
    }
}

#[test]
fn output_matches_original_size() -> Result<(), Box<dyn std::error::Error>> {
    let padding = PaddingSpec::for_size(240, 320);
    let (disparity, entropy) = postprocess(field(256, 320, 10.0), &padding, 0.5, (480, 640))?;

    assert_eq!(disparity.dim(), (480, 640));
    assert_eq!(entropy.dim(), (240, 320));
    assert!(disparity.iter().all(|d| (d - 20.0).abs() < 1e-4));

    Ok(())
}

#[test]
fn crop_removes_top_rows_and_right_columns() -> Result<(), Box<dyn std::error::Error>> {
    let padding = PaddingSpec::for_size(60, 100);
    let mut predicted = field(64, 128, 1.0);
    // Mark the padded border, which must not survive the crop
    for x in 0..128 {
        for y in 0..4 {
            predicted.disparity[[y, x]] = 99.0;
        }
    }
    for y in 0..64 {
        for x in 100..128 {
            predicted.disparity[[y, x]] = 99.0;
        }
    }

    let (disparity, entropy) = postprocess(predicted, &padding, 1.0, (60, 100))?;

    assert_eq!(entropy.dim(), (60, 100));
    assert!(disparity.iter().all(|&d| d == 1.0));

    Ok(())
}

#[test]
fn invalid_values_survive_resizing() -> Result<(), Box<dyn std::error::Error>> {
    let padding = PaddingSpec::for_size(32, 32);
    let mut predicted = field(64, 64, 5.0);
    // Content rows start at 32
    predicted.disparity[[40, 10]] = f32::NAN;
    predicted.disparity[[50, 20]] = f32::INFINITY;

    let (disparity, _) = postprocess(predicted, &padding, 0.5, (64, 64))?;

    assert!(disparity.iter().all(|d| !d.is_nan()));
    // Every pixel interpolated from an invalid sample is invalid
    for &(y, x) in [(16, 20), (17, 21), (36, 40), (37, 41)].iter() {
        assert_eq!(disparity[[y, x]], INVALID, "({}, {})", y, x);
    }
    assert!(disparity.iter().filter(|d| d.is_finite()).all(|d| (d - 10.0).abs() < 1e-4));

    Ok(())
}

#[test]
fn mask_keeps_negative_infinity() {
    let mut field = Array2::from_shape_vec(
        (1, 4),
        vec![f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 3.5]
    )
    .unwrap();

    mask_invalid(&mut field);

    assert_eq!(field[[0, 0]], INVALID);
    assert_eq!(field[[0, 1]], INVALID);
    assert_eq!(field[[0, 2]], f32::NEG_INFINITY);
    assert_eq!(field[[0, 3]], 3.5);
}
