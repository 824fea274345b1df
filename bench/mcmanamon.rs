use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_disparity_label::{
    mcmanamon::{McManamon, Params},
    padding::PaddingSpec,
    postprocess::postprocess,
    prelude::*,
    resize::scale_image
};
use ndarray::{Array3, Array4};

fn mcmanamon_bench(c: &mut Criterion) {

    // Build a textured pair shifted by 6 pixels
    let texture = |x: usize, y: usize| ((x * 138 + y * 97) % 251) as f32;
    let left = Array4::from_shape_fn((1, 3, 128, 256), |(_, _, y, x)| texture(x, y));
    let right = Array4::from_shape_fn((1, 3, 128, 256), |(_, _, y, x)| texture(x + 6, y));

    // Build disparity alg
    let mut disp = McManamon::new(Params::from_options(ModelOptions::default()));
    let config = configure(Some(128.0), 1.0).unwrap();

    // Benchmark compute function
    c.bench_function("mcmanamon 256x128", |b| {
        b.iter(|| disp.infer(black_box(&left), black_box(&right), &config))
    });
}

fn resample_bench(c: &mut Criterion) {
    let image = Array3::from_shape_fn((375, 1242, 3), |(y, x, ch)| ((x * 7 + y * 13 + ch) % 256) as f32);

    c.bench_function("scale kitti frame 0.5", |b| {
        b.iter(|| scale_image(black_box(image.view()), 0.5))
    });

    let padding = PaddingSpec::for_size(188, 621);
    c.bench_function("postprocess kitti frame 0.5", |b| {
        b.iter(|| {
            let field = PredictedField {
                disparity: ndarray::Array2::from_elem((padding.max_h, padding.max_w), 12.0),
                entropy: ndarray::Array2::zeros((padding.max_h, padding.max_w))
            };
            postprocess(field, &padding, 0.5, (375, 1242))
        })
    });
}

criterion_group!(benches, mcmanamon_bench, resample_bench);
criterion_main!(benches);
