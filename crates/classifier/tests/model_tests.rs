//! Integration tests for the classifier and Grad-CAM.

use std::sync::Arc;

use classifier::layers::BatchNorm2d;
use classifier::{grad_cam, Classifier, ClassifierError, NetworkWeights};
use ndarray::{Array3, Axis};
use nowcast_common::PredictionLabel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_utils::{assert_all_in_range, assert_approx_eq, create_ramp, create_storm_cell};

// ============================================================================
// Helpers
// ============================================================================

fn sample(data: Vec<f32>) -> Array3<f32> {
    Array3::from_shape_vec((9, 64, 64), data).unwrap()
}

fn random_weights(seed: u64) -> NetworkWeights {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut weights = NetworkWeights::zeroed();
    for block in weights.blocks.iter_mut() {
        block.conv.weight.mapv_inplace(|_| rng.gen_range(-0.2..0.2));
        block.conv.bias.mapv_inplace(|_| rng.gen_range(-0.05..0.05));
        block.bn.weight.mapv_inplace(|_| rng.gen_range(0.5..1.5));
        block.bn.bias.mapv_inplace(|_| rng.gen_range(-0.1..0.1));
        block.bn.running_mean.mapv_inplace(|_| rng.gen_range(-0.1..0.1));
        block.bn.running_var.mapv_inplace(|_| rng.gen_range(0.5..1.5));
    }
    weights.fc.weight.mapv_inplace(|_| rng.gen_range(-1.0..1.0));
    weights.fc.bias[0] = rng.gen_range(-0.5..0.5);
    weights
}

/// Channel 0 of every stage carries the mean input brightness through the
/// network; the linear head reads only that channel.
fn brightness_weights() -> NetworkWeights {
    let mut weights = NetworkWeights::zeroed();
    for (i, block) in weights.blocks.iter_mut().enumerate() {
        let channels = block.conv.out_channels();
        block.bn = BatchNorm2d::identity(channels);
        if i == 0 {
            for c in 0..block.conv.in_channels() {
                block.conv.weight[[0, c, 1, 1]] = 1.0 / 9.0;
            }
        } else {
            block.conv.weight[[0, 0, 1, 1]] = 1.0;
        }
    }
    weights.fc.weight[[0, 0]] = 1.0;
    weights
}

// ============================================================================
// Prediction
// ============================================================================

#[test]
fn test_zeroed_model_predicts_half() {
    let model = Classifier::zeroed();
    let input = Array3::<f32>::zeros((9, 64, 64));

    let (probability, label) = model.classify(input.view()).unwrap();
    assert_eq!(probability, 0.5);
    assert_eq!(label, PredictionLabel::NoHeavyRain);
    assert_eq!(label.as_str(), "No Heavy Rain");
}

#[test]
fn test_wrong_shape_is_rejected() {
    let model = Classifier::zeroed();
    let input = Array3::<f32>::zeros((3, 64, 64));

    let err = model.predict(input.view()).unwrap_err();
    assert!(matches!(err, ClassifierError::InvalidShape { .. }));
    assert_eq!(err.to_string(), "Expected shape (9,64,64), got (3,64,64)");

    let err = model.input_from_parts(&[9, 32, 32], vec![0.0; 9 * 32 * 32]).unwrap_err();
    assert_eq!(err.to_string(), "Expected shape (9,64,64), got (9,32,32)");
}

#[test]
fn test_shape_error_maps_to_client_error() {
    let model = Classifier::zeroed();
    let err = model.validate_shape(&[9, 64]).unwrap_err();
    let common: nowcast_common::NowcastError = err.into();
    assert_eq!(common.http_status_code(), 400);
    assert_eq!(common.to_string(), "Expected shape (9,64,64), got (9,64)");
}

#[test]
fn test_probability_in_unit_interval() {
    let model = Classifier::new(random_weights(7));
    for input in [
        sample(create_storm_cell(9, 64)),
        sample(create_ramp(9, 64)),
        Array3::<f32>::zeros((9, 64, 64)),
    ] {
        let p = model.predict(input.view()).unwrap();
        assert!((0.0..=1.0).contains(&p), "probability {p} out of range");
    }
}

#[test]
fn test_brightness_model_logit() {
    let model = Classifier::new(brightness_weights());
    let input = sample(create_storm_cell(9, 64));

    let trace = model.forward_traced(input.view()).unwrap();
    // a quarter of the final 8x8 map is 0.9, the rest 0.1
    assert_approx_eq!(trace.logit, 0.3, 1e-3);

    let (probability, label) = model.classify(input.view()).unwrap();
    assert_approx_eq!(probability, 1.0 / (1.0 + (-0.3f32).exp()), 1e-3);
    assert_eq!(label, PredictionLabel::HeavyRain);
}

// ============================================================================
// Weights
// ============================================================================

#[test]
fn test_safetensors_roundtrip() {
    let weights = random_weights(11);
    let bytes = weights.to_safetensors().unwrap();

    let loaded = NetworkWeights::from_safetensors(&bytes).unwrap();
    assert_eq!(loaded, weights);

    let model = Classifier::from_safetensors(&bytes).unwrap();
    let input = sample(create_ramp(9, 64));
    let direct = Classifier::new(weights).predict(input.view()).unwrap();
    assert_eq!(model.predict(input.view()).unwrap(), direct);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.safetensors");
    NetworkWeights::zeroed().save(&path).unwrap();

    let model = Classifier::load(&path).unwrap();
    let input = Array3::<f32>::ones((9, 64, 64));
    assert_eq!(model.predict(input.view()).unwrap(), 0.5);
}

#[test]
fn test_load_missing_file() {
    let err = Classifier::load("/nonexistent/model.safetensors").unwrap_err();
    assert!(matches!(err, ClassifierError::Io(_)));
}

#[test]
fn test_garbage_weights_rejected() {
    let err = Classifier::from_safetensors(b"not a safetensors file").unwrap_err();
    assert!(matches!(err, ClassifierError::Safetensors(_)));
}

#[test]
fn test_wrong_tensor_shape_rejected() {
    let mut weights = NetworkWeights::zeroed();
    weights.fc = classifier::layers::Linear::zeros(64, 1);
    let bytes = weights.to_safetensors().unwrap();

    let err = NetworkWeights::from_safetensors(&bytes).unwrap_err();
    match err {
        ClassifierError::TensorShape { name, expected, got } => {
            assert_eq!(name, "fc.weight");
            assert_eq!(expected, vec![1, 128]);
            assert_eq!(got, vec![1, 64]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Grad-CAM
// ============================================================================

#[test]
fn test_gradcam_zero_model_is_flat() {
    let model = Classifier::zeroed();
    let input = sample(create_storm_cell(9, 64));

    let cam = grad_cam(&model, input.view()).unwrap();
    assert_eq!(cam.probability, 0.5);
    assert_eq!(cam.heatmap.dim(), (16, 16));
    assert!(cam.heatmap.iter().all(|v| *v == 0.0));
}

#[test]
fn test_gradcam_highlights_bright_region() {
    let model = Classifier::new(brightness_weights());
    let input = sample(create_storm_cell(9, 64));

    let cam = grad_cam(&model, input.view()).unwrap();
    assert!(cam.channel_weights[0] > 0.0);
    assert!(cam.channel_weights.iter().skip(1).all(|w| *w == 0.0));

    // storm cell occupies the top-left quadrant of the 16x16 map
    assert!(cam.heatmap[[0, 0]] > 0.99);
    assert!(cam.heatmap[[7, 7]] > 0.99);
    assert!(cam.heatmap[[8, 8]] < 1e-6);
    assert!(cam.heatmap[[15, 0]] < 1e-6);
}

#[test]
fn test_gradcam_values_in_unit_interval() {
    let model = Classifier::new(random_weights(3));
    let input = sample(create_ramp(9, 64));

    let cam = grad_cam(&model, input.view()).unwrap();
    assert_all_in_range!(cam.heatmap, 0.0, 1.0);
    assert_approx_eq!(cam.probability, model.predict(input.view()).unwrap(), 1e-6);

    let max = cam.heatmap.iter().copied().fold(0.0f32, f32::max);
    assert!(max == 0.0 || max > 0.99);
}

#[test]
fn test_gradcam_rejects_wrong_shape() {
    let model = Classifier::zeroed();
    let input = Array3::<f32>::zeros((9, 64, 32));
    assert!(grad_cam(&model, input.view()).is_err());
}

#[test]
fn test_concurrent_explanations_are_independent() {
    let model = Arc::new(Classifier::new(random_weights(21)));
    let inputs: Vec<Array3<f32>> = vec![
        sample(create_storm_cell(9, 64)),
        sample(create_ramp(9, 64)),
    ];
    let expected: Vec<_> = inputs
        .iter()
        .map(|x| grad_cam(&model, x.view()).unwrap().heatmap)
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let model = Arc::clone(&model);
                let input = &inputs[i % 2];
                scope.spawn(move || grad_cam(&model, input.view()).unwrap().heatmap)
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), expected[i % 2]);
        }
    });
}

#[test]
fn test_gradcam_channel_weights_match_gradient_means() {
    let model = Classifier::new(random_weights(5));
    let input = sample(create_storm_cell(9, 64));

    let trace = model.forward_traced(input.view()).unwrap();
    let grads = classifier::gradcam::logit_gradient(&model, &trace);
    let cam = grad_cam(&model, input.view()).unwrap();

    for (c, plane) in grads.axis_iter(Axis(0)).enumerate() {
        assert_approx_eq!(cam.channel_weights[c], plane.mean().unwrap(), 1e-7);
    }
}
