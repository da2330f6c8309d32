use iris_bench::{
    ActivationFunction, InferenceBackend, InputSource, Layer, Matrix, Network, RandomSource, ShapeError,
    TopologyConfig,
};
use rand::{rngs::StdRng, SeedableRng};

fn known_network() -> Network {
    let w = Matrix::from_rows(vec![vec![2.0, 3.0]]).unwrap();
    Network::new(vec![Layer::new(w, vec![1.0], ActivationFunction::ReLU).unwrap()]).unwrap()
}

#[test]
fn known_vector_example() {
    let net = known_network();
    let out = net.forward_rows(&[vec![1.0, 1.0], vec![-1.0, -1.0]]).unwrap();
    assert_eq!(out, vec![vec![6.0], vec![0.0]]);
}

#[test]
fn repeated_forward_is_bit_identical() {
    let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(21)).unwrap();
    let batch = RandomSource::new(4, 8).draw(64).unwrap();
    let first = net.forward(&batch).unwrap();
    for _ in 0..10 {
        let again = net.forward(&batch).unwrap();
        assert!(first.as_slice().iter().zip(again.as_slice()).all(|(a, b)| a.to_bits() == b.to_bits()));
    }
}

#[test]
fn batch_rows_are_independent() {
    let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(22)).unwrap();
    let batch = RandomSource::new(4, 9).draw(6).unwrap();
    let whole = net.forward(&batch).unwrap();
    for (i, row) in batch.iter_rows().enumerate() {
        let single = net.forward(&Matrix::from_flat(1, 4, row.to_vec()).unwrap()).unwrap();
        assert_eq!(single.row(0), whole.row(i));
    }
}

#[test]
fn output_is_raw_logits_of_width_three() {
    let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(23)).unwrap();
    let out = net.forward(&RandomSource::new(4, 1).draw(16).unwrap()).unwrap();
    assert_eq!((out.rows(), out.cols()), (16, 3));
    // No softmax: rows need not sum to one and may be negative.
    assert!(out.iter_rows().any(|r| (r.iter().sum::<f32>() - 1.0).abs() > 1e-3));
}

#[test]
fn width_five_row_is_a_shape_error() {
    let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(24)).unwrap();
    let err = net.forward_rows(&[vec![0.0; 5]]).unwrap_err();
    assert_eq!(err, ShapeError::RowWidth { row: 0, expected: 4, actual: 5 });
}

#[test]
fn infinite_input_propagates() {
    let w = Matrix::from_rows(vec![vec![1.0, -1.0]]).unwrap();
    let net = Network::new(vec![Layer::new(w, vec![0.0], ActivationFunction::Identity).unwrap()]).unwrap();
    let out = net.forward_rows(&[vec![f32::INFINITY, 0.0], vec![f32::INFINITY, f32::INFINITY]]).unwrap();
    assert_eq!(out[0][0], f32::INFINITY);
    assert!(out[1][0].is_nan());
}

#[test]
fn network_backend_reports_flops() {
    let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(25)).unwrap();
    let backend: &dyn InferenceBackend = &net;
    assert_eq!(backend.name(), "in-process");
    assert_eq!(backend.flops_per_row(), 2656);
    let batch = RandomSource::new(4, 2).draw(3).unwrap();
    assert_eq!(backend.infer(&batch).unwrap(), net.forward(&batch).unwrap());
}
