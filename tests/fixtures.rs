mod support;

use index_matrix::{max, min, sum, sum_axis, trace, Matrix, MatrixError, ReduceAxis};
use support::{grid_interp1, magic};

fn assert_magic(m: &Matrix) {
    let n = m.nrows();
    let total = (n * (n * n + 1) / 2) as f64;
    assert!(m.is_square());
    assert!(sum_axis(m, ReduceAxis::Columns).iter().all(|s| s == total));
    assert!(sum_axis(m, ReduceAxis::Rows).iter().all(|s| s == total));
    assert_eq!(trace(m), total);
    // Anti-diagonal through a column-reversed view.
    let mut flipped = m.clone();
    let left: Vec<usize> = (0..n / 2).collect();
    let right: Vec<usize> = (0..n / 2).map(|c| n - 1 - c).collect();
    flipped.swap_cols(left, right).unwrap();
    assert_eq!(trace(&flipped), total);

    let mut values = m.to_vec();
    values.sort_by(f64::total_cmp);
    let expected: Vec<f64> = (1..=n * n).map(|v| v as f64).collect();
    assert_eq!(values, expected);
}

#[test]
fn test_magic_known_squares() {
    assert_eq!(
        magic(3).unwrap().to_nested(),
        vec![
            vec![8.0, 1.0, 6.0],
            vec![3.0, 5.0, 7.0],
            vec![4.0, 9.0, 2.0],
        ]
    );
    assert_eq!(
        magic(4).unwrap().to_vec(),
        vec![
            16.0, 2.0, 3.0, 13.0, 5.0, 11.0, 10.0, 8.0, 9.0, 7.0, 6.0, 12.0, 4.0, 14.0, 15.0,
            1.0
        ]
    );
    assert_eq!(magic(1).unwrap().to_vec(), vec![1.0]);
}

#[test]
fn test_magic_all_kinds() {
    for n in [3usize, 4, 5, 6, 7, 8, 10, 12, 14] {
        assert_magic(&magic(n).unwrap());
    }
    assert!(magic(2).is_err());
}

#[test]
fn test_magic_extremes() {
    let m = magic(6).unwrap();
    assert_eq!(max(&m), 36.0);
    assert_eq!(min(&m), 1.0);
    assert_eq!(sum(&m), 666.0);
}

#[test]
fn test_interp_column_data() {
    let v = Matrix::column(vec![0.0, 10.0, 20.0, 30.0]);
    let q = Matrix::column(vec![0.0, 0.5, 1.25, 3.0, -1.0, 5.0]);
    let out = grid_interp1(&v, &q).unwrap();
    assert_eq!(out.size(), (6, 1));
    let got = out.to_vec();
    assert_eq!(&got[..4], &[0.0, 5.0, 12.5, 30.0]);
    assert!(got[4].is_nan());
    assert!(got[5].is_nan());
}

#[test]
fn test_interp_row_of_queries() {
    let v = Matrix::column(vec![0.0, 10.0, 20.0, 30.0]);
    let q = Matrix::row(vec![0.5, 2.0, 2.5]);
    let out = grid_interp1(&v, &q).unwrap();
    assert_eq!(out.size(), (1, 3));
    assert_eq!(out.to_vec(), vec![5.0, 20.0, 25.0]);
}

#[test]
fn test_interp_multi_column_data() {
    let v = Matrix::from_rows(&[[0.0, 0.0], [10.0, 100.0], [20.0, 200.0], [30.0, 300.0]])
        .unwrap();
    let q = Matrix::column(vec![1.5, 9.0]);
    let out = grid_interp1(&v, &q).unwrap();
    assert_eq!(out.size(), (2, 2));
    assert_eq!(out.get(0, ..).unwrap().to_vec(), vec![15.0, 150.0]);
    assert!(out.get(1, ..).unwrap().iter().all(f64::is_nan));

    let bad = Matrix::row(vec![0.0, 1.0]);
    assert!(matches!(
        grid_interp1(&v, &bad),
        Err(MatrixError::Dimension { .. })
    ));
}
