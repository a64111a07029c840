//! Property-based tests for views, ranges and the solver.

use index_matrix::{
    cumsum, diff, ldiv, matmul, reshape, resolve, shift, Matrix, RangeSpec, RangeToken,
    ReduceAxis,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn shape_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..8, 1usize..8)
}

/// Matrix with small integer entries, so sums and differences stay exact.
fn int_matrix_strategy() -> impl Strategy<Value = Matrix> {
    shape_strategy().prop_flat_map(|(r, c)| {
        prop::collection::vec(-50i32..50, r * c).prop_map(move |data| {
            Matrix::from_vec(r, c, data.into_iter().map(f64::from).collect()).unwrap()
        })
    })
}

/// Strictly diagonally dominant system with a single right-hand side.
fn system_strategy() -> impl Strategy<Value = (Matrix, Matrix)> {
    (1usize..7).prop_flat_map(|n| {
        (
            prop::collection::vec(-1.0f64..1.0, n * n),
            prop::collection::vec(-10.0f64..10.0, n),
        )
            .prop_map(move |(a, b)| {
                let a = Matrix::from_vec(n, n, a).unwrap();
                a.diagonal_view()
                    .set_linear_with(":", |v, _, _| v + n as f64 + 1.0)
                    .unwrap();
                (a, Matrix::column(b))
            })
    })
}

// ============================================================================
// Range properties
// ============================================================================

proptest! {
    /// An inclusive unit run yields every index from start to end.
    #[test]
    fn prop_unit_run(len in 1usize..40, a in 0usize..40, b in 0usize..40) {
        let (start, end) = (a.min(len - 1), b.min(len - 1));
        let spec = RangeSpec::new(vec![
            RangeToken::Index(start as isize),
            RangeToken::Colon,
            RangeToken::Index(end as isize),
        ]);
        let got = resolve(&spec, Some(len)).unwrap();
        let expected: Vec<usize> = (start..=end).collect();
        prop_assert_eq!(got, expected);
    }

    /// `k : : k-1` visits every index once, starting at `k`.
    #[test]
    fn prop_wrapping_rotation(len in 2usize..40, k in 0usize..40) {
        let k = 1 + k % (len - 1);
        let spec: RangeSpec = format!("{} : : {}", k, k as isize - 1).parse().unwrap();
        let got = resolve(&spec, Some(len)).unwrap();
        prop_assert_eq!(got.len(), len);
        prop_assert_eq!(got[0], k);
        let mut sorted = got.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
    }

    /// A negative step from the implied start reverses the dimension.
    #[test]
    fn prop_reverse(len in 1usize..40) {
        let got = resolve(&"::-1".parse().unwrap(), Some(len)).unwrap();
        prop_assert_eq!(got, (0..len).rev().collect::<Vec<_>>());
    }

    /// Display output parses back to the same specification.
    #[test]
    fn prop_display_parses_back(ints in prop::collection::vec(-20isize..20, 1..5)) {
        let mut tokens = Vec::new();
        for (k, i) in ints.into_iter().enumerate() {
            if k % 2 == 1 {
                tokens.push(RangeToken::Colon);
            }
            tokens.push(RangeToken::Index(i));
        }
        let spec = RangeSpec::new(tokens);
        let text = spec.to_string();
        prop_assert_eq!(text.parse::<RangeSpec>().unwrap(), spec);
    }
}

// ============================================================================
// View properties
// ============================================================================

proptest! {
    #[test]
    fn prop_transpose_involution(m in int_matrix_strategy()) {
        let t = m.t();
        prop_assert_eq!(t.size(), (m.ncols(), m.nrows()));
        prop_assert!(t.shares_buffer_with(&m));
        prop_assert_eq!(t.t(), m);
    }

    #[test]
    fn prop_linear_get_reshapes_back(m in int_matrix_strategy()) {
        let (r, c) = m.size();
        let flat = m.get_linear(":").unwrap();
        prop_assert_eq!(reshape(&flat, r, c).unwrap(), m);
    }

    #[test]
    fn prop_shift_roundtrip(m in int_matrix_strategy(), rk in -10isize..10, ck in -10isize..10) {
        let there = shift(&m, rk, ck);
        prop_assert_eq!(shift(&there, -rk, -ck), m);
    }

    #[test]
    fn prop_diff_undoes_cumsum(m in int_matrix_strategy(), rows in any::<bool>()) {
        let axis = if rows { ReduceAxis::Rows } else { ReduceAxis::Columns };
        prop_assert_eq!(diff(&cumsum(&m, axis), axis), m);
    }

    #[test]
    fn prop_swap_twice_restores(m in int_matrix_strategy(), a in 0usize..8, b in 0usize..8) {
        let mut v = m.clone();
        let (a, b) = (a % m.nrows(), b % m.nrows());
        v.swap_rows(a, b).unwrap();
        v.swap_rows(a, b).unwrap();
        prop_assert_eq!(v.row_offsets(), m.row_offsets());
    }
}

// ============================================================================
// Solver properties
// ============================================================================

proptest! {
    #[test]
    fn prop_ldiv_solves_dominant_systems((a, b) in system_strategy()) {
        let x = ldiv(&a, &b).unwrap();
        let back = matmul(&a, &x).unwrap();
        for (got, want) in back.iter().zip(b.iter()) {
            prop_assert!((got - want).abs() < 1e-9, "residual {} vs {}", got, want);
        }
    }
}
