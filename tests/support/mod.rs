//! Shared helpers for the integration tests.
//!
//! The fixtures here are consumers of the public API only: they build magic
//! squares and interpolate gridded data using selectors, masks and
//! broadcasting, the way downstream code would.

#![allow(dead_code)]

use index_matrix::{
    bin, grid, map_many, mcat, reshape, Matrix, MatrixError, Operand, RangeSpec, RangeToken,
    Result,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Install a subscriber for the current test only.
///
/// The returned guard keeps it active; `RUST_LOG` overrides the default
/// `trace` level.
pub fn init_test_subscriber() -> tracing::subscriber::DefaultGuard {
    let fmt_layer = fmt::layer().with_target(true).with_test_writer();

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .set_default()
}

/// Random matrix with entries in `[-1, 1)`.
pub fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    Matrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0..1.0))
}

/// Random square matrix made non-singular by a dominant diagonal.
pub fn random_invertible(seed: u64, n: usize) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let m = random_matrix(&mut rng, n, n);
    m.diagonal_view()
        .set_linear_with(":", |v, _, _| v + n as f64 + 1.0)
        .unwrap();
    m
}

fn tokens(tokens: Vec<RangeToken>) -> RangeSpec {
    RangeSpec::from(tokens)
}

/// Magic square of order `n` (odd, doubly-even and singly-even cases).
pub fn magic(n: usize) -> Result<Matrix> {
    use RangeToken::{Colon, Index};

    if n == 2 || n == 0 {
        return Err(MatrixError::Size {
            required: 3,
            available: n,
        });
    }
    let size = n as f64;
    let ni = n as isize;

    if n % 2 == 1 {
        let span = tokens(vec![Index(1), Colon, Index(ni)]);
        let (i, j) = grid(&span, &span)?;
        let offset = ((ni - 3) >> 1) as f64;
        let a = map_many(&[(&i).into(), (&j).into()], |v| (v[0] + v[1] + offset) % size)?;
        let b = map_many(&[(&i).into(), (&j).into()], |v| (v[0] + 2.0 * v[1] - 2.0) % size)?;
        return map_many(&[a.into(), b.into()], |v| size * v[0] + v[1] + 1.0);
    }

    if n % 4 == 0 {
        let span = tokens(vec![Index(1), Colon, Index(ni)]);
        let (i, j) = grid(&span, &span)?;
        let count = n * n;
        let m = reshape(
            &Matrix::row((1..=count).map(|v| v as f64).collect()),
            n,
            n,
        )?;
        let k = bin(&[i.into(), j.into()], |v| {
            ((v[0] % 4.0) / 2.0).floor() == ((v[1] % 4.0) / 2.0).floor()
        })?;
        m.set_linear_with(&k, |v, _, _| (count + 1) as f64 - v)?;
        return Ok(m);
    }

    let p = n / 2;
    let pp = (p * p) as f64;
    let m = magic(p)?;
    let shifted = |by: f64| m.map(|v| v + by);
    let (m2, m3, m1) = (shifted(2.0 * pp), shifted(3.0 * pp), shifted(pp));
    let o = mcat(&[vec![&m, &m2], vec![&m3, &m1]])?;

    let k = (n - 2) / 4;
    let pi = p as isize;
    let ki = k as isize;
    let cols = tokens(vec![Colon, Index(ki - 1), Index(ni + 1 - ki), Colon]);
    let rotated = tokens(vec![Index(pi), Colon, Colon, Index(pi - 1)]);
    o.set(":", cols.clone(), o.get(rotated, cols)?)?;

    let cols = vec![0, k];
    o.set(vec![k, k + p], cols.clone(), o.get(vec![k + p, k], cols)?)?;
    Ok(o)
}

/// Linear interpolation of uniformly spaced data at fractional row positions.
///
/// If `v` is a column, the result has the shape of `q`. Otherwise `q` must be
/// a column and the result has its rows and the columns of `v`. Positions
/// outside `[0, rows(v) - 1]` give NaN.
pub fn grid_interp1(v: &Matrix, q: &Matrix) -> Result<Matrix> {
    let (v_rows, v_cols) = v.size();
    let (q_rows, q_cols) = q.size();
    if q_cols > 1 && v_cols > 1 {
        return Err(MatrixError::Dimension {
            expected: (q_rows, 1),
            found: (q_rows, q_cols),
        });
    }
    let last = v_rows.saturating_sub(1) as f64;
    let sel = bin(&[q.into()], |x| x[0] >= 0.0 && x[0] <= last)?;
    let x = q.get_linear(&sel)?;
    let i0 = x.map(f64::floor);
    let i1 = i0.map(|i| (i + 1.0).min(last));
    let frac = x.map(|x| x % 1.0);
    let lerp = |a: &[f64]| (1.0 - a[2]) * a[0] + a[2] * a[1];

    if q_cols == 1 {
        let out = Matrix::filled(q_rows, v_cols, f64::NAN);
        let values = map_many(
            &[v.get(&i0, ":")?.into(), v.get(&i1, ":")?.into(), frac.into()],
            lerp,
        )?;
        out.set(&sel, ":", values)?;
        Ok(out)
    } else {
        let out = Matrix::filled(q_rows, q_cols, f64::NAN);
        let values = map_many(
            &[
                v.get_linear(&i0)?.into(),
                v.get_linear(&i1)?.into(),
                Operand::from(frac),
            ],
            lerp,
        )?;
        out.set_linear(&sel, values)?;
        Ok(out)
    }
}
