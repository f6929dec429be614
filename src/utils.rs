use ndarray::{Array2, Axis};

pub fn row_sums(m: &Array2<f64>) -> Vec<f64> {
    m.sum_axis(Axis(1)).to_vec()
}

pub fn to_rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.outer_iter().map(|row| row.to_vec()).collect()
}

pub fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
