//! 3D surface: scattered (x, y, z) samples interpolated onto a regular grid

use tracing::debug;
use tv_core::Result;

use super::utils::{linspace, mean_by_pair, CubicInterpolator};
use super::{reshape_error, PlotInput};
use crate::spec::ChartData;

/// The first y column is the surface's y axis, the second its height.
/// Duplicate (x, y) pairs are averaged before interpolation.
pub fn surface(input: &PlotInput, resolution: usize) -> Result<ChartData> {
    let [y, z] = input.ys.as_slice() else {
        return Err(reshape_error(input.chart, "expected exactly two y columns"));
    };

    let samples = mean_by_pair(&input.x.cells, &y.cells, &z.cells);
    let interpolator =
        CubicInterpolator::new(&samples).map_err(|e| reshape_error(input.chart, e))?;

    let (x_min, x_max) = extent(samples.iter().map(|s| s.0));
    let (y_min, y_max) = extent(samples.iter().map(|s| s.1));
    let xs = linspace(x_min, x_max, resolution);
    let ys = linspace(y_min, y_max, resolution);
    let grid = interpolator.grid(&xs, &ys);

    debug!(
        "Interpolated {} samples onto a {}x{} surface grid",
        samples.len(),
        xs.len(),
        ys.len()
    );

    Ok(ChartData::Surface { x: xs, y: ys, z: grid })
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
