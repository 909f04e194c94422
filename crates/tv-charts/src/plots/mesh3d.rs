//! 3D mesh: (x, y) -> z pivot flattened into mesh vertices

use itertools::Itertools;
use ordered_float::OrderedFloat;
use tv_core::Result;

use super::utils::mean_by_pair;
use super::{reshape_error, PlotInput};
use crate::spec::ChartData;

/// Pivot the samples on sorted x and y, averaging duplicates, and emit one
/// vertex per occupied grid cell (x-major order).
pub fn mesh(input: &PlotInput) -> Result<ChartData> {
    let [y, z] = input.ys.as_slice() else {
        return Err(reshape_error(input.chart, "expected exactly two y columns"));
    };

    let (mut xs, mut ys, mut zs) = (Vec::new(), Vec::new(), Vec::new());
    for (x, y, z) in mean_by_pair(&input.x.cells, &y.cells, &z.cells)
        .into_iter()
        .sorted_by_key(|&(x, y, _)| (OrderedFloat(x), OrderedFloat(y)))
    {
        xs.push(x);
        ys.push(y);
        zs.push(z);
    }

    Ok(ChartData::Mesh { x: xs, y: ys, z: zs })
}
