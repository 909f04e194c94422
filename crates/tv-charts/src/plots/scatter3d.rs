//! 3D scatter and 3D line: row-wise points, y and z taken from the two y columns

use tv_core::Result;

use super::{reshape_error, PlotInput};
use crate::spec::ChartData;

pub fn points(input: &PlotInput) -> Result<ChartData> {
    let [y, z] = input.ys.as_slice() else {
        return Err(reshape_error(input.chart, "expected exactly two y columns"));
    };
    Ok(ChartData::Points3d {
        x: input.x.cells.clone(),
        y: y.cells.clone(),
        z: z.cells.clone(),
        color: input.color_cells(),
    })
}
