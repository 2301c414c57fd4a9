use crate::problems::MixedIntGoldstein;
use crate::runner::report::{contour_html, save_html};
use crate::runner::Result;
use log::info;
use std::path::{Path, PathBuf};

/// Saves a contour figure of the Goldstein function for the levels `z1`, `z2`
/// sampled on a `n` x `n` grid as `goldstein_<z1>_<z2>.html` in `out_dir`
pub fn plot_goldstein<P: AsRef<Path>>(z1: usize, z2: usize, n: usize, out_dir: P) -> Result<PathBuf> {
    let (x1s, x2s, values) = MixedIntGoldstein::new().grid(z1, z2, n)?;
    let html = contour_html(&format!("Goldstein function (z1 = {z1}, z2 = {z2})"), &x1s, &x2s, &values)?;
    let path = out_dir.as_ref().join(format!("goldstein_{z1}_{z2}.html"));
    save_html(&path, &html)?;
    info!("Goldstein contour saved in {path:?}");
    Ok(path)
}

/// Saves the contour figures of every level combination
pub fn plot_goldstein_levels<P: AsRef<Path>>(n: usize, out_dir: P) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(9);
    for z1 in 0..3 {
        for z2 in 0..3 {
            paths.push(plot_goldstein(z1, z2, n, out_dir.as_ref())?);
        }
    }
    Ok(paths)
}
