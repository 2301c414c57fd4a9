//! Self-contained HTML figures embedding [Plotly.js](https://plotly.com/javascript/) charts.
//!
//! An internet connection is needed on first load to fetch Plotly.js from a CDN.
use crate::errors::Result;
use crate::metrics::MetricSelection;
use crate::results::AggregatedResult;
use core::fmt::Write as _;
use ndarray::{Array1, Array2};
use std::path::Path;

const COLORS: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn html_page(title: &str, body: &str) -> String {
    let mut html = String::with_capacity(4096 + body.len());
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         background: #f5f6fa; color: #2c3e50; padding: 24px; }}
  h1 {{ text-align: center; font-size: 1.5em; }}
  .chart {{ background: #fff; border-radius: 8px; padding: 16px; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="chart"><div id="figure" style="height: 600px"></div></div>
{body}
</body>
</html>
"#,
    );
    html
}

/// Comparison of one metric value across algorithms: the mean over the
/// repetitions as a line per algorithm, individual repetitions as faint lines,
/// against the mean number of evaluations.
pub fn metric_comparison_html(selection: &MetricSelection, results: &[AggregatedResult]) -> Result<String> {
    let mut traces = String::new();
    for (k, result) in results.iter().enumerate() {
        let Some(stats) = result.stats(&selection.metric, &selection.value) else {
            continue;
        };
        let color = COLORS[k % COLORS.len()];
        let x = serde_json::to_string(&result.n_eval)?;
        let name = escape_js(&result.algorithm_name);
        for trace in &stats.traces {
            let _ = write!(
                traces,
                r#"{{ x: {x}, y: {y}, mode: "lines", type: "scatter", legendgroup: "{name}",
   showlegend: false, hoverinfo: "skip", opacity: 0.15, line: {{ color: "{color}", width: 1 }} }},"#,
                y = serde_json::to_string(trace)?,
            );
        }
        let _ = write!(
            traces,
            r#"{{ x: {x}, y: {y}, mode: "lines+markers", type: "scatter", name: "{name}",
   legendgroup: "{name}", line: {{ color: "{color}", width: 2 }}, marker: {{ size: 4 }} }},"#,
            y = serde_json::to_string(&stats.mean)?,
        );
    }
    let title = format!("{} ({})", selection.value, selection.metric);
    let script = format!(
        r#"<script>
Plotly.newPlot("figure", [{traces}],
  {{ xaxis: {{ title: "Number of evaluations" }}, yaxis: {{ title: "{ytitle}" }},
     margin: {{ t: 10 }}, showlegend: true }},
  {{ responsive: true }});
</script>"#,
        ytitle = escape_js(&title),
    );
    Ok(html_page(&title, &script))
}

/// Contour figure of a function sampled on a grid, `values` rows following `ys`
pub fn contour_html(
    title: &str,
    xs: &Array1<f64>,
    ys: &Array1<f64>,
    values: &Array2<f64>,
) -> Result<String> {
    let z: Vec<Vec<f64>> = values.rows().into_iter().map(|r| r.to_vec()).collect();
    let script = format!(
        r#"<script>
Plotly.newPlot("figure", [{{
  x: {x}, y: {y}, z: {z}, type: "contour", colorscale: "Viridis",
  contours: {{ coloring: "heatmap", showlabels: true }}, colorbar: {{ title: "f" }}
}}], {{ xaxis: {{ title: "x1" }}, yaxis: {{ title: "x2", scaleanchor: "x" }},
       margin: {{ t: 10 }} }},
   {{ responsive: true }});
</script>"#,
        x = serde_json::to_string(&xs.to_vec())?,
        y = serde_json::to_string(&ys.to_vec())?,
        z = serde_json::to_string(&z)?,
    );
    Ok(html_page(&escape_js(title), &script))
}

/// Writes a figure, creating missing parent folders
pub fn save_html<P: AsRef<Path>>(path: P, html: &str) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ValueStats;
    use ndarray::array;
    use std::collections::BTreeMap;

    #[test]
    fn test_metric_comparison_html() {
        let mut values = BTreeMap::new();
        let mut per_value = BTreeMap::new();
        per_value.insert(
            "hv".to_string(),
            ValueStats {
                mean: vec![Some(0.5), None],
                traces: vec![vec![Some(0.4), None], vec![Some(0.6), None]],
                ..Default::default()
            },
        );
        values.insert("delta_hv".to_string(), per_value);
        let result = AggregatedResult {
            algorithm_name: "SBO(ei)".to_string(),
            n_repeat: 2,
            n_eval: vec![10., 11.],
            values,
        };
        let html =
            metric_comparison_html(&MetricSelection::new("delta_hv", "hv"), &[result]).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("name: \"SBO(ei)\""));
        assert!(html.contains("[0.5,null]"));
        assert!(html.contains("[10.0,11.0]"));
    }

    #[test]
    fn test_contour_html() {
        let html = contour_html(
            "Goldstein",
            &array![0., 100.],
            &array![0., 100.],
            &array![[1., 2.], [3., 4.]],
        )
        .unwrap();
        assert!(html.contains("type: \"contour\""));
        assert!(html.contains("[[1.0,2.0],[3.0,4.0]]"));
    }
}
