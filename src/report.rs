use std::io::{self, Write};

use tabled::{Style, Table, Tabled};

use crate::search::{SearchRequest, SearchResult};

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "Parameter")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
}

#[derive(Tabled)]
struct CurveRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "beta")]
    beta: String,
    #[tabled(rename = "Q (m3/s)")]
    flow: String,
    #[tabled(rename = "")]
    mark: &'static str,
}

fn parameter_rows(request: &SearchRequest) -> Vec<ParameterRow> {
    let p = &request.parameters;
    let row = |name, value: f64, unit| ParameterRow {
        name,
        value: value.to_string(),
        unit,
    };
    vec![
        row("Pipe diameter (D)", p.pipe_diameter, "m"),
        row("Discharge coefficient (C)", p.discharge_coefficient, "-"),
        row("Pressure differential (dP)", p.pressure_differential, "Pa"),
        row("Fluid density (rho)", p.fluid_density, "kg/m3"),
        row("Desired flow (Q)", request.desired_flow, "m3/s"),
        row("Tolerance", request.tolerance, "m3/s"),
    ]
}

/// Parameters table followed by the outcome of the search.
pub fn render_summary(request: &SearchRequest, result: &SearchResult) -> String {
    let mut out = String::from("Parameters:\n");
    out.push_str(
        &Table::new(parameter_rows(request))
            .with(Style::modern())
            .to_string(),
    );
    out.push_str("\n\nResult:\n");

    match (result.optimal_beta, result.optimal_flow()) {
        (Some(beta), Some(q)) => {
            out.push_str(&format!("- optimal beta: {beta:.4} (Q = {q:.6e} m3/s)\n"));
        }
        _ => {
            out.push_str("- no beta meets the requested tolerance.\n");
            out.push_str("  Relax the tolerance or review the input parameters.\n");
            if let Some((beta, q)) = result.closest(request.desired_flow) {
                out.push_str(&format!(
                    "- closest sample: beta = {beta:.4}, Q = {q:.6e} m3/s (off by {:.3e})\n",
                    (q - request.desired_flow).abs()
                ));
            }
            if let Some((lo, hi)) = result.flow_span() {
                out.push_str(&format!(
                    "- attainable flow over beta {}: {lo:.6e} to {hi:.6e} m3/s\n",
                    request.beta_range
                ));
            }
        }
    }

    let anomalies = result.anomaly_count();
    if anomalies > 0 {
        out.push_str(&format!(
            "- warning: {anomalies} of {} samples produced a non-finite flow\n",
            result.sampled_flows.len()
        ));
    }

    out
}

/// Decimated view of the curve with roughly `rows` lines, always including
/// both ends and the optimal sample.
pub fn render_curve(result: &SearchResult, rows: usize) -> String {
    let len = result.sampled_betas.len();
    if len == 0 {
        return String::new();
    }

    let stride = (len / rows.max(1)).max(1);
    let optimal = result.optimal_index();
    let table_rows: Vec<CurveRow> = result
        .points()
        .enumerate()
        .filter(|(i, _)| i % stride == 0 || *i == len - 1 || Some(*i) == optimal)
        .map(|(index, (beta, q))| CurveRow {
            index,
            beta: format!("{beta:.4}"),
            flow: format!("{q:.6e}"),
            mark: if Some(index) == optimal { "<- optimal" } else { "" },
        })
        .collect();

    Table::new(table_rows).with(Style::modern()).to_string()
}

/// Writes the curve as CSV with the desired flow repeated as a reference column.
pub fn write_curve_csv<W: Write>(
    mut writer: W,
    request: &SearchRequest,
    result: &SearchResult,
) -> io::Result<()> {
    writeln!(writer, "beta,flow,desired_flow")?;
    for (beta, q) in result.points() {
        writeln!(writer, "{beta},{q},{}", request.desired_flow)?;
    }
    writer.flush()
}
