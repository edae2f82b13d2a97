use std::path::Path;
use std::process;

use sim_lib::cpu::CorePolicy;
use sim_lib::error::SimulatorResult;
use sim_lib::run_wrapper::run;
use sim_lib::run_wrapper::RunStats;

fn main() {
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval() -> SimulatorResult<()> {
    let output_path = "eval/sim_eval.csv".to_string();
    let mut writer = csv::Writer::from_path(&output_path).map_err(|e| {
        sim_lib::error::SimulatorError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create CSV file '{}': {}", output_path, e),
        ))
    })?;

    writer
        .write_record([
            "Program",
            "SS cycles",
            "SS CPI",
            "FS cycles",
            "FS CPI",
            "FS stalls",
            "FS flushes",
        ])
        .map_err(|e| {
            sim_lib::error::SimulatorError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to write header to CSV: {}", e),
            ))
        })?;

    let programs = vec![
        "arithmetic",
        "hazard-chain",
        "load-use",
        "branch-taken",
        "loop-sum",
        "memcopy",
    ];

    let mut results: Vec<(String, RunStats)> = Vec::new();
    for program in programs {
        let program_dir = format!("testcases/{}", program);
        eprintln!("Running program: {}", program_dir);

        match run(Path::new(&program_dir), CorePolicy::default()) {
            Ok(stats) => {
                writer
                    .write_record([
                        program,
                        &stats.single.cycle_count.to_string(),
                        &format!("{:.3}", stats.single.cpi()),
                        &stats.five.cycle_count.to_string(),
                        &format!("{:.3}", stats.five.cpi()),
                        &stats.five.stall_count.to_string(),
                        &stats.five.flush_count.to_string(),
                    ])
                    .map_err(|e| {
                        sim_lib::error::SimulatorError::IoError(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            format!("Failed to write record to CSV: {}", e),
                        ))
                    })?;
                results.push((program.to_string(), stats));
            }
            Err(e) => {
                eprintln!("Warning: Failed to run program '{}': {}", program, e);
                writer
                    .write_record([program, "Error", "Error", "Error", "Error", "Error", "Error"])
                    .map_err(|e| {
                        sim_lib::error::SimulatorError::IoError(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            format!("Failed to write record to CSV: {}", e),
                        ))
                    })?;
            }
        }
    }

    plot_cpi(&results)
}

/// Plots single-cycle vs five-stage CPI per program
fn plot_cpi(results: &[(String, RunStats)]) -> SimulatorResult<()> {
    use plotters::prelude::*;

    if results.is_empty() {
        return Ok(());
    }

    let y_max = results
        .iter()
        .map(|(_, stats)| stats.single.cpi().max(stats.five.cpi()))
        .fold(0.0f64, f64::max);

    let output_path = "eval/cpi_eval.svg";
    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).unwrap();

    let mut ctx = ChartBuilder::on(&root)
        .caption("CPI: single-cycle vs five-stage", ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..results.len() as i32 - 1, 0.0..y_max * 1.1)
        .unwrap();
    ctx.configure_mesh().x_desc("Program").y_desc("CPI").draw().unwrap();

    let series: [(&str, fn(&RunStats) -> f64); 2] = [
        ("Single-cycle", |stats| stats.single.cpi()),
        ("Five-stage", |stats| stats.five.cpi()),
    ];
    for (i, (label, f)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let points =
            results.iter().enumerate().map(|(x, (_, stats))| (x as i32, f(stats)));
        ctx.draw_series(LineSeries::new(points, color))
            .unwrap()
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .unwrap();

    Ok(())
}
