use std::env;
use std::error::Error;
use std::path::Path;

use sim_lib::cpu::CorePolicy;
use sim_lib::output::format_float;
use sim_lib::run_wrapper;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let io_dir = args.next().ok_or("You should specify exactly one IO directory")?;

    let mut policy = CorePolicy::default();
    for arg in args {
        match arg.as_str() {
            "-v" => policy.verbose = true,
            _ => return Err(format!("Unknown parameter: {}", arg).into()),
        }
    }

    println!("IO Directory: {}", io_dir);
    let stats = run_wrapper::run(Path::new(&io_dir), policy)?;

    println!("Single Stage Core Performance Metrics: ");
    println!(
        "Number of Cycles taken: {}, Total Number of Instructions: {}, CPI: {}",
        stats.single.cycle_count,
        stats.single.inst_count,
        format_float(stats.single.cpi(), 16),
    );
    println!();
    println!("Five Stage Core Performance Metrics: ");
    println!(
        "Number of Cycles taken: {}, Total Number of Instructions: {}, CPI: {}",
        stats.five.cycle_count,
        stats.five.inst_count,
        format_float(stats.five.cpi(), 16),
    );

    Ok(())
}
