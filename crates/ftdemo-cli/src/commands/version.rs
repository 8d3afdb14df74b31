//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - five-qubit fault-tolerance demonstration",
        style("ftdemo").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  ftdemo-catalog   Experiment catalog and circuit generation");
    println!("  ftdemo-hal       Backend abstraction and job results");
    println!("  ftdemo-sched     Result handling and on-disk layout");
    println!("  ftdemo-analysis  Decoding, statistics and plots");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
