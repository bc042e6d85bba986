use anyhow::Result;
use gasnet_algo::trace_required_flows;

use super::load_checked;

pub fn handle(config: &str) -> Result<()> {
    let network = load_checked(config)?;
    let report = trace_required_flows(&network);

    println!("{:<12} {:>14} {:>14} {:>10}", "segment", "required", "capacity", "util");
    for (segment_id, required) in &report.segment_required {
        let capacity = network
            .segment(segment_id)
            .map(|s| s.capacity.value())
            .unwrap_or(0.0);
        println!(
            "{:<12} {:>14.2} {:>14.2} {:>9.1}%",
            segment_id.as_str(),
            required,
            capacity,
            if capacity > 0.0 { required / capacity * 100.0 } else { 0.0 }
        );
    }
    for violation in &report.violations {
        println!("violation: {}", violation);
    }
    println!(
        "network is {} by upstream trace",
        if report.is_network_feasible { "feasible" } else { "infeasible" }
    );
    Ok(())
}
