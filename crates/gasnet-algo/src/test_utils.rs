//! Small fixture networks shared by unit and integration tests.

use gasnet_core::{Network, Point, Segment};

/// One receipt feeding one delivery over a single segment.
pub fn single_chain_network() -> Network {
    let mut network = Network::new("single-chain", "one receipt, one delivery");
    network.add_point(
        Point::receipt("R1", "Field R1", 1000.0, 0.05).with_pressure_window(800.0, 1000.0),
    );
    network.add_point(
        Point::delivery("D1", "City Gate D1", 600.0).with_pressure_window(300.0, 800.0),
    );
    network.add_segment(
        Segment::new("S1", "R1-D1", "R1", "D1", 800.0)
            .with_geometry(50.0, 36.0, 0.015)
            .with_cost(0.10),
    );
    network.recompute_drop_constants();
    network
}

/// A receipt feeding two deliveries through one compressor station.
///
/// The classic three-segment star: R1 (1000 MMscfd supply) into C1, C1 out
/// to D1 (600) and D2 (400). Trunk capacity 1200 leaves headroom; the D1 leg
/// is exactly demand-sized, so scaled-up demand makes it the binding cut.
pub fn compressor_star_network() -> Network {
    let mut network = Network::new("compressor-star", "one trunk, two delivery legs");
    network.add_point(
        Point::receipt("R1", "Field R1", 1000.0, 0.05).with_pressure_window(800.0, 1000.0),
    );
    network.add_point(
        Point::compressor("C1", "Station C1", 400.0, 0.02).with_pressure_window(300.0, 1200.0),
    );
    network.add_point(
        Point::delivery("D1", "City Gate D1", 600.0).with_pressure_window(300.0, 800.0),
    );
    network.add_point(
        Point::delivery("D2", "Industrial D2", 400.0).with_pressure_window(300.0, 800.0),
    );
    network.add_segment(
        Segment::new("S1", "R1-C1", "R1", "C1", 1200.0)
            .with_geometry(50.0, 36.0, 0.015)
            .with_cost(0.10),
    );
    network.add_segment(
        Segment::new("S2", "C1-D1", "C1", "D1", 600.0)
            .with_geometry(30.0, 24.0, 0.018)
            .with_cost(0.12),
    );
    network.add_segment(
        Segment::new("S3", "C1-D2", "C1", "D2", 500.0)
            .with_geometry(40.0, 20.0, 0.020)
            .with_cost(0.15),
    );
    network.recompute_drop_constants();
    network
}
