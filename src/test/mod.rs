mod aggregator;
mod cell_grid;
mod metrics;
mod policy;
mod traffic_plan;
