pub mod admin_gate;
pub mod config;
pub mod domain;
pub mod registry;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod views;
