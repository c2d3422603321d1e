pub mod export_stripper;
pub mod reference_marker;
pub mod static_props_wrapper;
pub mod sweeper;
