// =============================================================================
// Market Data — loading bar series from files
// =============================================================================

pub mod csv_loader;

pub use csv_loader::{load_csv, read_csv};
