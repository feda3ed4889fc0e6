pub mod detectors;
