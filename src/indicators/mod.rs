pub mod registry;

pub use registry::{Calculation, Catalog, Category, ChartShape, Frequency, IndicatorDescriptor};
