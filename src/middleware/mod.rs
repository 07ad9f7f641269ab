/// Middleware module

mod metrics;

pub use metrics::{AppMetrics, MetricsMiddleware};
