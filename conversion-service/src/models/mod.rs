pub mod job;

pub use job::{ConversionJob, JobStatus, Upload};
