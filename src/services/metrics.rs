//! Job transition latency histograms

use prometheus::{HistogramOpts, HistogramVec, Registry};

use crate::models::{JobStatus, Log};

const LABELS: [&str; 3] = ["chain_uuid", "prev_status", "status"];

#[derive(Clone)]
pub struct JobMetrics {
    /// Time between two consecutive lifecycle logs, in seconds
    pub jobs_latency: HistogramVec,
    /// Same measure for transitions into MINED
    pub mined_latency: HistogramVec,
}

impl JobMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let jobs_latency = HistogramVec::new(
            HistogramOpts::new(
                "orchestrate_jobs_latency_seconds",
                "Latency between consecutive job status changes",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &LABELS,
        )?;
        registry.register(Box::new(jobs_latency.clone()))?;

        let mined_latency = HistogramVec::new(
            HistogramOpts::new(
                "orchestrate_jobs_mined_latency_seconds",
                "Latency between a job being pending and mined",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
            &LABELS,
        )?;
        registry.register(Box::new(mined_latency.clone()))?;

        Ok(Self {
            jobs_latency,
            mined_latency,
        })
    }

    /// Record the latency from `previous` to `current` for a job of `chain_uuid`
    pub fn observe_transition(&self, chain_uuid: &str, previous: &Log, current: &Log) {
        let histogram = if current.status == JobStatus::Mined {
            &self.mined_latency
        } else {
            &self.jobs_latency
        };

        let elapsed = current.created_at - previous.created_at;
        let seconds = elapsed.num_milliseconds().max(0) as f64 / 1000.0;

        histogram
            .with_label_values(&[chain_uuid, previous.status.as_str(), current.status.as_str()])
            .observe(seconds);
    }
}
