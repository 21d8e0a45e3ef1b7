use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for per-frame pipeline events.
///
/// Sessions report through this instead of writing to a sink directly, so
/// the CLI can aggregate timings while tests stay silent.
pub trait PipelineLogger: Send {
    /// A frame finished processing with `faces` reported faces.
    fn frame_done(&mut self, index: usize, faces: usize);

    /// How long a named stage (`capture`, `analyze`, `present`) took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time measurement.
    fn metric(&mut self, name: &str, value: f64);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame_done(&mut self, _index: usize, _faces: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
}

/// Aggregates stage timings and metrics and reports them through `log`.
///
/// A progress line is logged every `throttle_frames` frames.
pub struct StatsPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Vec<f64>>,
    metrics: BTreeMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
    faces: usize,
}

impl StatsPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            frames: 0,
            faces: 0,
        }
    }

    /// Returns the formatted summary, or `None` if no frame was processed.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Session summary ({} frames, {} faces, {:.1}s):",
            self.frames,
            self.faces,
            elapsed_ms / 1000.0
        )];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  max {max_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        for (name, values) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1}", mean(values)));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Default for StatsPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StatsPipelineLogger {
    fn frame_done(&mut self, index: usize, faces: usize) {
        self.frames += 1;
        self.faces += faces;
        self.metric("faces", faces as f64);
        if self.frames % self.throttle_frames == 0 {
            log::info!("Processed {} frames (last: #{index}, {faces} faces)", self.frames);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.frame_done(0, 1);
        logger.timing("analyze", 5.0);
        logger.metric("faces", 3.0);
        logger.summary();
    }

    #[test]
    fn test_timing_records_values_per_stage() {
        let mut logger = StatsPipelineLogger::new(10);
        logger.timing("analyze", 20.0);
        logger.timing("analyze", 30.0);
        logger.timing("present", 5.0);

        assert_eq!(logger.timings_for("analyze").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("present").unwrap(), &[5.0]);
        assert!(logger.timings_for("capture").is_none());
    }

    #[test]
    fn test_frame_done_counts_frames_and_faces() {
        let mut logger = StatsPipelineLogger::new(10);
        logger.frame_done(0, 2);
        logger.frame_done(1, 0);
        logger.frame_done(2, 1);

        assert_eq!(logger.frames(), 3);
        let faces = logger.metrics_for("faces").unwrap();
        assert_relative_eq!(mean(faces), 1.0);
    }

    #[test]
    fn test_summary_includes_stages_and_metrics() {
        let mut logger = StatsPipelineLogger::new(10);
        logger.frame_done(0, 3);
        logger.frame_done(1, 4);
        logger.timing("analyze", 20.0);
        logger.timing("capture", 1.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (2 frames, 7 faces"));
        assert!(summary.contains("analyze"));
        assert!(summary.contains("capture"));
        assert!(summary.contains("faces: avg 3.5"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StatsPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_throttle_is_at_least_one() {
        let logger = StatsPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
        assert_eq!(StatsPipelineLogger::default().throttle_frames, 30);
    }
}
