//! Renderer statistics.

/// What one `execute_commands` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteReport {
    /// Frame index that was executed.
    pub frame: u64,
    /// Commands replayed against the backend.
    pub commands_executed: u32,
    /// Commands dropped by a resources-only execute.
    pub commands_skipped: u32,
    /// Deferred cleanups that ran after the replay.
    pub cleanups_run: u32,
}

/// Totals accumulated over the renderer's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RendererStats {
    /// Frames executed.
    pub frames_executed: u64,
    /// Commands replayed.
    pub commands_executed: u64,
    /// Commands skipped by resources-only executes.
    pub commands_skipped: u64,
    /// Cleanups run.
    pub cleanups_run: u64,
    /// Largest single-frame command count.
    pub peak_commands_per_frame: u32,
}

impl RendererStats {
    /// Folds one frame's report into the totals.
    pub fn record(&mut self, report: &ExecuteReport) {
        let frame_commands = report.commands_executed + report.commands_skipped;

        self.frames_executed += 1;
        self.commands_executed += u64::from(report.commands_executed);
        self.commands_skipped += u64::from(report.commands_skipped);
        self.cleanups_run += u64::from(report.cleanups_run);
        self.peak_commands_per_frame = self.peak_commands_per_frame.max(frame_commands);
    }

    /// Average commands replayed per frame.
    #[must_use]
    pub fn avg_commands_per_frame(&self) -> f64 {
        if self.frames_executed > 0 {
            self.commands_executed as f64 / self.frames_executed as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut stats = RendererStats::default();
        stats.record(&ExecuteReport {
            frame: 0,
            commands_executed: 10,
            commands_skipped: 0,
            cleanups_run: 1,
        });
        stats.record(&ExecuteReport {
            frame: 1,
            commands_executed: 4,
            commands_skipped: 8,
            cleanups_run: 0,
        });

        assert_eq!(stats.frames_executed, 2);
        assert_eq!(stats.commands_executed, 14);
        assert_eq!(stats.commands_skipped, 8);
        assert_eq!(stats.cleanups_run, 1);
        assert_eq!(stats.peak_commands_per_frame, 12);
        assert!((stats.avg_commands_per_frame() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_average() {
        assert!(RendererStats::default().avg_commands_per_frame().abs() < f64::EPSILON);
    }
}
