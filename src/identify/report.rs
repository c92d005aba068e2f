use super::matcher::{SystemMatch, WindowOutcome};

// ---------------------------------------------------------------------------
// Diagnostic narration of a match run
// ---------------------------------------------------------------------------

/// Receives progress events from the window matcher.
///
/// The matcher itself is pure; whatever gets printed or collected happens
/// here. Every method has an empty default.
pub trait MatchReporter {
    fn system_started(&mut self, _system: &str, _offset: f64) {}

    /// `ordinal` counts satisfied windows, starting at 1.
    fn window_matched(&mut self, _ordinal: usize, _outcome: &WindowOutcome) {}

    fn system_finished(&mut self, _result: &SystemMatch) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl MatchReporter for Silent {}

/// Narrates the run through the `log` facade at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl MatchReporter for LogReporter {
    fn system_started(&mut self, system: &str, offset: f64) {
        log::info!("Identifying system {system:?} with offset {offset}");
    }

    fn window_matched(&mut self, ordinal: usize, outcome: &WindowOutcome) {
        let peaks: Vec<f64> = outcome.peaks.iter().map(|m| m.wavelength).collect();
        log::info!(
            "{ordinal}: lambda {} found {} times, I_max={} at lambda_max={peaks:?}",
            outcome.reference,
            outcome.candidates,
            outcome.max_intensity,
        );
    }

    fn system_finished(&mut self, result: &SystemMatch) {
        log::info!(
            "Total: {}/{} lines found for {:?}",
            result.match_count(),
            result.reference_count(),
            result.system_name()
        );
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub events: Vec<ReportEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Started { system: String, offset: f64 },
    Window { ordinal: usize, reference: f64, candidates: usize },
    Finished { system: String, match_count: usize },
}

impl MatchReporter for Recorder {
    fn system_started(&mut self, system: &str, offset: f64) {
        self.events.push(ReportEvent::Started {
            system: system.to_string(),
            offset,
        });
    }

    fn window_matched(&mut self, ordinal: usize, outcome: &WindowOutcome) {
        self.events.push(ReportEvent::Window {
            ordinal,
            reference: outcome.reference,
            candidates: outcome.candidates,
        });
    }

    fn system_finished(&mut self, result: &SystemMatch) {
        self.events.push(ReportEvent::Finished {
            system: result.system_name().to_string(),
            match_count: result.match_count(),
        });
    }
}
