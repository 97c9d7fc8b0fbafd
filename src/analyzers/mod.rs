/// Analyzer forms: local input state for the three backend analyses.
///
/// Each form owns its parameters and its own error line; the orchestrator
/// mounts exactly one of them at a time.

pub mod anomaly;
pub mod benford;
pub mod correlation;

use anomaly::AnomalyForm;
use benford::BenfordForm;
use correlation::CorrelationForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerKind {
    Correlation,
    Benford,
    Anomaly,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 3] = [Self::Correlation, Self::Benford, Self::Anomaly];

    pub fn title(self) -> &'static str {
        match self {
            Self::Correlation => "Correlation analysis",
            Self::Benford => "Benford analysis",
            Self::Anomaly => "Anomaly detection",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Correlation => "Detect and remove strongly correlated columns",
            Self::Benford => "Check the distribution of leading digits",
            Self::Anomaly => "Find outlying values",
        }
    }
}

/// The form currently shown in the parameters panel.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerPanel {
    Correlation(CorrelationForm),
    Benford(BenfordForm),
    Anomaly(AnomalyForm),
}

impl AnalyzerPanel {
    /// Fresh form for `kind`; `columns` seeds the Benford column choice.
    pub fn mount(kind: AnalyzerKind, columns: &[String]) -> Self {
        match kind {
            AnalyzerKind::Correlation => Self::Correlation(CorrelationForm::default()),
            AnalyzerKind::Benford => Self::Benford(BenfordForm::new(columns)),
            AnalyzerKind::Anomaly => Self::Anomaly(AnomalyForm::default()),
        }
    }

    pub fn kind(&self) -> AnalyzerKind {
        match self {
            Self::Correlation(_) => AnalyzerKind::Correlation,
            Self::Benford(_) => AnalyzerKind::Benford,
            Self::Anomaly(_) => AnalyzerKind::Anomaly,
        }
    }
}
