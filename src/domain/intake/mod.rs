//! Intake - the assessment session aggregate and its reports.

mod errors;
mod report;
mod session;
mod stage;

pub use errors::IntakeError;
pub use report::{
    ClinicianReport, DemographicItem, DomainSummary, FinalReport, PatientReport, ReportBuilder,
    ReportError,
};
pub use session::{AssessmentSession, RaisedAlert, StageOutcome, StageProgress};
pub use stage::IntakeStage;
