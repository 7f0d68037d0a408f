pub mod automations;

pub use automations::{
    AutomationListItem, AutomationService, AutomationView, LogSummaryView, WorkflowSubmission,
};
