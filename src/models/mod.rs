pub mod analysis;
pub mod config;
pub mod job;

pub use analysis::{
    AnalysisInput, AnalysisReport, AnalyzeRequest, Explanation, FilePayload, ScoringRequest,
    ScoringResponse, UploadedFile,
};
pub use config::{ExtractionConfig, PollConfig, ProxyConfig, ScoringConfig, WorkflowConfig};
pub use job::{JobHandle, JobOutcome, JobRequest, JobState, JobStatus};
