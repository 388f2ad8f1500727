//! Section agents and the supervisor that sequences them.
//!
//! Every section of a quotation document (header, company info, project
//! info, footer) is produced by a small agent implementing [`SectionAgent`]:
//! a mapping in, a structured section out. The [`supervisor`] runs the
//! agents in a fixed order against a shared `QuotationState`, timing each
//! step and recording per-step outcomes in an append-only execution log.
//!
//! # Failure model
//!
//! A failing agent never aborts the pipeline. Its step is logged with the
//! error string and the sequence continues, so a quotation can come out
//! partially populated (at-most-partial-completion, no rollback). The
//! supervisor reports `Failed` overall when any step failed.

pub mod agent;
pub mod company;
pub mod footer;
pub mod header;
pub mod project;
pub mod supervisor;

pub use agent::{AgentKind, AgentRegistry, SectionAgent};
pub use supervisor::{build_registry, QuotationSupervisor};
