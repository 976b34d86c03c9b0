//! Domain layer - business logic and services

pub mod events;
pub mod policy;
pub mod repository;
pub mod service;
pub mod signature;
pub mod validation;

pub use events::{AuditRecord, EventPublisher, NoOpEventPublisher, TracingEventPublisher, WorkflowEvent};
pub use policy::{Action, CaseAccess};
pub use repository::{
    DirectoryRepository, DokumenRepository, EditRequestRepository, KasusRepository, PemegangRepository,
    PermohonanRepository, Repositories, StatusChange, StoreError, StoreResult,
};
pub use service::Service;
pub use signature::{ImageFormat, ImageStore, SignatureDecodeError, SignatureImage};
