//! Backup domain model

pub mod artifact;
pub mod provenance;

pub use artifact::{
    ArtifactName, ArtifactNameError, BackupArtifact, ARTIFACT_PREFIX, DESCRIPTOR_EXTENSION,
    STAGING_SUFFIX,
};
pub use provenance::{ProvenanceRecord, StoreIdentity, TriggerKind};
