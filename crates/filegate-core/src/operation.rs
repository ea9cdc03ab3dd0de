//! Logical backend operations.
//!
//! Every RPC the gateway issues is addressed by one of these names. The route registry
//! turns an [`Operation`] into a queue address and a reply timeout.

use std::fmt;

/// Backend service namespace an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Files,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Info,
    Get,
    Download,
    Upload,
    Update,
    Access,
    Remove,
    Finish,
    Process,
    /// Quota bookkeeping on the users service.
    UpdateMetadata,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::List,
        Operation::Info,
        Operation::Get,
        Operation::Download,
        Operation::Upload,
        Operation::Update,
        Operation::Access,
        Operation::Remove,
        Operation::Finish,
        Operation::Process,
        Operation::UpdateMetadata,
    ];

    /// Logical name; also the default queue postfix.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Info => "info",
            Operation::Get => "get",
            Operation::Download => "download",
            Operation::Upload => "upload",
            Operation::Update => "update",
            Operation::Access => "access",
            Operation::Remove => "remove",
            Operation::Finish => "finish",
            Operation::Process => "process",
            Operation::UpdateMetadata => "updateMetadata",
        }
    }

    pub fn service(&self) -> Service {
        match self {
            Operation::UpdateMetadata => Service::Users,
            _ => Service::Files,
        }
    }

    /// Suffix used for per-operation environment overrides, e.g. `UPDATE_METADATA`.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Operation::List => "LIST",
            Operation::Info => "INFO",
            Operation::Get => "GET",
            Operation::Download => "DOWNLOAD",
            Operation::Upload => "UPLOAD",
            Operation::Update => "UPDATE",
            Operation::Access => "ACCESS",
            Operation::Remove => "REMOVE",
            Operation::Finish => "FINISH",
            Operation::Process => "PROCESS",
            Operation::UpdateMetadata => "UPDATE_METADATA",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
