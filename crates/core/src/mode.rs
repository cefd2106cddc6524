// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Where a command invocation executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Direct subprocess of the calling process.
    #[default]
    Local,
    /// Inside a provisioned sandbox session.
    Sandbox,
}

crate::simple_display! {
    ExecMode {
        Local => "local",
        Sandbox => "sandbox",
    }
}

impl FromStr for ExecMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ExecMode::Local),
            "sandbox" => Ok(ExecMode::Sandbox),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}
