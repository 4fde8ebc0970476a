//! The annotated output document.
//!
//! Shape: `{ "Threads": [ { "Name", "ManagedFrames": [...], "NativeFrames":
//! [...] } ] }`, threads and frames in original report order. A resolved
//! managed frame carries its identity (plus file and line when a sequence
//! point matched); an unresolved one carries the raw key fields it was
//! parsed from, so nothing is silently dropped.

use serde::Serialize;

use super::frames::{ManagedFrame, NativeFrame};
use super::request::SymbolicationRequest;

#[derive(Debug, Serialize)]
pub struct OutputDocument {
    #[serde(rename = "Threads")]
    pub threads: Vec<OutputThread>,
}

#[derive(Debug, Serialize)]
pub struct OutputThread {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ManagedFrames")]
    pub managed_frames: Vec<OutputManagedFrame>,
    #[serde(rename = "NativeFrames")]
    pub native_frames: Vec<OutputNativeFrame>,
}

#[derive(Debug, Serialize)]
pub struct OutputManagedFrame {
    #[serde(rename = "Assembly", skip_serializing_if = "Option::is_none")]
    pub assembly: Option<String>,
    #[serde(rename = "Class", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(rename = "Function", skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(rename = "File", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(rename = "Line", skip_serializing_if = "Option::is_none")]
    pub line: Option<i32>,

    #[serde(rename = "Mvid", skip_serializing_if = "Option::is_none")]
    pub mvid: Option<String>,
    #[serde(rename = "Token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "IlOffset", skip_serializing_if = "Option::is_none")]
    pub il_offset: Option<String>,
}

impl From<&ManagedFrame> for OutputManagedFrame {
    fn from(frame: &ManagedFrame) -> Self {
        if frame.is_resolved() {
            Self {
                assembly: frame.assembly.clone(),
                class: frame.class.clone(),
                function: frame.function.clone(),
                file: frame.source_file.clone(),
                line: frame.start_line,
                mvid: None,
                token: None,
                il_offset: None,
            }
        } else {
            Self {
                assembly: None,
                class: None,
                function: None,
                file: None,
                line: None,
                mvid: Some(frame.mvid.clone()),
                token: Some(format!("0x{:x}", frame.token)),
                il_offset: Some(format!("0x{:x}", frame.il_offset)),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutputNativeFrame {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Address", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&NativeFrame> for OutputNativeFrame {
    fn from(frame: &NativeFrame) -> Self {
        match &frame.name {
            Some(name) => Self { name: Some(name.clone()), address: None },
            None => Self { name: None, address: Some(frame.address.clone()) },
        }
    }
}

impl SymbolicationRequest {
    /// Render the request, resolved or not, as the output document.
    #[must_use]
    pub fn to_output(&self) -> OutputDocument {
        OutputDocument {
            threads: self
                .threads
                .iter()
                .map(|thread| OutputThread {
                    name: thread.name.clone(),
                    managed_frames: thread.managed.iter().map(Into::into).collect(),
                    native_frames: thread.native.iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}
