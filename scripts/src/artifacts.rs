//! Loading of compiled contract artifacts
//!
//! Both Truffle (`"bytecode": "0x..."`) and Foundry
//! (`"bytecode": { "object": "0x..." }`) artifact layouts are understood.

use std::{collections::HashMap, fs, path::Path, str::FromStr};

use alloy_primitives::Bytes;
use serde::Deserialize;

use crate::{
    constants::{ARTIFACT_BYTECODE_KEY, ARTIFACT_EXTENSION},
    errors::ScriptError,
};

/// The creation bytecode of the contracts a run deploys
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    /// Creation bytecode by contract name
    bytecodes: HashMap<String, Bytes>,
}

impl Artifacts {
    /// Load the artifact `<dir>/<name>.json` of every named contract
    pub fn load<'a>(
        dir: &Path,
        contract_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ScriptError> {
        let mut bytecodes = HashMap::new();
        for name in contract_names {
            let path = dir.join(name).with_extension(ARTIFACT_EXTENSION);
            let contents = fs::read_to_string(&path).map_err(|e| {
                ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e))
            })?;
            let bytecode = parse_bytecode(&contents).map_err(|e| {
                ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e))
            })?;
            bytecodes.insert(name.to_string(), bytecode);
        }

        Ok(Self { bytecodes })
    }

    /// Build the artifacts from already known bytecode
    pub fn from_bytecodes(bytecodes: impl IntoIterator<Item = (String, Bytes)>) -> Self {
        Self {
            bytecodes: bytecodes.into_iter().collect(),
        }
    }

    /// Get the creation bytecode of a contract
    pub fn bytecode(&self, contract_name: &str) -> Option<&Bytes> {
        self.bytecodes.get(contract_name)
    }
}

/// The part of a compiled artifact the scripts read
#[derive(Deserialize)]
struct ArtifactFile {
    /// The creation bytecode, in either layout
    bytecode: Option<BytecodeField>,
}

/// The creation bytecode field of an artifact
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// Truffle stores the hex string directly
    Hex(String),
    /// Foundry nests it under `object`
    Object {
        /// The hex string
        object: String,
    },
}

/// Extract the creation bytecode from the JSON contents of an artifact
pub fn parse_bytecode(contents: &str) -> Result<Bytes, String> {
    let artifact: ArtifactFile = serde_json::from_str(contents).map_err(|e| e.to_string())?;

    let bytecode = match artifact.bytecode {
        Some(BytecodeField::Hex(s)) | Some(BytecodeField::Object { object: s }) => s,
        None => return Err(format!("artifact has no `{ARTIFACT_BYTECODE_KEY}`")),
    };

    // Truffle leaves `__Library__` placeholders in unlinked bytecode
    if bytecode.contains("__") {
        return Err("bytecode has unlinked library references".to_string());
    }

    let bytecode = Bytes::from_str(&bytecode).map_err(|e| e.to_string())?;
    if bytecode.is_empty() {
        return Err("bytecode is empty, is the contract abstract?".to_string());
    }

    Ok(bytecode)
}
