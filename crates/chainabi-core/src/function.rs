//! Function-call decoding: argument lists, return data and full calldata.

use crate::error::AbiError;
use crate::fingerprint;
use crate::schema::Schema;
use crate::value::DecodedRow;

/// Length of the selector prefix on calldata.
pub const SELECTOR_SIZE: usize = 4;

/// A function definition: inputs and outputs as schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSchema {
    name: String,
    inputs: Schema,
    outputs: Schema,
    signature: String,
    selector: [u8; SELECTOR_SIZE],
}

impl FunctionSchema {
    pub fn new(name: impl Into<String>, inputs: Schema, outputs: Schema) -> Self {
        let name = name.into();
        let signature = format!("{name}{}", inputs.canonical_params());
        let selector = fingerprint::selector(&signature);
        Self {
            name,
            inputs,
            outputs,
            signature,
            selector,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &Schema {
        &self.inputs
    }

    pub fn outputs(&self) -> &Schema {
        &self.outputs
    }

    /// Canonical signature over input types, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn selector(&self) -> [u8; SELECTOR_SIZE] {
        self.selector
    }

    /// Decode arguments with the selector already stripped.
    pub fn decode_input(&self, args: &[u8]) -> Result<DecodedRow, AbiError> {
        self.inputs.decode(args)
    }

    /// Decode return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<DecodedRow, AbiError> {
        self.outputs.decode(data)
    }

    /// Verify and strip the selector, then decode the arguments.
    pub fn decode_calldata(&self, calldata: &[u8]) -> Result<DecodedRow, AbiError> {
        if calldata.len() < SELECTOR_SIZE {
            return Err(AbiError::Truncated {
                offset: 0,
                needed: SELECTOR_SIZE,
                available: calldata.len(),
            });
        }
        let (selector, args) = calldata.split_at(SELECTOR_SIZE);
        if selector != &self.selector[..] {
            return Err(AbiError::mismatch(format!(
                "selector 0x{} does not match {} (0x{})",
                hex::encode(selector),
                self.signature,
                hex::encode(self.selector)
            )));
        }
        self.decode_input(args)
    }
}
