//! Ethereum ABI JSON → decoder schemas.
//!
//! Builds `EventSchema` / `FunctionSchema` values from a standard contract
//! ABI. Tuple parameters are rebuilt from their `components` into named
//! tuple descriptors, so nested field names survive into decoded rows.
//!
//! Unnamed parameters get positional names so every row column has one:
//! inputs become `_0`, `_1`, ...; outputs become `output_0`, ... and named
//! outputs are prefixed (`output_amount`) to keep them apart from inputs.

use alloy_json_abi::{Event, EventParam, Function, JsonAbi, Param};
use chainabi_core::{
    error::RegistryError, parse, EventField, EventSchema, Field, FunctionSchema, Schema,
};
use tracing::debug;

/// Schemas for every event and function in one ABI.
#[derive(Debug, Clone, Default)]
pub struct AbiSchemas {
    pub events: Vec<EventSchema>,
    pub functions: Vec<FunctionSchema>,
}

/// Wraps a parsed contract ABI and hands out decoder schemas by name.
#[derive(Debug, Clone)]
pub struct AbiTransformer {
    abi: JsonAbi,
}

impl AbiTransformer {
    /// Parse a standard Ethereum ABI JSON string.
    pub fn from_json(abi_json: &str) -> Result<Self, RegistryError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)?;
        debug!(
            functions = abi.functions().count(),
            events = abi.events().count(),
            "parsed ABI JSON"
        );
        Ok(Self { abi })
    }

    pub fn from_abi(abi: JsonAbi) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Build the schema of the single event called `name`.
    ///
    /// Zero matches is `NotFound`; overloads are `Ambiguous`.
    pub fn event(&self, name: &str) -> Result<EventSchema, RegistryError> {
        let candidates = self.abi.event(name).map(Vec::as_slice).unwrap_or_default();
        let event = exactly_one("event", name, candidates)?;
        transform_event(event)
    }

    /// Build the schema of the single function called `name`.
    pub fn function(&self, name: &str) -> Result<FunctionSchema, RegistryError> {
        let candidates = self.abi.function(name).map(Vec::as_slice).unwrap_or_default();
        let func = exactly_one("function", name, candidates)?;
        transform_function(func)
    }

    /// Build schemas for every event and function, overloads included.
    pub fn transform_all(&self) -> Result<AbiSchemas, RegistryError> {
        let events = self
            .abi
            .events()
            .map(transform_event)
            .collect::<Result<Vec<_>, _>>()?;
        let functions = self
            .abi
            .functions()
            .map(transform_function)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AbiSchemas { events, functions })
    }
}

fn exactly_one<'a, T>(
    kind: &'static str,
    name: &str,
    candidates: &'a [T],
) -> Result<&'a T, RegistryError> {
    match candidates {
        [one] => Ok(one),
        [] => Err(RegistryError::NotFound {
            kind,
            name: name.to_string(),
        }),
        many => Err(RegistryError::Ambiguous {
            kind,
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

fn transform_event(event: &Event) -> Result<EventSchema, RegistryError> {
    let fields = event
        .inputs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let ty = parse(&event_param_descriptor(p))?;
            Ok(EventField::new(input_name(&p.name, i), ty, p.indexed))
        })
        .collect::<Result<Vec<_>, RegistryError>>()?;
    Ok(EventSchema::new(event.name.clone(), fields, event.anonymous)?)
}

fn transform_function(func: &Function) -> Result<FunctionSchema, RegistryError> {
    let inputs = params_schema(&func.inputs, input_name)?;
    let outputs = params_schema(&func.outputs, output_name)?;
    Ok(FunctionSchema::new(func.name.clone(), inputs, outputs))
}

fn params_schema(
    params: &[Param],
    naming: fn(&str, usize) -> String,
) -> Result<Schema, RegistryError> {
    let fields = params
        .iter()
        .enumerate()
        .map(|(i, p)| Ok(Field::new(naming(&p.name, i), parse(&param_descriptor(p))?)))
        .collect::<Result<Vec<_>, RegistryError>>()?;
    Ok(Schema::new(fields)?)
}

fn input_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("_{index}")
    } else {
        name.to_string()
    }
}

fn output_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("output_{index}")
    } else {
        format!("output_{name}")
    }
}

/// Type descriptor of a parameter, expanding `tuple...` from components.
fn param_descriptor(p: &Param) -> String {
    descriptor(&p.ty, &p.components)
}

fn event_param_descriptor(p: &EventParam) -> String {
    descriptor(&p.ty, &p.components)
}

fn descriptor(ty: &str, components: &[Param]) -> String {
    match ty.strip_prefix("tuple") {
        // `tuple`, `tuple[]`, `tuple[2][]` ...
        Some(dims) if dims.is_empty() || dims.starts_with('[') => {
            let inner: Vec<String> = components
                .iter()
                .map(|c| {
                    let d = param_descriptor(c);
                    if c.name.is_empty() {
                        d
                    } else {
                        format!("{d} {}", c.name)
                    }
                })
                .collect();
            format!("({}){dims}", inner.join(","))
        }
        _ => ty.to_string(),
    }
}
