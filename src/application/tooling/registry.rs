use crate::types::{Tool, ToolSpec};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Tools discovered at startup, converted once into request-side specs.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Tool>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(tools.len());
        for tool in tools {
            if seen.insert(tool.name.clone()) {
                kept.push(tool);
            } else {
                warn!(tool = %tool.name, "Ignoring duplicate tool descriptor");
            }
        }

        let specs = kept.iter().map(to_spec).collect();
        Self { tools: kept, specs }
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn to_spec(tool: &Tool) -> ToolSpec {
    let parameters = match &tool.input_schema {
        Value::Object(map) if !map.is_empty() => tool.input_schema.clone(),
        _ => ToolSpec::empty_parameters(),
    };
    ToolSpec {
        name: tool.name.clone(),
        description: tool
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
        parameters,
    }
}
