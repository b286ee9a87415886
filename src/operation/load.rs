use super::builder::{EndpointBuilder, OperationBuilder};
use super::types::{
    ContextTypeRef, DeclaredType, OperationDescriptor, ParameterDescriptor, ParameterKind,
    ParameterName,
};
use anyhow::Context;
use http::Method;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Serialization format of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Toml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from the file extension; anything unrecognised is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => ManifestFormat::Yaml,
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub endpoints: Vec<EndpointManifest>,
}

/// An enclosing resource and its operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointManifest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub operations: Vec<OperationManifest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationManifest {
    pub handler: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterManifest>,
}

/// One parameter entry. `type` defaults to `string`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterManifest {
    pub kind: ParameterKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub declared_type: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl ParameterManifest {
    fn to_descriptor(&self) -> ParameterDescriptor {
        let declared_type = DeclaredType::from_tag(self.declared_type.as_deref().unwrap_or("string"));
        match self.kind {
            ParameterKind::Context => {
                let context_type = self.context.as_deref().or(self.name.as_deref());
                match context_type {
                    Some(id) => ParameterDescriptor::context(ContextTypeRef::new(id)),
                    None => ParameterDescriptor {
                        kind: ParameterKind::Context,
                        declared_type,
                        name: None,
                    },
                }
            }
            ParameterKind::Body => ParameterDescriptor::body(declared_type),
            kind => ParameterDescriptor {
                kind,
                declared_type,
                name: self.name.clone().map(ParameterName::NamedKey),
            },
        }
    }
}

fn parse_method(token: &str) -> anyhow::Result<Method> {
    Method::from_bytes(token.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{token}'"))
}

impl Manifest {
    /// Flatten every endpoint into descriptors, in document order.
    pub fn into_descriptors(self) -> anyhow::Result<Vec<OperationDescriptor>> {
        let mut descriptors = Vec::new();
        for (e_index, endpoint) in self.endpoints.into_iter().enumerate() {
            let mut enclosing = EndpointBuilder::new();
            if let Some(path) = &endpoint.path {
                enclosing = enclosing.path(path);
            }
            for method in &endpoint.methods {
                enclosing = enclosing
                    .method(parse_method(method).with_context(|| format!("endpoints[{e_index}]"))?);
            }
            for media_type in &endpoint.consumes {
                enclosing = enclosing.consumes(media_type);
            }
            for media_type in &endpoint.produces {
                enclosing = enclosing.produces(media_type);
            }

            for operation in endpoint.operations {
                let mut builder = OperationBuilder::new(operation.handler.as_str());
                if let Some(path) = &operation.path {
                    builder = builder.path(path);
                }
                for method in &operation.methods {
                    builder = builder.method(parse_method(method).with_context(|| {
                        format!("endpoints[{e_index}] operation '{}'", operation.handler)
                    })?);
                }
                for media_type in &operation.consumes {
                    builder = builder.consumes(media_type);
                }
                for media_type in &operation.produces {
                    builder = builder.produces(media_type);
                }
                for parameter in &operation.parameters {
                    builder = builder.param(parameter.to_descriptor());
                }
                descriptors.push(builder.build_under(&enclosing));
            }
        }
        Ok(descriptors)
    }
}

/// Parse manifest text in the given format.
pub fn parse_manifest(
    content: &str,
    format: ManifestFormat,
) -> anyhow::Result<Vec<OperationDescriptor>> {
    let manifest: Manifest = match format {
        ManifestFormat::Yaml => serde_yaml::from_str(content)?,
        ManifestFormat::Toml => toml::from_str(content)?,
        ManifestFormat::Json => serde_json::from_str(content)?,
    };
    manifest.into_descriptors()
}

/// Load operation descriptors from a YAML, TOML or JSON manifest file.
pub fn load_manifest(path: impl AsRef<Path>) -> anyhow::Result<Vec<OperationDescriptor>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let format = ManifestFormat::from_path(path);
    let descriptors = parse_manifest(&content, format)
        .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

    info!(
        manifest = %path.display(),
        format = ?format,
        operations = descriptors.len(),
        "Manifest loaded"
    );

    Ok(descriptors)
}
