// Data shapes exchanged with the model API.
//
// Upload metadata goes out as multipart text fields; patches go out as JSON.
// The same structs are read from the `[model]` and `[patch]` config sections,
// so field names stay snake_case on the way in and only serialize to the
// service's camelCase.

use serde::{Deserialize, Serialize, Serializer};

/// Server-reported state of the asynchronous model conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Failed,
    Succeeded,
    /// Anything the client does not know about yet.
    Unknown(String),
}

impl From<String> for ProcessingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING" => ProcessingStatus::Pending,
            "PROCESSING" => ProcessingStatus::Processing,
            "FAILED" => ProcessingStatus::Failed,
            "SUCCEEDED" => ProcessingStatus::Succeeded,
            _ => ProcessingStatus::Unknown(value),
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Pending => f.write_str("PENDING"),
            ProcessingStatus::Processing => f.write_str("PROCESSING"),
            ProcessingStatus::Failed => f.write_str("FAILED"),
            ProcessingStatus::Succeeded => f.write_str("SUCCEEDED"),
            ProcessingStatus::Unknown(other) => f.write_str(other),
        }
    }
}

/// The parts of `GET {model url}` the poller reads. The backend returns many
/// more fields; they are ignored.
#[derive(Debug, Deserialize)]
pub struct ModelResource {
    #[serde(default)]
    pub status: Option<ProcessingInfo>,
    /// Either a message string or a structured object, depending on the
    /// failure.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessingInfo {
    pub processing: ProcessingStatus,
}

impl ModelResource {
    pub fn processing_status(&self) -> Option<&ProcessingStatus> {
        self.status.as_ref().map(|s| &s.processing)
    }

    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(msg)) => msg.clone(),
            Some(other) => other.to_string(),
            None => "no error details".to_string(),
        }
    }
}

/// Metadata sent alongside the model file on upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Category slugs.
    pub categories: Vec<String>,
    /// License label, e.g. "CC Attribution-ShareAlike".
    pub license: Option<String>,
    /// `false` keeps the model as a draft.
    pub is_published: bool,
    /// Allow the 2D view in the model inspector.
    pub is_inspectable: bool,
    /// Requires a pro account.
    pub private: Option<bool>,
    /// Requires a pro account.
    pub password: Option<String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            tags: Vec::new(),
            categories: Vec::new(),
            license: None,
            is_published: false,
            is_inspectable: true,
            private: None,
            password: None,
        }
    }
}

impl ModelMetadata {
    /// Flatten into multipart text fields. List fields repeat their key once
    /// per element; unset optional fields are left out.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(("name", name.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        for tag in &self.tags {
            fields.push(("tags", tag.clone()));
        }
        for category in &self.categories {
            fields.push(("categories", category.clone()));
        }
        if let Some(license) = &self.license {
            fields.push(("license", license.clone()));
        }
        fields.push(("isPublished", self.is_published.to_string()));
        fields.push(("isInspectable", self.is_inspectable.to_string()));
        if let Some(private) = self.private {
            fields.push(("private", private.to_string()));
        }
        if let Some(password) = &self.password {
            fields.push(("password", password.clone()));
        }
        fields
    }
}

/// JSON body of `PATCH {model url}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct ModelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_inspectable: Option<bool>,
}

/// JSON body of `PATCH {model url}/options`.
///
/// The service takes `background` and `orientation` as JSON documents
/// embedded in string fields, e.g. `"background": "{\"color\":\"#FFFFFF\"}"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// e.g. "shadeless" or "lit".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_json_string"
    )]
    pub background: Option<Background>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_json_string"
    )]
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Hex color, e.g. "#FFFFFF".
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Orientation {
    AxisAngle { axis: [f64; 3], angle: f64 },
    /// Row-major 4x4 rotation matrix.
    Matrix { matrix: [f64; 16] },
}

fn as_json_string<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => {
            let encoded = serde_json::to_string(inner).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&encoded)
        }
        None => serializer.serialize_none(),
    }
}
