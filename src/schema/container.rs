use serde::Serialize;

use super::ordered::OrderedMap;
use super::value::Scalar;
use crate::error::{FieldPath, ValidationError};
use crate::validation::{Validate, check_non_empty, check_volume};

/// Registry login for a private image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A job container or a service container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<OrderedMap<Scalar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl Container {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            credentials: None,
            env: None,
            ports: None,
            volumes: None,
            options: None,
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.env
            .get_or_insert_with(OrderedMap::new)
            .insert(key, value.into());
        self
    }

    /// Publish a port, e.g. `"5432:5432"`
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.ports.get_or_insert_with(Vec::new).push(port.into());
        self
    }

    /// Mount `<source>:<destination>`
    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.get_or_insert_with(Vec::new).push(volume.into());
        self
    }

    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }
}

impl Validate for Container {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        check_non_empty(&self.image, &path.clone().key("image"))?;
        if let Some(ports) = &self.ports {
            for (i, port) in ports.iter().enumerate() {
                check_non_empty(port, &path.clone().key("ports").index(i))?;
            }
        }
        if let Some(volumes) = &self.volumes {
            for (i, volume) in volumes.iter().enumerate() {
                check_volume(volume, &path.clone().key("volumes").index(i))?;
            }
        }
        Ok(())
    }
}

/// A job's `container`: the bare image shorthand or the full form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobContainer {
    Image(String),
    Config(Container),
}

impl From<&str> for JobContainer {
    fn from(image: &str) -> Self {
        JobContainer::Image(image.to_string())
    }
}

impl From<String> for JobContainer {
    fn from(image: String) -> Self {
        JobContainer::Image(image)
    }
}

impl From<Container> for JobContainer {
    fn from(container: Container) -> Self {
        JobContainer::Config(container)
    }
}

impl Validate for JobContainer {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            JobContainer::Image(image) => check_non_empty(image, path),
            JobContainer::Config(container) => container.validate(path),
        }
    }
}
