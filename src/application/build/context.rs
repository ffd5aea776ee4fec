//! Build context
//!
//! The phase-accumulated state of one build. A phase never mutates the
//! context it was given; it returns a copy with its own result filled in.
//! Workers only ever see `&BuildContext`.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml_ng::Mapping;

use crate::application::build::layout::WorkspaceLayout;
use crate::domain::entities::{Image, ProjectConfig, ServiceMap};
use crate::domain::ports::Storage;
use crate::domain::services::is_buildable;
use crate::domain::value_objects::SoftwareFamily;

#[derive(Clone)]
pub struct BuildContext {
    pub project: Arc<ProjectConfig>,
    pub images: Arc<HashMap<String, Image>>,
    pub services: Arc<ServiceMap>,
    pub addresses: Arc<IndexMap<String, Ipv4Addr>>,
    pub storage: Arc<dyn Storage>,
    pub layout: WorkspaceLayout,
}

impl BuildContext {
    pub fn new(project: ProjectConfig, storage: Arc<dyn Storage>, layout: WorkspaceLayout) -> Self {
        let services = project.builds.clone();
        Self {
            project: Arc::new(project),
            images: Arc::new(HashMap::new()),
            services: Arc::new(services),
            addresses: Arc::new(IndexMap::new()),
            storage,
            layout,
        }
    }

    pub fn with_project(&self, project: ProjectConfig) -> Self {
        Self {
            services: Arc::new(project.builds.clone()),
            project: Arc::new(project),
            ..self.clone()
        }
    }

    pub fn with_images(&self, images: HashMap<String, Image>) -> Self {
        Self {
            images: Arc::new(images),
            ..self.clone()
        }
    }

    pub fn with_addresses(&self, addresses: IndexMap<String, Ipv4Addr>) -> Self {
        Self {
            addresses: Arc::new(addresses),
            ..self.clone()
        }
    }

    /// Buildable services in declaration order
    pub fn buildable(&self) -> Vec<(&str, &Mapping)> {
        self.services
            .iter()
            .filter(|(_, conf)| is_buildable(conf))
            .map(|(name, conf)| (name.as_str(), conf))
            .collect()
    }

    pub fn image_of(&self, conf: &Mapping) -> Option<&Image> {
        let name = conf.get("image")?.as_str()?;
        self.images.get(name)
    }

    pub fn family_of(&self, conf: &Mapping) -> Option<SoftwareFamily> {
        self.image_of(conf).and_then(Image::family)
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("project", &self.project.name)
            .field("services", &self.services.len())
            .field("addresses", &self.addresses)
            .field("layout", &self.layout)
            .finish()
    }
}
