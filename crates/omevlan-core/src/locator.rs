// ── Template lookup ──

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use omevlan_api::Template;

use crate::api::ManagementApi;
use crate::error::CoreError;

/// How the caller identifies the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateRef {
    Id(u32),
    Name(String),
}

impl TemplateRef {
    /// Build from the two optional inputs; exactly one must be set.
    pub fn from_parts(id: Option<u32>, name: Option<String>) -> Result<Self, CoreError> {
        match (id, name) {
            (Some(id), None) => Ok(Self::Id(id)),
            (None, Some(name)) => Ok(Self::Name(name)),
            _ => Err(CoreError::TemplateSelection),
        }
    }

    /// Resolve to a template id. An explicit id is trusted as-is.
    pub async fn resolve<A: ManagementApi>(&self, api: &A) -> Result<u32, CoreError> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Name(name) => {
                let templates = api.list_templates().await?;
                let id = find_template_id(&templates, name)?;
                debug!(name, id, "resolved template");
                Ok(id)
            }
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "template {id}"),
            Self::Name(name) => write!(f, "template '{name}'"),
        }
    }
}

/// Exact, case-sensitive name match.
pub fn find_template_id(templates: &[Template], name: &str) -> Result<u32, CoreError> {
    templates
        .iter()
        .find(|t| t.name == name)
        .map(|t| t.id)
        .ok_or_else(|| CoreError::TemplateNotFound {
            name: name.to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn template(id: u32, name: &str) -> Template {
        Template {
            id,
            name: name.into(),
            description: None,
            view_type_id: Some(2),
        }
    }

    #[test]
    fn finds_by_exact_name() {
        let templates = [template(10, "web"), template(12, "Web Servers")];
        assert_eq!(find_template_id(&templates, "Web Servers").unwrap(), 12);
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let templates = [template(12, "Web Servers")];
        let err = find_template_id(&templates, "web servers").unwrap_err();
        assert_eq!(err.to_string(), "Template with name 'web servers' not found");
    }

    #[test]
    fn exactly_one_selector_required() {
        assert!(matches!(
            TemplateRef::from_parts(Some(1), Some("x".into())),
            Err(CoreError::TemplateSelection)
        ));
        assert!(matches!(
            TemplateRef::from_parts(None, None),
            Err(CoreError::TemplateSelection)
        ));
        assert_eq!(TemplateRef::from_parts(Some(7), None).unwrap(), TemplateRef::Id(7));
    }

    struct Templates(Vec<Template>);

    impl ManagementApi for Templates {
        async fn list_networks(&self) -> Result<Vec<crate::VlanNetwork>, CoreError> {
            Ok(Vec::new())
        }

        async fn list_templates(&self) -> Result<Vec<Template>, CoreError> {
            Ok(self.0.clone())
        }

        async fn network_hierarchy(
            &self,
            template_id: u32,
        ) -> Result<omevlan_api::AttributeViewDetails, CoreError> {
            Err(CoreError::Internal(format!("unexpected view read for {template_id}")))
        }

        async fn submit(&self, _plan: &crate::UpdatePlan) -> Result<(), CoreError> {
            Err(CoreError::Internal("unexpected submit".into()))
        }
    }

    #[test]
    fn resolve_by_name_and_id() {
        let api = Templates(vec![template(12, "Web Servers")]);

        let by_name = TemplateRef::Name("Web Servers".into());
        assert_eq!(tokio_test::block_on(by_name.resolve(&api)).unwrap(), 12);

        // An explicit id is not checked against the template list.
        let by_id = TemplateRef::Id(99);
        assert_eq!(tokio_test::block_on(by_id.resolve(&api)).unwrap(), 99);

        let missing = TemplateRef::Name("db".into());
        assert!(matches!(
            tokio_test::block_on(missing.resolve(&api)),
            Err(CoreError::TemplateNotFound { .. })
        ));
    }
}
