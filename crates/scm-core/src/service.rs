// ── Generic resource service ──
//
// One implementation of create / get / update / delete / list / fetch,
// parameterized by the `Resource` trait. Each concrete service on the
// `Scm` facade is a `ResourceService<R>` sharing the same `ApiClient`.

use std::marker::PhantomData;
use std::sync::Arc;

use scm_api::{ApiClient, FetchResponse};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::container::Container;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, ListQuery, apply_filters, effective_limit};
use crate::resource::{Resource, Validate};

/// CRUD, listing, and lookup-by-name for one resource type.
pub struct ResourceService<R> {
    api: Arc<ApiClient>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn endpoint() -> &'static str {
        R::KIND.endpoint()
    }

    fn item_path(id: &Uuid) -> String {
        format!("{}/{id}", Self::endpoint())
    }

    /// Create an object. The payload is validated before any request is sent.
    pub async fn create(&self, payload: &R::Create) -> Result<R, CoreError> {
        payload.validate()?;
        let created: R = self.api.post(Self::endpoint(), payload).await?;
        info!(kind = %R::KIND, id = %created.id(), name = created.name(), "created object");
        Ok(created)
    }

    /// Retrieve one object by id.
    pub async fn get(&self, id: &Uuid) -> Result<R, CoreError> {
        debug!(kind = %R::KIND, %id, "get object");
        self.api
            .get(&Self::item_path(id))
            .await
            .map_err(|e| CoreError::from(e).for_entity(R::KIND.as_ref(), &id.to_string()))
    }

    /// Replace an object. The id travels in the path, never in the body.
    pub async fn update(&self, object: &R) -> Result<R, CoreError> {
        let id = *object.id();
        let mut body = serde_json::to_value(object).map_err(|e| CoreError::ResponseShape {
            message: format!("cannot serialize {}: {e}", R::KIND),
        })?;
        if let Value::Object(map) = &mut body {
            map.remove("id");
        }

        let updated: R = self
            .api
            .put(&Self::item_path(&id), &body)
            .await
            .map_err(|e| CoreError::from(e).for_entity(R::KIND.as_ref(), &id.to_string()))?;
        info!(kind = %R::KIND, %id, "updated object");
        Ok(updated)
    }

    /// Delete an object by id.
    pub async fn delete(&self, id: &Uuid) -> Result<(), CoreError> {
        self.api
            .delete(&Self::item_path(id))
            .await
            .map_err(|e| CoreError::from(e).for_entity(R::KIND.as_ref(), &id.to_string()))?;
        info!(kind = %R::KIND, %id, "deleted object");
        Ok(())
    }

    /// List every object visible from the query's container.
    ///
    /// Paginates through the whole collection, then applies the exact-match,
    /// exclusion, and attribute filters. Any page failure fails the call.
    pub async fn list(&self, query: &ListQuery<R::Filter>) -> Result<Vec<R>, CoreError> {
        query.container.validate()?;
        query.filter.validate()?;
        let limit = effective_limit(query.max_limit, R::DEFAULT_MAX_LIMIT, R::MAX_LIMIT)?;
        let container_param = query.container.query_param();

        let api = &self.api;
        let records: Vec<R> = api
            .paginate_all(limit, |offset, limit| {
                let params = [container_param.clone()];
                async move {
                    api.list_page(Self::endpoint(), offset, limit, &params)
                        .await
                }
            })
            .await?;

        let fetched = records.len();
        let kept = apply_filters(records, query);
        debug!(
            kind = %R::KIND,
            container = %query.container,
            fetched,
            kept = kept.len(),
            "listed objects"
        );
        Ok(kept)
    }

    /// Look up exactly one object by name in exactly `container`.
    ///
    /// Objects inherited from ancestor containers are not considered.
    pub async fn fetch(&self, name: &str, container: &Container) -> Result<R, CoreError> {
        if name.is_empty() {
            return Err(CoreError::validation("name cannot be empty"));
        }
        container.validate()?;

        let params = [("name", name.to_owned()), container.query_param()];
        let response: FetchResponse<R> = self
            .api
            .get_with_params(Self::endpoint(), &params)
            .await
            .map_err(|e| CoreError::from(e).for_entity(R::KIND.as_ref(), name))?;

        let mut candidates: Vec<R> = response
            .into_candidates()
            .into_iter()
            .filter(|r| r.name() == name && r.container_fields().is_in(container))
            .collect();

        if candidates.len() > 1 {
            warn!(kind = %R::KIND, name, %container, count = candidates.len(), "ambiguous fetch");
            return Err(CoreError::Ambiguous {
                entity_type: R::KIND.to_string(),
                name: name.to_owned(),
                container: container.to_string(),
                count: candidates.len(),
            });
        }
        candidates.pop().ok_or_else(|| CoreError::NotFound {
            entity_type: R::KIND.to_string(),
            identifier: format!("{name} in {container}"),
            code: None,
            details: None,
        })
    }
}
