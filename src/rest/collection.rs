//! Generic CRUD collection.
//!
//! [`Collection<R>`] turns calls into requests against `R::PATH` and wire
//! documents back into `R`. Every call is a live request; the only local
//! state is the set of ids this collection has deleted, which short-circuits
//! later `update`/`delete` calls for those ids.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::rest::errors::{ResourceError, ValidationError};
use crate::rest::pagination::{PaginationScheme, Paginator};
use crate::rest::patch::{PatchDatum, PatchPayload};
use crate::rest::path::{item_path, list_path, ResourceOperation};
use crate::rest::query::ListQuery;
use crate::rest::resource::{AlbertResource, DeletePolicy, UpdateStrategy};
use crate::rest::tracking::TrackedResource;

/// Pages [`Collection::get_by_name`] reads before giving up.
pub const NAME_SCAN_PAGES: usize = 5;

/// Page size [`Collection::get_by_name`] requests.
pub const NAME_SCAN_PAGE_SIZE: u32 = 100;

/// CRUD and listing for one resource type.
///
/// Cloning is cheap; clones share the transport and the deleted-id set.
pub struct Collection<R> {
    http: Arc<HttpClient>,
    deleted: Arc<RwLock<HashSet<String>>>,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            deleted: Arc::clone(&self.deleted),
            resource: PhantomData,
        }
    }
}

impl<R: AlbertResource> fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("resource", &R::NAME)
            .field("path", &R::PATH)
            .finish_non_exhaustive()
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Collection<crate::resources::Inventory>>();
};

impl<R: AlbertResource> Collection<R> {
    /// Creates a collection on a shared transport.
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            deleted: Arc::new(RwLock::new(HashSet::new())),
            resource: PhantomData,
        }
    }

    /// Creates an unsaved resource.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Validation`] if the model already has an id or
    ///   fails its own checks (no request is made)
    /// - [`ResourceError::Conflict`] if the server rejects a duplicate
    pub async fn create(&self, resource: &R) -> Result<R, ResourceError> {
        if resource.id().is_some() {
            return Err(ValidationError::single(
                R::NAME,
                R::ID_FIELD,
                "must be unset on create; the server assigns it",
            )
            .into());
        }
        resource.validate()?;
        let payload = resource.create_payload()?;

        let body = self
            .send(
                ResourceOperation::Create.default_http_method(),
                R::PATH.to_string(),
                Some(payload),
                None,
            )
            .await?;
        let created = R::from_wire(body)?;
        tracing::debug!(resource = R::NAME, id = ?created.id(), "created");
        Ok(created)
    }

    /// Fetches one resource. Ids without the resource prefix are normalised.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Validation`] for an empty id
    /// - [`ResourceError::NotFound`] if the server has no such resource
    pub async fn get_by_id(&self, id: &str) -> Result<R, ResourceError> {
        let id = Self::checked_id(id)?;
        let body = self
            .send(
                ResourceOperation::Get.default_http_method(),
                item_path(R::PATH, &id),
                None,
                Some(&id),
            )
            .await?;
        Ok(R::from_wire(body)?)
    }

    /// Starts a lazy listing. No request is made until the first item is
    /// pulled.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidQuery`] for unsupported filters.
    pub fn list(&self, query: ListQuery) -> Result<Paginator<R>, ResourceError> {
        let params = query.to_params::<R>()?;
        Ok(Paginator::new(
            Arc::clone(&self.http),
            list_path(R::PATH, R::PAGINATION),
            params,
            query.page_size(),
            query.start_cursor().cloned(),
        ))
    }

    /// Returns the first match, if any.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list) and [`Paginator::next`].
    pub async fn first(&self, query: ListQuery) -> Result<Option<R>, ResourceError> {
        self.list(query.limit(1))?.next().await
    }

    /// Returns `true` if the query matches anything.
    ///
    /// # Errors
    ///
    /// Same as [`first`](Self::first).
    pub async fn exists(&self, query: ListQuery) -> Result<bool, ResourceError> {
        Ok(self.first(query).await?.is_some())
    }

    /// Finds a resource whose name equals `name` exactly.
    ///
    /// Key-paged resources ask the server for an exact match. Offset-paged
    /// resources only offer a text search, so its results are scanned for
    /// the exact name, at most [`NAME_SCAN_PAGES`] pages of
    /// [`NAME_SCAN_PAGE_SIZE`] items. A match beyond that is reported as
    /// `None`.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list) and [`Paginator::next`].
    pub async fn get_by_name(&self, name: &str) -> Result<Option<R>, ResourceError> {
        let query = match R::PAGINATION {
            PaginationScheme::Key => ListQuery::new().name(name).exact_match(true),
            PaginationScheme::Offset => ListQuery::new().text(name),
        };
        let mut pages = self.list(query.limit(NAME_SCAN_PAGE_SIZE))?;
        for _ in 0..NAME_SCAN_PAGES {
            let Some(page) = pages.next_page().await? else {
                return Ok(None);
            };
            if let Some(found) = page.items.into_iter().find(|item| item.name() == Some(name)) {
                return Ok(Some(found));
            }
        }
        tracing::debug!(resource = R::NAME, name, "name scan stopped at page limit");
        Ok(None)
    }

    /// Updates a persisted resource against the current server state.
    ///
    /// The server copy is fetched first. Patchable resources then receive
    /// only the operations that differ (nothing at all if none do); others
    /// are replaced wholesale. The returned model is the server's state
    /// after the update.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Validation`] if the model has no id or fails checks
    /// - [`ResourceError::StaleResource`] if this collection deleted the id
    /// - [`ResourceError::NotFound`] if the server has no such resource
    /// - [`ResourceError::Conflict`] on a revision mismatch or HTTP 409/412
    pub async fn update(&self, resource: &R) -> Result<R, ResourceError> {
        let id = self.live_id(resource)?;
        resource.validate()?;

        let current = self.get_by_id(&id).await?;
        if let Some(local) = resource.revision() {
            let server = current.revision();
            if server.as_ref() != Some(&local) {
                return Err(ResourceError::Conflict {
                    resource: R::NAME,
                    id: Some(id),
                    status: None,
                    message: format!(
                        "local revision {local} does not match server revision {}",
                        server.map_or_else(|| "none".to_string(), |v| v.to_string())
                    ),
                });
            }
        }

        Ok(self
            .send_update(&id, &current, resource)
            .await?
            .unwrap_or(current))
    }

    /// Updates a tracked resource by diffing against its snapshot.
    ///
    /// No pre-fetch is made and an unchanged resource issues no request. On
    /// success the tracker is reset to the server's state.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update), plus [`ResourceError::Validation`]
    /// if the tracker has no snapshot.
    pub async fn update_tracked(
        &self,
        tracked: &mut TrackedResource<R>,
    ) -> Result<R, ResourceError> {
        let id = self.live_id(&**tracked)?;
        tracked.validate()?;

        let Some(original) = tracked.original().cloned() else {
            return Err(ValidationError::single(
                R::NAME,
                R::ID_FIELD,
                "tracked resource has no snapshot; load it before updating",
            )
            .into());
        };
        if !tracked.is_dirty() {
            tracing::debug!(resource = R::NAME, %id, "tracked resource unchanged");
            return Ok(original);
        }

        match self.send_update(&id, &original, &**tracked).await? {
            Some(saved) => {
                tracked.reset(saved.clone());
                Ok(saved)
            }
            None => Ok(original),
        }
    }

    /// Deletes a resource.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Validation`] for an empty id
    /// - [`ResourceError::StaleResource`] if this collection already deleted
    ///   the id (unless the resource deletes idempotently)
    /// - [`ResourceError::NotFound`] if the server has no such resource and
    ///   the resource does not delete idempotently
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        let id = Self::checked_id(id)?;
        let idempotent = R::DELETE_POLICY == DeletePolicy::IdempotentNotFound;

        if self.is_deleted(&id) {
            if idempotent {
                return Ok(());
            }
            return Err(ResourceError::StaleResource {
                resource: R::NAME,
                id,
            });
        }

        let result = self
            .send(
                ResourceOperation::Delete.default_http_method(),
                item_path(R::PATH, &id),
                None,
                Some(&id),
            )
            .await;
        match result {
            Ok(_) => {}
            Err(ResourceError::NotFound { .. }) if idempotent => {
                tracing::warn!(resource = R::NAME, %id, "delete target already absent");
            }
            Err(e) => return Err(e),
        }

        self.deleted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        Ok(())
    }

    /// Returns `true` if this collection deleted `id`.
    #[must_use]
    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&R::normalize_id(id))
    }

    fn checked_id(id: &str) -> Result<String, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::single(
                R::NAME,
                R::ID_FIELD,
                "must not be empty",
            ));
        }
        Ok(R::normalize_id(id))
    }

    fn live_id(&self, resource: &R) -> Result<String, ResourceError> {
        let id = resource
            .id()
            .ok_or_else(|| ValidationError::single(R::NAME, R::ID_FIELD, "required for update"))?;
        let id = Self::checked_id(id)?;
        if self.is_deleted(&id) {
            return Err(ResourceError::StaleResource {
                resource: R::NAME,
                id,
            });
        }
        Ok(id)
    }

    /// Sends the update. `None` means there was nothing to send.
    async fn send_update(
        &self,
        id: &str,
        existing: &R,
        updated: &R,
    ) -> Result<Option<R>, ResourceError> {
        let path = item_path(R::PATH, id);
        match R::UPDATE_STRATEGY {
            UpdateStrategy::Patch => {
                let ops = R::patch_operations(existing, updated)?;
                if ops.is_empty() {
                    tracing::debug!(resource = R::NAME, %id, "no patchable changes");
                    return Ok(None);
                }
                let batches: Vec<Vec<PatchDatum>> = if R::SPLIT_PATCH {
                    ops.into_iter().map(|op| vec![op]).collect()
                } else {
                    vec![ops]
                };
                for batch in batches {
                    let payload = serde_json::to_value(PatchPayload::new(batch))
                        .map_err(|e| ValidationError::single(R::NAME, "data", e.to_string()))?;
                    self.send(HttpMethod::Patch, path.clone(), Some(payload), Some(id))
                        .await?;
                }
                self.get_by_id(id).await.map(Some)
            }
            UpdateStrategy::Replace => {
                let payload = updated.replace_payload()?;
                let body = self
                    .send(HttpMethod::Put, path, Some(payload), Some(id))
                    .await?;
                if body.is_object() {
                    Ok(Some(R::from_wire(body)?))
                } else {
                    self.get_by_id(id).await.map(Some)
                }
            }
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: String,
        body: Option<Value>,
        id: Option<&str>,
    ) -> Result<Value, ResourceError> {
        let mut builder = HttpRequest::builder(method, path);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder
            .build()
            .map_err(|e| ResourceError::Transport(HttpError::from(e)))?;
        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| ResourceError::from_http_error(e, R::NAME, id))?;
        Ok(response.body)
    }
}
