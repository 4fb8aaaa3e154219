//! Capability gate.
//!
//! Permissions are never checked against credentials here: a trusted proxy
//! in front of the server (such as Sandstorm) writes the caller's
//! granted capabilities into a request header, and the gate only tests
//! membership.

use std::collections::BTreeSet;
use std::fmt;

use axum::extract::{Request, State};
use axum::http::header::HeaderName;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use serde::Serialize;

use crate::error::ApiError;

/// Header consulted when access control is enabled and no other header is
/// configured.
pub const DEFAULT_PERMISSION_HEADER: &str = "X-Sandstorm-Permissions";

/// A single capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
}

impl Permission {
    pub const ALL: [Permission; 3] = [Permission::Read, Permission::Write, Permission::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
        }
    }

    /// Parse a capability string; unknown strings yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "delete" => Some(Permission::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capabilities granted to one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Permission::ALL.into_iter().collect()
    }

    /// Parse a comma-separated permission list such as `"read,write"`.
    ///
    /// Items are trimmed; empty and unrecognized items are skipped.
    pub fn parse(value: &str) -> Self {
        value
            .split(',')
            .map(str::trim)
            .filter_map(Permission::parse)
            .collect()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        PermissionSet(iter.into_iter().collect())
    }
}

/// Access-control mode, fixed at startup.
#[derive(Debug, Clone, Default)]
pub enum AccessControl {
    /// Every request is granted every permission.
    #[default]
    Disabled,
    /// Permissions come from `header`.
    Enabled { header: HeaderName },
}

impl AccessControl {
    /// Header-derived access control using [`DEFAULT_PERMISSION_HEADER`].
    pub fn enabled() -> Self {
        AccessControl::Enabled {
            header: HeaderName::from_static("x-sandstorm-permissions"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, AccessControl::Enabled { .. })
    }

    /// Permissions named in the request's permission header.
    ///
    /// An absent, empty, or non-text header grants nothing. In disabled mode
    /// there is no header to consult and the result is empty; use
    /// [`AccessControl::effective_permissions`] for what a caller may do.
    pub fn granted_permissions(&self, headers: &HeaderMap) -> PermissionSet {
        match self {
            AccessControl::Disabled => PermissionSet::empty(),
            AccessControl::Enabled { header } => headers
                .get(header)
                .and_then(|value| value.to_str().ok())
                .map(PermissionSet::parse)
                .unwrap_or_default(),
        }
    }

    /// Whether a request carrying `headers` holds `required`.
    pub fn authorize(&self, headers: &HeaderMap, required: Permission) -> bool {
        match self {
            AccessControl::Disabled => true,
            AccessControl::Enabled { .. } => self.granted_permissions(headers).contains(required),
        }
    }

    pub fn effective_permissions(&self, headers: &HeaderMap) -> PermissionSet {
        match self {
            AccessControl::Disabled => PermissionSet::all(),
            AccessControl::Enabled { .. } => self.granted_permissions(headers),
        }
    }
}

#[derive(Clone)]
struct Requirement {
    access: AccessControl,
    permission: Permission,
}

async fn check_permission(
    State(requirement): State<Requirement>,
    request: Request,
    next: Next,
) -> Response {
    if !requirement
        .access
        .authorize(request.headers(), requirement.permission)
    {
        tracing::warn!(
            method = %request.method(),
            uri = %request.uri(),
            required = %requirement.permission,
            "permission denied"
        );
        return ApiError::PermissionDenied.into_response();
    }
    next.run(request).await
}

/// Guard `route` so it only runs when the caller holds `permission`.
///
/// The check runs before the handler, so a denied request never reaches
/// the file store. With access control disabled the route is returned
/// unchanged.
pub fn require<S>(
    route: MethodRouter<S>,
    access: &AccessControl,
    permission: Permission,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    match access {
        AccessControl::Disabled => route,
        AccessControl::Enabled { .. } => route.route_layer(middleware::from_fn_with_state(
            Requirement {
                access: access.clone(),
                permission,
            },
            check_permission,
        )),
    }
}
