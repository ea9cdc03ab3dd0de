//! Who may see which files.
//!
//! Listing resolves an effective owner/public scope from the caller and the requested
//! parameters. Single-resource reads decide whether the caller gets the private (owner)
//! view, and hide non-public files from everyone else as if they did not exist.

use crate::error::AppError;
use crate::models::{FileRecord, ListQuery, RequestIdentity};
use crate::query::NormalizedListParams;

/// Which listing rule produced a scope. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityRule {
    /// No identity: public files only, of the requested owner if any.
    Anonymous,
    /// Admin, or a caller listing their own files by alias or id.
    Unrestricted,
    /// Caller named no owner and has no alias: their own files.
    ImplicitSelf,
    /// Caller looks at someone else's files (or their alias scope): public only.
    PublicOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityScope {
    pub owner: Option<String>,
    /// `None` means no public/private restriction is sent to the backend.
    pub public: Option<bool>,
    pub rule: VisibilityRule,
}

/// Resolve the listing scope. Total: every input maps to exactly one rule.
pub fn resolve_list_scope(
    identity: &RequestIdentity,
    requested_owner: Option<&str>,
    requested_public: Option<bool>,
) -> VisibilityScope {
    let Some(user) = identity.user() else {
        return VisibilityScope {
            owner: requested_owner.map(str::to_string),
            public: Some(true),
            rule: VisibilityRule::Anonymous,
        };
    };

    let own_scope = requested_owner.is_some_and(|owner| user.answers_to(owner));
    if user.is_admin || own_scope {
        return VisibilityScope {
            owner: requested_owner.map(str::to_string),
            public: requested_public,
            rule: VisibilityRule::Unrestricted,
        };
    }

    if requested_owner.is_none() && user.alias.is_none() {
        return VisibilityScope {
            owner: Some(user.id.clone()),
            public: requested_public,
            rule: VisibilityRule::ImplicitSelf,
        };
    }

    VisibilityScope {
        owner: requested_owner
            .map(str::to_string)
            .or_else(|| user.alias.clone()),
        public: Some(true),
        rule: VisibilityRule::PublicOnly,
    }
}

/// Combine normalized parameters with a resolved scope into the backend query.
pub fn scoped_list_query(params: NormalizedListParams, scope: VisibilityScope) -> ListQuery {
    ListQuery {
        order: params.order,
        offset: params.offset,
        limit: params.limit,
        filter: params.filter,
        sort_by: params.sort_by,
        owner: scope.owner,
        public: scope.public,
        tags: params.tags,
    }
}

/// True when the caller owns the record and should get the unredacted view.
pub fn is_private_view(identity: &RequestIdentity, owner_username: &str) -> bool {
    identity.id() == Some(owner_username)
}

/// Whether a listed record is shown unredacted: admins see every record in full, other
/// callers only the records they own (by id or alias).
pub fn lists_unredacted(identity: &RequestIdentity, record: &FileRecord) -> bool {
    match identity.user() {
        None => false,
        Some(user) if user.is_admin => true,
        Some(user) => record.owner.as_deref().is_some_and(|owner| user.answers_to(owner)),
    }
}

/// Gate a single record. Returns whether the private view applies, or `NotFound`
/// when the record is neither public nor owned by the caller.
pub fn ensure_visible(
    identity: &RequestIdentity,
    owner_username: &str,
    record: &FileRecord,
) -> Result<bool, AppError> {
    let private = is_private_view(identity, owner_username);
    if !record.public && !private {
        return Err(AppError::NotFound("could not find associated data".to_string()));
    }
    Ok(private)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserIdentity;
    use serde_json::{json, Map};

    fn user(id: &str, alias: Option<&str>, is_admin: bool) -> RequestIdentity {
        RequestIdentity::User(UserIdentity {
            id: id.to_string(),
            alias: alias.map(str::to_string),
            is_admin,
            attributes: Map::new(),
        })
    }

    fn record(public: bool) -> FileRecord {
        serde_json::from_value(json!({"uploadId": "u1", "owner": "bob", "public": public}))
            .unwrap()
    }

    #[test]
    fn anonymous_is_always_public_only() {
        let scope = resolve_list_scope(&RequestIdentity::Anonymous, Some("bob"), Some(false));
        assert_eq!(scope.rule, VisibilityRule::Anonymous);
        assert_eq!(scope.public, Some(true));
        assert_eq!(scope.owner.as_deref(), Some("bob"));

        let scope = resolve_list_scope(&RequestIdentity::Anonymous, None, None);
        assert_eq!(scope.owner, None);
    }

    #[test]
    fn admin_sees_everything_with_requested_flag() {
        let admin = user("root@example.com", Some("root"), true);
        let scope = resolve_list_scope(&admin, Some("alice"), None);
        assert_eq!(scope.rule, VisibilityRule::Unrestricted);
        assert_eq!(scope.public, None);
        assert_eq!(scope.owner.as_deref(), Some("alice"));

        let scope = resolve_list_scope(&admin, None, Some(false));
        assert_eq!(scope.public, Some(false));
        assert_eq!(scope.owner, None);
    }

    #[test]
    fn own_alias_or_id_is_unrestricted() {
        let bob = user("bob@example.com", Some("bob"), false);
        assert_eq!(
            resolve_list_scope(&bob, Some("bob"), None).rule,
            VisibilityRule::Unrestricted
        );
        assert_eq!(
            resolve_list_scope(&bob, Some("bob@example.com"), Some(true)).public,
            Some(true)
        );
    }

    #[test]
    fn no_owner_and_no_alias_scopes_to_self() {
        let carol = user("carol@example.com", None, false);
        let scope = resolve_list_scope(&carol, None, None);
        assert_eq!(scope.rule, VisibilityRule::ImplicitSelf);
        assert_eq!(scope.owner.as_deref(), Some("carol@example.com"));
        assert_eq!(scope.public, None);
    }

    #[test]
    fn foreign_owner_is_public_only() {
        let bob = user("bob@example.com", Some("bob"), false);
        let scope = resolve_list_scope(&bob, Some("alice"), Some(false));
        assert_eq!(scope.rule, VisibilityRule::PublicOnly);
        assert_eq!(scope.public, Some(true));
        assert_eq!(scope.owner.as_deref(), Some("alice"));
    }

    #[test]
    fn alias_without_owner_lists_public_alias_files() {
        let bob = user("bob@example.com", Some("bob"), false);
        let scope = resolve_list_scope(&bob, None, None);
        assert_eq!(scope.rule, VisibilityRule::PublicOnly);
        assert_eq!(scope.owner.as_deref(), Some("bob"));
        assert_eq!(scope.public, Some(true));
    }

    #[test]
    fn listed_records_are_unredacted_for_owner_and_admin() {
        let bob = user("bob", Some("bobby"), false);
        let admin = user("root", None, true);
        let alice = user("alice", None, false);
        assert!(lists_unredacted(&bob, &record(true)));
        assert!(lists_unredacted(&admin, &record(true)));
        assert!(!lists_unredacted(&alice, &record(true)));
        assert!(!lists_unredacted(&RequestIdentity::Anonymous, &record(true)));
    }

    #[test]
    fn private_record_is_hidden_from_others() {
        let alice = user("alice@example.com", Some("alice"), false);
        let err = ensure_visible(&alice, "bob@example.com", &record(false)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(
            ensure_visible(&RequestIdentity::Anonymous, "bob@example.com", &record(false)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn owner_gets_private_view() {
        let bob = user("bob@example.com", Some("bob"), false);
        assert!(ensure_visible(&bob, "bob@example.com", &record(false)).unwrap());
        assert!(!ensure_visible(&RequestIdentity::Anonymous, "bob@example.com", &record(true)).unwrap());
    }
}
