//! Route-scope authorization.
//!
//! A route's required permission is derived from its path, e.g.
//! `/v1/programming/uuid` requires `programming-uuid`. Granted scopes are
//! URL-shaped (`https://issuer.example/programming-uuid`) and a grant satisfies
//! a route when it ends with the required permission.
//!
//! Matching is by suffix, so a grant such as `.../programming-jwtdebugger-uuid`
//! also satisfies a route requiring `uuid`.

use crate::AuthzError;

/// Permission a request path requires.
///
/// Slashes and hyphens both act as separators; the leading empty segment and
/// the version segment are dropped and the rest is joined with hyphens.
/// Returns an empty string for paths with nothing after the version segment;
/// like any other permission it is then satisfied by any non-empty grant.
pub fn required_permission(path: &str) -> String {
    path.replace('/', "-")
        .split('-')
        .skip(2)
        .collect::<Vec<_>>()
        .join("-")
}

/// Authorize a request path against the space-delimited `granted_scopes`.
///
/// - No IO
/// - No panics
pub fn authorize(path: &str, granted_scopes: &str) -> Result<(), AuthzError> {
    let required = required_permission(path);

    let granted = !granted_scopes.is_empty()
        && granted_scopes
            .split(' ')
            .any(|scope| scope.ends_with(required.as_str()));

    tracing::debug!(path, required = %required, granted_scopes, granted, "scope check");

    if granted {
        Ok(())
    } else {
        Err(AuthzError::InsufficientScope { required })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn permission_from_path() {
        assert_eq!(required_permission("/v1/programming/uuid"), "programming-uuid");
        assert_eq!(required_permission("/v1/programming-jwtdebugger"), "programming-jwtdebugger");
        assert_eq!(required_permission("/v2/finance/currconv"), "finance-currconv");
        assert_eq!(required_permission("/v1/session"), "session");
    }

    #[test]
    fn short_paths_require_nothing() {
        assert_eq!(required_permission(""), "");
        assert_eq!(required_permission("/"), "");
        assert_eq!(required_permission("/v1"), "");
        assert_eq!(required_permission("/v1/"), "");
    }

    #[test]
    fn matching_grant_allows() {
        assert_eq!(
            authorize(
                "/v1/programming-jwtdebugger",
                "https://learninggolang.com/programming-jwtdebugger"
            ),
            Ok(())
        );
    }

    #[test]
    fn unrelated_grant_forbids() {
        assert_eq!(
            authorize(
                "/v1/programming-jwtdebugger",
                "https://learninggolang.com/programming-uuid"
            ),
            Err(AuthzError::InsufficientScope {
                required: "programming-jwtdebugger".to_string()
            })
        );
    }

    #[test]
    fn any_grant_in_list_suffices() {
        let grants = "https://x/a-b https://x/c-d";
        assert_eq!(authorize("/v1/c-d", grants), Ok(()));
        assert_eq!(authorize("/v1/a/b", grants), Ok(()));
        assert!(authorize("/v1/e-f", grants).is_err());
    }

    #[test]
    fn empty_grants_forbid() {
        assert!(authorize("/v1/programming-jwtdebugger", "").is_err());
        assert!(authorize("/v1", "").is_err());
    }

    #[test]
    fn version_only_path_allows_any_grant() {
        assert_eq!(authorize("/v1", "https://x/anything"), Ok(()));
        assert_eq!(authorize("/v1/", "https://x/anything"), Ok(()));
        assert_eq!(authorize("/", "https://x/anything"), Ok(()));
    }

    #[test]
    fn suffix_match_is_coarse() {
        assert_eq!(authorize("/v1/uuid", "https://x/programming-jwtdebugger-uuid"), Ok(()));
    }

    proptest! {
        #[test]
        fn grant_ending_with_permission_always_allows(
            prefix in "[a-z:/.]{0,20}",
            resource in "[a-z]{1,10}(-[a-z]{1,10}){0,2}",
        ) {
            let path = format!("/v1/{resource}");
            let grant = format!("{prefix}{resource}");
            prop_assert_eq!(authorize(&path, &grant), Ok(()));
        }

        #[test]
        fn empty_grants_never_allow(path in "(/[a-z0-9-]{0,8}){0,4}") {
            prop_assert!(authorize(&path, "").is_err());
        }

        #[test]
        fn never_panics(path in ".*", grants in ".*") {
            let _ = authorize(&path, &grants);
        }
    }
}
