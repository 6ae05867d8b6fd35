// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `kubernetes.rs`

#[cfg(test)]
mod tests {
    use crate::constants::KUBE_LIST_PAGE_SIZE;
    use crate::kubernetes::is_not_found;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(
            kube::core::Status::failure(&format!("{reason} error"), reason)
                .with_code(code)
                .boxed(),
        )
    }

    #[test]
    fn test_404_means_crd_absent() {
        assert!(is_not_found(&api_error(404, "NotFound")));
    }

    #[test]
    fn test_other_errors_are_not_absence() {
        assert!(!is_not_found(&api_error(403, "Forbidden")));
        assert!(!is_not_found(&api_error(500, "InternalError")));
    }

    #[test]
    fn test_pagination_constant() {
        assert_eq!(
            KUBE_LIST_PAGE_SIZE, 100,
            "Page size should be 100 items per page"
        );
    }
}
