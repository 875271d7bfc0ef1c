//! Field extraction from release request bodies.
//!
//! A request body looks like:
//!
//! ```text
//! https://github.com/Azure/azure-rest-api-specs/tree/main/specification/storage/resource-manager
//! ->Readme Tag: package-2023-01
//! ->hash: 0123abcd
//! Target release date: 2023-02-15
//! ```

use crate::tracker::RepoRef;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Only this many leading lines are searched for tag and hash.
pub(crate) const HEADER_LINES: usize = 5;

pub(crate) const HASH_FIELD: &str = "->hash:";
pub(crate) const TAG_FIELD: &str = "->Readme Tag:";
pub(crate) const TARGET_DATE_FIELD: &str = "Target release date:";

static RESOURCE_MANAGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(specification/(?:[\w-]+/)+resource-manager)").expect("valid regex")
});

static README_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tag: package-[\w+.-]+").expect("valid regex"));

/// Normalizes the readme link found on the first body line.
pub(crate) fn readme_link(first_line: &str) -> String {
    let trimmed = first_line.trim();
    trimmed
        .strip_suffix("/readme.md")
        .unwrap_or(trimmed)
        .to_string()
}

/// Returns the `specification/.../resource-manager` path of a readme link,
/// or `None` if the link does not point into `spec_repository`'s
/// resource-manager tree.
pub(crate) fn resource_manager_path(link: &str, spec_repository: &RepoRef) -> Option<String> {
    if !link.contains(&format!("/{spec_repository}/")) {
        return None;
    }
    RESOURCE_MANAGER
        .captures(link)
        .map(|captures| captures[1].to_string())
}

/// Value after the first `:` of the first line containing `marker`.
pub(crate) fn field(lines: &[&str], marker: &str) -> Option<String> {
    lines
        .iter()
        .find(|line| line.contains(marker))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}

/// Parses a target date value such as `2023-02-15`.
pub(crate) fn target_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// First `tag: package-...` declaration of a specification readme.
pub(crate) fn first_readme_tag(readme: &str) -> Option<&str> {
    README_TAG.find(readme).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> RepoRef {
        RepoRef::new("Azure", "azure-rest-api-specs")
    }

    #[test]
    fn strips_readme_suffix() {
        assert_eq!(
            readme_link(" https://github.com/Azure/azure-rest-api-specs/tree/main/specification/a/resource-manager/readme.md "),
            "https://github.com/Azure/azure-rest-api-specs/tree/main/specification/a/resource-manager"
        );
    }

    #[test]
    fn finds_resource_manager_path() {
        let link = "https://github.com/Azure/azure-rest-api-specs/tree/main/specification/storage/resource-manager";
        assert_eq!(
            resource_manager_path(link, &specs()).as_deref(),
            Some("specification/storage/resource-manager")
        );

        let nested = "https://github.com/Azure/azure-rest-api-specs/blob/main/specification/a/b-c/resource-manager";
        assert_eq!(
            resource_manager_path(nested, &specs()).as_deref(),
            Some("specification/a/b-c/resource-manager")
        );
    }

    #[test]
    fn rejects_other_links() {
        let data_plane = "https://github.com/Azure/azure-rest-api-specs/tree/main/specification/storage/data-plane";
        assert_eq!(resource_manager_path(data_plane, &specs()), None);

        let fork = "https://github.com/someone/other-specs/tree/main/specification/storage/resource-manager";
        assert_eq!(resource_manager_path(fork, &specs()), None);
    }

    #[test]
    fn extracts_fields() {
        let lines = ["link", "->Readme Tag: package-2023-01", "->hash: abc:def"];

        assert_eq!(field(&lines, TAG_FIELD).as_deref(), Some("package-2023-01"));
        assert_eq!(field(&lines, HASH_FIELD).as_deref(), Some("abc:def"));
        assert_eq!(field(&lines, TARGET_DATE_FIELD), None);
    }

    #[test]
    fn parses_target_dates() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 15);
        assert_eq!(target_date("2023-02-15"), expected);
        assert_eq!(target_date(" 2023/02/15 "), expected);
        assert_eq!(target_date("02/15/2023"), expected);
        assert_eq!(target_date("next week"), None);
    }

    #[test]
    fn finds_first_readme_tag() {
        let readme = "``` yaml\nopenapi-type: arm\ntag: package-2023-05\n```\n\n### Tag: package-2022-01\n``` yaml $(tag) == 'package-2022-01'\n```\ntag: package-2022-01";
        assert_eq!(first_readme_tag(readme), Some("tag: package-2023-05"));
        assert_eq!(first_readme_tag("nothing here"), None);
    }
}
