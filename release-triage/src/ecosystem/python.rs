//! Python SDK release requests.

use super::{CompanionError, CompanionInfo, Ecosystem};
use crate::policy::Policy;
use regex::Regex;
use std::sync::LazyLock;

const COMPANION_FILE: &str = "readme.python.md";

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"package-name:\s*([\w+.-]+)").expect("valid regex"));

static OUTPUT_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\(python-sdks-folder\)/(.*?)/azure-").expect("valid regex")
});

const POLICIES: [Policy; 5] = [
    Policy::MultiApi,
    Policy::BaseBranchAttention,
    Policy::OnTime,
    Policy::HoldOn,
    Policy::Remind,
];

/// The Python SDK ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Python;

impl Ecosystem for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn policies(&self) -> &[Policy] {
        &POLICIES
    }

    fn companion_file(&self) -> &'static str {
        COMPANION_FILE
    }

    fn read_companion(&self, contents: &str) -> Result<CompanionInfo, CompanionError> {
        let package_name = PACKAGE_NAME
            .captures(contents)
            .map(|c| c[1].to_string())
            .ok_or(CompanionError::MissingField {
                field: "package-name",
                file: COMPANION_FILE,
            })?;
        let output_folder = OUTPUT_FOLDER
            .captures(contents)
            .map(|c| c[1].to_string())
            .ok_or(CompanionError::MissingField {
                field: "output-folder",
                file: COMPANION_FILE,
            })?;

        Ok(CompanionInfo {
            package_name,
            output_folder,
            multi_api: contents.contains("multi-api"),
        })
    }

    fn release_comment(&self, owner: &str, package: &str, version: &str) -> String {
        format!("Hi @{owner}, pypi link: https://pypi.org/project/{package}/{version}/")
    }
}
