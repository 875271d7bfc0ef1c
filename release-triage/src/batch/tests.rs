use super::*;
use crate::test_support::{days_ago, issue, now, release_body, Harness};
use crate::tracker::memory::Mutation;
use crate::tracker::{Comment, IssueState, RepoRef};

const TAG: &str = "package-2024-01";

fn companion_for(package: &str, folder: &str) -> String {
    format!(
        "package-name: {package}\noutput-folder: $(python-sdks-folder)/{folder}/{package}/azure\n"
    )
}

fn add_service(h: &Harness, service: &str, package: &str) {
    let repo = RepoRef::new("Azure", "azure-rest-api-specs");
    let path = format!("specification/{service}/resource-manager");
    h.tracker.add_file(
        &repo,
        &format!("{path}/readme.python.md"),
        &companion_for(package, service),
    );
    h.tracker.add_file(
        &repo,
        &format!("{path}/readme.md"),
        &format!("tag: {TAG}\n"),
    );
}

fn service_body(service: &str) -> String {
    format!(
        "https://github.com/Azure/azure-rest-api-specs/tree/main/specification/{service}/resource-manager\n->Readme Tag: {TAG}\n"
    )
}

#[tokio::test]
async fn processes_open_issues_in_listing_order() {
    let h = Harness::new();
    h.add_spec(false, TAG);
    add_service(&h, "compute", "azure-mgmt-compute");
    h.track(issue(1, &release_body(TAG, None)));
    h.track(issue(2, &service_body("compute")));
    h.track(issue(3, "not a request"));

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    let numbers: Vec<u64> = outcome.results.iter().map(|r| r.process.number()).collect();
    assert_eq!(numbers, [1, 2, 3]);
    assert_eq!(outcome.summary.issues_processed, 3);
    assert_eq!(outcome.summary.issues_unrecognized, 1);
    assert_eq!(outcome.summary.pipelines_triggered, 1);
    assert_eq!(outcome.summary.issues_failed, 0);
}

#[tokio::test]
async fn skips_issues_without_filter_labels() {
    let h = Harness::new();
    let mut data_plane = issue(4, "");
    data_plane.labels.clear();
    h.track(data_plane);
    h.track(issue(5, "not a request"));

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].process.number(), 5);
}

#[tokio::test]
async fn failure_of_one_issue_does_not_stop_the_batch() {
    let h = Harness::new();
    h.add_spec(false, TAG);
    h.track(issue(6, &service_body("unknown")));
    h.track(issue(7, &release_body(TAG, None)));

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results[0].failed());
    assert!(!outcome.results[1].failed());
    assert_eq!(outcome.summary.issues_failed, 1);
    assert!(outcome.summary.has_failures());
}

#[tokio::test]
async fn marks_later_duplicates_only() {
    let h = Harness::new();
    h.add_spec(false, TAG);
    add_service(&h, "compute", "azure-mgmt-compute");
    h.track(issue(8, &release_body(TAG, None)));
    h.track(issue(9, &service_body("compute")));
    h.track(issue(10, &release_body(TAG, None)));
    h.track(issue(11, &release_body(TAG, None)));

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    let duplicates: Vec<bool> = outcome
        .results
        .iter()
        .map(|r| r.process.is_duplicate())
        .collect();
    assert_eq!(duplicates, [false, false, true, true]);
    assert_eq!(outcome.results[2].process.bot_advice()[0], DUPLICATE_MARKER);
    assert!(outcome.results[0].process.bot_advice().is_empty());
    assert_eq!(outcome.summary.duplicates, 2);
}

#[tokio::test]
async fn unrecognized_issues_are_never_duplicates() {
    let h = Harness::new();
    h.track(issue(12, "one"));
    h.track(issue(13, "two"));

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    assert!(outcome.results.iter().all(|r| !r.process.is_duplicate()));
}

#[tokio::test]
async fn concurrent_runs_keep_order() {
    let mut h = Harness::new();
    h.config.concurrency = 4;
    h.add_spec(false, TAG);
    for number in 20..30 {
        let mut issue = issue(number, &release_body(TAG, None));
        issue.created_at = days_ago(1);
        h.track(issue);
        h.tracker.add_comment(
            number,
            Comment {
                author: "bob".to_string(),
                updated_at: days_ago(0),
            },
        );
    }

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    let numbers: Vec<u64> = outcome.results.iter().map(|r| r.process.number()).collect();
    assert_eq!(numbers, (20..30).collect::<Vec<_>>());
    assert_eq!(outcome.summary.duplicates, 9);
}

#[tokio::test]
async fn report_rows_follow_results() {
    let h = Harness::new();
    h.add_spec(false, TAG);
    h.track(issue(40, &release_body(TAG, None)));
    h.track(issue(41, &release_body(TAG, None)));

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();
    let rows = outcome.report_rows();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].package, "azure-mgmt-storage");
    assert_eq!(rows[1].bot_advice, [DUPLICATE_MARKER]);
}

#[tokio::test]
async fn closed_issues_are_not_listed() {
    let h = Harness::new();
    let mut closed = issue(50, "");
    closed.state = IssueState::Closed;
    h.track(closed);

    let outcome = Batch::new(h.ctx()).run_at(now()).await.unwrap();

    assert!(outcome.results.is_empty());
    assert!(!h
        .tracker
        .mutations()
        .iter()
        .any(|m| matches!(m, Mutation::Close { .. })));
}
