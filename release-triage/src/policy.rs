//! Triage policies.
//!
//! A policy looks at one issue's labels and timing facts and may append
//! advice for the report or queue tracker mutations. Policies never remove
//! advice, so evaluation order is report order.

use crate::labels::Label;
use crate::process::{IssueProcess, Reminder};

/// Days of inactivity before the first warning.
pub const WARN_AFTER_DAYS: i64 = 7;

/// Days of inactivity before a warned issue is closed.
pub const CLOSE_AFTER_DAYS: i64 = 15;

/// Advice shown for a degenerate generated version.
pub const BASE_BRANCH_ADVICE: &str = "new version is 0.0.0, please check base branch!";

/// A triage rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Flags multi-API packages that were not yet handed over for checking.
    MultiApi,
    /// Flags a 0.0.0 version caused by a bad base branch.
    BaseBranchAttention,
    /// Notes releases that are on schedule.
    OnTime,
    /// Notes releases that are on hold.
    HoldOn,
    /// Warns about, then closes, inactive issues.
    Remind,
}

impl Policy {
    /// Evaluates the policy against `process`.
    pub fn apply(self, process: &mut IssueProcess) {
        match self {
            Self::MultiApi => {
                if process.has_label(Label::MultiApi) && !process.has_label(Label::AutoAskCheck) {
                    process.advise("MultiAPI");
                }
            }
            Self::BaseBranchAttention => {
                if process.has_label(Label::BaseBranchAttention) {
                    process.advise(BASE_BRANCH_ADVICE);
                }
            }
            Self::OnTime => {
                if process.has_label(Label::OnTime) {
                    process.advise("On time");
                }
            }
            Self::HoldOn => {
                if process.has_label(Label::HoldOn) {
                    process.advise("Hold on");
                }
            }
            Self::Remind => remind(process),
        }
    }
}

/// Two-tier inactivity escalation. An issue without a target date is
/// treated as due far in the future and is never escalated.
fn remind(process: &mut IssueProcess) {
    let Some(days_to_target) = process.date_from_target() else {
        return;
    };
    let delay = process.delay_time();
    let warned = process.has_label(Label::SevenDayAttention);

    if delay >= CLOSE_AFTER_DAYS && warned && days_to_target < 0 {
        let body = format!(
            "hi @{}, the issue is closed since there is no reply for a long time. \
             Please reopen it if necessary or create new one.",
            process.owner()
        );
        process.comment(body);
        process.close();
        process.set_reminder(Reminder::ClosedInactive);
    } else if delay >= WARN_AFTER_DAYS && !warned && days_to_target < WARN_AFTER_DAYS {
        let body = format!(
            "hi @{}, this release-request has been delayed more than 7 days, \
             please deal with it ASAP. We will close the issue if there is still \
             no response after 7 days!",
            process.owner()
        );
        process.comment(body);
        process.add_label(Label::SevenDayAttention);
        process.set_reminder(Reminder::Warned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Intent;
    use crate::test_support::{issue, labelled, process_for};

    fn process(labels: &[&str], delay: i64, date_from_target: Option<i64>) -> IssueProcess {
        let mut process = process_for(labelled(issue(1, ""), labels));
        process.set_timing(delay, date_from_target);
        process
    }

    #[test]
    fn label_policies_append_in_order() {
        let mut process = process(&["MultiAPI", "base-branch-attention", "on time", "HoldOn"], 0, None);

        for policy in [
            Policy::MultiApi,
            Policy::BaseBranchAttention,
            Policy::OnTime,
            Policy::HoldOn,
        ] {
            policy.apply(&mut process);
        }

        assert_eq!(
            process.bot_advice(),
            ["MultiAPI", BASE_BRANCH_ADVICE, "On time", "Hold on"]
        );
        assert!(process.pending_intents().is_empty());
    }

    #[test]
    fn multi_api_is_quiet_once_handed_over() {
        let mut process = process(&["MultiAPI", "auto-ask-check"], 0, None);
        Policy::MultiApi.apply(&mut process);
        assert!(process.bot_advice().is_empty());
    }

    #[test]
    fn warns_after_a_week_of_inactivity() {
        let mut process = process(&[], 7, Some(6));

        Policy::Remind.apply(&mut process);

        assert_eq!(process.reminder(), Some(Reminder::Warned));
        assert!(process.has_label(Label::SevenDayAttention));
        assert!(matches!(
            process.pending_intents(),
            [Intent::Comment(body), Intent::AddLabel(Label::SevenDayAttention)]
                if body.starts_with("hi @alice, this release-request has been delayed more than 7 days")
        ));
        assert!(process.is_open());
    }

    #[test]
    fn does_not_warn_when_target_is_far_away() {
        let mut process = process(&[], 30, Some(7));
        Policy::Remind.apply(&mut process);
        assert_eq!(process.reminder(), None);
        assert!(process.pending_intents().is_empty());
    }

    #[test]
    fn does_not_warn_twice() {
        let mut process = process(&["7days attention"], 10, Some(-1));
        Policy::Remind.apply(&mut process);
        assert_eq!(process.reminder(), None);
    }

    #[test]
    fn closes_after_two_weeks_once_warned_and_overdue() {
        let mut process = process(&["7days attention"], 15, Some(-1));

        Policy::Remind.apply(&mut process);

        assert_eq!(process.reminder(), Some(Reminder::ClosedInactive));
        assert!(!process.is_open());
        assert!(matches!(
            process.pending_intents(),
            [Intent::Comment(body), Intent::Close]
                if body == "hi @alice, the issue is closed since there is no reply for a long time. \
                            Please reopen it if necessary or create new one."
        ));
    }

    #[test]
    fn never_closes_before_target_date() {
        let mut process = process(&["7days attention"], 40, Some(0));
        Policy::Remind.apply(&mut process);
        assert!(process.is_open());
        assert_eq!(process.reminder(), None);
    }

    #[test]
    fn never_closes_without_warning() {
        let mut process = process(&[], 40, Some(-10));

        Policy::Remind.apply(&mut process);

        assert!(process.is_open());
        assert_eq!(process.reminder(), Some(Reminder::Warned));
    }

    #[test]
    fn no_target_date_never_escalates() {
        let mut process = process(&["7days attention"], 100, None);
        Policy::Remind.apply(&mut process);

        let mut unwarned = self::process(&[], 100, None);
        Policy::Remind.apply(&mut unwarned);

        assert!(process.pending_intents().is_empty());
        assert!(unwarned.pending_intents().is_empty());
    }
}
