//! Per-scenario fallback tables
//!
//! A failed step is looked up in its scenario's table. The first rule whose
//! step and error class match names the recovery to run; no match means the
//! error propagates.

use serde::Serialize;

use super::Scenario;
use crate::error::{Error, ErrorKind};

/// A facade call that may have a fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Clone,
    Pull,
    CreateRemote,
}

/// Which failures a rule reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMatch {
    /// Any error raised by the version-control engine
    AnyEngine,
    /// Only errors of this class
    Kind(ErrorKind),
}

impl ErrorMatch {
    pub fn matches(&self, err: &Error) -> bool {
        match self {
            ErrorMatch::AnyEngine => err.is_engine(),
            ErrorMatch::Kind(kind) => err.kind() == *kind,
        }
    }
}

/// What to do after a matched failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Open the repository already present at the scenario path
    OpenExisting,
    /// Add an "origin" remote pointing at the scenario URL
    AddOrigin,
    /// Read the existing origin, then pull, pull and push again
    ReuseOriginAndResync,
}

/// One row of a fallback table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRule {
    pub step: Step,
    pub on: ErrorMatch,
    pub then: Recovery,
}

const CREATE_BRANCH_RULES: &[FallbackRule] = &[FallbackRule {
    step: Step::Clone,
    on: ErrorMatch::AnyEngine,
    then: Recovery::OpenExisting,
}];

const PULL_RULES: &[FallbackRule] = &[
    FallbackRule {
        step: Step::Clone,
        on: ErrorMatch::Kind(ErrorKind::Command),
        then: Recovery::OpenExisting,
    },
    FallbackRule {
        step: Step::Pull,
        on: ErrorMatch::Kind(ErrorKind::MissingRemote),
        then: Recovery::AddOrigin,
    },
    FallbackRule {
        step: Step::CreateRemote,
        on: ErrorMatch::Kind(ErrorKind::Command),
        then: Recovery::ReuseOriginAndResync,
    },
];

impl Scenario {
    /// The fallback table for this scenario; empty when every failure is fatal
    pub fn fallbacks(&self) -> &'static [FallbackRule] {
        match self {
            Scenario::CreateBranch => CREATE_BRANCH_RULES,
            Scenario::Pull => PULL_RULES,
            _ => &[],
        }
    }
}

/// First rule in `rules` covering a failure of `step` with `err`
pub fn find_rule<'a>(rules: &'a [FallbackRule], step: Step, err: &Error) -> Option<&'a FallbackRule> {
    rules
        .iter()
        .find(|rule| rule.step == step && rule.on.matches(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_error() -> Error {
        Error::Command {
            command: "clone".to_string(),
            message: "destination path already exists".to_string(),
        }
    }

    #[test]
    fn test_create_branch_opens_on_any_engine_error() {
        let rules = Scenario::CreateBranch.fallbacks();

        let generic = Error::Git(git2::Error::from_str("corrupt"));
        let rule = find_rule(rules, Step::Clone, &generic).unwrap();
        assert_eq!(rule.then, Recovery::OpenExisting);
        assert!(find_rule(rules, Step::Clone, &command_error()).is_some());

        // configuration problems are not engine errors
        let config = Error::Config("bad url".to_string());
        assert!(find_rule(rules, Step::Clone, &config).is_none());
    }

    #[test]
    fn test_pull_ladder_order() {
        let steps: Vec<_> = Scenario::Pull
            .fallbacks()
            .iter()
            .map(|rule| (rule.step, rule.then))
            .collect();
        assert_eq!(
            steps,
            vec![
                (Step::Clone, Recovery::OpenExisting),
                (Step::Pull, Recovery::AddOrigin),
                (Step::CreateRemote, Recovery::ReuseOriginAndResync),
            ]
        );
    }

    #[test]
    fn test_pull_rules_match_specific_classes() {
        let rules = Scenario::Pull.fallbacks();

        // only command failures fall back on clone
        let generic = Error::Git(git2::Error::from_str("corrupt"));
        assert!(find_rule(rules, Step::Clone, &generic).is_none());
        assert!(find_rule(rules, Step::Clone, &command_error()).is_some());

        let missing = Error::MissingRemote {
            name: "origin".to_string(),
        };
        assert_eq!(
            find_rule(rules, Step::Pull, &missing).unwrap().then,
            Recovery::AddOrigin
        );
        let conflict = Error::MergeConflict {
            message: "README.md".to_string(),
        };
        assert!(find_rule(rules, Step::Pull, &conflict).is_none());

        assert_eq!(
            find_rule(rules, Step::CreateRemote, &command_error())
                .unwrap()
                .then,
            Recovery::ReuseOriginAndResync
        );
    }

    #[test]
    fn test_other_scenarios_have_no_fallbacks() {
        for scenario in [
            Scenario::RepoInit,
            Scenario::OpenExisting,
            Scenario::CloneHttps,
            Scenario::CloneSsh,
            Scenario::Commit,
            Scenario::SwitchBranch,
            Scenario::Push,
        ] {
            assert!(scenario.fallbacks().is_empty(), "{}", scenario);
        }
    }
}
