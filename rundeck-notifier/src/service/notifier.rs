//! Build notifier
//!
//! Runs once per finished build:
//! 1. skip builds that did not succeed
//! 2. look for a configured tag in the change log
//! 3. build the job options from the settings and the build context
//! 4. trigger the job and, when asked to, wait for it to finish
//! 5. decide whether the local build should be failed
//!
//! Progress goes to the build log with fixed wording. Existing log scrapers
//! match on these lines, so keep them stable.

use rundeck_client::RundeckApi;
use rundeck_core::domain::build::{BuildInfo, BuildResult};
use rundeck_core::domain::execution::Execution;
use rundeck_core::domain::job::Job;
use rundeck_core::dto::run::RunJob;
use rundeck_core::options::parse_options;
use rundeck_core::tags::{TagMatch, find_tag};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::{InstanceRegistry, NotifierConfig, TriggerSettings};
use crate::error::{NotifierError, Result};
use crate::scheduler::clock::{Sleeper, TokioSleeper};
use crate::scheduler::tracker::{ExecutionTracker, TrackedOutcome};
use crate::service::build_log::BuildLog;
use crate::service::job_cache::CachedRundeckApi;

/// Why a build was not notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BuildNotSuccessful,
    NoTagFound,
}

/// What happened for one build
#[derive(Debug)]
pub enum NotificationOutcome {
    Skipped(SkipReason),
    /// Job triggered, execution not followed
    Triggered { execution: Execution },
    /// Job triggered and followed to its end
    Completed(TrackedOutcome),
    Failed(NotifierError),
}

/// Link from the build to the Rundeck execution it started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildBadge {
    pub execution_id: i64,
    pub url: Option<String>,
}

/// Result of notifying Rundeck for one build
#[derive(Debug)]
pub struct NotificationReport {
    pub outcome: NotificationOutcome,
    /// Present once an execution has been started
    pub badge: Option<BuildBadge>,
    /// Whether the local build must be marked as failed
    pub fail_build: bool,
}

impl NotificationReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: NotificationOutcome::Skipped(reason),
            badge: None,
            fail_build: false,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, NotificationOutcome::Skipped(_))
    }
}

/// Triggers a Rundeck job for finished builds
pub struct Notifier {
    settings: TriggerSettings,
    tags: Vec<String>,
    api: Arc<dyn RundeckApi>,
    sleeper: Arc<dyn Sleeper>,
    poll_interval: Duration,
}

impl Notifier {
    pub fn new(settings: TriggerSettings, api: Arc<dyn RundeckApi>, config: &NotifierConfig) -> Self {
        let tags = settings.tags();
        Self {
            settings,
            tags,
            api,
            sleeper: Arc::new(TokioSleeper),
            poll_interval: config.poll_interval,
        }
    }

    /// Creates a notifier talking to the instance named in `settings`
    ///
    /// Per-trigger credentials replace the instance defaults. Job lookups
    /// go through the cache when it is enabled.
    pub fn from_registry(
        settings: TriggerSettings,
        registry: &InstanceRegistry,
        config: &NotifierConfig,
    ) -> Result<Self> {
        settings.validate()?;
        let client = registry.client_for(&settings.instance, settings.credentials())?;

        let api: Arc<dyn RundeckApi> = if config.job_cache.enabled {
            Arc::new(CachedRundeckApi::new(Arc::new(client), config.job_cache))
        } else {
            Arc::new(client)
        };

        Ok(Self::new(settings, api, config))
    }

    /// Replaces the sleeper used between polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> &TriggerSettings {
        &self.settings
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// URL of the Rundeck instance in use
    pub fn url(&self) -> &str {
        self.api.url()
    }

    /// Builds the trigger request for `build`
    pub fn run_request(&self, build: &BuildInfo) -> RunJob {
        let context = build.substitutions();
        RunJob::new(self.settings.job_id.clone())
            .with_options(parse_options(self.settings.options.as_deref(), &context))
            .with_node_filters(parse_options(self.settings.node_filters.as_deref(), &context))
    }

    /// Notifies Rundeck for a finished build
    ///
    /// Never returns an error: failures are written to the build log and
    /// reported through the outcome.
    pub async fn perform(&self, build: &BuildInfo, log: &dyn BuildLog) -> NotificationReport {
        if build.result != BuildResult::Success {
            debug!("Build {} did not succeed, not notifying", build.display_name());
            return NotificationReport::skipped(SkipReason::BuildNotSuccessful);
        }

        match find_tag(&self.tags, build) {
            TagMatch::NotFound => {
                debug!("No tag found for build {}", build.display_name());
                return NotificationReport::skipped(SkipReason::NoTagFound);
            }
            TagMatch::Unconditional => log.println("Notifying Rundeck..."),
            TagMatch::Found {
                tag,
                author,
                upstream,
                ..
            } => {
                let upstream = upstream
                    .map(|name| format!(" in upstream build ({})", name))
                    .unwrap_or_default();
                log.println(&format!(
                    "Found {} in changelog (from {}){} - Notifying Rundeck...",
                    tag,
                    author.as_deref().unwrap_or("unknown"),
                    upstream
                ));
            }
        }

        let run = self.run_request(build);
        let mut tracker =
            ExecutionTracker::new(self.api.as_ref(), self.sleeper.as_ref(), self.poll_interval);

        let execution = match tracker.trigger(&run).await {
            Ok(execution) => execution.clone(),
            Err(err) => return self.failure(err, None, log),
        };

        log.println(&format!(
            "Notification succeeded ! Execution #{}, at {} (status : {})",
            execution.id,
            execution.url.as_deref().unwrap_or(""),
            execution.status
        ));
        let badge = Some(BuildBadge {
            execution_id: execution.id,
            url: execution.url.clone(),
        });

        if !self.settings.wait_for_job {
            return NotificationReport {
                outcome: NotificationOutcome::Triggered { execution },
                badge,
                fail_build: false,
            };
        }

        log.println("Waiting for Rundeck execution to finish...");
        match tracker.wait_for_completion().await {
            Ok(outcome) => {
                let finished = match outcome.execution.duration_words() {
                    Some(words) => format!("finished in {}", words),
                    None => "finished".to_string(),
                };
                log.println(&format!(
                    "Rundeck execution #{} {}, with status : {}",
                    outcome.execution.id, finished, outcome.execution.status
                ));

                let fail_build = !outcome.is_success() && self.settings.fail_build_on_error;
                info!(
                    "Execution #{} ended as {:?} after {} polls",
                    outcome.execution.id, outcome.terminal, outcome.polls
                );
                NotificationReport {
                    outcome: NotificationOutcome::Completed(outcome),
                    badge,
                    fail_build,
                }
            }
            Err(err) => self.failure(err, badge, log),
        }
    }

    fn failure(
        &self,
        err: NotifierError,
        badge: Option<BuildBadge>,
        log: &dyn BuildLog,
    ) -> NotificationReport {
        let unauthorized = err.client_error().is_some_and(|e| e.is_unauthorized());
        if unauthorized {
            log.println(&format!("Login failed on {} : {}", self.api.url(), err));
        } else {
            log.println(&format!(
                "Error while talking to Rundeck's API at {} : {}",
                self.api.url(),
                err
            ));
        }
        error!("Rundeck notification for job {} failed: {}", self.settings.job_id, err);

        NotificationReport {
            outcome: NotificationOutcome::Failed(err),
            badge,
            fail_build: self.settings.fail_build_on_error,
        }
    }
}

/// Fetches a job definition, e.g. to validate a configured job id
pub async fn check_job(api: &dyn RundeckApi, job_id: &str) -> Result<Job> {
    let job = api.get_job(job_id).await?;
    debug!("Job {} resolved to {}", job_id, job);
    Ok(job)
}

/// Checks that an instance is reachable and accepts its credentials
pub async fn check_instance(api: &dyn RundeckApi) -> Result<()> {
    api.ping().await?;
    api.test_credentials().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Instance;
    use crate::scheduler::tracker::Terminal;
    use crate::scheduler::tracker::tests::{FakeRundeck, RecordingSleeper};
    use crate::service::build_log::InMemoryBuildLog;
    use rundeck_core::domain::execution::ExecutionStatus;

    const STORED_OPTIONS: &str = "#this is a comment line\n\
        #Mon Jul 11 10:12:33 CEST 2011\n\
        option1=value 1\n\
        workspace=$WORKSPACE\n\
        jobName=$JOB_NAME\n\
        buildNumber=$BUILD_NUMBER\n";

    fn notifier(settings: TriggerSettings, api: Arc<FakeRundeck>) -> Notifier {
        Notifier::new(settings, api, &NotifierConfig::default())
            .with_sleeper(Arc::new(RecordingSleeper::default()))
    }

    fn tagged(tags: &str) -> TriggerSettings {
        TriggerSettings {
            tags: Some(tags.to_string()),
            ..TriggerSettings::new("1")
        }
    }

    fn build() -> BuildInfo {
        BuildInfo::new("my project name", 1)
    }

    #[tokio::test]
    async fn test_notifies_without_tags() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(
            TriggerSettings {
                options: Some(STORED_OPTIONS.to_string()),
                tags: Some(String::new()),
                ..TriggerSettings::new("1")
            },
            api.clone(),
        );
        let log = InMemoryBuildLog::new();

        let report = notifier.perform(&build().with_change("commit message", "alice"), &log).await;

        assert!(log.contains("Notifying Rundeck..."));
        assert!(log.contains(
            "Notification succeeded ! Execution #1, at http://localhost:4440/execution/follow/1 (status : RUNNING)"
        ));
        assert_eq!(
            report.badge,
            Some(BuildBadge {
                execution_id: 1,
                url: Some("http://localhost:4440/execution/follow/1".to_string()),
            })
        );
        assert!(matches!(report.outcome, NotificationOutcome::Triggered { .. }));
        assert!(!report.fail_build);
        assert_eq!(api.runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_without_matching_tag_is_skipped() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(tagged("#deploy, #redeploy"), api.clone());
        let log = InMemoryBuildLog::new();

        let report = notifier.perform(&build(), &log).await;
        assert!(matches!(
            report.outcome,
            NotificationOutcome::Skipped(SkipReason::NoTagFound)
        ));

        let report = notifier
            .perform(&build().with_change("commit message", "alice"), &log)
            .await;

        assert!(report.is_skipped());
        assert!(report.badge.is_none());
        assert!(!log.contains("Notifying Rundeck"));
        assert!(api.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_tag_triggers() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(tagged("#deploy"), api.clone());
        let log = InMemoryBuildLog::new();

        let report = notifier
            .perform(&build().with_change("commit message - #deploy", "alice"), &log)
            .await;

        assert!(log.contains("Found #deploy in changelog (from alice) - Notifying Rundeck..."));
        assert!(log.contains("Notification succeeded !"));
        assert!(report.badge.is_some());
    }

    #[tokio::test]
    async fn test_trigger_error_fails_build_when_configured() {
        let api = Arc::new(FakeRundeck::failing("Fake error for testing"));
        let notifier = notifier(
            TriggerSettings {
                fail_build_on_error: true,
                ..tagged("#deploy")
            },
            api,
        );
        let log = InMemoryBuildLog::new();

        let report = notifier
            .perform(&build().with_change("commit message - #deploy", "alice"), &log)
            .await;

        assert!(log.contains("#deploy"));
        assert!(log.contains(
            "Error while talking to Rundeck's API at http://localhost:4440 : Fake error for testing"
        ));
        assert!(report.fail_build);
        assert!(report.badge.is_none());
        assert!(matches!(report.outcome, NotificationOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_trigger_error_keeps_build_by_default() {
        let api = Arc::new(FakeRundeck::failing("Fake error for testing"));
        let notifier = notifier(TriggerSettings::new("1"), api);
        let log = InMemoryBuildLog::new();

        let report = notifier.perform(&build(), &log).await;

        assert!(!report.fail_build);
        assert!(log.contains("Fake error for testing"));
    }

    #[tokio::test]
    async fn test_build_variables_expand_in_options() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(
            TriggerSettings {
                options: Some(STORED_OPTIONS.to_string()),
                ..TriggerSettings::new("1")
            },
            api.clone(),
        );
        let mut build = build();
        build.workspace = Some("/var/lib/ci/workspace".to_string());

        notifier.perform(&build, &InMemoryBuildLog::new()).await;

        let runs = api.runs.lock().unwrap();
        let options = &runs[0].options;
        assert_eq!(options.len(), 4);
        assert_eq!(options.get("option1"), Some("value 1"));
        assert_eq!(options.get("buildNumber"), Some("1"));
        assert_eq!(options.get("jobName"), Some("my project name"));
        assert_eq!(options.get("workspace"), Some("/var/lib/ci/workspace"));
    }

    #[tokio::test]
    async fn test_multivalue_options_are_kept() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(
            TriggerSettings {
                options: Some("option1=value 1\nnodes=nodename1,nodename2".to_string()),
                node_filters: Some("tags=web\nname=$JOB_NAME".to_string()),
                ..TriggerSettings::new("1")
            },
            api.clone(),
        );

        notifier.perform(&build(), &InMemoryBuildLog::new()).await;

        let runs = api.runs.lock().unwrap();
        assert_eq!(runs[0].options.len(), 2);
        assert_eq!(runs[0].options.get("option1"), Some("value 1"));
        assert_eq!(runs[0].options.get("nodes"), Some("nodename1,nodename2"));
        assert_eq!(runs[0].node_filters.get("tags"), Some("web"));
        assert_eq!(runs[0].node_filters.get("name"), Some("my project name"));
    }

    #[tokio::test]
    async fn test_tag_in_upstream_build() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(tagged("#deploy"), api.clone());
        let log = InMemoryBuildLog::new();

        let mut upstream = BuildInfo::new("upstream project", 1).with_change("commit message", "bob");
        upstream.full_display_name = Some("upstream project #1".to_string());
        let report = notifier
            .perform(&build().with_upstream(upstream), &log)
            .await;
        assert!(report.is_skipped());

        let mut upstream =
            BuildInfo::new("upstream project", 2).with_change("commit message - #deploy", "bob");
        upstream.full_display_name = Some("upstream project #2".to_string());
        let report = notifier
            .perform(&build().with_upstream(upstream), &log)
            .await;

        assert!(log.contains("#deploy"));
        assert!(log.contains("in upstream build (upstream project #2)"));
        assert!(log.contains("Notification succeeded !"));
        assert!(report.badge.is_some());
    }

    #[tokio::test]
    async fn test_unsuccessful_build_is_skipped() {
        let api = Arc::new(FakeRundeck::new());
        let notifier = notifier(TriggerSettings::new("1"), api.clone());
        let log = InMemoryBuildLog::new();

        for result in [BuildResult::Failure, BuildResult::Unstable, BuildResult::Aborted] {
            let mut build = build();
            build.result = result;

            let report = notifier.perform(&build, &log).await;

            assert!(matches!(
                report.outcome,
                NotificationOutcome::Skipped(SkipReason::BuildNotSuccessful)
            ));
            assert!(!report.fail_build);
        }
        assert!(log.lines().is_empty());
        assert!(api.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_job() {
        let api = Arc::new(
            FakeRundeck::new().with_polls(vec![ExecutionStatus::Running, ExecutionStatus::Succeeded]),
        );
        let sleeper = Arc::new(RecordingSleeper::default());
        let notifier = Notifier::new(
            TriggerSettings {
                wait_for_job: true,
                ..TriggerSettings::new("1")
            },
            api,
            &NotifierConfig::default(),
        )
        .with_sleeper(sleeper.clone());
        let log = InMemoryBuildLog::new();

        let report = notifier.perform(&build(), &log).await;

        assert!(log.contains("Notification succeeded !"));
        assert!(log.contains("Waiting for Rundeck execution to finish..."));
        assert!(log.contains(
            "Rundeck execution #1 finished in 3 minutes 27 seconds, with status : SUCCEEDED"
        ));
        match report.outcome {
            NotificationOutcome::Completed(outcome) => {
                assert_eq!(outcome.terminal, Terminal::Succeeded);
                assert_eq!(outcome.polls, 2);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!report.fail_build);
        assert_eq!(
            *sleeper.sleeps.lock().unwrap(),
            vec![Duration::from_secs(5); 2]
        );
    }

    #[tokio::test]
    async fn test_failed_execution_fails_build_when_configured() {
        for (fail_build_on_error, expected) in [(true, true), (false, false)] {
            let api = Arc::new(FakeRundeck::new().with_polls(vec![ExecutionStatus::Failed]));
            let notifier = notifier(
                TriggerSettings {
                    wait_for_job: true,
                    fail_build_on_error,
                    ..TriggerSettings::new("1")
                },
                api,
            );
            let log = InMemoryBuildLog::new();

            let report = notifier.perform(&build(), &log).await;

            assert!(log.contains("Rundeck execution #1 finished, with status : FAILED"));
            assert_eq!(report.fail_build, expected);
            assert!(report.badge.is_some());
        }
    }

    #[tokio::test]
    async fn test_poll_error_keeps_badge() {
        let api = Arc::new(FakeRundeck::new());
        api.polls
            .lock()
            .unwrap()
            .push_back(Err("Bad Gateway".to_string()));
        let notifier = notifier(
            TriggerSettings {
                wait_for_job: true,
                fail_build_on_error: true,
                ..TriggerSettings::new("1")
            },
            api,
        );
        let log = InMemoryBuildLog::new();

        let report = notifier.perform(&build(), &log).await;

        assert!(log.contains("Error while talking to Rundeck's API at http://localhost:4440"));
        assert!(log.contains("Bad Gateway"));
        assert!(report.fail_build);
        assert_eq!(report.badge.map(|badge| badge.execution_id), Some(1));
    }

    #[test]
    fn test_tags_from_settings() {
        let api = Arc::new(FakeRundeck::new());
        assert_eq!(notifier(tagged("#deploy"), api.clone()).tags(), ["#deploy"]);
        assert!(notifier(TriggerSettings::new("1"), api.clone()).tags().is_empty());
        assert!(notifier(tagged("  "), api.clone()).tags().is_empty());
        assert_eq!(
            notifier(tagged("#tag1, #tag2"), api).tags(),
            ["#tag1", "#tag2"]
        );
    }

    #[test]
    fn test_from_registry() {
        let registry = InstanceRegistry::new().with_instance(
            "Default",
            Instance::new("http://localhost:4440", "admin", "admin"),
        );
        let config = NotifierConfig::default();

        let notifier = Notifier::from_registry(
            TriggerSettings {
                job_user: Some("deployer".to_string()),
                job_password: Some("secret".to_string()),
                ..TriggerSettings::new("1")
            },
            &registry,
            &config,
        )
        .unwrap();
        assert_eq!(notifier.url(), "http://localhost:4440");

        let err = Notifier::from_registry(
            TriggerSettings {
                instance: "Staging".to_string(),
                ..TriggerSettings::new("1")
            },
            &registry,
            &config,
        )
        .err()
        .unwrap();
        assert!(matches!(err, NotifierError::UnknownInstance(name) if name == "Staging"));

        let mut cached = config;
        cached.job_cache.enabled = true;
        let notifier = Notifier::from_registry(TriggerSettings::new("1"), &registry, &cached).unwrap();
        assert_eq!(notifier.url(), "http://localhost:4440");
    }

    #[tokio::test]
    async fn test_check_job() {
        let api = FakeRundeck::new();

        let job = check_job(&api, "1").await.unwrap();
        assert_eq!(job.full_name(), "group-name/job-name");

        let err = check_job(&api, "42").await.unwrap_err();
        assert_eq!(err.to_string(), "Job ID does not exist: 42");
        assert!(check_instance(&api).await.is_ok());
    }
}
