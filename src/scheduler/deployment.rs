use chrono::{DateTime, Utc};
use crate::errors::RemediationError;
use super::schedule::CronSchedule;

/// A named way of triggering the flow: on a cron schedule, or on demand
/// only when `schedule` is `None`.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub schedule: Option<CronSchedule>,
}

impl Deployment {
    pub fn scheduled(name: impl Into<String>, schedule: CronSchedule) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: Vec::new(),
            schedule: Some(schedule),
        }
    }

    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: Vec::new(),
            schedule: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.as_ref().and_then(|s| s.next_after(after))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentRegistry {
    deployments: Vec<Deployment>,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, deployment: Deployment) -> Result<(), RemediationError> {
        if self.get(&deployment.name).is_some() {
            return Err(RemediationError::Schedule(format!(
                "deployment '{}' is already registered",
                deployment.name
            )));
        }
        self.deployments.push(deployment);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deployment> {
        self.deployments.iter()
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }

    /// Earliest upcoming fire across all scheduled deployments.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<(&Deployment, DateTime<Utc>)> {
        self.deployments
            .iter()
            .filter_map(|d| d.next_fire(after).map(|at| (d, at)))
            .min_by_key(|(_, at)| *at)
    }
}
