//! # Config Applier
//!
//! Applies the YAML documents under `iam/`, `cloudrun/` and `cloudbuild/` to a project.
//!
//! Each document becomes one or more one-shot remote calls:
//!
//! - **IAM**: for every binding, fetch the project policy, append the binding and
//!   write the policy back. Nothing is de-duplicated, so re-applying a file adds the
//!   binding again.
//! - **Cloud Run**: create the service described by the file. Existing services are not
//!   updated.
//! - **Cloud Build**: create the trigger described by the file.
//!
//! Every failure is logged and returned; the first failing file stops the run.

mod discovery;

pub use discovery::find_yaml_files;

use crate::config::{
    load_document, CloudBuildConfig, CloudRunConfig, IamConfig, ToolConfig,
};
use crate::provider::gcp::create_applier_providers;
use crate::provider::{
    Binding, Build, BuildStep, BuildTrigger, CloudBuildProvider, CloudRunProvider, Container,
    EnvVar, IamPolicyProvider, ResourceRequirements, RevisionTemplate, Service,
};
use anyhow::Result;
use std::fmt;
use std::path::Path;
use tracing::{error, info, info_span, warn, Instrument};

/// The three config directories, in the order they are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    Iam,
    CloudRun,
    CloudBuild,
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 3] = [ConfigKind::Iam, ConfigKind::CloudRun, ConfigKind::CloudBuild];

    /// Directory name relative to the config root
    pub fn dir_name(self) -> &'static str {
        match self {
            ConfigKind::Iam => "iam",
            ConfigKind::CloudRun => "cloudrun",
            ConfigKind::CloudBuild => "cloudbuild",
        }
    }

    /// Label used in log and error messages
    pub fn label(self) -> &'static str {
        match self {
            ConfigKind::Iam => "IAM",
            ConfigKind::CloudRun => "Cloud Run",
            ConfigKind::CloudBuild => "Cloud Build",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Files applied per kind, plus directories that were missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub iam_files: usize,
    pub cloudrun_files: usize,
    pub cloudbuild_files: usize,
    pub skipped_dirs: Vec<String>,
}

impl ApplySummary {
    fn record(&mut self, kind: ConfigKind) {
        match kind {
            ConfigKind::Iam => self.iam_files += 1,
            ConfigKind::CloudRun => self.cloudrun_files += 1,
            ConfigKind::CloudBuild => self.cloudbuild_files += 1,
        }
    }

    pub fn total_files(&self) -> usize {
        self.iam_files + self.cloudrun_files + self.cloudbuild_files
    }
}

/// Applies config documents to one project through the provider traits
#[derive(Debug)]
pub struct ConfigApplier {
    project_id: String,
    iam: Box<dyn IamPolicyProvider>,
    run: Box<dyn CloudRunProvider>,
    build: Box<dyn CloudBuildProvider>,
}

impl ConfigApplier {
    pub fn new(
        project_id: impl Into<String>,
        iam: Box<dyn IamPolicyProvider>,
        run: Box<dyn CloudRunProvider>,
        build: Box<dyn CloudBuildProvider>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            iam,
            run,
            build,
        }
    }

    /// Build an applier backed by the GCP REST clients
    ///
    /// # Errors
    /// Returns an error if the clients cannot be created
    pub fn from_config(project_id: &str, config: &ToolConfig) -> Result<Self> {
        let providers = create_applier_providers(project_id, config)?;
        Ok(Self::new(
            project_id,
            providers.iam,
            providers.run,
            providers.build,
        ))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Apply every `*.yaml` file under `<root>/iam`, `<root>/cloudrun` and `<root>/cloudbuild`
    ///
    /// Missing directories are skipped with a warning.
    ///
    /// # Errors
    /// Returns the first error raised by a file; later files are not processed
    pub async fn apply_all(&self, root: &Path) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();

        for kind in ConfigKind::ALL {
            let dir = root.join(kind.dir_name());
            if !dir.exists() {
                warn!("Directory {} does not exist, skipping...", kind.dir_name());
                summary.skipped_dirs.push(kind.dir_name().to_string());
                continue;
            }

            for yaml_file in find_yaml_files(&dir)? {
                info!("Processing {}", yaml_file.display());
                self.apply(kind, &yaml_file).await?;
                summary.record(kind);
            }
        }

        Ok(summary)
    }

    /// Apply one file of the given kind
    ///
    /// # Errors
    /// Returns an error if the file cannot be loaded or a remote call fails
    pub async fn apply(&self, kind: ConfigKind, path: &Path) -> Result<()> {
        let span = info_span!("apply", kind = kind.dir_name(), file = %path.display());
        let result = async {
            match kind {
                ConfigKind::Iam => self.try_apply_iam(path).await.map(|_| ()),
                ConfigKind::CloudRun => self.try_apply_cloudrun(path).await,
                ConfigKind::CloudBuild => self.try_apply_cloudbuild(path).await,
            }
        }
        .instrument(span)
        .await;

        result.inspect_err(|e| error!("Error applying {} config: {e:#}", kind.label()))
    }

    /// Apply IAM bindings from a YAML file; returns the number of bindings applied
    ///
    /// # Errors
    /// Returns an error if the file cannot be loaded or a policy call fails
    pub async fn apply_iam_config(&self, path: &Path) -> Result<usize> {
        self.try_apply_iam(path)
            .await
            .inspect_err(|e| error!("Error applying IAM config: {e:#}"))
    }

    /// Create the Cloud Run service described by a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be loaded or the create call fails
    pub async fn apply_cloudrun_config(&self, path: &Path) -> Result<()> {
        self.try_apply_cloudrun(path)
            .await
            .inspect_err(|e| error!("Error applying Cloud Run config: {e:#}"))
    }

    /// Create the Cloud Build trigger described by a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be loaded or the create call fails
    pub async fn apply_cloudbuild_config(&self, path: &Path) -> Result<()> {
        self.try_apply_cloudbuild(path)
            .await
            .inspect_err(|e| error!("Error applying Cloud Build config: {e:#}"))
    }

    async fn try_apply_iam(&self, path: &Path) -> Result<usize> {
        let config: IamConfig = load_document(path)?;

        for binding in &config.bindings {
            // Read-modify-write per binding, last writer wins
            let mut policy = self.iam.get_iam_policy().await?;
            policy.bindings.push(Binding {
                role: binding.role.clone(),
                members: binding.members.clone(),
                condition: None,
            });
            self.iam.set_iam_policy(&policy).await?;
            info!("Applied IAM binding for role: {}", binding.role);
        }

        Ok(config.bindings.len())
    }

    async fn try_apply_cloudrun(&self, path: &Path) -> Result<()> {
        let config: CloudRunConfig = load_document(path)?;
        let service = build_service(&self.project_id, &config);

        self.run
            .create_service(&config.location, &config.name, &service)
            .await?;
        info!("Applied Cloud Run config for service: {}", config.name);
        Ok(())
    }

    async fn try_apply_cloudbuild(&self, path: &Path) -> Result<()> {
        let config: CloudBuildConfig = load_document(path)?;
        let trigger = build_trigger(&config);

        let created = self.build.create_build_trigger(&trigger).await?;
        if !created.id.is_empty() {
            info!(trigger.id = %created.id, "Created Cloud Build trigger");
        }
        info!("Applied Cloud Build config for trigger: {}", config.name);
        Ok(())
    }
}

/// Service descriptor with a single container built from the document
pub fn build_service(project_id: &str, config: &CloudRunConfig) -> Service {
    let env = config
        .env
        .iter()
        .map(|var| EnvVar {
            name: var.name.clone(),
            value: var.value.0.clone(),
        })
        .collect();

    let resources = config.resources.as_ref().map(|resources| ResourceRequirements {
        limits: resources
            .limits
            .iter()
            .map(|(key, value)| (key.clone(), value.0.clone()))
            .collect(),
    });

    Service {
        name: paths::gcp::service_name(project_id, &config.location, &config.name),
        template: RevisionTemplate {
            containers: vec![Container {
                image: config.image.clone(),
                env,
                resources,
            }],
        },
    }
}

/// Trigger descriptor whose build runs the document's steps in order
pub fn build_trigger(config: &CloudBuildConfig) -> BuildTrigger {
    BuildTrigger {
        id: String::new(),
        name: config.name.clone(),
        description: config.description.clone(),
        build: Build {
            steps: config
                .steps
                .iter()
                .map(|step| BuildStep {
                    name: step.name.clone(),
                    args: step.args.iter().map(|arg| arg.0.clone()).collect(),
                })
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::documents::{BuildStepConfig, EnvVarConfig, ResourcesConfig, ScalarString};
    use crate::provider::{Operation, Policy};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Debug, Default)]
    struct Calls {
        set_policies: Vec<Policy>,
        services: Vec<(String, String, Service)>,
        triggers: Vec<BuildTrigger>,
    }

    #[derive(Debug, Clone, Default)]
    struct Fake {
        policy: Arc<Mutex<Policy>>,
        calls: Arc<Mutex<Calls>>,
        fail_set_policy: bool,
    }

    #[async_trait]
    impl IamPolicyProvider for Fake {
        async fn get_iam_policy(&self) -> Result<Policy> {
            Ok(self.policy.lock().unwrap().clone())
        }

        async fn set_iam_policy(&self, policy: &Policy) -> Result<Policy> {
            if self.fail_set_policy {
                anyhow::bail!("set_iam_policy failed: HTTP 409 - etag mismatch");
            }
            *self.policy.lock().unwrap() = policy.clone();
            self.calls.lock().unwrap().set_policies.push(policy.clone());
            Ok(policy.clone())
        }
    }

    #[async_trait]
    impl CloudRunProvider for Fake {
        async fn create_service(
            &self,
            location: &str,
            service_id: &str,
            service: &Service,
        ) -> Result<Operation> {
            self.calls.lock().unwrap().services.push((
                location.to_string(),
                service_id.to_string(),
                service.clone(),
            ));
            Ok(Operation {
                name: "operations/1".to_string(),
                done: false,
            })
        }
    }

    #[async_trait]
    impl CloudBuildProvider for Fake {
        async fn create_build_trigger(&self, trigger: &BuildTrigger) -> Result<BuildTrigger> {
            self.calls.lock().unwrap().triggers.push(trigger.clone());
            Ok(trigger.clone())
        }
    }

    fn applier(fake: &Fake) -> ConfigApplier {
        ConfigApplier::new(
            "my-project",
            Box::new(fake.clone()),
            Box::new(fake.clone()),
            Box::new(fake.clone()),
        )
    }

    #[tokio::test]
    async fn test_single_binding_produces_one_policy_update() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("iam.yaml");
        fs::write(
            &path,
            "bindings:\n  - role: roles/run.invoker\n    members:\n      - user:ana@example.com\n      - group:ops@example.com\n",
        )
        .unwrap();

        let fake = Fake::default();
        let applied = applier(&fake).apply_iam_config(&path).await.unwrap();
        assert_eq!(applied, 1);

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.set_policies.len(), 1);
        let binding = &calls.set_policies[0].bindings[0];
        assert_eq!(binding.role, "roles/run.invoker");
        assert_eq!(
            binding.members,
            vec!["user:ana@example.com", "group:ops@example.com"]
        );
    }

    #[tokio::test]
    async fn test_iam_failure_is_propagated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("iam.yaml");
        fs::write(&path, "bindings:\n  - role: roles/viewer\n").unwrap();

        let fake = Fake {
            fail_set_policy: true,
            ..Fake::default()
        };
        let err = applier(&fake).apply_iam_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("etag mismatch"));
    }

    #[tokio::test]
    async fn test_apply_all_skips_missing_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("cloudbuild")).unwrap();
        fs::write(
            dir.path().join("cloudbuild").join("api.yaml"),
            "name: api\nsteps:\n  - name: gcr.io/cloud-builders/docker\n    args: [build, .]\n",
        )
        .unwrap();

        let fake = Fake::default();
        let summary = applier(&fake).apply_all(dir.path()).await.unwrap();
        assert_eq!(summary.skipped_dirs, vec!["iam", "cloudrun"]);
        assert_eq!(summary.cloudbuild_files, 1);
        assert_eq!(summary.total_files(), 1);
        assert_eq!(fake.calls.lock().unwrap().triggers[0].build.steps[0].args, vec!["build", "."]);
    }

    #[test]
    fn test_build_service_descriptor() {
        let config = CloudRunConfig {
            name: "api".to_string(),
            location: "europe-west1".to_string(),
            image: "gcr.io/my-project/api:1".to_string(),
            env: vec![EnvVarConfig {
                name: "PORT".to_string(),
                value: ScalarString("8080".to_string()),
            }],
            resources: Some(ResourcesConfig {
                limits: BTreeMap::from([("memory".to_string(), ScalarString("512Mi".to_string()))]),
            }),
        };

        let service = build_service("my-project", &config);
        assert_eq!(
            service.name,
            "projects/my-project/locations/europe-west1/services/api"
        );
        let container = &service.template.containers[0];
        assert_eq!(container.image, "gcr.io/my-project/api:1");
        assert_eq!(container.env[0].value, "8080");
        assert_eq!(container.resources.as_ref().unwrap().limits["memory"], "512Mi");
    }

    #[test]
    fn test_build_trigger_descriptor() {
        let config = CloudBuildConfig {
            name: "api-build".to_string(),
            description: Some("Build the API image".to_string()),
            steps: vec![BuildStepConfig {
                name: "gcr.io/cloud-builders/docker".to_string(),
                args: vec![ScalarString("build".to_string())],
            }],
        };
        let trigger = build_trigger(&config);
        assert!(trigger.id.is_empty());
        assert_eq!(trigger.name, "api-build");
        assert_eq!(trigger.build.steps[0].args, vec!["build"]);
    }
}
