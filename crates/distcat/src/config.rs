use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::combine::Combine;
use crate::dirs::{system_config_file, user_distcat_config_dir};

/// One concatenation job: a destination bundle and its ordered source list.
///
/// Order matters and duplicates are allowed; each occurrence of a source
/// contributes its content again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Destination bundle path
    pub out: PathBuf,

    /// Source files, concatenated in this order
    pub src: Vec<PathBuf>,
}

impl JobConfig {
    pub fn new(out: impl Into<PathBuf>, src: Vec<PathBuf>) -> Self {
        Self {
            out: out.into(),
            src,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Concatenation jobs, executed sequentially in declared order
    pub jobs: Vec<JobConfig>,
}

impl Default for Config {
    fn default() -> Self {
        // The stock notification.js distribution: one CSS bundle and one JS
        // bundle, each assembled from its pre-minified fragment.
        Self {
            jobs: vec![
                JobConfig::new(
                    "dist/notification.min.css",
                    vec![PathBuf::from("notification.min.css")],
                ),
                JobConfig::new(
                    "dist/notification.min.js",
                    vec![PathBuf::from("notification.min.js")],
                ),
            ],
        }
    }
}

impl Combine for Config {
    fn combine(self, other: Self) -> Self {
        Self {
            // A non-default job list in self completely replaces the lower
            // precedence list; merging would interleave unrelated bundles.
            jobs: if self.jobs != Self::default().jobs {
                self.jobs
            } else {
                other.jobs
            },
        }
    }
}

impl Config {
    /// Load a single config file from a path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    fn try_load_and_combine<P: AsRef<Path>>(
        config: &mut Self,
        path: P,
        context: &str,
    ) -> Result<()> {
        if path.as_ref().exists() {
            log::debug!("Loading {} from: {:?}", context, path.as_ref());
            let loaded = Self::load_from_file(&path)
                .with_context(|| format!("Failed to load {} from {:?}", context, path.as_ref()))?;
            *config = loaded.combine(config.clone());
        }
        Ok(())
    }

    /// Load configuration with hierarchical precedence:
    /// 1. CLI-provided config path (highest precedence)
    /// 2. Project config (distcat.toml in current directory)
    /// 3. User config (~/.config/distcat/distcat.toml)
    /// 4. System config (/etc/distcat/distcat.toml or equivalent)
    /// 5. Default values (lowest precedence)
    pub fn load(cli_config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load system config (lowest precedence)
        if let Some(system_config_path) = system_config_file() {
            Self::try_load_and_combine(&mut config, &system_config_path, "system config")?;
        }

        // 2. Load user config
        if let Some(user_config_dir) = user_distcat_config_dir() {
            let user_config_path = user_config_dir.join("distcat.toml");
            Self::try_load_and_combine(&mut config, &user_config_path, "user config")?;
        }

        // 3. Load project config (distcat.toml in current directory)
        let project_config_path = PathBuf::from("distcat.toml");
        Self::try_load_and_combine(&mut config, &project_config_path, "project config")?;

        // 4. Load CLI-provided config (highest precedence)
        if let Some(cli_config_path) = cli_config_path {
            Self::try_load_and_combine(&mut config, cli_config_path, "CLI config")?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the job list: at least one job, every job has sources, and
    /// no two jobs write the same bundle.
    pub fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            bail!("No concatenation jobs configured");
        }

        let mut destinations: IndexSet<&Path> = IndexSet::new();
        for job in &self.jobs {
            if job.src.is_empty() {
                bail!("Job {:?} declares no source files", job.out);
            }
            if !destinations.insert(job.out.as_path()) {
                bail!("Multiple jobs write the same destination: {:?}", job.out);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_declares_css_and_js_bundles() {
        let config = Config::default();

        assert_eq!(config.jobs.len(), 2);
        assert_eq!(
            config.jobs[0].out,
            PathBuf::from("dist/notification.min.css")
        );
        assert_eq!(
            config.jobs[0].src,
            vec![PathBuf::from("notification.min.css")]
        );
        assert_eq!(config.jobs[1].out, PathBuf::from("dist/notification.min.js"));
        assert_eq!(
            config.jobs[1].src,
            vec![PathBuf::from("notification.min.js")]
        );
    }

    #[test]
    fn combine_prefers_non_default_jobs() {
        let custom = Config {
            jobs: vec![JobConfig::new("dist/app.min.js", vec!["a.js".into()])],
        };

        let combined = custom.clone().combine(Config::default());
        assert_eq!(combined.jobs, custom.jobs);

        // A default self defers to the other side.
        let combined = Config::default().combine(custom.clone());
        assert_eq!(combined.jobs, custom.jobs);
    }

    #[test]
    fn parses_jobs_from_toml() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [[jobs]]
            out = "dist/bundle.min.css"
            src = ["reset.min.css", "theme.min.css"]

            [[jobs]]
            out = "dist/bundle.min.js"
            src = ["core.min.js"]
            "#,
        )?;

        assert_eq!(config.jobs.len(), 2);
        assert_eq!(
            config.jobs[0].src,
            vec![
                PathBuf::from("reset.min.css"),
                PathBuf::from("theme.min.css")
            ]
        );
        Ok(())
    }

    #[test]
    fn validate_rejects_empty_source_list() {
        let config = Config {
            jobs: vec![JobConfig::new("dist/empty.css", vec![])],
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no source files"));
    }

    #[test]
    fn validate_rejects_duplicate_destinations() {
        let config = Config {
            jobs: vec![
                JobConfig::new("dist/app.min.js", vec!["a.js".into()]),
                JobConfig::new("dist/app.min.js", vec!["b.js".into()]),
            ],
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("same destination"));
    }

    #[test]
    fn validate_allows_duplicate_sources_within_a_job() {
        let config = Config {
            jobs: vec![JobConfig::new(
                "dist/app.min.js",
                vec!["a.js".into(), "a.js".into()],
            )],
        };

        assert!(config.validate().is_ok());
    }
}
