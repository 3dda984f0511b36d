use anyhow::{Context, Result};
use log::{debug, info};

use crate::concat::concatenate;
use crate::config::{Config, JobConfig};

/// Runs the configured concatenation jobs strictly sequentially, in the
/// order they were declared. Jobs are independent: a failing job aborts the
/// run, but bundles written by earlier jobs remain on disk.
#[derive(Debug)]
pub struct DistOrchestrator {
    config: Config,
}

impl DistOrchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run every configured job. Stops at the first failure.
    pub fn run(&self) -> Result<()> {
        info!("Generating {} bundle(s)", self.config.jobs.len());

        for job in &self.config.jobs {
            self.run_job(job)?;
        }

        Ok(())
    }

    fn run_job(&self, job: &JobConfig) -> Result<()> {
        info!(
            "Bundling {} file(s) into {}",
            job.src.len(),
            job.out.display()
        );
        for source in &job.src {
            debug!("  + {}", source.display());
        }

        concatenate(&job.out, &job.src)
            .with_context(|| format!("Failed to generate bundle {:?}", job.out))?;

        info!("Wrote {}", job.out.display());
        Ok(())
    }
}
