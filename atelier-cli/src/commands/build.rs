//! Build command - run a collaboration and publish the approved page

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use atelier_core::agent::{default_crew, BackendRegistry};
use atelier_core::{
    Config, DecisionOutcome, Publisher, Role, Secrets, SessionStore, TurnScheduler,
};
use atelier_publish::{GitPublisher, ScriptPublisher};

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// The request describing the web page to build
    #[arg(required = true)]
    pub request: String,

    /// Repository the approved artifact is published into
    /// (defaults to the configured repo_path)
    #[arg(short = 'd', long)]
    pub repo: Option<PathBuf>,

    /// Preview only: print the artifact instead of publishing
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildArgs {
    /// Execute the build command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        if verbose {
            tracing::info!(
                request = %self.request,
                dry_run = self.dry_run,
                "Starting atelier build"
            );
        }

        let secrets = Secrets::load()?;
        let registry = BackendRegistry::from_config(&config.backend, &secrets)?;
        let backend = registry
            .get_by_kind(config.backend.kind)
            .ok_or_else(|| anyhow::anyhow!("No backend registered for {}", config.backend.kind))?;

        let scheduler = TurnScheduler::with_config(default_crew(backend), &config.orchestration);
        let publisher = self.build_publisher(config, &secrets);
        let store = SessionStore::new(scheduler, publisher);

        println!("Atelier Build");
        println!("=============");
        println!();
        println!("Request: {}", self.request);
        println!();
        println!("Crew:");
        for role in Role::agents() {
            println!("  {:<22} {}", role.agent_name(), role.description());
        }
        println!();
        println!("Agents are collaborating...");
        println!();

        let (id, result) = store.start_session(&self.request).await?;

        for message in &result.messages {
            println!("[{}]", message.role.agent_name());
            println!("{}", message.content.trim_end());
            println!();
        }

        if !result.ready_for_approval {
            println!(
                "Could not complete the collaboration within {} turns.",
                config.orchestration.max_turns
            );
            println!("Re-run with a higher --max-turns to give the agents more budget.");
            return Ok(());
        }

        println!("The Product Owner marked the result ready for approval.");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("Type 'APPROVED' to publish (Ctrl-D to abandon): ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                println!("Abandoned. The session stays pending.");
                return Ok(());
            };

            match store.submit_decision(id, &line).await {
                Ok(DecisionOutcome::Approved) => {
                    println!("Approved. The page has been published.");
                    store.retire_session(id).await?;
                    return Ok(());
                }
                Ok(DecisionOutcome::Rejected) => {
                    println!("Please type 'APPROVED' exactly to confirm.");
                }
                Err(e) => {
                    // Publish failed; the approval gate is still pending
                    println!("Could not publish: {}", e);
                    println!("The approval is still pending - you can try again.");
                }
            }
        }
    }

    fn build_publisher(&self, config: &Config, secrets: &Secrets) -> Arc<dyn Publisher> {
        if self.dry_run {
            return Arc::new(PreviewPublisher);
        }

        let repo = self
            .repo
            .clone()
            .unwrap_or_else(|| config.publish.repo_path.clone());

        match &config.publish.push_script {
            Some(script) => Arc::new(
                ScriptPublisher::new(script, repo)
                    .with_artifact_file(&config.publish.artifact_file),
            ),
            None => Arc::new(
                GitPublisher::new(repo)
                    .with_artifact_file(&config.publish.artifact_file)
                    .with_remote(&config.publish.remote)
                    .with_branch(&config.publish.branch)
                    .with_token(secrets.git_token()),
            ),
        }
    }
}

/// Publisher used by --dry-run: prints the artifact instead of pushing it
struct PreviewPublisher;

#[async_trait::async_trait]
impl Publisher for PreviewPublisher {
    fn name(&self) -> &'static str {
        "preview"
    }

    async fn publish(&self, artifact: &str) -> atelier_core::Result<()> {
        println!();
        println!("--- artifact preview (dry run) ---");
        println!("{}", artifact);
        println!("--- end preview ---");
        Ok(())
    }
}
