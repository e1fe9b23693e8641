//! Reconciles the active Node.js version with the project's declaration.
//!
//! A run walks [`State`] from the declaration check to either `Resolved` or
//! `Aborted`. Every collaborator that talks to the outside world (the
//! version manager, the release catalog and the operator) sits behind a
//! trait so the whole flow can be driven in-process.

mod state;

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};

use nodepin_backend::version::same_version;
use nodepin_backend::{
    BackendDetection, BackendError, BackendProvider, UseOutcome, VersionManager, parse_version,
};
use nodepin_core::{Catalog, suggest_with_limit};

use crate::async_helpers::{run_with_optional_timeout, run_with_timeout};
use crate::catalog_source::CatalogSource;
use crate::declaration::{Declaration, read_declaration, write_declaration};
use crate::error::AppError;
use crate::prompt::{Prompter, is_affirmative};
use crate::report::{render_install_guidance, render_suggestions};

pub use state::{Outcome, State};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub declaration_path: PathBuf,
    pub auto_install_backend: bool,
    /// Answer every yes/no question with yes.
    pub assume_yes: bool,
    pub fetch_timeout: Duration,
    pub prompt_timeout: Option<Duration>,
    pub suggestion_limit: usize,
}

/// A version typed by the operator: the literal text, which is what gets
/// written to the declaration, and its normalized form.
struct ChosenVersion {
    literal: String,
    version: String,
}

pub struct Orchestrator<'a> {
    config: OrchestratorConfig,
    provider: &'a dyn BackendProvider,
    catalog: &'a dyn CatalogSource,
    prompter: &'a dyn Prompter,
    manager: Option<Box<dyn VersionManager>>,
    attempted: Vec<String>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: OrchestratorConfig,
        provider: &'a dyn BackendProvider,
        catalog: &'a dyn CatalogSource,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            config,
            provider,
            catalog,
            prompter,
            manager: None,
            attempted: Vec::new(),
        }
    }

    pub async fn run(mut self) -> Outcome {
        let mut state = self.initial_state();
        let mut history = vec![state.name()];

        while !state.is_terminal() {
            debug!("Orchestrator state: {state:?}");
            state = self.step(state).await;
            history.push(state.name());
        }

        match &state {
            State::Resolved { version } => {
                info!("Resolved to {version}");
                self.prompter.say(&format!("Using Node.js {version}"));
            }
            State::Aborted { reason } => {
                warn!("Aborted: {reason}");
                self.prompter.warn(&reason.to_string());
            }
            _ => {}
        }

        Outcome { state, history }
    }

    fn initial_state(&self) -> State {
        match read_declaration(&self.config.declaration_path) {
            Ok(Declaration::Missing) => State::DeclarationMissing,
            Ok(Declaration::Empty) => State::DeclarationEmpty,
            Ok(Declaration::Declared(raw)) => match parse_version(&raw) {
                Ok(target) => State::DeclarationReady { target },
                Err(error) => State::DeclarationInvalid { raw, error },
            },
            Err(error) => State::Aborted {
                reason: AppError::io("read the version declaration", &error),
            },
        }
    }

    async fn step(&mut self, state: State) -> State {
        let next = match state {
            State::DeclarationMissing => self.create_declaration().await,
            State::DeclarationEmpty => {
                self.prompter
                    .warn(&format!("{} is empty.", self.declaration_display()));
                self.declare_version(AppError::DeclarationEmpty {
                    path: self.config.declaration_path.clone(),
                })
                .await
            }
            State::DeclarationInvalid { raw, error } => {
                self.prompter.warn(&format!(
                    "{} contains {raw:?}, which is not a usable version ({}).",
                    self.declaration_display(),
                    error.reason
                ));
                self.declare_version(AppError::DeclarationInvalid {
                    path: self.config.declaration_path.clone(),
                    source: error,
                })
                .await
            }
            State::DeclarationReady { target } => Ok(self.detect_manager(target).await),
            State::ManagerUnavailable { target } => self.install_manager(target).await,
            State::Comparing { target } => self.compare(target).await,
            State::Switching { target, current } => {
                self.switch(target, current.as_deref()).await
            }
            State::PromptInstall { target, reason } => self.confirm_install(target, reason).await,
            State::Installing { target } => self.install(target).await,
            State::Suggesting { target, failure } => self.suggest(target, failure).await,
            terminal @ (State::Resolved { .. } | State::Aborted { .. }) => Ok(terminal),
        };

        next.unwrap_or_else(|reason| State::Aborted { reason })
    }

    fn declaration_display(&self) -> String {
        self.config.declaration_path.display().to_string()
    }

    fn manager(&self) -> Result<&dyn VersionManager, AppError> {
        self.manager
            .as_deref()
            .ok_or_else(|| AppError::ManagerUnavailable {
                details: "no version manager has been detected".to_string(),
            })
    }

    fn attach_manager(&mut self, detection: &BackendDetection) {
        let manager = self.provider.create_manager(detection);
        info!(
            "Using {} at {}",
            manager.name(),
            manager.backend_info().path.display()
        );
        self.manager = Some(manager);
    }

    async fn ask(&self, question: &str, step: &'static str) -> Result<String, AppError> {
        let answer = run_with_optional_timeout(
            self.config.prompt_timeout,
            "prompt",
            self.prompter.ask(question),
            |error| AppError::io("read the answer", &error),
        )
        .await?;

        answer.ok_or_else(|| AppError::user_aborted(step))
    }

    async fn confirm(&self, question: &str, step: &'static str) -> Result<bool, AppError> {
        if self.config.assume_yes {
            self.prompter.say(&format!("{question}y"));
            return Ok(true);
        }
        Ok(is_affirmative(&self.ask(question, step).await?))
    }

    /// Ask until the operator types a valid version or an empty line.
    async fn ask_for_version(
        &self,
        question: &str,
        step: &'static str,
    ) -> Result<Option<ChosenVersion>, AppError> {
        loop {
            let answer = self.ask(question, step).await?;
            let literal = answer.trim();
            if literal.is_empty() {
                return Ok(None);
            }
            match parse_version(literal) {
                Ok(version) => {
                    return Ok(Some(ChosenVersion {
                        literal: literal.to_string(),
                        version,
                    }));
                }
                Err(error) => self.prompter.warn(&error.to_string()),
            }
        }
    }

    fn write_declaration(&self, literal: &str) -> Result<(), AppError> {
        write_declaration(&self.config.declaration_path, literal)
            .map_err(|error| AppError::io("write the version declaration", &error))?;
        info!(
            "Wrote {literal} to {}",
            self.config.declaration_path.display()
        );
        self.prompter.say(&format!(
            "Updated {} to {literal}",
            self.declaration_display()
        ));
        Ok(())
    }

    async fn create_declaration(&self) -> Result<State, AppError> {
        let path = self.declaration_display();
        self.prompter.warn(&format!("No {path} file found."));

        if !self
            .confirm(&format!("Create {path} now? (y/n): "), "declaration creation")
            .await?
        {
            return Err(AppError::DeclarationMissing {
                path: self.config.declaration_path.clone(),
            });
        }

        self.declare_version(AppError::DeclarationMissing {
            path: self.config.declaration_path.clone(),
        })
        .await
    }

    async fn declare_version(&self, on_decline: AppError) -> Result<State, AppError> {
        let Some(chosen) = self
            .ask_for_version(
                "Which Node.js version should this project use? ",
                "version entry",
            )
            .await?
        else {
            return Err(on_decline);
        };

        self.write_declaration(&chosen.literal)?;
        Ok(State::DeclarationReady {
            target: chosen.version,
        })
    }

    async fn detect_manager(&mut self, target: String) -> State {
        let detection = self.provider.detect().await;
        if !detection.found {
            warn!("{} not detected", self.provider.name());
            return State::ManagerUnavailable { target };
        }

        self.attach_manager(&detection);
        State::Comparing { target }
    }

    async fn install_manager(&mut self, target: String) -> Result<State, AppError> {
        let name = self.provider.name();
        let guidance = self.provider.install_guidance();
        for line in render_install_guidance(self.provider.display_name(), &guidance) {
            self.prompter.say(&line);
        }

        let proceed = self.config.auto_install_backend
            || self
                .confirm(
                    &format!("Install {name} now? (y/n): "),
                    "version manager installation",
                )
                .await?;
        if !proceed {
            return Err(AppError::ManagerUnavailable {
                details: format!("{name} is required to switch Node.js versions"),
            });
        }

        self.prompter.say(&format!("Installing {name}..."));
        self.provider
            .install_backend()
            .await
            .map_err(|error| AppError::ManagerUnavailable {
                details: error.to_string(),
            })?;

        let detection = self.provider.detect().await;
        if !detection.found {
            return Err(AppError::ManagerUnavailable {
                details: format!("{name} is still not detected after installation"),
            });
        }

        self.attach_manager(&detection);
        Ok(State::Comparing { target })
    }

    async fn compare(&self, target: String) -> Result<State, AppError> {
        let manager = self.manager()?;
        let current = match manager.current_version().await {
            Ok(current) => current,
            Err(error) => {
                warn!("Failed to read current version: {error}");
                self.prompter.warn(&format!(
                    "Could not read the current Node.js version: {error}"
                ));
                None
            }
        };

        if let Some(current) = &current
            && same_version(current, &target)
        {
            self.prompter
                .say(&format!("Node.js versions match: {current}"));
            return Ok(State::Resolved { version: target });
        }

        self.prompter.say(&format!(
            "Current Node.js version: {}",
            current.as_deref().unwrap_or("none")
        ));
        self.prompter.say(&format!(
            "Switching to {target} from {}",
            self.declaration_display()
        ));
        Ok(State::Switching { target, current })
    }

    async fn switch(&self, target: String, current: Option<&str>) -> Result<State, AppError> {
        let manager = self.manager()?;
        debug!("Switching from {current:?} to {target}");

        match manager.use_version(&target).await {
            Ok(UseOutcome::Activated) => self.verify_activation(target).await,
            Ok(UseOutcome::NotInstalled) => {
                match manager.list_installed().await {
                    Ok(listing) => debug!("Installed versions:\n{listing}"),
                    Err(error) => debug!("Could not list installed versions: {error}"),
                }
                self.prompter
                    .say(&format!("Node.js {target} is not installed."));
                Ok(State::Installing { target })
            }
            Ok(UseOutcome::Failed(reason)) => Ok(State::PromptInstall { target, reason }),
            Err(error) => Ok(State::PromptInstall {
                target,
                reason: error.to_string(),
            }),
        }
    }

    /// Managers whose activation outlives the child process can be asked
    /// which version is active now. For the others the switch only happened
    /// in a throwaway shell.
    async fn verify_activation(&self, target: String) -> Result<State, AppError> {
        let manager = self.manager()?;
        let manual = format!("run `{} use {target}` manually", manager.name());

        if !manager.capabilities().persistent_activation {
            self.prompter.say(&format!(
                "Node.js {target} is ready. Run `{} use` in your shell to activate it there.",
                manager.name()
            ));
            return Ok(State::Resolved { version: target });
        }

        match manager.current_version().await {
            Ok(Some(current)) if same_version(&current, &target) => {
                self.prompter
                    .say(&format!("Updated Node.js version: {current}"));
                Ok(State::Resolved { version: target })
            }
            Ok(current) => Err(AppError::switch_failed(
                &target,
                format!(
                    "active version is {}; {manual}",
                    current.as_deref().unwrap_or("none")
                ),
            )),
            Err(error) => Err(AppError::switch_failed(&target, format!("{error}; {manual}"))),
        }
    }

    async fn confirm_install(&self, target: String, reason: String) -> Result<State, AppError> {
        self.prompter
            .warn(&format!("Could not switch to Node.js {target}: {reason}"));

        if self
            .confirm(
                "Do you want to install this version? (y/n): ",
                "install confirmation",
            )
            .await?
        {
            Ok(State::Installing { target })
        } else {
            Err(AppError::switch_failed(target, reason))
        }
    }

    async fn install(&mut self, target: String) -> Result<State, AppError> {
        self.attempted.push(target.clone());
        let manager = self.manager()?;

        self.prompter
            .say(&format!("Installing Node.js {target}..."));
        if let Err(error) = manager.install(&target).await {
            warn!("Install of {target} failed: {error}");
            self.prompter
                .warn(&format!("Installing Node.js {target} failed: {error}"));
            return Ok(State::Suggesting {
                target,
                failure: error,
            });
        }

        let manual = format!("run `{} use {target}` manually", manager.name());
        match manager.use_version(&target).await {
            Ok(UseOutcome::Activated) => self.verify_activation(target).await,
            Ok(UseOutcome::NotInstalled) => Err(AppError::VersionNotInstalled { version: target }),
            Ok(UseOutcome::Failed(details)) => Err(AppError::switch_failed(
                &target,
                format!("{details}; {manual}"),
            )),
            Err(error) => Err(AppError::switch_failed(&target, format!("{error}; {manual}"))),
        }
    }

    async fn suggest(&self, target: String, failure: BackendError) -> Result<State, AppError> {
        self.prompter
            .say(&format!("Looking for releases near {target}..."));

        let records = run_with_timeout(
            self.config.fetch_timeout,
            "release catalog fetch",
            self.catalog.fetch(),
            AppError::from,
        )
        .await?;
        let suggestions = suggest_with_limit(&records, &target, self.config.suggestion_limit)?;

        for line in render_suggestions(&suggestions) {
            self.prompter.say(&line);
        }

        let Some(chosen) = self
            .ask_for_version(
                "Enter a version to install instead (leave empty to abort): ",
                "version selection",
            )
            .await?
        else {
            return Err(AppError::install_failed(target, &failure));
        };

        if self
            .attempted
            .iter()
            .any(|tried| same_version(tried, &chosen.version))
        {
            return Err(AppError::RepeatedVersion {
                version: chosen.version,
            });
        }

        if !Catalog::from_records(&records).contains(&chosen.version) {
            self.prompter.warn(&format!(
                "{} is not a published release; trying it anyway.",
                chosen.literal
            ));
        }

        self.write_declaration(&chosen.literal)?;
        Ok(State::Installing {
            target: chosen.version,
        })
    }
}
