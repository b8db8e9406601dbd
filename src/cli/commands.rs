//! Command dispatch: maps parsed arguments onto services

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{ExportFormat, KnowledgeService};
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TreeDisplay;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Play { file }) => _play(container, file.as_deref()),
        Some(Commands::Show { file }) => _show(container, file),
        Some(Commands::Fmt {
            file,
            compact,
            write,
        }) => _fmt(container, file, *compact, *write),
        Some(Commands::Dot { file, output }) => _dot(container, file, output.as_deref()),
        Some(Commands::Define { file, subject }) => _define(container, file, subject),
        Some(Commands::Subjects { file }) => _subjects(container, file),
        Some(Commands::Stats { file }) => _stats(container, file),
        Some(Commands::Config { command }) => _config(cli, container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e).into()),
    }
}

/// Write `text` to stdout, surfacing broken pipes as I/O errors.
fn emit(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text.trim_end())
        .and_then(|_| stdout.flush())
        .map_err(|e| InfraError::io("write to stdout", e).into())
}

#[instrument(level = "debug", skip(container))]
fn _play(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let file: Option<PathBuf> = file
        .map(Path::to_path_buf)
        .or_else(|| container.settings.session.knowledge_file.clone());
    debug!("play: knowledge file {:?}", file);
    let mut session = container.session_service(file)?;
    session.run()?;
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn _show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let kb = container.knowledge_service().load(file)?;
    emit(&kb.to_tree().to_string())
}

#[instrument(level = "debug", skip(container))]
fn _fmt(container: &ServiceContainer, file: &Path, compact: bool, write: bool) -> CliResult<()> {
    let mut codec = container.settings.codec_options();
    codec.compact |= compact;
    let service = KnowledgeService::new(
        container.fs.clone(),
        container.settings.arena_options(),
        codec,
    );

    let kb = service.load(file)?;
    if write {
        service.save(&kb, file, ExportFormat::Text)?;
        output::action("Formatted", &file.display());
        Ok(())
    } else {
        emit(&service.render(&kb, ExportFormat::Text))
    }
}

#[instrument(level = "debug", skip(container))]
fn _dot(container: &ServiceContainer, file: &Path, out: Option<&Path>) -> CliResult<()> {
    let service = container.knowledge_service();
    let kb = service.load(file)?;
    match out {
        Some(out) => {
            service.save(&kb, out, ExportFormat::Graph)?;
            output::action("Exported", &out.display());
            Ok(())
        }
        None => emit(&service.render(&kb, ExportFormat::Graph)),
    }
}

#[instrument(level = "debug", skip(container))]
fn _define(container: &ServiceContainer, file: &Path, subject: &str) -> CliResult<()> {
    let service = container.knowledge_service();
    let kb = service.load(file)?;
    let definition = service.describe(&kb, subject)?;

    output::header(&definition.subject);
    for (question, answer) in &definition.properties {
        if *answer {
            output::success_detail(question);
        } else {
            output::failure(question);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn _subjects(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let kb = container.knowledge_service().load(file)?;
    let subjects: Vec<&str> = kb.subjects().collect();
    emit(&subjects.join("\n"))
}

#[instrument(level = "debug", skip(container))]
fn _stats(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let service = container.knowledge_service();
    let kb = service.load(file)?;
    let stats = service.stats(&kb);

    output::header(&file.display());
    output::action("nodes", &stats.tree_size);
    output::action("subjects", &stats.leaf_count);
    output::action("questions", &(stats.tree_size - stats.leaf_count));
    output::action("allocated nodes", &stats.allocated_nodes);
    output::action("depth", &stats.depth);
    output::action("index depth", &stats.index_depth);
    output::action("slabs", &stats.slab_count);
    output::action("text bytes reserved", &stats.reserved_bytes);
    Ok(())
}

fn _config(cli: &Cli, container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    let local_dir = cli
        .dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    match command {
        ConfigCommands::Show => emit(&container.settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &describe_path(container, &path)),
                None => output::warning("no config directory for this platform"),
            }
            let local = local_config_path(&local_dir);
            output::action("local", &describe_path(container, &local));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no config directory for this platform".to_string())
                })?
            } else {
                local_config_path(&local_dir)
            };

            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .with_path_context("create directory for", &path)?;
            container
                .fs
                .write(&path, &Settings::template())
                .with_path_context("write config", &path)?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn describe_path(container: &ServiceContainer, path: &Path) -> String {
    if container.fs.is_file(path) {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
