//! Command dispatch: one invocation, one store operation

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::KvService;
use crate::application::{resolve_value, ApplicationError, ApplicationResult};
use crate::cli::args::{Cli, Commands, KeyValueArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::subtree_root;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::InputSource;

/// Run the parsed command against the real backends, writing data to stdout.
pub fn execute_command(cli: &Cli, command: &Commands) -> CliResult<()> {
    check_operands(command)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // completion scripts need no backend, so a broken config must not block them
    let settings = match command {
        Commands::Completion { .. } => Settings::default(),
        _ => Settings::load(cli.config.as_deref())
            .map_err(CliError::Connect)?
            .merge_with(&cli.overrides()),
    };
    debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings);
    run_command(&container, command, &mut out)
}

/// Dispatch one command.
///
/// Operand checks that need no backend (value resolution, the `deltree`
/// subtree) run before the connection is opened.
#[instrument(level = "debug", skip(container, out))]
pub fn run_command(
    container: &ServiceContainer,
    command: &Commands,
    out: &mut dyn Write,
) -> CliResult<()> {
    match command {
        Commands::Put(args) => {
            let value = read_value(args, container.input.as_ref()).map_err(CliError::Put)?;
            let service = connect(container)?;
            service.put(args.key(), &value).map_err(CliError::Put)
        }
        Commands::Get(args) => {
            let service = connect(container)?;
            let pair = service.get(args.key()).map_err(CliError::Get)?;
            out.write_all(&pair.value)?;
            out.write_all(b"\n")?;
            Ok(())
        }
        Commands::Del(args) => {
            let service = connect(container)?;
            service.delete(args.key()).map_err(CliError::Delete)
        }
        Commands::Deltree(args) => {
            let root = subtree_root(args.key()).map_err(|_| CliError::MissingSubtree)?;
            let service = connect(container)?;
            service.delete_tree(root).map_err(CliError::DeleteTree)
        }
        Commands::List(args) => {
            let service = connect(container)?;
            let pairs = service.list(args.key()).map_err(CliError::List)?;
            for pair in &pairs {
                output::write_list_line(out, pair, container.settings.show_value)?;
            }
            Ok(())
        }
        Commands::Cas(args) => {
            let value = read_value(args, container.input.as_ref()).map_err(CliError::Cas)?;
            let service = connect(container)?;
            service.cas(args.key(), &value).map_err(|e| match e {
                ApplicationError::KeyAlreadySet(_) => CliError::KeyAlreadySet,
                other => CliError::Cas(other),
            })
        }
        Commands::Exists(args) => {
            let service = connect(container)?;
            if !service.exists(args.key()) {
                return Err(CliError::KeyAbsent);
            }
            writeln!(out, "true")?;
            Ok(())
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, out);
            Ok(())
        }
    }
}

/// Refuse operands that are wrong regardless of configuration.
///
/// Runs before settings are loaded, so a `deltree` without a subtree fails
/// the same way whatever the config file holds.
fn check_operands(command: &Commands) -> CliResult<()> {
    if let Commands::Deltree(args) = command {
        subtree_root(args.key()).map_err(|_| CliError::MissingSubtree)?;
    }
    Ok(())
}

fn connect(container: &ServiceContainer) -> CliResult<KvService> {
    container.kv_service().map_err(CliError::Connect)
}

fn read_value(args: &KeyValueArgs, input: &dyn InputSource) -> ApplicationResult<Vec<u8>> {
    resolve_value(&args.value, input).map_err(|e| ApplicationError::OperationFailed {
        context: "read value from stdin".into(),
        source: Box::new(e),
    })
}
