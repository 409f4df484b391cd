//! CLI configuration: thin wrapper around `fwdctl_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--panel, --node, --timeout, etc.).

use clap::ValueEnum;

use fwdctl_core::{ControllerConfig, Selection};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fwdctl_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Everything a panel-bound command needs to start.
#[derive(Debug)]
pub struct Resolved {
    pub controller: ControllerConfig,
    pub selection: Selection,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Output format: flag (or `FWDCTL_OUTPUT`), then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.clone().unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Translate the active profile plus global flags into a controller config
/// and a starting selection.
///
/// CLI flag overrides take priority over profile values. Without a profile,
/// `--panel` alone is enough.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.panel.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref panel) = global.panel {
        profile.panel.clone_from(panel);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.page_size.is_some() {
        profile.page_size = global.page_size;
    }

    let selection = if global.local {
        Selection::Local
    } else {
        global
            .node
            .map_or_else(|| profile.selection(), Selection::Remote)
    };

    let controller = fwdctl_config::profile_to_controller_config(&profile, &config.defaults)?;
    Ok(Resolved {
        controller,
        selection,
    })
}
