// src/config/defaults.rs

//! Built-in catalogue, used when no config file is supplied.

use std::path::PathBuf;

use crate::config::model::{
    default_elevation, Catalogue, ConfigFile, OptionEntry, OrchestratorSettings, TaskEntry,
};

/// File name of the maintenance script when no path is configured.
pub const DEFAULT_SCRIPT_NAME: &str = "fedorable.sh";

const TASKS: &[(&str, &str)] = &[
    ("update", "Update System Packages"),
    ("autoremove", "Autoremove Unused Packages"),
    ("clean_dnf", "Clean DNF Cache"),
    ("clean_kernels", "Remove Old Kernels"),
    ("clean_user_cache", "Clean User Caches (Thumbnails)"),
    ("clean_journal", "Clean System Journal"),
    ("clean_temp", "Clean Temp Files"),
    ("clean_coredumps", "Clean Coredumps"),
    ("update_grub", "Update GRUB/Bootloader"),
    ("clean_flatpak", "Clean/Update Flatpak"),
    ("optimize_rpmdb", "Optimize RPM Database"),
    ("reset_failed_units", "Reset Failed Systemd Units"),
    ("update_fonts", "Update Font Cache"),
    ("trim", "Run SSD TRIM"),
    ("optimize_fstrim", "Optimize fstrim Timer"),
    ("clean_snap", "Clean Snap Packages"),
    ("update_mandb", "Update Man Database"),
    ("check_services", "Check Service Health"),
];

const OPTIONS: &[(&str, &str, &str)] = &[
    ("perform_timeshift", "Perform Timeshift Snapshot", "--perform-timeshift"),
    ("perform_backup", "Perform Config Backup", "--perform-backup"),
    ("perform_update_firmware", "Update Firmware (fwupdmgr)", "--perform-update-firmware"),
    ("perform_clear_history", "Clear Shell History (Caution!)", "--perform-clear-history"),
    ("yes", "Assume 'Yes' to prompts", "--yes"),
    ("dry_run", "Dry Run (No changes made)", "--dry-run"),
    ("email_report", "Send Email Report (Configure /etc/fedorable.conf)", "--email-report"),
    ("check_only", "Check for Updates Only", "--check-only"),
];

/// The stock catalogue: every task enabled, every option off.
pub fn builtin_catalogue() -> Catalogue {
    let tasks = TASKS
        .iter()
        .map(|(key, label)| TaskEntry {
            key: key.to_string(),
            label: label.to_string(),
            default: true,
        })
        .collect();

    let options = OPTIONS
        .iter()
        .map(|(key, label, flag)| OptionEntry {
            key: key.to_string(),
            label: label.to_string(),
            default: false,
            flag: flag.to_string(),
        })
        .collect();

    Catalogue::new_unchecked(tasks, options)
}

pub fn builtin_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        elevation: default_elevation(),
        script: default_script_path(),
        denial_exit_codes: Vec::new(),
    }
}

pub fn builtin_config() -> ConfigFile {
    ConfigFile::new_unchecked(builtin_settings(), builtin_catalogue())
}

/// `fedorable.sh` next to the running executable, falling back to the
/// current working directory.
pub fn default_script_path() -> PathBuf {
    let dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("/"));
    dir.join(DEFAULT_SCRIPT_NAME)
}
