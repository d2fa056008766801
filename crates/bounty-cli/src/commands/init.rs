//! Init command for writing a template configuration file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Starting configuration. Holy Wednesday and Christmas Eve are half days.
pub const TEMPLATE: &str = r#"# bounty configuration

# Backend for worked hours: "harvest", "clockify" or "xledger".
# Leave unset and pass --hours to `bounty balance` instead.
# integration = "harvest"

# Last day covered by reference_balance (YYYY-MM-DD), and the balance in hours
# at the end of that day. Hours may also be written as "HH:MM", e.g. "-02:30".
# reference_date = "2024-01-01"
reference_balance = 0.0

workdays = ["monday", "tuesday", "wednesday", "thursday", "friday"]
hours_on_workdays = 7.5

# Hours expected on a holiday that falls on a workday.
hours_on_holidays = 0.0

[hours_on_specific_holidays]
holyWednesday = 3.75
christmasEve = 3.75

# Credentials may reference environment variables as ${NAME}.

# [harvest]
# token = "${HARVEST_TOKEN}"
# account_id = "123456"
# Defaults to ignoring the Absence project's Time off task.
# entries_to_ignore = [{ project = "Absence", task = "Time off" }]

# [clockify]
# api_key = "${CLOCKIFY_API_KEY}"
# workspace_id = "..."
# entries_to_ignore = [{ project_name = "Vacation" }]

# [xledger]
# api_key = "${XLEDGER_API_KEY}"
# employee_id = 12345
"#;

/// Runs the init command.
pub fn run<W: Write>(writer: &mut W, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    std::fs::write(path, TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote configuration template");

    writeln!(writer, "Wrote {}", path.display())?;
    writeln!(
        writer,
        "Set reference_date and reference_balance before running `bounty balance`."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bounty_core::Holiday;
    use figment::Figment;
    use figment::providers::{Format, Serialized, Toml};

    use crate::Config;

    #[test]
    fn writes_template_into_new_directory() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bounty").join("config.toml");

        let mut output = Vec::new();
        run(&mut output, &path, false).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with(&format!("Wrote {}", path.display())));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "reference_balance = 3.0\n").unwrap();

        let err = run(&mut Vec::new(), &path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "reference_balance = 3.0\n"
        );

        run(&mut Vec::new(), &path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
    }

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::from_figment(
            &Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(TEMPLATE)),
        )
        .unwrap();
        assert_eq!(config.integration, None);
        assert!(config.hours_on_holidays.abs() < f64::EPSILON);
        assert_eq!(
            config.hours_on_specific_holidays.get(&Holiday::HolyWednesday),
            Some(&3.75)
        );
        assert_eq!(
            config.hours_on_specific_holidays.get(&Holiday::ChristmasEve),
            Some(&3.75)
        );
    }
}
