use comfy_table::{Cell, Table};

use crate::cli::ConfigCommands;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn format_settings(settings: &Settings) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);
    let rows = [
        ("source_path", settings.source_path.clone()),
        ("default_top_n", settings.default_top_n.to_string()),
        ("pie_threshold", settings.pie_threshold.to_string()),
        ("default_category_count", settings.default_category_count.to_string()),
        ("export_dir", settings.export_dir.clone()),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table.to_string()
}

pub fn dispatch(cmd: &ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("Settings ({})\n{}", settings_path().display(), format_settings(&load_settings()));
        }
        ConfigCommands::Set { key, value } => {
            let mut settings = load_settings();
            settings.set(key, value)?;
            save_settings(&settings)?;
            println!("Set {key} = {value}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::KEYS;

    #[test]
    fn test_format_settings_lists_every_key() {
        let out = format_settings(&Settings::default());
        for key in KEYS {
            assert!(out.contains(key), "missing {key}");
        }
        assert!(out.contains("firefly_export.csv"));
        assert!(out.contains("0.5"));
    }
}
