//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::{load_config, resolve_config_path};
use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;

pub fn execute(args: ConfigArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        return output.result(rows);
    }

    output.section("Configuration");
    match resolve_config_path(args.config.as_deref()) {
        Some(path) => output.kv("File", path.display()),
        None => output.kv("File", "(none)"),
    }
    output.table(rows);
    Ok(())
}
