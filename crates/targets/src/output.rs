//! URL list persistence

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use contracts::Target;
use tracing::{debug, instrument};

use crate::error::{Result, TargetError};

/// Write one target per line (newline-terminated), replacing `path`
#[instrument(name = "targets_save", skip(targets), fields(count = targets.len()))]
pub fn save_targets(targets: &[Target], path: &Path) -> Result<()> {
    let to_err = |source| TargetError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_err)?;
    let mut writer = BufWriter::new(file);
    for target in targets {
        writeln!(writer, "{}", target).map_err(to_err)?;
    }
    writer.flush().map_err(to_err)?;

    debug!(path = %path.display(), "Targets saved");
    Ok(())
}
