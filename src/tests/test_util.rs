use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Routes log output through the test harness once per process.
pub fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Writes `<dir>/<source>.csv` and returns its path.
pub fn write_table(dir: &Path, source: &str, contents: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{source}.csv"));
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
}

#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(err) => err,
        }
    };
}
