use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside the DocuApp directory
pub const DATABASE_FILE_NAME: &str = "docuapp.db";

/// Get the path to the DocuApp directory (~/.docuapp)
///
/// `DOCUAPP_DIR` wins over `HOME`, which wins over the platform home directory.
pub fn docuapp_dir() -> PathBuf {
    if let Ok(dir) = env::var("DOCUAPP_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".docuapp")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".docuapp")
    }
}

/// Get the path to the default database file (~/.docuapp/docuapp.db)
pub fn database_file() -> PathBuf {
    docuapp_dir().join(DATABASE_FILE_NAME)
}
